use std::sync::LazyLock;

use regex::Regex;

static ALLOWED_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N} ._-]+$").expect("static pattern"));

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 20;

/// Checks a requested screen name and returns it trimmed
pub fn validate_screen_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    let length = name.chars().count();

    if length < MIN_LENGTH {
        return Err("Screen name must be at least 2 characters long.".to_string());
    }
    if length > MAX_LENGTH {
        return Err("Screen name cannot be longer than 20 characters.".to_string());
    }

    let chars: Vec<char> = name.chars().collect();
    if chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2]) {
        return Err("Screen name contains too many repeated characters.".to_string());
    }

    if !ALLOWED_CHARACTERS.is_match(name) {
        return Err(
            "Screen name can only contain letters, numbers, spaces, and basic punctuation."
                .to_string(),
        );
    }

    Ok(name.to_string())
}
