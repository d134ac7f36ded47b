use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Membership test against a list of accepted words
pub trait Dictionary: Send + Sync {
    fn is_dictionary_word(&self, token: &str) -> bool;
}

pub struct WordValidator {
    valid_words: HashSet<String>,
}

impl WordValidator {
    /// Load every `.txt` word list in a directory, or a single word list file
    pub fn new<P: AsRef<Path>>(words_path: P) -> Result<Self> {
        let words_path = words_path.as_ref();
        let mut valid_words = HashSet::new();

        if words_path.is_file() {
            let contents = fs::read_to_string(words_path)
                .with_context(|| format!("Failed to read word list {}", words_path.display()))?;
            valid_words.extend(Self::parse_word_list(&contents));
        } else {
            let entries = fs::read_dir(words_path).with_context(|| {
                format!("Failed to read words directory {}", words_path.display())
            })?;

            for entry in entries {
                let path = entry?.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
                    continue;
                }
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read word list {}", path.display()))?;
                let before = valid_words.len();
                valid_words.extend(Self::parse_word_list(&contents));
                debug!(
                    "Loaded {} words from {}",
                    valid_words.len() - before,
                    path.display()
                );
            }
        }

        if valid_words.is_empty() {
            return Err(anyhow!("No words found in {}", words_path.display()));
        }

        info!("Dictionary loaded with {} words", valid_words.len());
        Ok(Self { valid_words })
    }

    /// Create a validator from newline separated words
    pub fn from_word_list(word_list: &str) -> Self {
        Self {
            valid_words: Self::parse_word_list(word_list).collect(),
        }
    }

    /// Small built-in list used by tests and local development
    pub fn new_with_test_words() -> Self {
        Self::from_word_list(
            "cat\nact\ntac\ndog\ngod\ntrain\nstop\npots\ntops\nspot\nopts\npost\nlisten\nsilent\nenlist\ntinsel\nplanet\nplaten\nheart\nearth\nhater",
        )
    }

    fn parse_word_list(word_list: &str) -> impl Iterator<Item = String> + '_ {
        word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .filter(|word| Self::is_alphabetic(word))
    }

    pub fn len(&self) -> usize {
        self.valid_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_words.is_empty()
    }

    /// Check if word contains only alphabetic characters
    pub fn is_alphabetic(word: &str) -> bool {
        !word.is_empty() && word.chars().all(|c| c.is_alphabetic())
    }
}

impl Dictionary for WordValidator {
    fn is_dictionary_word(&self, token: &str) -> bool {
        self.valid_words.contains(&token.trim().to_lowercase())
    }
}

/// A presented letter order for a word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jumble {
    pub letters: String,
    /// False when no order other than the word itself exists
    pub jumblable: bool,
}

/// A word can be jumbled when it has at least two distinct letters
pub fn is_jumblable(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => chars.any(|c| c != first),
        None => false,
    }
}

/// Random permutation of the word's letters that never equals the word.
/// Words without a second arrangement come back unchanged and flagged.
pub fn jumble<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Jumble {
    if !is_jumblable(word) {
        return Jumble {
            letters: word.to_string(),
            jumblable: false,
        };
    }

    let mut letters: Vec<char> = word.chars().collect();
    loop {
        letters.shuffle(rng);
        let candidate: String = letters.iter().collect();
        if candidate != word {
            return Jumble {
                letters: candidate,
                jumblable: true,
            };
        }
    }
}

/// New permutation differing from both the word and the order currently shown.
/// Returns `None` when the word has fewer than three distinct arrangements.
pub fn reshuffle<R: Rng + ?Sized>(word: &str, current: &str, rng: &mut R) -> Option<String> {
    // Two or more distinct letters over three or more positions always give
    // at least three arrangements
    if word.chars().count() < 3 || !is_jumblable(word) {
        return None;
    }

    let mut letters: Vec<char> = word.chars().collect();
    loop {
        letters.shuffle(rng);
        let candidate: String = letters.iter().collect();
        if candidate != word && candidate != current {
            return Some(candidate);
        }
    }
}

fn sorted_letters(word: &str) -> Vec<char> {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters
}

/// True when the letters are a permutation of each other, ignoring case
pub fn is_letter_permutation(a: &str, b: &str) -> bool {
    sorted_letters(&a.to_lowercase()) == sorted_letters(&b.to_lowercase())
}

/// An alternate dictionary word built from exactly the target's letters
pub fn is_anagram_solution(candidate: &str, target: &str, dictionary: &dyn Dictionary) -> bool {
    let candidate = candidate.trim().to_lowercase();
    let target = target.trim().to_lowercase();

    candidate != target
        && is_letter_permutation(&candidate, &target)
        && dictionary.is_dictionary_word(&candidate)
        && dictionary.is_dictionary_word(&target)
}
