use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::WordValidator;

/// A themed set of words with one hint per word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDefinition {
    pub id: String,
    pub theme: String,
    pub theme_reflection: String,
    pub words: Vec<(String, String)>, // (word, hint) in definition order
}

impl PuzzleDefinition {
    pub fn new(
        id: impl Into<String>,
        theme: impl Into<String>,
        theme_reflection: impl Into<String>,
        words: &[(&str, &str)],
    ) -> Self {
        Self {
            id: id.into(),
            theme: theme.into(),
            theme_reflection: theme_reflection.into(),
            words: words
                .iter()
                .map(|(word, hint)| (word.to_lowercase(), hint.to_string()))
                .collect(),
        }
    }

    /// Words in presentation order: shortest first, ties keep definition order
    pub fn presentation_order(&self) -> Vec<(String, String)> {
        let mut words = self.words.clone();
        words.sort_by_key(|(word, _)| word.chars().count());
        words
    }
}

#[derive(Deserialize)]
struct RawPuzzle {
    id: serde_json::Value,
    daily_theme: String,
    #[serde(default)]
    theme_reflection: String,
    daily_words: serde_json::Map<String, serde_json::Value>,
}

impl RawPuzzle {
    fn into_definition(self) -> Result<PuzzleDefinition> {
        let id = match self.id {
            serde_json::Value::String(id) => id,
            other => other.to_string(),
        };

        let mut seen = HashSet::new();
        let mut words = Vec::with_capacity(self.daily_words.len());
        for (word, hint) in self.daily_words {
            let word = word.trim().to_lowercase();
            if !WordValidator::is_alphabetic(&word) {
                return Err(anyhow!("Puzzle {} has a non-alphabetic word '{}'", id, word));
            }
            if !seen.insert(word.clone()) {
                return Err(anyhow!("Puzzle {} repeats the word '{}'", id, word));
            }
            let hint = hint
                .as_str()
                .ok_or_else(|| anyhow!("Puzzle {} has a non-text hint for '{}'", id, word))?
                .to_string();
            words.push((word, hint));
        }

        if words.is_empty() {
            return Err(anyhow!("Puzzle {} has no words", id));
        }

        Ok(PuzzleDefinition {
            id,
            theme: self.daily_theme,
            theme_reflection: self.theme_reflection,
            words,
        })
    }
}

/// The pool of puzzles a round can be drawn from
#[derive(Debug, Clone)]
pub struct PuzzleLibrary {
    puzzles: Vec<PuzzleDefinition>,
}

impl PuzzleLibrary {
    pub fn new(puzzles: Vec<PuzzleDefinition>) -> Result<Self> {
        if puzzles.is_empty() {
            return Err(anyhow!("Puzzle library is empty"));
        }
        Ok(Self { puzzles })
    }

    /// Parse a JSON array of `{id, daily_theme, theme_reflection, daily_words}`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawPuzzle> =
            serde_json::from_str(json).context("Failed to parse puzzle definitions")?;
        let puzzles = raw
            .into_iter()
            .map(RawPuzzle::into_definition)
            .collect::<Result<Vec<_>>>()?;
        Self::new(puzzles)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read puzzles from {}", path.display()))?;
        let library = Self::from_json(&json)?;
        info!("Loaded {} puzzles from {}", library.len(), path.display());
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn puzzles(&self) -> &[PuzzleDefinition] {
        &self.puzzles
    }

    /// Same puzzle for every player on a given calendar day
    pub fn daily(&self, date: NaiveDate) -> &PuzzleDefinition {
        let digest = Sha256::digest(date.format("%Y-%m-%d").to_string().as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        let index = u64::from_be_bytes(seed) % self.puzzles.len() as u64;
        &self.puzzles[index as usize]
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> &PuzzleDefinition {
        &self.puzzles[rng.gen_range(0..self.puzzles.len())]
    }

    pub fn select<R: Rng + ?Sized>(
        &self,
        random_mode: bool,
        today: NaiveDate,
        rng: &mut R,
    ) -> &PuzzleDefinition {
        if random_mode {
            self.random(rng)
        } else {
            self.daily(today)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAMES_JSON: &str = r#"[
        {
            "id": 1,
            "daily_theme": "Pets",
            "theme_reflection": "Companions come in every size.",
            "daily_words": {"parrot": "talking bird", "cat": "feline pet", "hamster": "wheel runner", "dog": "loyal friend"}
        },
        {
            "id": "ocean-02",
            "daily_theme": "Ocean",
            "daily_words": {"whale": "largest mammal", "coral": "reef builder"}
        }
    ]"#;

    #[test]
    fn test_parse_library_preserves_definition_order() {
        let library = PuzzleLibrary::from_json(GAMES_JSON).unwrap();
        assert_eq!(library.len(), 2);

        let pets = &library.puzzles()[0];
        assert_eq!(pets.id, "1");
        assert_eq!(pets.theme, "Pets");
        let words: Vec<&str> = pets.words.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["parrot", "cat", "hamster", "dog"]);

        let ocean = &library.puzzles()[1];
        assert_eq!(ocean.id, "ocean-02");
        assert_eq!(ocean.theme_reflection, "");
    }

    #[test]
    fn test_presentation_order_is_by_length_and_stable() {
        let library = PuzzleLibrary::from_json(GAMES_JSON).unwrap();
        let ordered: Vec<String> = library.puzzles()[0]
            .presentation_order()
            .into_iter()
            .map(|(word, _)| word)
            .collect();
        assert_eq!(ordered, vec!["cat", "dog", "parrot", "hamster"]);
    }

    #[test]
    fn test_rejects_bad_puzzles() {
        assert!(PuzzleLibrary::from_json("[]").is_err());
        assert!(PuzzleLibrary::from_json("not json").is_err());

        let empty_words = r#"[{"id": 1, "daily_theme": "x", "daily_words": {}}]"#;
        assert!(PuzzleLibrary::from_json(empty_words).is_err());

        let bad_word = r#"[{"id": 1, "daily_theme": "x", "daily_words": {"ice-cream": "cold"}}]"#;
        let err = PuzzleLibrary::from_json(bad_word).unwrap_err();
        assert!(err.to_string().contains("non-alphabetic"));

        let repeated = r#"[{"id": 1, "daily_theme": "x", "daily_words": {"Cat": "a", "cat": "b"}}]"#;
        assert!(PuzzleLibrary::from_json(repeated).is_err());
    }

    #[test]
    fn test_daily_selection_is_deterministic() {
        let library = PuzzleLibrary::from_json(GAMES_JSON).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();

        let first = library.daily(day).id.clone();
        for _ in 0..10 {
            assert_eq!(library.daily(day).id, first);
        }

        let mut rng = rand::thread_rng();
        assert_eq!(library.select(false, day, &mut rng).id, first);
    }

    #[test]
    fn test_random_selection_stays_in_library() {
        let library = PuzzleLibrary::from_json(GAMES_JSON).unwrap();
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let id = &library.random(&mut rng).id;
            assert!(id == "1" || id == "ocean-02");
        }
    }
}
