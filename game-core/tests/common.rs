#![allow(dead_code)]

use game_core::{GameConfig, PuzzleDefinition, PuzzleLibrary, RoundState, WordValidator};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

pub const GAMES_JSON: &str = r#"[
    {
        "id": 1,
        "daily_theme": "Anagram Friends",
        "theme_reflection": "Letters can be rearranged into many things.",
        "daily_words": {
            "listen": "pay attention",
            "cat": "feline pet",
            "heart": "beats in your chest",
            "stop": "red sign"
        }
    },
    {
        "id": 2,
        "daily_theme": "Travel",
        "theme_reflection": "Getting there is half the fun.",
        "daily_words": {"train": "rail transport", "planet": "orbits a star"}
    }
]"#;

/// Creates a test WordValidator that knows every word used in these tests
pub fn create_test_validator() -> WordValidator {
    WordValidator::new_with_test_words()
}

pub fn create_test_library() -> PuzzleLibrary {
    PuzzleLibrary::from_json(GAMES_JSON).expect("test puzzles should parse")
}

pub fn create_test_puzzle() -> PuzzleDefinition {
    create_test_library().puzzles()[0].clone()
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Starts a round on the first test puzzle at `now`
pub fn start_round(now: Instant) -> RoundState {
    let mut rng = seeded_rng();
    RoundState::start(&create_test_puzzle(), GameConfig::default(), now, &mut rng)
}

pub fn after(start: Instant, seconds: u64) -> Instant {
    start + Duration::from_secs(seconds)
}

/// Asserts that every word of a completed round has exactly one terminal record
pub fn assert_one_terminal_per_word(round: &RoundState) {
    assert!(round.is_completed(), "Expected a completed round");
    for word in round.words() {
        let terminal = round
            .results()
            .iter()
            .filter(|r| &r.word == word && r.is_terminal())
            .count();
        assert_eq!(terminal, 1, "Expected one terminal record for '{}'", word);
    }
}
