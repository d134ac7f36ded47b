use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use game_core::GameConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub puzzles_file: String,
    pub words_directory: String,
    pub random_mode: bool,
    pub auth_dev_mode: bool,
    pub google_client_id: String,
    pub round_timeout_minutes: u64,
    pub game: GameConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GameConfig::default();
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: text("HOST", "127.0.0.1"),
            port: parse(&lookup, "PORT", 5000)?,
            database_url: text("DATABASE_URL", "sqlite://twistle.db?mode=rwc"),
            puzzles_file: text("PUZZLES_FILE", "./data/games.json"),
            words_directory: text("WORDS_DIRECTORY", "./data/words"),
            random_mode: parse(&lookup, "TWISTLE_RANDOM_MODE", false)?,
            auth_dev_mode: parse(&lookup, "AUTH_DEV_MODE", false)?,
            google_client_id: text("GOOGLE_CLIENT_ID", ""),
            round_timeout_minutes: parse(&lookup, "ROUND_TIMEOUT_MINUTES", 120)?,
            game: GameConfig {
                word_time_limit: parse(&lookup, "WORD_TIME_LIMIT", defaults.word_time_limit)?,
                max_attempts: parse(&lookup, "MAX_ATTEMPTS", defaults.max_attempts)?,
                shuffle_limit: parse(&lookup, "SHUFFLE_LIMIT", defaults.shuffle_limit)?,
                hint_reveal_attempt: parse(
                    &lookup,
                    "HINT_REVEAL_ATTEMPT",
                    defaults.hint_reveal_attempt,
                )?,
                hint_low_time_threshold: parse(
                    &lookup,
                    "HINT_LOW_TIME_THRESHOLD",
                    defaults.hint_low_time_threshold,
                )?,
                anagram_bonus: parse(&lookup, "ANAGRAM_BONUS", defaults.anagram_bonus)?,
                anagram_bonus_time: parse(
                    &lookup,
                    "ANAGRAM_BONUS_TIME",
                    defaults.anagram_bonus_time,
                )?,
                time_boost: parse(&lookup, "TIME_BOOST", defaults.time_boost)?,
                base_score: parse(&lookup, "BASE_SCORE", defaults.base_score)?,
                attempt_weight: parse(&lookup, "ATTEMPT_WEIGHT", defaults.attempt_weight)?,
            },
        })
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {} '{}': {}", key, value, e)),
        None => Ok(default),
    }
}
