use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use game_types::{
    AdvanceOutcome, BoostResponse, GuessOutcome, HintResponse, Resource, RoundError, RoundId,
    RoundSnapshot, RoundStatus, ShuffleResponse, TimerStatus, WordResult,
};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Dictionary, GameConfig, PuzzleDefinition, ScoringEngine, is_anagram_solution, jumble, reshuffle};

/// Mutable state of one round. Every change goes through a transition method,
/// each of which takes the current monotonic time explicitly.
#[derive(Debug, Clone)]
pub struct RoundState {
    round_id: RoundId,
    share_id: String,
    puzzle_id: String,
    theme: String,
    theme_reflection: String,
    words: Vec<String>,
    hints: Vec<String>,
    jumbled_words: Vec<String>,
    current_word_index: usize,
    score: u32,
    attempt_number: u32,
    hint_revealed: bool,
    shuffles_remaining: u32,
    time_boost_available: bool,
    word_started_at: Instant,
    word_time_budget: u32,
    word_resolved: bool, // Active slot already has a solved or failed record
    used_anagrams: HashSet<String>,
    results: Vec<WordResult>,
    completed: bool,
    started_on: DateTime<Utc>,
    started_at: Instant,
    completed_at: Option<Instant>,
    config: GameConfig,
    scoring: ScoringEngine,
}

impl RoundState {
    pub fn start<R: Rng + ?Sized>(
        puzzle: &PuzzleDefinition,
        config: GameConfig,
        now: Instant,
        rng: &mut R,
    ) -> Self {
        let (words, hints): (Vec<String>, Vec<String>) =
            puzzle.presentation_order().into_iter().unzip();
        let jumbled_words = words.iter().map(|word| jumble(word, rng).letters).collect();
        let completed = words.is_empty();

        let round = Self {
            round_id: Uuid::new_v4(),
            share_id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            puzzle_id: puzzle.id.clone(),
            theme: puzzle.theme.clone(),
            theme_reflection: puzzle.theme_reflection.clone(),
            words,
            hints,
            jumbled_words,
            current_word_index: 0,
            score: 0,
            attempt_number: 1,
            hint_revealed: false,
            shuffles_remaining: config.shuffle_limit,
            time_boost_available: true,
            word_started_at: now,
            word_time_budget: config.word_time_limit,
            word_resolved: false,
            used_anagrams: HashSet::new(),
            results: Vec::new(),
            completed,
            started_on: Utc::now(),
            started_at: now,
            completed_at: completed.then_some(now),
            scoring: ScoringEngine::new(&config),
            config,
        };

        info!(
            "Started round {} with puzzle {} ({} words)",
            round.round_id,
            round.puzzle_id,
            round.words.len()
        );
        round
    }

    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    pub fn share_id(&self) -> &str {
        &self.share_id
    }

    pub fn puzzle_id(&self) -> &str {
        &self.puzzle_id
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn theme_reflection(&self) -> &str {
        &self.theme_reflection
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn jumbled_words(&self) -> &[String] {
        &self.jumbled_words
    }

    pub fn current_word_index(&self) -> usize {
        self.current_word_index
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.current_word_index).map(String::as_str)
    }

    pub fn current_jumble(&self) -> Option<&str> {
        self.jumbled_words.get(self.current_word_index).map(String::as_str)
    }

    pub fn current_hint(&self) -> Option<&str> {
        self.hints.get(self.current_word_index).map(String::as_str)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    pub fn hint_revealed(&self) -> bool {
        self.hint_revealed
    }

    pub fn shuffles_remaining(&self) -> u32 {
        self.shuffles_remaining
    }

    pub fn time_boost_available(&self) -> bool {
        self.time_boost_available
    }

    pub fn used_anagrams(&self) -> &HashSet<String> {
        &self.used_anagrams
    }

    pub fn results(&self) -> &[WordResult] {
        &self.results
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn started_on(&self) -> DateTime<Utc> {
        self.started_on
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    /// Whole seconds between the first word and completion
    pub fn total_time(&self) -> Option<u32> {
        self.completed_at
            .map(|end| end.saturating_duration_since(self.started_at).as_secs() as u32)
    }

    pub fn words_solved(&self) -> u32 {
        self.results.iter().filter(|r| r.solved).count() as u32
    }

    pub fn time_remaining(&self, now: Instant) -> u32 {
        self.word_time_budget.saturating_sub(self.elapsed(now))
    }

    fn elapsed(&self, now: Instant) -> u32 {
        now.saturating_duration_since(self.word_started_at).as_secs() as u32
    }

    fn ensure_in_progress(&self) -> Result<(), RoundError> {
        if self.completed {
            return Err(RoundError::invalid_state("Round is already completed"));
        }
        Ok(())
    }

    /// Attempt counter, hint and timer go back to the start of a word
    fn reset_word_cycle(&mut self, now: Instant) {
        self.attempt_number = 1;
        self.hint_revealed = false;
        self.word_started_at = now;
        self.word_time_budget = self.config.word_time_limit;
    }

    fn extend_budget(&mut self, seconds: u32) {
        self.word_time_budget = self.word_time_budget.saturating_add(seconds);
    }

    fn active(&self) -> Result<(String, String), RoundError> {
        match (self.current_word(), self.current_jumble()) {
            (Some(word), Some(jumbled)) => Ok((word.to_string(), jumbled.to_string())),
            _ => Err(RoundError::invalid_state("No active word")),
        }
    }

    fn reveal(&mut self) -> Option<String> {
        if self.hint_revealed {
            return None;
        }
        self.hint_revealed = true;
        self.current_hint().map(str::to_string)
    }

    pub fn submit_guess(
        &mut self,
        raw_guess: &str,
        dictionary: &dyn Dictionary,
        now: Instant,
    ) -> Result<GuessOutcome, RoundError> {
        self.ensure_in_progress()?;
        let (target, jumbled) = self.active()?;
        let guess = raw_guess.trim().to_lowercase();
        let time_remaining = self.time_remaining(now);
        let elapsed = self.elapsed(now);
        let feedback = ScoringEngine::evaluate_guess(&guess, &target);

        let mut outcome = GuessOutcome {
            is_correct: false,
            is_anagram: false,
            already_used_anagram: false,
            correct_word: target.clone(),
            time_remaining,
            attempt_number: self.attempt_number,
            feedback,
            points_earned: None,
            new_score: None,
            hint_revealed: self.hint_revealed,
            hint: None,
            out_of_attempts: false,
        };

        if guess == target {
            let points = if self.word_resolved {
                0
            } else {
                self.scoring.score_for_word(time_remaining, self.attempt_number)
            };
            if !self.word_resolved {
                self.results.push(WordResult {
                    word: target.clone(),
                    jumbled,
                    solved: true,
                    attempts: self.attempt_number,
                    time_taken: elapsed,
                    points,
                    anagram_word: None,
                });
                self.word_resolved = true;
                self.score = self.score.saturating_add(points);
            }
            self.reset_word_cycle(now);

            outcome.is_correct = true;
            outcome.points_earned = Some(points);
            outcome.new_score = Some(self.score);
            debug!("Round {}: solved '{}' for {} points", self.round_id, target, points);
        } else if is_anagram_solution(&guess, &target, dictionary) {
            if self.used_anagrams.contains(&guess) {
                outcome.already_used_anagram = true;
            } else {
                let bonus = self.scoring.anagram_bonus();
                self.used_anagrams.insert(guess.clone());
                self.results.push(WordResult {
                    word: target.clone(),
                    jumbled,
                    solved: false,
                    attempts: self.attempt_number,
                    time_taken: elapsed,
                    points: bonus,
                    anagram_word: Some(guess.clone()),
                });
                self.score = self.score.saturating_add(bonus);
                self.extend_budget(self.config.anagram_bonus_time);
                outcome.is_anagram = true;
                outcome.hint = self.reveal();
                outcome.points_earned = Some(bonus);
                outcome.new_score = Some(self.score);
                debug!("Round {}: anagram '{}' for '{}'", self.round_id, guess, target);
            }
        } else {
            self.attempt_number += 1;
            if self.attempt_number >= self.config.hint_reveal_attempt {
                outcome.hint = self.reveal();
            }
            if self.attempt_number > self.config.max_attempts {
                if !self.word_resolved {
                    self.results.push(WordResult {
                        word: target.clone(),
                        jumbled,
                        solved: false,
                        attempts: self.config.max_attempts,
                        time_taken: elapsed,
                        points: 0,
                        anagram_word: None,
                    });
                    self.word_resolved = true;
                }
                self.reset_word_cycle(now);
                outcome.out_of_attempts = true;
                debug!("Round {}: attempts exhausted on '{}'", self.round_id, target);
            }
        }

        outcome.time_remaining = self.time_remaining(now);
        outcome.attempt_number = self.attempt_number;
        outcome.hint_revealed = self.hint_revealed;
        Ok(outcome)
    }

    pub fn reveal_hint(&mut self) -> Result<HintResponse, RoundError> {
        self.ensure_in_progress()?;
        let hint = self
            .current_hint()
            .ok_or_else(|| RoundError::invalid_state("No active word"))?
            .to_string();
        self.hint_revealed = true;
        Ok(HintResponse { hint })
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<ShuffleResponse, RoundError> {
        self.ensure_in_progress()?;
        if self.shuffles_remaining == 0 {
            return Err(RoundError::ExhaustedResource {
                resource: Resource::Shuffles,
            });
        }

        let (word, current) = self.active()?;
        let jumbled_word = reshuffle(&word, &current, rng).ok_or(RoundError::ExhaustedResource {
            resource: Resource::Arrangements,
        })?;

        self.jumbled_words[self.current_word_index] = jumbled_word.clone();
        self.shuffles_remaining -= 1;
        Ok(ShuffleResponse {
            jumbled_word,
            shuffles_remaining: self.shuffles_remaining,
        })
    }

    pub fn boost_time(&mut self, now: Instant) -> Result<BoostResponse, RoundError> {
        self.ensure_in_progress()?;
        if !self.time_boost_available {
            return Err(RoundError::AlreadyConsumed {
                resource: Resource::TimeBoost,
            });
        }

        self.time_boost_available = false;
        self.extend_budget(self.config.time_boost);
        Ok(BoostResponse {
            time_remaining: self.time_remaining(now),
            boost_amount: self.config.time_boost,
        })
    }

    pub fn advance_word(&mut self, now: Instant) -> Result<AdvanceOutcome, RoundError> {
        self.ensure_in_progress()?;
        let (word, jumbled) = self.active()?;

        if !self.word_resolved {
            self.results.push(WordResult {
                word,
                jumbled,
                solved: false,
                attempts: self.attempt_number - 1,
                time_taken: self.elapsed(now),
                points: 0,
                anagram_word: None,
            });
        }

        self.current_word_index += 1;
        self.reset_word_cycle(now);
        self.shuffles_remaining = self.config.shuffle_limit;
        self.word_resolved = false;

        if self.current_word_index >= self.words.len() {
            self.completed = true;
            self.completed_at = Some(now);
            info!(
                "Round {} completed with score {} ({}/{} solved)",
                self.round_id,
                self.score,
                self.words_solved(),
                self.words.len()
            );
            return Ok(AdvanceOutcome::Completed {
                round_id: self.round_id,
            });
        }

        Ok(AdvanceOutcome::Next {
            snapshot: self.snapshot(now),
        })
    }

    pub fn poll_timer(&mut self, now: Instant) -> Result<TimerStatus, RoundError> {
        self.ensure_in_progress()?;
        let time_remaining = self.time_remaining(now);

        let mut hint = None;
        if time_remaining <= self.config.hint_low_time_threshold
            || self.attempt_number >= self.config.hint_reveal_attempt
        {
            hint = self.reveal();
        }

        Ok(TimerStatus {
            time_remaining,
            time_expired: time_remaining == 0,
            hint_just_revealed: hint.is_some(),
            hint,
        })
    }

    pub fn snapshot(&self, now: Instant) -> RoundSnapshot {
        let status = if self.completed {
            RoundStatus::Completed
        } else {
            RoundStatus::InProgress
        };
        let active = !self.completed;

        RoundSnapshot {
            round_id: self.round_id,
            share_id: self.share_id.clone(),
            status,
            theme: self.theme.clone(),
            current_word_index: self.current_word_index as u32,
            total_words: self.words.len() as u32,
            jumbled_word: self.current_jumble().filter(|_| active).map(str::to_string),
            word_length: self
                .current_word()
                .filter(|_| active)
                .map(|word| word.chars().count() as u32),
            score: self.score,
            attempt_number: self.attempt_number,
            remaining_attempts: (self.config.max_attempts + 1).saturating_sub(self.attempt_number),
            hint_revealed: self.hint_revealed,
            hint: self
                .current_hint()
                .filter(|_| active && self.hint_revealed)
                .map(str::to_string),
            words_solved: self.words_solved(),
            time_remaining: if active { self.time_remaining(now) } else { 0 },
            shuffle_limit: self.config.shuffle_limit,
            shuffles_remaining: self.shuffles_remaining,
            time_boost_available: self.time_boost_available,
            time_boost_amount: self.config.time_boost,
            bonus_time: self.word_time_budget.saturating_sub(self.config.word_time_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WordValidator, is_letter_permutation};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn start(words: &[(&str, &str)], now: Instant) -> RoundState {
        let puzzle = PuzzleDefinition::new("test", "Test Theme", "A reflection", words);
        let mut rng = StdRng::seed_from_u64(11);
        RoundState::start(&puzzle, GameConfig::default(), now, &mut rng)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_start_orders_and_jumbles_words() {
        let t0 = Instant::now();
        let round = start(&[("parrot", "bird"), ("cat", "feline pet"), ("dog", "canine")], t0);

        assert_eq!(round.words(), &["cat", "dog", "parrot"]);
        assert_eq!(round.current_hint(), Some("feline pet"));
        for (word, jumbled) in round.words().iter().zip(round.jumbled_words()) {
            assert_ne!(word, jumbled);
            assert!(is_letter_permutation(word, jumbled));
        }
        assert_eq!(round.attempt_number(), 1);
        assert_eq!(round.shuffles_remaining(), 2);
        assert!(round.time_boost_available());
        assert!(!round.is_completed());
        assert_eq!(round.share_id().len(), 8);
        assert_eq!(round.time_remaining(t0), 30);
    }

    #[test]
    fn test_exact_match_at_five_seconds_scores_95() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        let outcome = round.submit_guess("  CAT ", &dictionary, t0 + secs(5)).unwrap();

        assert!(outcome.is_correct);
        assert_eq!(outcome.points_earned, Some(95));
        assert_eq!(outcome.new_score, Some(95));
        assert_eq!(outcome.attempt_number, 1);
        assert_eq!(outcome.time_remaining, 30);
        assert_eq!(round.score(), 95);
        assert_eq!(round.current_word_index(), 0);
        assert_eq!(round.results().len(), 1);
        assert!(round.results()[0].solved);
        assert_eq!(round.results()[0].time_taken, 5);
    }

    #[test]
    fn test_solved_word_does_not_score_twice() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        round.submit_guess("cat", &dictionary, t0).unwrap();
        let again = round.submit_guess("cat", &dictionary, t0 + secs(1)).unwrap();

        assert!(again.is_correct);
        assert_eq!(again.points_earned, Some(0));
        assert_eq!(round.score(), 100);
        assert_eq!(round.results().len(), 1);
    }

    #[test]
    fn test_late_guess_is_accepted_without_time_bonus() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        let outcome = round.submit_guess("cat", &dictionary, t0 + secs(120)).unwrap();
        assert_eq!(outcome.points_earned, Some(70));
    }

    #[test]
    fn test_shuffle_limit_then_exhausted() {
        let t0 = Instant::now();
        let mut round = start(&[("train", "rail transport")], t0);
        let mut rng = StdRng::seed_from_u64(3);

        for expected_remaining in [1, 0] {
            let before = round.current_jumble().unwrap().to_string();
            let response = round.shuffle(&mut rng).unwrap();
            assert_ne!(response.jumbled_word, before);
            assert_ne!(response.jumbled_word, "train");
            assert!(is_letter_permutation(&response.jumbled_word, "train"));
            assert_eq!(response.shuffles_remaining, expected_remaining);
        }

        let err = round.shuffle(&mut rng).unwrap_err();
        assert_eq!(
            err,
            RoundError::ExhaustedResource {
                resource: Resource::Shuffles
            }
        );
    }

    #[test]
    fn test_shuffle_without_new_arrangement_keeps_budget() {
        let t0 = Instant::now();
        let mut round = start(&[("ox", "farm animal")], t0);
        let mut rng = StdRng::seed_from_u64(3);

        let err = round.shuffle(&mut rng).unwrap_err();
        assert_eq!(
            err,
            RoundError::ExhaustedResource {
                resource: Resource::Arrangements
            }
        );
        assert_eq!(round.shuffles_remaining(), 2);
    }

    #[test]
    fn test_three_misses_fail_the_word_and_restart_attempts() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        let first = round.submit_guess("xxx", &dictionary, t0 + secs(1)).unwrap();
        assert_eq!(first.attempt_number, 2);
        assert!(!first.hint_revealed);

        let second = round.submit_guess("yyy", &dictionary, t0 + secs(2)).unwrap();
        assert_eq!(second.attempt_number, 3);
        assert!(second.hint_revealed);
        assert_eq!(second.hint.as_deref(), Some("feline pet"));

        let third = round.submit_guess("zzz", &dictionary, t0 + secs(3)).unwrap();
        assert!(third.out_of_attempts);
        assert_eq!(third.attempt_number, 1);
        assert_eq!(third.hint, None);

        assert_eq!(round.results().len(), 1);
        let failed = &round.results()[0];
        assert!(!failed.solved);
        assert_eq!(failed.points, 0);
        assert_eq!(failed.attempts, 3);
        assert_eq!(round.score(), 0);
        assert_eq!(round.current_word_index(), 0);

        // A fresh cycle can still be exhausted without a second failed record
        for guess in ["a", "b", "c"] {
            round.submit_guess(guess, &dictionary, t0 + secs(4)).unwrap();
        }
        assert_eq!(round.results().len(), 1);
    }

    #[test]
    fn test_empty_guess_counts_as_miss() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        let outcome = round.submit_guess("   ", &dictionary, t0).unwrap();
        assert!(!outcome.is_correct);
        assert!(outcome.feedback.is_empty());
        assert_eq!(outcome.attempt_number, 2);
    }

    #[test]
    fn test_anagram_credit_once() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        let outcome = round.submit_guess("act", &dictionary, t0).unwrap();
        assert!(outcome.is_anagram);
        assert!(!outcome.already_used_anagram);
        assert_eq!(outcome.points_earned, Some(10));
        assert_eq!(outcome.time_remaining, 40);
        assert_eq!(outcome.attempt_number, 1);
        assert!(outcome.hint_revealed);
        assert_eq!(outcome.hint.as_deref(), Some("feline pet"));
        assert_eq!(round.score(), 10);
        assert!(round.results()[0].is_anagram());

        let again = round.submit_guess("ACT", &dictionary, t0 + secs(1)).unwrap();
        assert!(again.already_used_anagram);
        assert!(!again.is_anagram);
        assert_eq!(again.points_earned, None);
        assert_eq!(again.time_remaining, 39);
        assert_eq!(round.score(), 10);
        assert_eq!(round.results().len(), 1);
    }

    #[test]
    fn test_time_boost_once_per_round() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet"), ("dog", "canine")], t0);

        let boost = round.boost_time(t0 + secs(10)).unwrap();
        assert_eq!(boost.time_remaining, 35);
        assert_eq!(boost.boost_amount, 15);
        assert_eq!(round.snapshot(t0 + secs(10)).bonus_time, 15);

        let err = round.boost_time(t0 + secs(11)).unwrap_err();
        assert_eq!(
            err,
            RoundError::AlreadyConsumed {
                resource: Resource::TimeBoost
            }
        );

        round.advance_word(t0 + secs(12)).unwrap();
        assert!(round.boost_time(t0 + secs(13)).is_err());
    }

    #[test]
    fn test_boost_after_expiry_adds_flat_amount() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        let boost = round.boost_time(t0 + secs(50)).unwrap();
        assert_eq!(boost.time_remaining, 0);
        assert_eq!(round.snapshot(t0 + secs(50)).bonus_time, 15);

        let outcome = round.submit_guess("cat", &dictionary, t0 + secs(50)).unwrap();
        assert_eq!(outcome.points_earned, Some(70));
    }

    #[test]
    fn test_anagram_bonus_time_after_expiry() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();

        let outcome = round.submit_guess("act", &dictionary, t0 + secs(50)).unwrap();
        assert!(outcome.is_anagram);
        assert_eq!(outcome.time_remaining, 0);
        assert_eq!(round.time_remaining(t0 + secs(39)), 1);
    }

    #[test]
    fn test_score_saturates_with_huge_config() {
        let t0 = Instant::now();
        let config = GameConfig {
            base_score: u32::MAX,
            ..GameConfig::default()
        };
        let puzzle = PuzzleDefinition::new("pets", "Pets", "", &[("cat", "feline pet"), ("dog", "canine")]);
        let mut rng = StdRng::seed_from_u64(11);
        let mut round = RoundState::start(&puzzle, config, t0, &mut rng);
        let dictionary = WordValidator::new_with_test_words();

        round.submit_guess("cat", &dictionary, t0).unwrap();
        round.advance_word(t0).unwrap();
        let outcome = round.submit_guess("dog", &dictionary, t0).unwrap();
        assert_eq!(outcome.new_score, Some(u32::MAX));
    }

    #[test]
    fn test_advance_through_round() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet"), ("stop", "halt")], t0);
        let dictionary = WordValidator::new_with_test_words();
        let mut rng = StdRng::seed_from_u64(5);

        round.submit_guess("cat", &dictionary, t0 + secs(2)).unwrap();
        round.shuffle(&mut rng).unwrap();

        match round.advance_word(t0 + secs(3)).unwrap() {
            AdvanceOutcome::Next { snapshot } => {
                assert_eq!(snapshot.current_word_index, 1);
                assert_eq!(snapshot.word_length, Some(4));
                assert_eq!(snapshot.shuffles_remaining, 2);
                assert_eq!(snapshot.attempt_number, 1);
                assert!(!snapshot.hint_revealed);
            }
            other => panic!("Expected next word, got {:?}", other),
        }

        round.submit_guess("nope", &dictionary, t0 + secs(4)).unwrap();
        match round.advance_word(t0 + secs(9)).unwrap() {
            AdvanceOutcome::Completed { round_id } => assert_eq!(round_id, round.round_id()),
            other => panic!("Expected completion, got {:?}", other),
        }

        assert!(round.is_completed());
        assert_eq!(round.results().iter().filter(|r| r.is_terminal()).count(), 2);
        let skipped = &round.results()[1];
        assert!(!skipped.solved);
        assert_eq!(skipped.attempts, 1);
        assert_eq!(skipped.time_taken, 6);
        assert_eq!(round.total_time(), Some(9));

        let snapshot = round.snapshot(t0 + secs(10));
        assert_eq!(snapshot.status, RoundStatus::Completed);
        assert_eq!(snapshot.jumbled_word, None);
    }

    #[test]
    fn test_completed_round_rejects_transitions() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);
        let dictionary = WordValidator::new_with_test_words();
        let mut rng = StdRng::seed_from_u64(5);

        round.advance_word(t0).unwrap();
        assert!(round.is_completed());

        let is_invalid = |err: RoundError| matches!(err, RoundError::InvalidRoundState { .. });
        assert!(is_invalid(round.advance_word(t0).unwrap_err()));
        assert!(is_invalid(round.submit_guess("cat", &dictionary, t0).unwrap_err()));
        assert!(is_invalid(round.reveal_hint().unwrap_err()));
        assert!(is_invalid(round.shuffle(&mut rng).unwrap_err()));
        assert!(is_invalid(round.boost_time(t0).unwrap_err()));
        assert!(is_invalid(round.poll_timer(t0).unwrap_err()));
    }

    #[test]
    fn test_empty_puzzle_starts_completed() {
        let t0 = Instant::now();
        let round = start(&[], t0);
        assert!(round.is_completed());
        assert_eq!(round.total_time(), Some(0));
        assert_eq!(round.snapshot(t0).total_words, 0);
    }

    #[test]
    fn test_poll_timer_reveals_hint_once_on_low_time() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);

        let early = round.poll_timer(t0 + secs(5)).unwrap();
        assert_eq!(early.time_remaining, 25);
        assert!(!early.hint_just_revealed);

        let low = round.poll_timer(t0 + secs(21)).unwrap();
        assert_eq!(low.time_remaining, 9);
        assert!(low.hint_just_revealed);
        assert_eq!(low.hint.as_deref(), Some("feline pet"));

        let expired = round.poll_timer(t0 + secs(31)).unwrap();
        assert!(expired.time_expired);
        assert!(!expired.hint_just_revealed);
        assert!(round.hint_revealed());
    }

    #[test]
    fn test_reveal_hint_is_idempotent() {
        let t0 = Instant::now();
        let mut round = start(&[("cat", "feline pet")], t0);

        assert_eq!(round.reveal_hint().unwrap().hint, "feline pet");
        assert_eq!(round.reveal_hint().unwrap().hint, "feline pet");
        assert!(round.snapshot(t0).hint.is_some());
    }

    #[test]
    fn test_score_never_decreases() {
        let t0 = Instant::now();
        let mut round = start(&[("stop", "halt"), ("listen", "hear")], t0);
        let dictionary = WordValidator::new_with_test_words();
        let mut rng = StdRng::seed_from_u64(9);

        let mut last = 0;
        let mut at = t0;
        for guess in ["pots", "tops", "pots", "xxxx", "stop", "stop", "yyyy"] {
            at += secs(3);
            round.submit_guess(guess, &dictionary, at).unwrap();
            assert!(round.score() >= last);
            last = round.score();
        }
        let _ = round.shuffle(&mut rng);
        round.advance_word(at).unwrap();
        for guess in ["silent", "enlist", "tinsel", "listen"] {
            at += secs(1);
            round.submit_guess(guess, &dictionary, at).unwrap();
            assert!(round.score() >= last);
            last = round.score();
        }
        round.advance_word(at).unwrap();

        assert!(round.is_completed());
        assert_eq!(round.results().iter().filter(|r| r.is_terminal()).count(), 2);
        assert_eq!(round.used_anagrams().len(), 5);
    }
}
