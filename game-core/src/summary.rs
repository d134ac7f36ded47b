use game_types::{RoundError, RoundResults, WordSummary};

use crate::RoundState;

/// Reduces a completed round into its results view
pub struct RoundSummarizer;

impl RoundSummarizer {
    pub fn summarize(round: &RoundState) -> Result<RoundResults, RoundError> {
        if !round.is_completed() {
            return Err(RoundError::invalid_state("Round is still in progress"));
        }

        let mut results: Vec<WordSummary> = round
            .words()
            .iter()
            .map(|word| WordSummary {
                word: word.clone(),
                solved: false,
                attempts: 0,
                time_taken: 0,
                points: 0,
                anagrams: Vec::new(),
            })
            .collect();

        for record in round.results() {
            let Some(entry) = results.iter_mut().find(|entry| entry.word == record.word) else {
                continue;
            };
            match &record.anagram_word {
                Some(anagram) => {
                    entry.anagrams.push(anagram.clone());
                    entry.points += record.points;
                }
                None => {
                    entry.solved = record.solved;
                    entry.attempts = record.attempts;
                    entry.time_taken = record.time_taken;
                    entry.points += record.points;
                }
            }
        }

        let config = round.config();
        let total_anagrams = results.iter().map(|r| r.anagrams.len() as u32).sum();

        Ok(RoundResults {
            round_id: round.round_id(),
            share_id: round.share_id().to_string(),
            puzzle_id: round.puzzle_id().to_string(),
            theme: round.theme().to_string(),
            theme_reflection: round.theme_reflection().to_string(),
            score: round.score(),
            max_score: round
                .scoring()
                .max_possible_score(round.words().len(), config.word_time_limit),
            words_solved: round.words_solved(),
            total_words: round.words().len() as u32,
            total_anagrams,
            time_limit: config.word_time_limit,
            total_time: round.total_time().unwrap_or(0),
            date: round.started_on().format("%B %d, %Y").to_string(),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameConfig, PuzzleDefinition, WordValidator};
    use game_types::RoundRecord;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::{Duration, Instant};

    fn played_round() -> RoundState {
        let puzzle = PuzzleDefinition::new(
            "7",
            "Kitchen",
            "Every meal starts somewhere.",
            &[("heart", "organ"), ("cat", "feline pet")],
        );
        let mut rng = StdRng::seed_from_u64(1);
        let dictionary = WordValidator::new_with_test_words();
        let t0 = Instant::now();
        let mut round = RoundState::start(&puzzle, GameConfig::default(), t0, &mut rng);

        // cat: anagram then solve on attempt 2
        round.submit_guess("act", &dictionary, t0 + Duration::from_secs(2)).unwrap();
        round.submit_guess("tac", &dictionary, t0 + Duration::from_secs(4)).unwrap();
        round.submit_guess("cab", &dictionary, t0 + Duration::from_secs(6)).unwrap();
        round.submit_guess("cat", &dictionary, t0 + Duration::from_secs(8)).unwrap();
        round.advance_word(t0 + Duration::from_secs(9)).unwrap();

        // heart: one anagram, then skipped
        round.submit_guess("earth", &dictionary, t0 + Duration::from_secs(12)).unwrap();
        round.advance_word(t0 + Duration::from_secs(20)).unwrap();
        round
    }

    #[test]
    fn test_summary_groups_records_by_word() {
        let round = played_round();
        let results = RoundSummarizer::summarize(&round).unwrap();

        assert_eq!(results.total_words, 2);
        assert_eq!(results.words_solved, 1);
        assert_eq!(results.total_anagrams, 3);
        assert_eq!(results.theme, "Kitchen");
        assert_eq!(results.puzzle_id, "7");
        assert_eq!(results.time_limit, 30);
        assert_eq!(results.total_time, 20);
        assert_eq!(results.max_score, 200);

        let cat = &results.results[0];
        assert_eq!(cat.word, "cat");
        assert!(cat.solved);
        assert_eq!(cat.attempts, 2);
        assert_eq!(cat.anagrams, vec!["act", "tac"]);

        let heart = &results.results[1];
        assert_eq!(heart.word, "heart");
        assert!(!heart.solved);
        assert_eq!(heart.anagrams, vec!["earth"]);
        assert_eq!(heart.points, 10);

        let per_word: u32 = results.results.iter().map(|r| r.points).sum();
        assert_eq!(per_word, results.score);
    }

    #[test]
    fn test_summary_is_repeatable() {
        let round = played_round();
        let first = RoundSummarizer::summarize(&round).unwrap();
        let second = RoundSummarizer::summarize(&round).unwrap();
        assert_eq!(first, second);

        let record = RoundRecord::from(&first);
        assert_eq!(record.round_id, round.round_id());
        assert_eq!(record.anagrams_found, 3);
        assert_eq!(record.score, first.score);
    }

    #[test]
    fn test_summary_requires_completed_round() {
        let puzzle = PuzzleDefinition::new("1", "Pets", "", &[("cat", "feline pet")]);
        let mut rng = StdRng::seed_from_u64(1);
        let round = RoundState::start(&puzzle, GameConfig::default(), Instant::now(), &mut rng);

        let err = RoundSummarizer::summarize(&round).unwrap_err();
        assert!(matches!(err, RoundError::InvalidRoundState { .. }));
    }
}
