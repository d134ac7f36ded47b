mod common;

use common::*;
use game_core::{RoundSummarizer, ScoringEngine};
use game_types::{AdvanceOutcome, RoundError, RoundStatus};
use std::time::Instant;

#[test]
fn test_words_presented_shortest_first() {
    let round = start_round(Instant::now());
    assert_eq!(round.words(), &["cat", "stop", "heart", "listen"]);
}

#[test]
fn test_full_round_playthrough() {
    let t0 = Instant::now();
    let mut round = start_round(t0);
    let dictionary = create_test_validator();

    // cat: solved immediately at 5s for 95
    let outcome = round.submit_guess("cat", &dictionary, after(t0, 5)).unwrap();
    assert_eq!(outcome.points_earned, Some(95));
    round.advance_word(after(t0, 6)).unwrap();

    // stop: two anagrams then solved on attempt 1
    round.submit_guess("pots", &dictionary, after(t0, 8)).unwrap();
    round.submit_guess("tops", &dictionary, after(t0, 10)).unwrap();
    let outcome = round.submit_guess("stop", &dictionary, after(t0, 12)).unwrap();
    // 6s elapsed against a 50s budget
    assert_eq!(outcome.points_earned, Some(40 + 44 + 30));
    round.advance_word(after(t0, 13)).unwrap();

    // heart: exhaust attempts, then move on
    for guess in ["aaaaa", "bbbbb", "ccccc"] {
        round.submit_guess(guess, &dictionary, after(t0, 15)).unwrap();
    }
    round.advance_word(after(t0, 16)).unwrap();

    // listen: boost then skip
    round.boost_time(after(t0, 17)).unwrap();
    match round.advance_word(after(t0, 20)).unwrap() {
        AdvanceOutcome::Completed { .. } => {}
        other => panic!("Expected completion, got {:?}", other),
    }

    assert_one_terminal_per_word(&round);
    assert_eq!(round.snapshot(after(t0, 21)).status, RoundStatus::Completed);

    let results = RoundSummarizer::summarize(&round).unwrap();
    assert_eq!(results.score, 95 + 20 + 114);
    assert_eq!(results.words_solved, 2);
    assert_eq!(results.total_anagrams, 2);
    assert_eq!(results.total_time, 20);
    assert_eq!(
        results.max_score,
        ScoringEngine::default().score_for_word(30, 1) * 4
    );
    assert_eq!(results.results[2].attempts, 3);
    assert!(!results.results[3].solved);
}

#[test]
fn test_results_unavailable_until_completed() {
    let t0 = Instant::now();
    let mut round = start_round(t0);

    for n in 0..3 {
        round.advance_word(after(t0, n)).unwrap();
        assert!(matches!(
            RoundSummarizer::summarize(&round),
            Err(RoundError::InvalidRoundState { .. })
        ));
    }
    round.advance_word(after(t0, 3)).unwrap();
    assert!(RoundSummarizer::summarize(&round).is_ok());
    assert!(round.advance_word(after(t0, 4)).is_err());
}

#[test]
fn test_random_and_daily_selection() {
    let library = create_test_library();
    let mut rng = seeded_rng();
    let today = chrono::Utc::now().date_naive();

    let daily = library.select(false, today, &mut rng).id.clone();
    assert_eq!(library.daily(today).id, daily);
    let random = library.select(true, today, &mut rng);
    assert!(random.id == "1" || random.id == "2");
}
