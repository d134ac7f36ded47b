use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{error, info};

use crate::auth::AuthenticatedPlayer;
use crate::error::ApiError;
use game_core::{Dictionary, GameConfig, PuzzleLibrary, RoundState, RoundSummarizer};
use game_persistence::repositories::{PlayerRepository, RecordOutcome, StatsRepository};
use game_types::{
    AdvanceOutcome, BoostResponse, GuessOutcome, HintResponse, ResultsResponse, RoundError,
    RoundId, RoundRecord, RoundSnapshot, ShuffleResponse, TimerStatus,
};

#[derive(Debug)]
struct ActiveRound {
    round: RoundState,
    owner: Option<AuthenticatedPlayer>,
    last_activity: Instant,
}

impl ActiveRound {
    fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }

    // Guest rounds are reachable by anyone holding the id
    fn check_access(&self, requester: Option<&AuthenticatedPlayer>) -> Result<(), ApiError> {
        match (&self.owner, requester) {
            (None, _) => Ok(()),
            (Some(owner), Some(requester)) if owner.id == requester.id => Ok(()),
            _ => Err(ApiError::Forbidden),
        }
    }
}

pub struct RoundManager {
    active_rounds: DashMap<RoundId, ActiveRound>,
    library: Arc<PuzzleLibrary>,
    dictionary: Arc<dyn Dictionary>,
    game_config: GameConfig,
    random_mode: bool,
    player_repository: Arc<PlayerRepository>,
    stats_repository: Arc<StatsRepository>,
}

impl RoundManager {
    pub fn new(
        library: Arc<PuzzleLibrary>,
        dictionary: Arc<dyn Dictionary>,
        game_config: GameConfig,
        random_mode: bool,
        player_repository: Arc<PlayerRepository>,
        stats_repository: Arc<StatsRepository>,
    ) -> Self {
        Self {
            active_rounds: DashMap::new(),
            library,
            dictionary,
            game_config,
            random_mode,
            player_repository,
            stats_repository,
        }
    }

    pub fn active_round_count(&self) -> usize {
        self.active_rounds.len()
    }

    pub fn start_round(&self, owner: Option<AuthenticatedPlayer>) -> RoundSnapshot {
        let now = Instant::now();
        let today = chrono::Utc::now().date_naive();
        let mut rng = rand::thread_rng();

        let puzzle = self.library.select(self.random_mode, today, &mut rng);
        let round = RoundState::start(puzzle, self.game_config.clone(), now, &mut rng);
        let snapshot = round.snapshot(now);

        if let Some(owner) = &owner {
            info!("Player {} started round {}", owner.id, round.round_id());
        }
        self.active_rounds.insert(
            round.round_id(),
            ActiveRound {
                round,
                owner,
                last_activity: now,
            },
        );
        snapshot
    }

    /// Runs one transition under the round's write guard
    fn with_round<T>(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
        transition: impl FnOnce(&mut RoundState, Instant) -> Result<T, RoundError>,
    ) -> Result<T, ApiError> {
        let mut entry = self
            .active_rounds
            .get_mut(&round_id)
            .ok_or_else(|| RoundError::RoundNotFound {
                round_id: round_id.to_string(),
            })?;
        entry.check_access(requester)?;
        entry.update_activity();

        let now = Instant::now();
        Ok(transition(&mut entry.round, now)?)
    }

    pub fn snapshot(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
    ) -> Result<RoundSnapshot, ApiError> {
        self.with_round(round_id, requester, |round, now| Ok(round.snapshot(now)))
    }

    pub fn submit_guess(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
        guess: &str,
    ) -> Result<GuessOutcome, ApiError> {
        let dictionary = self.dictionary.as_ref();
        self.with_round(round_id, requester, |round, now| {
            round.submit_guess(guess, dictionary, now)
        })
    }

    pub fn reveal_hint(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
    ) -> Result<HintResponse, ApiError> {
        self.with_round(round_id, requester, |round, _| round.reveal_hint())
    }

    pub fn shuffle(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
    ) -> Result<ShuffleResponse, ApiError> {
        self.with_round(round_id, requester, |round, _| {
            round.shuffle(&mut rand::thread_rng())
        })
    }

    pub fn boost_time(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
    ) -> Result<BoostResponse, ApiError> {
        self.with_round(round_id, requester, |round, now| round.boost_time(now))
    }

    pub fn advance_word(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
    ) -> Result<AdvanceOutcome, ApiError> {
        self.with_round(round_id, requester, |round, now| round.advance_word(now))
    }

    pub fn poll_timer(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
    ) -> Result<TimerStatus, ApiError> {
        self.with_round(round_id, requester, |round, now| round.poll_timer(now))
    }

    /// Results view for a completed round. Signed-in owners get the round
    /// merged into their stats once; a storage failure still returns the view.
    pub async fn results(
        &self,
        round_id: RoundId,
        requester: Option<&AuthenticatedPlayer>,
    ) -> Result<ResultsResponse, ApiError> {
        let (results, owner) = {
            let entry = self
                .active_rounds
                .get(&round_id)
                .ok_or_else(|| RoundError::RoundNotFound {
                    round_id: round_id.to_string(),
                })?;
            entry.check_access(requester)?;
            (RoundSummarizer::summarize(&entry.round)?, entry.owner.clone())
        };

        let stats_recorded = match &owner {
            Some(player) => match self.record_stats(player, &RoundRecord::from(&results)).await {
                Ok(()) => true,
                Err(err) => {
                    error!("Failed to record stats for round {}: {:#}", round_id, err);
                    false
                }
            },
            None => false,
        };

        Ok(ResultsResponse {
            results,
            is_logged_in: owner.is_some(),
            stats_recorded,
        })
    }

    async fn record_stats(
        &self,
        player: &AuthenticatedPlayer,
        record: &RoundRecord,
    ) -> anyhow::Result<()> {
        self.player_repository
            .upsert(&player.id, &player.email, &player.display_name)
            .await?;

        match self.stats_repository.record_round(&player.id, record).await? {
            RecordOutcome::Applied(stats) => {
                info!(
                    "Player {} now has {} games, best score {}",
                    player.id, stats.games_played, stats.best_score
                );
            }
            RecordOutcome::Duplicate => {}
        }
        Ok(())
    }

    pub fn cleanup_abandoned_rounds(&self, timeout: Duration) -> usize {
        let before = self.active_rounds.len();
        self.active_rounds.retain(|round_id, active| {
            let keep = !active.is_expired(timeout);
            if !keep {
                info!("Removed abandoned round {}", round_id);
            }
            keep
        });
        before.saturating_sub(self.active_rounds.len())
    }
}
