use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;

use crate::auth::{AuthService, AuthenticatedPlayer};
use crate::error::ApiError;
use crate::round_manager::RoundManager;
use game_persistence::repositories::{PlayerRepository, StatsRepository};
use game_types::{GuessRequest, Player, PlayerStatsView, RoundId, ScreenNameRequest};

pub mod auth;
pub mod config;
pub mod error;
pub mod profile;
pub mod round_manager;

const DEFAULT_LEADERBOARD_LIMIT: u64 = 5;
const MAX_LEADERBOARD_LIMIT: u64 = 100;

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<u64>,
}

/// Round operations that take no request body
#[derive(Debug, Clone, Copy)]
enum RoundAction {
    Snapshot,
    Hint,
    Shuffle,
    Boost,
    Advance,
    Timer,
}

pub fn create_routes(
    round_manager: Arc<RoundManager>,
    auth_service: Arc<AuthService>,
    player_repository: Arc<PlayerRepository>,
    stats_repository: Arc<StatsRepository>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let round_manager_filter = warp::any().map({
        let round_manager = round_manager.clone();
        move || round_manager.clone()
    });

    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let player_repository_filter = warp::any().map({
        let player_repository = player_repository.clone();
        move || player_repository.clone()
    });

    let stats_repository_filter = warp::any().map({
        let stats_repository = stats_repository.clone();
        move || stats_repository.clone()
    });

    let action = |action: RoundAction| warp::any().map(move || action);

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let start_round = warp::path!("rounds")
        .and(warp::post())
        .and(authorization())
        .and(round_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_start_round);

    let snapshot = warp::path!("rounds" / String)
        .and(warp::get())
        .and(action(RoundAction::Snapshot));
    let hint = warp::path!("rounds" / String / "hint")
        .and(warp::post())
        .and(action(RoundAction::Hint));
    let shuffle = warp::path!("rounds" / String / "shuffle")
        .and(warp::post())
        .and(action(RoundAction::Shuffle));
    let boost = warp::path!("rounds" / String / "boost")
        .and(warp::post())
        .and(action(RoundAction::Boost));
    let advance = warp::path!("rounds" / String / "advance")
        .and(warp::post())
        .and(action(RoundAction::Advance));
    let timer = warp::path!("rounds" / String / "timer")
        .and(warp::get())
        .and(action(RoundAction::Timer));

    let round_actions = snapshot
        .or(hint)
        .unify()
        .or(shuffle)
        .unify()
        .or(boost)
        .unify()
        .or(advance)
        .unify()
        .or(timer)
        .unify()
        .and(authorization())
        .and(round_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_round_action);

    let guess = warp::path!("rounds" / String / "guess")
        .and(warp::post())
        .and(authorization())
        .and(warp::body::content_length_limit(4 * 1024))
        .and(warp::body::json::<GuessRequest>())
        .and(round_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_guess);

    let results = warp::path!("rounds" / String / "results")
        .and(warp::get())
        .and(authorization())
        .and(round_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_results);

    let player_stats = warp::path!("players" / "me" / "stats")
        .and(warp::get())
        .and(authorization())
        .and(auth_filter.clone())
        .and(player_repository_filter.clone())
        .and(stats_repository_filter.clone())
        .and_then(handle_player_stats);

    let screen_name = warp::path!("players" / "me" / "name")
        .and(warp::put())
        .and(authorization())
        .and(warp::body::content_length_limit(4 * 1024))
        .and(warp::body::json::<ScreenNameRequest>())
        .and(auth_filter.clone())
        .and(player_repository_filter.clone())
        .and_then(handle_screen_name);

    let leaderboard = warp::path("leaderboard")
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(authorization())
        .and(auth_filter.clone())
        .and(player_repository_filter.clone())
        .and_then(handle_leaderboard_request);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(start_round)
        .or(guess)
        .or(results)
        .or(round_actions)
        .or(player_stats)
        .or(screen_name)
        .or(leaderboard)
        .with(cors)
        .with(warp::log("twistle"))
}

fn authorization() -> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization")
}

fn reply<T: Serialize>(result: Result<T, ApiError>) -> warp::reply::WithStatus<warp::reply::Json> {
    match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), StatusCode::OK),
        Err(err) => err.into_reply(),
    }
}

fn parse_round_id(round_id: &str) -> Result<RoundId, ApiError> {
    Uuid::parse_str(round_id).map_err(|_| ApiError::BadRequest("Invalid round ID format".to_string()))
}

async fn require_player(
    auth_service: &AuthService,
    auth_header: Option<String>,
) -> Result<AuthenticatedPlayer, ApiError> {
    auth_service
        .authenticate(auth_header)
        .await?
        .ok_or(ApiError::Unauthenticated)
}

async fn handle_start_round(
    auth_header: Option<String>,
    round_manager: Arc<RoundManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match auth_service.authenticate(auth_header).await {
        Ok(player) => Ok(round_manager.start_round(player)),
        Err(err) => Err(ApiError::from(err)),
    };
    Ok(reply(result))
}

async fn handle_round_action(
    round_id: String,
    action: RoundAction,
    auth_header: Option<String>,
    round_manager: Arc<RoundManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let round_id = match parse_round_id(&round_id) {
        Ok(round_id) => round_id,
        Err(err) => return Ok(err.into_reply()),
    };
    let player = match auth_service.authenticate(auth_header).await {
        Ok(player) => player,
        Err(err) => return Ok(ApiError::from(err).into_reply()),
    };
    let player = player.as_ref();

    Ok(match action {
        RoundAction::Snapshot => reply(round_manager.snapshot(round_id, player)),
        RoundAction::Hint => reply(round_manager.reveal_hint(round_id, player)),
        RoundAction::Shuffle => reply(round_manager.shuffle(round_id, player)),
        RoundAction::Boost => reply(round_manager.boost_time(round_id, player)),
        RoundAction::Advance => reply(round_manager.advance_word(round_id, player)),
        RoundAction::Timer => reply(round_manager.poll_timer(round_id, player)),
    })
}

async fn handle_guess(
    round_id: String,
    auth_header: Option<String>,
    request: GuessRequest,
    round_manager: Arc<RoundManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let round_id = match parse_round_id(&round_id) {
        Ok(round_id) => round_id,
        Err(err) => return Ok(err.into_reply()),
    };
    let result = match auth_service.authenticate(auth_header).await {
        Ok(player) => round_manager.submit_guess(round_id, player.as_ref(), &request.guess),
        Err(err) => Err(ApiError::from(err)),
    };
    Ok(reply(result))
}

async fn handle_results(
    round_id: String,
    auth_header: Option<String>,
    round_manager: Arc<RoundManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let round_id = match parse_round_id(&round_id) {
        Ok(round_id) => round_id,
        Err(err) => return Ok(err.into_reply()),
    };
    let result = match auth_service.authenticate(auth_header).await {
        Ok(player) => round_manager.results(round_id, player.as_ref()).await,
        Err(err) => Err(ApiError::from(err)),
    };
    Ok(reply(result))
}

async fn load_player_stats(
    player: AuthenticatedPlayer,
    player_repository: &PlayerRepository,
    stats_repository: &StatsRepository,
) -> Result<PlayerStatsView, ApiError> {
    let profile = player_repository
        .upsert(&player.id, &player.email, &player.display_name)
        .await?;
    let mut stats = stats_repository.get_stats(&player.id).await?;
    stats.avg_score = stats.avg_score.round();
    let recent_rounds = stats_repository.recent_rounds(&player.id).await?;

    Ok(PlayerStatsView {
        player: profile,
        stats,
        recent_rounds,
    })
}

async fn handle_player_stats(
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    player_repository: Arc<PlayerRepository>,
    stats_repository: Arc<StatsRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match require_player(&auth_service, auth_header).await {
        Ok(player) => load_player_stats(player, &player_repository, &stats_repository).await,
        Err(err) => Err(err),
    };
    Ok(reply(result))
}

async fn handle_screen_name(
    auth_header: Option<String>,
    request: ScreenNameRequest,
    auth_service: Arc<AuthService>,
    player_repository: Arc<PlayerRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let player = match require_player(&auth_service, auth_header).await {
        Ok(player) => player,
        Err(err) => return Ok(err.into_reply()),
    };
    let screen_name = match profile::validate_screen_name(&request.screen_name) {
        Ok(name) => name,
        Err(message) => return Ok(ApiError::BadRequest(message).into_reply()),
    };

    Ok(reply(
        rename_player(&player, &screen_name, &player_repository)
            .await
            .map_err(ApiError::from),
    ))
}

async fn rename_player(
    player: &AuthenticatedPlayer,
    screen_name: &str,
    player_repository: &PlayerRepository,
) -> anyhow::Result<Player> {
    player_repository
        .upsert(&player.id, &player.email, &player.display_name)
        .await?;
    player_repository
        .set_display_name(&player.id, screen_name)
        .await
}

async fn handle_leaderboard_request(
    query: LeaderboardQuery,
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    player_repository: Arc<PlayerRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);
    // An unreadable token still sees the public board
    let player = auth_service.authenticate(auth_header).await.ok().flatten();

    let result = player_repository
        .leaderboard(limit, player.as_ref().map(|p| p.id.as_str()))
        .await
        .map_err(ApiError::from);
    Ok(reply(result))
}
