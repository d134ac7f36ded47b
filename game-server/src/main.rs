use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use game_core::{PuzzleLibrary, WordValidator};
use game_persistence::connection::connect_and_migrate;
use game_persistence::repositories::{PlayerRepository, StatsRepository};
use game_server::{auth::AuthService, config::Config, create_routes, round_manager::RoundManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting Twistle server...");
    let config = Config::from_env()?;

    info!("Loading words from: {}", config.words_directory);
    let dictionary = match WordValidator::new(&config.words_directory) {
        Ok(validator) => {
            info!("Loaded {} dictionary words", validator.len());
            Arc::new(validator)
        }
        Err(e) => {
            tracing::error!("Failed to load words from '{}': {}", config.words_directory, e);
            tracing::error!(
                "Set WORDS_DIRECTORY to a word list file or a directory of .txt word lists."
            );
            std::process::exit(1);
        }
    };

    let library = match PuzzleLibrary::from_file(&config.puzzles_file) {
        Ok(library) => Arc::new(library),
        Err(e) => {
            tracing::error!("Failed to load puzzles from '{}': {:#}", config.puzzles_file, e);
            std::process::exit(1);
        }
    };

    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };
    let player_repository = Arc::new(PlayerRepository::new(db.clone()));
    let stats_repository = Arc::new(StatsRepository::new(db));

    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - token signatures are not checked");
        Arc::new(AuthService::new_dev_mode())
    } else {
        Arc::new(AuthService::new(config.google_client_id.clone()))
    };

    if config.random_mode {
        info!("Random puzzle mode enabled");
    }

    let round_manager = Arc::new(RoundManager::new(
        library,
        dictionary,
        config.game.clone(),
        config.random_mode,
        player_repository.clone(),
        stats_repository.clone(),
    ));

    let routes = create_routes(
        round_manager.clone(),
        auth_service,
        player_repository,
        stats_repository,
    );

    let cleanup_round_manager = round_manager.clone();
    let round_timeout = Duration::from_secs(config.round_timeout_minutes * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            cleanup_round_manager.cleanup_abandoned_rounds(round_timeout);
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (config.host.parse::<std::net::IpAddr>()?, config.port);

    let (addr, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, async {
        #[cfg(unix)]
        {
            let (Ok(mut sigint), Ok(mut sigterm)) = (
                signal::unix::signal(signal::unix::SignalKind::interrupt()),
                signal::unix::signal(signal::unix::SignalKind::terminate()),
            ) else {
                tracing::error!("Failed to install signal handlers");
                return;
            };

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    })?;

    info!("Server started successfully on {}. Press Ctrl+C to stop.", addr);
    server.await;
    info!("Server shutdown complete.");
    Ok(())
}
