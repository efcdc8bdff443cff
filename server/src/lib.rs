//! The real-time Dama Voadora game core: matchmaking, per-game session
//! actors, the authoritative rules engine, and the connection dispatcher
//! that ties them to axum WebSocket routes. Exposed as a library, not
//! just a binary, so integration tests can build a real in-process
//! router the way `main.rs` does.

pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod matchmaking;
pub mod registry;
pub mod rules;
pub mod session;
pub mod state;
pub mod stats;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::dispatcher::{game_handler, matchmaking_handler};
use crate::session::SessionCommand;
use crate::state::AppState;

/// Builds the full set of routes the service exposes, wired to the given
/// `AppState`. Shared by `main.rs` and the integration tests in
/// `server/tests/` so both exercise the identical router.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reload", get(reload_handler))
        .route("/status", get(status_handler))
        .route("/ws/matchmaking", get(matchmaking_handler))
        .route("/ws/game/{game_id}/{color}", get(game_handler))
        .with_state(state)
}

/// Forces a reload of `ServerConfig.json` and echoes the effective
/// configuration back.
async fn reload_handler(State(state): State<Arc<AppState>>) -> String {
    match config::reload_config(&state.config).await {
        Ok(()) => {
            let config = state.config.current().await;
            format!(
                "bind_address: {}\nsession_mailbox_capacity: {}\nwatchdog_interval_secs: {}",
                config.bind_address, config.session_mailbox_capacity, config.watchdog_interval_secs
            )
        }
        Err(err) => format!("Config reload failed: {}", err),
    }
}

/// Lists active games (id, phase, age, whether each side is attached) and
/// the matchmaking queue depth. Phase and attachment are queried from the
/// owning session actor itself rather than guessed from the registry,
/// since that state only ever lives inside the actor.
async fn status_handler(State(state): State<Arc<AppState>>) -> String {
    let games = state.registry.snapshot().await;
    let queue_depth = state.matchmaking.len().await;
    let now = Instant::now();

    let mut lines = Vec::with_capacity(games.len() + 1);
    for (id, created_at) in games {
        let Some(handle) = state.registry.get(id).await else { continue };
        let (tx, rx) = tokio::sync::oneshot::channel();
        if handle.commands.send(SessionCommand::Status { respond_to: tx }).await.is_err() {
            continue;
        }
        let Ok(status) = rx.await else { continue };
        lines.push(format!(
            "Game: {:<36}  Phase: {:<11?}  Age: {:>6}s  White: {}  Black: {}",
            id,
            status.phase,
            now.duration_since(created_at).as_secs(),
            status.white_attached,
            status.black_attached,
        ));
    }
    lines.push(format!("Matchmaking queue depth: {}", queue_depth));
    lines.join("\n")
}

/// Prunes dead sessions and matchmaking waiters. The normal path never
/// needs this: a session removes itself from the registry in `finalize`,
/// and `matchmaking::enqueue` prunes lazily from the front of the queue.
/// This is the fallback safety net.
pub async fn run_watchdog(state: Arc<AppState>, interval_secs: u64) {
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        state.registry.sweep_dead().await;
        state.matchmaking.sweep_dead().await;
    }
}
