use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server::auth::NullAuth;
use server::config::reload_config;
use server::state::AppState;
use server::stats::NullStats;
use server::{app_router, run_watchdog};

#[tokio::main]
/// Activates error tracing, spawns a watchdog task to prune stale
/// sessions and matchmaking waiters, then serves the matchmaking/game
/// WebSockets plus the `/reload` and `/status` diagnostic endpoints on
/// the configured bind address.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true) // Modul-Path (e.g. server::dispatcher)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let app_state = Arc::new(AppState::new(Arc::new(NullAuth), Arc::new(NullStats)));

    if let Err(err) = reload_config(&app_state.config).await {
        tracing::error!(%err, "initial config load error");
        panic!("initial config load error: {}", err);
    }

    let watchdog_state = app_state.clone();
    let watchdog_interval = app_state.config.current().await.watchdog_interval_secs;
    tokio::spawn(run_watchdog(watchdog_state, watchdog_interval));

    let bind_address = app_state.config.current().await.bind_address.clone();
    let app = app_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();
    tracing::info!(%bind_address, "listening");

    axum::serve(listener, app).await.unwrap();
}
