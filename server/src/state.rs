//! Process-wide services wired together at startup and passed to
//! handlers explicitly, avoiding hidden globals so they stay testable.
//! Bundles the registry, matchmaking queue, and config table behind a
//! single `Arc` handed to every axum route as `State`.

use std::sync::Arc;

use crate::auth::SharedAuth;
use crate::config::ConfigHandle;
use crate::matchmaking::MatchmakingQueue;
use crate::registry::SessionRegistry;
use crate::stats::SharedStats;

/// Everything a connection handler needs to reach the rest of the core.
/// Cheap to clone (every field is itself an `Arc`-backed handle), so it
/// is handed to axum as `State<Arc<AppState>>`.
pub struct AppState {
    pub config: ConfigHandle,
    pub registry: SessionRegistry,
    pub matchmaking: MatchmakingQueue,
    pub auth: SharedAuth,
    pub stats: SharedStats,
}

impl AppState {
    pub fn new(auth: SharedAuth, stats: SharedStats) -> Self {
        Self {
            config: ConfigHandle::default(),
            registry: SessionRegistry::new(),
            matchmaking: MatchmakingQueue::new(),
            auth,
            stats,
        }
    }
}
