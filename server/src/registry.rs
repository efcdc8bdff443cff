//! The process-wide game registry: a single `tokio::sync::Mutex` guarding
//! nothing but the id -> session-handle map itself. No per-session state
//! ever lives behind this lock; sessions are actors reached through an
//! `mpsc::Sender<SessionCommand>`, so insert/remove is the only thing
//! this boundary ever serializes, and it is never held across network
//! I/O or a collaborator call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};

use crate::ids::GameId;
use crate::session::SessionCommand;

/// What a client task or the registry itself needs to reach a running
/// session: the mailbox to submit commands into, plus enough bookkeeping
/// for the `/status` diagnostic endpoint.
#[derive(Clone)]
pub struct GameHandle {
    pub commands: mpsc::Sender<SessionCommand>,
    pub created_at: Instant,
}

#[derive(Default)]
struct Inner {
    games: HashMap<GameId, GameHandle>,
}

/// Cloneable handle to the shared registry; cheap to pass into every
/// connection task and every session actor.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: GameId, handle: GameHandle) {
        self.inner.lock().await.games.insert(id, handle);
    }

    pub async fn get(&self, id: GameId) -> Option<GameHandle> {
        self.inner.lock().await.games.get(&id).cloned()
    }

    /// Removes a session. Called exactly once, by the session actor
    /// itself during `finalize`, so that a game id is never reused and
    /// never removed out from under a still running session.
    pub async fn remove(&self, id: GameId) {
        self.inner.lock().await.games.remove(&id);
    }

    pub async fn snapshot(&self) -> Vec<(GameId, Instant)> {
        self.inner.lock().await.games.iter().map(|(id, handle)| (*id, handle.created_at)).collect()
    }

    /// Drops any session whose mailbox has no receiver left. This is the
    /// fallback safety net; in the normal path a session removes itself
    /// from `finalize` before its task ends.
    pub async fn sweep_dead(&self) {
        let mut inner = self.inner.lock().await;
        let before = inner.games.len();
        inner.games.retain(|_, handle| !handle.commands.is_closed());
        let removed = before - inner.games.len();
        if removed > 0 {
            tracing::info!(removed, "swept dead game sessions");
        }
    }
}
