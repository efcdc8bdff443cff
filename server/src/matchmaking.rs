//! The matchmaking queue: a FIFO of waiters, paired two at a time into a
//! new `GameSession`. Built around a `VecDeque` plus a `oneshot`
//! notification per waiter rather than a shared room object, since the
//! two matched connections never need to see each other, only the game
//! id and assigned color.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};

use protocol::Color;

use crate::config::ConfigHandle;
use crate::ids::GameId;
use crate::registry::{GameHandle, SessionRegistry};
use crate::session::GameSession;
use crate::stats::SharedStats;

/// What pairing hands back to a waiting connection task.
pub struct MatchAssignment {
    pub game_id: GameId,
    pub color: Color,
}

struct Waiter {
    notify: oneshot::Sender<MatchAssignment>,
}

#[derive(Default)]
struct Inner {
    waiting: VecDeque<Waiter>,
}

/// Cloneable handle to the shared matchmaking queue.
#[derive(Clone, Default)]
pub struct MatchmakingQueue {
    inner: Arc<Mutex<Inner>>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a connection and returns a receiver that resolves once a
    /// match is found. If an existing waiter is present, both are paired
    /// immediately and a new `GameSession` is spawned and registered;
    /// otherwise the caller joins the queue and waits. Dropping the
    /// returned receiver (the connection task exits) is enough to cancel:
    /// the waiter is pruned the next time pairing walks the queue.
    pub async fn enqueue(
        &self,
        registry: &SessionRegistry,
        config: &ConfigHandle,
        stats: &SharedStats,
    ) -> oneshot::Receiver<MatchAssignment> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().await;

        // Skip waiters whose connection already dropped (disconnect while
        // queued) instead of matching them to a dead channel.
        while let Some(front) = inner.waiting.front() {
            if front.notify.is_closed() {
                inner.waiting.pop_front();
            } else {
                break;
            }
        }

        let Some(opponent) = inner.waiting.pop_front() else {
            inner.waiting.push_back(Waiter { notify: tx });
            return rx;
        };
        drop(inner);

        let game_id = GameId::new();
        let capacity = config.current().await.session_mailbox_capacity;
        let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
        let session = GameSession::new(game_id, registry.clone(), stats.clone());
        tokio::spawn(session.run(cmd_rx));
        registry.insert(game_id, GameHandle { commands: cmd_tx, created_at: std::time::Instant::now() }).await;

        // First-in-queue gets white: the host role goes to whoever arrived
        // first.
        let _ = opponent.notify.send(MatchAssignment { game_id, color: Color::White });
        let _ = tx.send(MatchAssignment { game_id, color: Color::Black });

        rx
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.waiting.len()
    }

    /// Prunes waiters whose connection task exited without being matched.
    /// A client that vanished between `enqueue` calls would otherwise sit
    /// in the queue until a new arrival happens to walk past it. The
    /// watchdog calls this; the happy path prunes lazily from the front
    /// of the queue in `enqueue` itself.
    pub async fn sweep_dead(&self) {
        let mut inner = self.inner.lock().await;
        let before = inner.waiting.len();
        inner.waiting.retain(|waiter| !waiter.notify.is_closed());
        let removed = before - inner.waiting.len();
        if removed > 0 {
            tracing::info!(removed, "swept dead matchmaking waiters");
        }
    }
}
