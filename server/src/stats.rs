//! The statistics collaborator: best-effort win/loss/draw counters keyed
//! by user id. Failures are logged and ignored; this is fire-and-forget,
//! never something that can stall a game.

use std::sync::Arc;

use async_trait::async_trait;
use protocol::Winner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// The outcome for the holder of `color` given the game's `winner`.
    pub fn for_color(color: protocol::Color, winner: Winner) -> Self {
        match winner {
            Winner::Draw => Outcome::Draw,
            Winner::White if color == protocol::Color::White => Outcome::Win,
            Winner::Black if color == protocol::Color::Black => Outcome::Win,
            _ => Outcome::Loss,
        }
    }
}

#[async_trait]
pub trait StatsSink: Send + Sync {
    async fn record_result(&self, user_id: &str, outcome: Outcome);
}

/// Default wiring: logs at debug level and drops. A real deployment
/// injects a `StatsSink` backed by the user database instead.
pub struct NullStats;

#[async_trait]
impl StatsSink for NullStats {
    async fn record_result(&self, user_id: &str, outcome: Outcome) {
        tracing::debug!(user_id, ?outcome, "stats sink not configured, dropping result");
    }
}

pub type SharedStats = Arc<dyn StatsSink>;
