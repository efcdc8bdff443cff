//! JSON frame shapes exchanged over the matchmaking and game WebSocket
//! channels. Inbound frames are duck-typed on a `type` tag, with a
//! catch-all `Unknown` variant. Outbound frames are plain serializable
//! structs carrying their own `"type"` literal, built just before they
//! are handed to the transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::board::{Board, Color, GameOverReason, Players, Position, Winner};

/// A frame received from a client on a game channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    Move { from: Position, to: Position },
    Surrender,
    Chat { text: String },
    /// WebRTC SDP/ICE payload; the server never inspects it beyond
    /// recognizing the tag, so the remaining fields are captured as-is.
    Signal(SignalBody),
    RequestState,
    /// Anything with an unrecognized (or missing) `type` lands here and is
    /// dropped silently by the dispatcher.
    #[serde(other)]
    Unknown,
}

/// Opaque signalling payload, kept verbatim for relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBody {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

/// Parses one inbound text frame. Malformed JSON is reported as `None`
/// rather than propagated; the caller drops it silently.
pub fn parse_inbound(text: &str) -> Option<InboundFrame> {
    serde_json::from_str(text).ok()
}

/// `{"type":"match_found","game_id":...,"color":...}`.
#[derive(Debug, Clone, Serialize)]
pub struct MatchFoundFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub game_id: String,
    pub color: Color,
}

impl MatchFoundFrame {
    pub fn new(game_id: String, color: Color) -> Self {
        Self { kind: "match_found", game_id, color }
    }
}

/// The full board-state broadcast (`"type":"update"`).
#[derive(Debug, Clone, Serialize)]
pub struct UpdateFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub board: Board,
    pub turn: Color,
    pub chain_piece: Option<Position>,
    pub last_move_from: Option<Position>,
    pub last_move_to: Option<Position>,
    pub players: Players,
}

impl UpdateFrame {
    pub fn new(
        board: Board,
        turn: Color,
        chain_piece: Option<Position>,
        last_move_from: Option<Position>,
        last_move_to: Option<Position>,
        players: Players,
    ) -> Self {
        Self { kind: "update", board, turn, chain_piece, last_move_from, last_move_to, players }
    }
}

/// `{"type":"game_over","winner":...,"reason":...}`.
#[derive(Debug, Clone, Serialize)]
pub struct GameOverFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub winner: Winner,
    pub reason: GameOverReason,
}

impl GameOverFrame {
    pub fn new(winner: Winner, reason: GameOverReason) -> Self {
        Self { kind: "game_over", winner, reason }
    }
}

/// `{"type":"chat","text":...,"sender":...}`, stamped by the server.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutFrame {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub sender: String,
}

impl ChatOutFrame {
    pub fn new(text: String, sender: String) -> Self {
        Self { kind: "chat", text, sender }
    }
}
