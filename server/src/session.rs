//! One ongoing match. A `GameSession` is run as a single `tokio::spawn`ed
//! task that owns both attached clients' `SplitSink` halves and drains a
//! `SessionCommand` mailbox serially, the only synchronization mechanism
//! a session ever needs. Client connection tasks never touch session
//! state directly; they only hold a `Sender<SessionCommand>` clone.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use protocol::{
    initial_board, Board, ChatOutFrame, Color, GameOverFrame, GameOverReason, Players, PlayerView,
    Position, Terminal, UpdateFrame, Winner,
};

use crate::auth::UserIdentity;
use crate::ids::GameId;
use crate::registry::SessionRegistry;
use crate::rules::{apply_move, can_capture_from, check_terminal, validate_move};
use crate::stats::{Outcome, SharedStats};

type Sink = SplitSink<WebSocket, Message>;

/// Events a connection task submits into a session's mailbox.
pub enum SessionCommand {
    Attach { color: Color, user: Option<UserIdentity>, sink: Sink },
    Detach { color: Color },
    Move { color: Color, from: Position, to: Position },
    Surrender { color: Color },
    Relay { color: Color, relay: RelayPayload },
    RequestState { color: Color },
    /// Diagnostic query for the `/status` endpoint; never emitted by a
    /// game client, only by the route handler.
    Status { respond_to: oneshot::Sender<SessionStatus> },
}

/// Snapshot handed back to `/status`. Nothing here is privileged
/// information a client couldn't derive from its own `update` frames;
/// it's just a summary for the operator.
#[derive(Debug, Clone, Copy)]
pub struct SessionStatus {
    pub phase: Phase,
    pub white_attached: bool,
    pub black_attached: bool,
}

/// A chat or signalling payload to forward to the opposite color.
pub enum RelayPayload {
    Chat(String),
    Signal(Value),
}

/// Coarse state-machine phase, kept for diagnostics; the actual control
/// flow below derives behavior from `turn`/`chain_piece`/the connection
/// slots directly rather than branching on this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingBoth,
    WaitingOne,
    InPlay,
    Chain,
    Terminal,
}

struct ParticipantSlot {
    connection: Option<Sink>,
    user_id: Option<String>,
    display_name: String,
    email: String,
}

impl ParticipantSlot {
    fn empty() -> Self {
        Self { connection: None, user_id: None, display_name: "Waiting...".to_string(), email: String::new() }
    }

    fn view(&self) -> PlayerView {
        PlayerView { name: self.display_name.clone(), email: self.email.clone(), id: self.user_id.clone() }
    }
}

pub struct GameSession {
    id: GameId,
    white: ParticipantSlot,
    black: ParticipantSlot,
    turn: Color,
    board: Board,
    chain_piece: Option<Position>,
    last_move_from: Option<Position>,
    last_move_to: Option<Position>,
    phase: Phase,
    registry: SessionRegistry,
    stats: SharedStats,
}

impl GameSession {
    pub fn new(id: GameId, registry: SessionRegistry, stats: SharedStats) -> Self {
        Self {
            id,
            white: ParticipantSlot::empty(),
            black: ParticipantSlot::empty(),
            turn: Color::White,
            board: initial_board(),
            chain_piece: None,
            last_move_from: None,
            last_move_to: None,
            phase: Phase::WaitingBoth,
            registry,
            stats,
        }
    }

    fn slot_mut(&mut self, color: Color) -> &mut ParticipantSlot {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    fn players(&self) -> Players {
        Players { white: self.white.view(), black: self.black.view() }
    }

    fn update_frame(&self) -> UpdateFrame {
        UpdateFrame::new(self.board, self.turn, self.chain_piece, self.last_move_from, self.last_move_to, self.players())
    }

    async fn send(slot: &mut ParticipantSlot, frame: &impl Serialize) {
        let Some(sink) = slot.connection.as_mut() else { return };
        let text = match serde_json::to_string(frame) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(?err, "failed to serialize outbound frame");
                return;
            }
        };
        // Transport errors are swallowed for this recipient only: the
        // opponent may still be attached and the game should continue.
        if let Err(err) = sink.send(Message::Text(text.into())).await {
            tracing::warn!(?err, "send failed, dropping connection slot");
            slot.connection = None;
        }
    }

    async fn broadcast_state(&mut self) {
        let frame = self.update_frame();
        Self::send(&mut self.white, &frame).await;
        Self::send(&mut self.black, &frame).await;
    }

    /// Runs the session's mailbox loop until `finalize` ends the game.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        while let Some(cmd) = commands.recv().await {
            match cmd {
                SessionCommand::Attach { color, user, sink } => self.attach(color, user, sink).await,
                SessionCommand::Detach { color } => self.detach(color),
                SessionCommand::Move { color, from, to } => {
                    if self.process_move(color, from, to).await {
                        break;
                    }
                }
                SessionCommand::Surrender { color } => {
                    self.surrender(color).await;
                    break;
                }
                SessionCommand::Relay { color, relay } => self.relay(color, relay).await,
                SessionCommand::RequestState { color } => self.request_state(color).await,
                SessionCommand::Status { respond_to } => {
                    let _ = respond_to.send(SessionStatus {
                        phase: self.phase,
                        white_attached: self.white.connection.is_some(),
                        black_attached: self.black.connection.is_some(),
                    });
                }
            }
        }
    }

    async fn attach(&mut self, color: Color, user: Option<UserIdentity>, sink: Sink) {
        {
            let slot = self.slot_mut(color);
            slot.connection = Some(sink);
            if let Some(user) = user {
                slot.user_id = Some(user.id);
                slot.display_name = user.display_name;
                slot.email = user.email;
            } else {
                slot.display_name = "Anonymous".to_string();
            }
        }
        self.phase = if self.white.connection.is_some() && self.black.connection.is_some() {
            Phase::InPlay
        } else {
            Phase::WaitingOne
        };
        self.broadcast_state().await;
    }

    fn detach(&mut self, color: Color) {
        self.slot_mut(color).connection = None;
    }

    async fn relay(&mut self, color: Color, relay: RelayPayload) {
        let sender_name = match color {
            Color::White => self.white.display_name.clone(),
            Color::Black => self.black.display_name.clone(),
        };
        let opposite = self.slot_mut(color.opposite());
        match relay {
            RelayPayload::Chat(text) => {
                let frame = ChatOutFrame::new(text, sender_name);
                Self::send(opposite, &frame).await;
            }
            RelayPayload::Signal(value) => {
                Self::send(opposite, &value).await;
            }
        }
    }

    async fn request_state(&mut self, color: Color) {
        let frame = self.update_frame();
        let slot = self.slot_mut(color);
        Self::send(slot, &frame).await;
    }

    /// Returns `true` if the game ended (and thus the mailbox loop should stop).
    async fn process_move(&mut self, color: Color, from: Position, to: Position) -> bool {
        if self.turn != color {
            return false;
        }

        let (valid, is_capture) = validate_move(&self.board, self.chain_piece, from, to, color);
        if !valid {
            // Rule violation: re-broadcast so the client can roll back its
            // optimistic UI, never an error frame.
            self.broadcast_state().await;
            return false;
        }

        apply_move(&mut self.board, from, to, is_capture);
        self.last_move_from = Some(from);
        self.last_move_to = Some(to);
        self.chain_piece = None;

        let mut turn_ends = true;
        if is_capture && can_capture_from(&self.board, to, color) {
            self.chain_piece = Some(to);
            self.phase = Phase::Chain;
            turn_ends = false;
        }

        if turn_ends {
            self.turn = color.opposite();
            self.phase = Phase::InPlay;
            match check_terminal(&self.board, color, self.turn) {
                Terminal::None => {}
                Terminal::Win(winner_color, reason) => {
                    self.finalize(Winner::from(winner_color), reason).await;
                    return true;
                }
                Terminal::Draw => {
                    self.finalize(Winner::Draw, GameOverReason::Stalemate).await;
                    return true;
                }
            }
        }

        self.broadcast_state().await;
        false
    }

    async fn surrender(&mut self, color: Color) {
        self.finalize(Winner::from(color.opposite()), GameOverReason::Surrender).await;
    }

    /// Emits `game_over` to both channels, closes both, records stats for
    /// every non-anonymous attached slot, and removes the session from
    /// the registry. Runs exactly once: nothing after this call ever
    /// broadcasts again, since the mailbox loop stops right after.
    async fn finalize(&mut self, winner: Winner, reason: GameOverReason) {
        self.phase = Phase::Terminal;
        let frame = GameOverFrame::new(winner, reason);

        for (color, slot) in [(Color::White, &mut self.white), (Color::Black, &mut self.black)] {
            Self::send(slot, &frame).await;
            if let Some(mut sink) = slot.connection.take() {
                let _ = sink
                    .send(Message::Close(Some(CloseFrame { code: 1000, reason: "game over".into() })))
                    .await;
            }
            if let Some(user_id) = &slot.user_id {
                self.stats.record_result(user_id, Outcome::for_color(color, winner)).await;
            }
        }

        self.registry.remove(self.id).await;
    }
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Winner::White,
            Color::Black => Winner::Black,
        }
    }
}
