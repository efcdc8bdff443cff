//! Wire types shared between the game core and its clients: board/piece
//! representation, inbound client frames, and outbound server frame
//! builders. Plain `serde` data only, no networking dependency, so this
//! crate can be reused by a client implementation.

mod board;
mod messages;

pub use board::{
    initial_board, Board, Color, GameOverReason, Piece, PlayerView, Players, Position, Terminal,
    Winner,
};
pub use messages::{
    parse_inbound, ChatOutFrame, GameOverFrame, InboundFrame, MatchFoundFrame, SignalBody,
    UpdateFrame,
};
