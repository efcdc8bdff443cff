//! Board, piece and coordinate types shared by every part of the core.

use serde::{Deserialize, Serialize};

/// Board side. White moves first; white's forward direction is toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The opposing color.
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta for a single forward step of a pawn of this color.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The row this color's pieces are promoted on.
    pub fn home_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

/// A square coordinate, `r` and `c` both in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub r: u8,
    pub c: u8,
}

impl Position {
    pub fn new(r: u8, c: u8) -> Self {
        Self { r, c }
    }

    pub fn in_bounds(self) -> bool {
        self.r < 8 && self.c < 8
    }

    pub fn is_dark(self) -> bool {
        (self.r + self.c) % 2 == 1
    }
}

/// A single piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub king: bool,
}

/// The 8x8 grid of optional pieces. Row 0 is black's home, row 7 is white's.
pub type Board = [[Option<Piece>; 8]; 8];

/// Builds the standard Dama Voadora starting position: white on rows 5-7,
/// black on rows 0-2, dark squares only.
pub fn initial_board() -> Board {
    let mut board: Board = [[None; 8]; 8];
    for r in 0..8u8 {
        for c in 0..8u8 {
            if (r + c) % 2 != 1 {
                continue;
            }
            if r < 3 {
                board[r as usize][c as usize] = Some(Piece { color: Color::Black, king: false });
            } else if r > 4 {
                board[r as usize][c as usize] = Some(Piece { color: Color::White, king: false });
            }
        }
    }
    board
}

/// Outcome of a finished game as reported to clients and to the stats collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Draw,
}

/// Reason a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverReason {
    Annihilation,
    Blockade,
    Stalemate,
    Surrender,
}

/// Terminal classification returned by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    None,
    Win(Color, GameOverReason),
    Draw,
}

/// Per-player snapshot embedded in every `update` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub email: String,
    pub id: Option<String>,
}

/// Both players' snapshots, keyed by color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Players {
    pub white: PlayerView,
    pub black: PlayerView,
}
