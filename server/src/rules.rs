//! The authoritative rules engine: pure functions over a board snapshot.
//! Nothing in this module touches a socket, a channel, or the registry,
//! and it is tested in isolation below.
//!
//! Capture semantics follow the short two-step jump (landing exactly two
//! squares beyond the jumped piece) for both pawns and kings; simple king
//! moves may slide any distance along a clear diagonal. Full long-range
//! "flying king" captures are not implemented.

use protocol::{Board, Color, GameOverReason, Piece, Position, Terminal};

const CAPTURE_DIRS: [(i8, i8); 4] = [(-2, -2), (-2, 2), (2, -2), (2, 2)];
const DIAGONAL_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

fn at(board: &Board, r: i8, c: i8) -> Option<Piece> {
    if (0..8).contains(&r) && (0..8).contains(&c) {
        board[r as usize][c as usize]
    } else {
        None
    }
}

/// True iff `pos` holds a piece of `color` that can jump some adjacent
/// enemy piece and land on the empty square two steps beyond it.
pub fn can_capture_from(board: &Board, pos: Position, color: Color) -> bool {
    let Some(piece) = board[pos.r as usize][pos.c as usize] else { return false };
    if piece.color != color {
        return false;
    }
    let (r, c) = (pos.r as i8, pos.c as i8);
    CAPTURE_DIRS.iter().any(|&(dr, dc)| {
        let (tr, tc) = (r + dr, c + dc);
        let (mr, mc) = (r + dr / 2, c + dc / 2);
        if !(0..8).contains(&tr) || !(0..8).contains(&tc) {
            return false;
        }
        if at(board, tr, tc).is_some() {
            return false;
        }
        matches!(at(board, mr, mc), Some(mid) if mid.color != color)
    })
}

/// True iff any piece of `color` has a capture available (the mandatory-capture rule).
pub fn any_capture_available(board: &Board, color: Color) -> bool {
    for r in 0..8u8 {
        for c in 0..8u8 {
            if let Some(piece) = board[r as usize][c as usize] {
                if piece.color == color && can_capture_from(board, Position::new(r, c), color) {
                    return true;
                }
            }
        }
    }
    false
}

/// True iff `pos` holds a piece of `color` with at least one legal simple
/// (non-capturing) destination: a pawn's single forward diagonal, or any
/// diagonally adjacent square for a king.
pub fn can_move_simply(board: &Board, pos: Position, color: Color) -> bool {
    let Some(piece) = board[pos.r as usize][pos.c as usize] else { return false };
    if piece.color != color {
        return false;
    }
    let (r, c) = (pos.r as i8, pos.c as i8);
    if piece.king {
        DIAGONAL_DIRS.iter().any(|&(dr, dc)| at(board, r + dr, c + dc).is_none() && (0..8).contains(&(r + dr)) && (0..8).contains(&(c + dc)))
    } else {
        let forward = color.forward();
        [-1i8, 1i8].iter().any(|&dc| {
            let (tr, tc) = (r + forward, c + dc);
            (0..8).contains(&tr) && (0..8).contains(&tc) && at(board, tr, tc).is_none()
        })
    }
}

/// True iff `color` has at least one legal move under the mandatory-capture rule.
pub fn has_any_legal_move(board: &Board, color: Color) -> bool {
    if any_capture_available(board, color) {
        return true;
    }
    for r in 0..8u8 {
        for c in 0..8u8 {
            if let Some(piece) = board[r as usize][c as usize] {
                if piece.color == color && can_move_simply(board, Position::new(r, c), color) {
                    return true;
                }
            }
        }
    }
    false
}

fn is_path_clear(board: &Board, from: Position, to: Position) -> bool {
    let dr = if to.r > from.r { 1i8 } else { -1i8 };
    let dc = if to.c > from.c { 1i8 } else { -1i8 };
    let (mut r, mut c) = (from.r as i8 + dr, from.c as i8 + dc);
    while (r, c) != (to.r as i8, to.c as i8) {
        if at(board, r, c).is_some() {
            return false;
        }
        r += dr;
        c += dc;
    }
    true
}

/// Validates a candidate move against board state, the mandatory-capture
/// rule, and an in-progress chain (if any). Returns `(valid, is_capture)`.
pub fn validate_move(
    board: &Board,
    chain_piece: Option<Position>,
    from: Position,
    to: Position,
    color: Color,
) -> (bool, bool) {
    if !to.in_bounds() || board[to.r as usize][to.c as usize].is_some() {
        return (false, false);
    }
    let Some(piece) = board[from.r as usize][from.c as usize] else { return (false, false) };
    if piece.color != color {
        return (false, false);
    }
    if let Some(cp) = chain_piece {
        if cp != from {
            return (false, false);
        }
    }

    let row_diff = to.r as i8 - from.r as i8;
    let col_diff = to.c as i8 - from.c as i8;
    if row_diff.abs() != col_diff.abs() {
        return (false, false);
    }

    let mandatory_capture = chain_piece.is_some() || any_capture_available(board, color);

    if !mandatory_capture {
        if piece.king {
            if is_path_clear(board, from, to) {
                return (true, false);
            }
        } else if row_diff.abs() == 1 && row_diff == color.forward() {
            return (true, false);
        }
        return (false, false);
    }

    if row_diff.abs() >= 2 {
        let dr = if row_diff > 0 { 1i8 } else { -1i8 };
        let dc = if col_diff > 0 { 1i8 } else { -1i8 };
        let (mut r, mut c) = (from.r as i8 + dr, from.c as i8 + dc);
        let mut enemy_found = false;
        while (r, c) != (to.r as i8, to.c as i8) {
            match at(board, r, c) {
                Some(p) if p.color == color => return (false, false),
                Some(_) if enemy_found => return (false, false),
                Some(_) => enemy_found = true,
                None => {}
            }
            r += dr;
            c += dc;
        }
        if enemy_found {
            return (true, true);
        }
    }

    (false, false)
}

/// Applies an already-validated move: relocates the piece, clears the
/// captured piece (if any), and promotes on reaching the opponent's home row.
pub fn apply_move(board: &mut Board, from: Position, to: Position, is_capture: bool) {
    let mut piece = board[from.r as usize][from.c as usize].take().expect("apply_move called on empty origin");

    if is_capture {
        let dr = if to.r > from.r { 1i8 } else { -1i8 };
        let dc = if to.c > from.c { 1i8 } else { -1i8 };
        let (mut r, mut c) = (from.r as i8 + dr, from.c as i8 + dc);
        while (r, c) != (to.r as i8, to.c as i8) {
            if board[r as usize][c as usize].take().is_some() {
                break;
            }
            r += dr;
            c += dc;
        }
    }

    if to.r == piece.color.home_row() {
        piece.king = true;
    }
    board[to.r as usize][to.c as usize] = Some(piece);
}

/// Checks for a terminal condition immediately after a turn flip.
/// `just_moved` is the color that just completed its ply; `opponent` is
/// the color about to move.
pub fn check_terminal(board: &Board, just_moved: Color, opponent: Color) -> Terminal {
    let opponent_pieces = board.iter().flatten().filter(|p| matches!(p, Some(piece) if piece.color == opponent)).count();
    if opponent_pieces == 0 {
        return Terminal::Win(just_moved, GameOverReason::Annihilation);
    }

    let opponent_has_move = has_any_legal_move(board, opponent);
    let mover_has_move = has_any_legal_move(board, just_moved);

    if !opponent_has_move && mover_has_move {
        Terminal::Win(just_moved, GameOverReason::Blockade)
    } else if !opponent_has_move && !mover_has_move {
        Terminal::Draw
    } else {
        Terminal::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::initial_board;

    fn empty_board() -> Board {
        [[None; 8]; 8]
    }

    fn put(board: &mut Board, pos: Position, color: Color, king: bool) {
        board[pos.r as usize][pos.c as usize] = Some(Piece { color, king });
    }

    #[test]
    fn opening_move_is_legal_and_simple() {
        let board = initial_board();
        let (valid, capture) = validate_move(&board, None, Position::new(5, 3), Position::new(4, 4), Color::White);
        assert!(valid);
        assert!(!capture);
    }

    #[test]
    fn pawn_cannot_move_backward() {
        let board = initial_board();
        let (valid, _) = validate_move(&board, None, Position::new(5, 3), Position::new(6, 4), Color::White);
        assert!(!valid);
    }

    #[test]
    fn mandatory_capture_rejects_simple_move() {
        let mut board = empty_board();
        put(&mut board, Position::new(5, 2), Color::White, false);
        put(&mut board, Position::new(4, 3), Color::Black, false);
        put(&mut board, Position::new(5, 0), Color::White, false);

        // The simple move is rejected because a capture is available elsewhere.
        let (valid, _) = validate_move(&board, None, Position::new(5, 0), Position::new(4, 1), Color::White);
        assert!(!valid);

        let (valid, capture) = validate_move(&board, None, Position::new(5, 2), Position::new(3, 4), Color::White);
        assert!(valid);
        assert!(capture);
    }

    #[test]
    fn chain_pins_the_moving_piece() {
        let mut board = empty_board();
        put(&mut board, Position::new(5, 2), Color::White, false);
        put(&mut board, Position::new(4, 3), Color::Black, false);
        put(&mut board, Position::new(2, 5), Color::Black, false);

        let (valid, capture) = validate_move(&board, None, Position::new(5, 2), Position::new(3, 4), Color::White);
        assert!(valid && capture);
        apply_move(&mut board, Position::new(5, 2), Position::new(3, 4), true);
        assert!(can_capture_from(&board, Position::new(3, 4), Color::White));

        // Any other piece attempting to move while chain_piece is pinned is rejected.
        let mut other = board;
        put(&mut other, Position::new(6, 5), Color::White, false);
        let (valid, _) = validate_move(&other, Some(Position::new(3, 4)), Position::new(6, 5), Position::new(5, 6), Color::White);
        assert!(!valid);

        let (valid, capture) = validate_move(&board, Some(Position::new(3, 4)), Position::new(3, 4), Position::new(1, 6), Color::White);
        assert!(valid && capture);
    }

    #[test]
    fn capture_removes_exactly_one_piece() {
        let mut board = empty_board();
        put(&mut board, Position::new(3, 4), Color::White, false);
        put(&mut board, Position::new(2, 3), Color::Black, false);
        let before = board.iter().flatten().filter(|p| p.is_some()).count();
        apply_move(&mut board, Position::new(3, 4), Position::new(1, 2), true);
        let after = board.iter().flatten().filter(|p| p.is_some()).count();
        assert_eq!(before - after, 1);
        assert!(board[2][3].is_none());
    }

    #[test]
    fn pawn_promotes_on_home_row() {
        let mut board = empty_board();
        put(&mut board, Position::new(1, 2), Color::White, false);
        apply_move(&mut board, Position::new(1, 2), Position::new(0, 3), false);
        assert!(board[0][3].unwrap().king);
    }

    #[test]
    fn annihilation_is_detected() {
        let mut board = empty_board();
        put(&mut board, Position::new(3, 4), Color::White, false);
        put(&mut board, Position::new(2, 3), Color::Black, false);
        apply_move(&mut board, Position::new(3, 4), Position::new(1, 2), true);
        let terminal = check_terminal(&board, Color::White, Color::Black);
        assert_eq!(terminal, Terminal::Win(Color::White, GameOverReason::Annihilation));
    }

    #[test]
    fn king_slides_any_distance_on_clear_diagonal() {
        let mut board = empty_board();
        put(&mut board, Position::new(7, 0), Color::White, true);
        let (valid, capture) = validate_move(&board, None, Position::new(7, 0), Position::new(3, 4), Color::White);
        assert!(valid);
        assert!(!capture);
    }
}
