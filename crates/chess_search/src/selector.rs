use chess_rules::{Board, Color, Move};
use log::debug;

use crate::search::{search, MoveScope};

/// A root move paired with its minimax score. Scores follow the global
/// convention: higher is better for White, lower is better for Black.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Best root move for the side to move, or `None` on a terminal position.
///
/// `None` only says the game is over; whether that is checkmate or a draw is
/// the board's terminal queries' business. Ties break toward the move
/// generated first, so equal positions always select the same move. The
/// board is returned to its pre-call state, bit for bit.
pub fn select_best_move(board: &mut Board, depth: u8) -> Option<ScoredMove> {
    let depth = depth.max(1);
    let side = board.side_to_move();

    let moves = board.legal_moves();
    if moves.is_empty() {
        debug!("no legal moves for {side:?}, nothing to select");
        return None;
    }

    let mut best: Option<ScoredMove> = None;
    for mv in moves {
        let mut scope = MoveScope::apply(board, mv);
        // One ply down the side to move has flipped, so the child is a
        // maximizing node exactly when the opponent is White
        let score = search(
            scope.board(),
            depth - 1,
            i32::MIN,
            i32::MAX,
            side != Color::White,
        );
        drop(scope);
        debug!("candidate {mv} scores {score}");

        let improves = match best {
            None => true,
            Some(current) => match side {
                Color::White => score > current.score,
                Color::Black => score < current.score,
            },
        };
        if improves {
            best = Some(ScoredMove { mv, score });
        }
    }

    if let Some(chosen) = best {
        debug!(
            "selected {} for {side:?} at depth {depth} with score {}",
            chosen.mv, chosen.score
        );
    }
    best
}
