use chess_rules::{Board, Move};

use crate::evaluation::evaluate_position;

/// Sentinel for a delivered checkmate. Strictly larger in magnitude than any
/// score the evaluator can produce, so a forced mate always dominates
/// material considerations.
pub const MATE_SCORE: i32 = 100_000;

pub const DRAW_SCORE: i32 = 0;

/// Applies a move on construction and undoes it when dropped, so the board
/// is restored on every exit path -- normal return, pruning break, or panic.
/// A failed undo means the apply/undo pairing broke, which poisons every
/// later evaluation, so it aborts instead of limping on.
pub(crate) struct MoveScope<'a> {
    board: &'a mut Board,
}

impl<'a> MoveScope<'a> {
    pub(crate) fn apply(board: &'a mut Board, mv: Move) -> Self {
        board
            .make_move(mv)
            .expect("generated legal move must apply cleanly");
        Self { board }
    }

    pub(crate) fn board(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for MoveScope<'_> {
    fn drop(&mut self) {
        self.board
            .undo_move()
            .expect("applied move must have a matching undo");
    }
}

/// Fixed-depth minimax with alpha-beta pruning.
///
/// Scores are always from White's perspective: the maximizing side is White
/// wherever it appears in the tree, and `maximizing` must therefore be true
/// exactly when White is to move on `board`. Alpha/beta start from
/// `i32::MIN`/`i32::MAX` at the root; pruning never changes the value
/// reported for the root, only the number of nodes visited.
pub fn search(board: &mut Board, depth: u8, mut alpha: i32, mut beta: i32, maximizing: bool) -> i32 {
    if depth == 0 {
        return evaluate_position(board);
    }

    if board.is_draw_by_rule() {
        return DRAW_SCORE;
    }

    let moves = board.legal_moves();
    if moves.is_empty() {
        // Checkmate counts against whoever is to move; stalemate is level
        if board.in_check(board.side_to_move()) {
            return if maximizing { -MATE_SCORE } else { MATE_SCORE };
        }
        return DRAW_SCORE;
    }

    if maximizing {
        let mut best = i32::MIN;
        for mv in moves {
            let mut scope = MoveScope::apply(board, mv);
            let value = search(scope.board(), depth - 1, alpha, beta, false);
            drop(scope);

            best = best.max(value);
            alpha = alpha.max(value);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = i32::MAX;
        for mv in moves {
            let mut scope = MoveScope::apply(board, mv);
            let value = search(scope.board(), depth - 1, alpha, beta, true);
            drop(scope);

            best = best.min(value);
            beta = beta.min(value);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::Square;

    #[test]
    fn move_scope_undoes_on_drop() {
        let mut board = Board::new();
        let before = board.to_fen();
        let mv = Move::new(
            Square::from_algebraic("e2").unwrap(),
            Square::from_algebraic("e4").unwrap(),
        );
        {
            let mut scope = MoveScope::apply(&mut board, mv);
            assert_ne!(scope.board().to_fen(), before);
        }
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn already_mated_side_scores_the_sentinel() {
        // Fool's mate: White to move, already checkmated
        let mut board =
            Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(search(&mut board, 1, i32::MIN, i32::MAX, true), -MATE_SCORE);
        assert_eq!(search(&mut board, 3, i32::MIN, i32::MAX, true), -MATE_SCORE);
    }

    #[test]
    fn stalemate_scores_level() {
        let mut board = Board::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
        assert_eq!(search(&mut board, 2, i32::MIN, i32::MAX, false), DRAW_SCORE);
    }
}
