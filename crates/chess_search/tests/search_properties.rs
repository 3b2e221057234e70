//! Cross-cutting properties of the search stack: pruning soundness, board
//! restoration, terminal scoring, and the behavior promised to callers.

use rand::{rngs::StdRng, Rng, SeedableRng};

use chess_rules::{Board, Color};
use chess_search::{evaluate_position, search, select_best_move, DRAW_SCORE, MATE_SCORE};

/// Plain minimax over the same tree, no pruning. The alpha-beta search must
/// report the same value; pruning is only allowed to cut cost.
fn minimax(board: &mut Board, depth: u8, maximizing: bool) -> i32 {
    if depth == 0 {
        return evaluate_position(board);
    }
    if board.is_draw_by_rule() {
        return DRAW_SCORE;
    }
    let moves = board.legal_moves();
    if moves.is_empty() {
        if board.in_check(board.side_to_move()) {
            return if maximizing { -MATE_SCORE } else { MATE_SCORE };
        }
        return DRAW_SCORE;
    }

    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for mv in moves {
        board.make_move(mv).unwrap();
        let value = minimax(board, depth - 1, !maximizing);
        board.undo_move().unwrap();
        best = if maximizing {
            best.max(value)
        } else {
            best.min(value)
        };
    }
    best
}

#[test]
fn pruning_never_changes_the_reported_score() {
    // Deeper depths on the sparser positions keep the unpruned trees small
    let cases: &[(&str, u8)] = &[
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 2),
        ("k7/8/8/3q4/8/2N5/8/7K w - - 0 1", 3),
        ("8/2k5/8/8/4K3/8/8/7R b - - 0 1", 3),
        ("8/8/8/8/8/4k3/4P3/4K3 w - - 0 1", 4),
    ];

    for &(fen, max_depth) in cases {
        let mut board = Board::from_fen(fen).unwrap();
        let maximizing = board.side_to_move() == Color::White;
        for depth in 1..=max_depth {
            let pruned = search(&mut board, depth, i32::MIN, i32::MAX, maximizing);
            let full = minimax(&mut board, depth, maximizing);
            assert_eq!(pruned, full, "{fen} diverges at depth {depth}");
        }
    }
}

#[test]
fn depth_zero_search_is_the_static_evaluation() {
    let boards = [
        Board::new(),
        Board::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
            .unwrap(),
        Board::from_fen("8/2k5/8/8/4K3/8/8/7R w - - 12 40").unwrap(),
    ];
    let windows = [(i32::MIN, i32::MAX), (-50, 50), (200, 300)];

    for mut board in boards {
        let expected = evaluate_position(&board);
        for (alpha, beta) in windows {
            for maximizing in [true, false] {
                assert_eq!(search(&mut board, 0, alpha, beta, maximizing), expected);
            }
        }
    }
}

#[test]
fn selection_leaves_the_board_untouched() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        "k2q4/8/8/8/3Q4/8/8/6K1 b - - 0 1",
    ];
    for fen in fens {
        let mut board = Board::from_fen(fen).unwrap();
        select_best_move(&mut board, 2).unwrap();
        assert_eq!(board.to_fen(), fen, "board changed after selecting on {fen}");
    }
}

#[test]
fn selection_restores_the_board_throughout_a_random_playout() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut board = Board::new();

    for _ in 0..16 {
        let before = board.to_fen();
        let _ = select_best_move(&mut board, 1);
        assert_eq!(board.to_fen(), before);

        let moves = board.legal_moves();
        if moves.is_empty() || board.is_draw() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.make_move(mv).unwrap();
    }
}

#[test]
fn mate_in_one_is_found_and_scored_with_the_sentinel() {
    // Black mates on the back rank; the mated maximizer scores the minimum
    let mut board = Board::from_fen("k3r3/8/8/8/8/8/5PPP/6K1 b - - 0 1").unwrap();
    let chosen = select_best_move(&mut board, 2).unwrap();
    assert_eq!(chosen.mv.to_string(), "e8e1");
    assert_eq!(chosen.score, -MATE_SCORE);

    // Mirror: White mates, the mated minimizer scores the maximum
    let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/K3R3 w - - 0 1").unwrap();
    let chosen = select_best_move(&mut board, 2).unwrap();
    assert_eq!(chosen.mv.to_string(), "e1e8");
    assert_eq!(chosen.score, MATE_SCORE);
}

#[test]
fn repeated_selection_is_deterministic() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 4 4",
    ];
    for fen in fens {
        let mut board = Board::from_fen(fen).unwrap();
        let first = select_best_move(&mut board, 2).unwrap();
        for _ in 0..3 {
            assert_eq!(select_best_move(&mut board, 2).unwrap(), first);
        }
    }
}

#[test]
fn a_sound_opening_move_comes_out_of_the_start_position() {
    let mut board = Board::new();
    let legal = board.legal_moves();
    assert_eq!(legal.len(), 20);

    let chosen = select_best_move(&mut board, 2).unwrap();
    assert!(legal.contains(&chosen.mv));
    // The start position is symmetric, so the score stays near level
    assert!(chosen.score.abs() <= 50, "score {} off balance", chosen.score);
}

#[test]
fn a_hanging_queen_is_taken() {
    // White's queen on d4 is undefended and Black's queen sees it
    let mut board = Board::from_fen("k2q4/8/8/8/3Q4/8/8/6K1 b - - 0 1").unwrap();
    let chosen = select_best_move(&mut board, 2).unwrap();
    assert_eq!(chosen.mv.to_string(), "d8d4");
    // Neither queen sits on a bonus square, so the swing is the full piece
    assert_eq!(chosen.score, -900);
}

#[test]
fn stalemate_yields_no_move_and_reads_as_a_draw() {
    let mut board = Board::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
    assert_eq!(select_best_move(&mut board, 2), None);
    assert!(board.is_draw());
    assert!(!board.is_checkmate());
}
