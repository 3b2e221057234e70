use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_rules::Board;
use chess_search::select_best_move;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    },
    BenchCase {
        name: "italian",
        fen: "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    },
    BenchCase {
        name: "rook_endgame",
        fen: "8/2k5/8/8/4K3/8/8/7R w - - 0 1",
    },
];

fn bench_select_best_move(c: &mut Criterion) {
    let depth = std::env::var("BOT_BENCH_DEPTH")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(2)
        .max(1);

    let mut group = c.benchmark_group("select_best_move");
    group.sample_size(10);

    for case in CASES {
        group.bench_with_input(BenchmarkId::new(case.name, depth), case, |b, case| {
            let mut board = Board::from_fen(case.fen).unwrap();
            b.iter(|| black_box(select_best_move(&mut board, depth)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select_best_move);
criterion_main!(benches);
