use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rook_and_ply::game_state::chess_types::Position;
use rook_and_ply::search::iterative_deepening::{SearchConfig, SearchEngine, SearchMode};

struct SearchCase {
    name: &'static str,
    fen: &'static str,
    depth: u8,
}

const CASES: &[SearchCase] = &[
    SearchCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depth: 4,
    },
    SearchCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depth: 3,
    },
    SearchCase {
        name: "middlegame",
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        depth: 3,
    },
    SearchCase {
        name: "rook_endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depth: 5,
    },
];

/// Each iteration uses a fresh engine so transposition-table hits from a
/// previous sample do not flatter the timing.
fn bench_fixed_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_fixed_depth");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    for case in CASES {
        let position = Position::from_fen(case.fen).expect("benchmark FEN should parse");
        let config = SearchConfig {
            max_depth: case.depth,
            mode: SearchMode::DepthBounded,
            ..SearchConfig::default()
        };

        let warmup = SearchEngine::new(config).get_best_move(&position);
        assert!(warmup.best_move.is_some(), "{} should have a move", case.name);
        assert_eq!(warmup.reached_depth, case.depth);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_d{}", case.name, case.depth)),
            &position,
            |b, position| {
                b.iter(|| {
                    let mut engine = SearchEngine::new(config);
                    let result = engine.get_best_move(black_box(position));
                    black_box(result.nodes)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(search_benches, bench_fixed_depth);
criterion_main!(search_benches);
