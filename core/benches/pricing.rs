use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use minestake_core::*;

fn multiplier_curve(c: &mut Criterion) {
    let rules = PayoutRules::default();
    c.bench_function("multiplier curve 5 bombs", |b| {
        b.iter(|| {
            let rtp = rules.adjusted_rtp(0, 25, black_box(5));
            (0..=20)
                .map(|revealed| compute_multiplier(rtp, revealed, 25, 5))
                .sum::<f64>()
        })
    });
}

fn hint_quotes(c: &mut Criterion) {
    let mut group = c.benchmark_group("hint quotes");
    for model in [EntropyModel::Hypergeometric, EntropyModel::Legacy] {
        let rules = PayoutRules {
            entropy_model: model,
            ..PayoutRules::default()
        };
        let config = GameConfig::new(10.0, 8);
        let layout = RandomLayoutGenerator::new(42).generate(&config);
        let safe: Vec<_> = (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
            .filter(|&coords| !layout.contains_bomb(coords))
            .take(6)
            .collect();
        let mut session = Session::start(1000.0, config, rules, layout).unwrap();
        for coords in safe {
            session.reveal(coords).unwrap();
        }

        group.bench_function(format!("{model:?}"), |b| {
            b.iter(|| black_box(&session).hint_pricing().quotes().count())
        });
    }
    group.finish();
}

criterion_group!(benches, multiplier_curve, hint_quotes);
criterion_main!(benches);
