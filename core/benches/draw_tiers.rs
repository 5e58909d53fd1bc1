use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gemsweep_core::{RandomSelector, TileSelector};
use std::hint::black_box;

fn draw_tiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");
    for (total, count) in [(25u16, 3u16), (25, 24), (400, 80), (10_000, 2_000)] {
        let mut selector = RandomSelector::seeded(u64::from(total) * 31 + u64::from(count));
        group.bench_function(BenchmarkId::new(format!("{total}"), count), |b| {
            b.iter(|| black_box(selector.draw(black_box(total), black_box(count))))
        });
    }
    group.finish();
}

criterion_group!(benches, draw_tiers);
criterion_main!(benches);
