use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tracker_core::types::{Category, Detection};
use tracker_core::{Tracker, TrackerConfig};

/// One frame of `n` people spread on a ring, nudged outward by `step` px.
fn make_frame(n: usize, step: u32) -> Vec<Detection> {
    (0..n)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / n as f64;
            let r = 2000.0;
            let x = (4000.0 + r * angle.cos()) as u32 + step;
            let y = (4000.0 + r * angle.sin()) as u32 + step;
            Detection::new(Category::Person, x, y, 20, 40)
        })
        .collect()
}

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker_cycle");

    for n in [10, 50, 200] {
        group.bench_function(format!("{n}_tracks"), |b| {
            b.iter(|| {
                let config = TrackerConfig {
                    quiet: true,
                    max_dist: 50.0,
                    ..TrackerConfig::default()
                };
                let mut tracker = Tracker::new(config, None);
                // Warm-up frame births the tracks.
                tracker.inbox().add_message(make_frame(n, 0));
                tracker.cycle();
                // Measured frame exercises the full association path.
                tracker.inbox().add_message(make_frame(n, 5));
                black_box(tracker.cycle());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cycle);
criterion_main!(benches);
