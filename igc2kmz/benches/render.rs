//! Benchmarks pour le rendu KML

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use igc::{Fix, Track};
use igc2kmz::kml::{self, TrackDocument};
use igc2kmz::{Config, Rgb};

/// Trace synthétique de `fixes` points
fn synthetic_track(fixes: usize) -> Track {
    Track {
        pilot: Some("Bench".to_string()),
        date: None,
        fixes: (0..fixes)
            .map(|i| {
                let step = i as f64 * 1e-5;
                Fix::new(45.0 + step, 6.0 + step, 800 + (i % 2000) as i32)
            })
            .collect(),
    }
}

fn bench_render(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("render_kml");

    for fixes in [1_000usize, 10_000, 36_000] {
        let track = synthetic_track(fixes);
        group.bench_with_input(BenchmarkId::from_parameter(fixes), &track, |b, track| {
            b.iter(|| {
                let root = TrackDocument::from_track(
                    black_box(track),
                    "bench",
                    Rgb::new(255, 0, 0),
                    &config,
                )
                .into_element();
                black_box(kml::to_string(&root).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
