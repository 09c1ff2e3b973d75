//! Benchmarks for alignment and the full per-sample analysis.
//!
//! Run with: cargo bench -p morphoscope --bench pipeline

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::DVec3;
use morphoscope::synthetic::{Edge, Shape, VolumeSpec};
use morphoscope::{align, analyze, compute_volume_fluorescence, VolumeSample};

fn oblique_ellipsoid() -> VolumeSample {
    let spec = VolumeSpec::default();
    spec.render_shape(
        Shape::Ellipsoid {
            center: spec.center_um(),
            radii: DVec3::new(20.0, 4.0, 5.0),
            rotation_deg: 35.0,
        },
        1000.0,
        Edge::Smooth { width_um: 0.2 },
    )
}

fn pipeline_benchmarks(c: &mut Criterion) {
    let sample = oblique_ellipsoid();

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    group.bench_function("align", |b| b.iter(|| align(black_box(&sample))));
    group.bench_function("fluorescence", |b| {
        b.iter(|| compute_volume_fluorescence(black_box(&sample)))
    });
    group.bench_function("analyze", |b| b.iter(|| analyze(black_box(&sample))));

    group.finish();
}

criterion_group!(benches, pipeline_benchmarks);
criterion_main!(benches);
