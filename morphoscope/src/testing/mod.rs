//! Testing utilities for morphoscope.

use common::Buffer3;

use crate::volume::{Spacing, VolumeSample};

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "warn".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Sample whose voxel (x, y, z) is `f(x, y, z)`.
pub fn volume_from_fn(
    width: usize,
    height: usize,
    depth: usize,
    spacing: Spacing,
    f: impl Fn(usize, usize, usize) -> f32,
) -> VolumeSample {
    let mut grid = Buffer3::new_default(width, height, depth);
    for z in 0..depth {
        for y in 0..height {
            for x in 0..width {
                grid[(x, y, z)] = f(x, y, z);
            }
        }
    }
    VolumeSample::from_buffer(grid, spacing).unwrap()
}

/// Relative difference `|a - b| / max(|a|, |b|)`, zero when both are zero.
pub fn relative_diff(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        0.0
    } else {
        (a - b).abs() / scale
    }
}
