//! Intensity-weighted centre line of an aligned volume.

use serde::{Deserialize, Serialize};

use crate::volume::VolumeSample;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackbonePoint {
    pub x: usize,
    pub mean_y: f64,
    pub mean_z: f64,
    /// W(x) = Σ w over the YZ slice at `x`; always > 0.
    pub total_weight: f64,
}

/// Backbone points in increasing `x`; slices without signal are absent.
pub type BackboneCurve = Vec<BackbonePoint>;

/// Per-X weighted first moments of the aligned sample, accumulated in
/// storage order.
pub fn extract_backbone(sample: &VolumeSample) -> BackboneCurve {
    let grid = sample.grid();
    let width = grid.width();

    let mut weight = vec![0.0f64; width];
    let mut sum_y = vec![0.0f64; width];
    let mut sum_z = vec![0.0f64; width];

    for (z, plane) in grid.slices().enumerate() {
        for (i, &v) in plane.iter().enumerate() {
            if v > 0.0 {
                let (x, y) = (i % width, i / width);
                let w = v as f64;
                weight[x] += w;
                sum_y[x] += w * y as f64;
                sum_z[x] += w * z as f64;
            }
        }
    }

    weight
        .iter()
        .enumerate()
        .filter(|(_, &w)| w > 0.0)
        .map(|(x, &w)| BackbonePoint {
            x,
            mean_y: sum_y[x] / w,
            mean_z: sum_z[x] / w,
            total_weight: w,
        })
        .collect()
}
