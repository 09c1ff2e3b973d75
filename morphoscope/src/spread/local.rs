//! Per-slice transverse spread around the backbone.

use serde::{Deserialize, Serialize};

use super::backbone::BackbonePoint;
use crate::volume::VolumeSample;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalSpreadPoint {
    pub x: usize,
    pub sigma_y: f64,
    pub sigma_z: f64,
    pub total_weight: f64,
}

/// One record per backbone point, in the same order.
pub type LocalSpread = Vec<LocalSpreadPoint>;

/// Weighted standard deviations of Y and Z within each X slice, using the
/// backbone means and the same weight set.
pub fn estimate_local_spread(sample: &VolumeSample, backbone: &[BackbonePoint]) -> LocalSpread {
    let grid = sample.grid();
    let width = grid.width();

    let mut slot = vec![usize::MAX; width];
    for (i, point) in backbone.iter().enumerate() {
        slot[point.x] = i;
    }

    let mut var_y = vec![0.0f64; backbone.len()];
    let mut var_z = vec![0.0f64; backbone.len()];

    for (z, plane) in grid.slices().enumerate() {
        for (i, &v) in plane.iter().enumerate() {
            if v <= 0.0 {
                continue;
            }
            let (x, y) = (i % width, i / width);
            let k = slot[x];
            debug_assert!(k != usize::MAX, "voxel at x={} missing from backbone", x);
            let point = &backbone[k];
            let w = v as f64;
            let dy = y as f64 - point.mean_y;
            let dz = z as f64 - point.mean_z;
            var_y[k] += w * dy * dy;
            var_z[k] += w * dz * dz;
        }
    }

    backbone
        .iter()
        .enumerate()
        .map(|(k, point)| LocalSpreadPoint {
            x: point.x,
            sigma_y: (var_y[k] / point.total_weight).sqrt(),
            sigma_z: (var_z[k] / point.total_weight).sqrt(),
            total_weight: point.total_weight,
        })
        .collect()
}
