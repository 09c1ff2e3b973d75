//! Reduction of the local spread curve to scalar spreads.

use serde::{Deserialize, Serialize};

use super::local::LocalSpreadPoint;
use crate::config::TransverseAggregation;
use crate::error::{DegenerateReason, Error, Result};

/// Spread along each aligned axis plus the exact area/volume products.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpreads {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub xy: f64,
    pub xyz: f64,
}

impl AxisSpreads {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            xy: x * y,
            xyz: x * y * z,
        }
    }
}

/// Reduce `curve` to global spreads.
///
/// `scale` multiplies the positional terms per axis before the reduction
/// (1 for pixel units, the voxel spacing for µm). `voxel_volume` weights every
/// voxel in the aggregate `M = Σ w · voxel_volume`; it cancels in the ratios
/// but keeps the denominators physically meaningful.
pub fn reduce(
    curve: &[LocalSpreadPoint],
    scale: [f64; 3],
    voxel_volume: f64,
    transverse: TransverseAggregation,
) -> Result<AxisSpreads> {
    let [sx, sy, sz] = scale;

    let mut mass = 0.0;
    let mut first_x = 0.0;
    for point in curve {
        let m = point.total_weight * voxel_volume;
        mass += m;
        first_x += point.x as f64 * sx * m;
    }
    if mass <= 0.0 {
        return Err(Error::degenerate(DegenerateReason::ZeroAggregateWeight));
    }
    let mean_x = first_x / mass;

    let (mut var_x, mut acc_y, mut acc_z) = (0.0, 0.0, 0.0);
    for point in curve {
        let m = point.total_weight * voxel_volume;
        let dx = point.x as f64 * sx - mean_x;
        var_x += dx * dx * m;

        let sigma_y = point.sigma_y * sy;
        let sigma_z = point.sigma_z * sz;
        match transverse {
            TransverseAggregation::MeanSigma => {
                acc_y += sigma_y * m;
                acc_z += sigma_z * m;
            }
            TransverseAggregation::RootMeanVariance => {
                acc_y += sigma_y * sigma_y * m;
                acc_z += sigma_z * sigma_z * m;
            }
        }
    }

    let x = (var_x / mass).sqrt();
    let (y, z) = match transverse {
        TransverseAggregation::MeanSigma => (acc_y / mass, acc_z / mass),
        TransverseAggregation::RootMeanVariance => ((acc_y / mass).sqrt(), (acc_z / mass).sqrt()),
    };

    Ok(AxisSpreads::new(x, y, z))
}
