//! Spread quantification of an aligned volume.
//!
//! Three stages, each a pure function of the previous one:
//! 1. [`extract_backbone`] - weighted (Y, Z) centre per X slice
//! 2. [`estimate_local_spread`] - weighted σ of Y and Z per X slice
//! 3. [`reduce`] - global spreads in pixel and physical units

use serde::{Deserialize, Serialize};

use crate::config::SpreadConfig;
use crate::error::{DegenerateReason, Error, Result};
use crate::volume::VolumeSample;

mod backbone;
mod global;
mod local;


pub use backbone::{extract_backbone, BackboneCurve, BackbonePoint};
pub use global::{reduce, AxisSpreads};
pub use local::{estimate_local_spread, LocalSpread, LocalSpreadPoint};

/// Spreads of one aligned sample together with the curves behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadMetrics {
    pub pixel: AxisSpreads,
    pub physical: AxisSpreads,
    /// `M = Σ w · δx·δy·δz` over the aligned sample.
    pub axonal_volume: f64,
    /// Raw Σ w over the aligned sample.
    pub integrated_intensity: f64,
    pub backbone: BackboneCurve,
    pub local: LocalSpread,
}

pub fn compute_spread_metrics(sample: &VolumeSample) -> Result<SpreadMetrics> {
    compute_spread_metrics_with(sample, &SpreadConfig::default())
}

pub fn compute_spread_metrics_with(
    sample: &VolumeSample,
    config: &SpreadConfig,
) -> Result<SpreadMetrics> {
    let spacing = sample.spacing();
    let voxel_volume = spacing.voxel_volume();

    let backbone = extract_backbone(sample);
    let local = estimate_local_spread(sample, &backbone);

    let pixel = reduce(&local, [1.0; 3], voxel_volume, config.transverse)?;
    let physical = reduce(
        &local,
        [spacing.x, spacing.y, spacing.z],
        voxel_volume,
        config.transverse,
    )?;

    let integrated_intensity: f64 = local.iter().map(|p| p.total_weight).sum();
    let axonal_volume = integrated_intensity * voxel_volume;
    if axonal_volume <= 0.0 {
        return Err(Error::degenerate(DegenerateReason::ZeroAggregateWeight));
    }

    tracing::debug!(
        slices = local.len(),
        spread_x = pixel.x,
        spread_y = pixel.y,
        spread_z = pixel.z,
        axonal_volume,
        "Spread metrics"
    );

    Ok(SpreadMetrics {
        pixel,
        physical,
        axonal_volume,
        integrated_intensity,
        backbone,
        local,
    })
}
