//! Geometric volume and fluorescence density.
//!
//! Both measures are rotation invariant and run on the unaligned input.

use serde::{Deserialize, Serialize};

use crate::config::FluorescenceConfig;
use crate::error::{DegenerateReason, Error, Result};
use crate::volume::VolumeSample;

mod projection;
mod threshold;


pub use projection::max_intensity_projection;
pub use threshold::triangle_threshold;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeFluorescence {
    /// Voxels above the occupancy threshold.
    pub occupied_voxels: usize,
    /// `occupied_voxels · δx·δy·δz` in µm³.
    pub geometric_volume: f64,
    /// Triangle threshold of the max projection.
    pub threshold: f32,
    /// Projection pixels strictly above `threshold`.
    pub region_pixels: usize,
    /// Mean projected intensity over the region.
    pub fluorescence_px: f64,
    /// Projected intensity over the region per µm².
    pub fluorescence_um2: f64,
}

pub fn compute_volume_fluorescence(sample: &VolumeSample) -> Result<VolumeFluorescence> {
    compute_volume_fluorescence_with(sample, sample, &FluorescenceConfig::default())
}

/// Geometric volume from `structure`, fluorescence density from `signal`.
///
/// Pass the same sample twice for single-channel data. A separate signal
/// channel must share the structure's dimensions and spacing.
pub fn compute_volume_fluorescence_with(
    structure: &VolumeSample,
    signal: &VolumeSample,
    config: &FluorescenceConfig,
) -> Result<VolumeFluorescence> {
    config.validate();

    if structure.dimensions() != signal.dimensions() {
        return Err(Error::DimensionMismatch {
            what: "fluorescence channel",
            expected: structure.dimensions().to_string(),
            actual: signal.dimensions().to_string(),
        });
    }
    if structure.spacing() != signal.spacing() {
        return Err(Error::DimensionMismatch {
            what: "fluorescence channel spacing",
            expected: format!("{:?}", structure.spacing()),
            actual: format!("{:?}", signal.spacing()),
        });
    }

    let spacing = structure.spacing();

    let occupied_voxels = structure
        .intensity()
        .iter()
        .filter(|&&v| v > config.occupancy_threshold)
        .count();
    let geometric_volume = occupied_voxels as f64 * spacing.voxel_volume();

    let projection = max_intensity_projection(signal);
    let threshold = triangle_threshold(&projection, config.histogram_bins);

    let (mut region_pixels, mut region_sum) = (0usize, 0.0f64);
    for &v in &projection {
        if v > threshold {
            region_pixels += 1;
            region_sum += v as f64;
        }
    }
    if region_pixels == 0 {
        return Err(Error::degenerate(DegenerateReason::EmptyThresholdRegion));
    }

    let fluorescence_px = region_sum / region_pixels as f64;
    let fluorescence_um2 = region_sum / (region_pixels as f64 * spacing.pixel_area());

    tracing::debug!(
        occupied_voxels,
        geometric_volume,
        threshold,
        region_pixels,
        fluorescence_px,
        "Volume and fluorescence"
    );

    Ok(VolumeFluorescence {
        occupied_voxels,
        geometric_volume,
        threshold,
        region_pixels,
        fluorescence_px,
        fluorescence_um2,
    })
}
