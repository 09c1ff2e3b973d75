//! PCA alignment of a volume into its principal-axis frame.
//!
//! The in-plane principal axis of the intensity-weighted Z-sum projection
//! becomes the new X axis. Z is never rotated. The sign of the axis is chosen
//! so the weighted skew along +X is non-negative, which makes the result
//! independent of how the specimen was placed on the stage.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::AlignmentConfig;
use crate::error::{DegenerateReason, Error, Result};
use crate::volume::VolumeSample;

mod covariance;
mod rotate;


use covariance::{plane_moments, principal_axis, skewness_along, z_sum_projection};
use rotate::{resample, Canvas};

/// Fixed quarter turn applied after the principal-axis rotation.
pub const STANDARDIZATION_DEG: f64 = 90.0;

/// Relative difference between δx and δy above which the index-space
/// rotation is reported as distorting.
const ANISOTROPY_WARN_TOLERANCE: f64 = 1e-6;

/// How the input was turned to reach the aligned frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Principal-axis angle from the input +X axis, folded into (-90, 90].
    pub pca_angle_deg: f64,
    /// True when the direction was reversed to make the skew non-negative.
    pub flipped: bool,
    /// Always [`STANDARDIZATION_DEG`].
    pub standardization_deg: f64,
    /// Covariance eigenvalues of the Z-sum projection, in px².
    pub major_variance: f64,
    pub minor_variance: f64,
    /// The eigenvalue gap was below tolerance and the input X axis was kept.
    pub isotropic: bool,
}

impl Orientation {
    /// Angle of the final +X axis in the input frame, in [0, 360).
    pub fn principal_direction_deg(&self) -> f64 {
        let angle = if self.flipped {
            self.pca_angle_deg + 180.0
        } else {
            self.pca_angle_deg
        };
        angle.rem_euclid(360.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSample {
    pub sample: VolumeSample,
    pub orientation: Orientation,
}

/// Align with the default configuration.
pub fn align(sample: &VolumeSample) -> Result<AlignedSample> {
    align_with(sample, &AlignmentConfig::default())
}

pub fn align_with(sample: &VolumeSample, config: &AlignmentConfig) -> Result<AlignedSample> {
    config.validate();

    let spacing = sample.spacing();
    if (spacing.x - spacing.y).abs() > ANISOTROPY_WARN_TOLERANCE * spacing.x.max(spacing.y) {
        tracing::warn!(
            dx = spacing.x,
            dy = spacing.y,
            "Anisotropic in-plane spacing: rotation is done in index space"
        );
    }

    // Step 1: restrict to the in-plane extent of the signal
    let bounds = sample
        .signal_bounds()
        .ok_or_else(|| Error::degenerate(DegenerateReason::ZeroTotalIntensity))?;
    let cropped = sample.crop_xy(bounds);
    let width = cropped.dimensions().width;

    // Step 2: weighted moments of the Z-sum projection
    let projection = z_sum_projection(&cropped);
    let moments = plane_moments(&projection, width)
        .ok_or_else(|| Error::degenerate(DegenerateReason::ZeroTotalIntensity))?;
    let axis = principal_axis(moments.covariance, config.isotropy_tolerance);

    // Step 3: resolve the 180° ambiguity by skew
    let mut u = axis.direction();
    let skew = skewness_along(&projection, width, &moments, u);
    let flipped = skew < -config.skew_tolerance;
    if flipped {
        u = -u;
    }

    tracing::debug!(
        angle_deg = axis.angle.to_degrees(),
        major = axis.major,
        minor = axis.minor,
        isotropic = axis.isotropic,
        skew,
        flipped,
        "Principal axis"
    );

    // Step 4: resample about the nearest pixel to the centroid, then quarter turn
    let pivot = DVec2::new(moments.centroid.x.round(), moments.centroid.y.round());
    let canvas = Canvas::enclosing(width, cropped.dimensions().height, pivot, u);
    let grid = resample(&cropped, &canvas, config.interpolation);
    let aligned = VolumeSample::from_parts(grid, spacing);

    let before = moments.total;
    let after = aligned.total_intensity();
    tracing::debug!(
        input = %sample.dimensions(),
        cropped = %cropped.dimensions(),
        aligned = %aligned.dimensions(),
        intensity_loss = if before > 0.0 { 1.0 - after / before } else { 0.0 },
        "Resampled into principal frame"
    );

    Ok(AlignedSample {
        sample: aligned,
        orientation: Orientation {
            pca_angle_deg: axis.angle.to_degrees(),
            flipped,
            standardization_deg: STANDARDIZATION_DEG,
            major_variance: axis.major,
            minor_variance: axis.minor,
            isotropic: axis.isotropic,
        },
    })
}
