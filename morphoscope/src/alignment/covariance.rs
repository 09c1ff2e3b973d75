//! Intensity-weighted in-plane moments of the Z-sum projection.

use glam::{DMat2, DVec2};

use crate::volume::VolumeSample;

/// Σ over z of every (x, y) column, row-major `x + width * y`.
pub(crate) fn z_sum_projection(sample: &VolumeSample) -> Vec<f64> {
    let grid = sample.grid();
    let mut projection = vec![0.0f64; grid.slice_len()];
    for plane in grid.slices() {
        for (acc, &v) in projection.iter_mut().zip(plane) {
            *acc += v as f64;
        }
    }
    projection
}

/// First and second weighted moments of a 2D weight map.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlaneMoments {
    pub total: f64,
    pub centroid: DVec2,
    /// `[[cxx, cxy], [cxy, cyy]]`, normalized by `total`.
    pub covariance: DMat2,
}

pub(crate) fn plane_moments(weights: &[f64], width: usize) -> Option<PlaneMoments> {
    let mut total = 0.0;
    let mut first = DVec2::ZERO;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            total += w;
            first += w * pixel_position(i, width);
        }
    }
    if total <= 0.0 {
        return None;
    }
    let centroid = first / total;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            let d = pixel_position(i, width) - centroid;
            sxx += w * d.x * d.x;
            syy += w * d.y * d.y;
            sxy += w * d.x * d.y;
        }
    }
    let covariance = DMat2::from_cols(
        DVec2::new(sxx / total, sxy / total),
        DVec2::new(sxy / total, syy / total),
    );

    Some(PlaneMoments {
        total,
        centroid,
        covariance,
    })
}

/// Dominant direction of a symmetric 2x2 covariance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PrincipalAxis {
    /// Angle of the major axis from +X in radians, folded into (-π/2, π/2].
    pub angle: f64,
    pub major: f64,
    pub minor: f64,
    pub isotropic: bool,
}

impl PrincipalAxis {
    #[inline]
    pub fn direction(&self) -> DVec2 {
        DVec2::new(self.angle.cos(), self.angle.sin())
    }
}

/// Closed-form eigen decomposition. When the eigenvalue gap is below
/// `isotropy_tolerance * trace` the input X axis is kept.
pub(crate) fn principal_axis(covariance: DMat2, isotropy_tolerance: f64) -> PrincipalAxis {
    let cxx = covariance.x_axis.x;
    let cxy = covariance.x_axis.y;
    let cyy = covariance.y_axis.y;

    let trace = cxx + cyy;
    let half_diff = 0.5 * (cxx - cyy);
    let radius = (half_diff * half_diff + cxy * cxy).sqrt();
    let major = 0.5 * trace + radius;
    let minor = (0.5 * trace - radius).max(0.0);

    let isotropic = trace <= 0.0 || 2.0 * radius <= isotropy_tolerance * trace;
    let angle = if isotropic {
        0.0
    } else {
        // atan2 lies in (-π, π], so half of it is already in (-π/2, π/2].
        0.5 * (2.0 * cxy).atan2(cxx - cyy)
    };

    PrincipalAxis {
        angle,
        major,
        minor,
        isotropic,
    }
}

/// Weighted third central moment along `direction`, normalized to a
/// dimensionless skewness. Zero when the spread along `direction` is zero.
pub(crate) fn skewness_along(
    weights: &[f64],
    width: usize,
    moments: &PlaneMoments,
    direction: DVec2,
) -> f64 {
    let (mut m2, mut m3) = (0.0, 0.0);
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            let t = (pixel_position(i, width) - moments.centroid).dot(direction);
            m2 += w * t * t;
            m3 += w * t * t * t;
        }
    }
    m2 /= moments.total;
    m3 /= moments.total;
    if m2 <= 0.0 {
        return 0.0;
    }
    m3 / m2.powf(1.5)
}

#[inline]
fn pixel_position(index: usize, width: usize) -> DVec2 {
    DVec2::new((index % width) as f64, (index / width) as f64)
}
