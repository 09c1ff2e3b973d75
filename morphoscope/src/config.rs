//! Configuration types for the analysis pipeline.
//!
//! Every struct has a `Default` that reproduces the reference measurement and a
//! `validate()` that panics on values no caller should ever pass.

use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// Sampling used when the volume is resampled into the principal-axis frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Order-1 interpolation between the four neighbouring pixels of a slice.
    #[default]
    Bilinear,
    /// Take the closest source pixel. Preserves the intensity histogram.
    Nearest,
}

/// How per-slice transverse deviations are reduced to one spread value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransverseAggregation {
    /// Weight-averaged standard deviation: `Σ σ(x)·W(x) / Σ W(x)`.
    #[default]
    MeanSigma,
    /// Square root of the weight-averaged variance: `sqrt(Σ σ(x)²·W(x) / Σ W(x))`.
    ///
    /// Always >= `MeanSigma`; the two agree when σ is constant along X.
    RootMeanVariance,
}

// ============================================================================
// Alignment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    pub interpolation: Interpolation,
    /// Relative eigenvalue gap `(λ1 - λ2) / (λ1 + λ2)` below which the
    /// covariance is treated as isotropic and the input X axis is kept.
    pub isotropy_tolerance: f64,
    /// Relative third moment below which the skew counts as zero and the
    /// principal direction is not flipped.
    pub skew_tolerance: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Bilinear,
            isotropy_tolerance: 1e-6,
            skew_tolerance: 1e-9,
        }
    }
}

impl AlignmentConfig {
    pub fn validate(&self) {
        assert!(
            (0.0..1.0).contains(&self.isotropy_tolerance),
            "isotropy_tolerance must be in [0, 1), got {}",
            self.isotropy_tolerance
        );
        assert!(
            self.skew_tolerance >= 0.0 && self.skew_tolerance.is_finite(),
            "skew_tolerance must be non-negative and finite, got {}",
            self.skew_tolerance
        );
    }
}

// ============================================================================
// Spread
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpreadConfig {
    pub transverse: TransverseAggregation,
}

// ============================================================================
// Fluorescence
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluorescenceConfig {
    /// Histogram bins for the triangle threshold.
    pub histogram_bins: usize,
    /// A voxel counts towards the geometric volume when its intensity is
    /// strictly above this value.
    pub occupancy_threshold: f32,
}

impl Default for FluorescenceConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 256,
            occupancy_threshold: 0.0,
        }
    }
}

impl FluorescenceConfig {
    pub fn validate(&self) {
        assert!(
            self.histogram_bins >= 2,
            "histogram_bins must be >= 2, got {}",
            self.histogram_bins
        );
        assert!(
            self.occupancy_threshold >= 0.0 && self.occupancy_threshold.is_finite(),
            "occupancy_threshold must be non-negative and finite, got {}",
            self.occupancy_threshold
        );
    }
}

// ============================================================================
// Spacing plausibility
// ============================================================================

/// Voxel sizes above these limits are accepted but logged as suspicious,
/// they usually mean the metadata was read in the wrong unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingLimits {
    /// Largest plausible in-plane pixel size in µm.
    pub max_xy_um: f64,
    /// Largest plausible z-step in µm.
    pub max_z_um: f64,
}

impl Default for SpacingLimits {
    fn default() -> Self {
        Self {
            max_xy_um: 10.0,
            max_z_um: 50.0,
        }
    }
}

impl SpacingLimits {
    pub fn validate(&self) {
        assert!(
            self.max_xy_um > 0.0,
            "max_xy_um must be positive, got {}",
            self.max_xy_um
        );
        assert!(
            self.max_z_um > 0.0,
            "max_z_um must be positive, got {}",
            self.max_z_um
        );
    }
}

// ============================================================================
// Full analysis
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub alignment: AlignmentConfig,
    pub spread: SpreadConfig,
    pub fluorescence: FluorescenceConfig,
    pub spacing_limits: SpacingLimits,
}

impl AnalysisConfig {
    pub fn validate(&self) {
        self.alignment.validate();
        self.fluorescence.validate();
        self.spacing_limits.validate();
    }
}
