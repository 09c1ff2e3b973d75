//! MorphoScope - spread quantification of axonal projections in confocal volumes.
//!
//! A sample is rotated into its in-plane principal-axis frame, reduced to a
//! backbone curve with per-slice transverse spreads, and summarized as global
//! spreads along X, Y and Z together with intensity-weighted volume and
//! fluorescence density.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use morphoscope::{Analyzer, Spacing, VolumeDimensions, VolumeSample};
//!
//! let spacing = Spacing::new(0.1, 0.1, 1.0)?;
//! let sample = VolumeSample::new(VolumeDimensions::new(800, 800, 20), voxels, spacing)?;
//!
//! let metrics = Analyzer::new().analyze(&sample)?;
//! println!("spread x = {:.2} µm", metrics.spread_um.x);
//! ```

pub(crate) mod alignment;
mod config;
mod error;
pub(crate) mod fluorescence;
mod metrics;
mod pipeline;
pub(crate) mod spread;
pub mod synthetic;
mod volume;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Errors and configuration
// ============================================================================

pub use config::{
    AlignmentConfig, AnalysisConfig, FluorescenceConfig, Interpolation, SpacingLimits,
    SpreadConfig, TransverseAggregation,
};
pub use error::{DegenerateReason, Error, Result};

// ============================================================================
// Volumes
// ============================================================================

pub use volume::{PlaneBox, RoiMask, Spacing, VolumeDimensions, VolumeSample};

// ============================================================================
// Alignment
// ============================================================================

pub use alignment::{align, align_with, AlignedSample, Orientation, STANDARDIZATION_DEG};

// ============================================================================
// Spread
// ============================================================================

pub use spread::{
    compute_spread_metrics, compute_spread_metrics_with, estimate_local_spread, extract_backbone,
    reduce, AxisSpreads, BackboneCurve, BackbonePoint, LocalSpread, LocalSpreadPoint,
    SpreadMetrics,
};

// ============================================================================
// Volume and fluorescence
// ============================================================================

pub use fluorescence::{
    compute_volume_fluorescence, compute_volume_fluorescence_with, max_intensity_projection,
    triangle_threshold, VolumeFluorescence,
};

// ============================================================================
// Results
// ============================================================================

pub use metrics::{ExportRow, MetricsRecord};
pub use pipeline::{analyze, AnalysisReport, Analyzer};
