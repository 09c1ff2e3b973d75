//! Error types for volume analysis.

use std::fmt;

use thiserror::Error;

use crate::volume::VolumeDimensions;

/// Why a sample could not produce a meaningful measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// Every voxel is zero, so no weighted statistic exists.
    ZeroTotalIntensity,
    /// The aligned sample has no weight left for the spread denominators.
    ZeroAggregateWeight,
    /// Nothing in the max projection lies above the triangle threshold.
    EmptyThresholdRegion,
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ZeroTotalIntensity => "total intensity is zero",
            Self::ZeroAggregateWeight => "aggregate weight is zero",
            Self::EmptyThresholdRegion => "no projection pixel exceeds the triangle threshold",
        };
        f.write_str(text)
    }
}

/// Errors produced while building or analyzing a volume sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Degenerate input: {reason}")]
    DegenerateInput { reason: DegenerateReason },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Invalid voxel spacing {axis}={value}: must be positive and finite")]
    InvalidSpacing { axis: char, value: f64 },

    #[error("Invalid intensity {value} at voxel {index}: must be non-negative and finite")]
    InvalidIntensity { index: usize, value: f32 },

    #[error("Invalid z range {start}..={end} for a volume of depth {depth}")]
    InvalidZRange {
        start: usize,
        end: usize,
        depth: usize,
    },
}

impl Error {
    pub(crate) fn degenerate(reason: DegenerateReason) -> Self {
        Self::DegenerateInput { reason }
    }

    pub(crate) fn grid_length(dims: VolumeDimensions, actual: usize) -> Self {
        Self::DimensionMismatch {
            what: "voxel grid",
            expected: format!("{} voxels ({})", dims.voxel_count(), dims),
            actual: format!("{} voxels", actual),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
