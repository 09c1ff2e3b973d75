//! Masked intensity grids with physical voxel spacing.
//!
//! A [`VolumeSample`] is immutable: z-range selection, ROI masking and
//! cropping all return a fresh sample.

use std::fmt;
use std::ops::RangeInclusive;

use common::Buffer3;
use serde::{Deserialize, Serialize};

use crate::config::SpacingLimits;
use crate::error::{Error, Result};

pub(crate) mod bbox;

#[cfg(test)]
mod tests;

pub use bbox::PlaneBox;

// ============================================================================
// Dimensions and spacing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDimensions {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl VolumeDimensions {
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    #[inline]
    pub const fn voxel_count(&self) -> usize {
        self.width * self.height * self.depth
    }
}

impl fmt::Display for VolumeDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// Voxel edge lengths in micrometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Spacing {
    /// Spacing of 1 on every axis; physical results then equal pixel results.
    pub const UNIT: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        for (axis, value) in [('x', x), ('y', y), ('z', z)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidSpacing { axis, value });
            }
        }
        Ok(Self { x, y, z })
    }

    /// Physical volume of one voxel in µm³.
    #[inline]
    pub fn voxel_volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// Physical area of one XY pixel in µm².
    #[inline]
    pub fn pixel_area(&self) -> f64 {
        self.x * self.y
    }

    /// Log a warning for sizes that are legal but implausible for confocal data.
    /// Returns true when every axis is within limits.
    pub fn check_plausibility(&self, limits: &SpacingLimits) -> bool {
        let mut plausible = true;
        if self.x > limits.max_xy_um || self.y > limits.max_xy_um {
            tracing::warn!(
                x = self.x,
                y = self.y,
                limit = limits.max_xy_um,
                "In-plane voxel size is unusually large, check the metadata unit"
            );
            plausible = false;
        }
        if self.z > limits.max_z_um {
            tracing::warn!(
                z = self.z,
                limit = limits.max_z_um,
                "Z step is unusually large, check the metadata unit"
            );
            plausible = false;
        }
        plausible
    }
}

// ============================================================================
// ROI mask
// ============================================================================

/// 2D region of interest applied to every slice of a volume.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiMask {
    width: usize,
    height: usize,
    inside: Vec<bool>,
}

impl RoiMask {
    /// `inside` is row-major, `x + width * y`.
    pub fn new(width: usize, height: usize, inside: Vec<bool>) -> Result<Self> {
        if inside.len() != width * height {
            return Err(Error::DimensionMismatch {
                what: "roi mask",
                expected: format!("{} pixels ({}x{})", width * height, width, height),
                actual: format!("{} pixels", inside.len()),
            });
        }
        Ok(Self {
            width,
            height,
            inside,
        })
    }

    /// Mask from a predicate over pixel coordinates.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let inside = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            inside,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.inside[x + self.width * y]
    }

    pub fn area(&self) -> usize {
        self.inside.iter().filter(|&&v| v).count()
    }
}

// ============================================================================
// Volume sample
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSample {
    grid: Buffer3<f32>,
    spacing: Spacing,
}

impl VolumeSample {
    /// Build a sample from a flat x-fastest grid.
    ///
    /// Fails when the length does not match `dims` or when any voxel is
    /// negative or non-finite.
    pub fn new(dims: VolumeDimensions, intensity: Vec<f32>, spacing: Spacing) -> Result<Self> {
        if intensity.len() != dims.voxel_count() {
            return Err(Error::grid_length(dims, intensity.len()));
        }
        let grid = Buffer3::new(dims.width, dims.height, dims.depth, intensity);
        Self::from_buffer(grid, spacing)
    }

    pub fn from_buffer(grid: Buffer3<f32>, spacing: Spacing) -> Result<Self> {
        if let Some((index, &value)) = grid
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
        {
            return Err(Error::InvalidIntensity { index, value });
        }
        // Spacing may have been built as a literal, bypassing Spacing::new.
        let spacing = Spacing::new(spacing.x, spacing.y, spacing.z)?;
        Ok(Self { grid, spacing })
    }

    /// Skips validation; callers guarantee non-negative finite voxels.
    pub(crate) fn from_parts(grid: Buffer3<f32>, spacing: Spacing) -> Self {
        debug_assert!(grid.iter().all(|v| v.is_finite() && *v >= 0.0));
        Self { grid, spacing }
    }

    #[inline]
    pub fn dimensions(&self) -> VolumeDimensions {
        VolumeDimensions::new(self.grid.width(), self.grid.height(), self.grid.depth())
    }

    #[inline]
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    #[inline]
    pub fn grid(&self) -> &Buffer3<f32> {
        &self.grid
    }

    #[inline]
    pub fn intensity(&self) -> &[f32] {
        self.grid.voxels()
    }

    /// Σw over all voxels, accumulated in f64 in storage order.
    pub fn total_intensity(&self) -> f64 {
        self.grid.iter().map(|&v| v as f64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.iter().all(|&v| v == 0.0)
    }

    /// Keep slices `range.start()..=range.end()`.
    pub fn select_z_range(&self, range: RangeInclusive<usize>) -> Result<Self> {
        let (start, end) = (*range.start(), *range.end());
        let depth = self.grid.depth();
        if start > end || end >= depth {
            return Err(Error::InvalidZRange { start, end, depth });
        }

        let slice_len = self.grid.slice_len();
        let voxels = self.grid.voxels()[start * slice_len..(end + 1) * slice_len].to_vec();
        let grid = Buffer3::new(self.grid.width(), self.grid.height(), end - start + 1, voxels);
        Ok(Self::from_parts(grid, self.spacing))
    }

    /// Zero every voxel whose (x, y) lies outside `mask`.
    pub fn apply_roi_mask(&self, mask: &RoiMask) -> Result<Self> {
        if mask.width() != self.grid.width() || mask.height() != self.grid.height() {
            return Err(Error::DimensionMismatch {
                what: "roi mask",
                expected: format!("{}x{}", self.grid.width(), self.grid.height()),
                actual: format!("{}x{}", mask.width(), mask.height()),
            });
        }

        let mut grid = self.grid.clone();
        for plane in grid.slices_mut() {
            for (value, &inside) in plane.iter_mut().zip(mask.inside.iter()) {
                if !inside {
                    *value = 0.0;
                }
            }
        }
        Ok(Self::from_parts(grid, self.spacing))
    }

    /// XY box of every voxel with non-zero intensity, over all slices.
    pub fn signal_bounds(&self) -> Option<PlaneBox> {
        let width = self.grid.width();
        let mut bbox = PlaneBox::empty();
        for plane in self.grid.slices() {
            for (i, &v) in plane.iter().enumerate() {
                if v > 0.0 {
                    bbox.include(i % width, i / width);
                }
            }
        }
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Copy of the region `bbox` across all slices.
    pub fn crop_xy(&self, bbox: PlaneBox) -> Self {
        assert!(
            bbox.x_max < self.grid.width() && bbox.y_max < self.grid.height(),
            "crop box {:?} exceeds {}",
            bbox,
            self.dimensions()
        );
        let (w, h, d) = (bbox.width(), bbox.height(), self.grid.depth());
        let mut voxels = Vec::with_capacity(w * h * d);
        for z in 0..d {
            let plane = self.grid.slice(z);
            for y in bbox.y_min..=bbox.y_max {
                let row = y * self.grid.width();
                voxels.extend_from_slice(&plane[row + bbox.x_min..=row + bbox.x_max]);
            }
        }
        Self::from_parts(Buffer3::new(w, h, d, voxels), self.spacing)
    }

    /// Same grid and spacing with every voxel multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Result<Self> {
        Self::from_buffer(self.grid.map(|v| v * factor), self.spacing)
    }
}
