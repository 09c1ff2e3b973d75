//! In-plane bounding box of the non-zero signal.

/// Axis-aligned XY box with inclusive `usize` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneBox {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
}

impl PlaneBox {
    /// Inverted box; the first `include()` sets real bounds.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            x_min: usize::MAX,
            x_max: 0,
            y_min: usize::MAX,
            y_max: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    #[inline]
    pub fn include(&mut self, x: usize, y: usize) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min) + 1
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min) + 1
    }
}
