//! Slice-wise resampling into the principal-axis frame.
//!
//! The rotation is split in two steps. Step A resamples every slice so the
//! principal axis runs along +Y of an intermediate canvas. Step B is an exact
//! quarter turn of that canvas (pure index permutation), which puts the
//! principal axis on +X.

use common::Buffer3;
use glam::DVec2;
use rayon::prelude::*;

use crate::config::Interpolation;
use crate::volume::VolumeSample;

/// Slack applied before flooring/ceiling canvas bounds so corners that land
/// on integers up to rounding error are not dropped.
const CANVAS_EPS: f64 = 1e-9;

/// Step A geometry: intermediate canvas with columns `a = -(d·n)` and rows
/// `b = d·u`, where `d` is the offset from `pivot`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Canvas {
    pivot: DVec2,
    u: DVec2,
    n: DVec2,
    a0: f64,
    b0: f64,
    /// Intermediate width (number of `a` columns).
    pub width: usize,
    /// Intermediate height (number of `b` rows).
    pub height: usize,
}

impl Canvas {
    /// Smallest integer canvas containing every pixel center of a
    /// `width x height` slice once rotated about `pivot`.
    pub fn enclosing(width: usize, height: usize, pivot: DVec2, u: DVec2) -> Self {
        let n = u.perp();
        let corners = [
            DVec2::new(0.0, 0.0),
            DVec2::new((width - 1) as f64, 0.0),
            DVec2::new(0.0, (height - 1) as f64),
            DVec2::new((width - 1) as f64, (height - 1) as f64),
        ];

        let (mut a_min, mut a_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut b_min, mut b_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for corner in corners {
            let d = corner - pivot;
            let a = -d.dot(n);
            let b = d.dot(u);
            a_min = a_min.min(a);
            a_max = a_max.max(a);
            b_min = b_min.min(b);
            b_max = b_max.max(b);
        }

        let a0 = (a_min + CANVAS_EPS).floor();
        let b0 = (b_min + CANVAS_EPS).floor();
        let a1 = (a_max - CANVAS_EPS).ceil();
        let b1 = (b_max - CANVAS_EPS).ceil();

        Self {
            pivot,
            u,
            n,
            a0,
            b0,
            width: (a1 - a0) as usize + 1,
            height: (b1 - b0) as usize + 1,
        }
    }

    /// Source position of intermediate pixel `(ia, ib)`.
    #[inline]
    pub fn source_position(&self, ia: usize, ib: usize) -> DVec2 {
        let a = ia as f64 + self.a0;
        let b = ib as f64 + self.b0;
        self.pivot + b * self.u - a * self.n
    }

    /// Step B: intermediate pixel feeding final pixel `(fx, fy)` after the
    /// quarter turn. Final size is `height x width` of the canvas.
    #[inline]
    pub fn standardize(&self, fx: usize, fy: usize) -> (usize, usize) {
        (self.width - 1 - fy, fx)
    }

    /// Final (x, y) extent after the quarter turn.
    #[inline]
    pub fn final_size(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Resample every slice of `sample` through `canvas`. Slices are
/// independent, so they are processed in parallel.
pub(crate) fn resample(
    sample: &VolumeSample,
    canvas: &Canvas,
    interpolation: Interpolation,
) -> Buffer3<f32> {
    let grid = sample.grid();
    let (src_w, src_h) = (grid.width(), grid.height());
    let (out_w, out_h) = canvas.final_size();
    let depth = grid.depth();

    let mut voxels = vec![0.0f32; out_w * out_h * depth];
    if !voxels.is_empty() {
        voxels
            .par_chunks_mut(out_w * out_h)
            .enumerate()
            .for_each(|(z, out)| {
                let plane = grid.slice(z);
                for fy in 0..out_h {
                    for fx in 0..out_w {
                        let (ia, ib) = canvas.standardize(fx, fy);
                        let p = canvas.source_position(ia, ib);
                        out[fx + out_w * fy] = match interpolation {
                            Interpolation::Bilinear => {
                                interpolate_bilinear(plane, src_w, src_h, p.x, p.y)
                            }
                            Interpolation::Nearest => {
                                interpolate_nearest(plane, src_w, src_h, p.x, p.y)
                            }
                        };
                    }
                }
            });
    }

    Buffer3::new(out_w, out_h, depth, voxels)
}

/// Pixel fetch with a zero border outside the slice.
#[inline]
fn sample_pixel(plane: &[f32], width: usize, height: usize, x: i64, y: i64) -> f32 {
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        0.0
    } else {
        plane[y as usize * width + x as usize]
    }
}

#[inline]
fn interpolate_nearest(plane: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    sample_pixel(plane, width, height, x.round() as i64, y.round() as i64)
}

#[inline]
fn interpolate_bilinear(plane: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = sample_pixel(plane, width, height, x0, y0) as f64;
    let p10 = sample_pixel(plane, width, height, x0 + 1, y0) as f64;
    let p01 = sample_pixel(plane, width, height, x0, y0 + 1) as f64;
    let p11 = sample_pixel(plane, width, height, x0 + 1, y0 + 1) as f64;

    let top = p00 + fx * (p10 - p00);
    let bottom = p01 + fx * (p11 - p01);
    (top + fy * (bottom - top)).max(0.0) as f32
}
