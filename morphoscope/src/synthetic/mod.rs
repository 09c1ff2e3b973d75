//! Synthetic volumes with known geometry.
//!
//! Shapes are described in micrometers and rasterized onto a [`VolumeSpec`]
//! grid. The default grid matches a typical confocal acquisition:
//! 800x800 pixels of 0.1 µm and 20 slices of 1 µm.

use common::Buffer3;
use glam::DVec3;
use rayon::prelude::*;

use crate::volume::{Spacing, VolumeDimensions, VolumeSample};


// ============================================================================
// Grid
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSpec {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    /// In-plane pixel size in µm.
    pub pixel_size_um: f64,
    /// Distance between slices in µm.
    pub z_step_um: f64,
}

impl Default for VolumeSpec {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            depth: 20,
            pixel_size_um: 0.1,
            z_step_um: 1.0,
        }
    }
}

impl VolumeSpec {
    pub fn validate(&self) {
        assert!(
            self.pixel_size_um > 0.0 && self.pixel_size_um.is_finite(),
            "pixel_size_um must be positive, got {}",
            self.pixel_size_um
        );
        assert!(
            self.z_step_um > 0.0 && self.z_step_um.is_finite(),
            "z_step_um must be positive, got {}",
            self.z_step_um
        );
    }

    pub fn dimensions(&self) -> VolumeDimensions {
        VolumeDimensions::new(self.width, self.height, self.depth)
    }

    pub fn spacing(&self) -> Spacing {
        Spacing {
            x: self.pixel_size_um,
            y: self.pixel_size_um,
            z: self.z_step_um,
        }
    }

    /// Physical extent of the grid in µm.
    pub fn size_um(&self) -> DVec3 {
        DVec3::new(
            self.width as f64 * self.pixel_size_um,
            self.height as f64 * self.pixel_size_um,
            self.depth as f64 * self.z_step_um,
        )
    }

    /// Grid centre in µm, on a voxel centre.
    pub fn center_um(&self) -> DVec3 {
        DVec3::new(
            (self.width / 2) as f64 * self.pixel_size_um,
            (self.height / 2) as f64 * self.pixel_size_um,
            (self.depth / 2) as f64 * self.z_step_um,
        )
    }

    /// Rasterize `layers`: intensities add up and are clipped to the brightest
    /// layer's intensity.
    pub fn render(&self, layers: &[Layer]) -> VolumeSample {
        self.validate();
        let (w, h, d) = (self.width, self.height, self.depth);
        let ceiling = layers.iter().map(|l| l.intensity).fold(0.0f32, f32::max);
        let spacing = DVec3::new(self.pixel_size_um, self.pixel_size_um, self.z_step_um);

        // Per layer, centre in fractional voxel units so that offsets
        // (index - centre) * spacing are exactly antisymmetric.
        let layers: Vec<PreparedLayer> = layers
            .iter()
            .flat_map(|layer| layer.shape.primitives(layer.intensity as f64, layer.edge))
            .map(|p| PreparedLayer::new(p, spacing))
            .collect();

        let mut voxels = vec![0.0f32; w * h * d];
        if !voxels.is_empty() {
            voxels
                .par_chunks_mut(w * h)
                .enumerate()
                .for_each(|(z, plane)| {
                    for y in 0..h {
                        for x in 0..w {
                            let index = DVec3::new(x as f64, y as f64, z as f64);
                            let sum: f64 = layers.iter().map(|l| l.value_at(index)).sum();
                            plane[x + w * y] = (sum as f32).clamp(0.0, ceiling);
                        }
                    }
                });
        }

        VolumeSample::from_parts(Buffer3::new(w, h, d, voxels), self.spacing())
    }

    pub fn render_shape(&self, shape: Shape, intensity: f32, edge: Edge) -> VolumeSample {
        self.render(&[Layer {
            shape,
            intensity,
            edge,
        }])
    }
}

// ============================================================================
// Shapes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// Full intensity inside the surface, zero outside.
    Hard,
    /// Gaussian falloff `exp(-(d / width)²)` with `d` the distance outside the surface.
    Smooth { width_um: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere {
        center: DVec3,
        radius: f64,
    },
    /// Semi-axes along x, y, z before an in-plane rotation by `rotation_deg`.
    Ellipsoid {
        center: DVec3,
        radii: DVec3,
        rotation_deg: f64,
    },
    Cylinder {
        start: DVec3,
        end: DVec3,
        radius: f64,
    },
    /// Unnormalized Gaussian with per-axis sigmas, rotated in-plane. Ignores the edge.
    GaussianBlob {
        center: DVec3,
        sigma: DVec3,
        rotation_deg: f64,
    },
    /// Sphere of `outer_radius` whose inner `inner_radius` core keeps only
    /// `core_fraction` of the intensity.
    Shell {
        center: DVec3,
        outer_radius: f64,
        inner_radius: f64,
        core_fraction: f64,
    },
    /// Parallel fibres packed around an axis through `center`.
    FasciculatedBundle {
        center: DVec3,
        direction: DVec3,
        length: f64,
        fibers: usize,
        bundle_radius: f64,
        fiber_radius: f64,
    },
    /// Fibres diverging from `origin` at `spread_angle_deg` around `direction`.
    DefasciculatedBundle {
        origin: DVec3,
        direction: DVec3,
        length: f64,
        fibers: usize,
        spread_angle_deg: f64,
        fiber_radius: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub shape: Shape,
    pub intensity: f32,
    pub edge: Edge,
}

/// Convex solid positioned relative to an anchor point.
#[derive(Debug, Clone, Copy)]
enum Solid {
    Sphere { radius: f64 },
    Ellipsoid { radii: DVec3, rotation_deg: f64 },
    /// Runs from the anchor along `axis`.
    Cylinder { axis: DVec3, radius: f64 },
    Gaussian { sigma: DVec3, rotation_deg: f64 },
}

/// Single renderable solid with a signed intensity.
#[derive(Debug, Clone, Copy)]
struct Primitive {
    solid: Solid,
    anchor_um: DVec3,
    intensity: f64,
    edge: Edge,
}

impl Shape {
    /// Shells become two signed spheres and bundles become cylinders.
    fn primitives(&self, intensity: f64, edge: Edge) -> Vec<Primitive> {
        let single = |solid, anchor_um| {
            vec![Primitive {
                solid,
                anchor_um,
                intensity,
                edge,
            }]
        };
        let fiber = |start: DVec3, end: DVec3, radius| Primitive {
            solid: Solid::Cylinder {
                axis: end - start,
                radius,
            },
            anchor_um: start,
            intensity,
            edge,
        };

        match *self {
            Shape::Sphere { center, radius } => single(Solid::Sphere { radius }, center),
            Shape::Ellipsoid {
                center,
                radii,
                rotation_deg,
            } => single(
                Solid::Ellipsoid {
                    radii,
                    rotation_deg,
                },
                center,
            ),
            Shape::Cylinder { start, end, radius } => vec![fiber(start, end, radius)],
            Shape::GaussianBlob {
                center,
                sigma,
                rotation_deg,
            } => single(
                Solid::Gaussian {
                    sigma,
                    rotation_deg,
                },
                center,
            ),
            Shape::Shell {
                center,
                outer_radius,
                inner_radius,
                core_fraction,
            } => vec![
                Primitive {
                    solid: Solid::Sphere {
                        radius: outer_radius,
                    },
                    anchor_um: center,
                    intensity,
                    edge,
                },
                Primitive {
                    solid: Solid::Sphere {
                        radius: inner_radius,
                    },
                    anchor_um: center,
                    intensity: -(1.0 - core_fraction) * intensity,
                    edge: Edge::Hard,
                },
            ],
            Shape::FasciculatedBundle {
                center,
                direction,
                length,
                fibers,
                bundle_radius,
                fiber_radius,
            } => {
                let (d, perp1, perp2) = orthonormal_basis(direction);
                (0..fibers)
                    .map(|i| {
                        let angle = std::f64::consts::TAU * i as f64 / fibers as f64;
                        let offset = (perp1 * angle.cos() + perp2 * angle.sin()) * bundle_radius;
                        fiber(
                            center - d * length / 2.0 + offset,
                            center + d * length / 2.0 + offset,
                            fiber_radius,
                        )
                    })
                    .collect()
            }
            Shape::DefasciculatedBundle {
                origin,
                direction,
                length,
                fibers,
                spread_angle_deg,
                fiber_radius,
            } => {
                let (d, perp1, perp2) = orthonormal_basis(direction);
                let spread = spread_angle_deg.to_radians();
                (0..fibers)
                    .map(|i| {
                        let angle = std::f64::consts::TAU * i as f64 / fibers as f64;
                        let radial = perp1 * angle.cos() + perp2 * angle.sin();
                        let dir = (d * spread.cos() + radial * spread.sin()).normalize();
                        fiber(origin, origin + dir * length, fiber_radius)
                    })
                    .collect()
            }
        }
    }
}

/// Unit `direction` and two unit vectors perpendicular to it and each other.
fn orthonormal_basis(direction: DVec3) -> (DVec3, DVec3, DVec3) {
    let d = direction.normalize();
    let helper = if d.z.abs() < 0.9 { DVec3::Z } else { DVec3::X };
    let perp1 = d.cross(helper).normalize();
    let perp2 = d.cross(perp1);
    (d, perp1, perp2)
}

// ============================================================================
// Rasterization
// ============================================================================

struct PreparedLayer {
    primitive: Primitive,
    spacing: DVec3,
    /// Anchor in voxel index units.
    anchor: DVec3,
}

impl PreparedLayer {
    fn new(primitive: Primitive, spacing: DVec3) -> Self {
        Self {
            primitive,
            spacing,
            anchor: primitive.anchor_um / spacing,
        }
    }

    /// Signed intensity contribution at voxel `index`.
    fn value_at(&self, index: DVec3) -> f64 {
        // Offset from the anchor in µm.
        let d = (index - self.anchor) * self.spacing;
        let edge = self.primitive.edge;

        let factor = match self.primitive.solid {
            Solid::Sphere { radius } => edge_profile(d.length() - radius, edge),
            Solid::Ellipsoid {
                radii,
                rotation_deg,
            } => {
                let r = rotate_xy(d, rotation_deg) / radii;
                // Outside distance approximated along the normalized radius.
                edge_profile((r.length() - 1.0) * radii.min_element(), edge)
            }
            Solid::Cylinder { axis, radius } => {
                let length = axis.length();
                if length == 0.0 {
                    return 0.0;
                }
                let unit = axis / length;
                let t = d.dot(unit);
                if !(0.0..=length).contains(&t) {
                    return 0.0;
                }
                edge_profile((d - unit * t).length() - radius, edge)
            }
            Solid::Gaussian {
                sigma,
                rotation_deg,
            } => {
                let r = rotate_xy(d, rotation_deg) / sigma;
                (-0.5 * r.length_squared()).exp()
            }
        };
        self.primitive.intensity * factor
    }
}

/// 1 inside (`outside <= 0`), then 0 or a Gaussian falloff.
#[inline]
fn edge_profile(outside: f64, edge: Edge) -> f64 {
    if outside <= 0.0 {
        return 1.0;
    }
    match edge {
        Edge::Hard => 0.0,
        Edge::Smooth { width_um } => (-(outside / width_um).powi(2)).exp(),
    }
}

/// Express `d` in a frame rotated by `deg` in the XY plane.
#[inline]
fn rotate_xy(d: DVec3, deg: f64) -> DVec3 {
    if deg == 0.0 {
        return d;
    }
    let (s, c) = deg.to_radians().sin_cos();
    DVec3::new(d.x * c + d.y * s, -d.x * s + d.y * c, d.z)
}
