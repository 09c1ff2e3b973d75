use glam::DVec3;

use super::*;
use crate::error::{DegenerateReason, Error};
use crate::spread::{compute_spread_metrics, AxisSpreads};
use crate::synthetic::{Edge, Shape, VolumeSpec};
use crate::testing::{init_tracing, relative_diff};
use crate::volume::Spacing;

fn unit_spec(width: usize, height: usize, depth: usize) -> VolumeSpec {
    VolumeSpec {
        width,
        height,
        depth,
        pixel_size_um: 1.0,
        z_step_um: 1.0,
    }
}

fn hard_sphere(radius: f64) -> VolumeSample {
    unit_spec(32, 32, 32).render_shape(
        Shape::Sphere {
            center: DVec3::splat(16.0),
            radius,
        },
        100.0,
        Edge::Hard,
    )
}

fn ellipsoid(rotation_deg: f64) -> VolumeSample {
    unit_spec(128, 128, 16).render_shape(
        Shape::Ellipsoid {
            center: DVec3::new(64.0, 64.0, 7.5),
            radii: DVec3::new(40.0, 12.0, 5.0),
            rotation_deg,
        },
        100.0,
        Edge::Smooth { width_um: 1.0 },
    )
}

fn assert_spreads_close(a: &AxisSpreads, b: &AxisSpreads, tolerance: f64, context: &str) {
    for (axis, va, vb) in [('x', a.x, b.x), ('y', a.y, b.y), ('z', a.z, b.z)] {
        assert!(
            relative_diff(va, vb) <= tolerance,
            "{}: spread {} differs, {} vs {}",
            context,
            axis,
            va,
            vb
        );
    }
}

// ============================================================================
// Invariance
// ============================================================================

#[test]
fn test_intensity_scaling_keeps_spreads() {
    init_tracing();
    let sample = ellipsoid(30.0);
    let brighter = sample.scaled(3.0).unwrap();

    let base = analyze(&sample).unwrap();
    let scaled = analyze(&brighter).unwrap();

    assert_spreads_close(&base.spread_px, &scaled.spread_px, 1e-6, "px");
    assert_spreads_close(&base.spread_um, &scaled.spread_um, 1e-6, "um");
    assert!(relative_diff(scaled.axonal_volume, 3.0 * base.axonal_volume) < 1e-6);
    assert!(relative_diff(scaled.fluorescence_px, 3.0 * base.fluorescence_px) < 1e-6);
    assert_eq!(scaled.occupied_voxels, base.occupied_voxels);
    assert_eq!(scaled.geometric_volume, base.geometric_volume);
}

#[test]
fn test_in_plane_rotation_invariance() {
    init_tracing();
    let reference = analyze(&ellipsoid(0.0)).unwrap();
    assert!(reference.spread_px.x > reference.spread_px.y);
    assert!(reference.spread_px.y > reference.spread_px.z);

    for angle in [30.0, 60.0, 90.0, 135.0] {
        let rotated = analyze(&ellipsoid(angle)).unwrap();
        assert_spreads_close(
            &reference.spread_px,
            &rotated.spread_px,
            0.02,
            &format!("{} deg", angle),
        );
        assert!(rotated.spread_px.x > rotated.spread_px.y);
    }
}

#[test]
fn test_recovered_angle_matches_rotation() {
    for angle in [30.0, 60.0, -45.0] {
        let report = Analyzer::new()
            .analyze_detailed(&ellipsoid(angle))
            .unwrap();
        let direction = report.metrics.orientation.pca_angle_deg;
        assert!(
            (direction - angle).abs() < 0.5,
            "expected {} deg, got {}",
            angle,
            direction
        );
        assert!(!report.metrics.orientation.isotropic);
    }
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_sphere_spreads_grow_with_radius() {
    let spreads: Vec<_> = [4.0, 6.0, 8.0]
        .iter()
        .map(|&r| analyze(&hard_sphere(r)).unwrap().spread_px)
        .collect();

    for pair in spreads.windows(2) {
        assert!(pair[1].x > pair[0].x);
        assert!(pair[1].y > pair[0].y);
        assert!(pair[1].z > pair[0].z);
    }
}

#[test]
fn test_sphere_is_isotropic_and_unrotated() {
    let report = Analyzer::new()
        .analyze_detailed(&hard_sphere(6.0))
        .unwrap();
    let orientation = report.metrics.orientation;
    assert!(orientation.isotropic);
    assert_eq!(orientation.pca_angle_deg, 0.0);
    // 13 voxel diameter, cropped without resampling.
    assert_eq!(report.aligned_dimensions, VolumeDimensions::new(13, 13, 32));
    assert!(relative_diff(report.metrics.spread_px.y, report.metrics.spread_px.z) < 1e-9);
}

#[test]
fn test_shell_spreads_exceed_solid() {
    let spec = unit_spec(32, 32, 32);
    let center = DVec3::splat(16.0);
    let solid = spec.render_shape(
        Shape::Sphere {
            center,
            radius: 10.0,
        },
        100.0,
        Edge::Hard,
    );
    let shell = spec.render_shape(
        Shape::Shell {
            center,
            outer_radius: 10.0,
            inner_radius: 7.0,
            core_fraction: 0.05,
        },
        100.0,
        Edge::Hard,
    );

    let solid = analyze(&solid).unwrap();
    let shell = analyze(&shell).unwrap();

    assert_eq!(shell.occupied_voxels, solid.occupied_voxels);
    assert_eq!(shell.geometric_volume, solid.geometric_volume);
    assert!(shell.axonal_volume < solid.axonal_volume);

    let thin_shell_limit = 10.0 / 3f64.sqrt() * 1.01;
    for (s, h) in [
        (solid.spread_px.x, shell.spread_px.x),
        (solid.spread_px.y, shell.spread_px.y),
        (solid.spread_px.z, shell.spread_px.z),
    ] {
        assert!(h > s, "shell {} <= solid {}", h, s);
        assert!(h <= thin_shell_limit);
    }
}

#[test]
fn test_default_grid_sphere() {
    init_tracing();
    let spec = VolumeSpec::default();
    let sample = spec.render_shape(
        Shape::Ellipsoid {
            center: DVec3::new(40.0, 40.0, 10.0),
            radii: DVec3::new(0.5, 0.5, 5.0),
            rotation_deg: 0.0,
        },
        100.0,
        Edge::Hard,
    );
    let metrics = analyze(&sample).unwrap();

    assert!(relative_diff(metrics.spread_px.x, metrics.spread_px.y) < 0.05);
    assert!((metrics.spread_um.x - metrics.spread_px.x * 0.1).abs() < 1e-12);
    assert!((metrics.spread_um.z - metrics.spread_px.z).abs() < 1e-12);

    let voxel_volume = 0.1 * 0.1 * 1.0;
    let expected = metrics.occupied_voxels as f64 * 100.0 * voxel_volume;
    assert!(relative_diff(metrics.axonal_volume, expected) < 1e-9);

    // Five voxel radius on every axis once spacing is divided out.
    let ball = 4.0 / 3.0 * std::f64::consts::PI * 125.0 * 100.0 * voxel_volume;
    assert!(relative_diff(metrics.axonal_volume, ball) < 0.05);
}

// ============================================================================
// Units
// ============================================================================

#[test]
fn test_physical_units_follow_spacing() {
    let unit = hard_sphere(5.0);
    let spacing = Spacing::new(0.2, 0.2, 0.5).unwrap();
    let scaled = VolumeSample::from_buffer(unit.grid().clone(), spacing).unwrap();

    let a = analyze(&unit).unwrap();
    let b = analyze(&scaled).unwrap();

    assert_spreads_close(&a.spread_px, &b.spread_px, 1e-12, "px");
    assert!((b.spread_um.x - 0.2 * b.spread_px.x).abs() < 1e-12);
    assert!((b.spread_um.y - 0.2 * b.spread_px.y).abs() < 1e-12);
    assert!((b.spread_um.z - 0.5 * b.spread_px.z).abs() < 1e-12);
    assert!(relative_diff(b.axonal_volume, a.axonal_volume * 0.02) < 1e-12);
    assert!(relative_diff(b.geometric_volume, a.geometric_volume * 0.02) < 1e-12);
    assert!(relative_diff(b.fluorescence_um2, b.fluorescence_px / 0.04) < 1e-12);
}

// ============================================================================
// Failures
// ============================================================================

fn empty_sample() -> VolumeSample {
    VolumeSample::new(VolumeDimensions::new(6, 5, 3), vec![0.0; 90], Spacing::UNIT).unwrap()
}

#[test]
fn test_all_zero_input_is_degenerate() {
    let sample = empty_sample();
    assert_eq!(
        analyze(&sample).unwrap_err(),
        Error::DegenerateInput {
            reason: DegenerateReason::ZeroTotalIntensity
        }
    );
    assert_eq!(
        compute_spread_metrics(&sample).unwrap_err(),
        Error::DegenerateInput {
            reason: DegenerateReason::ZeroAggregateWeight
        }
    );
}

#[test]
fn test_batch_keeps_order_and_isolates_failures() {
    init_tracing();
    let samples = vec![hard_sphere(4.0), empty_sample(), hard_sphere(6.0)];
    let analyzer = Analyzer::new().with_batch_concurrency(2);
    let results = analyzer.analyze_batch(&samples);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], analyzer.analyze(&samples[0]));
    assert!(results[1].is_err());
    assert_eq!(results[2], analyzer.analyze(&samples[2]));
}

#[test]
#[should_panic(expected = "max_concurrent must be > 0")]
fn test_zero_batch_concurrency_rejected() {
    Analyzer::new().with_batch_concurrency(0);
}

// ============================================================================
// Reports and channels
// ============================================================================

#[test]
fn test_detailed_report_curves() {
    let report = Analyzer::new()
        .analyze_detailed(&hard_sphere(5.0))
        .unwrap();
    assert_eq!(report.backbone.len(), 11);
    assert_eq!(report.local.len(), report.backbone.len());
    assert!(report.backbone.windows(2).all(|p| p[0].x < p[1].x));
    assert_eq!(
        report.orientation.standardization_deg,
        crate::alignment::STANDARDIZATION_DEG
    );

    let row = report.metrics.export_row("sphere.tif", "synthetic");
    assert_eq!(row.spread_x_px, report.metrics.spread_px.x);
    assert_eq!(row.fluorescence_um, report.metrics.fluorescence_um2);
}

#[test]
fn test_separate_fluorescence_channel() {
    let structure = hard_sphere(6.0);
    let signal = structure.scaled(0.5).unwrap();
    let analyzer = Analyzer::new();

    let both = analyzer.analyze_with_channel(&structure, &signal).unwrap();
    let single = analyzer.analyze(&structure).unwrap();

    assert_eq!(both.spread_px, single.spread_px);
    assert_eq!(both.occupied_voxels, single.occupied_voxels);
    assert!(relative_diff(both.fluorescence_px, 0.5 * single.fluorescence_px) < 1e-9);
}
