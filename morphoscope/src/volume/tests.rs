use super::*;
use crate::error::Error;

fn ramp_sample(width: usize, height: usize, depth: usize) -> VolumeSample {
    let dims = VolumeDimensions::new(width, height, depth);
    let voxels = (0..dims.voxel_count()).map(|i| i as f32).collect();
    VolumeSample::new(dims, voxels, Spacing::new(0.1, 0.1, 1.0).unwrap()).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_length_mismatch() {
    let err = VolumeSample::new(VolumeDimensions::new(2, 2, 2), vec![0.0; 7], Spacing::UNIT)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DimensionMismatch {
            what: "voxel grid",
            ..
        }
    ));
}

#[test]
fn test_new_rejects_negative_voxel() {
    let mut voxels = vec![1.0; 8];
    voxels[5] = -0.5;
    let err =
        VolumeSample::new(VolumeDimensions::new(2, 2, 2), voxels, Spacing::UNIT).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidIntensity {
            index: 5,
            value: -0.5
        }
    );
}

#[test]
fn test_new_rejects_nan_voxel() {
    let mut voxels = vec![1.0; 8];
    voxels[2] = f32::NAN;
    let err =
        VolumeSample::new(VolumeDimensions::new(2, 2, 2), voxels, Spacing::UNIT).unwrap_err();
    assert!(matches!(err, Error::InvalidIntensity { index: 2, .. }));
}

#[test]
fn test_spacing_rejects_non_positive_and_non_finite() {
    assert_eq!(
        Spacing::new(0.1, 0.0, 1.0).unwrap_err(),
        Error::InvalidSpacing {
            axis: 'y',
            value: 0.0
        }
    );
    assert!(matches!(
        Spacing::new(0.1, 0.1, f64::INFINITY),
        Err(Error::InvalidSpacing { axis: 'z', .. })
    ));
    assert!(Spacing::new(-1.0, 1.0, 1.0).is_err());
}

#[test]
fn test_literal_spacing_is_validated_on_construction() {
    let spacing = Spacing {
        x: 1.0,
        y: -2.0,
        z: 1.0,
    };
    let err = VolumeSample::new(VolumeDimensions::new(1, 1, 1), vec![1.0], spacing).unwrap_err();
    assert!(matches!(err, Error::InvalidSpacing { axis: 'y', .. }));
}

#[test]
fn test_spacing_products() {
    let spacing = Spacing::new(0.5, 0.2, 2.0).unwrap();
    assert!((spacing.voxel_volume() - 0.2).abs() < 1e-12);
    assert!((spacing.pixel_area() - 0.1).abs() < 1e-12);
}

#[test]
fn test_spacing_plausibility_limits() {
    let limits = SpacingLimits::default();
    assert!(Spacing::new(0.1, 0.1, 1.0)
        .unwrap()
        .check_plausibility(&limits));
    assert!(!Spacing::new(12.0, 0.1, 1.0)
        .unwrap()
        .check_plausibility(&limits));
    assert!(!Spacing::new(0.1, 0.1, 60.0)
        .unwrap()
        .check_plausibility(&limits));
}

#[test]
fn test_total_intensity_and_empty() {
    let sample = ramp_sample(3, 2, 2);
    assert_eq!(sample.total_intensity(), (0..12).sum::<i32>() as f64);
    assert!(!sample.is_empty());

    let zeros =
        VolumeSample::new(VolumeDimensions::new(3, 3, 3), vec![0.0; 27], Spacing::UNIT).unwrap();
    assert!(zeros.is_empty());
    assert_eq!(zeros.signal_bounds(), None);
}

// ============================================================================
// Z range
// ============================================================================

#[test]
fn test_select_z_range_is_inclusive() {
    let sample = ramp_sample(2, 2, 5);
    let sub = sample.select_z_range(1..=3).unwrap();
    assert_eq!(sub.dimensions(), VolumeDimensions::new(2, 2, 3));
    assert_eq!(sub.grid().slice(0), sample.grid().slice(1));
    assert_eq!(sub.grid().slice(2), sample.grid().slice(3));
    assert_eq!(sub.spacing(), sample.spacing());
}

#[test]
fn test_select_single_slice() {
    let sample = ramp_sample(2, 2, 5);
    let sub = sample.select_z_range(4..=4).unwrap();
    assert_eq!(sub.dimensions().depth, 1);
    assert_eq!(sub.intensity(), &[16.0, 17.0, 18.0, 19.0]);
}

#[test]
fn test_select_z_range_rejects_bad_bounds() {
    let sample = ramp_sample(2, 2, 5);
    assert_eq!(
        sample.select_z_range(2..=5).unwrap_err(),
        Error::InvalidZRange {
            start: 2,
            end: 5,
            depth: 5
        }
    );
    #[allow(clippy::reversed_empty_ranges)]
    let reversed = 3..=1;
    assert!(sample.select_z_range(reversed).is_err());
}

// ============================================================================
// ROI mask
// ============================================================================

#[test]
fn test_roi_mask_zeroes_outside_every_slice() {
    let sample = ramp_sample(4, 4, 3);
    let mask = RoiMask::from_fn(4, 4, |x, y| x >= 2 && y < 2);
    assert_eq!(mask.area(), 4);

    let masked = sample.apply_roi_mask(&mask).unwrap();
    for z in 0..3 {
        for y in 0..4 {
            for x in 0..4 {
                let expected = if mask.contains(x, y) {
                    sample.grid()[(x, y, z)]
                } else {
                    0.0
                };
                assert_eq!(masked.grid()[(x, y, z)], expected);
            }
        }
    }
    // Source is untouched.
    assert_eq!(sample.grid()[(0, 3, 2)], 44.0);
}

#[test]
fn test_roi_mask_dimension_mismatch() {
    let sample = ramp_sample(4, 4, 1);
    let mask = RoiMask::from_fn(3, 4, |_, _| true);
    assert!(matches!(
        sample.apply_roi_mask(&mask),
        Err(Error::DimensionMismatch {
            what: "roi mask",
            ..
        })
    ));
    assert!(RoiMask::new(2, 2, vec![true; 3]).is_err());
}

// ============================================================================
// Bounds and cropping
// ============================================================================

#[test]
fn test_signal_bounds_and_crop() {
    let dims = VolumeDimensions::new(6, 5, 2);
    let mut grid = Buffer3::<f32>::new_default(6, 5, 2);
    grid[(1, 2, 0)] = 3.0;
    grid[(4, 3, 1)] = 5.0;
    let sample = VolumeSample::from_buffer(grid, Spacing::UNIT).unwrap();
    assert_eq!(sample.dimensions(), dims);

    let bbox = sample.signal_bounds().unwrap();
    assert_eq!(
        bbox,
        PlaneBox {
            x_min: 1,
            x_max: 4,
            y_min: 2,
            y_max: 3
        }
    );

    let cropped = sample.crop_xy(bbox);
    assert_eq!(cropped.dimensions(), VolumeDimensions::new(4, 2, 2));
    assert_eq!(cropped.grid()[(0, 0, 0)], 3.0);
    assert_eq!(cropped.grid()[(3, 1, 1)], 5.0);
    assert_eq!(cropped.total_intensity(), sample.total_intensity());
}

#[test]
fn test_scaled_multiplies_every_voxel() {
    let sample = ramp_sample(2, 2, 2);
    let scaled = sample.scaled(3.0).unwrap();
    assert_eq!(scaled.total_intensity(), 3.0 * sample.total_intensity());
    assert!(sample.scaled(-1.0).is_err());
}
