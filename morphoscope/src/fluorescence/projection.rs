use crate::volume::VolumeSample;

/// Maximum over z of every (x, y) column, row-major `x + width * y`.
pub fn max_intensity_projection(sample: &VolumeSample) -> Vec<f32> {
    let grid = sample.grid();
    let mut projection = vec![0.0f32; grid.slice_len()];
    for plane in grid.slices() {
        for (acc, &v) in projection.iter_mut().zip(plane) {
            *acc = acc.max(v);
        }
    }
    projection
}
