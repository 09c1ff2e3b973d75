//! Final per-sample measurement and its tabular export form.

use serde::{Deserialize, Serialize};

use crate::alignment::Orientation;
use crate::fluorescence::VolumeFluorescence;
use crate::spread::{AxisSpreads, SpreadMetrics};

/// Every scalar produced for one sample, in pixel and physical units.
///
/// `spread_um` values are the pixel values times the voxel spacing of the
/// matching axis (squared/cubed for the area and volume products).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub spread_px: AxisSpreads,
    pub spread_um: AxisSpreads,
    /// Intensity-weighted volume `Σ w · δx·δy·δz`.
    pub axonal_volume: f64,
    /// Presence-based volume `N_occupied · δx·δy·δz` in µm³.
    pub geometric_volume: f64,
    pub fluorescence_px: f64,
    pub fluorescence_um2: f64,
    pub integrated_intensity: f64,
    pub occupied_voxels: usize,
    pub fluorescence_threshold: f32,
    pub orientation: Orientation,
}

impl MetricsRecord {
    pub fn new(
        spread: &SpreadMetrics,
        fluorescence: &VolumeFluorescence,
        orientation: Orientation,
    ) -> Self {
        Self {
            spread_px: spread.pixel,
            spread_um: spread.physical,
            axonal_volume: spread.axonal_volume,
            geometric_volume: fluorescence.geometric_volume,
            fluorescence_px: fluorescence.fluorescence_px,
            fluorescence_um2: fluorescence.fluorescence_um2,
            integrated_intensity: spread.integrated_intensity,
            occupied_voxels: fluorescence.occupied_voxels,
            fluorescence_threshold: fluorescence.threshold,
            orientation,
        }
    }

    /// One table row for `filename`, tagged with a free-form `observation`.
    pub fn export_row(&self, filename: &str, observation: &str) -> ExportRow {
        ExportRow {
            image_filename: filename.to_string(),
            spread_x_px: self.spread_px.x,
            spread_y_px: self.spread_px.y,
            spread_z_px: self.spread_px.z,
            spread_xy_px: self.spread_px.xy,
            spread_xyz_px: self.spread_px.xyz,
            spread_x_um: self.spread_um.x,
            spread_y_um: self.spread_um.y,
            spread_z_um: self.spread_um.z,
            spread_xy_um: self.spread_um.xy,
            spread_xyz_um: self.spread_um.xyz,
            axonal_volume: self.axonal_volume,
            geometric_volume: self.geometric_volume,
            fluorescence_px: self.fluorescence_px,
            fluorescence_um: self.fluorescence_um2,
            observation: observation.to_string(),
        }
    }
}

/// Flat row whose serialized field names are the result table headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Image filename")]
    pub image_filename: String,
    #[serde(rename = "Spread x [pixel]")]
    pub spread_x_px: f64,
    #[serde(rename = "Spread y [pixel]")]
    pub spread_y_px: f64,
    #[serde(rename = "Spread z [pixel]")]
    pub spread_z_px: f64,
    #[serde(rename = "Spread x*y [pixel2]")]
    pub spread_xy_px: f64,
    #[serde(rename = "Spread x*y*z [pixel3]")]
    pub spread_xyz_px: f64,
    #[serde(rename = "Spread x [um]")]
    pub spread_x_um: f64,
    #[serde(rename = "Spread y [um]")]
    pub spread_y_um: f64,
    #[serde(rename = "Spread z [um]")]
    pub spread_z_um: f64,
    #[serde(rename = "Spread x*y [um2]")]
    pub spread_xy_um: f64,
    #[serde(rename = "Spread x*y*z [um3]")]
    pub spread_xyz_um: f64,
    #[serde(rename = "Axonal Volume")]
    pub axonal_volume: f64,
    #[serde(rename = "Geometric volume")]
    pub geometric_volume: f64,
    #[serde(rename = "Fluorescence_px")]
    pub fluorescence_px: f64,
    #[serde(rename = "Fluorescence_um")]
    pub fluorescence_um: f64,
    #[serde(rename = "Observation")]
    pub observation: String,
}

impl ExportRow {
    /// Column headers in serialization order.
    pub const COLUMNS: [&'static str; 16] = [
        "Image filename",
        "Spread x [pixel]",
        "Spread y [pixel]",
        "Spread z [pixel]",
        "Spread x*y [pixel2]",
        "Spread x*y*z [pixel3]",
        "Spread x [um]",
        "Spread y [um]",
        "Spread z [um]",
        "Spread x*y [um2]",
        "Spread x*y*z [um3]",
        "Axonal Volume",
        "Geometric volume",
        "Fluorescence_px",
        "Fluorescence_um",
        "Observation",
    ];
}
