//! Full analysis: alignment, spread and fluorescence composed into one record.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::alignment::{align_with, Orientation};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::fluorescence::compute_volume_fluorescence_with;
use crate::metrics::MetricsRecord;
use crate::spread::{compute_spread_metrics_with, BackboneCurve, LocalSpread};
use crate::volume::{VolumeDimensions, VolumeSample};

#[cfg(test)]
mod tests;

/// Samples processed concurrently by [`Analyzer::analyze_batch`]. Each one
/// holds an aligned copy of its volume, so this caps peak memory.
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Metrics plus the intermediate curves, for plotting and QC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metrics: MetricsRecord,
    pub backbone: BackboneCurve,
    pub local: LocalSpread,
    pub orientation: Orientation,
    pub aligned_dimensions: VolumeDimensions,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    batch_concurrency: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::from_config(AnalysisConfig::default())
    }

    pub fn from_config(config: AnalysisConfig) -> Self {
        config.validate();
        Self {
            config,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Limit how many samples [`Self::analyze_batch`] holds in flight.
    pub fn with_batch_concurrency(mut self, max_concurrent: usize) -> Self {
        assert!(max_concurrent > 0, "max_concurrent must be > 0");
        self.batch_concurrency = max_concurrent;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, sample: &VolumeSample) -> Result<MetricsRecord> {
        self.run(sample, sample).map(|report| report.metrics)
    }

    pub fn analyze_detailed(&self, sample: &VolumeSample) -> Result<AnalysisReport> {
        self.run(sample, sample)
    }

    /// Spreads and geometric volume from `plasticity`, fluorescence density
    /// from `fluorescence`.
    pub fn analyze_with_channel(
        &self,
        plasticity: &VolumeSample,
        fluorescence: &VolumeSample,
    ) -> Result<MetricsRecord> {
        self.run(plasticity, fluorescence).map(|report| report.metrics)
    }

    /// Analyze independent samples in parallel, in bounded chunks.
    /// Results are in input order; a failing sample does not stop the others.
    pub fn analyze_batch(&self, samples: &[VolumeSample]) -> Vec<Result<MetricsRecord>> {
        let mut results = Vec::with_capacity(samples.len());
        for chunk in samples.chunks(self.batch_concurrency) {
            let chunk_results: Vec<_> = chunk.par_iter().map(|s| self.analyze(s)).collect();
            results.extend(chunk_results);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(samples = samples.len(), failed, "Batch analysis finished");
        results
    }

    fn run(&self, sample: &VolumeSample, signal: &VolumeSample) -> Result<AnalysisReport> {
        sample.spacing().check_plausibility(&self.config.spacing_limits);

        // Step 1: principal-axis alignment
        let aligned = align_with(sample, &self.config.alignment)?;

        // Step 2: rotation-invariant measures on the unaligned input
        let fluorescence =
            compute_volume_fluorescence_with(sample, signal, &self.config.fluorescence)?;

        // Step 3: backbone, local spread and global reduction
        let spread = compute_spread_metrics_with(&aligned.sample, &self.config.spread)?;

        let metrics = MetricsRecord::new(&spread, &fluorescence, aligned.orientation);

        tracing::info!(
            dims = %sample.dimensions(),
            spread_x_um = metrics.spread_um.x,
            spread_y_um = metrics.spread_um.y,
            spread_z_um = metrics.spread_um.z,
            axonal_volume = metrics.axonal_volume,
            geometric_volume = metrics.geometric_volume,
            fluorescence_um2 = metrics.fluorescence_um2,
            "Sample analyzed"
        );

        Ok(AnalysisReport {
            metrics,
            backbone: spread.backbone,
            local: spread.local,
            orientation: aligned.orientation,
            aligned_dimensions: aligned.sample.dimensions(),
        })
    }
}

/// Analyze one sample with the default configuration.
pub fn analyze(sample: &VolumeSample) -> Result<MetricsRecord> {
    Analyzer::new().analyze(sample)
}
