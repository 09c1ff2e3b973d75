//! Triangle (Zack) threshold on a value histogram.
//!
//! A line is drawn from the histogram peak to the far end of its longest
//! tail; the threshold is the bin furthest below that line.

/// Histogram over `[min, max]` of `values` with equal-width bins.
#[derive(Debug, Clone)]
pub(crate) struct Histogram {
    pub counts: Vec<u64>,
    pub min: f32,
    pub max: f32,
}

impl Histogram {
    pub fn new(values: &[f32], bins: usize) -> Self {
        debug_assert!(bins >= 1);
        let (min, max) = values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        let mut counts = vec![0u64; bins];
        if values.is_empty() {
            return Self {
                counts,
                min: 0.0,
                max: 0.0,
            };
        }

        let range = (max - min) as f64;
        for &v in values {
            let bin = if range > 0.0 {
                let t = (v - min) as f64 / range;
                ((t * bins as f64) as usize).min(bins - 1)
            } else {
                0
            };
            counts[bin] += 1;
        }
        Self { counts, min, max }
    }

    /// Center value of `bin`.
    pub fn bin_center(&self, bin: usize) -> f32 {
        let width = (self.max - self.min) as f64 / self.counts.len() as f64;
        (self.min as f64 + (bin as f64 + 0.5) * width) as f32
    }
}

/// Triangle threshold of `values` using `bins` histogram bins.
///
/// Returns the minimum when every value falls into one bin, so nothing lies
/// strictly above the threshold of a constant image.
pub fn triangle_threshold(values: &[f32], bins: usize) -> f32 {
    let histogram = Histogram::new(values, bins);
    let counts = &histogram.counts;
    let nbins = counts.len();

    // First maximum wins ties.
    let mut peak = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[peak] {
            peak = i;
        }
    }
    let low = counts.iter().position(|&c| c > 0);
    let high = counts.iter().rposition(|&c| c > 0);
    let (low, high) = match (low, high) {
        (Some(low), Some(high)) if low != high => (low, high),
        _ => return histogram.min,
    };

    let peak_height = counts[peak] as f64;

    // Walk towards the longer tail; mirror the histogram when it lies above the peak.
    let flip = peak - low < high - peak;
    let at = |i: usize| if flip { counts[nbins - 1 - i] } else { counts[i] };
    let (low, peak) = if flip {
        (nbins - 1 - high, nbins - 1 - peak)
    } else {
        (low, peak)
    };

    let width = (peak - low) as f64;
    let norm = (peak_height * peak_height + width * width).sqrt();
    let (height, width) = (peak_height / norm, width / norm);

    let mut best = 0;
    let mut best_length = f64::NEG_INFINITY;
    for x in 0..(peak - low) {
        let length = height * x as f64 - width * at(x + low) as f64;
        if length > best_length {
            best_length = length;
            best = x;
        }
    }

    let mut level = best + low;
    if flip {
        level = nbins - 1 - level;
    }
    histogram.bin_center(level)
}

