//! Fixed-width bearing histogram over the full circle.

use crate::constants::HISTOGRAM_BIN_WIDTH;

/// Occurrence counts in equal-width bins covering [0, 360)
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bin_width: f64,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bin bearings; non-finite values and values outside [0, 360] are ignored,
    /// and 360 itself falls into the last bin. A width that is not positive and
    /// finite falls back to the default width.
    pub fn from_values(values: &[f64], bin_width: f64) -> Self {
        let bin_width = if bin_width.is_finite() && bin_width > 0.0 {
            bin_width
        } else {
            HISTOGRAM_BIN_WIDTH
        };
        let bins = (360.0 / bin_width).ceil().max(1.0) as usize;
        let mut counts = vec![0usize; bins];

        for &value in values {
            if !value.is_finite() || !(0.0..=360.0).contains(&value) {
                continue;
            }
            let index = ((value / bin_width) as usize).min(bins - 1);
            counts[index] += 1;
        }

        Self { bin_width, counts }
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Lower edge of a bin in degrees
    pub fn bin_start(&self, index: usize) -> f64 {
        index as f64 * self.bin_width
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
