//! Z-score outlier detection. Counts only; rows are never removed.

use crate::data::Dataset;
use statrs::statistics::Statistics;

/// Default |z| above which a value counts as an outlier.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OutlierSummary {
    pub column: String,
    pub outliers: usize,
}

pub struct OutlierDetector {
    threshold: f64,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::new(DEFAULT_Z_THRESHOLD)
    }
}

impl OutlierDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Absolute z-scores using the population standard deviation.
    /// `None` when the deviation is zero or undefined.
    pub fn z_scores(values: &[f64]) -> Option<Vec<f64>> {
        if values.len() < 2 {
            return None;
        }
        let mean = values.iter().mean();
        let sigma = values.iter().population_std_dev();
        if sigma.is_nan() || sigma == 0.0 {
            return None;
        }
        Some(values.iter().map(|v| ((v - mean) / sigma).abs()).collect())
    }

    pub fn count_outliers(&self, values: &[f64]) -> usize {
        Self::z_scores(values)
            .map(|z| z.into_iter().filter(|&s| s > self.threshold).count())
            .unwrap_or(0)
    }

    /// Outlier count for every numeric column, over present values.
    pub fn detect(&self, dataset: &Dataset) -> Vec<OutlierSummary> {
        dataset
            .numeric_columns()
            .map(|(name, values)| {
                let present: Vec<f64> = values.into_iter().flatten().collect();
                let outliers = self.count_outliers(&present);
                log::info!("Column '{}': {} outliers", name, outliers);
                OutlierSummary {
                    column: name.to_string(),
                    outliers,
                }
            })
            .collect()
    }
}
