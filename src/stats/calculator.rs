//! Statistics Calculator Module
//! Descriptive statistics per column (numeric, text and date/time).

use crate::data::{
    AnalysisError, ColumnKind, Dataset, COUNT_COLUMN, DATETIME_DISPLAY_FORMAT,
};
use polars::prelude::*;
use statrs::statistics::Statistics;

/// Statistics for a numeric column.
#[derive(Debug, Clone)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for NumericStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Statistics for a text column.
#[derive(Debug, Clone, Default)]
pub struct TextStats {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

/// Statistics for a date/time column.
#[derive(Debug, Clone, Default)]
pub struct DateStats {
    pub count: usize,
    pub first: Option<String>,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ColumnSummary {
    Numeric(NumericStats),
    Text(TextStats),
    DateTime(DateStats),
}

/// Handles descriptive statistics over a dataset.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Count, mean, sample standard deviation, extremes and quartiles of
    /// the present values. All NaN when there are none.
    pub fn compute_descriptive_stats(values: &[f64]) -> NumericStats {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return NumericStats::default();
        };

        let [p25, median, p75] = quantiles(&sorted, [0.25, 0.5, 0.75]);
        NumericStats {
            count: sorted.len(),
            mean: sorted.iter().mean(),
            std: sorted.iter().std_dev(),
            min,
            p25,
            median,
            p75,
            max,
        }
    }

    /// Count, distinct values and the most frequent value of a text column.
    pub fn compute_text_stats(
        dataset: &Dataset,
        column: &str,
    ) -> Result<TextStats, AnalysisError> {
        let values = dataset.text(column)?;
        let counts = dataset.value_counts(column)?;
        let top = counts
            .column(column)?
            .as_materialized_series()
            .str()?
            .get(0)
            .map(str::to_string);
        let freq = counts
            .column(COUNT_COLUMN)?
            .cast(&DataType::UInt64)?
            .as_materialized_series()
            .u64()?
            .get(0)
            .unwrap_or(0);

        Ok(TextStats {
            count: values.len() - values.null_count(),
            unique: counts.height(),
            top,
            freq: freq as usize,
        })
    }

    pub fn compute_date_stats(
        dataset: &Dataset,
        column: &str,
    ) -> Result<DateStats, AnalysisError> {
        let present: Vec<chrono::NaiveDateTime> =
            dataset.datetime(column)?.as_datetime_iter().flatten().collect();
        let format = |d: chrono::NaiveDateTime| d.format(DATETIME_DISPLAY_FORMAT).to_string();
        // `Statistics` also provides min/max, so name the iterator ones
        Ok(DateStats {
            count: present.iter().count(),
            first: Iterator::min(present.iter().copied()).map(format),
            last: Iterator::max(present.into_iter()).map(format),
        })
    }

    /// Describe every column of the dataset, in schema order.
    pub fn describe(dataset: &Dataset) -> Result<Vec<(String, ColumnSummary)>, AnalysisError> {
        dataset
            .column_names()
            .into_iter()
            .map(|name| {
                let summary = match dataset.probe(name) {
                    Some(ColumnKind::Numeric) => {
                        let present: Vec<f64> =
                            dataset.numeric(name)?.into_iter().flatten().collect();
                        ColumnSummary::Numeric(Self::compute_descriptive_stats(&present))
                    }
                    Some(ColumnKind::DateTime) => {
                        ColumnSummary::DateTime(Self::compute_date_stats(dataset, name)?)
                    }
                    _ => ColumnSummary::Text(Self::compute_text_stats(dataset, name)?),
                };
                Ok::<_, AnalysisError>((name.to_string(), summary))
            })
            .collect()
    }
}

/// Quantiles of ascending values by linear interpolation between the two
/// nearest ranks (pandas and NumPy default).
pub fn quantiles<const N: usize>(sorted: &[f64], qs: [f64; N]) -> [f64; N] {
    qs.map(|q| {
        let Some(last) = sorted.len().checked_sub(1) else {
            return f64::NAN;
        };
        let rank = q.clamp(0.0, 1.0) * last as f64;
        let below = rank.floor() as usize;
        let above = (below + 1).min(last);
        let weight = rank - below as f64;
        sorted[below] + (sorted[above] - sorted[below]) * weight
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn numeric_stats_match_pandas_describe() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.p25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.p75, 3.25);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn empty_numeric_stats_are_nan() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn quantiles_interpolate_between_ranks() {
        assert_eq!(quantiles(&[10.0], [0.0, 0.5, 1.0]), [10.0, 10.0, 10.0]);
        assert_eq!(quantiles(&[0.0, 10.0, 20.0], [0.1, 0.5, 1.0]), [2.0, 10.0, 20.0]);
        assert!(quantiles(&[], [0.5])[0].is_nan());
    }

    #[test]
    fn text_stats_report_top_value() {
        let ds = Dataset::from_frame(
            df!("STATE" => [Some("ca"), Some("or"), Some("ca"), None]).unwrap(),
        )
        .unwrap();
        let stats = StatsCalculator::compute_text_stats(&ds, "STATE").unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.unique, 2);
        assert_eq!(stats.top.as_deref(), Some("ca"));
        assert_eq!(stats.freq, 2);
    }

    #[test]
    fn describe_follows_schema_order() {
        let ds = Dataset::from_frame(
            df!(
                "STATE" => ["ca"],
                "FIRE_SIZE" => [3.0]
            )
            .unwrap(),
        )
        .unwrap();
        let summary = StatsCalculator::describe(&ds).unwrap();
        assert_eq!(summary[0].0, "STATE");
        assert!(matches!(summary[1].1, ColumnSummary::Numeric(ref s) if s.count == 1));
    }
}
