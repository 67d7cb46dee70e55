//! Aggregation Module
//! Frequency rankings, top-K rows by metric, per-year counts and growth.

use crate::data::{display_values, AnalysisError, Dataset, COUNT_COLUMN};
use chrono::{Datelike, Weekday};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Days of the week in display order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One distinct value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
}

/// Percentage change from the previous year present in a count series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearGrowth {
    pub year: i64,
    pub previous_year: i64,
    pub percent: f64,
}

impl YearGrowth {
    /// False when the previous count was zero.
    pub fn is_defined(&self) -> bool {
        self.percent.is_finite()
    }
}

/// Handles counting and ranking operations over a dataset.
pub struct Aggregator;

impl Aggregator {
    /// Count occurrences of each present value, most frequent first
    /// (ties by value), optionally truncated to `top_n`.
    pub fn frequency_ranking(
        dataset: &Dataset,
        column: &str,
        top_n: Option<usize>,
    ) -> Result<Vec<FrequencyEntry>, AnalysisError> {
        let counts = dataset.value_counts(column)?.head(top_n);
        let labels = display_values(counts.column(column)?)?;
        Ok(labels
            .into_iter()
            .zip(count_column(&counts)?)
            .filter_map(|(label, count)| {
                Some(FrequencyEntry {
                    label: label?,
                    count: count as usize,
                })
            })
            .collect())
    }

    /// Incident count per year, ordered by year. Non-integral year values
    /// (e.g. a mean fill) are not folded into a neighbouring year; they are
    /// left out with a warning.
    pub fn counts_by_year(
        dataset: &Dataset,
        column: &str,
    ) -> Result<BTreeMap<i64, u64>, AnalysisError> {
        dataset.numeric(column)?;
        let counts = dataset.value_counts(column)?;
        let years = counts.column(column)?.as_materialized_series().f64()?;

        let mut by_year = BTreeMap::new();
        let mut skipped = 0;
        for (year, count) in years.into_iter().zip(count_column(&counts)?) {
            match year {
                Some(y) if y.fract() == 0.0 => {
                    by_year.insert(y as i64, count);
                }
                _ => skipped += count,
            }
        }
        if skipped > 0 {
            log::warn!(
                "Ignored {} rows with a non-integral value in '{}'",
                skipped,
                column
            );
        }
        Ok(by_year)
    }

    /// Growth percentage for every year after the first in the series,
    /// relative to the previous year present. A zero previous count yields
    /// a non-finite percentage.
    pub fn year_over_year_growth(counts: &BTreeMap<i64, u64>) -> Vec<YearGrowth> {
        counts
            .iter()
            .zip(counts.iter().skip(1))
            .map(|((&previous_year, &previous), (&year, &current))| {
                let previous = previous as f64;
                YearGrowth {
                    year,
                    previous_year,
                    percent: (current as f64 - previous) / previous * 100.0,
                }
            })
            .collect()
    }

    /// The `k` rows with the largest values of a numeric column. Missing
    /// values sort last; ties keep their input order.
    pub fn top_k_by(dataset: &Dataset, column: &str, k: usize) -> Result<Dataset, AnalysisError> {
        dataset.numeric(column)?;
        let sorted = dataset
            .lazy()
            .sort_by_exprs(
                [col(column)],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_nulls_last(true)
                    .with_maintain_order(true),
            )
            .collect()?;
        Ok(Dataset::derived(sorted.head(Some(k))))
    }

    /// Rows whose text value equals `value`.
    pub fn filter_equals(
        dataset: &Dataset,
        column: &str,
        value: &str,
    ) -> Result<Dataset, AnalysisError> {
        dataset.text(column)?;
        let frame = dataset
            .lazy()
            .filter(col(column).eq(lit(value)))
            .collect()?;
        Ok(Dataset::derived(frame))
    }

    /// Incidents per day of the week, Monday first.
    pub fn weekday_counts(
        dataset: &Dataset,
        column: &str,
    ) -> Result<Vec<(Weekday, u64)>, AnalysisError> {
        let mut counts = [0u64; 7];
        for d in dataset.datetime(column)?.as_datetime_iter().flatten() {
            counts[d.weekday().num_days_from_monday() as usize] += 1;
        }
        Ok(WEEKDAYS.into_iter().zip(counts).collect())
    }
}

fn count_column(counts: &DataFrame) -> Result<Vec<u64>, AnalysisError> {
    let column = counts.column(COUNT_COLUMN)?.cast(&DataType::UInt64)?;
    Ok(column
        .as_materialized_series()
        .u64()?
        .into_iter()
        .map(|c| c.unwrap_or(0))
        .collect())
}

/// Full English day name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cleaner;
    use polars::df;

    fn fires() -> Dataset {
        Dataset::from_frame(
            df!(
                "FIRE_NAME" => ["A", "B", "C", "D", "E"],
                "FIRE_YEAR" => [Some(2004.0), Some(2005.0), Some(2005.0), Some(2007.0), None],
                "FIRE_SIZE" => [Some(3.0), Some(500.0), None, Some(500.0), Some(42.0)],
                "CAUSE" => [Some("Human"), Some("Natural"), Some("Human"), Some("Human"), None]
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn names(ds: &Dataset) -> Vec<&str> {
        ds.text("FIRE_NAME").unwrap().into_iter().flatten().collect()
    }

    #[test]
    fn growth_from_hundred_to_hundred_twenty() {
        let counts = BTreeMap::from([(2000, 100), (2001, 120)]);
        let growth = Aggregator::year_over_year_growth(&counts);
        assert_eq!(growth.len(), 1);
        assert_eq!(growth[0].year, 2001);
        assert!((growth[0].percent - 20.0).abs() < 1e-12);
        assert!(growth[0].is_defined());
    }

    #[test]
    fn growth_after_zero_count_is_flagged() {
        let counts = BTreeMap::from([(2000, 0), (2001, 5), (2002, 0), (2003, 0)]);
        let growth = Aggregator::year_over_year_growth(&counts);
        assert_eq!(growth.len(), 3);
        assert!(growth[0].percent.is_infinite());
        assert!(!growth[0].is_defined());
        assert_eq!(growth[1].percent, -100.0);
        assert!(growth[2].percent.is_nan());
        assert!(!growth[2].is_defined());
    }

    #[test]
    fn growth_uses_previous_year_present() {
        let counts = Aggregator::counts_by_year(&fires(), "FIRE_YEAR").unwrap();
        assert_eq!(counts, BTreeMap::from([(2004, 1), (2005, 2), (2007, 1)]));
        let growth = Aggregator::year_over_year_growth(&counts);
        assert_eq!(growth[1].previous_year, 2005);
        assert_eq!(growth[1].year, 2007);
        assert_eq!(growth[1].percent, -50.0);
    }

    #[test]
    fn fractional_years_are_not_folded_into_real_years() {
        let ds = Dataset::from_frame(
            df!("FIRE_YEAR" => [2004.0, 2004.5, 2004.5, 2005.0, 2005.0]).unwrap(),
        )
        .unwrap();
        let counts = Aggregator::counts_by_year(&ds, "FIRE_YEAR").unwrap();
        assert_eq!(counts, BTreeMap::from([(2004, 1), (2005, 2)]));
    }

    #[test]
    fn single_year_has_no_growth() {
        let counts = BTreeMap::from([(1992, 10)]);
        assert!(Aggregator::year_over_year_growth(&counts).is_empty());
    }

    #[test]
    fn frequency_ranking_sorts_and_truncates() {
        let ranking = Aggregator::frequency_ranking(&fires(), "CAUSE", Some(1)).unwrap();
        assert_eq!(
            ranking,
            vec![FrequencyEntry {
                label: "Human".into(),
                count: 3
            }]
        );
        let years = Aggregator::frequency_ranking(&fires(), "FIRE_YEAR", None).unwrap();
        assert_eq!(years[0].label, "2005");
        assert_eq!(years.len(), 3);
    }

    #[test]
    fn top_k_puts_missing_last_and_keeps_ties_stable() {
        let ds = fires();
        let top = Aggregator::top_k_by(&ds, "FIRE_SIZE", 3).unwrap();
        assert_eq!(names(&top), vec!["B", "D", "E"]);
        let all = Aggregator::top_k_by(&ds, "FIRE_SIZE", 10).unwrap();
        assert_eq!(names(&all), vec!["B", "D", "E", "A", "C"]);
        assert!(Aggregator::top_k_by(&ds, "CAUSE", 3).is_err());
    }

    #[test]
    fn filtered_ranking() {
        let ds = fires();
        let human = Aggregator::filter_equals(&ds, "CAUSE", "Human").unwrap();
        assert_eq!(names(&human), vec!["A", "C", "D"]);
        let top = Aggregator::top_k_by(&human, "FIRE_SIZE", 2).unwrap();
        assert_eq!(names(&top), vec!["D", "A"]);
        assert!(Aggregator::filter_equals(&ds, "FIRE_SIZE", "Human").is_err());
    }

    #[test]
    fn weekday_counts_start_on_monday() {
        let mut ds = Dataset::from_frame(
            // Monday, Monday, Sunday
            df!("DISCOVERY_DATE" => ["2024-01-01", "2024-01-08", "2024-01-07"]).unwrap(),
        )
        .unwrap();
        assert!(Aggregator::weekday_counts(&ds, "DISCOVERY_DATE").is_err());

        Cleaner::new("DISCOVERY_DATE", "STATE").clean(&mut ds);
        let counts = Aggregator::weekday_counts(&ds, "DISCOVERY_DATE").unwrap();
        assert_eq!(counts[0], (Weekday::Mon, 2));
        assert_eq!(counts[6], (Weekday::Sun, 1));
        assert_eq!(weekday_name(counts[6].0), "Sunday");
    }
}
