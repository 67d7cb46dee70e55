//! Data Cleaner Module
//! Deduplication, date coercion, text normalization and missing-value imputation.

use super::dataset::{AnalysisError, ColumnKind, Dataset};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];

/// Value used to fill the missing cells of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    Mean(f64),
    Mode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillRecord {
    pub column: String,
    pub filled: usize,
    pub value: FillValue,
}

/// A cleaning step that did not run, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedStep {
    pub step: &'static str,
    pub reason: String,
}

/// Diagnostics collected while cleaning. Observational only.
#[derive(Debug, Clone, Default)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub unparsed_dates: Option<usize>,
    pub nulls_before_impute: Vec<(String, usize)>,
    pub nulls_after_impute: Vec<(String, usize)>,
    pub fills: Vec<FillRecord>,
    pub skipped: Vec<SkippedStep>,
}

impl CleaningReport {
    pub fn duplicates_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    fn skip(&mut self, step: &'static str, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Skipping {}: {}", step, reason);
        self.skipped.push(SkippedStep { step, reason });
    }
}

/// Applies the cleaning sequence in place.
pub struct Cleaner {
    date_column: String,
    normalize_column: String,
}

impl Cleaner {
    pub fn new(date_column: impl Into<String>, normalize_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            normalize_column: normalize_column.into(),
        }
    }

    /// Run every step in order: deduplicate, coerce dates, normalize text,
    /// impute numeric columns, impute text columns. A failing step is
    /// recorded in the report and the rest still run.
    pub fn clean(&self, dataset: &mut Dataset) -> CleaningReport {
        let mut report = CleaningReport {
            rows_before: dataset.height(),
            ..Default::default()
        };

        if let Err(e) = deduplicate(dataset) {
            report.skip("deduplication", e.to_string());
        }
        report.rows_after = dataset.height();
        log::info!(
            "Rows before deduplication: {}, after: {}",
            report.rows_before,
            report.rows_after
        );

        match coerce_dates(dataset, &self.date_column) {
            Ok(unparsed) => {
                if unparsed > 0 {
                    log::info!(
                        "{} values in '{}' could not be parsed as dates",
                        unparsed,
                        self.date_column
                    );
                }
                report.unparsed_dates = Some(unparsed);
            }
            Err(e) => report.skip("date coercion", e.to_string()),
        }

        if let Err(e) = normalize_text(dataset, &self.normalize_column) {
            report.skip("text normalization", e.to_string());
        }

        report.nulls_before_impute = dataset.null_counts();
        if let Err(e) = impute_numeric(dataset, &mut report) {
            report.skip("mean imputation", e.to_string());
        }
        if let Err(e) = impute_categorical(dataset, &mut report) {
            report.skip("mode imputation", e.to_string());
        }
        report.nulls_after_impute = dataset.null_counts();

        report
    }
}

/// Drop exact duplicate rows, keeping first occurrences in order. Missing
/// cells compare equal. Returns rows removed.
pub fn deduplicate(dataset: &mut Dataset) -> Result<usize, AnalysisError> {
    let before = dataset.height();
    let unique = dataset
        .frame()
        .unique_stable(None, UniqueKeepStrategy::First, None)?;
    let removed = before - unique.height();
    dataset.set_frame(unique);
    Ok(removed)
}

/// Parse a text column into date/time values. Unparseable cells become
/// missing; the count of such cells (excluding already-missing ones) is
/// returned. An already coerced column is left as is.
pub fn coerce_dates(dataset: &mut Dataset, column: &str) -> Result<usize, AnalysisError> {
    match dataset.probe(column) {
        None => return Err(AnalysisError::MissingColumn(column.to_string())),
        Some(ColumnKind::DateTime) => return Ok(0),
        Some(ColumnKind::Text) => {}
        Some(found) => {
            return Err(AnalysisError::UnexpectedKind {
                column: column.to_string(),
                expected: ColumnKind::Text,
                found,
            })
        }
    }

    let mut unparsed = 0;
    let parsed: Vec<Option<NaiveDateTime>> = dataset
        .text(column)?
        .into_iter()
        .map(|cell| {
            let value = parse_datetime(cell?);
            if value.is_none() {
                unparsed += 1;
            }
            value
        })
        .collect();

    let dates =
        DatetimeChunked::from_naive_datetime_options(column.into(), parsed, TimeUnit::Microseconds);
    let mut frame = dataset.frame().clone();
    frame.with_column(dates.into_series())?;
    dataset.set_frame(frame);
    Ok(unparsed)
}

/// Best-effort date/time parsing over the formats seen in incident exports.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Lowercase and trim a text column.
pub fn normalize_text(dataset: &mut Dataset, column: &str) -> Result<(), AnalysisError> {
    dataset.text(column)?;
    let frame = dataset
        .lazy()
        .with_column(col(column).str().strip_chars(lit(NULL)).str().to_lowercase())
        .collect()?;
    dataset.set_frame(frame);
    Ok(())
}

/// Fill missing numeric cells with the column mean. Entirely missing
/// columns have no mean and are skipped.
pub fn impute_numeric(
    dataset: &mut Dataset,
    report: &mut CleaningReport,
) -> Result<(), AnalysisError> {
    let mut fills = Vec::new();
    for (name, values) in dataset.numeric_columns() {
        let missing = values.null_count();
        if missing == 0 {
            continue;
        }
        match values.mean() {
            Some(mean) => fills.push(FillRecord {
                column: name.to_string(),
                filled: missing,
                value: FillValue::Mean(mean),
            }),
            None => report.skip("mean imputation", format!("column '{}' has no values", name)),
        }
    }

    let exprs: Vec<Expr> = fills
        .iter()
        .map(|fill| {
            let name = fill.column.as_str();
            col(name).fill_null(col(name).mean())
        })
        .collect();
    apply_fills(dataset, exprs, fills, report)
}

/// Fill missing text cells with the column mode.
pub fn impute_categorical(
    dataset: &mut Dataset,
    report: &mut CleaningReport,
) -> Result<(), AnalysisError> {
    let mut fills = Vec::new();
    for name in dataset.column_names() {
        let Ok(values) = dataset.text(name) else {
            continue;
        };
        let missing = values.null_count();
        if missing == 0 {
            continue;
        }
        match mode(dataset, name)? {
            Some(mode) => fills.push(FillRecord {
                column: name.to_string(),
                filled: missing,
                value: FillValue::Mode(mode),
            }),
            None => report.skip("mode imputation", format!("column '{}' has no values", name)),
        }
    }

    let exprs: Vec<Expr> = fills
        .iter()
        .filter_map(|fill| match &fill.value {
            FillValue::Mode(mode) => {
                Some(col(fill.column.as_str()).fill_null(lit(mode.clone())))
            }
            FillValue::Mean(_) => None,
        })
        .collect();
    apply_fills(dataset, exprs, fills, report)
}

fn apply_fills(
    dataset: &mut Dataset,
    exprs: Vec<Expr>,
    fills: Vec<FillRecord>,
    report: &mut CleaningReport,
) -> Result<(), AnalysisError> {
    if exprs.is_empty() {
        return Ok(());
    }
    let frame = dataset.lazy().with_columns(exprs).collect()?;
    dataset.set_frame(frame);

    for fill in fills {
        match &fill.value {
            FillValue::Mean(mean) => log::info!(
                "Filled {} missing values in '{}' with the mean ({:.2})",
                fill.filled,
                fill.column,
                mean
            ),
            FillValue::Mode(mode) => log::info!(
                "Filled {} missing values in '{}' with the mode ('{}')",
                fill.filled,
                fill.column,
                mode
            ),
        }
        report.fills.push(fill);
    }
    Ok(())
}

/// Most frequent present value of a text column; ties go to the smallest
/// value.
pub fn mode(dataset: &Dataset, column: &str) -> Result<Option<String>, AnalysisError> {
    dataset.text(column)?;
    let counts = dataset.value_counts(column)?;
    let top = counts
        .column(column)?
        .as_materialized_series()
        .str()?
        .get(0)
        .map(str::to_string);
    Ok(top)
}
