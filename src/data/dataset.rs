//! Dataset Module
//! Thin wrapper over a Polars DataFrame with a normalized schema: every
//! column is `Float64` (numeric), `String` (text) or `Datetime` (date/time).
//! Columns are addressed by name and probed before use.

use polars::prelude::*;
use std::fmt;
use thiserror::Error;

/// Format used when a date/time cell is shown as text.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name of the count column in [`Dataset::value_counts`] results.
pub const COUNT_COLUMN: &str = "count";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("Column '{column}' is {found}, expected {expected}")]
    UnexpectedKind {
        column: String,
        expected: ColumnKind,
        found: ColumnKind,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    DateTime,
}

impl ColumnKind {
    /// Kind of a normalized column dtype.
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Float64 => ColumnKind::Numeric,
            DataType::Datetime(_, _) => ColumnKind::DateTime,
            _ => ColumnKind::Text,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// Format a number without a trailing `.0` when it is integral.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Incident table. Cleaning steps replace the frame; readers borrow it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Normalize a loaded frame: numeric dtypes become `Float64` with NaN
    /// turned into null, dates become `Datetime`, everything else `String`.
    pub fn from_frame(frame: DataFrame) -> Result<Self, AnalysisError> {
        let columns = frame
            .get_columns()
            .iter()
            .map(normalize_column)
            .collect::<PolarsResult<Vec<_>>>()?;
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Replace the frame with the result of a cleaning step. The step must
    /// keep the normalized dtypes.
    pub(crate) fn set_frame(&mut self, frame: DataFrame) {
        self.frame = frame;
    }

    /// Wrap a frame derived from this crate's own (normalized) datasets.
    pub(crate) fn derived(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub(crate) fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().as_str())
            .collect()
    }

    /// Kind of the named column, or `None` when the schema lacks it.
    pub fn probe(&self, name: &str) -> Option<ColumnKind> {
        self.frame.column(name).ok().map(|c| ColumnKind::of(c.dtype()))
    }

    pub fn column(&self, name: &str) -> Result<&Column, AnalysisError> {
        self.frame
            .column(name)
            .map_err(|_| AnalysisError::MissingColumn(name.to_string()))
    }

    pub fn numeric(&self, name: &str) -> Result<&Float64Chunked, AnalysisError> {
        let column = self.expect_kind(name, ColumnKind::Numeric)?;
        Ok(column.as_materialized_series().f64()?)
    }

    pub fn text(&self, name: &str) -> Result<&StringChunked, AnalysisError> {
        let column = self.expect_kind(name, ColumnKind::Text)?;
        Ok(column.as_materialized_series().str()?)
    }

    pub fn datetime(&self, name: &str) -> Result<&DatetimeChunked, AnalysisError> {
        let column = self.expect_kind(name, ColumnKind::DateTime)?;
        Ok(column.as_materialized_series().datetime()?)
    }

    fn expect_kind(&self, name: &str, expected: ColumnKind) -> Result<&Column, AnalysisError> {
        let column = self.column(name)?;
        let found = ColumnKind::of(column.dtype());
        if found != expected {
            return Err(AnalysisError::UnexpectedKind {
                column: name.to_string(),
                expected,
                found,
            });
        }
        Ok(column)
    }

    /// Numeric columns in schema order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &Float64Chunked)> + '_ {
        self.frame.get_columns().iter().filter_map(|c| {
            let values = c.as_materialized_series().f64().ok()?;
            Some((c.name().as_str(), values))
        })
    }

    /// New dataset holding the given rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> Result<Dataset, AnalysisError> {
        let idx = IdxCa::from_vec(
            "idx".into(),
            rows.iter().map(|&r| r as IdxSize).collect(),
        );
        Ok(Dataset {
            frame: self.frame.take(&idx)?,
        })
    }

    /// Distinct present values of a column and their counts
    /// (`[column, COUNT_COLUMN]`), most frequent first, ties by value.
    pub fn value_counts(&self, column: &str) -> Result<DataFrame, AnalysisError> {
        self.column(column)?;
        let counts = self
            .lazy()
            .select([col(column)])
            .filter(col(column).is_not_null())
            .group_by([col(column)])
            .agg([len().alias(COUNT_COLUMN)])
            .sort_by_exprs(
                [col(COUNT_COLUMN), col(column)],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;
        Ok(counts)
    }

    /// Missing-value count per column, in schema order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect()
    }

    /// First `n` rows rendered as strings.
    pub fn head(&self, n: usize) -> Result<Vec<Vec<String>>, AnalysisError> {
        let head = self.frame.head(Some(n));
        let columns = head
            .get_columns()
            .iter()
            .map(display_values)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((0..head.height())
            .map(|row| {
                columns
                    .iter()
                    .map(|c| c[row].clone().unwrap_or_else(|| "NaN".to_string()))
                    .collect()
            })
            .collect())
    }
}

/// Render every cell of a normalized column; `None` marks a missing cell.
pub fn display_values(column: &Column) -> Result<Vec<Option<String>>, AnalysisError> {
    let series = column.as_materialized_series();
    let values: Vec<Option<String>> = match ColumnKind::of(column.dtype()) {
        ColumnKind::Numeric => series.f64()?.into_iter().map(|v| v.map(format_number)).collect(),
        ColumnKind::Text => series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect(),
        ColumnKind::DateTime => series
            .datetime()?
            .as_datetime_iter()
            .map(|v| v.map(|d| d.format(DATETIME_DISPLAY_FORMAT).to_string()))
            .collect(),
    };
    Ok(values)
}

fn normalize_column(column: &Column) -> PolarsResult<Column> {
    match column.dtype() {
        dtype if is_numeric_dtype(dtype) => {
            let floats = column.cast(&DataType::Float64)?;
            let cleaned: Float64Chunked = floats
                .as_materialized_series()
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(Column::from(cleaned.with_name(column.name().clone()).into_series()))
        }
        DataType::Datetime(_, _) => Ok(column.clone()),
        DataType::Date => column.cast(&DataType::Datetime(TimeUnit::Microseconds, None)),
        _ => column.cast(&DataType::String),
    }
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Null
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample() -> Dataset {
        Dataset::from_frame(
            df!(
                "FIRE_SIZE" => [Some(10.0), Some(10.0), None, Some(f64::NAN)],
                "STATE" => [Some("CA"), Some("CA"), None, Some("OR")],
                "FIRE_YEAR" => [1992i64, 1993, 1993, 1994]
            )
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn normalizes_dtypes_and_nan() {
        let ds = sample();
        assert_eq!(ds.probe("FIRE_SIZE"), Some(ColumnKind::Numeric));
        assert_eq!(ds.probe("FIRE_YEAR"), Some(ColumnKind::Numeric));
        assert_eq!(ds.probe("STATE"), Some(ColumnKind::Text));
        assert_eq!(ds.probe("LATITUDE"), None);
        assert_eq!(ds.numeric("FIRE_SIZE").unwrap().null_count(), 2);
        assert_eq!(ds.numeric("FIRE_YEAR").unwrap().get(0), Some(1992.0));
    }

    #[test]
    fn typed_access_checks_kind() {
        let ds = sample();
        assert!(matches!(
            ds.numeric("STATE"),
            Err(AnalysisError::UnexpectedKind {
                expected: ColumnKind::Numeric,
                found: ColumnKind::Text,
                ..
            })
        ));
        assert!(matches!(
            ds.text("FIRE_NAME"),
            Err(AnalysisError::MissingColumn(ref name)) if name == "FIRE_NAME"
        ));
    }

    #[test]
    fn take_and_null_counts() {
        let ds = sample().take(&[3, 2]).unwrap();
        assert_eq!(ds.height(), 2);
        assert_eq!(
            ds.null_counts(),
            vec![
                ("FIRE_SIZE".to_string(), 2),
                ("STATE".to_string(), 1),
                ("FIRE_YEAR".to_string(), 0)
            ]
        );
    }

    #[test]
    fn value_counts_rank_by_count_then_value() {
        let ds = Dataset::from_frame(
            df!("CAUSE" => [Some("b"), Some("a"), None, Some("b"), Some("c"), Some("a")]).unwrap(),
        )
        .unwrap();
        let counts = ds.value_counts("CAUSE").unwrap();
        let labels: Vec<Option<&str>> = counts
            .column("CAUSE")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn head_renders_cells() {
        let rows = sample().head(10).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["10", "CA", "1992"]);
        assert_eq!(rows[2], vec!["NaN", "NaN", "1993"]);
    }

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(format_number(1992.0), "1992");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }
}
