//! CSV Data Loader Module
//! Reads the incident CSV with Polars into a normalized [`Dataset`].

use super::dataset::{AnalysisError, Dataset};
use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Rows inspected by Polars when inferring column types.
pub const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Malformed table: {0}")]
    Shape(#[from] AnalysisError),
}

/// Handles CSV file loading with Polars for high performance.
pub struct DataLoader {
    file_path: PathBuf,
}

impl DataLoader {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Load the CSV into a Polars DataFrame. An empty or undecodable file
    /// fails here; a header-only file yields zero rows.
    pub fn read_dataframe(&self) -> Result<DataFrame, LoaderError> {
        if !self.file_path.is_file() {
            return Err(LoaderError::NotFound(self.file_path.clone()));
        }

        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(&self.file_path)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Load the CSV and normalize its columns.
    pub fn load(&self) -> Result<Dataset, LoaderError> {
        let df = self.read_dataframe()?;
        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            self.file_path.display()
        );
        Ok(Dataset::from_frame(df)?)
    }
}
