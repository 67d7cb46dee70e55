//! Data module - CSV loading, Polars-backed dataset and cleaning

mod cleaner;
mod dataset;
mod loader;

pub use cleaner::{Cleaner, CleaningReport, FillValue};
pub use dataset::{
    display_values, AnalysisError, ColumnKind, Dataset, COUNT_COLUMN, DATETIME_DISPLAY_FORMAT,
};
pub use loader::{DataLoader, LoaderError};
