//! Analysis settings: input location, consulted columns and fixed parameters.

use crate::stats::DEFAULT_Z_THRESHOLD;
use serde::Serialize;
use std::path::PathBuf;

/// Column names consulted by the pipeline. Each is optional in the data.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnNames {
    pub date: String,
    pub state: String,
    pub cause: String,
    pub size: String,
    pub size_class: String,
    pub name: String,
    pub year: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "DISCOVERY_DATE".into(),
            state: "STATE".into(),
            cause: "NWCG_CAUSE_CLASSIFICATION".into(),
            size: "FIRE_SIZE".into(),
            size_class: "FIRE_SIZE_CLASS".into(),
            name: "FIRE_NAME".into(),
            year: "FIRE_YEAR".into(),
            latitude: "LATITUDE".into(),
            longitude: "LONGITUDE".into(),
        }
    }
}

/// Settings for one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSettings {
    pub csv_path: PathBuf,
    pub columns: ColumnNames,
    /// Text column lowercased and trimmed during cleaning
    pub normalize_column: String,
    pub z_threshold: f64,
    pub top_causes: usize,
    pub top_states: usize,
    pub top_fires: usize,
    /// Cause value for the filtered largest-fires ranking
    pub focus_cause: String,
    pub sample_size: usize,
    pub seed: u64,
    pub heatmap_bins: usize,
    pub preview_rows: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let columns = ColumnNames::default();
        Self {
            csv_path: PathBuf::from("wildfires.csv"),
            normalize_column: columns.state.clone(),
            columns,
            z_threshold: DEFAULT_Z_THRESHOLD,
            top_causes: 5,
            top_states: 10,
            top_fires: 10,
            focus_cause: "Human".into(),
            sample_size: 500_000,
            seed: 42,
            heatmap_bins: 100,
            preview_rows: 5,
        }
    }
}
