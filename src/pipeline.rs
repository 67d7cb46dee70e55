//! Analysis Pipeline
//! Loader -> Cleaner -> {outliers, statistics, aggregates, sample} -> charts.

use crate::charts::{ChartBuilder, ChartData};
use crate::data::{CleaningReport, Cleaner, ColumnKind, DataLoader, Dataset, LoaderError};
use crate::settings::AnalysisSettings;
use crate::stats::{
    Aggregator, ColumnSummary, OutlierDetector, OutlierSummary, Sampler, StatsCalculator,
    YearGrowth,
};

/// First rows of a table, rendered as text.
#[derive(Debug, Clone)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    pub fn of(dataset: &Dataset, rows: usize) -> Self {
        Self {
            headers: dataset.column_names().iter().map(|s| s.to_string()).collect(),
            rows: dataset.head(rows).unwrap_or_else(|e| {
                log::warn!("Cannot render preview: {}", e);
                Vec::new()
            }),
        }
    }
}

/// Per-column schema line.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub non_null: usize,
}

impl ColumnInfo {
    pub fn collect(dataset: &Dataset) -> Vec<Self> {
        dataset
            .frame()
            .get_columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name().to_string(),
                kind: ColumnKind::of(c.dtype()),
                non_null: dataset.height() - c.null_count(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SampleSummary {
    pub population: usize,
    pub size: usize,
    pub preview: TablePreview,
    pub info: Vec<ColumnInfo>,
}

/// Everything one run produced, in pipeline order.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub raw_preview: TablePreview,
    pub raw_info: Vec<ColumnInfo>,
    pub cleaning: CleaningReport,
    pub outliers: Vec<OutlierSummary>,
    pub clean_preview: TablePreview,
    pub clean_info: Vec<ColumnInfo>,
    pub summary: Vec<(String, ColumnSummary)>,
    pub sample: Option<SampleSummary>,
    pub total_incidents: usize,
    pub growth: Option<Vec<YearGrowth>>,
    pub charts: Vec<ChartData>,
}

pub struct AnalysisPipeline {
    settings: AnalysisSettings,
}

impl AnalysisPipeline {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Load the configured CSV and analyze it. Only loading can fail.
    pub fn run(&self) -> Result<AnalysisRun, LoaderError> {
        let dataset = DataLoader::new(&self.settings.csv_path).load()?;
        Ok(self.analyze(dataset))
    }

    /// Clean the dataset in place, then derive every statistic and chart.
    pub fn analyze(&self, mut dataset: Dataset) -> AnalysisRun {
        let settings = &self.settings;
        let raw_preview = TablePreview::of(&dataset, settings.preview_rows);
        let raw_info = ColumnInfo::collect(&dataset);

        let cleaning =
            Cleaner::new(&settings.columns.date, &settings.normalize_column).clean(&mut dataset);
        log::info!(
            "Cleaned dataset: {} rows, {} columns",
            dataset.height(),
            dataset.width()
        );
        let outliers = OutlierDetector::new(settings.z_threshold).detect(&dataset);

        let sampled = self.sample(&dataset);
        let sample = sampled.as_ref().map(|sampled| SampleSummary {
            population: dataset.height(),
            size: sampled.height(),
            preview: TablePreview::of(sampled, settings.preview_rows),
            info: ColumnInfo::collect(sampled),
        });

        let growth = self.growth(&dataset);
        let charts = ChartBuilder::new(settings).build(&dataset, sampled.as_ref());
        let summary = StatsCalculator::describe(&dataset).unwrap_or_else(|e| {
            log::warn!("Skipping descriptive statistics: {}", e);
            Vec::new()
        });

        AnalysisRun {
            raw_preview,
            raw_info,
            cleaning,
            outliers,
            clean_preview: TablePreview::of(&dataset, settings.preview_rows),
            clean_info: ColumnInfo::collect(&dataset),
            summary,
            sample,
            total_incidents: dataset.height(),
            growth,
            charts,
        }
    }

    fn sample(&self, dataset: &Dataset) -> Option<Dataset> {
        let settings = &self.settings;
        let Some(rows) = Sampler::new(settings.sample_size, settings.seed).sample(dataset.height())
        else {
            log::warn!(
                "Dataset has {} records, fewer than the sample size {}; sampling skipped",
                dataset.height(),
                settings.sample_size
            );
            return None;
        };
        match dataset.take(&rows) {
            Ok(sampled) => {
                log::info!(
                    "Selected a sample of {} out of {} records",
                    sampled.height(),
                    dataset.height()
                );
                Some(sampled)
            }
            Err(e) => {
                log::warn!("Sampling failed: {}", e);
                None
            }
        }
    }

    fn growth(&self, dataset: &Dataset) -> Option<Vec<YearGrowth>> {
        let counts = Aggregator::counts_by_year(dataset, &self.settings.columns.year);
        match counts {
            Ok(counts) => Some(Aggregator::year_over_year_growth(&counts)),
            Err(e) => {
                log::warn!("Skipping annual growth: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn settings() -> AnalysisSettings {
        AnalysisSettings {
            sample_size: 3,
            ..Default::default()
        }
    }

    fn incidents() -> Dataset {
        Dataset::from_frame(
            df!(
                "FIRE_YEAR" => [2004.0, 2004.0, 2005.0, 2005.0, 2005.0],
                "FIRE_SIZE" => [Some(10.0), Some(10.0), Some(20.0), None, Some(1.0)],
                "STATE" => [Some(" CA"), Some(" CA"), Some("or "), Some("OR"), None],
                "DISCOVERY_DATE" => [
                    "2004-06-01",
                    "2004-06-01",
                    "2005-07-04",
                    "garbage",
                    "2005-08-09",
                ],
                "LATITUDE" => [38.0, 38.0, 40.0, 41.0, 42.0],
                "LONGITUDE" => [-120.0, -120.0, -110.0, -111.0, -112.0]
            )
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn analyze_runs_every_stage() {
        let run = AnalysisPipeline::new(settings()).analyze(incidents());

        assert_eq!(run.raw_info[1].non_null, 4);
        assert_eq!(run.cleaning.rows_before, 5);
        assert_eq!(run.cleaning.rows_after, 4);
        assert_eq!(run.cleaning.unparsed_dates, Some(1));
        assert_eq!(run.total_incidents, 4);
        // date/time columns are not imputed
        let non_null: Vec<usize> = run.clean_info.iter().map(|c| c.non_null).collect();
        assert_eq!(non_null, vec![4, 4, 4, 3, 4, 4]);
        assert_eq!(run.clean_info[3].kind, ColumnKind::DateTime);
        assert_eq!(run.clean_preview.rows[0][2], "ca");
        assert_eq!(run.outliers.len(), 4);

        let growth = run.growth.unwrap();
        assert_eq!(growth.len(), 1);
        assert_eq!(growth[0].percent, 200.0);

        let sample = run.sample.unwrap();
        assert_eq!((sample.population, sample.size), (4, 3));
        assert!(run.charts.iter().any(|c| c.title.contains("Sample")));
    }

    #[test]
    fn small_dataset_skips_sample_and_geo_charts() {
        let settings = AnalysisSettings {
            sample_size: 100,
            ..Default::default()
        };
        let run = AnalysisPipeline::new(settings).analyze(incidents());
        assert!(run.sample.is_none());
        assert!(!run.charts.iter().any(|c| c.title.contains("Sample")));
    }

    #[test]
    fn missing_year_column_skips_growth() {
        let ds = Dataset::from_frame(df!("FIRE_SIZE" => [1.0]).unwrap()).unwrap();
        let run = AnalysisPipeline::new(settings()).analyze(ds);
        assert!(run.growth.is_none());
        assert!(run.charts.is_empty());
    }
}
