//! Stats module - descriptive statistics, outliers, aggregation and sampling

mod aggregate;
mod calculator;
mod histogram;
mod outliers;
mod sampler;

pub use aggregate::{weekday_name, Aggregator, FrequencyEntry, YearGrowth};
pub use calculator::{ColumnSummary, StatsCalculator};
pub use histogram::Histogram2d;
pub use outliers::{OutlierDetector, OutlierSummary, DEFAULT_Z_THRESHOLD};
pub use sampler::Sampler;
