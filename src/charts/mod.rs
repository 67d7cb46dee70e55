//! Charts module - data for the fixed chart sequence

mod builder;
mod data;

pub use builder::ChartBuilder;
pub use data::{ChartData, ChartKind, ChartSeries};
