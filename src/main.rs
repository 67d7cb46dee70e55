//! Wildfire EDA - exploratory analysis of a wildfire incident CSV
//!
//! Loads, cleans and summarizes the incident table, then prepares chart data.

mod charts;
mod data;
mod pipeline;
mod report;
mod settings;
mod stats;

use anyhow::Context;
use pipeline::AnalysisPipeline;
use settings::AnalysisSettings;

fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .try_init()
        .context("failed to initialise logging")?;

    let settings = AnalysisSettings::default();
    log::debug!("Settings: {}", serde_json::to_string(&settings)?);

    let pipeline = AnalysisPipeline::new(settings);
    let run = pipeline.run().with_context(|| {
        format!(
            "failed to load {}",
            pipeline.settings().csv_path.display()
        )
    })?;

    report::print_run(&run);
    Ok(())
}
