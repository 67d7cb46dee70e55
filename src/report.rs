//! Console report for a finished analysis run.

use crate::charts::{ChartData, ChartKind, ChartSeries};
use crate::data::{CleaningReport, FillValue};
use crate::pipeline::{AnalysisRun, ColumnInfo, TablePreview};
use crate::stats::{ColumnSummary, OutlierSummary, YearGrowth};

pub fn print_run(run: &AnalysisRun) {
    section("First rows");
    print_table(&run.raw_preview);
    section("Column info");
    print_info(&run.raw_info);

    print_cleaning(&run.cleaning);
    print_outliers(&run.outliers);

    section("Cleaned data");
    print_table(&run.clean_preview);
    print_info(&run.clean_info);

    print_summary(&run.summary);

    if let Some(sample) = &run.sample {
        section(&format!(
            "Sample ({} of {} records)",
            sample.size, sample.population
        ));
        print_table(&sample.preview);
        print_info(&sample.info);
    }

    section("Incidents");
    println!("Total number of fire incidents: {}", run.total_incidents);
    if let Some(growth) = &run.growth {
        print_growth(growth);
    }

    print_charts(&run.charts);
}

fn section(title: &str) {
    println!();
    println!("=== {} ===", title);
}

fn print_table(preview: &TablePreview) {
    let mut widths: Vec<usize> = preview.headers.iter().map(|h| h.len()).collect();
    for row in &preview.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>width$}", c, width = w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(&preview.headers));
    for row in &preview.rows {
        println!("{}", line(row));
    }
}

fn print_info(info: &[ColumnInfo]) {
    for (i, column) in info.iter().enumerate() {
        println!(
            "{:>3}  {:<30} {:>10} non-null  {}",
            i, column.name, column.non_null, column.kind
        );
    }
}

fn print_cleaning(report: &CleaningReport) {
    section("Cleaning");
    println!(
        "Rows before deduplication: {}, after: {} ({} removed)",
        report.rows_before,
        report.rows_after,
        report.duplicates_removed()
    );
    if let Some(unparsed) = report.unparsed_dates {
        println!("Unparseable dates set to missing: {}", unparsed);
    }

    println!("Missing values before imputation:");
    for (name, nulls) in &report.nulls_before_impute {
        println!("  {:<30} {}", name, nulls);
    }
    for fill in &report.fills {
        match &fill.value {
            FillValue::Mean(mean) => println!(
                "Filled {} values in '{}' with mean {:.4}",
                fill.filled, fill.column, mean
            ),
            FillValue::Mode(mode) => println!(
                "Filled {} values in '{}' with mode '{}'",
                fill.filled, fill.column, mode
            ),
        }
    }
    println!("Missing values after imputation:");
    for (name, nulls) in &report.nulls_after_impute {
        println!("  {:<30} {}", name, nulls);
    }
    for skipped in &report.skipped {
        println!("Skipped {}: {}", skipped.step, skipped.reason);
    }
}

fn print_outliers(outliers: &[OutlierSummary]) {
    section("Outliers (|z| > threshold)");
    for o in outliers {
        println!("  {:<30} {}", o.column, o.outliers);
    }
}

fn print_summary(summary: &[(String, ColumnSummary)]) {
    section("Descriptive statistics");
    for (name, column) in summary {
        match column {
            ColumnSummary::Numeric(s) => println!(
                "{}: count={} mean={:.4} std={:.4} min={:.4} 25%={:.4} 50%={:.4} 75%={:.4} max={:.4}",
                name, s.count, s.mean, s.std, s.min, s.p25, s.median, s.p75, s.max
            ),
            ColumnSummary::Text(s) => println!(
                "{}: count={} unique={} top={} freq={}",
                name,
                s.count,
                s.unique,
                s.top.as_deref().unwrap_or("NaN"),
                s.freq
            ),
            ColumnSummary::DateTime(s) => println!(
                "{}: count={} first={} last={}",
                name,
                s.count,
                s.first.as_deref().unwrap_or("NaT"),
                s.last.as_deref().unwrap_or("NaT")
            ),
        }
    }
}

fn print_growth(growth: &[YearGrowth]) {
    println!("Annual growth (%):");
    for g in growth.iter().filter(|g| g.is_defined()) {
        println!("  {}  {:>10.2}", g.year, g.percent);
    }
    let undefined: Vec<String> = growth
        .iter()
        .filter(|g| !g.is_defined())
        .map(|g| format!("{} (after zero incidents in {})", g.year, g.previous_year))
        .collect();
    if !undefined.is_empty() {
        println!("  Growth undefined for: {}", undefined.join(", "));
    }
}

fn print_charts(charts: &[ChartData]) {
    section("Prepared charts");
    for chart in charts {
        let kind = match chart.kind {
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal bar",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Heatmap => "heatmap",
        };
        match &chart.series {
            ChartSeries::Density(h) => println!(
                "  [{}] {} ({} occupied cells, {} points, {}x{} bins, peak {})",
                kind,
                chart.title,
                chart.mark_count(),
                h.total(),
                h.bins,
                h.bins,
                h.max_count()
            ),
            _ => println!("  [{}] {} ({} marks)", kind, chart.title, chart.mark_count()),
        }
    }
}
