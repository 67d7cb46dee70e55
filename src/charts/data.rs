//! Chart datasets handed to a plotting backend.

use crate::stats::Histogram2d;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Pie,
    Scatter,
    Heatmap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Share of the displayed slices, 0-100
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    Categories(Vec<(String, f64)>),
    Slices(Vec<PieSlice>),
    /// `[x, y]` pairs
    Points(Vec<[f64; 2]>),
    Density(Histogram2d),
}

/// Chart data for a single figure
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub series: ChartSeries,
}

impl ChartData {
    pub fn categories(
        kind: ChartKind,
        title: &str,
        x_label: &str,
        y_label: &str,
        values: Vec<(String, f64)>,
    ) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            kind,
            series: ChartSeries::Categories(values),
        }
    }

    /// Pie chart whose percentages are relative to the given slices only.
    pub fn pie(title: &str, counts: Vec<(String, usize)>) -> Self {
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        let slices = counts
            .into_iter()
            .map(|(label, count)| PieSlice {
                label,
                count,
                percent: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                },
            })
            .collect();
        Self {
            title: title.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            kind: ChartKind::Pie,
            series: ChartSeries::Slices(slices),
        }
    }

    /// Number of marks (bars, slices, points or occupied cells).
    pub fn mark_count(&self) -> usize {
        match &self.series {
            ChartSeries::Categories(v) => v.len(),
            ChartSeries::Slices(v) => v.len(),
            ChartSeries::Points(v) => v.len(),
            ChartSeries::Density(h) => h.counts.iter().flatten().filter(|&&c| c > 0).count(),
        }
    }
}
