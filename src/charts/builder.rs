//! Chart Builder Module
//! Assembles the fixed chart sequence from the cleaned dataset and the sample.
//! Each chart is skipped, with a warning, when a column it needs is absent.

use super::data::{ChartData, ChartKind, ChartSeries};
use crate::data::{display_values, AnalysisError, Dataset};
use crate::settings::AnalysisSettings;
use crate::stats::{weekday_name, Aggregator, FrequencyEntry, Histogram2d};

pub struct ChartBuilder<'a> {
    settings: &'a AnalysisSettings,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(settings: &'a AnalysisSettings) -> Self {
        Self { settings }
    }

    /// Build every chart whose inputs are available, in display order.
    pub fn build(&self, dataset: &Dataset, sample: Option<&Dataset>) -> Vec<ChartData> {
        let mut charts = Vec::new();

        Self::collect(&mut charts, "incidents per year", self.incidents_per_year(dataset));
        Self::collect(&mut charts, "top causes", self.top_causes(dataset));
        Self::collect(&mut charts, "top states", self.top_states(dataset));
        Self::collect(&mut charts, "size classes", self.size_classes(dataset));
        Self::collect(&mut charts, "largest fires", self.largest_fires(dataset));
        Self::collect(
            &mut charts,
            "largest fires by cause",
            self.largest_fires_with_cause(dataset),
        );
        Self::collect(&mut charts, "annual growth", self.annual_growth(dataset));

        match sample {
            Some(sample) => {
                Self::collect(&mut charts, "geographic scatter", self.geo_scatter(sample));
                Self::collect(&mut charts, "geographic heatmap", self.geo_heatmap(sample));
            }
            None => log::info!("No sample drawn; geographic charts omitted"),
        }

        Self::collect(&mut charts, "incidents per weekday", self.incidents_per_weekday(dataset));
        charts
    }

    fn collect(
        charts: &mut Vec<ChartData>,
        chart: &str,
        result: Result<Vec<ChartData>, AnalysisError>,
    ) {
        match result {
            Ok(built) => charts.extend(built),
            Err(e) => log::warn!("Skipping {} chart: {}", chart, e),
        }
    }

    fn incidents_per_year(&self, dataset: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let counts = Aggregator::counts_by_year(dataset, &self.settings.columns.year)?;
        Ok(vec![ChartData::categories(
            ChartKind::Bar,
            "Fire Occurrences per Year",
            "Year",
            "Number of Fires",
            counts
                .into_iter()
                .map(|(year, count)| (year.to_string(), count as f64))
                .collect(),
        )])
    }

    fn top_causes(&self, dataset: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let n = self.settings.top_causes;
        let ranking = Aggregator::frequency_ranking(
            dataset,
            &self.settings.columns.cause,
            Some(n),
        )?;
        let pie = ChartData::pie(
            &format!("Top {} Fire Causes (Share)", n),
            ranking.iter().map(|e| (e.label.clone(), e.count)).collect(),
        );
        let bar = ChartData::categories(
            ChartKind::HorizontalBar,
            &format!("Top {} Fire Causes (Count)", n),
            "Number of Fires",
            "Cause",
            frequency_series(ranking),
        );
        Ok(vec![pie, bar])
    }

    fn top_states(&self, dataset: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let n = self.settings.top_states;
        let ranking = Aggregator::frequency_ranking(
            dataset,
            &self.settings.columns.state,
            Some(n),
        )?;
        Ok(vec![ChartData::categories(
            ChartKind::HorizontalBar,
            &format!("Top {} States by Fire Occurrences", n),
            "Number of Fires",
            "State",
            frequency_series(ranking),
        )])
    }

    fn size_classes(&self, dataset: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let ranking =
            Aggregator::frequency_ranking(dataset, &self.settings.columns.size_class, None)?;
        Ok(vec![ChartData::categories(
            ChartKind::Bar,
            "Fires by Size Class",
            "Size Class",
            "Number of Fires",
            frequency_series(ranking),
        )])
    }

    fn largest_fires(&self, dataset: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let columns = &self.settings.columns;
        let top = Aggregator::top_k_by(dataset, &columns.size, self.settings.top_fires)?;
        Ok(vec![self.sized_fire_chart(
            &top,
            &format!("Top {} Largest Fires by Size (Acres)", self.settings.top_fires),
        )?])
    }

    fn largest_fires_with_cause(
        &self,
        dataset: &Dataset,
    ) -> Result<Vec<ChartData>, AnalysisError> {
        let columns = &self.settings.columns;
        let subset =
            Aggregator::filter_equals(dataset, &columns.cause, &self.settings.focus_cause)?;
        let top = Aggregator::top_k_by(&subset, &columns.size, self.settings.top_fires)?;
        Ok(vec![self.sized_fire_chart(
            &top,
            &format!(
                "Top {} Largest {}-Caused Fires by Size (Acres)",
                self.settings.top_fires, self.settings.focus_cause
            ),
        )?])
    }

    /// Horizontal bars of fire size labelled by fire name, in row order.
    fn sized_fire_chart(&self, top: &Dataset, title: &str) -> Result<ChartData, AnalysisError> {
        let columns = &self.settings.columns;
        let sizes = top.numeric(&columns.size)?;
        let names = display_values(top.column(&columns.name)?)?;
        let bars = sizes
            .into_iter()
            .zip(names)
            .filter_map(|(size, name)| {
                Some((name.unwrap_or_else(|| "NaN".to_string()), size?))
            })
            .collect();
        Ok(ChartData::categories(
            ChartKind::HorizontalBar,
            title,
            "Fire Size (Acres)",
            "Fire Name",
            bars,
        ))
    }

    fn annual_growth(&self, dataset: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let counts = Aggregator::counts_by_year(dataset, &self.settings.columns.year)?;
        let growth = Aggregator::year_over_year_growth(&counts);
        let bars = growth
            .iter()
            .filter(|g| g.is_defined())
            .map(|g| (g.year.to_string(), g.percent))
            .collect();
        Ok(vec![ChartData::categories(
            ChartKind::Bar,
            "Annual Fire Growth (%)",
            "Year",
            "Growth (%)",
            bars,
        )])
    }

    /// `[longitude, latitude]` of every sampled row with both present.
    fn coordinates(&self, sample: &Dataset) -> Result<Vec<[f64; 2]>, AnalysisError> {
        let columns = &self.settings.columns;
        let lon = sample.numeric(&columns.longitude)?;
        let lat = sample.numeric(&columns.latitude)?;
        Ok(lon
            .into_iter()
            .zip(lat)
            .filter_map(|(x, y)| Some([x?, y?]))
            .collect())
    }

    fn geo_scatter(&self, sample: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let points = self.coordinates(sample)?;
        Ok(vec![ChartData {
            title: "Geographic Distribution of Fires (Sample)".into(),
            x_label: "Longitude".into(),
            y_label: "Latitude".into(),
            kind: ChartKind::Scatter,
            series: ChartSeries::Points(points),
        }])
    }

    fn geo_heatmap(&self, sample: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let points = self.coordinates(sample)?;
        let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
        let Some(density) = Histogram2d::compute(&xs, &ys, self.settings.heatmap_bins) else {
            log::warn!("Sample has no coordinates; heatmap omitted");
            return Ok(Vec::new());
        };
        Ok(vec![ChartData {
            title: "Fire Density Heatmap (Sample)".into(),
            x_label: "Longitude".into(),
            y_label: "Latitude".into(),
            kind: ChartKind::Heatmap,
            series: ChartSeries::Density(density),
        }])
    }

    fn incidents_per_weekday(&self, dataset: &Dataset) -> Result<Vec<ChartData>, AnalysisError> {
        let counts = Aggregator::weekday_counts(dataset, &self.settings.columns.date)?;
        Ok(vec![ChartData::categories(
            ChartKind::Bar,
            "Fire Occurrences by Day of Week",
            "Day of Week",
            "Number of Fires",
            counts
                .into_iter()
                .map(|(day, count)| (weekday_name(day).to_string(), count as f64))
                .collect(),
        )])
    }
}

fn frequency_series(ranking: Vec<FrequencyEntry>) -> Vec<(String, f64)> {
    ranking
        .into_iter()
        .map(|e| (e.label, e.count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cleaner;
    use polars::df;

    fn settings() -> AnalysisSettings {
        AnalysisSettings {
            top_fires: 2,
            heatmap_bins: 4,
            ..Default::default()
        }
    }

    fn incidents() -> Dataset {
        let mut ds = Dataset::from_frame(
            df!(
                "FIRE_YEAR" => [2004.0, 2005.0, 2005.0],
                "FIRE_SIZE" => [10.0, 900.0, 55.0],
                "FIRE_NAME" => [Some("BEAR"), None, Some("ELK")],
                "NWCG_CAUSE_CLASSIFICATION" => ["Human", "Natural", "Human"],
                "LATITUDE" => [38.0, 40.0, 45.0],
                "LONGITUDE" => [-120.0, -110.0, -100.0]
            )
            .unwrap(),
        )
        .unwrap();
        Cleaner::new("DISCOVERY_DATE", "STATE").clean(&mut ds);
        ds
    }

    fn titles(charts: &[ChartData]) -> Vec<&str> {
        charts.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn absent_columns_skip_their_charts() {
        let settings = settings();
        let charts = ChartBuilder::new(&settings).build(&incidents(), None);
        assert_eq!(
            titles(&charts),
            vec![
                "Fire Occurrences per Year",
                "Top 5 Fire Causes (Share)",
                "Top 5 Fire Causes (Count)",
                "Top 2 Largest Fires by Size (Acres)",
                "Top 2 Largest Human-Caused Fires by Size (Acres)",
                "Annual Fire Growth (%)",
            ]
        );
    }

    #[test]
    fn largest_fires_are_labelled_by_name() {
        let settings = settings();
        let charts = ChartBuilder::new(&settings).build(&incidents(), None);
        // the missing name was filled with the mode ("BEAR" < "ELK")
        assert_eq!(
            charts[3].series,
            ChartSeries::Categories(vec![("BEAR".into(), 900.0), ("ELK".into(), 55.0)])
        );
        assert_eq!(
            charts[4].series,
            ChartSeries::Categories(vec![("ELK".into(), 55.0), ("BEAR".into(), 10.0)])
        );
    }

    #[test]
    fn sample_enables_geographic_charts() {
        let settings = settings();
        let ds = incidents();
        let sample = ds.take(&[2, 0]).unwrap();
        let charts = ChartBuilder::new(&settings).build(&ds, Some(&sample));
        let scatter = charts
            .iter()
            .find(|c| c.kind == ChartKind::Scatter)
            .unwrap();
        assert_eq!(
            scatter.series,
            ChartSeries::Points(vec![[-100.0, 45.0], [-120.0, 38.0]])
        );
        let heatmap = charts
            .iter()
            .find(|c| c.kind == ChartKind::Heatmap)
            .unwrap();
        assert_eq!(heatmap.mark_count(), 2);
    }
}
