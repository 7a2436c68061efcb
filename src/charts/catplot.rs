//! Categorical bar chart
//! Long-form indicator counts, one panel per `cardio` value.
//!
//! Layout:
//! 1. Panels side by side, ascending `cardio` (0 and 1 are always present)
//! 2. X axis: indicator names in lexical order, shared by all panels
//! 3. Within each name, one bar per value (0 then 1), coloured by value
//! 4. Shared Y axis: `total`

use super::{hue_color, render_err, slot_label, slot_range, Figure};
use crate::data::{CategoryCount, DataProcessor, INDICATOR_COLUMNS};
use crate::error::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::collections::BTreeSet;

/// Share of a unit slot taken by the bars of one indicator.
const GROUP_WIDTH: f64 = 0.8;

/// Facet values that always get a panel, even when unobserved.
const BASE_FACETS: [i64; 2] = [0, 1];

/// Counts belonging to one `cardio` facet.
#[derive(Debug, Clone, PartialEq)]
pub struct CatPanel {
    pub cardio: i64,
    pub counts: Vec<CategoryCount>,
}

impl CatPanel {
    #[cfg(test)]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.total).sum()
    }
}

/// Faceted bar chart of indicator counts.
#[derive(Debug, Clone)]
pub struct CatPlot {
    counts: Vec<CategoryCount>,
    variables: Vec<String>,
    hues: Vec<i64>,
    panels: Vec<CatPanel>,
    size: (u32, u32),
}

impl CatPlot {
    /// Melt the indicator columns of a derived frame and count them.
    pub fn from_frame(df: &DataFrame, size: (u32, u32)) -> Result<Self> {
        let melted = DataProcessor::melt(df, "cardio", &INDICATOR_COLUMNS)?;
        let counts = DataProcessor::count_groups(&melted, "cardio")?;
        log::info!(
            "Categorical aggregate: {} long rows, {} groups",
            melted.height(),
            counts.len()
        );
        Ok(Self::from_counts(counts, size))
    }

    pub fn from_counts(counts: Vec<CategoryCount>, size: (u32, u32)) -> Self {
        let variables: Vec<String> = INDICATOR_COLUMNS
            .iter()
            .map(|v| v.to_string())
            .chain(counts.iter().map(|c| c.variable.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let hues: Vec<i64> = BASE_FACETS
            .iter()
            .copied()
            .chain(counts.iter().map(|c| c.value))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let panels = BASE_FACETS
            .iter()
            .copied()
            .chain(counts.iter().map(|c| c.cardio))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|cardio| CatPanel {
                cardio,
                counts: counts
                    .iter()
                    .filter(|c| c.cardio == cardio)
                    .cloned()
                    .collect(),
            })
            .collect();

        Self {
            counts,
            variables,
            hues,
            panels,
            size,
        }
    }

    /// The grouped table, ordered by cardio, variable, value.
    pub fn counts(&self) -> &[CategoryCount] {
        &self.counts
    }

    #[cfg(test)]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    #[cfg(test)]
    pub fn hues(&self) -> &[i64] {
        &self.hues
    }

    #[cfg(test)]
    pub fn panels(&self) -> &[CatPanel] {
        &self.panels
    }

    /// Upper bound of the shared Y axis.
    pub fn y_max(&self) -> f64 {
        let tallest = self.counts.iter().map(|c| c.total).max().unwrap_or(0);
        (tallest as f64 * 1.05).max(1.0)
    }

    /// Horizontal extent of a bar in X-axis units. Slot `i` is centred on `i`.
    pub fn bar_span(variable_index: usize, hue_index: usize, hue_count: usize) -> (f64, f64) {
        let width = GROUP_WIDTH / hue_count.max(1) as f64;
        let start = variable_index as f64 - GROUP_WIDTH / 2.0 + hue_index as f64 * width;
        (start, start + width)
    }

    /// Bars of one hue in a panel as `(x0, x1, height)`.
    pub fn bars(&self, panel: &CatPanel, hue_index: usize) -> Vec<(f64, f64, f64)> {
        let Some(&hue) = self.hues.get(hue_index) else {
            return Vec::new();
        };
        panel
            .counts
            .iter()
            .filter(|c| c.value == hue)
            .filter_map(|c| {
                let variable_index = self.variables.iter().position(|v| *v == c.variable)?;
                let (x0, x1) = Self::bar_span(variable_index, hue_index, self.hues.len());
                Some((x0, x1, c.total as f64))
            })
            .collect()
    }

    fn draw_panel(
        &self,
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        panel: &CatPanel,
    ) -> Result<()> {
        let slots = self.variables.len();

        let mut chart = ChartBuilder::on(area)
            .caption(format!("cardio = {}", panel.cardio), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(slot_range(slots), 0f64..self.y_max())
            .map_err(render_err)?;

        let x_labels = |x: &f64| slot_label(&self.variables, *x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots)
            .x_label_formatter(&x_labels)
            .x_desc("variable")
            .y_desc("total")
            .draw()
            .map_err(render_err)?;

        for (hue_index, hue) in self.hues.iter().enumerate() {
            let color = hue_color(hue_index);
            let bars = self.bars(panel, hue_index);
            chart
                .draw_series(
                    bars.into_iter()
                        .map(|(x0, x1, total)| Rectangle::new([(x0, 0.0), (x1, total)], color.filled())),
                )
                .map_err(render_err)?
                .label(format!("value = {hue}"))
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;
        Ok(())
    }
}

impl Figure for CatPlot {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()> {
        let areas = root.split_evenly((1, self.panels.len()));
        for (area, panel) in areas.iter().zip(&self.panels) {
            self.draw_panel(area, panel)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_frame as frame;

    fn count(cardio: i64, variable: &str, value: i64, total: usize) -> CategoryCount {
        CategoryCount {
            cardio,
            variable: variable.to_string(),
            value,
            total,
        }
    }

    #[test]
    fn test_panels_are_ascending_and_always_two() {
        let plot = CatPlot::from_counts(vec![count(1, "smoke", 0, 4)], (1000, 500));
        let facets: Vec<i64> = plot.panels().iter().map(|p| p.cardio).collect();
        assert_eq!(facets, vec![0, 1]);
        assert!(plot.panels()[0].counts.is_empty());
        assert_eq!(plot.panels()[1].total(), 4);
        assert_eq!(plot.hues(), &[0i64, 1]);
    }

    #[test]
    fn test_variables_are_lexical() {
        let plot = CatPlot::from_counts(Vec::new(), (1000, 500));
        assert_eq!(
            plot.variables(),
            &["active", "alco", "cholesterol", "gluc", "overweight", "smoke"]
        );
    }

    #[test]
    fn test_bar_span_splits_group_evenly() {
        let (a0, a1) = CatPlot::bar_span(0, 0, 2);
        let (b0, b1) = CatPlot::bar_span(0, 1, 2);
        assert!((a0 + 0.4).abs() < 1e-12);
        assert!(a1.abs() < 1e-12);
        assert!(b0.abs() < 1e-12);
        assert!((b1 - 0.4).abs() < 1e-12);

        let (c0, c1) = CatPlot::bar_span(3, 0, 2);
        assert!((c0 - 2.6).abs() < 1e-12);
        assert!((c1 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_bars_follow_variable_and_hue() {
        let plot = CatPlot::from_counts(
            vec![count(0, "smoke", 0, 7), count(0, "smoke", 1, 2), count(0, "active", 1, 9)],
            (1000, 500),
        );
        let panel = &plot.panels()[0];

        let zeros = plot.bars(panel, 0);
        assert_eq!(zeros.len(), 1);
        // `smoke` is the sixth name lexically.
        assert!((zeros[0].0 - 4.6).abs() < 1e-12);
        assert_eq!(zeros[0].2, 7.0);

        let ones = plot.bars(panel, 1);
        assert_eq!(ones.len(), 2);
        assert!(plot.bars(panel, 5).is_empty());
        assert!((plot.y_max() - 9.45).abs() < 1e-9);
    }

    #[test]
    fn test_from_frame_totals_per_facet() {
        let df = frame(&[
            (170.0, 90.0, 120.0, 80.0, 1.0, 1.0, 0.0),
            (160.0, 50.0, 120.0, 80.0, 3.0, 2.0, 1.0),
            (175.0, 70.0, 130.0, 85.0, 2.0, 1.0, 1.0),
        ]);
        let derived = DataProcessor::derive_features(&df, 25.0).unwrap();
        let plot = CatPlot::from_frame(&derived, (1000, 500)).unwrap();

        assert_eq!(plot.panels()[0].total(), 6);
        assert_eq!(plot.panels()[1].total(), 12);
        assert_eq!(plot.size(), (1000, 500));
    }

    #[test]
    fn test_from_frame_without_derivation_fails() {
        let df = frame(&[(170.0, 90.0, 120.0, 80.0, 1.0, 1.0, 0.0)]);
        assert!(CatPlot::from_frame(&df, (1000, 500)).is_err());
    }

    #[test]
    fn test_empty_frame_gives_empty_panels() {
        let derived = DataProcessor::derive_features(&frame(&[]), 25.0).unwrap();
        let plot = CatPlot::from_frame(&derived, (1000, 500)).unwrap();
        assert!(plot.counts().is_empty());
        assert_eq!(plot.panels().len(), 2);
        assert_eq!(plot.y_max(), 1.0);
    }
}
