//! Correlation heat map
//! Lower-triangular Pearson coefficients of the plausible records.
//!
//! Layout:
//! 1. Square grid, columns left to right and rows top to bottom in frame order
//! 2. Upper triangle and diagonal left blank
//! 3. Each visible cell filled on a blue-white-red scale centred at 0 and
//!    annotated with its value to one decimal
//! 4. Colour bar on the right spanning the visible value range

use super::palette::luminance;
use super::{diverging_color, render_err, slot_label, slot_range, Figure};
use crate::config::QuantileBounds;
use crate::data::DataProcessor;
use crate::error::Result;
use crate::stats::{CorrelationMatrix, StatsCalculator};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::DataFrame;

const COLORBAR_WIDTH: u32 = 140;
const COLORBAR_STEPS: usize = 100;

/// Maps values to a diverging colour around a fixed centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
    pub center: f64,
}

impl ColorScale {
    /// Fit bounds to the finite values. Falls back to `[-1, 1]`.
    pub fn fit(values: impl IntoIterator<Item = f64>, center: f64) -> Self {
        let (vmin, vmax) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if vmin > vmax {
            return Self {
                vmin: -1.0,
                vmax: 1.0,
                center,
            };
        }
        Self { vmin, vmax, center }
    }

    /// Position on the colour map in `[0, 1]`; the centre sits at 0.5.
    ///
    /// The map is stretched symmetrically by the larger distance from the
    /// centre, so the side with the smaller reach never uses full saturation.
    pub fn position(&self, value: f64) -> f64 {
        let span = (self.vmax - self.center).max(self.center - self.vmin);
        if !(span > 0.0) {
            return 0.5;
        }
        (0.5 + (value - self.center) / (2.0 * span)).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> RGBColor {
        diverging_color(self.position(value))
    }
}

/// Masked correlation heat map.
#[derive(Debug, Clone)]
pub struct Heatmap {
    matrix: CorrelationMatrix,
    mask: Vec<Vec<bool>>,
    scale: ColorScale,
    retained_rows: usize,
    size: (u32, u32),
}

impl Heatmap {
    /// Filter the derived frame, correlate what remains and mask it.
    pub fn from_frame(df: &DataFrame, bounds: &QuantileBounds, size: (u32, u32)) -> Result<Self> {
        let filtered = DataProcessor::filter_plausible(df, bounds)?;
        let matrix = StatsCalculator::correlation_matrix(&filtered)?;
        Ok(Self::from_matrix(matrix, filtered.height(), size))
    }

    pub fn from_matrix(matrix: CorrelationMatrix, retained_rows: usize, size: (u32, u32)) -> Self {
        let mask = StatsCalculator::upper_triangle_mask(matrix.len());
        let visible = Self::cells(&matrix, &mask);
        let scale = ColorScale::fit(visible.iter().map(|&(_, _, v)| v), 0.0);
        Self {
            matrix,
            mask,
            scale,
            retained_rows,
            size,
        }
    }

    pub fn matrix(&self) -> &CorrelationMatrix {
        &self.matrix
    }

    #[cfg(test)]
    pub fn scale(&self) -> ColorScale {
        self.scale
    }

    /// Records that survived the plausibility filter.
    pub fn retained_rows(&self) -> usize {
        self.retained_rows
    }

    /// Unmasked cells with a finite value, as `(row, col, value)`.
    pub fn visible_cells(&self) -> Vec<(usize, usize, f64)> {
        Self::cells(&self.matrix, &self.mask)
    }

    fn cells(matrix: &CorrelationMatrix, mask: &[Vec<bool>]) -> Vec<(usize, usize, f64)> {
        let n = matrix.len();
        (0..n)
            .flat_map(|row| (0..n).map(move |col| (row, col)))
            .filter(|&(row, col)| !mask[row][col])
            .map(|(row, col)| (row, col, matrix.get(row, col)))
            .filter(|(_, _, v)| v.is_finite())
            .collect()
    }

    /// Plot coordinates of a cell centre; row 0 sits at the top.
    fn cell_center(n: usize, row: usize, col: usize) -> (f64, f64) {
        (col as f64, (n - 1 - row) as f64)
    }

    /// Cell annotation text.
    pub fn annotation(value: f64) -> String {
        format!("{:.1}", value)
    }

    fn draw_cells(&self, area: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()> {
        let n = self.matrix.len();
        let names = self.matrix.names();
        // Row 0 is drawn at the top, so the Y labels run in reverse.
        let reversed: Vec<String> = names.iter().rev().cloned().collect();

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(120)
            .y_label_area_size(120)
            .build_cartesian_2d(slot_range(n), slot_range(n))
            .map_err(render_err)?;

        let x_labels = |x: &f64| slot_label(names, *x);
        let y_labels = |y: &f64| slot_label(&reversed, *y);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&x_labels)
            .y_label_formatter(&y_labels)
            .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
            .y_label_style(("sans-serif", 14))
            .draw()
            .map_err(render_err)?;

        let cells = self.visible_cells();
        chart
            .draw_series(cells.iter().map(|&(row, col, value)| {
                let (x, y) = Self::cell_center(n, row, col);
                Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    self.scale.color(value).filled(),
                )
            }))
            .map_err(render_err)?;

        let centered = Pos::new(HPos::Center, VPos::Center);
        chart
            .draw_series(cells.iter().map(|&(row, col, value)| {
                let ink = if luminance(self.scale.color(value)) < 0.5 {
                    WHITE
                } else {
                    BLACK
                };
                Text::new(
                    Self::annotation(value),
                    Self::cell_center(n, row, col),
                    ("sans-serif", 16).into_font().color(&ink).pos(centered),
                )
            }))
            .map_err(render_err)?;
        Ok(())
    }

    fn draw_colorbar(&self, area: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()> {
        let ColorScale { vmin, vmax, .. } = self.scale;
        let (lo, hi) = if vmax > vmin {
            (vmin, vmax)
        } else {
            (vmin - 0.5, vmax + 0.5)
        };

        let mut chart = ChartBuilder::on(area)
            .margin_top(20)
            .margin_bottom(140)
            .margin_right(10)
            .right_y_label_area_size(60)
            .build_cartesian_2d(0f64..1f64, lo..hi)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(8)
            .y_label_style(("sans-serif", 14))
            .y_label_formatter(&|v: &f64| format!("{:.1}", v))
            .draw()
            .map_err(render_err)?;

        let step = (hi - lo) / COLORBAR_STEPS as f64;
        chart
            .draw_series((0..COLORBAR_STEPS).map(|k| {
                let from = lo + step * k as f64;
                Rectangle::new(
                    [(0.0, from), (1.0, from + step)],
                    self.scale.color(from + step / 2.0).filled(),
                )
            }))
            .map_err(render_err)?;
        Ok(())
    }
}

impl Figure for Heatmap {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()> {
        let split = self.size.0.saturating_sub(COLORBAR_WIDTH) as i32;
        let (cells_area, colorbar_area) = root.split_horizontally(split);
        self.draw_cells(&cells_area)?;
        self.draw_colorbar(&colorbar_area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_frame as frame;
    use crate::error::PipelineError;

    const TOLERANCE: f64 = 1e-9;

    fn derived_sample() -> DataFrame {
        let df = frame(&[
            (168.0, 62.0, 110.0, 80.0, 1.0, 1.0, 0.0),
            (156.0, 85.0, 140.0, 90.0, 3.0, 1.0, 1.0),
            (165.0, 64.0, 130.0, 70.0, 3.0, 1.0, 1.0),
            (169.0, 82.0, 150.0, 100.0, 1.0, 1.0, 1.0),
            (156.0, 56.0, 100.0, 60.0, 1.0, 1.0, 0.0),
            (151.0, 67.0, 120.0, 80.0, 2.0, 2.0, 0.0),
            (157.0, 93.0, 130.0, 80.0, 3.0, 1.0, 0.0),
            (178.0, 95.0, 130.0, 90.0, 3.0, 3.0, 1.0),
            (163.0, 71.0, 80.0, 110.0, 1.0, 1.0, 0.0),
            (174.0, 77.0, 125.0, 85.0, 2.0, 1.0, 1.0),
        ]);
        DataProcessor::derive_features(&df, 25.0).unwrap()
    }

    // ── ColorScale ────────────────────────────────────────────────────────────

    #[test]
    fn test_scale_centres_on_zero() {
        let scale = ColorScale::fit([-0.2, 0.1, 0.6], 0.0);
        assert_eq!((scale.vmin, scale.vmax), (-0.2, 0.6));
        assert_eq!(scale.position(0.0), 0.5);
        assert!((scale.position(0.6) - 1.0).abs() < TOLERANCE);
        // The negative side only reaches a third of the way down.
        assert!((scale.position(-0.2) - (0.5 - 0.2 / 1.2)).abs() < TOLERANCE);
    }

    #[test]
    fn test_scale_fallback_and_degenerate() {
        let empty = ColorScale::fit(std::iter::empty(), 0.0);
        assert_eq!((empty.vmin, empty.vmax), (-1.0, 1.0));

        let flat = ColorScale::fit([0.0, f64::NAN], 0.0);
        assert_eq!(flat.position(0.0), 0.5);
        assert_eq!(flat.color(0.0), diverging_color(0.5));
    }

    // ── Heatmap ───────────────────────────────────────────────────────────────

    #[test]
    fn test_heatmap_matrix_invariants() {
        let derived = derived_sample();
        let heatmap = Heatmap::from_frame(&derived, &QuantileBounds::default(), (1200, 1000)).unwrap();
        let matrix = heatmap.matrix();

        assert!(heatmap.retained_rows() <= derived.height());
        assert_eq!(matrix.len(), derived.width());
        assert_eq!(matrix.names().last().map(String::as_str), Some("overweight"));
        for i in 0..matrix.len() {
            let diagonal = matrix.get(i, i);
            assert!(diagonal.is_nan() || (diagonal - 1.0).abs() < TOLERANCE);
            for j in 0..matrix.len() {
                let (a, b) = (matrix.get(i, j), matrix.get(j, i));
                assert!((a.is_nan() && b.is_nan()) || (a - b).abs() < TOLERANCE);
            }
        }
    }

    #[test]
    fn test_heatmap_shows_only_lower_triangle() {
        let heatmap = Heatmap::from_frame(&derived_sample(), &QuantileBounds::default(), (1200, 1000)).unwrap();
        let cells = heatmap.visible_cells();

        assert!(!cells.is_empty());
        assert!(cells.iter().all(|&(row, col, _)| col < row));
        assert!(cells.iter().all(|&(_, _, v)| (-1.0..=1.0).contains(&v)));
        let scale = heatmap.scale();
        assert!(cells.iter().all(|&(_, _, v)| scale.vmin <= v && v <= scale.vmax));
    }

    #[test]
    fn test_heatmap_empty_input_is_data_error() {
        let derived = DataProcessor::derive_features(&frame(&[]), 25.0).unwrap();
        let err = Heatmap::from_frame(&derived, &QuantileBounds::default(), (1200, 1000)).unwrap_err();
        assert!(matches!(err, PipelineError::Data(_)));
    }

    #[test]
    fn test_cell_centres_put_first_row_on_top() {
        assert_eq!(Heatmap::cell_center(3, 0, 0), (0.0, 2.0));
        assert_eq!(Heatmap::cell_center(3, 2, 1), (1.0, 0.0));
    }

    #[test]
    fn test_annotation_rounds_to_one_decimal() {
        assert_eq!(Heatmap::annotation(0.26), "0.3");
        assert_eq!(Heatmap::annotation(-0.74), "-0.7");
        assert_eq!(Heatmap::annotation(1.0), "1.0");
    }
}
