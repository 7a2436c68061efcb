//! Pipeline settings.
//! There is no command line; `main` runs with `PipelineConfig::default()`.

use crate::stats::QuantileMethod;
use std::path::PathBuf;

/// Input file read by the loader.
pub const INPUT_FILE: &str = "medical_examination.csv";
/// Categorical bar chart output.
pub const CATPLOT_FILE: &str = "catplot.png";
/// Correlation heat map output.
pub const HEATMAP_FILE: &str = "heatmap.png";

/// BMI above which a record counts as overweight.
pub const OVERWEIGHT_BMI: f64 = 25.0;

/// Quantile band applied to height and weight before correlating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileBounds {
    pub lower: f64,
    pub upper: f64,
    pub method: QuantileMethod,
}

/// The 2.5% and 97.5% quantiles, resolved to the lower neighbouring sample.
///
/// This is not pandas' default: `Series.quantile` interpolates linearly. The
/// lower sample keeps both bounds on observed values, so a band over three
/// records keeps the two smaller ones instead of only the middle one.
impl Default for QuantileBounds {
    fn default() -> Self {
        Self {
            lower: 0.025,
            upper: 0.975,
            method: QuantileMethod::Lower,
        }
    }
}

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub catplot_path: PathBuf,
    pub heatmap_path: PathBuf,
    pub overweight_bmi: f64,
    pub bounds: QuantileBounds,
    /// Pixel size of the whole faceted bar chart (both panels).
    pub catplot_size: (u32, u32),
    pub heatmap_size: (u32, u32),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(INPUT_FILE),
            catplot_path: PathBuf::from(CATPLOT_FILE),
            heatmap_path: PathBuf::from(HEATMAP_FILE),
            overweight_bmi: OVERWEIGHT_BMI,
            bounds: QuantileBounds::default(),
            catplot_size: (1000, 500),
            heatmap_size: (1200, 1000),
        }
    }
}
