//! Pipeline Driver
//! Load, derive, and write both figures. Every stage receives the frame it
//! works on; nothing is shared between runs.

use crate::charts::{CatPlot, Figure, Heatmap};
use crate::config::PipelineConfig;
use crate::data::{DataLoader, DataProcessor};
use crate::error::Result;
use polars::prelude::DataFrame;
use std::path::PathBuf;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub input_rows: usize,
    /// `(cardio, variable, value)` groups in the bar chart.
    pub groups: usize,
    pub heatmap_rows: usize,
    pub heatmap_columns: usize,
    pub outputs: Vec<PathBuf>,
}

/// Build the categorical chart and the heat map from a derived frame
/// without writing anything.
pub fn build_figures(config: &PipelineConfig, derived: &DataFrame) -> Result<(CatPlot, Heatmap)> {
    let catplot = CatPlot::from_frame(derived, config.catplot_size)?;
    let heatmap = Heatmap::from_frame(derived, &config.bounds, config.heatmap_size)?;
    Ok((catplot, heatmap))
}

/// Run the whole batch once: load, derive, build both figures, then write
/// them. Nothing is written unless both figures could be built.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let df = DataLoader::load_csv(&config.input_path)?;
    let derived = DataProcessor::derive_features(&df, config.overweight_bmi)?;

    let (catplot, heatmap) = build_figures(config, &derived)?;
    catplot.save(&config.catplot_path)?;
    heatmap.save(&config.heatmap_path)?;

    Ok(RunSummary {
        input_rows: df.height(),
        groups: catplot.counts().len(),
        heatmap_rows: heatmap.retained_rows(),
        heatmap_columns: heatmap.matrix().len(),
        outputs: vec![config.catplot_path.clone(), config.heatmap_path.clone()],
    })
}
