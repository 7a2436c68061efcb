//! Medical Viz - medical examination data visualizer
//!
//! Reads `medical_examination.csv` from the working directory and writes
//! `catplot.png` (indicator counts by cardio) and `heatmap.png` (masked
//! correlation heat map) next to it.

mod charts;
mod config;
mod data;
mod error;
mod pipeline;
mod stats;

use anyhow::Context;
use config::PipelineConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::default();
    let summary = pipeline::run(&config).with_context(|| {
        format!(
            "failed to visualize {}",
            config.input_path.display()
        )
    })?;

    log::info!(
        "Done: {} input rows in {} groups, {} rows x {} columns in heat map, wrote {}",
        summary.input_rows,
        summary.groups,
        summary.heatmap_rows,
        summary.heatmap_columns,
        summary
            .outputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
