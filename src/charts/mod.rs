//! Charts module - static figure rendering
//!
//! Figures hold the numbers and the visual encoding. Rasterizing and PNG
//! encoding happen only when the driver asks for them through [`Figure`].

mod catplot;
mod heatmap;
mod palette;

pub use catplot::CatPlot;
pub use heatmap::Heatmap;
pub use palette::{diverging_color, hue_color};

use crate::error::{PipelineError, Result};
use image::{ImageError, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// A figure that can be drawn onto an RGB bitmap.
pub trait Figure {
    /// Output size in pixels.
    fn size(&self) -> (u32, u32);

    /// Draw onto an already-filled drawing area.
    fn draw(&self, root: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>;

    /// Rasterize into an in-memory image.
    fn to_image(&self) -> Result<RgbImage> {
        let (width, height) = self.size();
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            self.draw(&root)?;
            root.present().map_err(render_err)?;
        }
        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| PipelineError::Render("pixel buffer size mismatch".to_string()))
    }

    /// Rasterize and write a PNG, replacing any existing file.
    fn save(&self, path: &Path) -> Result<()> {
        let image = self.to_image()?;
        image.save(path).map_err(|e| match e {
            ImageError::IoError(source) => PipelineError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => PipelineError::Render(other.to_string()),
        })?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}

pub(crate) fn render_err(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Render(e.to_string())
}

/// Axis range for `count` unit slots centred on `0..count`.
///
/// Slot `i` spans `i - 0.5..i + 0.5`, so with `count` labels requested the
/// mesh puts its key points exactly on the slot centres.
pub(crate) fn slot_range(count: usize) -> Range<f64> {
    -0.5..count as f64 - 0.5
}

/// Label of the slot centred at `position`; empty between slots.
pub(crate) fn slot_label(labels: &[String], position: f64) -> String {
    let index = position.round();
    if index < 0.0 || (position - index).abs() > 1e-6 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}
