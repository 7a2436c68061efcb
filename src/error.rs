//! Error types shared by every pipeline stage.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the visualization pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A file could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not a well-formed table of numbers.
    #[error("Malformed input: {0}")]
    Format(String),

    /// A required column is absent from the input header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A statistical step received data it cannot work with.
    #[error("Data error: {0}")]
    Data(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Drawing or encoding a figure failed.
    #[error("Render error: {0}")]
    Render(String),
}

impl PipelineError {
    /// True for the input-shape failures (bad header, mistyped values).
    #[cfg(test)]
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_) | Self::MissingColumn(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
