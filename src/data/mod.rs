//! Data module - CSV loading and processing

mod loader;
mod processor;

pub use loader::DataLoader;
pub use processor::{CategoryCount, DataProcessor, INDICATOR_COLUMNS};

#[cfg(test)]
pub(crate) use loader::tests::write_csv;
#[cfg(test)]
pub(crate) use processor::tests::frame as test_frame;
