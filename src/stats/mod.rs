//! Stats module - quantiles and correlation

mod calculator;

pub use calculator::{CorrelationMatrix, QuantileMethod, StatsCalculator};
