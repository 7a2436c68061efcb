//! Data Processor Module
//! Feature derivation, wide-to-long reshaping, group counts and the
//! plausibility filter that runs before correlating.

use crate::config::QuantileBounds;
use crate::data::DataLoader;
use crate::error::{PipelineError, Result};
use crate::stats::StatsCalculator;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Indicator columns reshaped for the categorical chart, in melt order.
pub const INDICATOR_COLUMNS: [&str; 6] = [
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    "overweight",
];

/// One row of the grouped long-form table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub cardio: i64,
    pub variable: String,
    pub value: i64,
    pub total: usize,
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Add `overweight` and binarize `cholesterol` and `gluc`.
    ///
    /// BMI is computed on the fly and never stored. A zero height is not
    /// guarded: the ratio becomes infinite (overweight) or NaN (not
    /// overweight). Null inputs compare false and map to 0.
    pub fn derive_features(df: &DataFrame, bmi_threshold: f64) -> Result<DataFrame> {
        let heights = DataLoader::column_values(df, "height")?;
        let weights = DataLoader::column_values(df, "weight")?;
        let overweight: Vec<i64> = heights
            .iter()
            .zip(&weights)
            .map(|(&height, &weight)| Self::flag(Self::bmi(weight, height) > bmi_threshold))
            .collect();

        let overweight_count: i64 = overweight.iter().sum();
        let cholesterol = Self::binarize(&DataLoader::column_values(df, "cholesterol")?);
        let gluc = Self::binarize(&DataLoader::column_values(df, "gluc")?);

        let mut derived = df.clone();
        derived.with_column(Column::new("cholesterol".into(), cholesterol))?;
        derived.with_column(Column::new("gluc".into(), gluc))?;
        derived.with_column(Column::new("overweight".into(), overweight))?;

        log::debug!(
            "Derived features for {} rows ({} overweight)",
            derived.height(),
            overweight_count
        );
        Ok(derived)
    }

    /// Body mass index from kilograms and centimetres.
    pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
        let height_m = height_cm / 100.0;
        weight_kg / (height_m * height_m)
    }

    /// Ordinal level 1 is "normal"; anything above it becomes 1.
    fn binarize(levels: &[f64]) -> Vec<i64> {
        levels.iter().map(|&level| Self::flag(level > 1.0)).collect()
    }

    fn flag(condition: bool) -> i64 {
        i64::from(condition)
    }

    /// Transform indicator columns to long format (melt).
    ///
    /// Output columns: `[id_col, "variable", "value"]`, one row per
    /// (variable, record) pair with variables in `value_vars` order. Rows
    /// whose id or value is missing are skipped.
    pub fn melt(df: &DataFrame, id_col: &str, value_vars: &[&str]) -> Result<DataFrame> {
        let ids = Self::require(df, id_col)?;

        let mut id_out: Vec<f64> = Vec::with_capacity(ids.len() * value_vars.len());
        let mut variables: Vec<String> = Vec::with_capacity(id_out.capacity());
        let mut values: Vec<f64> = Vec::with_capacity(id_out.capacity());

        for variable in value_vars {
            let column = Self::require(df, variable)?;
            for (&id, &value) in ids.iter().zip(&column) {
                if id.is_nan() || value.is_nan() {
                    continue;
                }
                id_out.push(id);
                variables.push((*variable).to_string());
                values.push(value);
            }
        }

        let melted = DataFrame::new(vec![
            Column::new(id_col.into(), id_out),
            Column::new("variable".into(), variables),
            Column::new("value".into(), values),
        ])?;
        Ok(melted)
    }

    /// Count long-form rows per `(id, variable, value)`.
    ///
    /// Output is ordered by id ascending, variable name lexically, then
    /// value ascending. Combinations that never occur are absent.
    pub fn count_groups(melted: &DataFrame, id_col: &str) -> Result<Vec<CategoryCount>> {
        let ids = Self::require(melted, id_col)?;
        let values = Self::require(melted, "value")?;
        let variables = melted.column("variable")?.str()?;

        let mut counts: BTreeMap<(i64, String, i64), usize> = BTreeMap::new();
        for ((&id, variable), &value) in ids.iter().zip(variables.into_iter()).zip(&values) {
            let Some(variable) = variable else {
                continue;
            };
            *counts
                .entry((id as i64, variable.to_string(), value as i64))
                .or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|((cardio, variable, value), total)| CategoryCount {
                cardio,
                variable,
                value,
                total,
            })
            .collect())
    }

    /// Keep physiologically plausible rows with central height and weight.
    ///
    /// Retains rows where `ap_lo <= ap_hi` and both `height` and `weight`
    /// sit inside the closed quantile band. Bands are computed once on the
    /// whole input frame.
    pub fn filter_plausible(df: &DataFrame, bounds: &QuantileBounds) -> Result<DataFrame> {
        if df.height() == 0 {
            return Err(PipelineError::Data(
                "cannot filter an empty table".to_string(),
            ));
        }

        let (height_lo, height_hi) = Self::band(df, "height", bounds)?;
        let (weight_lo, weight_hi) = Self::band(df, "weight", bounds)?;
        log::debug!(
            "Plausibility band: height [{height_lo}, {height_hi}], weight [{weight_lo}, {weight_hi}]"
        );

        let filtered = df
            .clone()
            .lazy()
            .filter(
                col("ap_lo")
                    .lt_eq(col("ap_hi"))
                    .and(col("height").gt_eq(lit(height_lo)))
                    .and(col("height").lt_eq(lit(height_hi)))
                    .and(col("weight").gt_eq(lit(weight_lo)))
                    .and(col("weight").lt_eq(lit(weight_hi))),
            )
            .collect()?;

        if filtered.height() == 0 {
            return Err(PipelineError::Data(
                "no rows left after the plausibility filter".to_string(),
            ));
        }

        log::info!(
            "Plausibility filter kept {} of {} rows",
            filtered.height(),
            df.height()
        );
        Ok(filtered)
    }

    fn band(df: &DataFrame, name: &str, bounds: &QuantileBounds) -> Result<(f64, f64)> {
        let values = DataLoader::column_values(df, name)?;
        Ok((
            StatsCalculator::quantile(&values, bounds.lower, bounds.method),
            StatsCalculator::quantile(&values, bounds.upper, bounds.method),
        ))
    }

    /// Column values, reporting an absent column as a data error.
    fn require(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        DataLoader::column_values(df, name).map_err(|e| match e {
            PipelineError::MissingColumn(name) => {
                PipelineError::Data(format!("column `{name}` is required for reshaping"))
            }
            other => other,
        })
    }
}
