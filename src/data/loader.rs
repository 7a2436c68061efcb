//! CSV Data Loader Module
//! Reads the medical examination table with Polars and normalizes its schema.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Columns every input file must carry, in canonical order.
/// `gender` is checked separately because some exports call it `sex`.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "id",
    "age",
    "height",
    "weight",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    "cardio",
];

/// Accepted spellings of the gender column.
pub const GENDER_COLUMNS: [&str; 2] = ["gender", "sex"];

/// Loads CSV files into Polars DataFrames.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file and cast every required column to `Float64`.
    ///
    /// Row order is preserved. A file holding only the header row loads as
    /// an empty frame.
    pub fn load_csv(path: &Path) -> Result<DataFrame> {
        // Surface a missing or unreadable file as an I/O error before Polars
        // folds it into its own error type.
        File::open(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| PipelineError::Format(format!("{}: {e}", path.display())))?;

        let gender = Self::gender_column(&df)?;
        for name in REQUIRED_COLUMNS.iter().copied().chain(std::iter::once(gender)) {
            let column = df
                .column(name)
                .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
            let numeric = column
                .as_materialized_series()
                .strict_cast(&DataType::Float64)
                .map_err(|e| {
                    PipelineError::Format(format!("column `{name}` is not numeric: {e}"))
                })?;
            df.with_column(numeric)?;
        }

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// Name of the gender column actually present in the frame.
    fn gender_column(df: &DataFrame) -> Result<&'static str> {
        GENDER_COLUMNS
            .iter()
            .copied()
            .find(|name| df.column(name).is_ok())
            .ok_or_else(|| PipelineError::MissingColumn(GENDER_COLUMNS[0].to_string()))
    }

    /// Get list of numeric column names, in frame order.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| {
                matches!(
                    col.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Read a column as `f64` values. Nulls become NaN.
    pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let column = df
            .column(name)
            .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
        let as_f64 = column.cast(&DataType::Float64)?;
        Ok(as_f64
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    pub(crate) const HEADER: &str =
        "id,age,gender,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active,cardio";

    /// Write a CSV with the standard header followed by `rows`.
    pub(crate) fn write_csv(dir: &Path, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.join("medical_examination.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    #[test]
    fn test_load_preserves_rows_and_casts_to_float() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            &[
                "0,18393,2,168,62.0,110,80,1,1,0,0,1,0",
                "1,20228,1,156,85.0,140,90,3,1,0,0,1,1",
            ],
        );

        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("height").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            DataLoader::column_values(&df, "id").unwrap(),
            vec![0.0, 1.0]
        );
        assert_eq!(
            DataLoader::column_values(&df, "cholesterol").unwrap(),
            vec![1.0, 3.0]
        );
    }

    #[test]
    fn test_load_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), &[]);

        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.column("cardio").is_ok());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = DataLoader::load_csv(Path::new("/tmp/does-not-exist-medical-viz.csv"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_load_missing_column_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "id,age,gender,height,weight\n0,1,1,170,70\n").unwrap();

        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(err.is_format());
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "ap_hi"));
    }

    #[test]
    fn test_load_accepts_sex_alias() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sex.csv");
        std::fs::write(
            &path,
            "id,age,sex,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active,cardio\n\
             0,18393,2,168,62,110,80,1,1,0,0,1,0\n",
        )
        .unwrap();

        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("sex").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_load_non_numeric_value_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), &["0,18393,2,tall,62,110,80,1,1,0,0,1,0"]);

        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_numeric_columns_skips_text() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), vec![1.0f64, 2.0]),
            Column::new("label".into(), vec!["x", "y"]),
            Column::new("b".into(), vec![1i64, 2]),
        ])
        .unwrap();

        assert_eq!(DataLoader::numeric_columns(&df), vec!["a", "b"]);
    }

    #[test]
    fn test_column_values_maps_null_to_nan() {
        let df = DataFrame::new(vec![Column::new("a".into(), vec![Some(1.0f64), None])]).unwrap();
        let values = DataLoader::column_values(&df, "a").unwrap();
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
    }
}
