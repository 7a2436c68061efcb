//! Statistics Calculator Module
//! Quantiles, Pearson correlation and the correlation matrix.

use crate::data::DataLoader;
use crate::error::Result;
use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// How a quantile that falls between two samples is resolved.
/// The variants follow NumPy's `method` names.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantileMethod {
    /// Interpolate linearly between the neighbouring samples.
    Linear,
    /// Take the lower neighbour.
    #[default]
    Lower,
    /// Take the upper neighbour.
    Higher,
    /// Take the closer neighbour; exact halves go to the even index.
    Nearest,
    /// Average the two neighbours.
    Midpoint,
}

/// Pairwise Pearson coefficients over named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    /// Row-major, `names.len()` squared entries.
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Coefficient between column `row` and column `col`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.len() + col]
    }

    #[cfg(test)]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Coefficient between two columns by name.
    #[cfg(test)]
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(self.index_of(a)?, self.index_of(b)?))
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Quantile `q` (in `[0, 1]`) of the non-NaN values.
    ///
    /// Returns NaN when no value is present.
    pub fn quantile(values: &[f64], q: f64, method: QuantileMethod) -> f64 {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = sorted.len();
        if n == 0 {
            return f64::NAN;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        if n == 1 {
            return sorted[0];
        }

        let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        match method {
            QuantileMethod::Linear => {
                if lower == upper {
                    sorted[lower]
                } else {
                    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
                }
            }
            QuantileMethod::Lower => sorted[lower],
            QuantileMethod::Higher => sorted[upper],
            QuantileMethod::Nearest => {
                let pick_upper = frac > 0.5 || (frac == 0.5 && upper % 2 == 0);
                if pick_upper {
                    sorted[upper]
                } else {
                    sorted[lower]
                }
            }
            QuantileMethod::Midpoint => (sorted[lower] + sorted[upper]) / 2.0,
        }
    }

    /// Pearson correlation over the pairs where both values are present.
    ///
    /// NaN with fewer than two pairs or when either side has no variance.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let (xs, ys): (Vec<f64>, Vec<f64>) = xs
            .iter()
            .zip(ys)
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
            .map(|(x, y)| (*x, *y))
            .unzip();
        if xs.len() < 2 {
            return f64::NAN;
        }

        let denom = xs.iter().std_dev() * ys.iter().std_dev();
        if denom == 0.0 || denom.is_nan() {
            return f64::NAN;
        }
        let cov = xs.iter().covariance(ys.iter());
        (cov / denom).clamp(-1.0, 1.0)
    }

    /// Correlate every numeric column of the frame, in frame order.
    ///
    /// The diagonal is exactly 1.0 unless the column is constant, in which
    /// case its whole row and column are NaN.
    pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
        let names = DataLoader::numeric_columns(df);
        let columns = names
            .iter()
            .map(|name| DataLoader::column_values(df, name))
            .collect::<Result<Vec<_>>>()?;
        let n = names.len();

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i..n).map(move |j| (i, j)))
            .collect();

        // Use rayon for parallel computation
        let coefficients: Vec<(usize, usize, f64)> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let r = Self::pearson(&columns[i], &columns[j]);
                if i == j && !r.is_nan() {
                    (i, j, 1.0)
                } else {
                    (i, j, r)
                }
            })
            .collect();

        let mut values = vec![f64::NAN; n * n];
        for (i, j, r) in coefficients {
            values[i * n + j] = r;
            values[j * n + i] = r;
        }

        log::debug!("Computed {n}x{n} correlation matrix over {} rows", df.height());
        Ok(CorrelationMatrix { names, values })
    }

    /// Mask hiding the upper triangle and the diagonal: `mask[i][j]` is true
    /// when cell `(i, j)` must not be shown.
    pub fn upper_triangle_mask(n: usize) -> Vec<Vec<bool>> {
        (0..n).map(|i| (0..n).map(|j| j >= i).collect()).collect()
    }
}
