//! Ordinary least-squares regression and small numeric helpers

use crate::error::{ForecastError, Result};

/// Relative pivot tolerance below which a feature is treated as collinear
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round to `decimals` places, ties to even, as Python's `round` does
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Column-wise mean of a feature matrix
pub fn column_means(rows: &[Vec<f64>]) -> Vec<f64> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    (0..width)
        .map(|j| mean(&rows.iter().map(|r| r[j]).collect::<Vec<_>>()))
        .collect()
}

/// Linear model `y = intercept + coefficients · x` fitted by least squares
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Fit on centered data through the normal equations.
    ///
    /// Collinear or constant features get a zero coefficient, so a
    /// least-squares solution always exists and the fitted plane passes
    /// through the centroid of the training data.
    pub fn fit(features: &[Vec<f64>], targets: &[f64]) -> Result<Self> {
        check_training_set(features, targets)?;

        let p = features[0].len();
        let x_mean = column_means(features);
        let y_mean = mean(targets);

        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (row, y) in features.iter().zip(targets) {
            let centered: Vec<f64> = row.iter().zip(&x_mean).map(|(x, m)| x - m).collect();
            let dy = y - y_mean;
            for i in 0..p {
                xty[i] += centered[i] * dy;
                for j in 0..p {
                    xtx[i][j] += centered[i] * centered[j];
                }
            }
        }

        let coefficients = solve_symmetric(xtx, xty);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

/// Reject empty or ragged training sets
pub(crate) fn check_training_set(features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
    if features.is_empty() {
        return Err(ForecastError::ModelFit("training set is empty".to_string()));
    }
    if features.len() != targets.len() {
        return Err(ForecastError::ModelFit(format!(
            "{} feature rows but {} targets",
            features.len(),
            targets.len()
        )));
    }
    let width = features[0].len();
    if width == 0 || features.iter().any(|r| r.len() != width) {
        return Err(ForecastError::ModelFit(
            "feature rows must share a non-zero width".to_string(),
        ));
    }
    Ok(())
}

/// Gauss-Jordan elimination with partial pivoting.
///
/// Columns without a usable pivot are free variables fixed at zero.
fn solve_symmetric(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(1.0, f64::max);
    let mut pivot_row = vec![None; n];
    let mut row = 0;

    for col in 0..n {
        if row == n {
            break;
        }
        let (best, magnitude) = (row..n)
            .map(|r| (r, a[r][col].abs()))
            .fold((row, 0.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
        if magnitude <= PIVOT_TOLERANCE * scale {
            continue;
        }

        a.swap(row, best);
        b.swap(row, best);

        let pivot = a[row][col];
        for r in 0..n {
            if r == row {
                continue;
            }
            let factor = a[r][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[r][c] -= factor * a[row][c];
            }
            b[r] -= factor * b[row];
        }

        pivot_row[col] = Some(row);
        row += 1;
    }

    pivot_row
        .iter()
        .enumerate()
        .map(|(col, r)| r.map_or(0.0, |r| b[r] / a[r][col]))
        .collect()
}
