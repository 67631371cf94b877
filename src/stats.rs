use polars::prelude::*;

use crate::error::{Result, VisualizerError};

/// Closed interval between two quantiles of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileBounds {
    pub lower: f64,
    pub upper: f64,
}

impl QuantileBounds {
    /// Linear-interpolated `low` and `high` quantiles of `series`.
    pub fn of(series: &Series, low: f64, high: f64) -> Result<Self> {
        let values = series.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let lower = values.quantile(low, QuantileInterpolOptions::Linear)?;
        let upper = values.quantile(high, QuantileInterpolOptions::Linear)?;

        match (lower, upper) {
            (Some(lower), Some(upper)) => Ok(QuantileBounds { lower, upper }),
            _ => Err(VisualizerError::EmptyColumn {
                column: series.name().to_string(),
            }),
        }
    }
}

/// Square matrix of pairwise Pearson coefficients, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Correlates every numeric column of `df`, in column order.
    ///
    /// Nulls are dropped pairwise. A column without variance correlates as NaN,
    /// its own diagonal entry included.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::new();
        let mut data = Vec::new();
        for series in df.get_columns() {
            if !series.dtype().is_numeric() {
                continue;
            }
            columns.push(series.name().to_string());
            data.push(to_f64_vec(series)?);
        }

        let n = columns.len();
        let mut values = vec![f64::NAN; n * n];
        for i in 0..n {
            for j in 0..=i {
                let r = pearson(&data[i], &data[j]);
                let r = if i == j && !r.is_nan() { 1.0 } else { r };
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }

        Ok(CorrelationMatrix { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.len() + col]
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

fn to_f64_vec(series: &Series) -> Result<Vec<f64>> {
    let values = series.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Pearson correlation over the positions where both inputs are present.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// `mask[i][j]` is true on and above the diagonal.
pub fn upper_triangle_mask(n: usize) -> Vec<Vec<bool>> {
    (0..n).map(|i| (0..n).map(|j| j >= i).collect()).collect()
}
