//! Per-dimension standardization.
//!
//! Embedding dimensions are not on a common scale, and squared-distance
//! clustering lets the largest-magnitude dimensions dominate. Standardizing
//! each column to zero mean and unit variance before clustering or layout
//! puts the dimensions on equal footing: `z = (x - mean) / std`.
//!
//! Fit parameters always come from the current batch; they are never carried
//! over between runs.

use ndarray::{Array2, Axis};

use crate::error::{Error, Result};

/// Standardizes columns by removing the mean and scaling to unit variance.
///
/// Columns with (near-)zero variance are scaled by 1.0 instead, so constant
/// dimensions pass through centered rather than producing NaNs.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Vec<f32>>,
    std: Option<Vec<f32>>,
}

impl StandardScaler {
    /// Create an unfitted scaler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit mean and standard deviation per column.
    pub fn fit(&mut self, data: &Array2<f32>) {
        let n = data.nrows().max(1) as f32;

        let mean: Vec<f32> = data
            .axis_iter(Axis(1))
            .map(|col| col.sum() / n)
            .collect();

        let std: Vec<f32> = data
            .axis_iter(Axis(1))
            .zip(&mean)
            .map(|(col, &m)| {
                let var = col.iter().map(|&x| (x - m) * (x - m)).sum::<f32>() / n;
                let s = var.sqrt();
                if s < 1e-8 {
                    1.0
                } else {
                    s
                }
            })
            .collect();

        self.mean = Some(mean);
        self.std = Some(std);
    }

    /// Standardize `data` using the fitted parameters.
    pub fn transform(&self, data: &Array2<f32>) -> Result<Array2<f32>> {
        let (Some(mean), Some(std)) = (&self.mean, &self.std) else {
            return Err(Error::InvalidParameter {
                name: "scaler",
                message: "transform called before fit",
            });
        };
        if data.ncols() != mean.len() {
            return Err(Error::DimensionMismatch {
                expected: mean.len(),
                found: data.ncols(),
            });
        }

        let mut out = data.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            for (j, x) in row.iter_mut().enumerate() {
                *x = (*x - mean[j]) / std[j];
            }
        }
        Ok(out)
    }

    /// Fit on `data` and return the standardized copy.
    pub fn fit_transform(&mut self, data: &Array2<f32>) -> Array2<f32> {
        self.fit(data);
        self.transform(data).expect("fitted on the same shape")
    }

    /// Fitted per-column means, if fitted.
    pub fn mean(&self) -> Option<&[f32]> {
        self.mean.as_deref()
    }

    /// Fitted per-column standard deviations, if fitted.
    pub fn std(&self) -> Option<&[f32]> {
        self.std.as_deref()
    }
}
