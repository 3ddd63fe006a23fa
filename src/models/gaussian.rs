//! Diagonal-covariance Gaussian distribution for HMM emissions

use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::f64::consts::PI;

/// Gaussian with independent per-feature variances
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalGaussian {
    /// Mean vector
    pub mean: Array1<f64>,
    /// Per-feature variances
    pub variance: Array1<f64>,
    /// Precomputed -0.5 * (d * ln(2π) + ln|Σ|)
    log_norm: f64,
}

impl DiagonalGaussian {
    /// Create new diagonal Gaussian
    pub fn new(mean: Array1<f64>, variance: Array1<f64>) -> Self {
        let d = mean.len() as f64;
        let log_det: f64 = variance.iter().map(|v| v.ln()).sum();
        Self {
            mean,
            variance,
            log_norm: -0.5 * (d * (2.0 * PI).ln() + log_det),
        }
    }

    /// Unit variance around `mean`
    pub fn with_unit_variance(mean: Array1<f64>) -> Self {
        let variance = Array1::ones(mean.len());
        Self::new(mean, variance)
    }

    /// Maximum likelihood estimate from samples, variances floored at `min_covar`
    pub fn from_samples(samples: &Array2<f64>, min_covar: f64) -> Self {
        let d = samples.ncols();
        let mean = samples
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(d));

        let mut variance = Array1::zeros(d);
        for row in samples.rows() {
            let diff = &row - &mean;
            variance += &diff.mapv(|x| x * x);
        }
        if samples.nrows() > 0 {
            variance /= samples.nrows() as f64;
        }
        variance.mapv_inplace(|v: f64| v.max(min_covar));

        Self::new(mean, variance)
    }

    /// Dimension of the distribution
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Log probability density at a point
    pub fn log_pdf(&self, x: ArrayView1<f64>) -> f64 {
        let quad_form: f64 = x
            .iter()
            .zip(self.mean.iter())
            .zip(self.variance.iter())
            .map(|((xi, mi), vi)| (xi - mi).powi(2) / vi)
            .sum();

        self.log_norm - 0.5 * quad_form
    }
}
