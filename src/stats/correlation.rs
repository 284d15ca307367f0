//! Correlation Module
//! Pearson correlation between app size and installs, with a t-test on r.

use crate::data::{INSTALLS_CLEAN, SIZE_MB};
use polars::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;
use thiserror::Error;

/// Significance threshold for the correlation t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

#[derive(Error, Debug)]
pub enum CorrelationError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Need at least 2 rows to correlate, got {0}")]
    TooFewRows(usize),
    #[error("Column '{0}' has zero variance")]
    ZeroVariance(&'static str),
    #[error("Correlation is not a finite number")]
    NonFinite,
}

/// Pearson correlation over the whole cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub coefficient: f64,
    pub sample_size: usize,
    /// `None` below three rows, where the t-test has no degrees of freedom.
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

/// A standard deviation usable as a Pearson denominator.
fn check_spread(sd: f64, column: &'static str) -> Result<f64, CorrelationError> {
    if !sd.is_finite() {
        Err(CorrelationError::NonFinite)
    } else if sd == 0.0 {
        Err(CorrelationError::ZeroVariance(column))
    } else {
        Ok(sd)
    }
}

/// Pearson correlation coefficient of two equally long samples.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, CorrelationError> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(CorrelationError::TooFewRows(n));
    }
    let (x, y) = (&x[..n], &y[..n]);

    let sd_x = check_spread(x.iter().std_dev(), SIZE_MB)?;
    let sd_y = check_spread(y.iter().std_dev(), INSTALLS_CLEAN)?;

    let r = x.iter().covariance(y.iter()) / (sd_x * sd_y);
    if !r.is_finite() {
        return Err(CorrelationError::NonFinite);
    }
    Ok(r.clamp(-1.0, 1.0))
}

/// Two-tailed t-test of `r` against zero with `n - 2` degrees of freedom.
fn correlation_ttest(r: f64, n: usize) -> Option<(f64, f64)> {
    if n < 3 {
        return None;
    }
    let df = (n - 2) as f64;

    let denom = 1.0 - r * r;
    if denom <= 0.0 {
        return Some((f64::INFINITY.copysign(r), 0.0));
    }

    let t = r * (df / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
    Some((t, p_value))
}

/// Correlate `Size_MB` with `Installs_clean` across every row of `df`.
pub fn size_installs_correlation(df: &DataFrame) -> Result<CorrelationReport, CorrelationError> {
    let sizes = df.column(SIZE_MB)?.cast(&DataType::Float64)?;
    let installs = df.column(INSTALLS_CLEAN)?.cast(&DataType::Float64)?;

    let (x, y): (Vec<f64>, Vec<f64>) = sizes
        .f64()?
        .into_iter()
        .zip(installs.f64()?.into_iter())
        .filter_map(|(s, i)| Some((s?, i?)))
        .unzip();

    let coefficient = pearson(&x, &y)?;
    let ttest = correlation_ttest(coefficient, x.len());

    Ok(CorrelationReport {
        coefficient,
        sample_size: x.len(),
        t_statistic: ttest.map(|(t, _)| t),
        p_value: ttest.map(|(_, p)| p),
        is_significant: ttest.is_some_and(|(_, p)| p <= SIGNIFICANCE_THRESHOLD),
    })
}
