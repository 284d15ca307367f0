//! Data Cleaner Module
//! Normalizes the free-text Size and Installs columns into numbers.

use super::{CATEGORY, INSTALLS, INSTALLS_CLEAN, SIZE, SIZE_MB};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Size suffix rules, tried in order: suffix and divisor to megabytes.
const SIZE_RULES: [(char, f64); 2] = [('M', 1.0), ('k', 1024.0)];

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Row counts removed at each filtering stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_loaded: usize,
    /// Rows with a null Category, Size or Installs.
    pub dropped_missing: usize,
    /// Rows whose Size or Installs could not be parsed.
    pub dropped_unparseable: usize,
    pub rows_retained: usize,
}

/// Parse an install count like `10,000+` into an integer.
pub fn parse_installs(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| !matches!(c, '+' | ',')).collect();
    digits.trim().parse().ok()
}

/// Plain unsigned decimal: digits with at most one `.`, no sign or exponent.
fn is_plain_decimal(text: &str) -> bool {
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in text.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Parse a declared size like `19M` or `512k` into megabytes.
///
/// Anything without a known suffix, including `Varies with device`, yields `None`.
/// The prefix must be a plain decimal, so `-5M`, `infM` and `1e3M` are rejected.
pub fn parse_size_mb(raw: &str) -> Option<f64> {
    let text = raw.trim().replace(',', "");

    let (number, divisor) = SIZE_RULES
        .iter()
        .find_map(|&(suffix, divisor)| text.strip_suffix(suffix).map(|n| (n, divisor)))?;

    let number = number.trim();
    if !is_plain_decimal(number) {
        return None;
    }
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value / divisor),
        _ => None,
    }
}

/// Handles the cleaning stages that turn loaded rows into the cleaned table.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop rows missing any of the required raw columns.
    pub fn drop_missing(df: &DataFrame) -> Result<DataFrame, CleanerError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(CATEGORY)
                    .is_not_null()
                    .and(col(SIZE).is_not_null())
                    .and(col(INSTALLS).is_not_null()),
            )
            .collect()?;
        Ok(filtered)
    }

    /// Add `Installs_clean` and `Size_MB` columns parsed from the raw text.
    ///
    /// Unparseable values become nulls; no rows are removed here.
    pub fn add_numeric_columns(df: &DataFrame) -> Result<DataFrame, CleanerError> {
        let installs = df.column(INSTALLS)?.cast(&DataType::String)?;
        let sizes = df.column(SIZE)?.cast(&DataType::String)?;

        let raw_installs: Vec<Option<&str>> = installs.str()?.into_iter().collect();
        let raw_sizes: Vec<Option<&str>> = sizes.str()?.into_iter().collect();

        let installs_clean: Vec<Option<i64>> = raw_installs
            .par_iter()
            .map(|v| v.and_then(parse_installs))
            .collect();
        let size_mb: Vec<Option<f64>> = raw_sizes
            .par_iter()
            .map(|v| v.and_then(parse_size_mb))
            .collect();

        let mut result = df.clone();
        result.with_column(Column::new(INSTALLS_CLEAN.into(), installs_clean))?;
        result.with_column(Column::new(SIZE_MB.into(), size_mb))?;
        Ok(result)
    }

    /// Drop rows where either derived numeric column is null.
    pub fn drop_unparseable(df: &DataFrame) -> Result<DataFrame, CleanerError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(INSTALLS_CLEAN)
                    .is_not_null()
                    .and(col(SIZE_MB).is_not_null()),
            )
            .collect()?;
        Ok(filtered)
    }

    /// Run every cleaning stage and count what each one removed.
    pub fn clean(df: &DataFrame) -> Result<(DataFrame, CleaningReport), CleanerError> {
        let rows_loaded = df.height();

        let present = Self::drop_missing(df)?;
        let dropped_missing = rows_loaded - present.height();
        debug!(dropped_missing, "Dropped rows with missing required values");

        let parsed = Self::add_numeric_columns(&present)?;
        let cleaned = Self::drop_unparseable(&parsed)?;
        let dropped_unparseable = parsed.height() - cleaned.height();
        debug!(dropped_unparseable, "Dropped rows with unparseable Size or Installs");

        let report = CleaningReport {
            rows_loaded,
            dropped_missing,
            dropped_unparseable,
            rows_retained: cleaned.height(),
        };
        info!(?report, "Cleaning complete");

        Ok((cleaned, report))
    }
}
