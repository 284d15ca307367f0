//! Bin Aggregator Module
//! Group-wise install statistics per size bin.

use crate::data::{INSTALLS_CLEAN, SIZE_BIN, SIZE_MB};
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const AVERAGE_INSTALLS: &str = "Average Installs";
pub const APP_COUNT: &str = "App Count";
pub const AVERAGE_SIZE_MB: &str = "Average Size MB";
pub const MEDIAN_INSTALLS: &str = "Median Installs";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Aggregated column '{0}' has a null in row {1}")]
    NullValue(&'static str, usize),
}

/// Statistics for a single size bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSummary {
    pub bin: String,
    pub average_installs: f64,
    pub median_installs: f64,
    pub app_count: usize,
    pub average_size_mb: f64,
}

/// Computes per-bin aggregates over the cleaned, binned table.
pub struct BinAggregator;

impl BinAggregator {
    /// Average installs and app count per bin, sorted by bin label.
    pub fn installs_by_bin(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col(SIZE_BIN)])
            .agg([
                col(INSTALLS_CLEAN).mean().alias(AVERAGE_INSTALLS),
                col(INSTALLS_CLEAN).count().alias(APP_COUNT),
            ])
            .sort([SIZE_BIN], SortMultipleOptions::default())
            .collect()?;

        debug!(groups = grouped.height(), "Aggregated installs by size bin");
        Ok(grouped)
    }

    /// Per-bin installs plus mean size, used for the size-vs-installs scatter.
    pub fn size_and_installs_by_bin(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col(SIZE_BIN)])
            .agg([
                col(INSTALLS_CLEAN).mean().alias(AVERAGE_INSTALLS),
                col(INSTALLS_CLEAN).median().alias(MEDIAN_INSTALLS),
                col(INSTALLS_CLEAN).count().alias(APP_COUNT),
                col(SIZE_MB).mean().alias(AVERAGE_SIZE_MB),
            ])
            .sort([SIZE_BIN], SortMultipleOptions::default())
            .collect()?;

        Ok(grouped)
    }

    /// Convert the output of [`Self::size_and_installs_by_bin`] into plain structs.
    pub fn summarize(grouped: &DataFrame) -> Result<Vec<BinSummary>, AggregateError> {
        let bins = grouped.column(SIZE_BIN)?.str()?;
        let averages = grouped.column(AVERAGE_INSTALLS)?.cast(&DataType::Float64)?;
        let medians = grouped.column(MEDIAN_INSTALLS)?.cast(&DataType::Float64)?;
        let counts = grouped.column(APP_COUNT)?.cast(&DataType::UInt64)?;
        let sizes = grouped.column(AVERAGE_SIZE_MB)?.cast(&DataType::Float64)?;

        let averages = averages.f64()?;
        let medians = medians.f64()?;
        let counts = counts.u64()?;
        let sizes = sizes.f64()?;

        (0..grouped.height())
            .map(|i| -> Result<BinSummary, AggregateError> {
                Ok(BinSummary {
                    bin: bins
                        .get(i)
                        .ok_or(AggregateError::NullValue(SIZE_BIN, i))?
                        .to_string(),
                    average_installs: averages
                        .get(i)
                        .ok_or(AggregateError::NullValue(AVERAGE_INSTALLS, i))?,
                    median_installs: medians
                        .get(i)
                        .ok_or(AggregateError::NullValue(MEDIAN_INSTALLS, i))?,
                    app_count: counts
                        .get(i)
                        .ok_or(AggregateError::NullValue(APP_COUNT, i))?
                        as usize,
                    average_size_mb: sizes
                        .get(i)
                        .ok_or(AggregateError::NullValue(AVERAGE_SIZE_MB, i))?,
                })
            })
            .collect()
    }

    /// Aggregate and summarize in one step.
    pub fn bin_summaries(df: &DataFrame) -> Result<Vec<BinSummary>, AggregateError> {
        Self::summarize(&Self::size_and_installs_by_bin(df)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn binned_frame() -> DataFrame {
        df!(
            "Size_Bin" => ["0-10 MB", "0-10 MB", "10-50 MB", "100+ MB", "50-100 MB"],
            "Installs_clean" => [100i64, 300, 10_000, 5_000_000, 1_000],
            "Size_MB" => [2.0, 4.0, 19.0, 120.0, 60.0],
        )
        .unwrap()
    }

    #[test]
    fn average_and_count_per_bin() {
        let grouped = BinAggregator::installs_by_bin(&binned_frame()).unwrap();
        assert_eq!(grouped.height(), 4);

        let bins = grouped.column(SIZE_BIN).unwrap().str().unwrap();
        let averages = grouped.column(AVERAGE_INSTALLS).unwrap().f64().unwrap();
        let counts = grouped
            .column(APP_COUNT)
            .unwrap()
            .cast(&DataType::UInt64)
            .unwrap();
        let counts = counts.u64().unwrap();

        assert_eq!(bins.get(0), Some("0-10 MB"));
        assert!((averages.get(0).unwrap() - 200.0).abs() < EPS);
        assert_eq!(counts.get(0), Some(2));
    }

    #[test]
    fn groups_are_sorted_lexically() {
        let grouped = BinAggregator::installs_by_bin(&binned_frame()).unwrap();
        let bins: Vec<&str> = grouped
            .column(SIZE_BIN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(bins, ["0-10 MB", "10-50 MB", "100+ MB", "50-100 MB"]);
    }

    #[test]
    fn summaries_carry_mean_size() {
        let summaries = BinAggregator::bin_summaries(&binned_frame()).unwrap();
        assert_eq!(summaries.len(), 4);

        let small = &summaries[0];
        assert_eq!(small.bin, "0-10 MB");
        assert_eq!(small.app_count, 2);
        assert!((small.average_installs - 200.0).abs() < EPS);
        assert!((small.median_installs - 200.0).abs() < EPS);
        assert!((small.average_size_mb - 3.0).abs() < EPS);

        let large = &summaries[2];
        assert_eq!(large.bin, "100+ MB");
        assert_eq!(large.app_count, 1);
        assert!((large.average_size_mb - 120.0).abs() < EPS);
    }

    #[test]
    fn empty_table_has_no_groups() {
        let df = binned_frame().head(Some(0));
        let summaries = BinAggregator::bin_summaries(&df).unwrap();
        assert!(summaries.is_empty());
    }
}
