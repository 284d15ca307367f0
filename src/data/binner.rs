//! Size Binner Module
//! Buckets the cleaned Size_MB values into named size ranges.

use super::{SIZE_BIN, SIZE_MB};
use polars::prelude::*;

/// Named half-open size range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBin {
    /// [0, 10) MB
    UpTo10,
    /// [10, 50) MB
    From10To50,
    /// [50, 100) MB
    From50To100,
    /// [100, inf) MB
    Over100,
    /// Anything the ranges above do not cover.
    Unknown,
}

impl SizeBin {
    /// Assign a bin, checking the ranges in ascending order.
    pub fn from_megabytes(mb: f64) -> Self {
        match mb {
            v if (0.0..10.0).contains(&v) => SizeBin::UpTo10,
            v if (10.0..50.0).contains(&v) => SizeBin::From10To50,
            v if (50.0..100.0).contains(&v) => SizeBin::From50To100,
            v if v >= 100.0 => SizeBin::Over100,
            _ => SizeBin::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeBin::UpTo10 => "0-10 MB",
            SizeBin::From10To50 => "10-50 MB",
            SizeBin::From50To100 => "50-100 MB",
            SizeBin::Over100 => "100+ MB",
            SizeBin::Unknown => "Unknown",
        }
    }
}

/// Return a copy of `df` with a `Size_Bin` column derived from `Size_MB`.
pub fn with_size_bins(df: &DataFrame) -> PolarsResult<DataFrame> {
    let sizes = df.column(SIZE_MB)?.f64()?;
    let labels: Vec<&str> = sizes
        .into_iter()
        .map(|v| v.map_or(SizeBin::Unknown, SizeBin::from_megabytes).label())
        .collect();

    let mut result = df.clone();
    result.with_column(Column::new(SIZE_BIN.into(), labels))?;
    Ok(result)
}
