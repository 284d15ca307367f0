//! Statistics module - per-bin aggregation and correlation

mod aggregator;
mod correlation;

pub use aggregator::{BinAggregator, BinSummary};
pub use correlation::{size_installs_correlation, CorrelationError, CorrelationReport};
