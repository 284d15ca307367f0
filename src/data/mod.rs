//! Data module - CSV loading, cleaning and size binning

mod binner;
mod cleaner;
mod loader;

pub use binner::with_size_bins;
pub use cleaner::{CleaningReport, DataCleaner};
pub use loader::{describe_schema, AppLoader};

pub const CATEGORY: &str = "Category";
pub const SIZE: &str = "Size";
pub const INSTALLS: &str = "Installs";
pub const INSTALLS_CLEAN: &str = "Installs_clean";
pub const SIZE_MB: &str = "Size_MB";
pub const SIZE_BIN: &str = "Size_Bin";
