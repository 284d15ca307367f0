//! CSV Data Loader Module
//! Reads the app metadata CSV into a Polars DataFrame and checks its shape.

use super::{CATEGORY, INSTALLS, SIZE};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [CATEGORY, SIZE, INSTALLS];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Required column '{0}' is missing from the input")]
    MissingColumn(&'static str),
}

/// Loads app metadata CSV files with Polars.
pub struct AppLoader {
    infer_schema_length: usize,
}

impl Default for AppLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AppLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 10000,
        }
    }

    /// Required columns are always read as text so that values the
    /// cleaner cannot parse are counted there instead of becoming nulls here.
    fn text_overrides() -> Schema {
        REQUIRED_COLUMNS
            .iter()
            .map(|name| (PlSmallStr::from(*name), DataType::String))
            .collect()
    }

    /// Load a CSV file with header, inferring the remaining column types.
    ///
    /// Any failure here is fatal for the run.
    pub fn load_csv(&self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }

        debug!(path = %file_path.display(), "Reading CSV");
        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_dtype_overwrite(Some(Arc::new(Self::text_overrides())))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::check_required_columns(&df)?;

        info!(
            rows = df.height(),
            columns = df.width(),
            "Loaded {}",
            file_path.display()
        );
        Ok(df)
    }

    fn check_required_columns(df: &DataFrame) -> Result<(), LoaderError> {
        for name in REQUIRED_COLUMNS {
            if df.get_column_index(name).is_none() {
                return Err(LoaderError::MissingColumn(name));
            }
        }
        Ok(())
    }
}

/// Column names paired with their dtypes, for schema previews.
pub fn describe_schema(df: &DataFrame) -> Vec<(String, String)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.dtype().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataCleaner, INSTALLS_CLEAN};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_rows_and_columns() {
        let file = write_csv(
            "App,Category,Size,Installs\n\
             Alpha,TOOLS,19M,\"10,000+\"\n\
             Beta,GAME,512k,500+\n",
        );

        let df = AppLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 4);

        let installs = df.column("Installs").unwrap().str().unwrap();
        assert_eq!(installs.get(0), Some("10,000+"));
    }

    #[test]
    fn required_columns_are_read_as_text() {
        let file = write_csv(
            "Category,Size,Installs,Rating\n\
             TOOLS,19M,100,4.1\n\
             GAME,3M,500,3.9\n",
        );

        let df = AppLoader::new().load_csv(file.path()).unwrap();
        for name in REQUIRED_COLUMNS {
            assert_eq!(df.column(name).unwrap().dtype(), &DataType::String, "{name}");
        }
        assert_eq!(df.column("Rating").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Installs").unwrap().str().unwrap().get(1), Some("500"));
    }

    #[test]
    fn late_text_installs_are_not_nulled_by_inference() {
        // Inference sees only the first row, where Installs looks like an integer.
        let file = write_csv(
            "Category,Size,Installs\n\
             TOOLS,19M,100\n\
             GAME,3M,\"1,000+\"\n\
             ART,8M,Free\n",
        );
        let loader = AppLoader {
            infer_schema_length: 1,
        };

        let df = loader.load_csv(file.path()).unwrap();
        assert_eq!(df.column(INSTALLS).unwrap().null_count(), 0);

        let (cleaned, report) = DataCleaner::clean(&df).unwrap();
        assert_eq!(report.dropped_missing, 0);
        assert_eq!(report.dropped_unparseable, 1);
        let installs = cleaned.column(INSTALLS_CLEAN).unwrap().i64().unwrap();
        assert_eq!(installs.get(1), Some(1_000));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppLoader::new()
            .load_csv(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let file = write_csv("App,Category,Installs\nAlpha,TOOLS,500+\n");

        let err = AppLoader::new().load_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn("Size")));
    }

    #[test]
    fn schema_lists_every_column() {
        let df = df!(
            "Category" => ["TOOLS"],
            "Size" => ["19M"],
            "Installs" => ["500+"],
        )
        .unwrap();

        let schema = describe_schema(&df);
        let names: Vec<&str> = schema.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Category", "Size", "Installs"]);
    }
}
