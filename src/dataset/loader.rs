//! Raw table loading

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::error::{FinHealthError, Result};

/// Reads delimited files into a `DataFrame`
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set how many rows are scanned for type inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a comma separated file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        self.load_delimited(path.as_ref(), b',')
    }

    /// Pick the delimiter from the file extension and load
    pub fn load_auto(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => self.load_delimited(path, b','),
            "tsv" => self.load_delimited(path, b'\t'),
            other => Err(FinHealthError::DataError(format!(
                "Unsupported file format: {:?}",
                other
            ))),
        }
    }

    fn load_delimited(&self, path: &Path, delimiter: u8) -> Result<DataFrame> {
        let start = Instant::now();
        // Storage errors surface as IoError, untouched
        let file = File::open(path)?;

        let parse_opts = CsvParseOptions::default().with_separator(delimiter);
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()?;

        info!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "user_id,gender,credit_score").unwrap();
        writeln!(file, "1,Male,710").unwrap();
        writeln!(file, "2,Female,650").unwrap();
        writeln!(file, "3,Other,720").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("gender").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_auto_rejects_unknown_extension() {
        let err = DataLoader::new().load_auto("data.xlsx").unwrap_err();
        assert!(matches!(err, FinHealthError::DataError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DataLoader::new()
            .load_csv("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, FinHealthError::IoError(_)));
    }
}
