//! Error types for aggregation and data access.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of an aggregate computation over a record sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("cannot compute {operation} of empty dataset")]
    EmptyDataset { operation: &'static str },
    #[error("field '{field}' not found in data")]
    MissingField { field: String },
    #[error("field '{field}' contains non-numeric data: {value:?}")]
    NonNumericField { field: String, value: String },
}

/// Failure while loading, saving, or managing dataset files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("cannot save empty data to CSV")]
    EmptyCsv,
    #[error("record field '{field}' is not among the CSV field names")]
    UnknownCsvField { field: String },
    #[error("cannot infer dataset format from {}", .path.display())]
    UnknownFormat { path: PathBuf },
    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            DataError::NotFound { path }
        } else {
            DataError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct() {
        let err = DataError::io("missing.json", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, DataError::NotFound { .. }));

        let err = DataError::io("locked.json", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_messages() {
        let err = StatsError::NonNumericField {
            field: "age".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "field 'age' contains non-numeric data: \"abc\"");

        let err: DataError = StatsError::EmptyDataset { operation: "average" }.into();
        assert_eq!(err.to_string(), "cannot compute average of empty dataset");
    }
}
