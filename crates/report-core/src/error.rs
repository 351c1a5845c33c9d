use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV structure itself is broken (bad quoting, invalid UTF-8, ...).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A duration token matched but its number could not be used.
    #[error("Invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },

    /// A malformed duration found while normalizing a specific row.
    #[error("Row {row}, column {column:?}: {source}")]
    InvalidRow {
        row: usize,
        column: String,
        #[source]
        source: Box<ReportError>,
    },

    /// A JSON document could not be produced or parsed.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Shorthand for [`ReportError::InvalidDuration`].
    pub fn invalid_duration(value: &str, reason: impl Into<String>) -> Self {
        ReportError::InvalidDuration {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach a data-row number and column name to an error.
    pub fn in_row(self, row: usize, column: &str) -> Self {
        ReportError::InvalidRow {
            row,
            column: column.to_string(),
            source: Box::new(self),
        }
    }
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ReportError::FileRead {
            path: PathBuf::from("/some/export.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/export.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_invalid_duration() {
        let err = ReportError::invalid_duration("1.5h", "fractional values are not allowed");
        assert_eq!(
            err.to_string(),
            "Invalid duration \"1.5h\": fractional values are not allowed"
        );
    }

    #[test]
    fn test_error_in_row_wraps_source() {
        let err = ReportError::invalid_duration("99999999999999999999h", "number too large")
            .in_row(3, "Time spent");
        let msg = err.to_string();
        assert!(msg.starts_with("Row 3, column \"Time spent\":"), "{msg}");
        assert!(msg.contains("number too large"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_display_config() {
        let err = ReportError::Config("missing input file".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing input file");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReportError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ReportError = json_err.into();
        assert!(err.to_string().contains("Failed to serialize JSON"));
    }
}
