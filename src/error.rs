//! Error types for stock-fx-report

use thiserror::Error;

/// Main error type for stock-fx-report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("FX error: {0}")]
    FxError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Config file error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Spreadsheet error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}

/// Result type alias for stock-fx-report operations
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportError::FxError("invalid-key".to_string());
        assert_eq!(err.to_string(), "FX error: invalid-key");

        let err = ReportError::ConfigError("divisor must be positive".to_string());
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ReportError = io.into();
        assert!(matches!(err, ReportError::IoError(_)));
    }
}
