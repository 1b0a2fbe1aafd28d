use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversionError>;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] sqlx::Error),

    #[error("netCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("no scans in {0}")]
    NoScans(String),

    #[error("multiple scans in {0}")]
    MultipleScans(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

impl ConversionError {
    /// Closed set of per-item conditions that skip a conversion without a
    /// console error line. Everything else is logged and the batch continues.
    pub fn is_silent_skip(&self) -> bool {
        matches!(self, Self::NoScans(_) | Self::MultipleScans(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_skip_set() {
        assert!(ConversionError::NoScans("scan.csv".to_string()).is_silent_skip());
        assert!(ConversionError::MultipleScans("scan.csv".to_string()).is_silent_skip());
        assert!(!ConversionError::MissingData("wind input".to_string()).is_silent_skip());
        assert!(!ConversionError::InvalidFormat("bad row".to_string()).is_silent_skip());
    }
}
