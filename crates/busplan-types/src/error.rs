//! Error types for busplan

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Scenario file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse scenario: {0}")]
    ParseError(String),

    #[error("Failed to render scenario: {0}")]
    RenderError(String),
}

/// Input values rejected before they reach the calculation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NonFinite { field: String },

    #[error("{field} must be greater than zero (got {value})")]
    NonPositive { field: String, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: f64 },

    #[error("{field} must lie in [{min}, {max}) (got {value})")]
    FractionOutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must lie in [{min}, {max}] (got {value})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown route parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = ValidationError::NonPositive {
            field: "route.headway_min".to_string(),
            value: 0.0,
        };
        assert_eq!(
            err.to_string(),
            "route.headway_min must be greater than zero (got 0)"
        );
    }

    #[test]
    fn test_validation_converts_into_error() {
        let err: Error = ValidationError::NonFinite {
            field: "diesel.range_km".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().starts_with("Invalid input:"));
    }
}
