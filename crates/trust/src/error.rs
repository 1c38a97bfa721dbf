use thiserror::Error;

/// Errors raised while building or loading a scoring configuration
///
/// Calculators themselves never fail; degraded input scores at the floor.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid bucket table: {0}")]
    InvalidTable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ScoringError {
    fn from(err: serde_json::Error) -> Self {
        ScoringError::Serialization(err.to_string())
    }
}
