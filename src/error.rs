// Error taxonomy for the impact pipeline
// Validation failures surface to the caller, upstream failures degrade to fallbacks

use thiserror::Error;

/// Malformed or out-of-range simulation input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("could not convert {field} value '{value}' to a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("location must be 'lat, lon' with two numbers, got '{0}'")]
    InvalidLocation(String),

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Failure talking to an external data source (NEO feed, USGS).
///
/// Never returned from a capability trait; converted to `Upstream::Unavailable`.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status: {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to parse response: {0}")]
    Decode(String),
}

/// Request-level failure reported back in the response envelope.
#[derive(Debug, Error)]
pub enum ImpactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Asteroid not found: {0}")]
    AsteroidNotFound(String),
}

impl ImpactError {
    /// HTTP-style status that accompanies the failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ImpactError::Validation(_) => 500,
            ImpactError::AsteroidNotFound(_) => 404,
        }
    }
}

/// Unparsable environment configuration.
#[derive(Debug, Error)]
#[error("invalid value '{value}' for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}
