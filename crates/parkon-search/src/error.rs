use parkon_core::{CoreError, InventoryError, RankError};
use thiserror::Error;

/// Failures talking to an upstream data source.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unexpected payload shape from {url}: {reason}")]
    UnexpectedShape { url: String, reason: String },

    #[error("no usable records in response from {url}")]
    NoUsableRecords { url: String },

    #[error("all endpoints failed; last error: {last}")]
    Exhausted { last: String },

    #[error("provider deadline of {millis}ms exceeded")]
    DeadlineExceeded { millis: u128 },
}

/// Rejected search input. Always reported to the caller as a client error.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required parameter: {0}")]
    MissingParam(&'static str),

    #[error("parameter {param} is not a valid number: {value:?}")]
    InvalidNumber { param: &'static str, value: String },

    #[error("invalid coordinate: {0}")]
    Coordinate(CoreError),

    #[error("unknown spot type: {0:?}")]
    UnknownCategory(String),

    #[error("max_price must not be negative")]
    NegativePrice,

    #[error("provide either radius_miles or radius_km, not both")]
    ConflictingRadius,

    #[error("radius must be greater than 0 and at most {max_km} km (got {radius_km} km)")]
    RadiusOutOfRange { radius_km: f64, max_km: f64 },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("ranking failed: {0}")]
    Rank(#[from] RankError),

    #[error("failed to build provider client: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to load inventory: {0}")]
    Inventory(#[from] InventoryError),
}
