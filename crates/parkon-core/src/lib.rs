pub mod app_config;
pub mod config;
pub mod geo;
pub mod inventory;
pub mod query;
pub mod rank;
pub mod spot;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, Coordinate, DistanceUnit, EARTH_RADIUS_KM, MILES_TO_KM};
pub use inventory::{
    embedded_inventory, load_inventory, InventoryError, InventoryFile, InventorySpot,
    INVENTORY_ID_PREFIX, INVENTORY_PROVIDER,
};
pub use query::{CallerPrivilege, SearchQuery, SearchResult};
pub use rank::{rank, rank_all, RankError, MAX_RESULTS, WALK_MINUTES_PER_KM};
pub use spot::{Candidate, Pricing, RankedResult, SpotCategory, SpotStatus};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors raised while constructing domain values from untrusted input.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("unknown spot category: {0}")]
    UnknownCategory(String),
}
