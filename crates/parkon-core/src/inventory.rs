use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;
use crate::spot::{Candidate, Pricing, SpotCategory, SpotStatus};

/// Identifier prefix and provider tag for catalog entries.
pub const INVENTORY_ID_PREFIX: &str = "inv_";
pub const INVENTORY_PROVIDER: &str = "inventory";

const EMBEDDED_INVENTORY: &str = include_str!("../data/inventory.yaml");

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to read inventory file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse inventory YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("inventory validation error: {0}")]
    Validation(String),
}

fn default_currency() -> String {
    "GBP".to_string()
}

fn default_city() -> String {
    "London".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySpot {
    /// Catalog-local id; the `inv_` prefix is added on conversion.
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub postcode: Option<String>,
    #[serde(default = "default_city")]
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u32,
    pub hourly_rate: Decimal,
    pub daily_rate: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub category: SpotCategory,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl InventorySpot {
    #[must_use]
    pub fn candidate_id(&self) -> String {
        format!("{INVENTORY_ID_PREFIX}{}", self.id)
    }

    /// Converts a validated entry into a [`Candidate`].
    #[must_use]
    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            id: self.candidate_id(),
            coordinate: Coordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            name: self.name.clone(),
            address: self.address.clone(),
            postcode: self.postcode.clone(),
            city: self.city.clone(),
            capacity: self.capacity,
            pricing: Pricing {
                hourly_rate: self.hourly_rate,
                daily_rate: self.daily_rate,
                currency: self.currency.clone(),
            },
            category: self.category,
            amenities: self.amenities.iter().cloned().collect::<BTreeSet<_>>(),
            provider: INVENTORY_PROVIDER.to_string(),
            status: SpotStatus::Available,
            realtime: false,
            live_free_spaces: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryFile {
    pub spots: Vec<InventorySpot>,
}

impl InventoryFile {
    /// All entries as candidates, in file order.
    #[must_use]
    pub fn candidates(&self) -> Vec<Candidate> {
        self.spots.iter().map(InventorySpot::to_candidate).collect()
    }
}

/// Parse and validate the catalog compiled into the binary.
///
/// # Errors
///
/// Returns `InventoryError` if the embedded YAML is malformed or invalid.
pub fn embedded_inventory() -> Result<InventoryFile, InventoryError> {
    parse_inventory(EMBEDDED_INVENTORY)
}

/// Load and validate an inventory catalog from a YAML file.
///
/// # Errors
///
/// Returns `InventoryError` if the file cannot be read, parsed, or fails validation.
pub fn load_inventory(path: &Path) -> Result<InventoryFile, InventoryError> {
    let content = std::fs::read_to_string(path).map_err(|e| InventoryError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_inventory(&content)
}

fn parse_inventory(content: &str) -> Result<InventoryFile, InventoryError> {
    let file: InventoryFile = serde_yaml::from_str(content)?;
    validate_inventory(&file)?;
    Ok(file)
}

fn validate_inventory(file: &InventoryFile) -> Result<(), InventoryError> {
    let mut seen_ids = HashSet::new();

    for spot in &file.spots {
        if spot.id.trim().is_empty() {
            return Err(InventoryError::Validation(
                "spot id must be non-empty".to_string(),
            ));
        }
        if spot.name.trim().is_empty() {
            return Err(InventoryError::Validation(format!(
                "spot '{}' must have a non-empty name",
                spot.id
            )));
        }
        if !seen_ids.insert(spot.id.as_str()) {
            return Err(InventoryError::Validation(format!(
                "duplicate spot id: '{}'",
                spot.id
            )));
        }
        if let Err(e) = Coordinate::new(spot.latitude, spot.longitude) {
            return Err(InventoryError::Validation(format!(
                "spot '{}' has an invalid coordinate: {e}",
                spot.id
            )));
        }
        if spot.hourly_rate < Decimal::ZERO || spot.daily_rate.is_some_and(|d| d < Decimal::ZERO)
        {
            return Err(InventoryError::Validation(format!(
                "spot '{}' has a negative price",
                spot.id
            )));
        }
        if spot.capacity == 0 {
            return Err(InventoryError::Validation(format!(
                "spot '{}' must have a capacity of at least 1",
                spot.id
            )));
        }
    }

    Ok(())
}
