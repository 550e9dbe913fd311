//! Static catalog adapter.

use std::path::Path;

use parkon_core::{embedded_inventory, load_inventory, CallerPrivilege, Candidate, InventoryError};

use super::{FetchOutcome, ProviderBatch, ProviderKind};

/// Serves the validated inventory catalog. Loaded once; fetching cannot fail.
#[derive(Debug, Clone)]
pub struct InventoryProvider {
    candidates: Vec<Candidate>,
}

impl InventoryProvider {
    #[must_use]
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Loads the catalog from `path`, or the embedded copy when `None`.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError` if the catalog cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, InventoryError> {
        let file = match path {
            Some(path) => load_inventory(path)?,
            None => embedded_inventory()?,
        };
        tracing::info!(
            spots = file.spots.len(),
            source = path.map_or_else(|| "embedded".to_string(), |p| p.display().to_string()),
            "inventory catalog loaded"
        );
        Ok(Self::new(file.candidates()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Catalog entries carry no live data, so privilege does not change them.
    #[must_use]
    pub fn fetch(&self, _privilege: CallerPrivilege) -> ProviderBatch {
        ProviderBatch {
            provider: ProviderKind::Inventory,
            candidates: self.candidates.clone(),
            outcome: FetchOutcome::Static,
        }
    }
}
