//! Provider adapters.
//!
//! Every adapter normalizes its raw records into [`Candidate`]s and absorbs
//! its own failures: a fetch always yields a [`ProviderBatch`], falling back
//! to a fixed substitute list when upstream cannot be used.

pub mod inventory;
pub mod tfl;
mod tfl_parse;

use parkon_core::Candidate;
use serde::{Deserialize, Serialize};

pub use inventory::InventoryProvider;
pub use tfl::{TflClient, TflSettings};

/// Adapter identity. Declaration order is the aggregation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Tfl,
    Inventory,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Tfl => "tfl",
            ProviderKind::Inventory => "inventory",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an adapter produced its batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Records came from the named upstream endpoint.
    Live { endpoint: String },
    /// Records came from a catalog with no upstream.
    Static,
    /// Upstream failed; the fixed substitute list was used.
    Substitute { reason: String },
}

impl FetchOutcome {
    #[must_use]
    pub fn is_substitute(&self) -> bool {
        matches!(self, FetchOutcome::Substitute { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ProviderBatch {
    pub provider: ProviderKind,
    pub candidates: Vec<Candidate>,
    pub outcome: FetchOutcome,
}
