use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::spot::{RankedResult, SpotCategory};

/// What the caller is allowed to see, resolved outside the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerPrivilege {
    #[default]
    Anonymous,
    Standard,
    Realtime,
}

impl CallerPrivilege {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CallerPrivilege::Anonymous => "anonymous",
            CallerPrivilege::Standard => "standard",
            CallerPrivilege::Realtime => "realtime",
        }
    }

    #[must_use]
    pub fn sees_live_occupancy(self) -> bool {
        matches!(self, CallerPrivilege::Realtime)
    }
}

/// A validated search request. The radius is always in kilometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: Coordinate,
    pub radius_km: f64,
    pub category: Option<SpotCategory>,
    /// Upper bound on the hourly rate.
    pub max_price: Option<Decimal>,
    pub privilege: CallerPrivilege,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<RankedResult>,
    /// Number of matches before the result cap was applied.
    pub total_matched: usize,
    pub message: String,
}

impl SearchResult {
    /// Caps an already ranked list and builds the summary message.
    #[must_use]
    pub fn from_ranked(mut ranked: Vec<RankedResult>, cap: usize) -> Self {
        let total_matched = ranked.len();
        ranked.truncate(cap);
        let message = if total_matched > ranked.len() {
            format!(
                "Found {total_matched} parking spots (showing {})",
                ranked.len()
            )
        } else {
            format!("Found {total_matched} parking spots")
        };
        Self {
            items: ranked,
            total_matched,
            message,
        }
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(RankedResult::id).collect()
    }
}
