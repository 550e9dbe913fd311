use parkon_core::Candidate;
use serde::{Deserialize, Serialize};

use crate::providers::{FetchOutcome, ProviderBatch, ProviderKind};

/// Per-adapter summary kept for analytics and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReport {
    pub provider: ProviderKind,
    pub outcome: FetchOutcome,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct Aggregated {
    pub candidates: Vec<Candidate>,
    pub reports: Vec<ProviderReport>,
}

/// Concatenates batches in fixed provider priority, regardless of the order
/// in which they completed. No cross-provider deduplication is done.
#[must_use]
pub fn merge(mut batches: Vec<ProviderBatch>) -> Aggregated {
    batches.sort_by_key(|batch| batch.provider);

    let total = batches.iter().map(|b| b.candidates.len()).sum();
    let mut candidates = Vec::with_capacity(total);
    let mut reports = Vec::with_capacity(batches.len());

    for batch in batches {
        reports.push(ProviderReport {
            provider: batch.provider,
            outcome: batch.outcome,
            count: batch.candidates.len(),
        });
        candidates.extend(batch.candidates);
    }

    Aggregated {
        candidates,
        reports,
    }
}
