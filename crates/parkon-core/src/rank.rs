//! Filter & rank pipeline.
//!
//! Order of operations is fixed: radius cutoff, category filter, hourly price
//! filter, walk-time estimate, stable distance sort, then the result cap.

use thiserror::Error;

use crate::geo::distance_km;
use crate::query::{SearchQuery, SearchResult};
use crate::spot::{Candidate, RankedResult};

/// Maximum number of items returned to the caller.
pub const MAX_RESULTS: usize = 20;

/// Flat pedestrian pace used for the walk-time estimate (5 km/h).
pub const WALK_MINUTES_PER_KM: f64 = 12.0;

#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("distance to candidate {id} is not a finite number")]
    NonFiniteDistance { id: String },
}

/// Filters, positions, and sorts candidates without applying the cap.
///
/// The returned list is sorted by distance ascending; candidates at the same
/// distance keep their input (aggregation) order.
///
/// # Errors
///
/// Returns [`RankError::NonFiniteDistance`] if a distance comes out as NaN or
/// infinite, which means a malformed coordinate slipped past validation.
pub fn rank_all(
    candidates: Vec<Candidate>,
    query: &SearchQuery,
) -> Result<Vec<RankedResult>, RankError> {
    let mut ranked = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let distance = distance_km(query.origin, candidate.coordinate);
        if !distance.is_finite() {
            return Err(RankError::NonFiniteDistance { id: candidate.id });
        }
        if distance > query.radius_km {
            continue;
        }
        if query.category.is_some_and(|c| c != candidate.category) {
            continue;
        }
        if query
            .max_price
            .is_some_and(|max| candidate.pricing.hourly_rate > max)
        {
            continue;
        }

        ranked.push(RankedResult {
            candidate,
            distance_km: distance,
            walk_time_mins: walk_time_mins(distance),
        });
    }

    // `sort_by` is stable, which preserves aggregation order on exact ties.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    Ok(ranked)
}

/// Runs the full pipeline and caps the output at [`MAX_RESULTS`].
///
/// # Errors
///
/// See [`rank_all`].
pub fn rank(candidates: Vec<Candidate>, query: &SearchQuery) -> Result<SearchResult, RankError> {
    let ranked = rank_all(candidates, query)?;
    Ok(SearchResult::from_ranked(ranked, MAX_RESULTS))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn walk_time_mins(distance: f64) -> u32 {
    (distance * WALK_MINUTES_PER_KM).round() as u32
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod tests;
