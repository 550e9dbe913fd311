//! Analytics side channel for completed searches.
//!
//! Recording is fire-and-forget: a sink must return immediately and must not
//! let its own failures reach the search response.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use parkon_core::{RankedResult, SearchQuery};
use parkon_db::NewSearchCacheEntry;
use serde::Serialize;
use sqlx::PgPool;

use crate::aggregate::ProviderReport;

/// Everything worth keeping about one search: the query, the full ranked
/// set before the result cap, and how each provider fared.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRecord {
    pub query: SearchQuery,
    pub results: Vec<RankedResult>,
    pub total_matched: usize,
    pub providers: Vec<ProviderReport>,
    pub searched_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Flattens the record into a `search_cache` row.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if results or provider reports fail to serialize.
    pub fn to_cache_entry(&self) -> Result<NewSearchCacheEntry, serde_json::Error> {
        Ok(NewSearchCacheEntry {
            latitude: self.query.origin.latitude,
            longitude: self.query.origin.longitude,
            radius_km: self.query.radius_km,
            spot_type: self.query.category.map(|c| c.as_str().to_string()),
            max_price: self.query.max_price,
            privilege: self.query.privilege.as_str().to_string(),
            results: serde_json::to_value(&self.results)?,
            total_matched: i64::try_from(self.total_matched).unwrap_or(i64::MAX),
            providers: serde_json::to_value(&self.providers)?,
            cached_at: self.searched_at,
        })
    }
}

pub trait SearchSink: Send + Sync {
    /// Hands off a record. Must not block on I/O.
    fn record(&self, record: SearchRecord);
}

/// Writes records to the `search_cache` table on a detached task.
#[derive(Clone)]
pub struct PgSearchSink {
    pool: PgPool,
}

impl PgSearchSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SearchSink for PgSearchSink {
    fn record(&self, record: SearchRecord) {
        let entry = match record.to_cache_entry() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize search record; skipping cache write");
                return;
            }
        };
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) = parkon_db::insert_search_cache(&pool, &entry).await {
                tracing::warn!(error = %e, "failed to write search cache entry");
            }
        });
    }
}

/// Logs a one-line summary instead of persisting. Used when no database is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl SearchSink for TracingSink {
    fn record(&self, record: SearchRecord) {
        tracing::info!(
            latitude = record.query.origin.latitude,
            longitude = record.query.origin.longitude,
            radius_km = record.query.radius_km,
            total_matched = record.total_matched,
            "search completed"
        );
    }
}

/// Keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<SearchRecord>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records captured so far.
    #[must_use]
    pub fn records(&self) -> Vec<SearchRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl SearchSink for MemorySink {
    fn record(&self, record: SearchRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
