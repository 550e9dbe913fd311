//! End-to-end search: validate, fetch, aggregate, rank, record.

use std::sync::Arc;

use chrono::Utc;
use parkon_core::{
    rank_all, AppConfig, CallerPrivilege, SearchQuery, SearchResult, SpotCategory, MAX_RESULTS,
};

use crate::aggregate::merge;
use crate::error::SearchError;
use crate::params::{parse_query, RawSearchParams};
use crate::providers::{InventoryProvider, TflClient, TflSettings};
use crate::sink::{SearchRecord, SearchSink};

/// Owns the provider clients and the analytics sink. Built once at start-up
/// and shared across requests.
pub struct SearchService {
    tfl: TflClient,
    inventory: InventoryProvider,
    sink: Arc<dyn SearchSink>,
    max_radius_km: f64,
}

impl SearchService {
    #[must_use]
    pub fn new(
        tfl: TflClient,
        inventory: InventoryProvider,
        sink: Arc<dyn SearchSink>,
        max_radius_km: f64,
    ) -> Self {
        Self {
            tfl,
            inventory,
            sink,
            max_radius_km,
        }
    }

    /// Builds the service from application config, loading the inventory
    /// catalog and constructing the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Inventory`] or [`SearchError::Provider`] when
    /// set-up fails.
    pub fn from_app_config(
        config: &AppConfig,
        sink: Arc<dyn SearchSink>,
    ) -> Result<Self, SearchError> {
        let tfl = TflClient::new(&TflSettings::from_app_config(config))?;
        let inventory = InventoryProvider::load(config.inventory_path.as_deref())?;
        Ok(Self::new(tfl, inventory, sink, config.max_radius_km))
    }

    /// Validates raw parameters and runs the search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] for rejected input and
    /// [`SearchError::Rank`] for internal ranking failures. Provider outages
    /// never surface as errors.
    pub async fn search(
        &self,
        raw: &RawSearchParams,
        privilege: CallerPrivilege,
    ) -> Result<SearchResult, SearchError> {
        let query = parse_query(raw, privilege, self.max_radius_km)?;
        self.run(&query).await
    }

    /// Runs an already validated query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Rank`] if ranking fails.
    pub async fn run(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        let (tfl, inventory) = tokio::join!(self.tfl.fetch(query.privilege), async {
            self.inventory.fetch(query.privilege)
        });

        let aggregated = merge(vec![tfl, inventory]);
        let ranked = rank_all(aggregated.candidates, query)?;

        tracing::info!(
            latitude = query.origin.latitude,
            longitude = query.origin.longitude,
            radius_km = query.radius_km,
            category = query.category.map(SpotCategory::as_str),
            total_matched = ranked.len(),
            "search ranked"
        );

        self.sink.record(SearchRecord {
            query: query.clone(),
            results: ranked.clone(),
            total_matched: ranked.len(),
            providers: aggregated.reports,
            searched_at: Utc::now(),
        });

        Ok(SearchResult::from_ranked(ranked, MAX_RESULTS))
    }
}
