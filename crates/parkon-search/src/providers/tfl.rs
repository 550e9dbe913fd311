//! Transport for London car park feed.

use std::time::Duration;

use parkon_core::{AppConfig, CallerPrivilege, Candidate};
use reqwest::Client;

use super::tfl_parse::{normalize_record, substitute_candidates};
use super::{FetchOutcome, ProviderBatch, ProviderKind};
use crate::chain::first_success;
use crate::error::ProviderError;
use crate::fetch::{build_client, get_json, JsonResponse};

/// Endpoints tried in order until one yields usable records.
pub const TFL_ENDPOINTS: [&str; 2] = ["/Occupancy/CarPark", "/Place/Type/CarPark"];

#[derive(Debug, Clone)]
pub struct TflSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// Bound on the whole adapter run, across all endpoints.
    pub deadline: Duration,
    pub user_agent: String,
}

impl TflSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.tfl_base_url.clone(),
            api_key: config.tfl_api_key.clone(),
            request_timeout: Duration::from_secs(config.provider_timeout_secs),
            deadline: Duration::from_secs(config.provider_deadline_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Client for the TfL car park endpoints.
///
/// [`TflClient::fetch`] never fails: when every endpoint is unusable or the
/// deadline passes, the fixed station car park list is returned instead.
pub struct TflClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    deadline: Duration,
}

impl TflClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: &TflSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(settings.request_timeout, &settings.user_agent)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            deadline: settings.deadline,
        })
    }

    pub async fn fetch(&self, privilege: CallerPrivilege) -> ProviderBatch {
        let result = tokio::time::timeout(self.deadline, self.fetch_live(privilege))
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::DeadlineExceeded {
                    millis: self.deadline.as_millis(),
                })
            });

        match result {
            Ok((endpoint, candidates)) => {
                tracing::debug!(endpoint, count = candidates.len(), "tfl live feed used");
                ProviderBatch {
                    provider: ProviderKind::Tfl,
                    candidates,
                    outcome: FetchOutcome::Live {
                        endpoint: endpoint.to_string(),
                    },
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "tfl feed unavailable; serving substitute car parks");
                ProviderBatch {
                    provider: ProviderKind::Tfl,
                    candidates: substitute_candidates(),
                    outcome: FetchOutcome::Substitute {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }

    async fn fetch_live(
        &self,
        privilege: CallerPrivilege,
    ) -> Result<(&'static str, Vec<Candidate>), ProviderError> {
        let expose_occupancy = privilege.sees_live_occupancy();
        first_success(&TFL_ENDPOINTS, |endpoint| {
            self.fetch_endpoint(endpoint, expose_occupancy)
        })
        .await
    }

    async fn fetch_endpoint(
        &self,
        endpoint: &str,
        expose_occupancy: bool,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let url = format!("{}{endpoint}", self.base_url);
        let query: Vec<(&str, &str)> = self
            .api_key
            .as_deref()
            .map(|key| vec![("app_key", key)])
            .unwrap_or_default();

        let body = match get_json(&self.client, &url, &query).await? {
            JsonResponse::Found(body) => body,
            JsonResponse::NotFound => {
                return Err(ProviderError::UnexpectedStatus { status: 404, url });
            }
        };

        let Some(records) = body.as_array() else {
            return Err(ProviderError::UnexpectedShape {
                url,
                reason: "expected a JSON array".to_string(),
            });
        };

        let candidates: Vec<Candidate> = records
            .iter()
            .filter_map(|record| normalize_record(record, expose_occupancy))
            .collect();

        let skipped = records.len() - candidates.len();
        if skipped > 0 {
            tracing::debug!(url, skipped, "skipped tfl records without usable coordinates");
        }
        if candidates.is_empty() {
            return Err(ProviderError::NoUsableRecords { url });
        }
        Ok(candidates)
    }
}
