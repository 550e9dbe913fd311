//! UK postcode lookup against postcodes.io.

use std::time::Duration;

use parkon_core::{AppConfig, Coordinate};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::fetch::{build_client, get_json, number_field, text_field, JsonResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPostcode {
    pub postcode: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub district: Option<String>,
}

pub struct PostcodeClient {
    client: Client,
    base_url: String,
}

impl PostcodeClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(request_timeout, user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// # Errors
    ///
    /// See [`PostcodeClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            &config.geocoder_base_url,
            Duration::from_secs(config.provider_timeout_secs),
            &config.user_agent,
        )
    }

    /// Resolves a postcode to its centroid. Lookup is case-insensitive.
    ///
    /// Returns `Ok(None)` for blank input and for postcodes the service does
    /// not know.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport failure, an unexpected status, or
    /// a payload without a usable coordinate.
    pub async fn lookup(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, ProviderError> {
        let normalized = normalize_postcode(postcode);
        if normalized.is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/postcodes/{}",
            self.base_url,
            utf8_percent_encode(&normalized, NON_ALPHANUMERIC)
        );

        let body = match get_json(&self.client, &url, &[]).await? {
            JsonResponse::Found(body) => body,
            JsonResponse::NotFound => {
                tracing::debug!(postcode = %normalized, "postcode not found");
                return Ok(None);
            }
        };

        let Some(result) = body.get("result").filter(|r| r.is_object()) else {
            return Ok(None);
        };

        let coordinate = number_field(result, "latitude")
            .zip(number_field(result, "longitude"))
            .and_then(|(lat, lon)| Coordinate::new(lat, lon).ok())
            .ok_or_else(|| ProviderError::UnexpectedShape {
                url: url.clone(),
                reason: "result has no usable coordinate".to_string(),
            })?;

        Ok(Some(GeocodedPostcode {
            postcode: text_field(result, "postcode").unwrap_or(normalized.as_str()).to_string(),
            coordinate,
            district: text_field(result, "admin_district").map(str::to_string),
        }))
    }
}

/// Trims, upper-cases, and collapses internal whitespace to single spaces.
fn normalize_postcode(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}
