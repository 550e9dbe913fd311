//! Low-level HTTP helpers shared by the provider clients.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::ProviderError;

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds a client with a per-request timeout and identifying user agent.
pub(crate) fn build_client(
    request_timeout: Duration,
    user_agent: &str,
) -> Result<Client, ProviderError> {
    Ok(Client::builder()
        .timeout(request_timeout)
        .connect_timeout(request_timeout.min(MAX_CONNECT_TIMEOUT))
        .user_agent(user_agent)
        .build()?)
}

/// Result of a GET that may legitimately return 404.
pub(crate) enum JsonResponse {
    Found(serde_json::Value),
    NotFound,
}

/// Perform a GET and parse the body as JSON.
///
/// 404 is reported as [`JsonResponse::NotFound`]; every other non-2xx status
/// is an error.
pub(crate) async fn get_json(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<JsonResponse, ProviderError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .query(query)
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(JsonResponse::NotFound);
    }
    if !status.is_success() {
        return Err(ProviderError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    let value = serde_json::from_str(&body).map_err(|source| ProviderError::Deserialize {
        context: url.to_string(),
        source,
    })?;
    Ok(JsonResponse::Found(value))
}

/// Reads a float from a JSON number or a numeric string.
pub(crate) fn number_field(value: &serde_json::Value, key: &str) -> Option<f64> {
    let field = value.get(key)?;
    field
        .as_f64()
        .or_else(|| field.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|n| n.is_finite())
}

/// Reads a non-negative integer from a JSON number or a numeric string.
pub(crate) fn count_field(value: &serde_json::Value, key: &str) -> Option<u32> {
    let field = value.get(key)?;
    field
        .as_u64()
        .or_else(|| field.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
        .and_then(|n| u32::try_from(n).ok())
}

/// Reads a trimmed, non-empty string.
pub(crate) fn text_field<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn number_field_accepts_numbers_and_numeric_strings() {
        let v = json!({"a": 51.5, "b": "-0.12", "c": "north", "d": null});
        assert_eq!(number_field(&v, "a"), Some(51.5));
        assert_eq!(number_field(&v, "b"), Some(-0.12));
        assert_eq!(number_field(&v, "c"), None);
        assert_eq!(number_field(&v, "d"), None);
        assert_eq!(number_field(&v, "missing"), None);
    }

    #[test]
    fn count_field_rejects_negative_and_fractional() {
        let v = json!({"a": 12, "b": "40", "c": -3, "d": 2.5});
        assert_eq!(count_field(&v, "a"), Some(12));
        assert_eq!(count_field(&v, "b"), Some(40));
        assert_eq!(count_field(&v, "c"), None);
        assert_eq!(count_field(&v, "d"), None);
    }

    #[test]
    fn text_field_drops_blank_values() {
        let v = json!({"a": "  Name ", "b": "   ", "c": 5});
        assert_eq!(text_field(&v, "a"), Some("Name"));
        assert_eq!(text_field(&v, "b"), None);
        assert_eq!(text_field(&v, "c"), None);
    }
}
