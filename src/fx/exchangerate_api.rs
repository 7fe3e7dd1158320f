//! exchangerate-api.com integration
//!
//! `GET {base}/v6/{api_key}/latest/USD` returns every rate against USD in a
//! single call.

use super::{ExchangeRateTable, RateSource};
use crate::error::{ReportError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const EXCHANGERATE_API_BASE_URL: &str = "https://v6.exchangerate-api.com";

/// Value shipped in the sample config; treated the same as no key at all
pub const API_KEY_PLACEHOLDER: &str = "YOUR-API-KEY";

/// Trimmed key, or `None` when it is blank or the placeholder
pub fn usable_api_key(key: &str) -> Option<&str> {
    let key = key.trim();
    (!key.is_empty() && key != API_KEY_PLACEHOLDER).then_some(key)
}

/// exchangerate-api.com data source
pub struct ExchangeRateApiSource {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(default)]
    conversion_rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
}

impl ExchangeRateApiSource {
    /// Create a new source against the public endpoint
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, EXCHANGERATE_API_BASE_URL, timeout)
    }

    /// Create a source against a custom endpoint
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::FxError(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = api_key.as_deref().and_then(usable_api_key).map(str::to_string);

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_latest_usd(&self) -> Result<ExchangeRateTable> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ReportError::FxError("no API key configured".to_string()))?;

        let url = format!("{}/v6/{}/latest/USD", self.base_url, api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReportError::FxError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReportError::FxError(format!("Failed to read response: {}", e)))?;

        // Error responses still carry a JSON body naming the error type
        let parsed = serde_json::from_str::<LatestRatesResponse>(&text);
        if !status.is_success() {
            let detail = parsed
                .ok()
                .and_then(|body| body.error_type)
                .unwrap_or_else(|| status.to_string());
            return Err(ReportError::FxError(format!(
                "exchangerate-api returned error: {}",
                detail
            )));
        }

        let body = parsed.map_err(|e| ReportError::FxError(format!("JSON parse error: {}", e)))?;
        Self::parse_response(body)
    }

    fn parse_response(body: LatestRatesResponse) -> Result<ExchangeRateTable> {
        if body.result != "success" {
            return Err(ReportError::FxError(format!(
                "exchangerate-api reported failure: {}",
                body.error_type.unwrap_or(body.result)
            )));
        }

        let rates = body.conversion_rates.ok_or_else(|| {
            ReportError::FxError("No conversion_rates in response".to_string())
        })?;

        Ok(ExchangeRateTable::from_pairs(rates))
    }
}

impl RateSource for ExchangeRateApiSource {
    async fn fetch_rates(&self) -> Result<ExchangeRateTable> {
        self.fetch_latest_usd().await
    }

    fn name(&self) -> &str {
        "exchangerate-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use serde_json::json;

    fn source(server: &mockito::Server, key: Option<&str>) -> ExchangeRateApiSource {
        ExchangeRateApiSource::with_base_url(
            key.map(str::to_string),
            server.url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_usable_api_key() {
        assert_eq!(usable_api_key("  abc123 "), Some("abc123"));
        assert_eq!(usable_api_key(API_KEY_PLACEHOLDER), None);
        assert_eq!(usable_api_key(" YOUR-API-KEY\n"), None);
        assert_eq!(usable_api_key(""), None);
    }

    #[tokio::test]
    async fn test_padded_key_is_trimmed_in_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v6/test-key/latest/USD")
            .with_status(200)
            .with_body(json!({ "result": "success", "conversion_rates": { "USD": 1 } }).to_string())
            .create_async()
            .await;

        source(&server, Some(" test-key\n")).fetch_rates().await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_placeholder_key_is_ignored() {
        let source = ExchangeRateApiSource::new(
            Some(API_KEY_PLACEHOLDER.to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!source.has_api_key());

        let source = ExchangeRateApiSource::new(Some("  ".to_string()), Duration::from_secs(5)).unwrap();
        assert!(!source.has_api_key());
    }

    #[tokio::test]
    async fn test_fetch_rates_success() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "result": "success",
            "base_code": "USD",
            "conversion_rates": { "USD": 1, "EUR": 0.9213, "JPY": 151.62, "GBP": 0.7891 }
        });
        let mock = server
            .mock("GET", "/v6/test-key/latest/USD")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let table = source(&server, Some("test-key")).fetch_rates().await.unwrap();

        mock.assert_async().await;
        assert_eq!(table.len(), 4);
        assert_eq!(table.rate(Currency::EUR), Some(0.9213));
        assert_eq!(table.rate(Currency::USD), Some(1.0));
    }

    #[tokio::test]
    async fn test_fetch_rates_reported_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v6/bad-key/latest/USD")
            .with_status(200)
            .with_body(json!({ "result": "error", "error-type": "invalid-key" }).to_string())
            .create_async()
            .await;

        let err = source(&server, Some("bad-key")).fetch_rates().await.unwrap_err();
        assert!(err.to_string().contains("invalid-key"));
    }

    #[tokio::test]
    async fn test_fetch_rates_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v6/test-key/latest/USD")
            .with_status(403)
            .with_body(json!({ "result": "error", "error-type": "inactive-account" }).to_string())
            .create_async()
            .await;

        let err = source(&server, Some("test-key")).fetch_rates().await.unwrap_err();
        assert!(err.to_string().contains("inactive-account"));
    }

    #[tokio::test]
    async fn test_fetch_rates_garbage_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v6/test-key/latest/USD")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = source(&server, Some("test-key")).fetch_rates().await.unwrap_err();
        assert!(matches!(err, ReportError::FxError(_)));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = source(&server, None).fetch_rates().await.unwrap_err();
        assert!(err.to_string().contains("no API key configured"));
        mock.assert_async().await;
    }
}
