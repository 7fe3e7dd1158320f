//! Yahoo Finance data source integration
//!
//! Uses the chart API with a one-day range and keeps only the latest close.

use super::PriceSource;
use crate::error::{ReportError, Result};
use crate::types::DailyClose;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart source (no API key required)
pub struct YahooChartSource {
    base_url: Url,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_timezone_name: Option<String>,
    #[serde(default)]
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooChartSource {
    /// Create a new Yahoo Finance data source
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(YAHOO_BASE_URL, timeout)
    }

    /// Create a source against a custom endpoint
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| ReportError::DataError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into();
        let base_url = Url::parse(&base_url).map_err(|e| {
            ReportError::ConfigError(format!("Invalid market data URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ReportError::ConfigError(format!(
                "Invalid market data URL '{}'",
                base_url
            )));
        }

        Ok(Self { base_url, client })
    }

    /// Chart endpoint for `ticker`, which is percent-encoded as one path segment
    fn chart_url(&self, ticker: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", ticker]);
        }
        url
    }

    async fn fetch_chart(&self, ticker: &str) -> Result<Option<DailyClose>> {
        let url = self.chart_url(ticker);

        let response = self
            .client
            .get(url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| ReportError::DataError(format!("HTTP request failed: {}", e)))?;

        // Unknown or delisted symbols come back as 404
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ReportError::DataError(format!(
                "Yahoo Finance returned error: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ReportError::DataError(format!("Failed to read response: {}", e)))?;

        parse_chart(&text)
    }
}

impl PriceSource for YahooChartSource {
    async fn fetch_latest(&self, ticker: &str) -> Result<Option<DailyClose>> {
        self.fetch_chart(ticker).await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

fn parse_chart(text: &str) -> Result<Option<DailyClose>> {
    let envelope: ChartEnvelope = serde_json::from_str(text)
        .map_err(|e| ReportError::DataError(format!("JSON parse error: {}", e)))?;

    if let Some(error) = envelope.chart.error {
        if error.code == "Not Found" {
            return Ok(None);
        }
        return Err(ReportError::DataError(format!(
            "Yahoo Finance error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(None);
    };

    let closes = result
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or_default();

    // Latest timestamp with a usable close
    let latest = result
        .timestamp
        .iter()
        .zip(closes.iter())
        .rev()
        .find_map(|(ts, close)| (*close).filter(|c| c.is_finite()).map(|c| (*ts, c)));

    let Some((timestamp, close)) = latest else {
        return Ok(None);
    };

    let date = session_date(timestamp, &result.meta)?;
    let mut daily = DailyClose::new(date, close);
    if let Some(currency) = result.meta.currency {
        daily = daily.with_provider_currency(currency);
    }
    Ok(Some(daily))
}

/// Trading-session date of `timestamp` in the exchange's own time zone
fn session_date(timestamp: i64, meta: &ChartMeta) -> Result<NaiveDate> {
    let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| ReportError::DataError(format!("Invalid timestamp: {}", timestamp)))?;

    if let Some(tz) = meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse::<Tz>().ok())
    {
        return Ok(utc.with_timezone(&tz).date_naive());
    }

    if let Some(offset) = meta.gmtoffset.and_then(FixedOffset::east_opt) {
        return Ok(utc.with_timezone(&offset).date_naive());
    }

    Ok(utc.date_naive())
}
