//! Core types shared by the fetchers, the converter and the report writer

use crate::convert::Conversion;
use crate::currency::Currency;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker symbol, optionally carrying an exchange suffix (".T", ".L", ...)
pub type Symbol = String;

/// Price type (using f64 for precision)
pub type Price = f64;

/// Latest daily close returned by a market-data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Price,
    /// Quote currency as reported by the provider, e.g. "GBp" for pence
    #[serde(default)]
    pub provider_currency: Option<String>,
}

impl DailyClose {
    pub fn new(date: NaiveDate, close: Price) -> Self {
        Self {
            date,
            close,
            provider_currency: None,
        }
    }

    pub fn with_provider_currency(mut self, currency: impl Into<String>) -> Self {
        self.provider_currency = Some(currency.into());
        self
    }
}

/// How a single ticker fared during a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordStatus {
    /// Price fetched and converted to USD
    Converted,
    /// Price fetched but no FX rate for its currency
    MissingRate { currency: Currency },
    /// Provider returned no rows for the ticker
    NoData,
    /// The provider call failed
    FetchFailed { reason: String },
}

impl RecordStatus {
    pub fn is_converted(&self) -> bool {
        matches!(self, RecordStatus::Converted)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Converted => write!(f, "converted"),
            RecordStatus::MissingRate { currency } => {
                write!(f, "no exchange rate for {}", currency)
            }
            RecordStatus::NoData => write!(f, "no data"),
            RecordStatus::FetchFailed { reason } => write!(f, "fetch failed: {}", reason),
        }
    }
}

/// One output row. Everything except the ticker and status may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub ticker: Symbol,
    /// Close as quoted by the provider (pence for London listings)
    pub close_local: Option<Price>,
    pub currency: Option<Currency>,
    /// Units of `currency` per USD
    pub fx_rate: Option<f64>,
    pub close_usd: Option<Price>,
    pub date: Option<NaiveDate>,
    pub status: RecordStatus,
}

impl PriceRecord {
    /// Fully populated record
    pub fn converted(ticker: &str, close: &DailyClose, conversion: &Conversion) -> Self {
        Self {
            ticker: ticker.to_string(),
            close_local: Some(close.close),
            currency: Some(conversion.currency),
            fx_rate: Some(conversion.rate),
            close_usd: Some(conversion.usd_price),
            date: Some(close.date),
            status: RecordStatus::Converted,
        }
    }

    /// Original price and currency kept, USD fields left empty
    pub fn missing_rate(ticker: &str, close: &DailyClose, currency: Currency) -> Self {
        Self {
            ticker: ticker.to_string(),
            close_local: Some(close.close),
            currency: Some(currency),
            fx_rate: None,
            close_usd: None,
            date: Some(close.date),
            status: RecordStatus::MissingRate { currency },
        }
    }

    /// Record with every price, currency and date field empty
    pub fn empty(ticker: &str, status: RecordStatus) -> Self {
        Self {
            ticker: ticker.to_string(),
            close_local: None,
            currency: None,
            fx_rate: None,
            close_usd: None,
            date: None,
            status,
        }
    }
}
