//! Foreign Exchange (FX) rates
//!
//! Rates are fetched once per run from a remote provider and read-only
//! afterwards.
//!
//! # Components
//!
//! - **table**: `ExchangeRateTable`, "1 USD = rate units of currency"
//! - **exchangerate_api**: client for exchangerate-api.com
//!
//! # Example
//!
//! ```rust
//! use stock_fx_report::fx::ExchangeRateTable;
//! use stock_fx_report::currency::Currency;
//!
//! let table = ExchangeRateTable::from_pairs([("EUR", 0.92), ("JPY", 151.3)]);
//! assert_eq!(table.rate(Currency::EUR), Some(0.92));
//! assert_eq!(table.rate(Currency::SEK), None);
//! ```

pub mod exchangerate_api;
pub mod table;

pub use exchangerate_api::ExchangeRateApiSource;
pub use table::ExchangeRateTable;

use crate::error::Result;
use std::future::Future;

/// Trait for FX rate providers
pub trait RateSource: Send + Sync {
    /// Fetch the current USD-based rate table
    fn fetch_rates(&self) -> impl Future<Output = Result<ExchangeRateTable>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Fetch rates, degrading to an empty table on any failure.
///
/// Returns the table together with the failure message, if there was one,
/// so callers can surface it without parsing logs.
pub async fn fetch_rates_or_empty<R: RateSource>(source: &R) -> (ExchangeRateTable, Option<String>) {
    match source.fetch_rates().await {
        Ok(table) => {
            log::info!(
                "Fetched {} exchange rates from {}",
                table.len(),
                source.name()
            );
            (table, None)
        }
        Err(e) => {
            log::warn!(
                "Failed to fetch exchange rates from {}: {}. Non-USD prices will be unconverted",
                source.name(),
                e
            );
            (ExchangeRateTable::empty(), Some(e.to_string()))
        }
    }
}
