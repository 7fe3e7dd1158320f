//! Market-data sources
//!
//! - Yahoo Finance: latest daily close from the chart API

pub mod yahoo;

pub use yahoo::YahooChartSource;

use crate::error::Result;
use crate::types::DailyClose;
use std::future::Future;

/// Trait for end-of-day price providers
pub trait PriceSource: Send + Sync {
    /// Latest daily close for `ticker`.
    ///
    /// `Ok(None)` means the provider has no rows for the ticker; `Err` means
    /// the call itself failed.
    fn fetch_latest(
        &self,
        ticker: &str,
    ) -> impl Future<Output = Result<Option<DailyClose>>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}
