//! # stock-fx-report
//!
//! Fetches the latest closing price for a list of tickers listed on several
//! exchanges, converts every price to USD with current FX rates and writes a
//! timestamped spreadsheet.
//!
//! A failure for one ticker never aborts the batch: it yields a record with
//! empty fields and a [`types::RecordStatus`] saying why.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stock_fx_report::prelude::*;
//! use std::time::Duration;
//!
//! # async fn run() -> stock_fx_report::error::Result<()> {
//! let timeout = Duration::from_secs(30);
//! let prices = YahooChartSource::new(timeout)?;
//! let rates = ExchangeRateApiSource::new(Some("api-key".to_string()), timeout)?;
//!
//! let runner = BatchRunner::new(prices, rates);
//! let report = runner.run(&["7011.T".to_string(), "WISE.L".to_string()]).await;
//!
//! let writer = ReportWriter::new(".", OutputFormat::Xlsx);
//! writer.publish(&report.records, chrono::Local::now().naive_local())?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod fx;
pub mod report;
pub mod sources;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::batch::{BatchReport, BatchRunner, BatchSummary};
    pub use crate::config::AppConfig;
    pub use crate::convert::{Conversion, ConversionError, PriceConverter, QuoteConvention};
    pub use crate::currency::{Currency, CurrencyResolver, SuffixRule, SuffixTable};
    pub use crate::error::{ReportError, Result};
    pub use crate::fx::{ExchangeRateApiSource, ExchangeRateTable, RateSource};
    pub use crate::report::{render_table, report_filename, OutputFormat, ReportWriter};
    pub use crate::sources::{PriceSource, YahooChartSource};
    pub use crate::types::{DailyClose, PriceRecord, RecordStatus};
}
