//! Batch orchestration
//!
//! One FX table per run, then every ticker strictly in order. A ticker's
//! failure only ever affects its own record.

use crate::convert::{ConversionError, PriceConverter};
use crate::currency::CurrencyResolver;
use crate::fx::{fetch_rates_or_empty, ExchangeRateTable, RateSource};
use crate::sources::PriceSource;
use crate::types::{PriceRecord, RecordStatus};
use serde::Serialize;

/// Counts of records per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub missing_rate: usize,
    pub no_data: usize,
    pub fetch_failed: usize,
}

/// Output of a batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One record per input ticker, in input order
    pub records: Vec<PriceRecord>,
    pub rates: ExchangeRateTable,
    /// Why the FX table is empty, if fetching it failed
    pub fx_error: Option<String>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.records.len(),
            ..Default::default()
        };
        for record in &self.records {
            match record.status {
                RecordStatus::Converted => summary.converted += 1,
                RecordStatus::MissingRate { .. } => summary.missing_rate += 1,
                RecordStatus::NoData => summary.no_data += 1,
                RecordStatus::FetchFailed { .. } => summary.fetch_failed += 1,
            }
        }
        summary
    }

    /// Records that did not end up with a USD price
    pub fn failures(&self) -> impl Iterator<Item = &PriceRecord> {
        self.records.iter().filter(|r| !r.status.is_converted())
    }
}

/// Runs the fetch, resolve, convert pipeline over a ticker list
pub struct BatchRunner<P, R> {
    prices: P,
    rates: R,
    resolver: CurrencyResolver,
    converter: PriceConverter,
}

impl<P: PriceSource, R: RateSource> BatchRunner<P, R> {
    pub fn new(prices: P, rates: R) -> Self {
        Self {
            prices,
            rates,
            resolver: CurrencyResolver::default(),
            converter: PriceConverter::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: CurrencyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_converter(mut self, converter: PriceConverter) -> Self {
        self.converter = converter;
        self
    }

    pub async fn run(&self, tickers: &[String]) -> BatchReport {
        self.run_with(tickers, |_| {}).await
    }

    /// Like `run`, calling `on_record` as each ticker finishes
    pub async fn run_with<F>(&self, tickers: &[String], mut on_record: F) -> BatchReport
    where
        F: FnMut(&PriceRecord),
    {
        let (rates, fx_error) = fetch_rates_or_empty(&self.rates).await;

        log::info!(
            "Fetching closing prices for {} tickers from {}",
            tickers.len(),
            self.prices.name()
        );

        let mut records = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let record = self.process_ticker(ticker, &rates).await;
            on_record(&record);
            records.push(record);
        }

        BatchReport {
            records,
            rates,
            fx_error,
        }
    }

    async fn process_ticker(&self, ticker: &str, rates: &ExchangeRateTable) -> PriceRecord {
        let close = match self.prices.fetch_latest(ticker).await {
            Ok(Some(close)) => close,
            Ok(None) => {
                log::warn!("No data found for {}", ticker);
                return PriceRecord::empty(ticker, RecordStatus::NoData);
            }
            Err(e) => {
                log::warn!("Error fetching data for {}: {}", ticker, e);
                return PriceRecord::empty(
                    ticker,
                    RecordStatus::FetchFailed {
                        reason: e.to_string(),
                    },
                );
            }
        };

        let currency = self.resolver.resolve(ticker);
        if let Some(provider) = close.provider_currency.as_deref() {
            if !provider.eq_ignore_ascii_case(currency.code()) {
                log::debug!(
                    "{} resolved to {} but provider quotes it in {}",
                    ticker,
                    currency,
                    provider
                );
            }
        }

        match self.converter.convert(close.close, ticker, currency, rates) {
            Ok(conversion) => PriceRecord::converted(ticker, &close, &conversion),
            Err(ConversionError::MissingRate { currency }) => {
                PriceRecord::missing_rate(ticker, &close, currency)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::error::{ReportError, Result};
    use crate::types::DailyClose;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Canned {
        Close(f64),
        Empty,
        Fail,
    }

    struct CannedPrices(HashMap<String, Canned>);

    impl CannedPrices {
        fn new(entries: Vec<(&str, Canned)>) -> Self {
            Self(
                entries
                    .into_iter()
                    .map(|(t, c)| (t.to_string(), c))
                    .collect(),
            )
        }
    }

    impl PriceSource for CannedPrices {
        async fn fetch_latest(&self, ticker: &str) -> Result<Option<DailyClose>> {
            let date = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
            match self.0.get(ticker) {
                Some(Canned::Close(close)) => Ok(Some(DailyClose::new(date, *close))),
                Some(Canned::Fail) => Err(ReportError::DataError("connection reset".to_string())),
                Some(Canned::Empty) | None => Ok(None),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct CannedRates {
        pairs: Option<Vec<(&'static str, f64)>>,
        calls: AtomicUsize,
    }

    impl CannedRates {
        fn new(pairs: Option<Vec<(&'static str, f64)>>) -> Self {
            Self {
                pairs,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RateSource for CannedRates {
        async fn fetch_rates(&self) -> Result<ExchangeRateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.pairs {
                Some(pairs) => Ok(ExchangeRateTable::from_pairs(pairs.clone())),
                None => Err(ReportError::FxError("invalid-key".to_string())),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn standard_prices() -> CannedPrices {
        CannedPrices::new(vec![
            ("7011.T", Canned::Close(3000.0)),
            ("WISE.L", Canned::Close(1000.0)),
            ("TSM", Canned::Close(187.5)),
            ("ALK-B.CO", Canned::Close(160.0)),
            ("MTLS", Canned::Empty),
            ("ZAL.DE", Canned::Fail),
        ])
    }

    fn standard_rates() -> CannedRates {
        CannedRates::new(Some(vec![("JPY", 150.0), ("GBP", 0.8), ("EUR", 0.9)]))
    }

    #[tokio::test]
    async fn test_one_record_per_ticker_in_order() {
        let runner = BatchRunner::new(standard_prices(), standard_rates());
        let input = tickers(&["ZAL.DE", "TSM", "MTLS", "7011.T", "WISE.L", "ALK-B.CO"]);

        let report = runner.run(&input).await;

        let output: Vec<&str> = report.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(output, vec!["ZAL.DE", "TSM", "MTLS", "7011.T", "WISE.L", "ALK-B.CO"]);
        assert!(report.fx_error.is_none());
    }

    #[tokio::test]
    async fn test_record_contents() {
        let runner = BatchRunner::new(standard_prices(), standard_rates());
        let report = runner
            .run(&tickers(&["7011.T", "WISE.L", "TSM", "ALK-B.CO", "MTLS", "ZAL.DE"]))
            .await;
        let r = &report.records;

        assert_eq!(r[0].close_usd, Some(20.0));
        assert_eq!(r[0].fx_rate, Some(150.0));
        assert_eq!(r[0].currency, Some(Currency::JPY));

        // pence: 1000p = 10 GBP = 12.5 USD
        assert_eq!(r[1].close_local, Some(1000.0));
        assert_eq!(r[1].close_usd, Some(12.5));

        assert_eq!(r[2].close_usd, r[2].close_local);
        assert_eq!(r[2].fx_rate, Some(1.0));

        assert_eq!(r[3].close_local, Some(160.0));
        assert_eq!(r[3].currency, Some(Currency::DKK));
        assert!(r[3].close_usd.is_none());
        assert!(r[3].fx_rate.is_none());
        assert!(r[3].date.is_some());

        assert_eq!(r[4], PriceRecord::empty("MTLS", RecordStatus::NoData));
        assert!(matches!(r[5].status, RecordStatus::FetchFailed { .. }));
        assert!(r[5].close_local.is_none());
    }

    #[tokio::test]
    async fn test_fx_failure_keeps_usd_tickers() {
        let runner = BatchRunner::new(standard_prices(), CannedRates::new(None));
        let report = runner.run(&tickers(&["7011.T", "TSM", "WISE.L"])).await;

        assert!(report.rates.is_empty());
        assert!(report.fx_error.as_deref().unwrap().contains("invalid-key"));

        assert!(report.records[0].close_usd.is_none());
        assert_eq!(
            report.records[0].status,
            RecordStatus::MissingRate {
                currency: Currency::JPY
            }
        );
        assert_eq!(report.records[1].close_usd, Some(187.5));
        assert_eq!(report.records[1].fx_rate, Some(1.0));
        assert!(report.records[2].fx_rate.is_none());
    }

    #[tokio::test]
    async fn test_missing_ticker_does_not_affect_neighbours() {
        let runner = BatchRunner::new(standard_prices(), standard_rates());
        let with_gap = runner.run(&tickers(&["TSM", "MTLS", "7011.T"])).await;
        let without_gap = runner.run(&tickers(&["TSM", "7011.T"])).await;

        assert_eq!(with_gap.records[0], without_gap.records[0]);
        assert_eq!(with_gap.records[2], without_gap.records[1]);
    }

    #[tokio::test]
    async fn test_summary_and_callback() {
        let runner = BatchRunner::new(standard_prices(), standard_rates());
        let mut seen = Vec::new();
        let report = runner
            .run_with(
                &tickers(&["7011.T", "WISE.L", "TSM", "ALK-B.CO", "MTLS", "ZAL.DE"]),
                |record| seen.push(record.ticker.clone()),
            )
            .await;

        assert_eq!(seen.len(), 6);
        assert_eq!(
            report.summary(),
            BatchSummary {
                total: 6,
                converted: 3,
                missing_rate: 1,
                no_data: 1,
                fetch_failed: 1,
            }
        );
        assert_eq!(report.failures().count(), 3);
    }

    #[tokio::test]
    async fn test_rates_fetched_once_per_run() {
        let runner = BatchRunner::new(standard_prices(), standard_rates());
        let input = tickers(&["7011.T", "WISE.L", "TSM", "ALK-B.CO", "MTLS", "ZAL.DE"]);

        runner.run(&input).await;
        assert_eq!(runner.rates.calls.load(Ordering::SeqCst), 1);

        runner.run(&input).await;
        assert_eq!(runner.rates.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_ticker_list() {
        let runner = BatchRunner::new(standard_prices(), standard_rates());
        let report = runner.run(&[]).await;
        assert!(report.records.is_empty());
        assert_eq!(report.summary().total, 0);
    }
}
