//! USD-based exchange rate table

use crate::currency::Currency;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Rates relative to USD: `rates["EUR"] == 0.92` means 1 USD = 0.92 EUR.
///
/// Keys are the provider's currency codes, so the table can hold codes
/// that `Currency` does not model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    rates: HashMap<String, f64>,
}

impl ExchangeRateTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table, dropping non-finite and non-positive rates
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut rates = HashMap::new();
        for (code, rate) in pairs {
            let code = code.into().to_uppercase();
            if !rate.is_finite() || rate <= 0.0 {
                log::warn!("Ignoring invalid exchange rate for {}: {}", code, rate);
                continue;
            }
            rates.insert(code, rate);
        }
        Self { rates }
    }

    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rate_for_code(currency.code())
    }

    pub fn rate_for_code(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rates sorted by currency code
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .rates
            .iter()
            .map(|(code, rate)| (code.as_str(), *rate))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
