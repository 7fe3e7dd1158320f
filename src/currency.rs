//! Currency types and ticker suffix resolution

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency enumeration (ISO 4217 codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Danish Krone
    DKK,
    /// Swedish Krona
    SEK,
    /// Norwegian Krone
    NOK,
    /// Swiss Franc
    CHF,
    /// Canadian Dollar
    CAD,
    /// Australian Dollar
    AUD,
    /// Hong Kong Dollar
    HKD,
}

impl Currency {
    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::DKK => "DKK",
            Currency::SEK => "SEK",
            Currency::NOK => "NOK",
            Currency::CHF => "CHF",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::HKD => "HKD",
        }
    }

    /// Parse from ISO code
    pub fn from_code(code: &str) -> Option<Self> {
        Currency::all()
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(code))
    }

    /// Get all supported currencies
    pub fn all() -> [Currency; 11] {
        [
            Currency::USD,
            Currency::EUR,
            Currency::GBP,
            Currency::JPY,
            Currency::DKK,
            Currency::SEK,
            Currency::NOK,
            Currency::CHF,
            Currency::CAD,
            Currency::AUD,
            Currency::HKD,
        ]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
            .ok_or_else(|| ReportError::ParseError(format!("Unknown currency: {}", s)))
    }
}

/// One exchange suffix and the currency its listings trade in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    pub suffix: String,
    pub currency: Currency,
}

impl SuffixRule {
    pub fn new(suffix: impl Into<String>, currency: Currency) -> Self {
        Self {
            suffix: suffix.into(),
            currency,
        }
    }
}

/// Ordered suffix table. Lookup walks the rules in order and the first
/// suffix the ticker ends with wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixTable {
    rules: Vec<SuffixRule>,
}

impl SuffixTable {
    pub fn new(rules: Vec<SuffixRule>) -> Self {
        Self { rules }
    }

    /// Exchanges covered by the default ticker universe
    pub fn exchanges() -> Self {
        Self::new(vec![
            SuffixRule::new(".T", Currency::JPY),  // Tokyo
            SuffixRule::new(".DE", Currency::EUR), // Xetra / Frankfurt
            SuffixRule::new(".L", Currency::GBP),  // London
            SuffixRule::new(".MI", Currency::EUR), // Milan
            SuffixRule::new(".CO", Currency::DKK), // Copenhagen
            SuffixRule::new(".AS", Currency::EUR), // Amsterdam
            SuffixRule::new(".ST", Currency::SEK), // Stockholm
            SuffixRule::new(".PA", Currency::EUR), // Paris
            SuffixRule::new(".BR", Currency::EUR), // Brussels
        ])
    }

    /// Append rules after the existing ones, so existing suffixes keep precedence
    pub fn extend(&mut self, rules: impl IntoIterator<Item = SuffixRule>) {
        self.rules.extend(rules);
    }

    pub fn rules(&self) -> &[SuffixRule] {
        &self.rules
    }

    pub fn lookup(&self, ticker: &str) -> Option<Currency> {
        self.rules
            .iter()
            .find(|rule| ticker.ends_with(rule.suffix.as_str()))
            .map(|rule| rule.currency)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for SuffixTable {
    fn default() -> Self {
        Self::exchanges()
    }
}

/// Maps a ticker to its trading currency
#[derive(Debug, Clone)]
pub struct CurrencyResolver {
    table: SuffixTable,
    default_currency: Currency,
}

impl CurrencyResolver {
    pub fn new(table: SuffixTable) -> Self {
        Self {
            table,
            default_currency: Currency::USD,
        }
    }

    /// Currency of a ticker; unsuffixed or unknown suffixes fall back to USD
    pub fn resolve(&self, ticker: &str) -> Currency {
        self.table.lookup(ticker).unwrap_or(self.default_currency)
    }

    pub fn table(&self) -> &SuffixTable {
        &self.table
    }
}

impl Default for CurrencyResolver {
    fn default() -> Self {
        Self::new(SuffixTable::default())
    }
}
