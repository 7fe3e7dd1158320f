//! Run configuration
//!
//! Loaded from TOML (`--config <path>` or `~/.stock-fx-report/config.toml`),
//! then overridden by environment and command-line values in the binary.
//!
//! ```toml
//! tickers = ["7011.T", "WISE.L", "TSM"]
//! output_dir = "reports"
//! format = "xlsx"
//! request_timeout_secs = 30
//!
//! [fx]
//! api_key = "..."
//!
//! [[suffixes]]
//! suffix = ".OL"
//! currency = "NOK"
//!
//! [[quote_conventions]]
//! currency = "GBP"
//! divisor = 100.0
//! ```

use crate::convert::{PriceConverter, QuoteConvention};
use crate::currency::{CurrencyResolver, SuffixRule, SuffixTable};
use crate::error::{ReportError, Result};
use crate::fx::exchangerate_api::{usable_api_key, EXCHANGERATE_API_BASE_URL};
use crate::report::OutputFormat;
use crate::sources::yahoo::YAHOO_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the exchangerate-api key
pub const API_KEY_ENV: &str = "EXCHANGERATE_API_KEY";

/// Ticker universe reported when no list is configured
pub const DEFAULT_TICKERS: [&str; 55] = [
    "2802.T", "3064.T", "3697.T", "3994.T", "4478.T", "4755.T", "6027.T",
    "6501.T", "6544.T", "6857.T", "6920.T", "6951.T", "7011.T", "7747.T",
    "7979.T", "8306.T", "8316.T", "ACSO.L", "ADN1.DE", "ADYEN.AS", "AIXA.DE",
    "ALK-B.CO", "ASM.AS", "ASR", "AWE.L", "BA.L", "BC.MI", "BOKU.L",
    "BOOZT.ST", "CRSP", "DLG.MI", "FUTR.L", "ING", "MBLY", "MELI", "MRX.DE",
    "MTLS", "NEM.DE", "OCDO.L", "ONWD.BR", "OPRA", "RAY-B.ST", "RHM.DE",
    "SFTBY", "SHEL", "SIE.DE", "SIX2.DE", "SPOT", "SU.PA", "TOBII.ST", "TSM",
    "VIT-B.ST", "WISE.L", "WOSG.L", "ZAL.DE",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: EXCHANGERATE_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_BASE_URL.to_string(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub request_timeout_secs: u64,
    pub fx: FxConfig,
    pub market_data: MarketDataConfig,
    /// Extra suffix rules, checked after the built-in exchanges
    pub suffixes: Vec<SuffixRule>,
    /// Use only `suffixes`, dropping the built-in exchange table
    pub replace_suffixes: bool,
    pub quote_conventions: Vec<QuoteConvention>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            output_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            request_timeout_secs: 30,
            fx: FxConfig::default(),
            market_data: MarketDataConfig::default(),
            suffixes: Vec::new(),
            replace_suffixes: false,
            quote_conventions: QuoteConvention::defaults(),
        }
    }
}

impl AppConfig {
    /// `~/.stock-fx-report/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".stock-fx-report").join("config.toml"))
    }

    /// Load from an explicit path, else the default location, else defaults.
    ///
    /// An explicit path that is missing or malformed is an error; a malformed
    /// file at the default location is only warned about.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            if !config_path.exists() {
                return Err(ReportError::ConfigError(format!(
                    "Config file not found: {}",
                    config_path.display()
                )));
            }
            return Self::from_file(config_path);
        }

        if let Some(default_path) = Self::default_path() {
            if default_path.exists() {
                match Self::from_file(&default_path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!(
                            "Ignoring config at {}: {}",
                            default_path.display(),
                            e
                        );
                    }
                }
            }
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(ReportError::ConfigError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(rule) = self.suffixes.iter().find(|r| !r.suffix.starts_with('.')) {
            return Err(ReportError::ConfigError(format!(
                "Suffix '{}' must start with '.'",
                rule.suffix
            )));
        }

        if let Some(convention) = self
            .quote_conventions
            .iter()
            .find(|c| !c.divisor.is_finite() || c.divisor <= 0.0)
        {
            return Err(ReportError::ConfigError(format!(
                "Quote divisor for {} must be positive, got {}",
                convention.currency, convention.divisor
            )));
        }

        Ok(())
    }

    /// API key, treating the sample placeholder as unset
    pub fn api_key(&self) -> Option<&str> {
        self.fx.api_key.as_deref().and_then(usable_api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn suffix_table(&self) -> SuffixTable {
        if self.replace_suffixes {
            return SuffixTable::new(self.suffixes.clone());
        }
        let mut table = SuffixTable::exchanges();
        table.extend(self.suffixes.iter().cloned());
        table
    }

    pub fn resolver(&self) -> CurrencyResolver {
        CurrencyResolver::new(self.suffix_table())
    }

    pub fn converter(&self) -> PriceConverter {
        PriceConverter::new(self.quote_conventions.clone())
    }
}
