//! Local-currency to USD price conversion

use crate::currency::Currency;
use crate::fx::ExchangeRateTable;
use crate::types::Price;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A currency whose listings are quoted in a minor unit.
///
/// London quotes most equities in pence, so the default set holds GBP / 100.
/// Exchanges do change quotation conventions, which is why this is data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteConvention {
    pub currency: Currency,
    pub divisor: f64,
}

impl QuoteConvention {
    pub fn new(currency: Currency, divisor: f64) -> Self {
        Self { currency, divisor }
    }

    /// London Stock Exchange: prices in pence
    pub fn london_pence() -> Self {
        Self::new(Currency::GBP, 100.0)
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::london_pence()]
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub currency: Currency,
    /// Price after quote-convention scaling, before FX
    pub local_price: Price,
    /// Units of `currency` per USD
    pub rate: f64,
    pub usd_price: Price,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("No exchange rate found for {currency}")]
    MissingRate { currency: Currency },
}

/// Converts provider closes into USD
#[derive(Debug, Clone)]
pub struct PriceConverter {
    conventions: Vec<QuoteConvention>,
}

impl PriceConverter {
    pub fn new(conventions: Vec<QuoteConvention>) -> Self {
        Self { conventions }
    }

    /// Apply the quote convention of `currency`, if any
    pub fn scale(&self, price: Price, currency: Currency) -> Price {
        match self.conventions.iter().find(|c| c.currency == currency) {
            Some(convention) => price / convention.divisor,
            None => price,
        }
    }

    /// Convert `price` (quoted in `currency`) to USD.
    ///
    /// Scaling happens before the USD shortcut and before the rate lookup.
    pub fn convert(
        &self,
        price: Price,
        ticker: &str,
        currency: Currency,
        rates: &ExchangeRateTable,
    ) -> Result<Conversion, ConversionError> {
        let local_price = self.scale(price, currency);

        if currency == Currency::USD {
            return Ok(Conversion {
                currency,
                local_price,
                rate: 1.0,
                usd_price: local_price,
            });
        }

        let Some(rate) = rates.rate(currency) else {
            log::warn!("No exchange rate found for {} ({})", currency, ticker);
            return Err(ConversionError::MissingRate { currency });
        };

        Ok(Conversion {
            currency,
            local_price,
            rate,
            usd_price: local_price / rate,
        })
    }
}

impl Default for PriceConverter {
    fn default() -> Self {
        Self::new(QuoteConvention::defaults())
    }
}
