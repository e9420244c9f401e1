//! Exchange rate abstractions and the currency-code to column mapping.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;

/// A currency code was not a sequence of valid 3-letter codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidArgument(String);

impl InvalidArgument {
    pub fn new(message: impl Into<String>) -> Self {
        InvalidArgument(message.into())
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid argument: {}", self.0)
    }
}

impl std::error::Error for InvalidArgument {}

/// Maps a currency code to its converted-price column, e.g. "eur" -> "priceEUR".
///
/// Codes must be exactly three ASCII letters. Column names are only ever built
/// through this mapping, so they are safe to splice into SQL.
pub fn price_column(code: &str) -> Result<String, InvalidArgument> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(InvalidArgument::new(format!(
            "currency code must be three ASCII letters, got '{code}'"
        )));
    }
    Ok(format!("price{}", code.to_uppercase()))
}

/// A USD to target-currency rate as of the provider's latest snapshot.
#[derive(Debug, Clone)]
pub struct ExchangeRate {
    /// Lowercase 3-letter currency code.
    pub currency_code: String,
    pub rate: f64,
    /// Column the converted price lands in, derived from the code.
    pub column: String,
}

impl ExchangeRate {
    pub fn new(code: &str, rate: f64) -> Result<Self, InvalidArgument> {
        let currency_code = code.to_lowercase();
        let column = price_column(&currency_code)?;
        Ok(ExchangeRate {
            currency_code,
            rate,
            column,
        })
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<ExchangeRate>;
}

/// Fetches one rate per target code, concurrently, preserving request order.
///
/// The whole sequence is validated before the first request goes out; an empty
/// sequence or a malformed code fails with [`InvalidArgument`]. Conversion
/// downstream only runs once every requested rate is in hand.
pub async fn fetch_rates(
    provider: &dyn RateProvider,
    from: &str,
    codes: &[String],
) -> Result<Vec<ExchangeRate>> {
    if codes.is_empty() {
        return Err(InvalidArgument::new("at least one target currency is required").into());
    }
    for code in codes {
        price_column(&code.to_lowercase())?;
    }

    let fetches = codes.iter().map(|code| provider.fetch_rate(from, code));
    join_all(fetches).await.into_iter().collect()
}
