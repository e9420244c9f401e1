use anyhow::Result;
use async_trait::async_trait;

/// A stock's latest summary as reported by the quote provider.
#[derive(Debug, Clone)]
pub struct Quote {
    pub name: String,
    pub stock_symbol: String,
    pub price_usd: f64,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}
