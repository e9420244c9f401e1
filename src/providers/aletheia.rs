use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::quote_provider::{Quote, QuoteProvider};

// AletheiaProvider implementation for QuoteProvider
pub struct AletheiaProvider {
    base_url: String,
    api_key: String,
}

impl AletheiaProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        AletheiaProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct StockDataResponse {
    #[serde(rename = "Summary")]
    summary: Option<StockSummary>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct StockSummary {
    name: String,
    stock_symbol: String,
    price: f64,
}

#[async_trait]
impl QuoteProvider for AletheiaProvider {
    #[instrument(
        name = "AletheiaQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}/StockData?symbol={}&summary=true", self.base_url, symbol);
        debug!("Requesting quote data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("stockwatch/1.0")
            .build()?;
        let response = client
            .get(&url)
            .header("key", &self.api_key)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let data = response
            .json::<StockDataResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse quote response for {}: {}", symbol, e))?;
        let summary = data
            .summary
            .ok_or_else(|| anyhow!("No summary data found for symbol: {}", symbol))?;

        Ok(Quote {
            name: summary.name,
            stock_symbol: summary.stock_symbol,
            price_usd: summary.price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/StockData"))
            .and(query_param("symbol", symbol))
            .and(query_param("summary", "true"))
            .and(header("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_response = r#"{
            "Summary": {
                "Name": "Microsoft Corporation",
                "StockSymbol": "MSFT",
                "Price": 425.52
            }
        }"#;

        let mock_server = create_mock_server("msft", mock_response).await;
        let provider = AletheiaProvider::new(&mock_server.uri(), "test-key");

        let quote = provider.fetch_quote("msft").await.unwrap();
        assert_eq!(quote.name, "Microsoft Corporation");
        assert_eq!(quote.stock_symbol, "MSFT");
        assert_eq!(quote.price_usd, 425.52);
    }

    #[tokio::test]
    async fn test_missing_summary_data() {
        let mock_response = r#"{"AboutTheCompany": {}}"#;
        let mock_server = create_mock_server("msft", mock_response).await;
        let provider = AletheiaProvider::new(&mock_server.uri(), "test-key");

        let result = provider.fetch_quote("msft").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No summary data found for symbol: msft"
        );
    }

    #[tokio::test]
    async fn test_quote_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/StockData"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;
        let provider = AletheiaProvider::new(&mock_server.uri(), "bad-key");

        let result = provider.fetch_quote("msft").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 401 Unauthorized for symbol: msft"
        );
    }

    #[tokio::test]
    async fn test_quote_api_malformed_response() {
        let mock_server = create_mock_server("msft", "not json").await;
        let provider = AletheiaProvider::new(&mock_server.uri(), "test-key");

        let result = provider.fetch_quote("msft").await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse quote response for msft")
        );
    }
}
