use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

use crate::currency_provider::{ExchangeRate, RateProvider};

// CurrencyApiProvider implementation for RateProvider, backed by the
// fawazahmed0 currency-api CDN snapshots.
pub struct CurrencyApiProvider {
    base_url: String,
}

impl CurrencyApiProvider {
    pub fn new(base_url: &str) -> Self {
        CurrencyApiProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl RateProvider for CurrencyApiProvider {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<ExchangeRate> {
        let from = from.to_lowercase();
        let to = to.to_lowercase();
        let url = format!("{}/latest/currencies/{}/{}.json", self.base_url, from, to);
        debug!("Requesting exchange rate from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("stockwatch/1.0")
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}/{}", e, from, to))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}/{}",
                response.status(),
                from,
                to
            ));
        }

        let text = response.text().await?;
        let body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}/{}: {}", from, to, e))?;

        // The rate lives under the requested target code, never a fixed key.
        let rate = body
            .get(&to)
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| {
                anyhow!("No rate found under key '{}' in response for {}/{}", to, from, to)
            })?;

        Ok(ExchangeRate::new(&to, rate)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(from: &str, to: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/latest/currencies/{from}/{to}.json");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_response = r#"{"date": "2024-05-01", "eur": 0.92}"#;
        let mock_server = create_mock_server("usd", "eur", mock_response).await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let rate = provider.fetch_rate("usd", "eur").await.unwrap();
        assert_eq!(rate.currency_code, "eur");
        assert_eq!(rate.rate, 0.92);
        assert_eq!(rate.column, "priceEUR");
    }

    #[tokio::test]
    async fn test_codes_are_lowercased_before_the_request() {
        let mock_response = r#"{"date": "2024-05-01", "dkk": 6.9}"#;
        let mock_server = create_mock_server("usd", "dkk", mock_response).await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let rate = provider.fetch_rate("USD", "DKK").await.unwrap();
        assert_eq!(rate.currency_code, "dkk");
        assert_eq!(rate.rate, 6.9);
    }

    #[tokio::test]
    async fn test_rate_is_read_under_the_requested_code() {
        // A response keyed by a different currency must not satisfy the request.
        let mock_response = r#"{"date": "2024-05-01", "eur": 0.92}"#;
        let mock_server = create_mock_server("usd", "dkk", mock_response).await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let result = provider.fetch_rate("usd", "dkk").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate found under key 'dkk' in response for usd/dkk"
        );
    }

    #[tokio::test]
    async fn test_rate_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest/currencies/usd/eur.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let result = provider.fetch_rate("usd", "eur").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency pair: usd/eur"
        );
    }

    #[tokio::test]
    async fn test_rate_api_malformed_response() {
        let mock_server = create_mock_server("usd", "eur", "not json").await;
        let provider = CurrencyApiProvider::new(&mock_server.uri());

        let result = provider.fetch_rate("usd", "eur").await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for usd/eur")
        );
    }
}
