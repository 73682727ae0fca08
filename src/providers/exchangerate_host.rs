use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::config::ExchangeRateProviderConfig;
use crate::core::currency::{RateSource, RateTable, RatesSnapshot, SymbolDirectory};

// ExchangeRateHostProvider implementation for RateSource
pub struct ExchangeRateHostProvider {
    base_url: String,
    access_key: Option<String>,
    retries: usize,
    retry_delay_ms: u64,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateHostProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: None,
            retries: 0,
            retry_delay_ms: 0,
        }
    }

    pub fn from_config(config: &ExchangeRateProviderConfig) -> Self {
        ExchangeRateHostProvider {
            access_key: config.access_key.clone(),
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
            ..Self::new(&config.base_url)
        }
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, endpoint))
            .map_err(|e| anyhow!("Invalid provider URL {}: {}", self.base_url, e))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(key) = &self.access_key {
                query.append_pair("access_key", key);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!("Requesting {} from {}", what, url.path());

        let client = reqwest::Client::builder()
            .user_agent("fxstudio/1.0")
            .build()?;
        let response = with_retry(
            || client.get(url.clone()).send(),
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for {}", e, what))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for {}",
                response.status(),
                what
            ));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", what, e))
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

fn check_api_error(success: Option<bool>, error: Option<ApiError>, what: &str) -> Result<()> {
    if success == Some(false) || error.is_some() {
        let message = error
            .and_then(|e| e.info.or(e.kind))
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(anyhow!("API error for {}: {}", what, message));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    success: Option<bool>,
    error: Option<ApiError>,
    symbols: Option<HashMap<String, SymbolEntry>>,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    success: Option<bool>,
    error: Option<ApiError>,
    base: Option<String>,
    date: Option<NaiveDate>,
    rates: Option<HashMap<String, Option<f64>>>,
}

#[async_trait]
impl RateSource for ExchangeRateHostProvider {
    #[instrument(name = "SymbolsFetch", skip(self))]
    async fn fetch_symbols(&self) -> Result<SymbolDirectory> {
        let what = "currency symbols";
        let url = self.endpoint_url("symbols", &[])?;
        let data: SymbolsResponse = self.get_json(url, what).await?;
        check_api_error(data.success, data.error, what)?;

        let symbols: SymbolDirectory = data
            .symbols
            .unwrap_or_default()
            .into_iter()
            .map(|(code, entry)| (code, entry.description.unwrap_or_default()))
            .collect();
        debug!("Received {} currency symbols", symbols.len());
        Ok(symbols)
    }

    #[instrument(name = "RatesFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RatesSnapshot> {
        let what = format!("rates with base {base}");
        let url = self.endpoint_url("latest", &[("base", base)])?;
        let data: LatestResponse = self.get_json(url, &what).await?;
        check_api_error(data.success, data.error, &what)?;

        let raw = data
            .rates
            .ok_or_else(|| anyhow!("No rates returned for base currency: {}", base))?;
        let rates: RateTable = raw
            .into_iter()
            .filter_map(|(code, rate)| rate.map(|r| (code, r)))
            .collect();

        let snapshot_base = data.base.unwrap_or_else(|| base.to_string());
        if snapshot_base != base {
            debug!("Requested base {base}, provider answered with {snapshot_base}");
        }
        debug!("Received {} rates for {}", rates.len(), snapshot_base);

        Ok(RatesSnapshot {
            base: snapshot_base,
            rates,
            date: data.date,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(
        request_path: &str,
        status: u16,
        mock_response: &str,
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_symbols_fetch() {
        let mock_response = r#"{
            "success": true,
            "symbols": {
                "EUR": {"description": "Euro", "code": "EUR"},
                "USD": {"description": "United States Dollar", "code": "USD"},
                "XXX": {"code": "XXX"}
            }
        }"#;
        let mock_server = create_mock_server("/symbols", 200, mock_response).await;

        let provider = ExchangeRateHostProvider::new(&mock_server.uri());
        let symbols = provider.fetch_symbols().await.unwrap();
        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols.description("USD"), "United States Dollar");
        assert_eq!(symbols.description("XXX"), "");
    }

    #[tokio::test]
    async fn test_missing_symbols_is_empty_directory() {
        let mock_server = create_mock_server("/symbols", 200, "{}").await;

        let provider = ExchangeRateHostProvider::new(&mock_server.uri());
        let symbols = provider.fetch_symbols().await.unwrap();
        assert!(symbols.is_empty());
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "base": "USD",
            "date": "2024-03-01",
            "rates": {"EUR": 0.92, "GBP": 0.79, "NUL": null}
        }"#;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let provider = ExchangeRateHostProvider::new(&mock_server.uri());
        let snapshot = provider.fetch_rates("USD").await.unwrap();
        assert_eq!(snapshot.base, "USD");
        assert_eq!(snapshot.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(snapshot.rates.len(), 2);
        assert_eq!(snapshot.rates.rate("EUR"), Some(0.92));
        assert!(!snapshot.rates.contains("NUL"));
    }

    #[tokio::test]
    async fn test_access_key_is_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "EUR"))
            .and(query_param("access_key", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rates": {"USD": 1.1}}"#))
            .mount(&mock_server)
            .await;

        let config = ExchangeRateProviderConfig {
            base_url: format!("{}/", mock_server.uri()),
            access_key: Some("abc123".to_string()),
            retries: 0,
            retry_delay_ms: 0,
        };
        let provider = ExchangeRateHostProvider::from_config(&config);
        let snapshot = provider.fetch_rates("EUR").await.unwrap();
        assert_eq!(snapshot.base, "EUR");
        assert_eq!(snapshot.rates.rate("USD"), Some(1.1));
        assert!(snapshot.date.is_none());
    }

    #[tokio::test]
    async fn test_missing_rates_is_an_error() {
        let mock_server = create_mock_server("/latest", 200, r#"{"base": "USD"}"#).await;

        let provider = ExchangeRateHostProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rates returned for base currency: USD"
        );
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_response = r#"{
            "success": false,
            "error": {"code": 101, "type": "missing_access_key", "info": "You have not supplied an API Access Key."}
        }"#;
        let mock_server = create_mock_server("/latest", 200, mock_response).await;

        let provider = ExchangeRateHostProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "API error for rates with base USD: You have not supplied an API Access Key."
        );
    }

    #[tokio::test]
    async fn test_http_error_response() {
        let mock_server = create_mock_server("/latest", 500, "").await;

        let provider = ExchangeRateHostProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for rates with base USD"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server("/symbols", 200, r#"{"symbols": ["EUR"]}"#).await;

        let provider = ExchangeRateHostProvider::new(&mock_server.uri());
        let result = provider.fetch_symbols().await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for currency symbols")
        );
    }
}
