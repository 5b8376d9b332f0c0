use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{RateError, RateProvider};
use crate::domain::{RateQuote, RateSource};

const PROVIDER_ID: &str = "HTTP";

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body returned by the rate service.
#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(default)]
    rate: Value,
    #[serde(default)]
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    title: Option<String>,
    uri: Option<String>,
}

/// Rate provider backed by a JSON endpoint.
///
/// The endpoint answers a plain GET with
/// `{"rate": 123.45, "sources": [{"title": "...", "uri": "..."}]}`.
/// `rate` may be a number, a numeric string, or null.
pub struct HttpRateProvider {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpRateProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.into(),
            api_key: None,
        }
    }

    /// Send the key as a bearer token on every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn lookup(&self) -> Result<RateQuote, RateError> {
        let mut request = self.client.get(&self.url).header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        debug!(url = %self.url, "requesting exchange rate");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_quote(&body)
    }
}

/// Parse a rate service response body into a quote.
pub fn parse_quote(body: &str) -> Result<RateQuote, RateError> {
    let response: RateResponse =
        serde_json::from_str(body).map_err(|e| RateError::InvalidResponse(e.to_string()))?;

    let rate = match response.rate {
        Value::Null => None,
        Value::Number(n) => Some(
            Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .map_err(|e| RateError::InvalidResponse(format!("rate {}: {}", n, e)))?,
        ),
        Value::String(s) => Some(
            Decimal::from_str(s.trim())
                .map_err(|e| RateError::InvalidResponse(format!("rate '{}': {}", s, e)))?,
        ),
        other => {
            return Err(RateError::InvalidResponse(format!(
                "unexpected rate value: {}",
                other
            )));
        }
    };

    let sources = response
        .sources
        .into_iter()
        .filter_map(|entry| {
            let uri = entry.uri.filter(|u| !u.trim().is_empty())?;
            let title = entry
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| uri.clone());
            Some(RateSource { title, uri })
        })
        .collect();

    Ok(RateQuote { rate, sources })
}
