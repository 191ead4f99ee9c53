use serde::Deserialize;
use tracing::{debug, instrument};

use super::FetchedPrices;
use crate::error::RoiError;

/// One entry of a `quote-short` response.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteShort {
    pub symbol: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// FinancialModelingPrep `quote-short` client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn new(http_client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// GET /quote-short/{symbols}?apikey={key}
    pub fn quote_short_request(&self, symbols: &[String]) -> reqwest::RequestBuilder {
        let url = format!("{}/quote-short/{}", self.base_url, symbols.join(","));
        self.http_client
            .get(url)
            .query(&[("apikey", self.api_key.as_str())])
    }

    /// Fetches the latest price for each symbol in a single request.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, symbols: &[String]) -> Result<FetchedPrices, RoiError> {
        debug!(symbols = symbols.len(), "Requesting FMP quotes");
        let body = self
            .quote_short_request(symbols)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_quote_short(&body)
    }
}

/// Maps each quoted symbol to its price, skipping entries without one.
///
/// FMP reports quota and key problems as a JSON object instead of an array,
/// which surfaces here as a parse error.
pub fn parse_quote_short(body: &str) -> Result<FetchedPrices, RoiError> {
    let quotes: Vec<QuoteShort> = serde_json::from_str(body)?;
    let prices = quotes
        .into_iter()
        .filter_map(|q| q.price.map(|price| (q.symbol, price)))
        .collect();
    Ok(prices)
}
