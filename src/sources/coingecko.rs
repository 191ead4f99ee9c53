use std::collections::HashMap;

use tracing::{debug, instrument};

use super::FetchedPrices;
use crate::error::RoiError;

/// Quote currency requested from CoinGecko.
pub const VS_CURRENCY: &str = "usd";

/// `{ "kaspa": { "usd": 0.091 } }`
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

/// CoinGecko `simple/price` client.
#[derive(Debug, Clone)]
pub struct CoingeckoClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CoingeckoClient {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET /simple/price?ids={ids}&vs_currencies=usd
    pub fn simple_price_request(&self, ids: &[String]) -> reqwest::RequestBuilder {
        let ids = ids.join(",");
        self.http_client
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", ids.as_str()), ("vs_currencies", VS_CURRENCY)])
    }

    /// Fetches USD prices for the given coin ids.
    ///
    /// Ids the API leaves out are simply absent from the result.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, ids: &[String]) -> Result<FetchedPrices, RoiError> {
        debug!(ids = ids.len(), "Requesting CoinGecko prices");
        let body = self
            .simple_price_request(ids)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_simple_price(&body)
    }
}

/// Extracts the USD price of every coin in a `simple/price` body.
pub fn parse_simple_price(body: &str) -> Result<FetchedPrices, RoiError> {
    let response: SimplePriceResponse = serde_json::from_str(body)?;
    let prices = response
        .into_iter()
        .filter_map(|(id, quotes)| {
            quotes
                .get(VS_CURRENCY)
                .copied()
                .flatten()
                .map(|price| (id, price))
        })
        .collect();
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_price_request() {
        let client = CoingeckoClient::new(reqwest::Client::new(), "https://api.coingecko.com/api/v3/");
        let request = client
            .simple_price_request(&["kaspa".to_string(), "bitcoin".to_string()])
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/api/v3/simple/price");
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("ids".to_string(), "kaspa,bitcoin".to_string()),
                ("vs_currencies".to_string(), "usd".to_string()),
            ]
        );
    }

    #[test]
    fn test_simple_price_request_encodes_ids() {
        let client = CoingeckoClient::new(reqwest::Client::new(), "https://example.com");
        let request = client
            .simple_price_request(&["a&vs_currencies=eur".to_string()])
            .build()
            .unwrap();
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("ids".to_string(), "a&vs_currencies=eur".to_string()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_parse_simple_price() {
        let prices = parse_simple_price(r#"{"kaspa":{"usd":0.1187}}"#).unwrap();
        assert_eq!(prices.get("kaspa"), Some(&0.1187));
    }

    #[test]
    fn test_parse_simple_price_missing_currency() {
        let prices = parse_simple_price(r#"{"kaspa":{"eur":0.1}, "bitcoin":{"usd":null}}"#).unwrap();
        assert!(prices.is_empty());
    }

    #[test]
    fn test_parse_simple_price_empty_object() {
        let prices = parse_simple_price("{}").unwrap();
        assert!(prices.is_empty());
    }

    #[test]
    fn test_parse_simple_price_garbage() {
        let result = parse_simple_price("<html>rate limited</html>");
        assert!(matches!(result, Err(RoiError::SerdeJsonError(_))));
    }
}
