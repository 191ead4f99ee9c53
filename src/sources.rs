//! Clients for the public price APIs.
//!
//! Each client turns one HTTP request into a `symbol -> price` map. They do
//! not retry and do not substitute defaults; that is the refresh job's call.

pub mod coingecko;
pub mod fmp;

use std::{collections::HashMap, time::Duration};

use crate::{config::SourcesConfig, error::RoiError};

pub use coingecko::CoingeckoClient;
pub use fmp::FmpClient;

/// Prices returned by one source, keyed by the symbol that was requested.
pub type FetchedPrices = HashMap<String, f64>;

/// Builds the HTTP client shared by every source.
pub fn http_client(config: &SourcesConfig) -> Result<reqwest::Client, RoiError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
