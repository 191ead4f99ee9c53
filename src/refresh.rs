//! The price refresh job.
//!
//! Queries every configured source once, concurrently, resolves each asset's
//! current price (live value or that asset's own default) and replaces the
//! price snapshot with the result.

use std::{collections::HashMap, fmt};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    config::{AssetConfig, PriceSource, RoiConfig},
    error::RoiError,
    prices::PriceSnapshot,
    sources::{self, CoingeckoClient, FetchedPrices, FmpClient},
    util::format_utils::format_price,
};

/// Whether a resolved price came from the API or from the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceOrigin {
    Live,
    Default,
}

impl fmt::Display for PriceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceOrigin::Live => write!(f, "live"),
            PriceOrigin::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPrice {
    pub key: String,
    pub name: String,
    pub price: f64,
    pub origin: PriceOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub snapshot: PriceSnapshot,
    pub resolved: Vec<ResolvedPrice>,
}

impl RefreshOutcome {
    pub fn live_count(&self) -> usize {
        self.resolved
            .iter()
            .filter(|r| r.origin == PriceOrigin::Live)
            .count()
    }
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.resolved {
            writeln!(f, "{:<10} {:>16} ({})", r.name, format_price(r.price), r.origin)?;
        }
        Ok(())
    }
}

/**
Picks the price to store for one asset.

A fetched value is used only if it is finite and positive; anything else
(missing, zero, negative, NaN) falls back to `default_price`.
 */
pub fn resolve_price(fetched: Option<f64>, default_price: f64) -> (f64, PriceOrigin) {
    match fetched {
        Some(price) if price.is_finite() && price > 0.0 => (price, PriceOrigin::Live),
        _ => (default_price, PriceOrigin::Default),
    }
}

/// Resolves every configured asset against the fetched prices of its source.
pub fn resolve_prices(
    config: &RoiConfig,
    fetched: &HashMap<PriceSource, FetchedPrices>,
) -> RefreshOutcome {
    let mut snapshot = PriceSnapshot::new();
    let mut resolved = Vec::new();
    for asset in config.assets() {
        let live = fetched
            .get(&asset.source)
            .and_then(|prices| prices.get(&asset.symbol))
            .copied();
        let (price, origin) = resolve_price(live, asset.default_price);
        if origin == PriceOrigin::Default {
            warn!(
                asset = %asset.key,
                source = %asset.source,
                "No usable live price for {}; using default {}",
                asset.symbol,
                asset.default_price
            );
        }
        snapshot.set(&asset.key, price);
        resolved.push(resolved_price(asset, price, origin));
    }
    RefreshOutcome { snapshot, resolved }
}

fn resolved_price(asset: &AssetConfig, price: f64, origin: PriceOrigin) -> ResolvedPrice {
    ResolvedPrice {
        key: asset.key.clone(),
        name: asset.name.clone(),
        price,
        origin,
    }
}

/// Both source clients, sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct PriceFetcher {
    coingecko: CoingeckoClient,
    fmp: FmpClient,
}

impl PriceFetcher {
    pub fn from_config(config: &RoiConfig) -> Result<Self, RoiError> {
        let http_client = sources::http_client(&config.sources)?;
        Ok(Self {
            coingecko: CoingeckoClient::new(http_client.clone(), &config.sources.coingecko_base_url),
            fmp: FmpClient::new(
                http_client,
                &config.sources.fmp_base_url,
                &config.sources.fmp_api_key,
            ),
        })
    }

    /// Fetches one source. Failures are logged and turn into an empty map.
    async fn fetch_source(&self, source: PriceSource, symbols: Vec<String>) -> (PriceSource, FetchedPrices) {
        if symbols.is_empty() {
            return (source, FetchedPrices::new());
        }
        let result = match source {
            PriceSource::Coingecko => self.coingecko.fetch(&symbols).await,
            PriceSource::Fmp => self.fmp.fetch(&symbols).await,
        };
        match result {
            Ok(prices) => {
                info!(%source, requested = symbols.len(), received = prices.len(), "Fetched prices");
                (source, prices)
            }
            Err(e) => {
                warn!(%source, "Failed to fetch prices: {}", e);
                (source, FetchedPrices::new())
            }
        }
    }

    /// Queries every source concurrently. Never fails; see `fetch_source`.
    #[instrument(level = "info", skip_all)]
    pub async fn fetch_all(&self, config: &RoiConfig) -> HashMap<PriceSource, FetchedPrices> {
        let (coingecko, fmp) = futures::join!(
            self.fetch_source(
                PriceSource::Coingecko,
                config.symbols_for(PriceSource::Coingecko)
            ),
            self.fetch_source(PriceSource::Fmp, config.symbols_for(PriceSource::Fmp)),
        );
        HashMap::from([coingecko, fmp])
    }
}

/**
Runs the refresh job end to end.

## Arguments
- `config`: Assets, sources and the snapshot location.
- `dry_run`: Resolve prices but leave the snapshot file untouched.

## Returns
The resolved prices. Only a failure to write the snapshot is an error.
 */
#[instrument(level = "info", skip(config))]
pub async fn refresh(config: &RoiConfig, dry_run: bool) -> Result<RefreshOutcome, RoiError> {
    let fetcher = PriceFetcher::from_config(config)?;
    let fetched = fetcher.fetch_all(config).await;
    let outcome = resolve_prices(config, &fetched);
    info!(
        live = outcome.live_count(),
        total = outcome.resolved.len(),
        "Resolved current prices"
    );
    if dry_run {
        info!("Dry run: not writing {}", config.prices_file);
    } else {
        outcome.snapshot.save(&config.prices_file)?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourcesConfig;
    use tempfile::tempdir;

    fn fetched(entries: &[(PriceSource, &str, f64)]) -> HashMap<PriceSource, FetchedPrices> {
        let mut map: HashMap<PriceSource, FetchedPrices> = HashMap::new();
        for (source, symbol, price) in entries {
            map.entry(*source).or_default().insert(symbol.to_string(), *price);
        }
        map
    }

    #[test]
    fn test_resolve_price() {
        assert_eq!(resolve_price(Some(1.5), 2.0), (1.5, PriceOrigin::Live));
        assert_eq!(resolve_price(None, 2.0), (2.0, PriceOrigin::Default));
        assert_eq!(resolve_price(Some(0.0), 2.0), (2.0, PriceOrigin::Default));
        assert_eq!(resolve_price(Some(-3.0), 2.0), (2.0, PriceOrigin::Default));
        assert_eq!(resolve_price(Some(f64::NAN), 2.0), (2.0, PriceOrigin::Default));
        assert_eq!(resolve_price(Some(f64::INFINITY), 2.0), (2.0, PriceOrigin::Default));
    }

    #[test]
    fn test_resolve_prices_all_live() {
        let config = RoiConfig::default();
        let fetched = fetched(&[
            (PriceSource::Coingecko, "kaspa", 0.12),
            (PriceSource::Fmp, "^GSPC", 5300.0),
            (PriceSource::Fmp, "BTCUSD", 70000.0),
            (PriceSource::Fmp, "^IXIC", 16800.0),
            (PriceSource::Fmp, "XAUUSD", 2350.0),
        ]);
        let outcome = resolve_prices(&config, &fetched);
        assert_eq!(outcome.live_count(), 5);
        assert_eq!(outcome.snapshot.get("kaspa"), Some(0.12));
        assert_eq!(outcome.snapshot.get("gold"), Some(2350.0));
    }

    #[test]
    fn test_resolve_prices_fallback_is_per_asset() {
        let config = RoiConfig::default();
        let fetched = fetched(&[
            (PriceSource::Coingecko, "kaspa", 0.12),
            (PriceSource::Fmp, "BTCUSD", 70000.0),
        ]);
        let outcome = resolve_prices(&config, &fetched);
        assert_eq!(outcome.live_count(), 2);
        assert_eq!(outcome.snapshot.get("sp500"), Some(5277.0));
        assert_eq!(outcome.snapshot.get("bitcoin"), Some(70000.0));
        assert_eq!(outcome.snapshot.get("nasdaq"), Some(16400.0));
        assert_eq!(outcome.snapshot.get("gold"), Some(2300.0));
    }

    #[test]
    fn test_resolve_prices_symbol_from_wrong_source_ignored() {
        let config = RoiConfig::default();
        let fetched = fetched(&[(PriceSource::Fmp, "kaspa", 0.5)]);
        let outcome = resolve_prices(&config, &fetched);
        assert_eq!(outcome.snapshot.get("kaspa"), Some(0.091));
        assert_eq!(outcome.resolved[0].origin, PriceOrigin::Default);
    }

    #[test]
    fn test_resolve_prices_keeps_config_order() {
        let config = RoiConfig::default();
        let outcome = resolve_prices(&config, &HashMap::new());
        let keys: Vec<&str> = outcome.resolved.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["kaspa", "sp500", "bitcoin", "nasdaq", "gold"]);
        assert_eq!(outcome.snapshot, PriceSnapshot::from_defaults(&config));
    }

    #[test]
    fn test_outcome_display() {
        let config = RoiConfig::default();
        let outcome = resolve_prices(&config, &fetched(&[(PriceSource::Coingecko, "kaspa", 0.12)]));
        let text = outcome.to_string();
        assert!(text.contains("Kaspa"));
        assert!(text.contains("$0.12 (live)"));
        assert!(text.contains("$69,000.00 (default)"));
    }

    // Nothing listens on port 9 locally, so both sources fail fast and every
    // asset must come back with its default.
    #[tokio::test]
    async fn test_refresh_with_unreachable_sources_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.yml");
        let config = RoiConfig {
            prices_file: path.to_string_lossy().to_string(),
            sources: SourcesConfig {
                coingecko_base_url: "http://127.0.0.1:9".to_string(),
                fmp_base_url: "http://127.0.0.1:9".to_string(),
                fmp_api_key: "demo".to_string(),
                timeout_secs: 2,
            },
            ..Default::default()
        };

        let outcome = refresh(&config, false).await.unwrap();
        assert_eq!(outcome.live_count(), 0);
        assert_eq!(outcome.snapshot, PriceSnapshot::from_defaults(&config));

        let first = std::fs::read(&path).unwrap();
        refresh(&config, false).await.unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_refresh_dry_run_does_not_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.yml");
        let config = RoiConfig {
            prices_file: path.to_string_lossy().to_string(),
            sources: SourcesConfig {
                coingecko_base_url: "http://127.0.0.1:9".to_string(),
                fmp_base_url: "http://127.0.0.1:9".to_string(),
                fmp_api_key: "demo".to_string(),
                timeout_secs: 2,
            },
            ..Default::default()
        };
        refresh(&config, true).await.unwrap();
        assert!(!path.exists());
    }
}
