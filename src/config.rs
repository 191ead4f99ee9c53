use std::{
    collections::HashSet,
    fmt,
    fs::File,
    io::{BufReader, Write as _},
    path::Path,
};

use serde::{Deserialize, Serialize};
use serde_yaml::from_reader;
use tracing::{debug, info, instrument};

use crate::{
    data::PricePoint,
    error::RoiError,
    util::date_utils::parse_date,
};

/// Where an asset's current price is fetched from.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// CoinGecko `simple/price`, keyed by coin id.
    Coingecko,
    /// FinancialModelingPrep `quote-short`, keyed by ticker symbol.
    Fmp,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Coingecko => write!(f, "coingecko"),
            PriceSource::Fmp => write!(f, "fmp"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AssetConfig {
    /// Stable identifier, also the key in the price snapshot.
    pub key: String,
    pub name: String,
    pub source: PriceSource,
    /// Coin id for CoinGecko, ticker for FMP.
    pub symbol: String,
    pub initial_price: f64,
    pub initial_date: String,
    /// Substituted when the live fetch fails or omits the symbol.
    pub default_price: f64,
}

impl AssetConfig {
    fn new(
        key: &str,
        name: &str,
        source: PriceSource,
        symbol: &str,
        initial_price: f64,
        default_price: f64,
    ) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            source,
            symbol: symbol.to_string(),
            initial_price,
            initial_date: INCEPTION_DATE.to_string(),
            default_price,
        }
    }

    /// The historical reference price and the day it was recorded.
    pub fn initial_point(&self) -> Result<PricePoint, RoiError> {
        Ok(PricePoint::new(
            self.initial_price,
            parse_date(&self.initial_date)?,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SourcesConfig {
    pub coingecko_base_url: String,
    pub fmp_base_url: String,
    pub fmp_api_key: String,
    pub timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            fmp_base_url: "https://financialmodelingprep.com/api/v3".to_string(),
            fmp_api_key: "demo".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RoiConfig {
    pub tracked: AssetConfig,
    pub benchmarks: Vec<AssetConfig>,
    #[serde(default = "default_horizons")]
    pub horizons: Vec<u32>,
    #[serde(default = "default_prices_file")]
    pub prices_file: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_share_site")]
    pub share_site: String,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

const INCEPTION_DATE: &str = "2022-05-26";

const DEFAULT_DATA: &str = r#"
tracked:
  key: kaspa
  name: Kaspa
  source: coingecko
  symbol: kaspa
  initial-price: 0.000171
  initial-date: "2022-05-26"
  default-price: 0.091
benchmarks:
  - key: sp500
    name: S&P 500
    source: fmp
    symbol: "^GSPC"
    initial-price: 4057.84
    initial-date: "2022-05-26"
    default-price: 5277.0
  - key: bitcoin
    name: Bitcoin
    source: fmp
    symbol: BTCUSD
    initial-price: 29568.1
    initial-date: "2022-05-26"
    default-price: 69000.0
  - key: nasdaq
    name: Nasdaq
    source: fmp
    symbol: "^IXIC"
    initial-price: 11740.65
    initial-date: "2022-05-26"
    default-price: 16400.0
  - key: gold
    name: Gold
    source: fmp
    symbol: XAUUSD
    initial-price: 1851.1
    initial-date: "2022-05-26"
    default-price: 2300.0
horizons: [1, 3, 5]
prices-file: prices.yml
log-dir: logs
share-site: kaspa.page
sources:
  coingecko-base-url: https://api.coingecko.com/api/v3
  fmp-base-url: https://financialmodelingprep.com/api/v3
  fmp-api-key: demo
  timeout-secs: 10
server:
  host: 0.0.0.0
  port: 8080
"#;

fn default_horizons() -> Vec<u32> {
    vec![1, 3, 5]
}

fn default_prices_file() -> String {
    "prices.yml".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_share_site() -> String {
    "kaspa.page".to_string()
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            tracked: AssetConfig::new(
                "kaspa",
                "Kaspa",
                PriceSource::Coingecko,
                "kaspa",
                0.000171,
                0.091,
            ),
            benchmarks: vec![
                AssetConfig::new("sp500", "S&P 500", PriceSource::Fmp, "^GSPC", 4057.84, 5277.0),
                AssetConfig::new("bitcoin", "Bitcoin", PriceSource::Fmp, "BTCUSD", 29568.1, 69000.0),
                AssetConfig::new("nasdaq", "Nasdaq", PriceSource::Fmp, "^IXIC", 11740.65, 16400.0),
                AssetConfig::new("gold", "Gold", PriceSource::Fmp, "XAUUSD", 1851.1, 2300.0),
            ],
            horizons: default_horizons(),
            prices_file: default_prices_file(),
            log_dir: default_log_dir(),
            share_site: default_share_site(),
            sources: SourcesConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl RoiConfig {
    /// Reads the configuration from a YAML file.
    ///
    /// If the file does not exist, it creates a default configuration file.
    ///
    /// # Arguments
    ///
    /// * `filename` - Optional path to the configuration file, `config.yml` when absent.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `RoiConfig` on success or an `Error` on failure.
    #[instrument(level = "info", skip(filename))]
    pub fn read_config<P: AsRef<Path>>(filename: Option<P>) -> Result<Self, RoiError> {
        let path = filename
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| Path::new("config.yml").to_path_buf());

        info!(path = %path.display(), "Reading configuration");

        if !path.exists() {
            info!(
                "Config file does not exist. Creating default config at {}",
                path.display()
            );
            let mut file = File::create(&path)?;
            file.write_all(DEFAULT_DATA.as_bytes())?;
            debug!("Default configuration file created");
            return Ok(RoiConfig::default());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let config: Self = from_reader(reader)?;
        config.validate()?;
        info!(
            assets = config.benchmarks.len() + 1,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// The log directory named in the config file at `filename`.
    ///
    /// Used to start logging before the full config is read, so any problem
    /// reading it falls back to the default directory and is reported later
    /// by `read_config`.
    pub fn log_dir_for<P: AsRef<Path>>(filename: P) -> String {
        #[derive(Deserialize)]
        #[serde(rename_all = "kebab-case")]
        struct LogSettings {
            #[serde(default = "default_log_dir")]
            log_dir: String,
        }

        File::open(filename.as_ref())
            .ok()
            .and_then(|file| from_reader::<_, LogSettings>(BufReader::new(file)).ok())
            .map(|settings| settings.log_dir)
            .unwrap_or_else(default_log_dir)
    }

    /// Checks the structural invariants the rest of the crate relies on.
    ///
    /// Prices are not checked; zero or negative reference prices reach the
    /// calculator unchanged.
    pub fn validate(&self) -> Result<(), RoiError> {
        let mut keys = HashSet::new();
        for asset in self.assets() {
            if asset.key.trim().is_empty() {
                return Err(RoiError::ConfigError(format!(
                    "Asset '{}' has an empty key",
                    asset.name
                )));
            }
            if asset.symbol.trim().is_empty() {
                return Err(RoiError::ConfigError(format!(
                    "Asset '{}' has an empty symbol",
                    asset.key
                )));
            }
            if !keys.insert(asset.key.as_str()) {
                return Err(RoiError::ConfigError(format!(
                    "Duplicate asset key '{}'",
                    asset.key
                )));
            }
            parse_date(&asset.initial_date)?;
        }
        if self.horizons.is_empty() {
            return Err(RoiError::ConfigError(
                "At least one projection horizon is required".to_string(),
            ));
        }
        if self.horizons.contains(&0) {
            return Err(RoiError::ConfigError(
                "Projection horizons must be at least one year".to_string(),
            ));
        }
        Ok(())
    }

    /// The tracked asset followed by every benchmark, in configuration order.
    pub fn assets(&self) -> impl Iterator<Item = &AssetConfig> {
        std::iter::once(&self.tracked).chain(self.benchmarks.iter())
    }

    /// Symbols to request from a given source, deduplicated, in configuration order.
    pub fn symbols_for(&self, source: PriceSource) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for asset in self.assets().filter(|a| a.source == source) {
            if !symbols.contains(&asset.symbol) {
                symbols.push(asset.symbol.clone());
            }
        }
        symbols
    }
}
