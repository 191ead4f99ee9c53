//! The current-price snapshot.
//!
//! A flat `asset key -> price` YAML document. The refresh job replaces it
//! wholesale and everything else only reads it.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, Write as _},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::{AssetConfig, RoiConfig},
    error::RoiError,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSnapshot {
    // BTreeMap keeps keys sorted, so equal snapshots serialize to equal bytes
    prices: BTreeMap<String, f64>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot holding every configured asset's default price.
    pub fn from_defaults(config: &RoiConfig) -> Self {
        let mut snapshot = Self::new();
        for asset in config.assets() {
            snapshot.set(&asset.key, asset.default_price);
        }
        snapshot
    }

    /// Loads the snapshot from `path`.
    ///
    /// A missing file is not an error: it yields an empty snapshot, so every
    /// asset falls back to its default price.
    #[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RoiError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "Price snapshot {} not found. Using default prices.",
                path.display()
            );
            return Ok(Self::new());
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let snapshot: Self = serde_yaml::from_reader(reader)?;
        debug!(entries = snapshot.len(), "Loaded price snapshot");
        Ok(snapshot)
    }

    /// Replaces the file at `path` with this snapshot.
    ///
    /// Written to a sibling temp file first and renamed into place, so readers
    /// never observe a half-written document.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RoiError> {
        let path = path.as_ref();
        if let Some(parent_dir) = path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let contents = self.to_yaml()?;
        let temp_path = path.with_extension("yml.tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, path)?;
        info!(entries = self.len(), "Price snapshot written to {}", path.display());
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, RoiError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.prices.get(key).copied()
    }

    pub fn set(&mut self, key: &str, price: f64) {
        self.prices.insert(key.to_string(), price);
    }

    /// The stored price for `asset`, or its configured default.
    pub fn current_price(&self, asset: &AssetConfig) -> f64 {
        self.get(&asset.key).unwrap_or(asset.default_price)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
