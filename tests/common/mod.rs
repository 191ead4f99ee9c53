#![allow(dead_code)]

use std::path::Path;

use kaspa_roi::config::RoiConfig;
pub use kaspa_roi::util::test_util::{setup_default_prices, setup_test_tracing, TracingGuards};

/// Writes `config` as YAML to `dir/config.yml`, pointing its snapshot into `dir` too.
pub fn write_config(dir: &Path, mut config: RoiConfig) -> (std::path::PathBuf, RoiConfig) {
    config.prices_file = dir.join("prices.yml").to_string_lossy().to_string();
    let path = dir.join("config.yml");
    std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();
    (path, config)
}
