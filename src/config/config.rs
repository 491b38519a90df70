// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const VETERANCY_GUIDE_URL: &str =
    "https://www.coh2.org/guides/29892/the-company-of-heroes-2-veterancy-guide";
const STEAMDB_BASE_URL: &str = "https://steamdb.info";
const DEPOT_DOWNLOADER_PATH: &str = "external/depot-downloader/DepotDownloader.dll";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL of the coh2.org veterancy guide page
    pub veterancy_guide_url: String,

    /// Base URL of the SteamDB instance used for depot update dates
    pub steamdb_base_url: String,

    /// Path to the DepotDownloader .NET assembly
    pub depot_downloader_path: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("COH2_DATA_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        // Apply environment variable overrides
        if let Ok(val) = std::env::var("COH2_DATA_VETERANCY_GUIDE_URL") {
            config.veterancy_guide_url = val;
        }
        if let Ok(val) = std::env::var("COH2_DATA_STEAMDB_BASE_URL") {
            config.steamdb_base_url = val;
        }
        if let Ok(val) = std::env::var("COH2_DATA_DEPOT_DOWNLOADER_PATH") {
            config.depot_downloader_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("COH2_DATA_LOG_LEVEL") {
            config.log_level = val;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            veterancy_guide_url: String::from(VETERANCY_GUIDE_URL),
            steamdb_base_url: String::from(STEAMDB_BASE_URL),
            depot_downloader_path: PathBuf::from(DEPOT_DOWNLOADER_PATH),
            log_level: String::from("info"),
        }
    }
}
