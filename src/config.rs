//! # Configuration Management
//!
//! This module handles loading configuration from the tide-chart.toml file. The
//! resulting [`Config`] is built once at startup and passed by reference into the
//! station client, the controller and the renderers; nothing mutates it afterwards.

use crate::DEFAULT_STATION_ID;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tide-chart.toml";

/// Application configuration loaded from tide-chart.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// NOAA station selection
    pub station: StationConfig,
    /// NOAA CO-OPS endpoints
    pub api: ApiConfig,
    /// Time window and terminal chart area
    pub chart: ChartConfig,
}

/// NOAA tide station configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StationConfig {
    /// NOAA station ID (e.g., "8722956" for South Port Everglades, FL)
    #[serde(
        alias = "station",
        alias = "stationcode",
        alias = "noaastation",
        alias = "noaastationcode"
    )]
    pub id: String,
}

/// Remote service endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Metadata API root; station info lives at `<metadata_base>/stations/<id>.json`
    pub metadata_base: String,
    /// Data API root; predictions come from `<data_base>/datagetter`
    pub data_base: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Chart parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Hours between the first and last prediction (23 gives 24 hourly bars)
    pub window_hours: u32,
    /// Terminal chart width in character cells
    pub columns: u16,
    /// Terminal chart height in character cells
    pub rows: u16,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            id: DEFAULT_STATION_ID.to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            metadata_base: "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi".to_string(),
            data_base: "https://api.tidesandcurrents.noaa.gov/api/prod".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            window_hours: 23,
            columns: 72,
            rows: 36,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!(
                        "Loaded configuration from {} for station {}",
                        path.display(),
                        config.station.id
                    );
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config file {}: {}", path.display(), e);
                    log::warn!("Using default configuration (station {})", DEFAULT_STATION_ID);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "No config file at {}, using default configuration (station {})",
                    path.display(),
                    DEFAULT_STATION_ID
                );
                Self::default()
            }
        }
    }

    /// Return a copy with the station replaced, when an override is given.
    pub fn with_station_override(mut self, station: Option<String>) -> Self {
        if let Some(id) = station {
            self.station.id = id;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.station.id, "8722956");
        assert_eq!(config.chart.window_hours, 23);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.api.data_base.ends_with("/api/prod"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.station.id, parsed.station.id);
        assert_eq!(config.api.metadata_base, parsed.api.metadata_base);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        assert_eq!(config.station.id, DEFAULT_STATION_ID);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config("[station]\nid = \"8443970\"\n");
        let config = Config::load_from_path(file.path());
        assert_eq!(config.station.id, "8443970");
        assert_eq!(config.chart.window_hours, 23);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_station_key_aliases() {
        for key in ["station", "stationcode", "noaastation", "noaastationcode"] {
            let file = write_config(&format!("[station]\n{key} = \"9414290\"\n"));
            let config = Config::load_from_path(file.path());
            assert_eq!(config.station.id, "9414290", "alias {key}");
        }
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let file = write_config("[station\nid = ");
        let config = Config::load_from_path(file.path());
        assert_eq!(config.station.id, DEFAULT_STATION_ID);
    }

    #[test]
    fn test_station_override() {
        let config = Config::default().with_station_override(Some("1612340".into()));
        assert_eq!(config.station.id, "1612340");

        let config = Config::default().with_station_override(None);
        assert_eq!(config.station.id, DEFAULT_STATION_ID);
    }
}
