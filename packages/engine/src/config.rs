//! Runtime configuration.
//!
//! Read from the TOML file named by `RAIN_MAP_CONFIG` (default
//! `rain_map.toml`). A missing file means defaults. A few values can be
//! overridden from the environment afterwards.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use rain_map_forecast_models::ForecastConfig;
use rain_map_source::retry::DEFAULT_MAX_RETRIES;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "RAIN_MAP_CONFIG";
/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "rain_map.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`RainMapConfig`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment override did not parse.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The timezone offset is outside ±23 hours.
    #[error("Invalid timezone offset: {hours} hours")]
    InvalidTimezone {
        /// Rejected offset.
        hours: i32,
    },
}

/// Where the event-store snapshot comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// REST endpoint returning the whole collection as JSON.
    pub url: Option<String>,
    /// Seconds between snapshot polls.
    pub poll_interval_secs: u64,
    /// Retries after a failed snapshot request.
    pub max_retries: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            poll_interval_secs: 30,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// JSON API listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainMapConfig {
    /// Offset of the reference timezone used for calendar days.
    pub timezone_offset_hours: i32,
    /// Snapshot source.
    pub source: SourceConfig,
    /// Forecast feed.
    pub forecast: ForecastConfig,
    /// JSON API listener.
    pub server: ServerConfig,
}

impl Default for RainMapConfig {
    fn default() -> Self {
        Self {
            timezone_offset_hours: 7,
            source: SourceConfig::default(),
            forecast: ForecastConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl RainMapConfig {
    /// Loads the config file named by `RAIN_MAP_CONFIG` and applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is unreadable or
    /// invalid, or an override does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Reads a config file; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_str(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `RAIN_MAP_SOURCE_URL`, `RAIN_MAP_TZ_OFFSET_HOURS`,
    /// `BIND_ADDR` and `PORT` as returned by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a numeric override does not
    /// parse.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("RAIN_MAP_SOURCE_URL").filter(|s| !s.trim().is_empty()) {
            self.source.url = Some(url);
        }
        if let Some(value) = lookup("RAIN_MAP_TZ_OFFSET_HOURS") {
            self.timezone_offset_hours =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    name: "RAIN_MAP_TZ_OFFSET_HOURS",
                    value,
                })?;
        }
        if let Some(bind_addr) = lookup("BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.server.bind_addr = bind_addr;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value })?;
        }
        Ok(())
    }

    /// The reference timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimezone`] if the offset is out of
    /// range.
    pub fn timezone(&self) -> Result<FixedOffset, ConfigError> {
        self.timezone_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidTimezone {
                hours: self.timezone_offset_hours,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RainMapConfig::default();
        assert_eq!(config.timezone_offset_hours, 7);
        assert_eq!(config.source.poll_interval_secs, 30);
        assert_eq!(config.forecast.window_hours, 12);
        assert_eq!(config.timezone().unwrap().local_minus_utc(), 25_200);
    }

    #[test]
    fn parses_partial_toml() {
        let config = RainMapConfig::from_toml_str(
            r#"
            timezone_offset_hours = 8

            [source]
            url = "https://example.firebaseio.com/rainpoints.json"

            max_retries = 1

            [forecast]
            latitude = -6.2
            max_retries = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.timezone_offset_hours, 8);
        assert_eq!(
            config.source.url.as_deref(),
            Some("https://example.firebaseio.com/rainpoints.json")
        );
        assert_eq!(config.source.poll_interval_secs, 30);
        assert_eq!(config.source.max_retries, 1);
        assert_eq!(config.forecast.max_retries, 0);
        assert!((config.forecast.latitude - -6.2).abs() < f64::EPSILON);
        assert_eq!(config.forecast.timezone, "Asia/Jakarta");
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(matches!(
            RainMapConfig::from_toml_str("timezone_offset_hours = \"seven\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_default() {
        let config = RainMapConfig::from_file(Path::new("/nonexistent/rain_map.toml")).unwrap();
        assert_eq!(config, RainMapConfig::default());
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let dir = std::env::temp_dir();
        let err = RainMapConfig::from_file(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(
            err.to_string()
                .starts_with(&format!("Failed to read config {}: ", dir.display()))
        );
    }

    #[test]
    fn env_overrides_apply() {
        let env: BTreeMap<&str, &str> = [
            ("RAIN_MAP_SOURCE_URL", "http://localhost:9000/points.json"),
            ("RAIN_MAP_TZ_OFFSET_HOURS", "9"),
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "3000"),
        ]
        .into_iter()
        .collect();
        let mut config = RainMapConfig::default();
        config
            .apply_env_overrides(|name| env.get(name).map(ToString::to_string))
            .unwrap();
        assert_eq!(
            config.source.url.as_deref(),
            Some("http://localhost:9000/points.json")
        );
        assert_eq!(config.timezone_offset_hours, 9);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = RainMapConfig::default();
        let err = config
            .apply_env_overrides(|name| (name == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));
    }

    #[test]
    fn out_of_range_timezone_is_rejected() {
        let config = RainMapConfig {
            timezone_offset_hours: 30,
            ..RainMapConfig::default()
        };
        assert!(config.timezone().is_err());
    }
}
