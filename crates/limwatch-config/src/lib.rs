//! Configuration for the limwatch dashboard.
//!
//! TOML file under the platform config directory, overridable with
//! `LIMWATCH_`-prefixed environment variables. The TUI consumes the
//! resulting [`Config`] directly.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use limwatch_api::transport::TransportConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Limiter base URL (e.g., "http://192.168.1.1:5000").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll cadences per widget.
    #[serde(default)]
    pub poll: PollIntervals,

    /// Traffic samples retained for the rolling chart.
    #[serde(default = "default_traffic_retention")]
    pub traffic_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
            poll: PollIntervals::default(),
            traffic_retention: default_traffic_retention(),
        }
    }
}

/// Per-widget poll periods, in seconds. Traffic and overview refresh at
/// near-real-time cadence; the list widgets are heavier aggregates and
/// poll slower.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollIntervals {
    #[serde(default = "default_fast_poll")]
    pub traffic: u64,

    #[serde(default = "default_fast_poll")]
    pub overview: u64,

    #[serde(default = "default_clients_poll")]
    pub clients: u64,

    #[serde(default = "default_slow_poll")]
    pub blocked: u64,

    #[serde(default = "default_slow_poll")]
    pub config: u64,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            traffic: default_fast_poll(),
            overview: default_fast_poll(),
            clients: default_clients_poll(),
            blocked: default_slow_poll(),
            config: default_slow_poll(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_traffic_retention() -> usize {
    600
}
fn default_fast_poll() -> u64 {
    1
}
fn default_clients_poll() -> u64 {
    10
}
fn default_slow_poll() -> u64 {
    30
}

impl Config {
    /// Parse and validate the limiter base URL.
    pub fn base_url(&self) -> Result<url::Url, ConfigError> {
        self.api_url.parse().map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", self.api_url),
        })
    }

    /// Transport settings for the API client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "limwatch", "limwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("limwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from an explicit file path, with env overrides.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LIMWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist or fails
/// to parse.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.api_url, "http://localhost:5000");
        assert_eq!(cfg.timeout, 10);
        assert_eq!(cfg.poll.traffic, 1);
        assert_eq!(cfg.poll.overview, 1);
        assert_eq!(cfg.poll.clients, 10);
        assert_eq!(cfg.poll.blocked, 30);
        assert_eq!(cfg.traffic_retention, 600);
        assert!(cfg.base_url().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"http://10.0.0.5:8080\"\ntimeout = 3\n\n[poll]\ntraffic = 2\n",
        )
        .expect("write config");

        let cfg = load_config_from(&path).expect("load config");
        assert_eq!(cfg.api_url, "http://10.0.0.5:8080");
        assert_eq!(cfg.timeout, 3);
        assert_eq!(cfg.poll.traffic, 2);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.poll.clients, 10);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load config");
        assert_eq!(cfg.api_url, "http://localhost:5000");
    }

    #[test]
    fn bad_url_is_rejected() {
        let cfg = Config {
            api_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.base_url(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn transport_carries_the_timeout() {
        let cfg = Config {
            timeout: 7,
            ..Config::default()
        };
        assert_eq!(cfg.transport().timeout, Duration::from_secs(7));
    }
}
