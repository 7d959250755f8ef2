//! Startup configuration.
//!
//! Values come from environment variables (after `.env` is loaded) and an
//! optional parameters file. The parameters file holds the name table and
//! may also supply host and port; explicit environment variables win.
//!
//! | variable | default |
//! |---|---|
//! | `XHAVEN_HOST` | `localhost` |
//! | `XHAVEN_PORT` | `4567` |
//! | `XHAVEN_PARAMETERS` | none |
//! | `XHAVEN_STALE_INDEX_POLICY` | `apply` |
//! | `XHAVEN_ECHO_RECONCILED` | `true` |
//! | `XHAVEN_OUTBOUND_QUEUE` | `64` |
//! | `XHAVEN_BOOTSTRAP_DELAY_MS` | `500` |
//! | `XHAVEN_MAX_FRAME_BYTES` | `8388608` |

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use xhaven_domain::NameTable;

use crate::infrastructure::transport::TransportConfig;
use crate::stores::{StaleIndexPolicy, StorePolicy};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 4567;
pub const DEFAULT_OUTBOUND_QUEUE: usize = 64;
pub const DEFAULT_BOOTSTRAP_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid parameters file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Contents of the parameters file.
///
/// ```json
/// { "host": "localhost", "port": 4567,
///   "character_names": {"Boneshaper": "Bones"},
///   "monster_names": {"Frost Demon": "Frosty"} }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(flatten)]
    pub names: NameTable,
}

impl Parameters {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub parameters_path: Option<PathBuf>,
    pub names: NameTable,
    pub store_policy: StorePolicy,
    pub outbound_queue: usize,
    pub bootstrap_delay: Duration,
    pub max_frame_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            parameters_path: None,
            names: NameTable::default(),
            store_policy: StorePolicy::default(),
            outbound_queue: DEFAULT_OUTBOUND_QUEUE,
            bootstrap_delay: Duration::from_millis(DEFAULT_BOOTSTRAP_DELAY_MS),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, for tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let parameters_path = var("XHAVEN_PARAMETERS").map(PathBuf::from);
        let parameters = match &parameters_path {
            Some(path) => Parameters::load(path)?,
            None => Parameters::default(),
        };

        let host = var("XHAVEN_HOST")
            .or(parameters.host)
            .unwrap_or_else(|| DEFAULT_HOST.into());
        let port = match var("XHAVEN_PORT") {
            Some(raw) => parse("XHAVEN_PORT", &raw)?,
            None => parameters.port.unwrap_or(DEFAULT_PORT),
        };

        let stale_index = parse_or(&var, "XHAVEN_STALE_INDEX_POLICY", StaleIndexPolicy::Apply)?;
        let echo_reconciled = match var("XHAVEN_ECHO_RECONCILED") {
            Some(raw) => parse_flag("XHAVEN_ECHO_RECONCILED", &raw)?,
            None => true,
        };
        let outbound_queue = parse_or(&var, "XHAVEN_OUTBOUND_QUEUE", DEFAULT_OUTBOUND_QUEUE)?;
        let bootstrap_delay_ms =
            parse_or(&var, "XHAVEN_BOOTSTRAP_DELAY_MS", DEFAULT_BOOTSTRAP_DELAY_MS)?;
        let max_frame_bytes = parse_or(&var, "XHAVEN_MAX_FRAME_BYTES", DEFAULT_MAX_FRAME_BYTES)?;

        if outbound_queue == 0 {
            return Err(ConfigError::Invalid {
                key: "XHAVEN_OUTBOUND_QUEUE",
                message: "must be at least 1".into(),
            });
        }

        Ok(Self {
            host,
            port,
            parameters_path,
            names: parameters.names,
            store_policy: StorePolicy {
                stale_index,
                echo_reconciled,
            },
            outbound_queue,
            bootstrap_delay: Duration::from_millis(bootstrap_delay_ms),
            max_frame_bytes,
        })
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            host: self.host.clone(),
            port: self.port,
            bootstrap_delay: self.bootstrap_delay,
            max_frame_bytes: self.max_frame_bytes,
            ..TransportConfig::default()
        }
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: format!("{:?}: {}", raw, e),
    })
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    var(key).map_or(Ok(default), |raw| parse(key, &raw))
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            message: format!("{:?} is not a boolean", raw),
        }),
    }
}
