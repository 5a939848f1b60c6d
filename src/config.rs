//! Configuration management for explorerd

use serde::Deserialize;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Environment variable that overrides `http.password`.
pub const PASSWORD_ENV: &str = "EXPLORERD_API_PASSWORD";

/// Default config file, read from the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "explorerd.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub network: NetworkConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub address: String,
    pub password: String,
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: default_http_address(),
            password: String::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub gateway_address: String,
    pub bootstrap_peers: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            gateway_address: default_gateway_address(),
            bootstrap_peers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Apply the password from the environment, if set.
    pub fn apply_env(&mut self) {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            if !password.is_empty() {
                self.http.password = password;
            }
        }
    }

    /// Validate critical values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.password.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "http.password must be set (or {} exported)",
                PASSWORD_ENV
            )));
        }
        self.http_addr()?;
        if self.http.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "http.max_body_bytes must be positive".to_string(),
            ));
        }
        for peer in &self.network.bootstrap_peers {
            crate::sync::validate_peer_addr(peer)
                .map_err(|e| ConfigError::Invalid(format!("bootstrap peer: {}", e)))?;
        }
        Ok(())
    }

    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http.address.parse().map_err(|e| {
            ConfigError::Invalid(format!("http.address {:?}: {}", self.http.address, e))
        })
    }
}

/// Load the config file at `path`. A missing file yields the defaults; the
/// environment override is applied either way. Validation is left to the
/// caller, which may still fill in the password interactively.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let mut config = match fs::read_to_string(path) {
        Ok(s) => Config::from_toml(&s)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    config.apply_env();
    Ok(config)
}

fn default_http_address() -> String {
    "127.0.0.1:9980".to_string()
}

fn default_gateway_address() -> String {
    "0.0.0.0:9981".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024 // 10 MB
}

fn default_log_level() -> String {
    "info".to_string()
}
