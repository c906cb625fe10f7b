use crate::constants::{
    CHUNK_SIZE, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, DEFAULT_USERNAME,
};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub default_port: u16,
    pub username: String,
    pub password: String,
    pub passive: bool,
    pub timeout_secs: u64,
    pub chunk_size: usize,
    /// Retry as `anonymous` when the configured login is refused at startup.
    pub anonymous_fallback: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT,
            username: String::from(DEFAULT_USERNAME),
            password: String::from(DEFAULT_PASSWORD),
            passive: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            chunk_size: CHUNK_SIZE,
            anonymous_fallback: true,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        if config.client.chunk_size == 0 {
            config.client.chunk_size = CHUNK_SIZE;
        }
        Ok(config)
    }

    /// Loads `explicit` if given, else the OS default file if present, else defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(Path::new(path));
        }
        let default_path = default_config_path();
        if default_path.is_file() {
            info!("Using configuration file {}", default_path.display());
            Self::load_from_file(&default_path)
        } else {
            debug!("No configuration file at {}, using defaults", default_path.display());
            Ok(Config::default())
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if cfg!(target_os = "windows") {
        let base = std::env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\"));
        PathBuf::from(base).join("rouilleftp").join("rouilleftp.conf")
    } else {
        PathBuf::from("/etc/rouilleftp.conf")
    }
}

// Helper function to log configuration options
pub fn log_config(config: &ClientConfig) {
    debug!("  Default Port: {}", config.default_port);
    debug!("  Username: {}", config.username);
    debug!("  Passive: {}", config.passive);
    debug!("  Timeout: {} s", config.timeout_secs);
    debug!("  Chunk Size: {} KB", config.chunk_size / 1024);
}
