//! Client configuration
//!
//! Loads and saves the client config to/from disk, with environment
//! override for the API base URL.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "client.json";
const APP_NAME: &str = "HRChat";

/// Environment variable overriding the configured API base URL
pub const API_URL_ENV: &str = "HRCHAT_API_URL";

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL (no trailing slash required)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout delegated to the HTTP transport
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Override for the credential/config directory (None = platform default)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            data_dir: None,
        }
    }
}

/// Get the config directory path
fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}

fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|p| p.join(CONFIG_FILE))
}

impl ClientConfig {
    /// Load the config from disk, falling back to defaults
    ///
    /// `HRCHAT_API_URL` takes precedence over the persisted base URL.
    pub fn load() -> Self {
        let mut config = match get_config_path() {
            Some(path) if path.exists() => match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => {
                        info!("Loaded client config from {:?}", path);
                        config
                    }
                    Err(e) => {
                        error!("Failed to parse config file: {}", e);
                        ClientConfig::default()
                    }
                },
                Err(e) => {
                    error!("Failed to read config file: {}", e);
                    ClientConfig::default()
                }
            },
            _ => {
                debug!("No config file, using defaults");
                ClientConfig::default()
            }
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                info!("Overriding API base URL from {}", API_URL_ENV);
                config.base_url = url;
            }
        }

        config
    }

    /// Save the config to disk
    pub fn save(&self) -> Result<(), String> {
        let dir = match get_config_dir() {
            Some(d) => d,
            None => return Err("Could not determine config directory".to_string()),
        };

        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(&dir) {
                return Err(format!("Failed to create config directory: {}", e));
            }
        }

        let path = dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&path, json).map_err(|e| format!("Failed to write config file: {}", e))?;
        info!("Saved client config to {:?}", path);
        Ok(())
    }
}
