//! Client configuration management.
//!
//! Settings are layered: built-in defaults, then an optional JSON file at
//! `~/.config/seatguard/config.json`, then environment variables (a `.env`
//! file is loaded by the binary before this runs). Empty environment values
//! count as unset.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::ProviderConfig;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "seatguard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_ORIGIN: &str = "http://localhost:3000";

pub const ENV_API_URL: &str = "SEATGUARD_API_URL";
pub const ENV_PROVIDER_DOMAIN: &str = "SEATGUARD_AUTH0_DOMAIN";
pub const ENV_PROVIDER_CLIENT_ID: &str = "SEATGUARD_AUTH0_CLIENT_ID";
pub const ENV_PROVIDER_AUDIENCE: &str = "SEATGUARD_AUTH0_AUDIENCE";
pub const ENV_ORIGIN: &str = "SEATGUARD_ORIGIN";
pub const ENV_VERIFY_FORCE_LOGOUT: &str = "SEATGUARD_VERIFY_FORCE_LOGOUT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the session registry backend
    pub api_url: String,
    /// Address the provider redirects back to and returns to after logout
    pub origin: String,
    pub provider: ProviderConfig,
    /// Re-count sessions after a successful force-logout
    pub verify_after_force_logout: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            provider: ProviderConfig::default(),
            verify_after_force_logout: false,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        debug!(api_url = %config.api_url, origin = %config.origin, "Config loaded");
        Ok(config)
    }

    /// Apply overrides from `lookup`, skipping missing and empty values.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_URL) {
            self.api_url = v;
        }
        if let Some(v) = get(ENV_ORIGIN) {
            self.origin = v;
        }
        if let Some(v) = get(ENV_PROVIDER_DOMAIN) {
            self.provider.domain = v;
        }
        if let Some(v) = get(ENV_PROVIDER_CLIENT_ID) {
            self.provider.client_id = v;
        }
        if let Some(v) = get(ENV_PROVIDER_AUDIENCE) {
            self.provider.audience = v;
        }
        if let Some(v) = get(ENV_VERIFY_FORCE_LOGOUT) {
            self.verify_after_force_logout = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the client's log files.
    pub fn log_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
