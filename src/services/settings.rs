use crate::domain::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS, DEFAULT_VIOLATIONS_LIMIT};
use crate::services::storage::settings_path;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when a scan request carries both a database URI and a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceExclusivity {
    /// Forward both sources and let the backend pick.
    #[default]
    Backend,
    /// Refuse the request before it reaches the network.
    Reject,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScanSettings {
    #[serde(default)]
    pub source_exclusivity: SourceExclusivity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_violations_limit")]
    pub violations_limit: u32,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default)]
    pub scan: ScanSettings,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_violations_limit() -> u32 {
    DEFAULT_VIOLATIONS_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_ms: default_timeout_ms(),
            violations_limit: default_violations_limit(),
            log_json: false,
            scan: ScanSettings::default(),
        }
    }
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| match v.as_str() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    })
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

/// Load the config file (explicit path or the default location), then layer
/// environment overrides on top. A missing default file means defaults.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit {
        Some(path) => parse_settings(&std::fs::read_to_string(path)?)?,
        None => {
            let path = settings_path()?;
            if path.exists() {
                parse_settings(&std::fs::read_to_string(path)?)?
            } else {
                Settings::default()
            }
        }
    };

    if let Ok(url) = std::env::var("POLICYGUARD_API_URL") {
        if !url.trim().is_empty() {
            settings.api_url = url;
        }
    }
    if let Some(json) = env_bool("POLICYGUARD_LOG_JSON") {
        settings.log_json = json;
    }
    Ok(settings)
}
