use std::{fs, path::Path};

use serde::Deserialize;

use crate::core::error::OsintError;

pub const DEFAULT_CONFIG_PATH: &str = "config/bharat-osint.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the provider key.
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
    pub recent_store_path: String,
    pub export_dir: String,
    pub provider: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: format!("bharat-osint/{}", env!("CARGO_PKG_VERSION")),
            recent_store_path: "data/recent_searches.json".to_string(),
            export_dir: "out".to_string(),
            provider: ProviderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, OsintError> {
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| OsintError::Config(e.to_string()))?;
    let cfg: AppConfig =
        toml::from_str(&content).map_err(|e| OsintError::Config(e.to_string()))?;
    if cfg.timeout_ms == 0 {
        return Err(OsintError::Config("timeout_ms must be greater than zero".into()));
    }
    Ok(cfg)
}
