use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::backend::{normalize_backend_url, DEFAULT_TIMEOUT};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub backend_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_backend_url(url: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.backend_url = Some(normalize_backend_url(url));
        config.save()
    }

    /// Command line (or env) wins over the file, the file over the default.
    pub fn resolve_backend_url(&self, override_url: Option<&str>) -> String {
        let url = override_url
            .or(self.backend_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL);
        normalize_backend_url(url)
    }

    /// Same precedence as the URL; a zero at any level counts as unset.
    pub fn resolve_timeout(&self, override_secs: Option<u64>) -> Duration {
        let positive = |secs: &u64| *secs > 0;
        override_secs
            .filter(positive)
            .or(self.request_timeout_secs.filter(positive))
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("pantry-chef").join("config.json"))
    }
}
