use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

/// Environment variable holding the scoring service base URL.
pub const API_BASE_URL_ENV: &str = "RESUME_SCORER_API_BASE_URL";

/// Used when nothing else resolves to a usable URL.
pub const DEFAULT_FALLBACK_BASE_URL: &str = "https://career-mate-ai.onrender.com";

pub const ANALYZE_PATH: &str = "/upload-resume/v2";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub fallback_base_url: Option<String>,
    pub default_role: Option<String>,
    pub resume_dir: Option<PathBuf>,
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

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Malformed config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_default_role(role: &str) -> Result<()> {
        Self::save_default_role_to(&Self::get_config_path()?, role)
    }

    /// Updates only the role. A file that fails to load is left untouched.
    pub fn save_default_role_to(path: &Path, role: &str) -> Result<()> {
        let mut config = Self::load_from(path)?;
        if config.default_role.as_deref() == Some(role) {
            return Ok(());
        }
        config.default_role = Some(role.to_string());
        config.save_to(path)
    }

    /// Combine the CLI flag, the environment value and this file into the
    /// endpoint configuration the client is built with. Earlier sources win.
    pub fn api_config(&self, cli_url: Option<String>, env_url: Option<String>) -> ApiConfig {
        let base_url = [cli_url, env_url, self.api_base_url.clone()]
            .into_iter()
            .flatten()
            .find(|url| normalize_base_url(url).is_some());

        let fallback_base_url = self
            .fallback_base_url
            .clone()
            .filter(|url| normalize_base_url(url).is_some())
            .unwrap_or_else(|| DEFAULT_FALLBACK_BASE_URL.to_string());

        ApiConfig::new(base_url, fallback_base_url)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("resume-scorer").join("config.json"))
    }
}

/// Where the scoring service lives. Resolved once at startup and handed to
/// the client; nothing downstream reads the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub fallback_base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: Option<String>, fallback_base_url: impl Into<String>) -> Self {
        Self {
            base_url,
            fallback_base_url: fallback_base_url.into(),
        }
    }

    /// The configured URL when it is usable, otherwise the fallback. Never
    /// ends with a slash.
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .and_then(normalize_base_url)
            .or_else(|| normalize_base_url(&self.fallback_base_url))
            .unwrap_or_else(|| DEFAULT_FALLBACK_BASE_URL.to_string())
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.resolved_base_url(), ANALYZE_PATH)
    }

    pub fn health_url(&self) -> String {
        format!("{}/", self.resolved_base_url())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(None, DEFAULT_FALLBACK_BASE_URL)
    }
}

fn normalize_base_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
