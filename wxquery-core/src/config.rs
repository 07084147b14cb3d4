use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{series::LabelZone, transport::HttpTransport, view::PresentationMode};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CHART_PATH: &str = "weather-chart.html";

/// Overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "WXQUERY_BASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://127.0.0.1:5000"
/// mode = "compact"
/// label_zone = "local"
/// chart_path = "weather-chart.html"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend serving `/process_request` and `/download_csv/{id}`.
    pub base_url: String,
    pub mode: PresentationMode,
    pub label_zone: LabelZone,
    /// Where the HTML chart is written.
    pub chart_path: PathBuf,
    /// HTTP timeout; absent means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mode: PresentationMode::default(),
            label_zone: LabelZone::default(),
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from the platform location, or defaults if it doesn't exist yet.
    ///
    /// `WXQUERY_BASE_URL` is applied here, so anything set on the returned
    /// value afterwards (CLI flags) takes precedence over it.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_from(&Self::config_file_path()?)?;
        Ok(cfg.with_base_url_override(std::env::var(BASE_URL_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wxquery", "wxquery-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace `base_url` with a non-blank override.
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url.filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url;
        }
        self
    }

    /// HTTP transport for `base_url`.
    pub fn transport(&self) -> Result<HttpTransport> {
        let base_url = self.base_url.clone();
        match self.timeout_secs {
            Some(secs) => HttpTransport::with_timeout(base_url, Duration::from_secs(secs))
                .context("Failed to build HTTP client"),
            None => Ok(HttpTransport::new(base_url)),
        }
    }
}
