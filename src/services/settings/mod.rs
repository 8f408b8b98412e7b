// Settings service
// Loads and saves the client configuration file

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::AppConfig;

/// Overrides `api_base_url` without touching the file
pub const API_URL_ENV: &str = "BAK_CLINIC_API_URL";

pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/config.toml` for this application
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("cl", "BAK", "BAK Clinic")
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(Self::new(dirs.config_dir().join("config.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file, falling back to defaults when it does not exist
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = if self.path.exists() {
            let contents = fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read config file {}", self.path.display()))?;
            toml::from_str::<AppConfig>(&contents)
                .with_context(|| format!("Failed to parse config file {}", self.path.display()))?
        } else {
            log::info!("No config at {}, using defaults", self.path.display());
            AppConfig::default()
        };

        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                log::info!("API base URL overridden by {}", API_URL_ENV);
                config.api_base_url = url;
            }
        }

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        config.api_base_url = config.normalized_base_url();
        Ok(config)
    }

    /// Validate and write the config file
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))?;
        log::info!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Load, or defaults with a logged error when the file is unusable
    pub fn load_or_default(&self) -> AppConfig {
        self.load().unwrap_or_else(|err| {
            log::error!("{:#}; using default configuration", err);
            AppConfig::default()
        })
    }
}
