//! Client configuration loading.
//!
//! Configuration priority: environment variables > config.toml > defaults.

use std::path::{Path, PathBuf};

use edu_core::config::ClientConfig;
use edu_core::error::{EduError, Result};

use crate::paths::EduPaths;

/// Overrides `api_base_url`.
pub const ENV_API_URL: &str = "EDU_SIMPLIFY_API_URL";

/// Overrides `storage_dir`.
pub const ENV_STORAGE_DIR: &str = "EDU_SIMPLIFY_STORAGE_DIR";

/// Loads [`ClientConfig`] from a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Uses the default `config.toml` location.
    pub fn new() -> Self {
        Self {
            path: EduPaths::config_file().ok(),
        }
    }

    /// Uses an explicit config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the file (if any) and applies environment overrides.
    ///
    /// A missing file yields defaults; a malformed file is a config error.
    pub fn load(&self) -> Result<ClientConfig> {
        let mut config = self.load_file()?;
        apply_overrides(&mut config, |name| std::env::var(name).ok());

        if config.storage_dir.is_none() {
            config.storage_dir = EduPaths::store_dir().ok();
        }

        tracing::debug!(?config, "Loaded client configuration");
        Ok(config)
    }

    fn load_file(&self) -> Result<ClientConfig> {
        let Some(path) = &self.path else {
            return Ok(ClientConfig::default());
        };

        if !path.exists() {
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            EduError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies environment overrides using `lookup` to read variables.
fn apply_overrides(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api_base_url = Some(url);
    }
    if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.trim().is_empty()) {
        config.storage_dir = Some(PathBuf::from(dir));
    }
}
