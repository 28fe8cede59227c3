//! Unified path management for Edu Simplify files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/edu-simplify/          # Config directory
//! └── config.toml                  # Client configuration
//!
//! ~/.local/share/edu-simplify/     # Data directory
//! └── store/                       # Durable key-value store (one JSON file per key)
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "edu-simplify";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves platform directories (XDG on Linux, the native locations elsewhere).
pub struct EduPaths;

impl EduPaths {
    /// Returns the configuration directory (e.g., `~/.config/edu-simplify/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g., `~/.local/share/edu-simplify/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory of the file-backed durable store.
    pub fn store_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_namespaced() {
        if let Ok(file) = EduPaths::config_file() {
            assert!(file.ends_with("edu-simplify/config.toml"));
        }
        if let Ok(dir) = EduPaths::store_dir() {
            assert!(dir.ends_with("edu-simplify/store"));
        }
    }
}
