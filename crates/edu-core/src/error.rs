//! Error types for the Edu Simplify client.

use thiserror::Error;

/// Local failures: storage backends, files and configuration.
///
/// Network failures have their own type in `edu-interaction`. Most callers
/// never see this type directly because [`crate::store::DurableStore`]
/// absorbs storage errors.
#[derive(Error, Debug, Clone)]
pub enum EduError {
    /// File system failure, with the `io::ErrorKind` folded into the message.
    #[error("IO error: {message}")]
    Io { message: String },

    /// A key-value backend could not complete the operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Content could not be encoded or decoded.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// `config.toml` is present but unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EduError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for EduError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for EduError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EduError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EduError>;
