//! Command implementations.

pub mod auth;
pub mod chat;
pub mod history;
pub mod study;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use edu_application::StudySession;
use edu_core::store::{DurableStore, KeyValueStore};
use edu_infrastructure::{ConfigService, FileKeyValueStore, MemoryKeyValueStore};
use edu_interaction::{EduApi, ResilientClient};

/// Everything a command needs, built once from configuration.
pub struct App {
    pub session: StudySession,
}

impl App {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        let config = service.load().context("Failed to load configuration")?;

        let backend: Arc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FileKeyValueStore::new(dir)),
            None => {
                tracing::warn!("No storage directory available, history will not be kept");
                Arc::new(MemoryKeyValueStore::new())
            }
        };

        let client = Arc::new(ResilientClient::from_config(&config));
        tracing::debug!(candidates = ?client.candidates(), "API candidates");

        Ok(Self {
            session: StudySession::new(Arc::new(EduApi::new(client)), DurableStore::new(backend)),
        })
    }
}
