//! Application Configuration
//!
//! Stored as JSON next to the app data; environment variables override the
//! file so deployments can inject the database URL and token.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Which `RemoteStore` backs the services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local tree, nothing persisted
    #[default]
    Memory,
    /// Realtime Database over REST
    Firebase,
}

impl StoreBackend {
    pub fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "firebase" => Ok(StoreBackend::Firebase),
            other => Err(DomainError::InvalidInput(format!("unknown store backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub auth_token: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::Memory,
            database_url: None,
            auth_token: None,
            log_dir: None,
            app_name: "Askbook".to_string(),
        }
    }
}

impl AppConfig {
    /// Read from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> DomainResult<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)
            .map_err(|e| DomainError::InvalidInput(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> DomainResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Apply `ASKBOOK_*` environment overrides
    pub fn with_env_overrides(self) -> DomainResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        if let Some(store) = lookup("ASKBOOK_STORE") {
            self.store = StoreBackend::from_str(&store)?;
        }
        if let Some(url) = lookup("ASKBOOK_DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(token) = lookup("ASKBOOK_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
        if let Some(dir) = lookup("ASKBOOK_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }
}
