//! Askbook Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Store abstraction, adapters and entity services
//! - config: Application configuration

use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod repository;

pub use config::{AppConfig, StoreBackend};

use domain::{Clock, DomainError, DomainResult, SystemClock};
use repository::{FirebaseStore, MemoryStore, NoteService, QuestionService, RemoteStore};

/// Services shared across the application
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn RemoteStore>,
    pub clock: Arc<dyn Clock>,
    pub notes: NoteService,
    pub questions: QuestionService,
}

impl Backend {
    pub fn new(store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notes: NoteService::new(store.clone(), clock.clone()),
            questions: QuestionService::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    pub fn in_memory() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::new(Arc::new(MemoryStore::with_clock(clock.clone())), clock)
    }

    /// Build the store selected by `config`
    pub fn from_config(config: &AppConfig) -> DomainResult<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store: Arc<dyn RemoteStore> = match config.store {
            StoreBackend::Memory => Arc::new(MemoryStore::with_clock(clock.clone())),
            StoreBackend::Firebase => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    DomainError::InvalidInput("firebase store needs database_url".to_string())
                })?;
                Arc::new(FirebaseStore::new(url, config.auth_token.clone(), clock.clone())?)
            }
        };
        log::info!("Backend ready ({:?} store)", config.store);
        Ok(Self::new(store, clock))
    }
}

/// Install the rolling file logger
pub fn init_logging(config: &AppConfig) -> DomainResult<()> {
    let dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(config.app_name.to_lowercase()).join("logs"));
    rolling_logger::init_logger(dir, &config.app_name).map_err(DomainError::Internal)
}
