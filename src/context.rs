//! Application Context
//!
//! Everything a page needs, handed to its constructor: services, identity,
//! clock, notices and the theme.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use askbook_backend::domain::{Clock, DomainError, DomainResult, Principal};
use askbook_backend::repository::{NoteService, QuestionService};
use askbook_backend::{init_logging, AppConfig, Backend};

use crate::notify::NoticeBoard;
use crate::session::IdentityProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub notes: NoteService,
    pub questions: QuestionService,
    pub identity: Arc<dyn IdentityProvider>,
    pub clock: Arc<dyn Clock>,
    pub notices: NoticeBoard,
    dark: Arc<AtomicBool>,
}

impl AppContext {
    pub fn new(backend: &Backend, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            notes: backend.notes.clone(),
            questions: backend.questions.clone(),
            identity,
            clock: backend.clock.clone(),
            notices: NoticeBoard::new(),
            dark: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Startup path: config file plus `ASKBOOK_*` overrides, file logging,
    /// then the configured store. A logger that is already installed is kept.
    pub fn bootstrap(config_path: &Path, identity: Arc<dyn IdentityProvider>) -> DomainResult<Self> {
        let config = AppConfig::load(config_path)?.with_env_overrides()?;
        if let Err(e) = init_logging(&config) {
            log::warn!("File logging not started: {}", e);
        }
        let backend = Backend::from_config(&config)?;
        Ok(Self::new(&backend, identity))
    }

    /// The signed-in principal, or `Unauthenticated`
    pub fn principal(&self) -> DomainResult<Principal> {
        self.identity
            .current_principal()
            .ok_or_else(|| DomainError::Unauthenticated("sign in required".to_string()))
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn theme(&self) -> Theme {
        if self.dark.load(Ordering::SeqCst) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        self.dark.store(theme == Theme::Dark, Ordering::SeqCst);
    }

    /// Flip light/dark; returns the new theme
    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        log::debug!("Theme set to {:?}", next);
        next
    }
}
