//! Question Entity
//!
//! A question to bring up with someone, tracked until it has been asked.
//! `asked_at` is present exactly when `already_asked` is true.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Question {
    /// Store-assigned key, not a stored field
    #[serde(skip)]
    pub id: String,
    pub text: String,
    pub already_asked: bool,
    /// Serialized as null when absent so that updates clear it
    pub notes: Option<String>,
    pub created_at: i64,
    pub asked_at: Option<i64>,
}

impl Question {
    /// A pending question; blank notes are dropped
    pub fn new(text: &str, notes: Option<&str>, now: i64) -> Self {
        Self {
            id: String::new(),
            text: text.trim().to_string(),
            already_asked: false,
            notes: notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            created_at: now,
            asked_at: None,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.text.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "question text must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn mark_asked(&mut self, asked: bool, now: i64) {
        self.already_asked = asked;
        self.asked_at = if asked { Some(now) } else { None };
    }
}

impl Entity for Question {
    const KIND: &'static str = "questions";

    fn id(&self) -> &str {
        &self.id
    }

    fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}
