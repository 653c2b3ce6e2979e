//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all stored entities.
//! Entities live as immediate children of a per-user collection node;
//! the child key is the entity's identifier and is never part of its fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone + Serialize + DeserializeOwned + 'static {
    /// Collection segment under `users/{uid}/`
    const KIND: &'static str;

    /// Returns the entity's store-assigned identifier (empty before creation)
    fn id(&self) -> &str;

    /// Returns the entity carrying the given identifier
    fn with_id(self, id: String) -> Self;

    /// Field map as written to the store, identifier excluded
    fn to_fields(&self) -> DomainResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(DomainError::Internal(format!(
                "{} did not serialize to an object: {}",
                Self::KIND,
                other
            ))),
        }
    }
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not signed in: {0}")]
    Unauthenticated(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(value: reqwest::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(value: std::io::Error) -> Self {
        Self::Internal(value.to_string())
    }
}
