//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! `RemoteStore` is the tree database; `EntityService` is the typed layer
//! over one per-user collection of it.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::path::StorePath;
use super::subscription::{SnapshotFeed, Subscription};
use crate::domain::{DomainResult, Entity, Principal};

/// Hosted tree-structured store with point writes and live subtree feeds
///
/// Writing `null` (or an empty object) anywhere deletes that node.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fresh, time-ordered child key; never reused
    fn push_key(&self) -> String;

    /// One-shot read; `None` when nothing exists at `path`
    async fn get(&self, path: &StorePath) -> DomainResult<Option<Value>>;

    /// Replace the node at `path`
    async fn set(&self, path: &StorePath, value: Value) -> DomainResult<()>;

    /// Multi-path merge below `path`; keys are relative `a/b/c` paths.
    /// All fields are applied as one atomic write.
    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> DomainResult<()>;

    /// Delete the whole subtree at `path`
    async fn remove(&self, path: &StorePath) -> DomainResult<()>;

    /// Live feed of the subtree at `path`, starting with its current value
    async fn watch(&self, path: &StorePath) -> DomainResult<SnapshotFeed>;
}

/// Typed CRUD and live listing of one entity kind for one principal
///
/// Generic over any Entity type.
#[async_trait]
pub trait EntityService<T: Entity>: Send + Sync {
    /// One-shot read; an absent subtree is an empty list
    async fn list(&self, principal: &Principal) -> DomainResult<Vec<T>>;

    /// Live full-collection snapshots, the first delivered immediately
    async fn subscribe(&self, principal: &Principal) -> DomainResult<Subscription<T>>;

    /// Write a new entity under a fresh key and return that key
    async fn create(&self, principal: &Principal, entity: &T) -> DomainResult<String>;

    /// Merge the entity's fields into its existing node
    async fn update(&self, principal: &Principal, entity: &T) -> DomainResult<()>;

    /// Remove the entity and everything nested under it
    async fn delete(&self, principal: &Principal, id: &str) -> DomainResult<()>;
}
