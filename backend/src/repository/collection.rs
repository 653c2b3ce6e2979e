//! Per-user entity collections
//!
//! The part of every entity service that does not depend on the entity:
//! key paths, whole-subtree decoding and the plain store calls.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::path::StorePath;
use super::subscription::Subscription;
use super::traits::RemoteStore;
use crate::domain::{DomainResult, Entity, Principal};

/// Decode a collection node: one entity per immediate child, keyed by id.
/// An absent node is an empty collection; children that fail to decode are
/// skipped. Order is the store's key order.
pub fn decode_collection<T: Entity>(raw: Option<Value>) -> Vec<T> {
    let Some(Value::Object(children)) = raw else {
        return Vec::new();
    };

    let mut entities = Vec::with_capacity(children.len());
    for (key, child) in children {
        match serde_json::from_value::<T>(child) {
            Ok(entity) => entities.push(entity.with_id(key)),
            Err(e) => log::warn!("Skipping undecodable {} entry {}: {}", T::KIND, key, e),
        }
    }
    entities
}

pub struct EntityCollection<T: Entity> {
    store: Arc<dyn RemoteStore>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for EntityCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T: Entity> EntityCollection<T> {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn path(&self, principal: &Principal) -> DomainResult<StorePath> {
        StorePath::user_collection(principal, T::KIND)
    }

    pub fn entity_path(&self, principal: &Principal, id: &str) -> DomainResult<StorePath> {
        StorePath::user_entity(principal, T::KIND, id)
    }

    pub async fn list(&self, principal: &Principal) -> DomainResult<Vec<T>> {
        let raw = self.store.get(&self.path(principal)?).await?;
        Ok(decode_collection(raw))
    }

    /// Live collection; `arrange` runs on every decoded snapshot
    pub async fn subscribe(
        &self,
        principal: &Principal,
        arrange: fn(&mut Vec<T>),
    ) -> DomainResult<Subscription<T>> {
        let feed = self.store.watch(&self.path(principal)?).await?;
        Ok(Subscription::new(feed, move |raw| {
            let mut entities = decode_collection(raw);
            arrange(&mut entities);
            entities
        }))
    }

    pub async fn create(&self, principal: &Principal, entity: &T) -> DomainResult<String> {
        let id = self.store.push_key();
        let path = self.entity_path(principal, &id)?;
        let fields = entity.to_fields()?;
        self.store.set(&path, Value::Object(fields)).await?;
        log::info!("Created {} {}", T::KIND, id);
        Ok(id)
    }

    pub async fn update_fields(
        &self,
        principal: &Principal,
        id: &str,
        fields: Map<String, Value>,
    ) -> DomainResult<()> {
        let path = self.entity_path(principal, id)?;
        self.store.update(&path, fields).await
    }

    pub async fn delete(&self, principal: &Principal, id: &str) -> DomainResult<()> {
        let path = self.entity_path(principal, id)?;
        self.store.remove(&path).await?;
        log::info!("Deleted {} {}", T::KIND, id);
        Ok(())
    }
}

/// Leave the store's order untouched
pub fn keep_store_order<T>(_: &mut Vec<T>) {}
