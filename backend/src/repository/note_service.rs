//! Note Service
//!
//! Notes under `users/{uid}/notes`. Snapshots are delivered in store order;
//! callers sort as their view needs.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::collection::{keep_store_order, EntityCollection};
use super::path::StorePath;
use super::subscription::Subscription;
use super::traits::{EntityService, RemoteStore};
use crate::domain::{compare_keys, ChecklistItem, Clock, DomainError, DomainResult, Entity, Note, Principal};

#[derive(Clone)]
pub struct NoteService {
    notes: EntityCollection<Note>,
    clock: Arc<dyn Clock>,
}

impl NoteService {
    pub fn new(store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notes: EntityCollection::new(store),
            clock,
        }
    }

    /// Fresh checklist item; ids are push keys, so they are unique and
    /// sort in insertion order
    pub fn new_item(&self, text: &str) -> ChecklistItem {
        ChecklistItem::new(self.notes.store().push_key(), text.to_string())
    }

    /// Give every item a fresh push key when the stored key order would not
    /// reproduce the list order (index-keyed legacy items after a reorder,
    /// or ids that are not valid keys). Returns whether it re-keyed.
    fn rekey_items(&self, items: &mut [ChecklistItem]) -> bool {
        let valid = items.iter().all(|item| StorePath::root().child(&item.id).is_ok());
        let ordered = items
            .windows(2)
            .all(|pair| compare_keys(&pair[0].id, &pair[1].id) == Ordering::Less);
        if valid && ordered {
            return false;
        }
        for item in items.iter_mut() {
            item.id = self.notes.store().push_key();
        }
        true
    }

    fn prepared(&self, note: &Note) -> Note {
        let mut note = note.clone();
        if self.rekey_items(&mut note.items) {
            log::info!("Re-keyed {} checklist items of note {:?}", note.items.len(), note.id);
        }
        note
    }

    /// Set one item's checked flag and bump the note's `updatedAt`, as a
    /// single multi-path write. If the note was deleted meanwhile, the write
    /// leaves a partial node that still decodes.
    pub async fn toggle_checklist_item(
        &self,
        principal: &Principal,
        note_id: &str,
        item_id: &str,
        checked: bool,
    ) -> DomainResult<()> {
        if item_id.is_empty() {
            return Err(DomainError::InvalidInput("empty checklist item id".to_string()));
        }
        let mut fields = Map::new();
        fields.insert(format!("items/{}/checked", item_id), Value::Bool(checked));
        fields.insert("updatedAt".to_string(), json!(self.clock.now_millis()));
        self.notes.update_fields(principal, note_id, fields).await
    }
}

#[async_trait]
impl EntityService<Note> for NoteService {
    async fn list(&self, principal: &Principal) -> DomainResult<Vec<Note>> {
        self.notes.list(principal).await
    }

    async fn subscribe(&self, principal: &Principal) -> DomainResult<Subscription<Note>> {
        self.notes.subscribe(principal, keep_store_order).await
    }

    async fn create(&self, principal: &Principal, note: &Note) -> DomainResult<String> {
        self.notes.create(principal, &self.prepared(note)).await
    }

    /// Writes every field; `updatedAt` is always replaced with the current time
    async fn update(&self, principal: &Principal, note: &Note) -> DomainResult<()> {
        if note.id().is_empty() {
            return Err(DomainError::InvalidInput("note has no id".to_string()));
        }
        let mut fields = self.prepared(note).to_fields()?;
        fields.insert("updatedAt".to_string(), json!(self.clock.now_millis()));
        self.notes.update_fields(principal, note.id(), fields).await
    }

    async fn delete(&self, principal: &Principal, id: &str) -> DomainResult<()> {
        self.notes.delete(principal, id).await
    }
}
