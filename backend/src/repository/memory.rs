//! In-memory tree store
//!
//! Implements `RemoteStore` over a single JSON tree held in process. Watchers
//! are notified when a write touches their subtree and its value changed.
//! A fault can be injected to make every operation fail, which is how the
//! connectivity and permission paths are exercised without a network.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;

use super::path::StorePath;
use super::subscription::{SnapshotFeed, UnsubscribeHandle};
use super::traits::RemoteStore;
use super::tree;
use crate::domain::{Clock, DomainResult, DomainError, PushIdGenerator, SystemClock};

struct Watcher {
    id: u64,
    path: StorePath,
    tx: watch::Sender<Option<Value>>,
}

struct MemoryInner {
    root: Value,
    watchers: Vec<Watcher>,
    next_watcher: u64,
    fault: Option<DomainError>,
}

impl MemoryInner {
    fn check_fault(&self) -> DomainResult<()> {
        match &self.fault {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Push the new subtree value to every watcher a write at `changed` can affect
    fn notify(&mut self, changed: &StorePath) {
        let root = &self.root;
        self.watchers.retain(|w| !w.tx.is_closed());
        for watcher in self.watchers.iter().filter(|w| w.path.overlaps(changed)) {
            let current = tree::snapshot_at(root, watcher.path.segments());
            watcher.tx.send_if_modified(|slot| {
                if *slot == current {
                    false
                } else {
                    *slot = current;
                    true
                }
            });
        }
    }
}

/// Process-local `RemoteStore`
pub struct MemoryStore {
    // std Mutex: never held across an await
    inner: Arc<Mutex<MemoryInner>>,
    ids: PushIdGenerator,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Push keys take their time prefix from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                root: Value::Object(Map::new()),
                watchers: Vec::new(),
                next_watcher: 0,
                fault: None,
            })),
            ids: PushIdGenerator::new(clock),
        }
    }

    /// Make every following operation fail with `fault` (`None` heals)
    pub fn inject_fault(&self, fault: Option<DomainError>) {
        self.lock().fault = fault;
    }

    /// Number of live watchers, for lifecycle checks
    pub fn watcher_count(&self) -> usize {
        let mut inner = self.lock();
        inner.watchers.retain(|w| !w.tx.is_closed());
        inner.watchers.len()
    }

    /// Copy of the whole tree
    pub fn dump(&self) -> Value {
        self.lock().root.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        lock_inner(&self.inner)
    }

    fn write(&self, path: &StorePath, value: Value) -> DomainResult<()> {
        let mut inner = self.lock();
        inner.check_fault()?;
        tree::write_at(&mut inner.root, path.segments(), value);
        inner.notify(path);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_inner(inner: &Mutex<MemoryInner>) -> MutexGuard<'_, MemoryInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn push_key(&self) -> String {
        self.ids.next_id()
    }

    async fn get(&self, path: &StorePath) -> DomainResult<Option<Value>> {
        let inner = self.lock();
        inner.check_fault()?;
        Ok(tree::snapshot_at(&inner.root, path.segments()))
    }

    async fn set(&self, path: &StorePath, value: Value) -> DomainResult<()> {
        log::debug!("set {}", path);
        self.write(path, value)
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> DomainResult<()> {
        log::debug!("update {} ({} fields)", path, fields.len());
        // Resolve every key first so a bad key leaves the tree untouched
        let targets = fields
            .into_iter()
            .map(|(key, value)| Ok((path.join(&key)?, value)))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut inner = self.lock();
        inner.check_fault()?;
        for (target, value) in targets {
            tree::write_at(&mut inner.root, target.segments(), value);
        }
        inner.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> DomainResult<()> {
        log::debug!("remove {}", path);
        self.write(path, Value::Null)
    }

    async fn watch(&self, path: &StorePath) -> DomainResult<SnapshotFeed> {
        let mut inner = self.lock();
        inner.check_fault()?;

        let (tx, rx) = watch::channel(tree::snapshot_at(&inner.root, path.segments()));
        let id = inner.next_watcher;
        inner.next_watcher += 1;
        inner.watchers.push(Watcher {
            id,
            path: path.clone(),
            tx,
        });
        log::debug!("watch {} (watcher {})", path, id);

        let weak: Weak<Mutex<MemoryInner>> = Arc::downgrade(&self.inner);
        let handle = UnsubscribeHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock_inner(&inner).watchers.retain(|w| w.id != id);
            }
        });
        Ok(SnapshotFeed::new(rx, handle))
    }
}
