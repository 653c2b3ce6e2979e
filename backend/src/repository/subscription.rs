//! Live subscriptions
//!
//! A store `watch` yields a `SnapshotFeed` of raw subtree values. Entity
//! services wrap it in a `Subscription<T>` that re-decodes the whole subtree
//! into a typed collection on every change. Consumers pull the latest
//! snapshot; intermediate states may be coalesced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::{self, Stream};
use serde_json::Value;
use tokio::sync::watch;

use crate::domain::DomainError;

type CancelFn = Box<dyn FnOnce() + Send>;

struct HandleInner {
    active: AtomicBool,
    cancel: Mutex<Option<CancelFn>>,
}

/// Stops delivery of a subscription. Cloneable; only the first call acts.
#[derive(Clone)]
pub struct UnsubscribeHandle {
    inner: Arc<HandleInner>,
}

impl UnsubscribeHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                active: AtomicBool::new(true),
                cancel: Mutex::new(Some(Box::new(cancel))),
            }),
        }
    }

    pub fn unsubscribe(&self) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }
        let cancel = self
            .inner
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for UnsubscribeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsubscribeHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Why the store side of a feed stopped. Set by the adapter before it drops
/// its sender.
#[derive(Clone, Default)]
pub struct FeedStatus {
    cause: Arc<Mutex<Option<DomainError>>>,
}

impl FeedStatus {
    pub fn fail(&self, cause: DomainError) {
        *self.cause.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(cause);
    }

    fn cause(&self) -> Option<DomainError> {
        self.cause
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Raw subtree values from a store watch (`None` = subtree absent)
pub struct SnapshotFeed {
    rx: watch::Receiver<Option<Value>>,
    handle: UnsubscribeHandle,
    status: FeedStatus,
    primed: bool,
}

impl SnapshotFeed {
    pub fn new(rx: watch::Receiver<Option<Value>>, handle: UnsubscribeHandle) -> Self {
        Self::with_status(rx, handle, FeedStatus::default())
    }

    pub fn with_status(rx: watch::Receiver<Option<Value>>, handle: UnsubscribeHandle, status: FeedStatus) -> Self {
        Self {
            rx,
            handle,
            status,
            primed: false,
        }
    }

    /// After `next` returned `None`: the error that ended the feed, or `None`
    /// when the consumer unsubscribed
    pub fn end_cause(&self) -> Option<DomainError> {
        if !self.handle.is_active() {
            return None;
        }
        Some(
            self.status
                .cause()
                .unwrap_or_else(|| DomainError::Unavailable("live feed closed by the store".to_string())),
        )
    }

    /// Current value on the first call, then the next changed value.
    /// Returns `None` once unsubscribed or when the store side closes.
    pub async fn next(&mut self) -> Option<Option<Value>> {
        if !self.handle.is_active() {
            return None;
        }
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        if self.rx.changed().await.is_err() || !self.handle.is_active() {
            return None;
        }
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn handle(&self) -> UnsubscribeHandle {
        self.handle.clone()
    }
}

type Decoder<T> = Box<dyn Fn(Option<Value>) -> Vec<T> + Send + Sync>;

/// Typed stream of full-collection snapshots
pub struct Subscription<T> {
    feed: SnapshotFeed,
    decode: Decoder<T>,
}

impl<T> Subscription<T> {
    pub fn handle(&self) -> UnsubscribeHandle {
        self.feed.handle()
    }

    pub fn unsubscribe(&self) {
        self.feed.handle.unsubscribe();
    }

    /// See [`SnapshotFeed::end_cause`]
    pub fn end_cause(&self) -> Option<DomainError> {
        self.feed.end_cause()
    }
}

impl<T: Send + 'static> Subscription<T> {
    pub fn new(
        feed: SnapshotFeed,
        decode: impl Fn(Option<Value>) -> Vec<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            feed,
            decode: Box::new(decode),
        }
    }

    pub async fn next(&mut self) -> Option<Vec<T>> {
        let raw = self.feed.next().await?;
        Some((self.decode)(raw))
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<T>> + Send {
        stream::unfold(self, |mut sub| async move {
            let snapshot = sub.next().await?;
            Some((snapshot, sub))
        })
    }

    /// Push every snapshot to `callback` from a background task.
    /// The returned handle stops delivery.
    pub fn listen<F>(mut self, mut callback: F) -> UnsubscribeHandle
    where
        F: FnMut(Vec<T>) + Send + 'static,
    {
        let handle = self.handle();
        tokio::spawn(async move {
            while let Some(snapshot) = self.next().await {
                callback(snapshot);
            }
            log::debug!("Subscription listener finished");
        });
        handle
    }
}
