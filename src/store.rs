//! Live collection state
//!
//! Holds the latest snapshot of one subscription. Every snapshot replaces
//! the whole list; the only local edit is `patch`, used for write-through
//! toggles before their snapshot arrives.

use askbook_backend::domain::DomainResult;
use askbook_backend::repository::Subscription;

pub struct LiveList<T> {
    items: Vec<T>,
    loading: bool,
    subscription: Option<Subscription<T>>,
}

impl<T> LiveList<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// True until the first snapshot arrives
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
    }

    /// Edit the first matching entry in place
    pub fn patch(&mut self, matches: impl Fn(&T) -> bool, apply: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| matches(item)) {
            Some(item) => {
                apply(item);
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl<T: Send + 'static> LiveList<T> {
    pub fn new(subscription: Subscription<T>) -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            subscription: Some(subscription),
        }
    }

    /// Wait for the next snapshot and apply it. `Ok(false)` once there is
    /// no subscription; the error that ended it if the store closed the feed.
    pub async fn pump(&mut self) -> DomainResult<bool> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(false);
        };
        match subscription.next().await {
            Some(items) => {
                self.replace(items);
                Ok(true)
            }
            None => {
                let cause = subscription.end_cause();
                self.subscription = None;
                match cause {
                    Some(cause) => Err(cause),
                    None => Ok(false),
                }
            }
        }
    }
}

impl<T> Drop for LiveList<T> {
    fn drop(&mut self) {
        self.release();
    }
}
