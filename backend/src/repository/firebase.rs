//! Realtime Database REST adapter
//!
//! Point operations map to `GET`/`PUT`/`PATCH`/`DELETE` on
//! `{database_url}/{path}.json`. A watch opens an event stream on the same
//! URL and keeps a local copy of the subtree current from `put`/`patch`
//! events. No reconnect: when the stream ends, the feed ends.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use reqwest::header::ACCEPT;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::watch;

use super::path::StorePath;
use super::sse::{SseDecoder, SseEvent};
use super::subscription::{FeedStatus, SnapshotFeed, UnsubscribeHandle};
use super::traits::RemoteStore;
use super::tree;
use crate::domain::{Clock, DomainError, DomainResult, PushIdGenerator};

const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub struct FirebaseStore {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    ids: PushIdGenerator,
}

impl FirebaseStore {
    pub fn new(database_url: &str, auth_token: Option<String>, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        let base_url = database_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(DomainError::InvalidInput(format!(
                "database url must be http(s): {}",
                database_url
            )));
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            ids: PushIdGenerator::new(clock),
        })
    }

    pub fn url(&self, path: &StorePath) -> String {
        let encoded: Vec<String> = path
            .segments()
            .iter()
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        let mut url = format!("{}/{}.json", self.base_url, encoded.join("/"));
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(&utf8_percent_encode(token, NON_ALPHANUMERIC).to_string());
        }
        url
    }
}

async fn check(response: Response) -> DomainResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(DomainError::PermissionDenied(format!("{}: {}", status, body)))
        }
        _ => Err(DomainError::Unavailable(format!("{}: {}", status, body))),
    }
}

#[derive(Debug, Deserialize)]
struct StreamPayload {
    path: String,
    data: Value,
}

#[derive(Debug, PartialEq)]
enum StreamStep {
    Changed,
    Ignored,
    Closed(&'static str),
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/').filter(|s| !s.is_empty()).map(String::from).collect()
}

/// Apply one stream event to the cached subtree
fn apply_event(cache: &mut Value, event: &SseEvent) -> DomainResult<StreamStep> {
    match event.event.as_str() {
        "put" => {
            let payload: StreamPayload = serde_json::from_str(&event.data)?;
            tree::write_at(cache, &split_path(&payload.path), payload.data);
            Ok(StreamStep::Changed)
        }
        "patch" => {
            let payload: StreamPayload = serde_json::from_str(&event.data)?;
            let base = split_path(&payload.path);
            let Value::Object(fields) = payload.data else {
                return Err(DomainError::Decode("patch data is not an object".to_string()));
            };
            for (key, value) in fields {
                let mut target = base.clone();
                target.extend(split_path(&key));
                tree::write_at(cache, &target, value);
            }
            Ok(StreamStep::Changed)
        }
        "cancel" => Ok(StreamStep::Closed("cancelled by security rules")),
        "auth_revoked" => Ok(StreamStep::Closed("auth token revoked")),
        _ => Ok(StreamStep::Ignored),
    }
}

#[async_trait]
impl RemoteStore for FirebaseStore {
    fn push_key(&self) -> String {
        self.ids.next_id()
    }

    async fn get(&self, path: &StorePath) -> DomainResult<Option<Value>> {
        let response = check(self.client.get(self.url(path)).send().await?).await?;
        let value: Value = response.json().await?;
        Ok(tree::normalize(value))
    }

    async fn set(&self, path: &StorePath, value: Value) -> DomainResult<()> {
        log::debug!("PUT {}", path);
        check(self.client.put(self.url(path)).json(&value).send().await?).await?;
        Ok(())
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> DomainResult<()> {
        log::debug!("PATCH {} ({} fields)", path, fields.len());
        for key in fields.keys() {
            path.join(key)?;
        }
        let body = Value::Object(fields);
        check(self.client.patch(self.url(path)).json(&body).send().await?).await?;
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> DomainResult<()> {
        log::debug!("DELETE {}", path);
        check(self.client.delete(self.url(path)).send().await?).await?;
        Ok(())
    }

    async fn watch(&self, path: &StorePath) -> DomainResult<SnapshotFeed> {
        let response = self
            .client
            .get(self.url(path))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let mut body = Box::pin(check(response).await?.bytes_stream());
        let mut decoder = SseDecoder::new();
        let mut cache = Value::Null;

        // The first put carries the whole subtree; wait for it so the first
        // snapshot handed out is real data
        let mut initialized = false;
        while !initialized {
            let chunk = match body.next().await {
                Some(chunk) => chunk?,
                None => {
                    return Err(DomainError::Unavailable(format!(
                        "event stream for {} closed before initial data",
                        path
                    )))
                }
            };
            for event in decoder.feed(&chunk) {
                match apply_event(&mut cache, &event)? {
                    StreamStep::Changed => initialized = true,
                    StreamStep::Ignored => {}
                    StreamStep::Closed(reason) => {
                        return Err(DomainError::PermissionDenied(format!("{}: {}", path, reason)))
                    }
                }
            }
        }

        let (tx, rx) = watch::channel(tree::snapshot_at(&cache, &[]));
        let status = FeedStatus::default();
        let closer = status.clone();
        let label = path.to_string();
        let task = tokio::spawn(async move {
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        log::warn!("Event stream for {} failed: {}", label, e);
                        closer.fail(DomainError::from(e));
                        return;
                    }
                };
                for event in decoder.feed(&chunk) {
                    match apply_event(&mut cache, &event) {
                        Ok(StreamStep::Changed) => {
                            let current = tree::snapshot_at(&cache, &[]);
                            tx.send_if_modified(|slot| {
                                if *slot == current {
                                    false
                                } else {
                                    *slot = current;
                                    true
                                }
                            });
                            if tx.is_closed() {
                                return;
                            }
                        }
                        Ok(StreamStep::Ignored) => {}
                        Ok(StreamStep::Closed(reason)) => {
                            log::warn!("Event stream for {} closed: {}", label, reason);
                            closer.fail(DomainError::PermissionDenied(format!("{}: {}", label, reason)));
                            return;
                        }
                        Err(e) => log::warn!("Skipping malformed event on {}: {}", label, e),
                    }
                }
            }
            log::info!("Event stream for {} ended", label);
            closer.fail(DomainError::Unavailable(format!("event stream for {} ended", label)));
        });

        let abort = task.abort_handle();
        Ok(SnapshotFeed::with_status(rx, UnsubscribeHandle::new(move || abort.abort()), status))
    }
}
