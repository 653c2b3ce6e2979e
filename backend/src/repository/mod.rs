//! Repository Layer
//!
//! Store abstraction, adapters and the entity services built on them.

mod collection;
mod firebase;
mod memory;
mod note_service;
mod path;
mod question_service;
mod sse;
mod subscription;
mod traits;
mod tree;

#[cfg(test)]
mod tests;

pub use collection::{decode_collection, EntityCollection};
pub use firebase::FirebaseStore;
pub use memory::MemoryStore;
pub use note_service::NoteService;
pub use path::StorePath;
pub use question_service::QuestionService;
pub use sse::{SseDecoder, SseEvent};
pub use subscription::{FeedStatus, SnapshotFeed, Subscription, UnsubscribeHandle};
pub use traits::{EntityService, RemoteStore};
