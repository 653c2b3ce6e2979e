//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod clock;
mod entity;
mod note;
mod principal;
mod push_id;
mod question;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::{DomainError, DomainResult, Entity};
pub use note::{ChecklistItem, Note, NoteColor};
pub use principal::Principal;
pub use push_id::{compare_keys, PushIdGenerator, PUSH_ID_LEN};
pub use question::Question;
