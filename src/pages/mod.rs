//! Pages
//!
//! Each page owns its live collections and transient editor state. User
//! actions never fail outward: they report through the notice board and
//! return whether they succeeded. Dropping a page ends its subscriptions.

mod dashboard;
mod notes;
mod questions;


pub use dashboard::DashboardPage;
pub use notes::{NoteEditor, NotesPage};
pub use questions::{Composer, ComposerMode, QuestionsPage};
