//! Askbook view state
//!
//! Page logic over the backend services: live collections, editor drafts,
//! derived views and user notices. Rendering is up to the embedding UI.

pub mod context;
pub mod draft;
pub mod models;
pub mod notify;
pub mod pages;
pub mod projection;
pub mod session;
pub mod store;

pub use context::{AppContext, Theme};
pub use notify::{Notice, NoticeBoard, NoticeLevel, NOTICE_CAPACITY};
pub use pages::{DashboardPage, NotesPage, QuestionsPage};
pub use session::{IdentityProvider, LocalIdentity};
