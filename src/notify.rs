//! User-visible notices
//!
//! Pages report the outcome of user actions here instead of failing.
//! The embedding UI drains the board and shows toasts.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use askbook_backend::domain::DomainError;

/// Undrained notices kept; the oldest are dropped past this
pub const NOTICE_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct NoticeBoard {
    notices: Arc<Mutex<VecDeque<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: &str) {
        log::info!("{}", message);
        self.push(NoticeLevel::Success, message);
    }

    /// Record a failed action; the cause goes to the log only
    pub fn error(&self, message: &str, cause: &DomainError) {
        log::error!("{}: {}", message, cause);
        self.push(NoticeLevel::Error, message);
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        let mut notices = self.lock();
        while notices.len() >= NOTICE_CAPACITY {
            notices.pop_front();
        }
        notices.push_back(Notice {
            level,
            message: message.to_string(),
        });
    }

    pub fn latest(&self) -> Option<Notice> {
        self.lock().back().cloned()
    }

    /// Take every pending notice, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notice>> {
        self.notices.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_board() {
        let board = NoticeBoard::new();
        board.success("Note saved");
        board.error("Failed to save note", &DomainError::Unavailable("offline".into()));

        assert_eq!(board.latest().unwrap().level, NoticeLevel::Error);
        let notices = board.drain();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "Note saved");
        assert_eq!(notices[1].message, "Failed to save note");
        assert!(board.drain().is_empty());
    }

    #[test]
    fn test_board_keeps_newest_notices() {
        let board = NoticeBoard::new();
        for i in 0..NOTICE_CAPACITY + 10 {
            board.success(&format!("notice {}", i));
        }

        let notices = board.drain();
        assert_eq!(notices.len(), NOTICE_CAPACITY);
        assert_eq!(notices[0].message, "notice 10");
        assert_eq!(notices[NOTICE_CAPACITY - 1].message, format!("notice {}", NOTICE_CAPACITY + 9));
    }
}
