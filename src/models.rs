//! Frontend Models
//!
//! Backend entities plus the view-only enums the pages filter and sort by.

use serde::{Deserialize, Serialize};

pub use askbook_backend::domain::{ChecklistItem, Note, NoteColor, Principal, Question};

/// Which questions the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionFilter {
    #[default]
    All,
    Pending,
    Asked,
}

impl QuestionFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionFilter::All => "all",
            QuestionFilter::Pending => "pending",
            QuestionFilter::Asked => "asked",
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        match self {
            QuestionFilter::All => true,
            QuestionFilter::Pending => !question.already_asked,
            QuestionFilter::Asked => question.already_asked,
        }
    }
}

/// createdAt ordering of the question list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Newest => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::Newest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let mut q = Question::new("Why?", None, 1);
        assert!(QuestionFilter::All.matches(&q));
        assert!(QuestionFilter::Pending.matches(&q));
        assert!(!QuestionFilter::Asked.matches(&q));

        q.mark_asked(true, 2);
        assert!(QuestionFilter::Asked.matches(&q));
        assert!(!QuestionFilter::Pending.matches(&q));
    }

    #[test]
    fn test_sort_order_toggles() {
        assert_eq!(SortOrder::default().toggled(), SortOrder::Oldest);
        assert_eq!(SortOrder::Oldest.toggled(), SortOrder::Newest);
        assert_eq!(serde_json::to_string(&QuestionFilter::Pending).unwrap(), "\"pending\"");
    }
}
