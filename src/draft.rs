//! Editor drafts
//!
//! Opening an editor copies the entity's fields into a draft. Closing
//! drops it; saving merges it back onto the original, keeping id and
//! createdAt.

use crate::models::{ChecklistItem, Note, NoteColor, Question};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    pub is_check_list: bool,
    pub items: Vec<ChecklistItem>,
}

impl NoteDraft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            color: note.color,
            is_check_list: note.is_check_list,
            items: note.items.clone(),
        }
    }

    /// The note to write on save. `content` is kept even when the note is a
    /// checklist; switching modes never clears it.
    pub fn apply_to(&self, original: &Note) -> Note {
        Note {
            id: original.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            color: self.color,
            is_check_list: self.is_check_list,
            items: self.items.clone(),
            created_at: original.created_at,
            updated_at: original.updated_at,
        }
    }

    pub fn is_dirty(&self, original: &Note) -> bool {
        *self != Self::from_note(original)
    }

    pub fn add_item(&mut self, item: ChecklistItem) {
        self.items.push(item);
    }

    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        self.items.len() != before
    }

    pub fn set_checked(&mut self, item_id: &str, checked: bool) -> bool {
        match self.items.iter_mut().find(|item| item.id == item_id) {
            Some(item) => {
                item.checked = checked;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionDraft {
    pub text: String,
    pub notes: String,
}

impl QuestionDraft {
    pub fn from_question(question: &Question) -> Self {
        Self {
            text: question.text.clone(),
            notes: question.notes.clone().unwrap_or_default(),
        }
    }

    /// Text is required once trimmed
    pub fn is_submittable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn to_new(&self, now: i64) -> Question {
        Question::new(&self.text, Some(&self.notes), now)
    }

    /// Edited copy; asked state, createdAt and askedAt carry over
    pub fn apply_to(&self, original: &Question) -> Question {
        let edited = Question::new(&self.text, Some(&self.notes), original.created_at);
        Question {
            id: original.id.clone(),
            text: edited.text,
            notes: edited.notes,
            ..original.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_note() -> Note {
        Note {
            id: "n1".to_string(),
            title: "Shopping".to_string(),
            content: "remember the list".to_string(),
            created_at: 10,
            updated_at: 20,
            ..Note::new(10)
        }
    }

    #[test]
    fn test_note_draft_merges_onto_original() {
        let original = saved_note();
        let mut draft = NoteDraft::from_note(&original);
        assert!(!draft.is_dirty(&original));

        draft.title = "Groceries".to_string();
        draft.is_check_list = true;
        draft.add_item(ChecklistItem::new("i1".into(), "milk".into()));
        assert!(draft.is_dirty(&original));

        let merged = draft.apply_to(&original);
        assert_eq!(merged.id, "n1");
        assert_eq!(merged.created_at, 10);
        assert_eq!(merged.title, "Groceries");
        assert_eq!(merged.content, "remember the list");
        assert_eq!(merged.items.len(), 1);
    }

    #[test]
    fn test_note_draft_items() {
        let mut draft = NoteDraft::default();
        draft.add_item(ChecklistItem::new("a".into(), "one".into()));
        draft.add_item(ChecklistItem::new("b".into(), "two".into()));

        assert!(draft.set_checked("b", true));
        assert!(!draft.set_checked("zz", true));
        assert!(draft.remove_item("a"));
        assert!(!draft.remove_item("a"));
        assert_eq!(draft.items.len(), 1);
        assert!(draft.items[0].checked);
    }

    #[test]
    fn test_question_draft() {
        let mut original = Question::new("Where?", Some("context"), 5);
        original.id = "q1".to_string();
        original.mark_asked(true, 6);

        let mut draft = QuestionDraft::from_question(&original);
        assert_eq!(draft.notes, "context");
        draft.text = "  Where exactly?  ".to_string();
        draft.notes = "   ".to_string();

        let edited = draft.apply_to(&original);
        assert_eq!(edited.id, "q1");
        assert_eq!(edited.text, "Where exactly?");
        assert_eq!(edited.notes, None);
        assert_eq!(edited.created_at, 5);
        assert!(edited.already_asked);
        assert_eq!(edited.asked_at, Some(6));

        assert!(!QuestionDraft::default().is_submittable());
    }
}
