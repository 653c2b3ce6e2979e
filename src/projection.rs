//! Derived views
//!
//! Pure functions over a snapshot, recomputed on every render.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

use crate::models::{Note, Question, QuestionFilter, SortOrder};

/// How many entries the dashboard shows per list
pub const RECENT_LIMIT: usize = 3;

/// Most recently updated notes first
pub fn recent_notes(notes: &[Note]) -> Vec<Note> {
    let mut sorted = notes.to_vec();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.truncate(RECENT_LIMIT);
    sorted
}

/// Most recently created questions first
pub fn recent_questions(questions: &[Question]) -> Vec<Question> {
    let mut sorted = questions.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(RECENT_LIMIT);
    sorted
}

pub fn filter_questions(questions: &[Question], filter: QuestionFilter, order: SortOrder) -> Vec<Question> {
    let mut visible: Vec<Question> = questions
        .iter()
        .filter(|q| filter.matches(q))
        .cloned()
        .collect();
    match order {
        SortOrder::Newest => visible.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => visible.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
    visible
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionStats {
    pub total: usize,
    pub asked: usize,
    pub pending: usize,
}

impl QuestionStats {
    pub fn of(questions: &[Question]) -> Self {
        let asked = questions.iter().filter(|q| q.already_asked).count();
        Self {
            total: questions.len(),
            asked,
            pending: questions.len() - asked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteStats {
    pub total: usize,
    pub checklists: usize,
    /// Checked items across all checklist notes
    pub checked_items: usize,
    pub total_items: usize,
}

impl NoteStats {
    pub fn of(notes: &[Note]) -> Self {
        let checklists: Vec<&Note> = notes.iter().filter(|n| n.is_check_list).collect();
        Self {
            total: notes.len(),
            checklists: checklists.len(),
            checked_items: checklists.iter().map(|n| n.checked_count()).sum(),
            total_items: checklists.iter().map(|n| n.items.len()).sum(),
        }
    }
}

/// "Saturday, October 17, 2026"
pub fn format_day<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%A, %B %-d, %Y").to_string()
}

/// "Oct 17, 2026"
pub fn format_short<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%b %-d, %Y").to_string()
}

/// Card date for an epoch-millis timestamp, in local time
pub fn short_date(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|at| format_short(&at))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::ChecklistItem;

    fn note(id: &str, updated_at: i64) -> Note {
        Note {
            id: id.to_string(),
            updated_at,
            ..Note::new(0)
        }
    }

    fn question(id: &str, created_at: i64, asked: bool) -> Question {
        let mut q = Question::new(id, None, created_at);
        q.id = id.to_string();
        if asked {
            q.mark_asked(true, created_at + 1);
        }
        q
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|i| id(i).to_string()).collect()
    }

    #[test]
    fn test_recent_notes_top_three_by_update() {
        let notes: Vec<Note> = [100, 300, 200, 50, 400]
            .iter()
            .enumerate()
            .map(|(i, t)| note(&format!("n{}", i), *t))
            .collect();

        let recent = recent_notes(&notes);
        let times: Vec<i64> = recent.iter().map(|n| n.updated_at).collect();
        assert_eq!(times, vec![400, 300, 200]);
        assert_eq!(notes.len(), 5);
    }

    #[test]
    fn test_recent_questions_and_short_lists() {
        let questions = vec![question("a", 5, false), question("b", 9, true)];
        assert_eq!(ids(&recent_questions(&questions), |q| &q.id), vec!["b", "a"]);
        assert!(recent_notes(&[]).is_empty());
    }

    #[test]
    fn test_filter_and_sort() {
        let questions = vec![question("A", 1, false), question("B", 2, true), question("C", 3, false)];

        let pending = filter_questions(&questions, QuestionFilter::Pending, SortOrder::Newest);
        assert_eq!(ids(&pending, |q| &q.id), vec!["C", "A"]);

        let asked = filter_questions(&questions, QuestionFilter::Asked, SortOrder::Newest);
        assert_eq!(ids(&asked, |q| &q.id), vec!["B"]);

        let all = filter_questions(&questions, QuestionFilter::All, SortOrder::Oldest);
        assert_eq!(ids(&all, |q| &q.id), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_stats() {
        let questions = vec![question("A", 1, false), question("B", 2, true), question("C", 3, false)];
        assert_eq!(
            QuestionStats::of(&questions),
            QuestionStats { total: 3, asked: 1, pending: 2 }
        );

        let mut list = note("n1", 1);
        list.is_check_list = true;
        list.items = vec![
            ChecklistItem { checked: true, ..ChecklistItem::new("i1".into(), "milk".into()) },
            ChecklistItem::new("i2".into(), "eggs".into()),
        ];
        let stats = NoteStats::of(&[list, note("n2", 2)]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.checklists, 1);
        assert_eq!(stats.checked_items, 1);
        assert_eq!(stats.total_items, 2);
    }

    #[test]
    fn test_date_labels() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        assert_eq!(format_day(&at), "Saturday, October 17, 2026");
        assert_eq!(format_short(&at), "Oct 17, 2026");
        assert!(short_date(at.timestamp_millis()).ends_with("2026"));
    }
}
