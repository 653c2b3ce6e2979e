//! Dashboard page
//!
//! Watches both collections and shows the three most recent of each plus
//! counts.

use chrono::{Local, TimeZone};

use askbook_backend::domain::{DomainResult, Note, Principal, Question};
use askbook_backend::repository::EntityService;

use crate::context::AppContext;
use crate::projection::{self, NoteStats, QuestionStats};
use crate::store::LiveList;

pub struct DashboardPage {
    ctx: AppContext,
    principal: Principal,
    notes: LiveList<Note>,
    questions: LiveList<Question>,
}

impl DashboardPage {
    pub async fn open(ctx: AppContext) -> DomainResult<Self> {
        let principal = ctx.principal()?;
        let notes = ctx.notes.subscribe(&principal).await.map_err(|e| {
            ctx.notices.error("Failed to load notes", &e);
            e
        })?;
        let notes = LiveList::new(notes);
        let questions = ctx.questions.subscribe(&principal).await.map_err(|e| {
            ctx.notices.error("Failed to load questions", &e);
            e
        })?;
        Ok(Self {
            ctx,
            principal,
            notes,
            questions: LiveList::new(questions),
        })
    }

    /// Apply whichever snapshot arrives first. False when both
    /// subscriptions have ended or one just did; a store-side end is
    /// reported as a lost connection.
    pub async fn sync(&mut self) -> bool {
        tokio::select! {
            changed = self.notes.pump(), if self.notes.is_live() => changed.unwrap_or_else(|e| {
                self.ctx.notices.error("Lost connection to notes", &e);
                false
            }),
            changed = self.questions.pump(), if self.questions.is_live() => changed.unwrap_or_else(|e| {
                self.ctx.notices.error("Lost connection to questions", &e);
                false
            }),
            else => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.notes.is_loading() || self.questions.is_loading()
    }

    pub fn recent_notes(&self) -> Vec<Note> {
        projection::recent_notes(self.notes.items())
    }

    pub fn recent_questions(&self) -> Vec<Question> {
        projection::recent_questions(self.questions.items())
    }

    pub fn note_stats(&self) -> NoteStats {
        NoteStats::of(self.notes.items())
    }

    pub fn question_stats(&self) -> QuestionStats {
        QuestionStats::of(self.questions.items())
    }

    pub fn greeting(&self) -> String {
        match self.principal.first_name() {
            Some(name) => format!("Welcome, {}!", name),
            None => "Welcome!".to_string(),
        }
    }

    /// Today's date in local time, e.g. "Sunday, October 18, 2026"
    pub fn today_label(&self) -> String {
        Local
            .timestamp_millis_opt(self.ctx.now_millis())
            .single()
            .map(|now| projection::format_day(&now))
            .unwrap_or_default()
    }
}
