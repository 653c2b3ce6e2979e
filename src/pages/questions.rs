//! Questions page

use askbook_backend::domain::{DomainError, DomainResult, Principal, Question};
use askbook_backend::repository::EntityService;

use crate::context::AppContext;
use crate::draft::QuestionDraft;
use crate::models::{QuestionFilter, SortOrder};
use crate::projection::{filter_questions, QuestionStats};
use crate::store::LiveList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerMode {
    Adding,
    Editing(Question),
}

/// Add/edit dialog state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    pub mode: ComposerMode,
    pub draft: QuestionDraft,
}

pub struct QuestionsPage {
    ctx: AppContext,
    principal: Principal,
    questions: LiveList<Question>,
    filter: QuestionFilter,
    order: SortOrder,
    composer: Option<Composer>,
}

impl QuestionsPage {
    pub async fn open(ctx: AppContext) -> DomainResult<Self> {
        let principal = ctx.principal()?;
        let subscription = ctx.questions.subscribe(&principal).await.map_err(|e| {
            ctx.notices.error("Failed to load questions", &e);
            e
        })?;
        Ok(Self {
            ctx,
            principal,
            questions: LiveList::new(subscription),
            filter: QuestionFilter::default(),
            order: SortOrder::default(),
            composer: None,
        })
    }

    /// Apply the next snapshot; false once the subscription is gone
    pub async fn sync(&mut self) -> bool {
        match self.questions.pump().await {
            Ok(changed) => changed,
            Err(e) => {
                self.ctx.notices.error("Lost connection to questions", &e);
                false
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.questions.is_loading()
    }

    /// Every question, newest first
    pub fn questions(&self) -> &[Question] {
        self.questions.items()
    }

    /// Filtered and sorted for display
    pub fn visible(&self) -> Vec<Question> {
        filter_questions(self.questions.items(), self.filter, self.order)
    }

    pub fn stats(&self) -> QuestionStats {
        QuestionStats::of(self.questions.items())
    }

    pub fn filter(&self) -> QuestionFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: QuestionFilter) {
        self.filter = filter;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order
    }

    pub fn toggle_sort_order(&mut self) -> SortOrder {
        self.order = self.order.toggled();
        self.order
    }

    pub fn composer(&self) -> Option<&Composer> {
        self.composer.as_ref()
    }

    pub fn start_adding(&mut self) {
        self.composer = Some(Composer {
            mode: ComposerMode::Adding,
            draft: QuestionDraft::default(),
        });
    }

    pub fn start_editing(&mut self, question_id: &str) -> DomainResult<()> {
        let question = self
            .find(question_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("question {}", question_id)))?;
        self.composer = Some(Composer {
            draft: QuestionDraft::from_question(&question),
            mode: ComposerMode::Editing(question),
        });
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) {
        if let Some(composer) = self.composer.as_mut() {
            composer.draft.text = text.to_string();
        }
    }

    pub fn set_notes(&mut self, notes: &str) {
        if let Some(composer) = self.composer.as_mut() {
            composer.draft.notes = notes.to_string();
        }
    }

    pub fn cancel(&mut self) {
        self.composer = None;
    }

    /// Add or update from the composer. Blank text is refused before any
    /// store call.
    pub async fn submit(&mut self) -> bool {
        let Some(composer) = self.composer.as_ref() else {
            return false;
        };
        if !composer.draft.is_submittable() {
            return false;
        }
        let outcome = match &composer.mode {
            ComposerMode::Adding => {
                let question = composer.draft.to_new(self.ctx.now_millis());
                self.ctx
                    .questions
                    .create(&self.principal, &question)
                    .await
                    .map(|_| "Question added successfully")
                    .map_err(|e| ("Failed to add question", e))
            }
            ComposerMode::Editing(original) => {
                let question = composer.draft.apply_to(original);
                self.ctx
                    .questions
                    .update(&self.principal, &question)
                    .await
                    .map(|_| "Question updated successfully")
                    .map_err(|e| ("Failed to update question", e))
            }
        };
        match outcome {
            Ok(message) => {
                self.ctx.notices.success(message);
                self.composer = None;
                true
            }
            Err((message, e)) => {
                self.ctx.notices.error(message, &e);
                false
            }
        }
    }

    /// Flip the asked flag of one question
    pub async fn toggle_asked(&mut self, question_id: &str) -> bool {
        let Some(asked) = self.find(question_id).map(|q| !q.already_asked) else {
            return false;
        };
        match self.ctx.questions.mark_asked(&self.principal, question_id, asked).await {
            Ok(()) => {
                self.ctx
                    .notices
                    .success(if asked { "Marked as asked" } else { "Marked as not asked" });
                true
            }
            Err(e) => {
                self.ctx.notices.error("Failed to update question", &e);
                false
            }
        }
    }

    pub async fn delete_question(&mut self, question_id: &str) -> bool {
        match self.ctx.questions.delete(&self.principal, question_id).await {
            Ok(()) => {
                let editing_it = matches!(
                    self.composer.as_ref().map(|c| &c.mode),
                    Some(ComposerMode::Editing(q)) if q.id == question_id
                );
                if editing_it {
                    self.composer = None;
                }
                self.ctx.notices.success("Question deleted");
                true
            }
            Err(e) => {
                self.ctx.notices.error("Failed to delete question", &e);
                false
            }
        }
    }

    fn find(&self, question_id: &str) -> Option<&Question> {
        self.questions.items().iter().find(|q| q.id == question_id)
    }
}
