//! Question Service
//!
//! Questions under `users/{uid}/questions`, delivered newest first.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::collection::EntityCollection;
use super::subscription::Subscription;
use super::traits::{EntityService, RemoteStore};
use crate::domain::{Clock, DomainError, DomainResult, Entity, Principal, Question};

fn newest_first(questions: &mut Vec<Question>) {
    questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[derive(Clone)]
pub struct QuestionService {
    questions: EntityCollection<Question>,
    clock: Arc<dyn Clock>,
}

impl QuestionService {
    pub fn new(store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            questions: EntityCollection::new(store),
            clock,
        }
    }

    /// Set `alreadyAsked`; `askedAt` becomes now when asked, absent otherwise
    pub async fn mark_asked(&self, principal: &Principal, question_id: &str, asked: bool) -> DomainResult<()> {
        let mut fields = Map::new();
        fields.insert("alreadyAsked".to_string(), Value::Bool(asked));
        let asked_at = if asked {
            json!(self.clock.now_millis())
        } else {
            Value::Null
        };
        fields.insert("askedAt".to_string(), asked_at);
        self.questions.update_fields(principal, question_id, fields).await
    }
}

#[async_trait]
impl EntityService<Question> for QuestionService {
    async fn list(&self, principal: &Principal) -> DomainResult<Vec<Question>> {
        self.questions.list(principal).await
    }

    async fn subscribe(&self, principal: &Principal) -> DomainResult<Subscription<Question>> {
        self.questions.subscribe(principal, newest_first).await
    }

    async fn create(&self, principal: &Principal, question: &Question) -> DomainResult<String> {
        question.validate()?;
        self.questions.create(principal, question).await
    }

    /// Writes exactly the supplied fields; absent `notes`/`askedAt` are cleared
    async fn update(&self, principal: &Principal, question: &Question) -> DomainResult<()> {
        if question.id().is_empty() {
            return Err(DomainError::InvalidInput("question has no id".to_string()));
        }
        question.validate()?;
        let fields = question.to_fields()?;
        self.questions.update_fields(principal, question.id(), fields).await
    }

    async fn delete(&self, principal: &Principal, id: &str) -> DomainResult<()> {
        self.questions.delete(principal, id).await
    }
}
