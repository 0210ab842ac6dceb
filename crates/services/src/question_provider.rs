use exam_core::model::{Question, default_question_set};
use storage::SessionStore;

use crate::error::ExamFlowError;

/// Supplies the ordered question list for a session: either an externally
/// injected list found in the store, or the built-in default set.
#[derive(Clone)]
pub struct QuestionProvider {
    store: SessionStore,
}

impl QuestionProvider {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Load the question set for this attempt.
    ///
    /// A stored list is used only when it is non-empty and every record
    /// passes validation; on absence, parse failure, or any invalid record
    /// the built-in set is used instead and persisted back, so grading and
    /// the result presenter later read the same set the exam ran against.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::Storage` only when the store itself fails.
    pub async fn load(&self) -> Result<Vec<Question>, ExamFlowError> {
        if let Some(stored) = self.store.questions().await? {
            if !stored.is_empty() && stored.iter().all(|q| q.validate().is_ok()) {
                return Ok(stored);
            }
        }

        let fallback = default_question_set();
        self.store.save_questions(&fallback).await?;
        Ok(fallback)
    }
}
