use serde::{Deserialize, Serialize};

/// Whether a question slot has been answered yet.
///
/// Derived from `answer`: a slot is `Answered` iff an answer index is set.
/// The field is still persisted so the snapshot stays index-aligned with what
/// earlier sessions wrote, but [`AnswerState::normalize`] re-derives it after
/// a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Unseen,
    Answered,
}

/// Mutable per-question state: the selected choice (0-based), the
/// flagged-for-review mark, and the derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerState {
    pub answer: Option<usize>,
    pub marked: bool,
    pub status: AnswerStatus,
}

impl AnswerState {
    /// Fresh slot: no answer, not marked, unseen.
    #[must_use]
    pub fn unseen() -> Self {
        Self {
            answer: None,
            marked: false,
            status: AnswerStatus::Unseen,
        }
    }

    /// Record a choice. Overwrites any prior answer; changing one's mind is
    /// always allowed.
    pub fn select(&mut self, choice: usize) {
        self.answer = Some(choice);
        self.status = AnswerStatus::Answered;
    }

    /// Flip the review mark. Independent of answer status.
    pub fn toggle_mark(&mut self) {
        self.marked = !self.marked;
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// Re-derive `status` from `answer` after deserialization.
    pub fn normalize(&mut self) {
        self.status = if self.answer.is_some() {
            AnswerStatus::Answered
        } else {
            AnswerStatus::Unseen
        };
    }
}

impl Default for AnswerState {
    fn default() -> Self {
        Self::unseen()
    }
}
