use std::fmt;

use thiserror::Error;

use crate::model::answer::AnswerState;
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamSessionError {
    #[error("an exam needs at least one question")]
    Empty,

    #[error("exam already finished")]
    Finished,

    #[error("question index {index} is outside 0..{total}")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("choice {choice} is out of range for question {index}")]
    ChoiceOutOfRange { index: usize, choice: usize },
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

/// One user action against the session, decoupled from any presentation
/// layer. Everything the exam surface can do funnels through
/// [`ExamSession::apply`], which keeps the core testable headlessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Select a 0-based choice on the current question.
    SelectChoice(usize),
    /// Flip the review mark on the current question.
    ToggleMark,
    Next,
    Previous,
    /// Jump to a 0-based question index (tracker button).
    JumpTo(usize),
}

//
// ─── EXAM SESSION ──────────────────────────────────────────────────────────────
//

/// One student's in-memory attempt: the question list, one answer slot per
/// question, the navigation cursor, and the terminal finished flag.
///
/// This aggregate owns all mutable session state; navigation, grading, and
/// the timer act through it rather than through ambient globals.
pub struct ExamSession {
    questions: Vec<Question>,
    states: Vec<AnswerState>,
    current: usize,
    finished: bool,
}

impl ExamSession {
    /// Create a session with one fresh answer slot per question.
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::Empty` if no questions are provided.
    pub fn new(questions: Vec<Question>) -> Result<Self, ExamSessionError> {
        if questions.is_empty() {
            return Err(ExamSessionError::Empty);
        }
        let states = questions.iter().map(|_| AnswerState::unseen()).collect();
        Ok(Self {
            questions,
            states,
            current: 0,
            finished: false,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn states(&self) -> &[AnswerState] {
        &self.states
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn current_state(&self) -> &AnswerState {
        &self.states[self.current]
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Count of slots without an answer. Recomputed on demand, never cached.
    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.states.iter().filter(|s| !s.is_answered()).count()
    }

    // ─── Commands ──────────────────────────────────────────────────────────

    /// Apply a single user action to the session.
    ///
    /// Navigation commands never fail; out-of-range jumps and boundary
    /// next/previous are silent no-ops (disabled affordances, not faults).
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::Finished` once the session is finalized,
    /// and `ChoiceOutOfRange` for a choice index the current question does
    /// not have.
    pub fn apply(&mut self, command: SessionCommand) -> Result<(), ExamSessionError> {
        match command {
            SessionCommand::SelectChoice(choice) => self.set_answer(self.current, choice),
            SessionCommand::ToggleMark => self.toggle_mark(self.current),
            SessionCommand::Next => {
                self.next();
                Ok(())
            }
            SessionCommand::Previous => {
                self.previous();
                Ok(())
            }
            SessionCommand::JumpTo(index) => {
                self.go_to(index);
                Ok(())
            }
        }
    }

    /// Record `choice` for the question at `index`, overwriting any prior
    /// answer.
    ///
    /// # Errors
    ///
    /// Returns `Finished` after finalize, `IndexOutOfRange` for a bad slot,
    /// and `ChoiceOutOfRange` when the choice does not exist on the question.
    pub fn set_answer(&mut self, index: usize, choice: usize) -> Result<(), ExamSessionError> {
        if self.finished {
            return Err(ExamSessionError::Finished);
        }
        let total = self.total();
        let question = self
            .questions
            .get(index)
            .ok_or(ExamSessionError::IndexOutOfRange { index, total })?;
        if !question.is_valid_choice(choice) {
            return Err(ExamSessionError::ChoiceOutOfRange { index, choice });
        }
        self.states[index].select(choice);
        Ok(())
    }

    /// Flip the review mark on the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Finished` after finalize and `IndexOutOfRange` for a bad slot.
    pub fn toggle_mark(&mut self, index: usize) -> Result<(), ExamSessionError> {
        if self.finished {
            return Err(ExamSessionError::Finished);
        }
        let total = self.total();
        let state = self
            .states
            .get_mut(index)
            .ok_or(ExamSessionError::IndexOutOfRange { index, total })?;
        state.toggle_mark();
        Ok(())
    }

    // ─── Navigation ────────────────────────────────────────────────────────

    /// Move the cursor to `index`; no-op when out of range.
    pub fn go_to(&mut self, index: usize) {
        if index < self.total() {
            self.current = index;
        }
    }

    /// Move to the next question; no-op at the last one.
    pub fn next(&mut self) {
        if self.can_go_next() {
            self.current += 1;
        }
    }

    /// Move to the previous question; no-op at the first one.
    pub fn previous(&mut self) {
        if self.can_go_previous() {
            self.current -= 1;
        }
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.current + 1 < self.total()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.current > 0
    }

    // ─── Snapshot / restore ────────────────────────────────────────────────

    /// Serializable copy of the per-question state, index-aligned with the
    /// question list. Persisted best-effort on a fixed cadence.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AnswerState> {
        self.states.clone()
    }

    /// Overwrite the per-question state from a persisted snapshot.
    ///
    /// Returns `true` when the snapshot was applied. A snapshot whose length
    /// does not match the question count is stale and ignored, as is one
    /// whose answers point outside their question's choices; in both cases
    /// the freshly initialized state is kept.
    pub fn restore(&mut self, snapshot: Vec<AnswerState>) -> bool {
        if snapshot.len() != self.states.len() {
            return false;
        }
        let compatible = snapshot
            .iter()
            .zip(&self.questions)
            .all(|(state, question)| state.answer.is_none_or(|a| question.is_valid_choice(a)));
        if !compatible {
            return false;
        }
        self.states = snapshot;
        for state in &mut self.states {
            state.normalize();
        }
        true
    }

    /// Mark the session finished. Returns `true` on the first call only, so
    /// a timer expiry racing a manual submit finalizes once.
    pub fn finish(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        true
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("total", &self.questions.len())
            .field("current", &self.current)
            .field("unanswered", &self.unanswered_count())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::default_question_set;

    fn session() -> ExamSession {
        ExamSession::new(default_question_set()).unwrap()
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = ExamSession::new(Vec::new()).unwrap_err();
        assert_eq!(err, ExamSessionError::Empty);
    }

    #[test]
    fn answering_decrements_unanswered_exactly_once_per_slot() {
        let mut s = session();
        assert_eq!(s.unanswered_count(), 15);

        s.set_answer(0, 2).unwrap();
        assert_eq!(s.unanswered_count(), 14);

        // changing one's mind does not change the count
        s.set_answer(0, 1).unwrap();
        assert_eq!(s.unanswered_count(), 14);

        s.set_answer(10, 0).unwrap();
        assert_eq!(s.unanswered_count(), 13);
    }

    #[test]
    fn choice_outside_question_is_rejected() {
        let mut s = session();
        let err = s.set_answer(0, 9).unwrap_err();
        assert!(matches!(
            err,
            ExamSessionError::ChoiceOutOfRange { index: 0, choice: 9 }
        ));
        assert_eq!(s.unanswered_count(), 15);
    }

    #[test]
    fn navigation_clamps_at_boundaries() {
        let mut s = session();
        assert!(!s.can_go_previous());
        s.previous();
        assert_eq!(s.current_index(), 0);

        s.go_to(14);
        assert!(!s.can_go_next());
        s.next();
        assert_eq!(s.current_index(), 14);

        // out-of-range jump is a silent no-op
        s.go_to(99);
        assert_eq!(s.current_index(), 14);
    }

    #[test]
    fn commands_act_on_the_current_question() {
        let mut s = session();
        s.apply(SessionCommand::JumpTo(4)).unwrap();
        s.apply(SessionCommand::SelectChoice(1)).unwrap();
        s.apply(SessionCommand::ToggleMark).unwrap();

        assert_eq!(s.states()[4].answer, Some(1));
        assert!(s.states()[4].marked);

        s.apply(SessionCommand::ToggleMark).unwrap();
        assert!(!s.states()[4].marked);
        assert_eq!(s.states()[4].answer, Some(1));
    }

    #[test]
    fn snapshot_restore_round_trips() {
        let mut s = session();
        s.set_answer(0, 2).unwrap();
        s.toggle_mark(3).unwrap();
        let snapshot = s.snapshot();

        let mut fresh = session();
        assert!(fresh.restore(snapshot.clone()));
        assert_eq!(fresh.states(), snapshot.as_slice());
        assert_eq!(fresh.unanswered_count(), 14);
    }

    #[test]
    fn stale_snapshot_is_ignored() {
        let mut s = session();
        let short = vec![AnswerState::unseen(); 3];
        assert!(!s.restore(short));
        assert_eq!(s.unanswered_count(), 15);
    }

    #[test]
    fn snapshot_with_impossible_answer_is_ignored() {
        let mut s = session();
        let mut snapshot = s.snapshot();
        snapshot[11].select(7); // true/false question has two choices
        assert!(!s.restore(snapshot));
        assert_eq!(s.unanswered_count(), 15);
    }

    #[test]
    fn finish_is_one_shot_and_freezes_answers() {
        let mut s = session();
        assert!(s.finish());
        assert!(!s.finish());

        let err = s.set_answer(0, 1).unwrap_err();
        assert_eq!(err, ExamSessionError::Finished);
        let err = s.toggle_mark(0).unwrap_err();
        assert_eq!(err, ExamSessionError::Finished);
    }
}
