use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question description cannot be empty")]
    EmptyDescription,

    #[error("a question needs at least two choices, got {len}")]
    NotEnoughChoices { len: usize },

    #[error("question has an empty choice at position {index}")]
    EmptyChoice { index: usize },

    #[error("answer key {correct} is outside 1..={choices}")]
    AnswerKeyOutOfRange { correct: usize, choices: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Kind of question, with the wire tags the persisted question list uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    MultipleChoice,
    #[serde(rename = "tf")]
    TrueFalse,
}

/// One immutable exam question.
///
/// Constructed once at session start and never mutated afterwards. `correct`
/// is a **1-based** index into `choices`; `None` means the question carries no
/// answer key and can never be scored as correct.
///
/// The serialized shape matches the stored question list:
/// `{"id":1,"desc":"…","type":"mcq","choices":["…"],"correct":3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    desc: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct: Option<usize>,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the description is blank, fewer than two
    /// choices are given, a choice is blank, or the answer key falls outside
    /// the choice list.
    pub fn new(
        id: QuestionId,
        desc: impl Into<String>,
        kind: QuestionKind,
        choices: Vec<String>,
        correct: Option<usize>,
    ) -> Result<Self, QuestionError> {
        let question = Self {
            id,
            desc: desc.into(),
            kind,
            choices,
            correct,
        };
        question.validate()?;
        Ok(question)
    }

    /// Re-check the construction invariants.
    ///
    /// Deserialization bypasses `new`, so callers loading questions from the
    /// store run this before trusting the record.
    ///
    /// # Errors
    ///
    /// Returns the same `QuestionError` values as [`Question::new`].
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.desc.trim().is_empty() {
            return Err(QuestionError::EmptyDescription);
        }
        if self.choices.len() < 2 {
            return Err(QuestionError::NotEnoughChoices {
                len: self.choices.len(),
            });
        }
        if let Some(index) = self.choices.iter().position(|c| c.trim().is_empty()) {
            return Err(QuestionError::EmptyChoice { index });
        }
        if let Some(correct) = self.correct {
            if correct == 0 || correct > self.choices.len() {
                return Err(QuestionError::AnswerKeyOutOfRange {
                    correct,
                    choices: self.choices.len(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// 1-based answer key, if the question is graded.
    #[must_use]
    pub fn correct(&self) -> Option<usize> {
        self.correct
    }

    /// 0-based answer key, if the question is graded.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.correct.map(|c| c - 1)
    }

    /// True when `choice` is a valid 0-based index into this question.
    #[must_use]
    pub fn is_valid_choice(&self, choice: usize) -> bool {
        choice < self.choices.len()
    }

    /// Letter label for a choice: `A`/`B`/`C`… for multiple choice, `T`/`F`
    /// for a two-choice true/false question.
    #[must_use]
    pub fn choice_label(&self, choice: usize) -> char {
        if self.kind == QuestionKind::TrueFalse && self.choices.len() == 2 {
            if choice == 0 { 'T' } else { 'F' }
        } else {
            char::from(b'A' + u8::try_from(choice % 26).unwrap_or(0))
        }
    }
}

//
// ─── BUILT-IN FALLBACK SET ─────────────────────────────────────────────────────
//

/// The built-in 15-question exam (10 multiple choice, 5 true/false) used
/// whenever no externally supplied question list is available.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn default_question_set() -> Vec<Question> {
    fn mcq(id: u64, desc: &str, choices: &[&str], correct: usize) -> Question {
        Question::new(
            QuestionId::new(id),
            desc,
            QuestionKind::MultipleChoice,
            choices.iter().map(ToString::to_string).collect(),
            Some(correct),
        )
        .expect("built-in question should be valid")
    }

    fn tf(id: u64, desc: &str, correct: usize) -> Question {
        Question::new(
            QuestionId::new(id),
            desc,
            QuestionKind::TrueFalse,
            vec!["True".to_string(), "False".to_string()],
            Some(correct),
        )
        .expect("built-in question should be valid")
    }

    vec![
        mcq(1, "What is 2 + 2?", &["1", "2", "4", "22"], 3),
        mcq(2, "Which is a prime number?", &["4", "6", "7", "9"], 3),
        mcq(
            3,
            "HTML stands for?",
            &[
                "Hyper Text",
                "Hyperlink Text",
                "Home Tool",
                "Hyper Text Markup Language",
            ],
            4,
        ),
        mcq(
            4,
            "What does CSS do?",
            &["Structure", "Styling", "Database", "Logic"],
            2,
        ),
        mcq(
            5,
            "Which language is used for backend often?",
            &["Python", "CSS", "HTML", "SVG"],
            1,
        ),
        mcq(
            6,
            "Which is NOT a JS framework?",
            &["React", "Angular", "Laravel", "Vue"],
            3,
        ),
        mcq(
            7,
            "Unit for angles?",
            &["meters", "hours", "radians", "kelvin"],
            3,
        ),
        mcq(
            8,
            "Binary of decimal 5?",
            &["0101", "1010", "111", "1000"],
            1,
        ),
        mcq(
            9,
            "HTTP status 404 means?",
            &["OK", "Unauthorized", "Not Found", "Server Error"],
            3,
        ),
        mcq(
            10,
            "Which is a loop in JS?",
            &["for", "select", "case", "pair"],
            1,
        ),
        tf(11, "The Earth orbits the Sun.", 1),
        tf(12, "JavaScript is the same as Java.", 2),
        tf(13, "CSS can animate elements.", 1),
        tf(14, "HTTP is a protocol.", 1),
        tf(15, "SQL is used for styling websites.", 2),
    ]
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_description() {
        let err = Question::new(
            QuestionId::new(1),
            "   ",
            QuestionKind::MultipleChoice,
            vec!["a".into(), "b".into()],
            None,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyDescription);
    }

    #[test]
    fn rejects_single_choice() {
        let err = Question::new(
            QuestionId::new(1),
            "Pick one",
            QuestionKind::MultipleChoice,
            vec!["only".into()],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::NotEnoughChoices { len: 1 }));
    }

    #[test]
    fn rejects_answer_key_outside_choices() {
        let err = Question::new(
            QuestionId::new(1),
            "Pick one",
            QuestionKind::MultipleChoice,
            vec!["a".into(), "b".into()],
            Some(3),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            QuestionError::AnswerKeyOutOfRange {
                correct: 3,
                choices: 2
            }
        ));

        let zero = Question::new(
            QuestionId::new(1),
            "Pick one",
            QuestionKind::MultipleChoice,
            vec!["a".into(), "b".into()],
            Some(0),
        );
        assert!(zero.is_err());
    }

    #[test]
    fn answer_key_converts_to_zero_based() {
        let q = Question::new(
            QuestionId::new(1),
            "Pick one",
            QuestionKind::MultipleChoice,
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            Some(3),
        )
        .unwrap();
        assert_eq!(q.correct(), Some(3));
        assert_eq!(q.correct_index(), Some(2));
    }

    #[test]
    fn serde_shape_matches_stored_list() {
        let q = Question::new(
            QuestionId::new(1),
            "What is 2 + 2?",
            QuestionKind::MultipleChoice,
            vec!["1".into(), "2".into(), "4".into(), "22".into()],
            Some(3),
        )
        .unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "mcq");
        assert_eq!(json["correct"], 3);
        assert_eq!(json["desc"], "What is 2 + 2?");

        let parsed: Question = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, q);
    }

    #[test]
    fn ungraded_question_omits_correct_field() {
        let q = Question::new(
            QuestionId::new(9),
            "Opinion question",
            QuestionKind::TrueFalse,
            vec!["True".into(), "False".into()],
            None,
        )
        .unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert!(json.get("correct").is_none());
    }

    #[test]
    fn default_set_has_fifteen_valid_questions() {
        let set = default_question_set();
        assert_eq!(set.len(), 15);
        let mcq = set
            .iter()
            .filter(|q| q.kind() == QuestionKind::MultipleChoice)
            .count();
        assert_eq!(mcq, 10);
        for q in &set {
            q.validate().unwrap();
            assert!(q.correct().is_some());
        }
    }

    #[test]
    fn choice_labels_for_tf_and_mcq() {
        let set = default_question_set();
        let mcq = &set[0];
        assert_eq!(mcq.choice_label(0), 'A');
        assert_eq!(mcq.choice_label(2), 'C');
        let tf = &set[10];
        assert_eq!(tf.choice_label(0), 'T');
        assert_eq!(tf.choice_label(1), 'F');
    }
}
