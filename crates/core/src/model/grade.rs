use serde::{Deserialize, Serialize};

use crate::model::answer::AnswerState;
use crate::model::ids::{AttemptId, QuestionId};
use crate::model::question::Question;

//
// ─── GRADE RESULT ──────────────────────────────────────────────────────────────
//

/// Per-question grading outcome. Both answer fields are 1-based display
/// values; `None` means "no answer" / "no answer key" respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDetail {
    pub question_id: QuestionId,
    pub user_answer: Option<usize>,
    pub correct_answer: Option<usize>,
    pub is_correct: bool,
}

/// Aggregate score for one attempt, computed once at submission and
/// read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub percent: u32,
    pub details: Vec<GradeDetail>,
}

/// Compare recorded answers against the answer keys.
///
/// Pure function of its two inputs. For each question in order:
/// - no answer key: excluded from correctness (`is_correct = false`) but
///   still counted in `total`, preserved behavior and not a bug;
/// - otherwise the 1-based key is converted to 0-based and compared with
///   strict equality against the recorded answer (`None` never matches).
///
/// `percent` is `round(100 * correct / total)`, defined as 0 when `total`
/// is 0. A `states` slice shorter than `questions` treats the missing tail
/// as unanswered.
#[must_use]
pub fn grade(questions: &[Question], states: &[AnswerState]) -> GradeResult {
    let total = questions.len();
    let mut correct = 0;
    let mut details = Vec::with_capacity(total);

    for (i, question) in questions.iter().enumerate() {
        let user_answer = states.get(i).and_then(|s| s.answer);
        let correct_index = question.correct_index();
        let is_correct = match (correct_index, user_answer) {
            (Some(key), Some(answer)) => key == answer,
            _ => false,
        };
        if is_correct {
            correct += 1;
        }
        details.push(GradeDetail {
            question_id: question.id(),
            user_answer: user_answer.map(|a| a + 1),
            correct_answer: question.correct(),
            is_correct,
        });
    }

    let percent = if total == 0 {
        0
    } else {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (correct as f64 / total as f64 * 100.0).round() as u32
        }
    };

    GradeResult {
        total,
        correct,
        incorrect: total - correct,
        percent,
        details,
    }
}

//
// ─── GRADE REPORT ──────────────────────────────────────────────────────────────
//

/// The persisted result record a presenter consumes: the grade plus attempt
/// metadata. Serialized in camelCase, matching the stored `exam_result`
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub attempt_id: AttemptId,
    #[serde(flatten)]
    pub result: GradeResult,
    pub time_taken_seconds: u32,
    pub student_name: Option<String>,
    pub student_id: Option<String>,
    /// Submission time, epoch seconds.
    pub timestamp: i64,
}

impl GradeReport {
    #[must_use]
    pub fn new(
        result: GradeResult,
        time_taken_seconds: u32,
        student_name: Option<String>,
        student_id: Option<String>,
        submitted_at: i64,
    ) -> Self {
        Self {
            attempt_id: AttemptId::new(),
            result,
            time_taken_seconds,
            student_name,
            student_id,
            timestamp: submitted_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
