mod answer;
mod clock;
mod grade;
mod ids;
mod question;
mod session;

pub use answer::{AnswerState, AnswerStatus};
pub use clock::{SessionClock, SessionClockError, TimeBand, format_mmss};
pub use grade::{GradeDetail, GradeReport, GradeResult, grade};
pub use ids::{AttemptId, ParseIdError, QuestionId};
pub use question::{Question, QuestionError, QuestionKind, default_question_set};
pub use session::{ExamSession, ExamSessionError, SessionCommand};
