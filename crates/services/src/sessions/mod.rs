mod clock_service;
mod flow;
mod view;

// Public API of the session subsystem.
pub use crate::error::ExamFlowError;
pub use clock_service::{SessionClockService, TimerTick};
pub use flow::{ExamAttempt, ExamFlowService};
pub use view::{ResultView, band_color, band_label, format_minutes, score_color, score_label};
