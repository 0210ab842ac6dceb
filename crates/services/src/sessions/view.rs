use exam_core::model::{GradeDetail, GradeReport, TimeBand};

//
// ─── PRESENTATION HELPERS ──────────────────────────────────────────────────────
//

/// Hex color for a score percentage, stepped at 60 / 75 / 90 / 95.
#[must_use]
pub fn score_color(percent: u32) -> &'static str {
    if percent < 60 {
        "#dc2626"
    } else if percent < 75 {
        "#f59e0b"
    } else if percent < 90 {
        "#2563eb"
    } else if percent < 95 {
        "#7c3aed"
    } else {
        "#16a34a"
    }
}

/// Verdict text for a score percentage, same steps as [`score_color`].
#[must_use]
pub fn score_label(percent: u32) -> &'static str {
    if percent >= 95 {
        "Excellent"
    } else if percent >= 90 {
        "Outstanding"
    } else if percent >= 75 {
        "Good Work"
    } else if percent >= 60 {
        "Needs Improvement"
    } else {
        "Keep Practicing"
    }
}

/// Hex color for the countdown, by urgency band.
#[must_use]
pub fn band_color(band: TimeBand) -> &'static str {
    match band {
        TimeBand::Nominal => "#16a34a",
        TimeBand::Warning => "#f59e0b",
        TimeBand::Critical => "#dc2626",
    }
}

#[must_use]
pub fn band_label(band: TimeBand) -> &'static str {
    match band {
        TimeBand::Nominal => "plenty of time",
        TimeBand::Warning => "running low",
        TimeBand::Critical => "almost out",
    }
}

/// Human time-taken text: `"0m"` for zero, `"{m}m {ss}s"` normally, and
/// minutes only once the seconds part stops being informative (> 99 minutes).
#[must_use]
pub fn format_minutes(total_secs: u32) -> String {
    if total_secs == 0 {
        return "0m".to_string();
    }
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    if minutes > 99 {
        format!("{minutes}m")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}

//
// ─── RESULT VIEW ───────────────────────────────────────────────────────────────
//

/// Display-ready projection of a persisted [`GradeReport`]: everything a
/// result page renders, with colors and labels precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub student_name: Option<String>,
    pub student_id: Option<String>,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub percent: u32,
    pub color: &'static str,
    pub label: &'static str,
    pub time_taken: String,
    /// Submission time, epoch seconds.
    pub submitted_at: i64,
    pub details: Vec<GradeDetail>,
}

impl ResultView {
    #[must_use]
    pub fn from_report(report: &GradeReport) -> Self {
        Self {
            student_name: report.student_name.clone(),
            student_id: report.student_id.clone(),
            total: report.result.total,
            correct: report.result.correct,
            incorrect: report.result.incorrect,
            percent: report.result.percent,
            color: score_color(report.result.percent),
            label: score_label(report.result.percent),
            time_taken: format_minutes(report.time_taken_seconds),
            submitted_at: report.timestamp,
            details: report.result.details.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
