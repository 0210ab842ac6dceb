use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionClockError {
    #[error("exam duration must be > 0")]
    ZeroDuration,

    #[error("persisted deadline {deadline} predates the session duration")]
    InvalidDeadline { deadline: i64 },
}

//
// ─── TIME BANDS ────────────────────────────────────────────────────────────────
//

/// Severity classification of the remaining/total ratio, recomputed on every
/// tick with no hysteresis: `> 0.4` nominal, `(0.2, 0.4]` warning, `<= 0.2`
/// critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBand {
    Nominal,
    Warning,
    Critical,
}

impl TimeBand {
    #[must_use]
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio > 0.4 {
            Self::Nominal
        } else if ratio > 0.2 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

//
// ─── SESSION CLOCK ─────────────────────────────────────────────────────────────
//

/// Absolute deadline for one attempt.
///
/// The deadline is computed exactly once, as `now + duration`, and then only
/// ever read: a reload re-enters with the persisted value, so wall-clock time
/// elapsed while the process was down still counts against the student. Only
/// the derived remaining time is recomputed per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClock {
    deadline: i64,
    duration_secs: u32,
}

impl SessionClock {
    /// Start a fresh clock: `deadline = now + duration`.
    ///
    /// # Errors
    ///
    /// Returns `SessionClockError::ZeroDuration` for a zero-length exam.
    pub fn start(now: DateTime<Utc>, duration_secs: u32) -> Result<Self, SessionClockError> {
        if duration_secs == 0 {
            return Err(SessionClockError::ZeroDuration);
        }
        Ok(Self {
            deadline: now.timestamp() + i64::from(duration_secs),
            duration_secs,
        })
    }

    /// Rehydrate a clock from persisted deadline + duration.
    ///
    /// This is the only other way to obtain a `SessionClock`, which keeps the
    /// set-once deadline invariant a constructor-level contract instead of an
    /// existence check scattered across call sites.
    ///
    /// # Errors
    ///
    /// Returns `ZeroDuration` or `InvalidDeadline` when the persisted pair
    /// cannot describe a real session.
    pub fn from_persisted(deadline: i64, duration_secs: u32) -> Result<Self, SessionClockError> {
        if duration_secs == 0 {
            return Err(SessionClockError::ZeroDuration);
        }
        if deadline < i64::from(duration_secs) {
            return Err(SessionClockError::InvalidDeadline { deadline });
        }
        Ok(Self {
            deadline,
            duration_secs,
        })
    }

    /// Absolute deadline, epoch seconds.
    #[must_use]
    pub fn deadline(&self) -> i64 {
        self.deadline
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Epoch second the attempt started at, derived from the deadline.
    #[must_use]
    pub fn started_at(&self) -> i64 {
        self.deadline - i64::from(self.duration_secs)
    }

    /// Seconds left at `now`, clamped to `[0, duration]`.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> u32 {
        let left = self.deadline - now.timestamp();
        u32::try_from(left.clamp(0, i64::from(self.duration_secs))).unwrap_or(0)
    }

    /// Remaining/total ratio in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        f64::from(self.remaining(now)) / f64::from(self.duration_secs)
    }

    #[must_use]
    pub fn band(&self, now: DateTime<Utc>) -> TimeBand {
        TimeBand::for_ratio(self.progress(now))
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == 0
    }

    /// Wall-clock seconds the attempt took when submitted at `submit_epoch`,
    /// clamped to `[0, duration]`.
    #[must_use]
    pub fn time_taken(&self, submit_epoch: i64) -> u32 {
        let taken = submit_epoch - self.started_at();
        u32::try_from(taken.clamp(0, i64::from(self.duration_secs))).unwrap_or(0)
    }
}

/// Format whole seconds as the `mm:ss` countdown display.
#[must_use]
pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn deadline_is_now_plus_duration() {
        let now = fixed_now();
        let clock = SessionClock::start(now, 1800).unwrap();
        assert_eq!(clock.deadline(), now.timestamp() + 1800);
        assert_eq!(clock.started_at(), now.timestamp());
        assert_eq!(clock.remaining(now), 1800);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let err = SessionClock::start(fixed_now(), 0).unwrap_err();
        assert_eq!(err, SessionClockError::ZeroDuration);
    }

    #[test]
    fn rehydrated_clock_keeps_elapsed_outage_time() {
        // Scenario: 1800s exam persisted at t0, process reloaded at t0+100.
        let t0 = fixed_now();
        let persisted = SessionClock::start(t0, 1800).unwrap();

        let reloaded =
            SessionClock::from_persisted(persisted.deadline(), persisted.duration_secs()).unwrap();
        let later = t0 + Duration::seconds(100);
        assert_eq!(reloaded.remaining(later), 1700);
    }

    #[test]
    fn remaining_is_monotone_and_clamped_at_zero() {
        let now = fixed_now();
        let clock = SessionClock::start(now, 60).unwrap();

        let mut last = clock.remaining(now);
        for step in 1..=90 {
            let t = now + Duration::seconds(step);
            let r = clock.remaining(t);
            assert!(r <= last);
            last = r;
        }
        assert_eq!(clock.remaining(now + Duration::seconds(90)), 0);
        assert!(clock.is_expired(now + Duration::seconds(60)));
    }

    #[test]
    fn bands_follow_the_ratio_thresholds() {
        let now = fixed_now();
        let clock = SessionClock::start(now, 100).unwrap();

        assert_eq!(clock.band(now), TimeBand::Nominal);
        assert_eq!(
            clock.band(now + Duration::seconds(59)),
            TimeBand::Nominal // ratio 0.41
        );
        assert_eq!(
            clock.band(now + Duration::seconds(60)),
            TimeBand::Warning // ratio 0.40
        );
        assert_eq!(
            clock.band(now + Duration::seconds(79)),
            TimeBand::Warning // ratio 0.21
        );
        assert_eq!(
            clock.band(now + Duration::seconds(80)),
            TimeBand::Critical // ratio 0.20
        );
        assert_eq!(clock.band(now + Duration::seconds(100)), TimeBand::Critical);
    }

    #[test]
    fn time_taken_is_clamped_to_the_duration() {
        let now = fixed_now();
        let clock = SessionClock::start(now, 600).unwrap();

        assert_eq!(clock.time_taken(now.timestamp() + 90), 90);
        assert_eq!(clock.time_taken(now.timestamp() - 5), 0);
        assert_eq!(clock.time_taken(now.timestamp() + 9000), 600);
    }

    #[test]
    fn mmss_display() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(65), "01:05");
        assert_eq!(format_mmss(1800), "30:00");
    }
}
