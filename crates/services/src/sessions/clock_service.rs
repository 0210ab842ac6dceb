use exam_core::Clock;
use exam_core::model::{SessionClock, TimeBand, format_mmss};
use storage::SessionStore;

use crate::error::ExamFlowError;

/// Everything the countdown display needs for one tick, recomputed from the
/// absolute deadline each second.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerTick {
    pub remaining_secs: u32,
    /// `mm:ss` countdown text.
    pub display: String,
    /// Remaining/total ratio in `[0, 1]`, for a proportional indicator.
    pub progress: f64,
    pub band: TimeBand,
    pub expired: bool,
}

/// Owns deadline creation and recovery.
///
/// The deadline is set exactly once per attempt; a process restart re-enters
/// with the persisted value, so time elapsed while the process was down still
/// counts against the student.
#[derive(Clone)]
pub struct SessionClockService {
    clock: Clock,
    store: SessionStore,
}

impl SessionClockService {
    #[must_use]
    pub fn new(clock: Clock, store: SessionStore) -> Self {
        Self { clock, store }
    }

    /// Re-enter with the persisted deadline, or start a fresh clock of
    /// `duration_minutes` and persist it immediately together with the
    /// started flag.
    ///
    /// Durations are whole minutes here because the store only keeps whole
    /// minutes; taking minutes keeps rehydration lossless.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::Clock` for an unusable duration and
    /// `ExamFlowError::Storage` for store failures.
    pub async fn restore_or_create(
        &self,
        duration_minutes: u32,
    ) -> Result<SessionClock, ExamFlowError> {
        if let Some(existing) = self.store.clock().await? {
            return Ok(existing);
        }

        let clock = SessionClock::start(self.clock.now(), duration_minutes * 60)?;
        self.store.save_clock(&clock).await?;
        self.store.set_started().await?;
        Ok(clock)
    }

    /// One 1-second-cadence tick against the session deadline.
    #[must_use]
    pub fn tick(&self, session_clock: &SessionClock) -> TimerTick {
        let now = self.clock.now();
        let remaining_secs = session_clock.remaining(now);
        TimerTick {
            remaining_secs,
            display: format_mmss(remaining_secs),
            progress: session_clock.progress(now),
            band: session_clock.band(now),
            expired: session_clock.is_expired(now),
        }
    }
}
