use exam_core::Clock;
use exam_core::model::{ExamSession, GradeReport, SessionClock, grade};
use storage::SessionStore;

use crate::config::ExamConfig;
use crate::error::ExamFlowError;
use crate::question_provider::QuestionProvider;
use crate::sessions::clock_service::SessionClockService;

/// A live attempt: the in-memory aggregate plus its immutable deadline.
#[derive(Debug)]
pub struct ExamAttempt {
    pub session: ExamSession,
    pub clock: SessionClock,
}

/// Orchestrates one attempt end to end: entry (fresh or resumed), periodic
/// autosave, and the single finalize-and-grade transition shared by manual
/// submission and timer expiry.
#[derive(Clone)]
pub struct ExamFlowService {
    clock: Clock,
    store: SessionStore,
    config: ExamConfig,
}

impl ExamFlowService {
    #[must_use]
    pub fn new(clock: Clock, store: SessionStore, config: ExamConfig) -> Self {
        Self {
            clock,
            store,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> ExamConfig {
        self.config
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Enter the exam: load questions, restore any compatible answer
    /// snapshot and cursor, and restore or create the deadline.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::AlreadySubmitted` when the finished flag is
    /// set; a submitted exam never reopens. Storage and clock failures
    /// propagate.
    pub async fn start_or_resume(&self) -> Result<ExamAttempt, ExamFlowError> {
        if self.store.finished().await? {
            return Err(ExamFlowError::AlreadySubmitted);
        }

        let questions = QuestionProvider::new(self.store.clone()).load().await?;
        let mut session = ExamSession::new(questions)?;

        // Stale or malformed snapshots are ignored; fresh state stands in.
        if let Some(snapshot) = self.store.state_snapshot().await? {
            session.restore(snapshot);
        }
        if let Some(index) = self.store.current_index().await? {
            session.go_to(index);
        }

        let clock = SessionClockService::new(self.clock, self.store.clone())
            .restore_or_create(self.config.duration_minutes())
            .await?;

        Ok(ExamAttempt { session, clock })
    }

    /// Persist the answer snapshot and the navigation cursor.
    ///
    /// Runs on the autosave cadence; best-effort, so losing up to one
    /// interval of interaction on a hard crash is accepted.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::Storage` for store failures.
    pub async fn autosave(&self, session: &ExamSession) -> Result<(), ExamFlowError> {
        self.store
            .save_state_snapshot(&session.snapshot())
            .await?;
        self.store
            .save_current_index(session.current_index())
            .await?;
        Ok(())
    }

    /// Stop the attempt and grade it. Shared by manual submission and timer
    /// expiry, and effective at most once: when the finished flag is already
    /// set the stored report is returned and nothing is recomputed.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::Storage` for store failures.
    pub async fn finalize(
        &self,
        attempt: &mut ExamAttempt,
    ) -> Result<GradeReport, ExamFlowError> {
        if self.store.finished().await? {
            attempt.session.finish();
            if let Some(report) = self.store.report().await? {
                return Ok(report);
            }
            // finished but no report survived; fall through and rebuild it
            // from the persisted pieces, reusing the stored timestamps.
        }
        attempt.session.finish();

        let submit_time = match self.store.submit_time().await? {
            Some(epoch) => epoch,
            None => {
                let epoch = self.clock.epoch_seconds();
                self.store.save_submit_time(epoch).await?;
                epoch
            }
        };

        // Computed at most once per attempt; later reads reuse the stored
        // value.
        let time_taken = match self.store.time_taken().await? {
            Some(seconds) => seconds,
            None => {
                let seconds = attempt.clock.time_taken(submit_time);
                self.store.save_time_taken(seconds).await?;
                seconds
            }
        };

        // Final snapshot so the graded answers match what the report shows.
        self.store
            .save_state_snapshot(&attempt.session.snapshot())
            .await?;

        let result = grade(attempt.session.questions(), attempt.session.states());
        let report = GradeReport::new(
            result,
            time_taken,
            self.store.user_name().await?,
            self.store.student_id().await?,
            submit_time,
        );
        self.store.save_report(&report).await?;
        self.store.set_finished().await?;
        Ok(report)
    }

    /// The persisted report, if an attempt was finalized.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::Storage` for store failures.
    pub async fn report(&self) -> Result<Option<GradeReport>, ExamFlowError> {
        Ok(self.store.report().await?)
    }

    /// Drop every session key: logout / fresh-attempt reset.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::Storage` for store failures.
    pub async fn reset(&self) -> Result<(), ExamFlowError> {
        Ok(self.store.clear().await?)
    }
}
