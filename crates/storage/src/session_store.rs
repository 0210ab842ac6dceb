use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use exam_core::model::{AnswerState, GradeReport, Question, SessionClock};

use crate::repository::{KeyValueStore, StorageError};

/// The session-store key set. These are the exact keys the exam pages have
/// always written, so snapshots taken by older sessions stay readable.
pub mod keys {
    pub const QUESTIONS: &str = "exam_questions";
    pub const STATE_SNAPSHOT: &str = "exam_state";
    pub const CURRENT_INDEX: &str = "exam_current_index";
    pub const END_TIME: &str = "exam_end_time";
    pub const DURATION_MINUTES: &str = "exam_duration_minutes";
    pub const STARTED: &str = "exam_started";
    pub const FINISHED: &str = "exam_finished";
    pub const SUBMIT_TIME: &str = "exam_submit_time";
    pub const TIME_TAKEN: &str = "exam_time";
    pub const RESULT: &str = "exam_result";
    pub const USER_NAME: &str = "user_name";
    pub const STUDENT_ID: &str = "student_id";
}

/// Typed facade over the ephemeral per-attempt store.
///
/// Getters degrade to `Ok(None)` when a stored value is missing or
/// malformed; corrupted persisted data is never a user-facing fault, the
/// caller just reconstructs defaults. Only the store itself failing
/// surfaces as `StorageError`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let raw = self.inner.get(key).await?;
        Ok(raw.and_then(|s| serde_json::from_str(&s).ok()))
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.inner.put(key, &raw).await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let raw = self.inner.get(key).await?;
        Ok(raw.and_then(|s| s.trim().parse().ok()))
    }

    async fn get_bool(&self, key: &str) -> Result<bool, StorageError> {
        let raw = self.inner.get(key).await?;
        Ok(raw.as_deref() == Some("true"))
    }

    // ─── Questions ─────────────────────────────────────────────────────────

    /// The stored question list, if present and parseable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn questions(&self) -> Result<Option<Vec<Question>>, StorageError> {
        self.get_json(keys::QUESTIONS).await
    }

    /// Persist the question list so grading and the result presenter see the
    /// same set the exam ran against.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for store or serialization failures.
    pub async fn save_questions(&self, questions: &[Question]) -> Result<(), StorageError> {
        self.put_json(keys::QUESTIONS, &questions).await
    }

    // ─── Answer-state snapshot ─────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn state_snapshot(&self) -> Result<Option<Vec<AnswerState>>, StorageError> {
        self.get_json(keys::STATE_SNAPSHOT).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store or serialization failures.
    pub async fn save_state_snapshot(&self, states: &[AnswerState]) -> Result<(), StorageError> {
        self.put_json(keys::STATE_SNAPSHOT, &states).await
    }

    // ─── Navigation cursor ─────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn current_index(&self) -> Result<Option<usize>, StorageError> {
        let raw = self.get_i64(keys::CURRENT_INDEX).await?;
        Ok(raw.and_then(|v| usize::try_from(v).ok()))
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn save_current_index(&self, index: usize) -> Result<(), StorageError> {
        self.inner
            .put(keys::CURRENT_INDEX, &index.to_string())
            .await
    }

    // ─── Session clock ─────────────────────────────────────────────────────

    /// Rehydrate the persisted deadline and duration, if both are present
    /// and coherent. Durations are whole minutes in the store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn clock(&self) -> Result<Option<SessionClock>, StorageError> {
        let deadline = self.get_i64(keys::END_TIME).await?;
        let minutes = self.get_i64(keys::DURATION_MINUTES).await?;
        let (Some(deadline), Some(minutes)) = (deadline, minutes) else {
            return Ok(None);
        };
        let Ok(minutes) = u32::try_from(minutes) else {
            return Ok(None);
        };
        Ok(SessionClock::from_persisted(deadline, minutes * 60).ok())
    }

    /// Persist deadline + duration immediately after the clock is started.
    ///
    /// The store keeps the duration as whole minutes, so callers must hand
    /// in minute-aligned clocks; a sub-minute remainder would not survive
    /// the round trip.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn save_clock(&self, clock: &SessionClock) -> Result<(), StorageError> {
        self.inner
            .put(keys::END_TIME, &clock.deadline().to_string())
            .await?;
        self.inner
            .put(
                keys::DURATION_MINUTES,
                &(clock.duration_secs() / 60).to_string(),
            )
            .await
    }

    // ─── Flags ─────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn started(&self) -> Result<bool, StorageError> {
        self.get_bool(keys::STARTED).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn set_started(&self) -> Result<(), StorageError> {
        self.inner.put(keys::STARTED, "true").await
    }

    /// The re-entry guard: once set, the exam surface refuses to reopen.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn finished(&self) -> Result<bool, StorageError> {
        self.get_bool(keys::FINISHED).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn set_finished(&self) -> Result<(), StorageError> {
        self.inner.put(keys::FINISHED, "true").await
    }

    // ─── Submission metadata ───────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn submit_time(&self) -> Result<Option<i64>, StorageError> {
        self.get_i64(keys::SUBMIT_TIME).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn save_submit_time(&self, epoch: i64) -> Result<(), StorageError> {
        self.inner.put(keys::SUBMIT_TIME, &epoch.to_string()).await
    }

    /// Cached time-taken so it is computed at most once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn time_taken(&self) -> Result<Option<u32>, StorageError> {
        let raw = self.get_i64(keys::TIME_TAKEN).await?;
        Ok(raw.and_then(|v| u32::try_from(v).ok()))
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn save_time_taken(&self, seconds: u32) -> Result<(), StorageError> {
        self.inner.put(keys::TIME_TAKEN, &seconds.to_string()).await
    }

    // ─── Grade report ──────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn report(&self) -> Result<Option<GradeReport>, StorageError> {
        self.get_json(keys::RESULT).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store or serialization failures.
    pub async fn save_report(&self, report: &GradeReport) -> Result<(), StorageError> {
        self.put_json(keys::RESULT, report).await
    }

    // ─── Student identity echo ─────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn user_name(&self) -> Result<Option<String>, StorageError> {
        self.inner.get(keys::USER_NAME).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn save_user_name(&self, name: &str) -> Result<(), StorageError> {
        self.inner.put(keys::USER_NAME, name).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn student_id(&self) -> Result<Option<String>, StorageError> {
        self.inner.get(keys::STUDENT_ID).await
    }

    // ─── Reset ─────────────────────────────────────────────────────────────

    /// Drop every session key: logout / fresh-attempt reset. The profile
    /// store is untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear().await
    }
}

//
// ─── CREDENTIALS ───────────────────────────────────────────────────────────────
//

/// The single registered identity in the longer-lived store. Plaintext by
/// design: this mirrors the original fake credential store, not real
/// authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub password: String,
}

mod credential_keys {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
}

/// Typed facade over the longer-lived profile store.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// The registered identity, if all three fields are present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for store failures.
    pub async fn identity(&self) -> Result<Option<Identity>, StorageError> {
        let name = self.inner.get(credential_keys::NAME).await?;
        let email = self.inner.get(credential_keys::EMAIL).await?;
        let password = self.inner.get(credential_keys::PASSWORD).await?;
        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(Some(Identity {
                name,
                email,
                password,
            })),
            _ => Ok(None),
        }
    }

    /// Replace whatever identity was registered before. Exactly one identity
    /// is kept, so this clears first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for store failures.
    pub async fn save_identity(&self, identity: &Identity) -> Result<(), StorageError> {
        self.inner.clear().await?;
        self.inner.put(credential_keys::NAME, &identity.name).await?;
        self.inner
            .put(credential_keys::EMAIL, &identity.email)
            .await?;
        self.inner
            .put(credential_keys::PASSWORD, &identity.password)
            .await
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
