//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{ExamSessionError, SessionClockError};
use storage::{SqliteInitError, StorageError};

/// Errors raised while assembling the service stack.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    SqliteInit(#[from] SqliteInitError),
}

/// Errors emitted by the exam flow services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamFlowError {
    /// The finished flag is set: the exam surface refuses to reopen.
    #[error("exam already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Session(#[from] ExamSessionError),

    #[error(transparent)]
    Clock(#[from] SessionClockError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("name is required")]
    NameRequired,

    #[error("enter a valid email")]
    InvalidEmail,

    #[error("password must be at least 8 characters")]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("already have an account, please log in")]
    AlreadyRegistered,

    #[error("email or password is wrong")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
