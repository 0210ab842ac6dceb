#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod config;
pub mod error;
pub mod question_provider;
pub mod sessions;

pub use exam_core::Clock;

pub use account_service::{AccountService, LoginDestination, LoginOutcome};
pub use app_services::AppServices;
pub use config::{ExamConfig, ExamConfigError};
pub use error::{AccountError, AppServicesError, ExamFlowError};
pub use question_provider::QuestionProvider;
pub use sessions::{ExamAttempt, ExamFlowService, ResultView, SessionClockService, TimerTick};
