use std::sync::Arc;

use storage::Stores;

use crate::Clock;
use crate::account_service::AccountService;
use crate::config::ExamConfig;
use crate::error::AppServicesError;
use crate::sessions::{ExamFlowService, SessionClockService};

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    stores: Stores,
    accounts: Arc<AccountService>,
    exam_flow: Arc<ExamFlowService>,
    clock_service: Arc<SessionClockService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: ExamConfig,
    ) -> Result<Self, AppServicesError> {
        let stores = Stores::sqlite(db_url).await?;
        Ok(Self::assemble(stores, clock, config))
    }

    /// Build services over in-memory stores (tests, no `--db`).
    #[must_use]
    pub fn new_in_memory(clock: Clock, config: ExamConfig) -> Self {
        Self::assemble(Stores::in_memory(), clock, config)
    }

    fn assemble(stores: Stores, clock: Clock, config: ExamConfig) -> Self {
        let accounts = Arc::new(AccountService::new(
            stores.session.clone(),
            stores.credentials.clone(),
        ));
        let exam_flow = Arc::new(ExamFlowService::new(
            clock,
            stores.session.clone(),
            config,
        ));
        let clock_service = Arc::new(SessionClockService::new(clock, stores.session.clone()));
        Self {
            stores,
            accounts,
            exam_flow,
            clock_service,
        }
    }

    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn exam_flow(&self) -> Arc<ExamFlowService> {
        Arc::clone(&self.exam_flow)
    }

    #[must_use]
    pub fn clock_service(&self) -> Arc<SessionClockService> {
        Arc::clone(&self.clock_service)
    }
}
