//! # Little Money Box Backend
//!
//! State engine for a small personal-finance app: log incomes and
//! investments, list and sort them, and get prompted to invest whenever the
//! saved-up income reaches the investment threshold.
//!
//! [`Backend`] wires the stores, storage and services together from an
//! [`AppConfig`]. A presentation layer constructs one, awaits
//! [`Backend::hydrate`], and then calls into the stores directly.

use anyhow::{Context, Result};
use chrono::Utc;
use shared::{IncomeFormInput, InvestmentFormInput};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod config;
pub mod domain;
pub mod logging;
pub mod storage;

pub use config::{AppConfig, StorageBackend};
pub use domain::commands::income::IncomeMutation;
pub use domain::{
    EntryError, EntryTableService, IncomeFormService, IncomeStore, InvestmentFormService,
    InvestmentNotifier, InvestmentStore, LogNotifier, StoreError,
};
pub use storage::{JsonConnection, KeyValueStorage, MemoryStorage, PersistenceAdapter, WriteThrough};

/// Main backend struct that owns both stores and the supporting services
pub struct Backend {
    pub config: AppConfig,
    pub income_store: IncomeStore,
    pub investment_store: InvestmentStore,
    pub income_forms: IncomeFormService,
    pub investment_forms: InvestmentFormService,
    pub entry_table: EntryTableService,
    writer: WriteThrough,
}

impl Backend {
    /// Build a backend whose storage follows `config.storage`.
    ///
    /// Must be called inside a tokio runtime. Stores start empty and
    /// un-hydrated.
    pub fn new(config: AppConfig, data_directory: &Path) -> Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = match config.storage {
            StorageBackend::File => Arc::new(JsonConnection::new(data_directory)?),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage, Arc::new(LogNotifier))
    }

    pub fn with_storage(
        config: AppConfig,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Arc<dyn InvestmentNotifier>,
    ) -> Result<Self> {
        config.validate()?;

        let persistence = PersistenceAdapter::new(storage);
        let writer = WriteThrough::spawn(persistence.clone())?;

        let income_store = IncomeStore::new(
            persistence.clone(),
            writer.clone(),
            config.income_policy(),
            notifier,
        );
        let investment_store = InvestmentStore::new(persistence, writer.clone());

        Ok(Backend {
            income_forms: config.income_forms(),
            investment_forms: InvestmentFormService::new(),
            entry_table: EntryTableService::with_config(config.table_config()),
            config,
            income_store,
            investment_store,
            writer,
        })
    }

    /// Open the default data directory, loading or creating its config, and
    /// install logging at the configured level
    pub fn open_default() -> Result<Self> {
        let directory = JsonConnection::default_directory()?;
        let config = AppConfig::load_or_create(&directory)
            .with_context(|| format!("Failed to load config from {:?}", directory))?;
        logging::init_logging(&config.log_level)?;
        info!("Opening money box at {:?}", directory);
        Self::new(config, &directory)
    }

    /// Load both stores concurrently
    pub async fn hydrate(&self) {
        tokio::join!(self.income_store.hydrate(), self.investment_store.hydrate());
    }

    /// Validate a submitted income form and add it, or replace the income
    /// `existing_id` when editing
    pub fn submit_income(
        &self,
        input: &IncomeFormInput,
        existing_id: Option<&str>,
    ) -> Result<IncomeMutation, EntryError> {
        let income = self
            .income_forms
            .build(input, self.income_store.total_income(), existing_id)
            .map_err(|errors| {
                EntryError::Invalid(
                    self.income_forms
                        .first_error_message(&errors)
                        .unwrap_or_default(),
                )
            })?;

        let mutation = match existing_id {
            Some(_) => self.income_store.edit_income(income)?,
            None => self.income_store.add_income(income)?,
        };
        Ok(mutation)
    }

    pub fn submit_investment(
        &self,
        input: &InvestmentFormInput,
        existing_id: Option<&str>,
    ) -> Result<(), EntryError> {
        let investment = self
            .investment_forms
            .build(input, existing_id)
            .map_err(|errors| {
                EntryError::Invalid(
                    errors
                        .first()
                        .map(|e| self.investment_forms.error_message(e))
                        .unwrap_or_default(),
                )
            })?;

        match existing_id {
            Some(_) => self.investment_store.update_investment(investment)?,
            None => self.investment_store.add_investment(investment)?,
        }
        Ok(())
    }

    /// Wait for every queued save of both stores
    pub async fn flush(&self) -> Result<()> {
        self.writer.flush().await
    }

    /// Blank income form dated now
    pub fn new_income_input(&self) -> IncomeFormInput {
        self.income_forms.blank_input(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification_service::ChannelNotifier;
    use crate::storage::test_utils::TestEnvironment;

    fn memory_backend() -> (Backend, tokio::sync::mpsc::UnboundedReceiver<shared::InvestmentOpportunity>) {
        let (notifier, receiver) = ChannelNotifier::new();
        let backend = Backend::with_storage(
            AppConfig::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(notifier),
        )
        .unwrap();
        (backend, receiver)
    }

    fn income_input(backend: &Backend, profit: &str) -> IncomeFormInput {
        IncomeFormInput {
            profit: profit.to_string(),
            ..backend.new_income_input()
        }
    }

    #[tokio::test]
    async fn test_submit_income_until_threshold() {
        let (backend, mut receiver) = memory_backend();
        backend.hydrate().await;

        backend.submit_income(&income_input(&backend, "120"), None).unwrap();
        backend.submit_income(&income_input(&backend, "$200"), None).unwrap();

        assert_eq!(backend.income_store.total_income(), 20.0);
        let incomes = backend.income_store.incomes();
        assert_eq!(incomes[0].total_income_at_time, Some(120.0));
        assert_eq!(incomes[1].total_income_at_time, Some(320.0));

        let opportunity = receiver.try_recv().unwrap();
        assert_eq!(opportunity.title, "🎉 Investment Time!");
    }

    #[tokio::test]
    async fn test_submit_invalid_income_shows_message() {
        let (backend, _receiver) = memory_backend();
        backend.hydrate().await;

        let result = backend.submit_income(&income_input(&backend, ""), None);

        assert_eq!(
            result,
            Err(EntryError::Invalid(
                "Profit is required and must be a valid number.".to_string()
            ))
        );
        assert!(backend.income_store.incomes().is_empty());
    }

    #[tokio::test]
    async fn test_submit_before_hydration_is_rejected() {
        let (backend, _receiver) = memory_backend();
        let result = backend.submit_income(&income_input(&backend, "5"), None);
        assert_eq!(result, Err(EntryError::Store(StoreError::NotHydrated)));
    }

    #[tokio::test]
    async fn test_edit_through_form_keeps_id() {
        let (backend, _receiver) = memory_backend();
        backend.hydrate().await;
        backend.submit_income(&income_input(&backend, "10"), None).unwrap();
        let id = backend.income_store.incomes()[0].id.clone();

        backend
            .submit_income(&income_input(&backend, "25"), Some(&id))
            .unwrap();

        let incomes = backend.income_store.incomes();
        assert_eq!(incomes.len(), 1);
        assert_eq!(incomes[0].id, id);
        assert_eq!(backend.income_store.total_income(), 25.0);
    }

    #[tokio::test]
    async fn test_submit_investment() {
        let (backend, _receiver) = memory_backend();
        backend.hydrate().await;

        let mut input = InvestmentFormService::blank_input(Utc::now());
        assert_eq!(
            backend.submit_investment(&input, None),
            Err(EntryError::Invalid("Please enter stock name and price.".to_string()))
        );

        input.stock_name = "VOO".to_string();
        input.stock_price = "512.30".to_string();
        backend.submit_investment(&input, None).unwrap();
        assert_eq!(backend.investment_store.total_invested(), 512.30);
    }

    #[tokio::test]
    async fn test_file_backend_survives_restart() -> Result<()> {
        let env = TestEnvironment::new()?;
        let config = AppConfig::load_or_create(env.base_directory())?;

        let backend = Backend::new(config.clone(), env.base_directory())?;
        backend.hydrate().await;
        backend.submit_income(&income_input(&backend, "42"), None)?;
        let mut input = InvestmentFormService::blank_input(Utc::now());
        input.stock_name = "VTI".to_string();
        input.stock_price = "10".to_string();
        backend.submit_investment(&input, None)?;
        backend.flush().await?;

        let reopened = Backend::new(config, env.base_directory())?;
        reopened.hydrate().await;
        assert_eq!(reopened.income_store.incomes(), backend.income_store.incomes());
        assert_eq!(reopened.income_store.total_income(), 42.0);
        assert_eq!(reopened.investment_store.investments().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_backend_writes_nothing_to_disk() -> Result<()> {
        let env = TestEnvironment::new()?;
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };
        let backend = Backend::new(config, env.base_directory())?;
        backend.hydrate().await;
        backend.submit_income(&income_input(&backend, "42"), None)?;
        backend.flush().await?;

        assert!(!env.base_directory().join("income-storage.json").exists());
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let config = AppConfig {
            owners: Vec::new(),
            ..AppConfig::default()
        };
        assert!(Backend::with_storage(config, Arc::new(MemoryStorage::new()), Arc::new(LogNotifier)).is_err());
    }

    #[test]
    fn test_backend_outside_runtime_is_an_error() {
        let result = Backend::with_storage(
            AppConfig::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(LogNotifier),
        );
        assert!(result.is_err());
    }
}
