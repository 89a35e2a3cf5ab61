//! Income store: the in-memory income state plus its persistence.
//!
//! Every mutation goes through [`reducers::income::reduce`]; the store swaps
//! in the returned state and queues the full state on the write-through
//! queue while still holding the write lock, so saves reach the queue in the
//! same order the states were produced.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use shared::{Income, IncomeState, SortField, SortOrder};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::commands::income::{IncomeAction, IncomeMutation};
use crate::domain::entry_table::sort_incomes;
use crate::domain::errors::StoreError;
use crate::domain::notification_service::InvestmentNotifier;
use crate::domain::reducers::income::{reduce, IncomePolicy};
use crate::storage::{PersistenceAdapter, WriteThrough};

pub const INCOME_STORAGE_KEY: &str = "income-storage";

/// Cheap `Clone` handle; clones share the same state
#[derive(Clone)]
pub struct IncomeStore {
    state: Arc<RwLock<IncomeState>>,
    /// Held for the whole of a load
    hydration: Arc<Mutex<()>>,
    policy: IncomePolicy,
    persistence: PersistenceAdapter,
    writer: WriteThrough,
    notifier: Arc<dyn InvestmentNotifier>,
}

impl IncomeStore {
    pub fn new(
        persistence: PersistenceAdapter,
        writer: WriteThrough,
        policy: IncomePolicy,
        notifier: Arc<dyn InvestmentNotifier>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(IncomeState::default())),
            hydration: Arc::new(Mutex::new(())),
            policy,
            persistence,
            writer,
            notifier,
        }
    }

    /// Load previously saved state, then mark the store hydrated.
    ///
    /// Missing, outdated or unreadable data leaves the defaults in place. The
    /// store is marked hydrated either way. Concurrent calls wait for the
    /// first load instead of loading again.
    pub async fn hydrate(&self) {
        let _loading = self.hydration.lock().await;
        if self.is_hydrated() {
            debug!("Income store already hydrated, skipping load");
            return;
        }

        let loaded = match self.persistence.load::<IncomeState>(INCOME_STORAGE_KEY).await {
            Ok(Some(loaded)) => {
                info!(
                    incomes = loaded.incomes.len(),
                    total_income = loaded.total_income,
                    "Restored income store"
                );
                Some(loaded)
            }
            Ok(None) => {
                info!("No saved income data, starting empty");
                None
            }
            Err(e) => {
                error!("Failed to load income data, starting empty: {:#}", e);
                None
            }
        };

        let mut state = self.write_state();
        if state.is_hydrated {
            warn!("Income store was hydrated during load, keeping in-memory state");
            return;
        }
        if let Some(loaded) = loaded {
            *state = loaded;
        }
        state.is_hydrated = true;
    }

    /// Mark the store hydrated without loading. Idempotent, and ignored while
    /// a [`hydrate`](Self::hydrate) load is in flight.
    pub fn set_hydrated(&self) {
        match self.hydration.try_lock() {
            Ok(_idle) => self.write_state().is_hydrated = true,
            Err(_) => warn!("Income data is still loading, ignoring set_hydrated"),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.read_state().is_hydrated
    }

    /// Snapshot of the whole state
    pub fn state(&self) -> IncomeState {
        self.read_state().clone()
    }

    /// Incomes in insertion order
    pub fn incomes(&self) -> Vec<Income> {
        self.read_state().incomes.clone()
    }

    pub fn total_income(&self) -> f64 {
        self.read_state().total_income
    }

    pub fn get_income(&self, id: &str) -> Option<Income> {
        self.read_state().incomes.iter().find(|i| i.id == id).cloned()
    }

    /// Incomes ordered by the current sort field and order
    pub fn sorted_incomes(&self) -> Vec<Income> {
        let state = self.read_state();
        sort_incomes(&state.incomes, state.sort_by, state.sort_order)
    }

    pub fn add_income(&self, income: Income) -> Result<IncomeMutation, StoreError> {
        debug!(id = %income.id, profit = income.profit, "Adding income");
        self.dispatch(IncomeAction::Add(income))
    }

    /// Replace the income with the same id, keeping its list position
    pub fn edit_income(&self, income: Income) -> Result<IncomeMutation, StoreError> {
        debug!(id = %income.id, profit = income.profit, "Editing income");
        self.dispatch(IncomeAction::Edit(income))
    }

    pub fn delete_income(&self, id: &str) -> Result<IncomeMutation, StoreError> {
        debug!(id, "Deleting income");
        self.dispatch(IncomeAction::Delete(id.to_string()))
    }

    /// Sort by `field`; the order flips on every call. Returns the new order.
    pub fn set_sorting(&self, field: SortField) -> Result<SortOrder, StoreError> {
        self.dispatch(IncomeAction::SetSorting(field))?;
        Ok(self.read_state().sort_order)
    }

    /// Clear all incomes and the running total, and drop the saved data
    pub fn reset(&self) {
        let mut state = self.write_state();
        *state = IncomeState {
            is_hydrated: state.is_hydrated,
            ..IncomeState::default()
        };
        self.writer.schedule_remove(INCOME_STORAGE_KEY);
        info!("Income store reset");
    }

    /// Wait for queued saves to reach storage
    pub async fn flush(&self) -> Result<()> {
        self.writer.flush().await
    }

    fn dispatch(&self, action: IncomeAction) -> Result<IncomeMutation, StoreError> {
        let mutation = {
            let mut state = self.write_state();
            if !state.is_hydrated {
                warn!("Rejecting income mutation before hydration");
                return Err(StoreError::NotHydrated);
            }

            let transition = reduce(&state, action, &self.policy)?;
            *state = transition.state;

            match PersistenceAdapter::encode(&*state) {
                Ok(payload) => self.writer.schedule(INCOME_STORAGE_KEY, payload),
                Err(e) => error!("Failed to encode income state: {:#}", e),
            }
            transition.mutation
        };

        if let Some(opportunity) = &mutation.opportunity {
            self.notifier.notify(opportunity);
        }
        Ok(mutation)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, IncomeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, IncomeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
