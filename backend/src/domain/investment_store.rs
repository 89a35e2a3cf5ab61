//! Investment store: the in-memory investment list plus its persistence.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use shared::{Income, Investment, InvestmentState};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::commands::investment::{InvestmentAction, RelatedIncomes};
use crate::domain::errors::StoreError;
use crate::domain::reducers::investment::reduce;
use crate::storage::{PersistenceAdapter, WriteThrough};

pub const INVESTMENT_STORAGE_KEY: &str = "investment-storage";

#[derive(Clone)]
pub struct InvestmentStore {
    state: Arc<RwLock<InvestmentState>>,
    hydration: Arc<Mutex<()>>,
    persistence: PersistenceAdapter,
    writer: WriteThrough,
}

impl InvestmentStore {
    pub fn new(persistence: PersistenceAdapter, writer: WriteThrough) -> Self {
        Self {
            state: Arc::new(RwLock::new(InvestmentState::default())),
            hydration: Arc::new(Mutex::new(())),
            persistence,
            writer,
        }
    }

    /// Load previously saved investments, then mark the store hydrated.
    /// Concurrent calls wait for the first load.
    pub async fn hydrate(&self) {
        let _loading = self.hydration.lock().await;
        if self.is_hydrated() {
            debug!("Investment store already hydrated, skipping load");
            return;
        }

        let loaded = match self
            .persistence
            .load::<InvestmentState>(INVESTMENT_STORAGE_KEY)
            .await
        {
            Ok(Some(loaded)) => {
                info!(investments = loaded.investments.len(), "Restored investment store");
                Some(loaded.investments)
            }
            Ok(None) => {
                info!("No saved investment data, starting empty");
                None
            }
            Err(e) => {
                error!("Failed to load investment data, starting empty: {:#}", e);
                None
            }
        };

        let mut state = self.write_state();
        if state.is_hydrated {
            warn!("Investment store was hydrated during load, keeping in-memory state");
            return;
        }
        if let Some(investments) = loaded {
            state.investments = investments;
        }
        state.is_hydrated = true;
    }

    /// Ignored while a load is in flight
    pub fn set_hydrated(&self) {
        match self.hydration.try_lock() {
            Ok(_idle) => self.write_state().is_hydrated = true,
            Err(_) => warn!("Investment data is still loading, ignoring set_hydrated"),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.read_state().is_hydrated
    }

    pub fn state(&self) -> InvestmentState {
        self.read_state().clone()
    }

    pub fn investments(&self) -> Vec<Investment> {
        self.read_state().investments.clone()
    }

    pub fn get_investment(&self, id: &str) -> Option<Investment> {
        self.read_state()
            .investments
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// Sum of all stock prices
    pub fn total_invested(&self) -> f64 {
        self.read_state()
            .investments
            .iter()
            .map(|i| i.stock_price)
            .sum()
    }

    /// Resolve an investment's related income ids against `incomes`.
    /// Returns `None` when the investment itself is unknown.
    pub fn related_incomes(&self, id: &str, incomes: &[Income]) -> Option<RelatedIncomes> {
        let investment = self.get_investment(id)?;
        let mut related = RelatedIncomes {
            found: Vec::new(),
            dangling: Vec::new(),
        };
        for income_id in investment.related_incomes {
            match incomes.iter().find(|i| i.id == income_id) {
                Some(income) => related.found.push(income.clone()),
                None => related.dangling.push(income_id),
            }
        }
        Some(related)
    }

    pub fn add_investment(&self, investment: Investment) -> Result<(), StoreError> {
        debug!(id = %investment.id, stock = %investment.stock_name, "Adding investment");
        self.dispatch(InvestmentAction::Add(investment))
    }

    pub fn update_investment(&self, investment: Investment) -> Result<(), StoreError> {
        debug!(id = %investment.id, "Updating investment");
        self.dispatch(InvestmentAction::Update(investment))
    }

    pub fn remove_investment(&self, id: &str) -> Result<(), StoreError> {
        debug!(id, "Removing investment");
        self.dispatch(InvestmentAction::Remove(id.to_string()))
    }

    pub fn reset(&self) {
        self.write_state().investments.clear();
        self.writer.schedule_remove(INVESTMENT_STORAGE_KEY);
        info!("Investment store reset");
    }

    pub async fn flush(&self) -> Result<()> {
        self.writer.flush().await
    }

    fn dispatch(&self, action: InvestmentAction) -> Result<(), StoreError> {
        let mut state = self.write_state();
        if !state.is_hydrated {
            warn!("Rejecting investment mutation before hydration");
            return Err(StoreError::NotHydrated);
        }

        let next = reduce(&state, action)?;
        *state = next;

        match PersistenceAdapter::encode(&*state) {
            Ok(payload) => self.writer.schedule(INVESTMENT_STORAGE_KEY, payload),
            Err(e) => error!("Failed to encode investment state: {:#}", e),
        }
        Ok(())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, InvestmentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, InvestmentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{income, investment, SlowStorage, TestEnvironment};
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use std::time::Duration;

    fn store_on(storage: Arc<dyn KeyValueStorage>) -> InvestmentStore {
        let persistence = PersistenceAdapter::new(storage);
        let writer = WriteThrough::spawn(persistence.clone()).unwrap();
        InvestmentStore::new(persistence, writer)
    }

    async fn hydrated_store() -> InvestmentStore {
        let store = store_on(Arc::new(MemoryStorage::new()));
        store.hydrate().await;
        store
    }

    #[tokio::test]
    async fn test_add_update_remove() {
        let store = hydrated_store().await;
        store.add_investment(investment("i1", "VOO", 500.0)).unwrap();
        store.add_investment(investment("i2", "VTI", 250.0)).unwrap();

        let mut updated = investment("i1", "VOO", 510.0);
        updated.related_incomes = vec!["a".to_string()];
        store.update_investment(updated.clone()).unwrap();

        assert_eq!(store.investments()[0], updated);
        assert_eq!(store.total_invested(), 760.0);

        store.remove_investment("i2").unwrap();
        assert_eq!(store.investments().len(), 1);
        assert!(store.get_investment("i2").is_none());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = hydrated_store().await;
        store.add_investment(investment("i1", "VOO", 500.0)).unwrap();
        let before = store.state();

        assert!(matches!(
            store.update_investment(investment("nope", "X", 1.0)),
            Err(StoreError::NotFound { kind: "investment", .. })
        ));
        assert!(matches!(
            store.remove_investment("nope"),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.state(), before);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = hydrated_store().await;
        store.add_investment(investment("i1", "VOO", 500.0)).unwrap();
        assert!(matches!(
            store.add_investment(investment("i1", "VTI", 1.0)),
            Err(StoreError::DuplicateId { .. })
        ));
        assert_eq!(store.investments().len(), 1);
    }

    #[tokio::test]
    async fn test_requires_hydration() {
        let store = store_on(Arc::new(MemoryStorage::new()));
        assert_eq!(
            store.add_investment(investment("i1", "VOO", 1.0)),
            Err(StoreError::NotHydrated)
        );
        store.set_hydrated();
        store.set_hydrated();
        assert!(store.add_investment(investment("i1", "VOO", 1.0)).is_ok());
    }

    #[tokio::test]
    async fn test_set_hydrated_is_ignored_while_loading() {
        let memory = MemoryStorage::new();
        let first = store_on(Arc::new(memory.clone()));
        first.hydrate().await;
        first.add_investment(investment("old", "VOO", 500.0)).unwrap();
        first.flush().await.unwrap();

        let store = store_on(Arc::new(SlowStorage::new(memory, Duration::from_millis(100))));
        let loading = tokio::spawn({
            let store = store.clone();
            async move { store.hydrate().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        store.set_hydrated();
        assert_eq!(
            store.add_investment(investment("new", "VTI", 1.0)),
            Err(StoreError::NotHydrated)
        );

        loading.await.unwrap();
        store.add_investment(investment("new", "VTI", 1.0)).unwrap();
        let ids: Vec<String> = store.investments().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["old", "new"]);
    }

    #[tokio::test]
    async fn test_related_incomes_tolerates_dangling_ids() {
        let store = hydrated_store().await;
        let mut entry = investment("i1", "VOO", 500.0);
        entry.related_incomes = vec!["a".to_string(), "gone".to_string()];
        store.add_investment(entry).unwrap();

        let incomes = vec![income("a", 300.0, 1), income("b", 10.0, 2)];
        let related = store.related_incomes("i1", &incomes).unwrap();

        assert_eq!(related.found, vec![incomes[0].clone()]);
        assert_eq!(related.dangling, vec!["gone".to_string()]);
        assert!(store.related_incomes("missing", &incomes).is_none());
    }

    #[tokio::test]
    async fn test_persists_and_hydrates_from_disk() -> Result<()> {
        let env = TestEnvironment::new()?;
        let storage: Arc<dyn KeyValueStorage> = Arc::new(env.connection.clone());

        let store = store_on(storage.clone());
        store.hydrate().await;
        let mut entry = investment("i1", "VOO", 512.25);
        entry.related_incomes = vec!["income::1".to_string()];
        store.add_investment(entry)?;
        store.flush().await?;
        assert!(env.base_directory().join("investment-storage.json").exists());

        let reopened = store_on(storage);
        reopened.hydrate().await;
        assert!(reopened.is_hydrated());
        assert_eq!(reopened.investments(), store.investments());
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_removes_saved_data() {
        let storage = MemoryStorage::new();
        let store = store_on(Arc::new(storage.clone()));
        store.hydrate().await;
        store.add_investment(investment("i1", "VOO", 5.0)).unwrap();
        store.flush().await.unwrap();

        store.reset();
        store.flush().await.unwrap();

        assert!(store.investments().is_empty());
        assert!(storage.is_empty());
    }
}
