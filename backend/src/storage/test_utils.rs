//! Test utilities module for automatic cleanup and consistent test infrastructure
//!
//! `TestEnvironment` owns a temporary directory that is removed when it is
//! dropped, even if the test panics.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{Category, Income, Investment};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

use super::json::JsonConnection;
use super::memory::MemoryStorage;
use super::traits::KeyValueStorage;

/// RAII Test Environment that automatically cleans up on drop
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    pub connection: JsonConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("money_box_test_")?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

/// Storage whose every operation fails; counts write attempts
#[derive(Default)]
pub struct FailingStorage {
    writes: AtomicUsize,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStorage for FailingStorage {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("storage unavailable"))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("disk full"))
    }

    async fn remove_item(&self, _key: &str) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }
}

/// Memory storage whose reads take `read_delay`; writes are immediate
#[derive(Clone)]
pub struct SlowStorage {
    inner: MemoryStorage,
    read_delay: Duration,
}

impl SlowStorage {
    pub fn new(inner: MemoryStorage, read_delay: Duration) -> Self {
        Self { inner, read_delay }
    }
}

#[async_trait]
impl KeyValueStorage for SlowStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        tokio::time::sleep(self.read_delay).await;
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key).await
    }
}

/// Build an income entry dated `day` days into January 2025
pub fn income(id: &str, profit: f64, day: u32) -> Income {
    Income {
        id: id.to_string(),
        date: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        category: Category::SecondHandSell,
        profit,
        owner: "DD".to_string(),
        comments: None,
        total_income_at_time: None,
    }
}

pub fn investment(id: &str, stock_name: &str, stock_price: f64) -> Investment {
    Investment {
        id: id.to_string(),
        date: Utc.with_ymd_and_hms(2025, 2, 1, 9, 30, 0).unwrap(),
        stock_name: stock_name.to_string(),
        stock_price,
        related_incomes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_directory().to_path_buf();
            assert!(base_path.exists());
            std::fs::write(base_path.join("income-storage.json"), "{}")?;
        }
        assert!(!base_path.exists());
        Ok(())
    }
}
