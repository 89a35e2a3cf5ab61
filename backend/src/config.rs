//! # App Config
//!
//! User-editable settings stored as `config.yaml` at the root of the data
//! directory. A missing file is created with defaults; missing keys fall back
//! to their defaults.
//!
//! ## YAML Format
//!
//! ```yaml
//! data_format_version: "1.0"
//! log_level: info
//! storage: file
//! investment_threshold: 300.0
//! threshold_reset: rollover
//! delete_policy: keep_total
//! owners:
//!   - DD
//!   - RR
//! default_owner: DD
//! date_format: short_date
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::commands::income::DeletePolicy;
use crate::domain::entry_forms::{IncomeFormService, DEFAULT_OWNERS};
use crate::domain::entry_table::{DateFormat, EntryTableConfig};
use crate::domain::reducers::income::IncomePolicy;
use crate::domain::threshold::{ThresholdPolicy, ThresholdReset, DEFAULT_INVESTMENT_THRESHOLD};

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Where store state is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per store in the data directory
    File,
    /// Nothing is written; state is lost on exit
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Data format version for future migrations
    pub data_format_version: String,
    pub log_level: String,
    pub storage: StorageBackend,
    /// Running total at which an investment prompt is raised
    pub investment_threshold: f64,
    pub threshold_reset: ThresholdReset,
    pub delete_policy: DeletePolicy,
    pub owners: Vec<String>,
    pub default_owner: String,
    pub date_format: DateFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_format_version: "1.0".to_string(),
            log_level: "info".to_string(),
            storage: StorageBackend::File,
            investment_threshold: DEFAULT_INVESTMENT_THRESHOLD,
            threshold_reset: ThresholdReset::Rollover,
            delete_policy: DeletePolicy::KeepTotal,
            owners: DEFAULT_OWNERS.iter().map(|o| o.to_string()).collect(),
            default_owner: DEFAULT_OWNERS[0].to_string(),
            date_format: DateFormat::ShortDate,
        }
    }
}

impl AppConfig {
    pub fn config_path(directory: &Path) -> PathBuf {
        directory.join(CONFIG_FILE_NAME)
    }

    /// Load `config.yaml` from `directory`, creating it with defaults if missing
    pub fn load_or_create(directory: &Path) -> Result<Self> {
        let config_path = Self::config_path(directory);

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {:?}", config_path))?;
            let config: AppConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Failed to parse {:?}", config_path))?;
            config.validate()?;
            debug!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save(directory)?;
            info!("Created default config at {:?}", config_path);
            Ok(config)
        }
    }

    /// Write atomically through a temp file
    pub fn save(&self, directory: &Path) -> Result<()> {
        self.validate()?;

        if !directory.exists() {
            fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create data directory {:?}", directory))?;
            info!("Created data directory: {:?}", directory);
        }

        let config_path = Self::config_path(directory);
        let yaml_content = serde_yaml::to_string(self)?;
        let temp_path = config_path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved config to {:?}", config_path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.investment_threshold.is_finite() || self.investment_threshold <= 0.0 {
            return Err(anyhow!(
                "investment_threshold must be a positive number, got {}",
                self.investment_threshold
            ));
        }
        if self.owners.iter().all(|o| o.trim().is_empty()) {
            return Err(anyhow!("At least one owner must be configured"));
        }
        if !self.owners.contains(&self.default_owner) {
            return Err(anyhow!(
                "default_owner {:?} is not one of the configured owners",
                self.default_owner
            ));
        }
        Ok(())
    }

    pub fn income_policy(&self) -> IncomePolicy {
        IncomePolicy {
            threshold: ThresholdPolicy {
                threshold: self.investment_threshold,
                reset: self.threshold_reset,
            },
            delete: self.delete_policy,
        }
    }

    pub fn table_config(&self) -> EntryTableConfig {
        EntryTableConfig {
            date_format: self.date_format,
            ..EntryTableConfig::default()
        }
    }

    pub fn income_forms(&self) -> IncomeFormService {
        IncomeFormService::new(self.owners.clone(), self.default_owner.clone())
    }
}
