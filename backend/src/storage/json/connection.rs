use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::storage::traits::KeyValueStorage;

/// Folder created under `~/Documents` when no data directory is configured
pub const DEFAULT_DIRECTORY_NAME: &str = "Little Money Box";

/// JsonConnection maps storage keys to `<key>.json` files in a base directory
#[derive(Debug, Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a new JSON connection rooted at `base_directory`
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!(path = %base_path.display(), "Created data directory");
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a new JSON connection in the default data directory
    /// (`~/Documents/Little Money Box`)
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_directory()?)
    }

    /// Resolve the default data directory from the user's home directory
    pub fn default_directory() -> Result<PathBuf> {
        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow!("Could not determine home directory"))?;

        Ok(PathBuf::from(home_dir)
            .join("Documents")
            .join(DEFAULT_DIRECTORY_NAME))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Get the file path backing a storage key
    pub fn file_path(&self, key: &str) -> Result<PathBuf> {
        if !Self::is_safe_key(key) {
            return Err(anyhow!("Invalid storage key: {:?}", key));
        }
        Ok(self.base_directory.join(format!("{}.json", key)))
    }

    /// Keys become file names, so only `[A-Za-z0-9_-]` is accepted
    fn is_safe_key(key: &str) -> bool {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

#[async_trait]
impl KeyValueStorage for JsonConnection {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.file_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                debug!(key, path = %path.display(), "Read stored value");
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key)?;
        if !self.base_directory.exists() {
            tokio::fs::create_dir_all(&self.base_directory).await?;
        }

        // Write to a temp file first, then rename over the old value
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, value).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.file_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(key, "Removed stored value");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
