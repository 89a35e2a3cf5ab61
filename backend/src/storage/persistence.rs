//! # Persistence Adapter
//!
//! Serializes whole store states into a versioned JSON envelope and moves
//! them in and out of a [`KeyValueStorage`] backend.
//!
//! ## Envelope Format
//!
//! ```json
//! { "state": { "incomes": [ ... ], "totalIncome": 50.0, "sortBy": "date", "sortOrder": "desc" }, "version": 0 }
//! ```
//!
//! Timestamps are part of the record schema (`DateTime<Utc>` fields that
//! serialize as RFC 3339), so no field is ever revived by name.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::storage::traits::KeyValueStorage;

/// Version written into every envelope. Stored envelopes with any other
/// version are discarded on load.
pub const STATE_VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEnvelope<S> {
    pub state: S,
    pub version: u32,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Clone)]
pub struct PersistenceAdapter {
    storage: Arc<dyn KeyValueStorage>,
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Serialize a full state into its envelope
    pub fn encode<S: Serialize>(state: &S) -> Result<String> {
        let envelope = PersistedEnvelope {
            state,
            version: STATE_VERSION,
        };
        serde_json::to_string(&envelope).context("Failed to serialize state")
    }

    /// Parse a stored envelope. Returns `None` when the envelope was written
    /// with a different state version.
    pub fn decode<S: DeserializeOwned>(name: &str, raw: &str) -> Result<Option<S>> {
        let probe: VersionProbe = serde_json::from_str(raw)
            .with_context(|| format!("Stored value for {} is not a state envelope", name))?;

        if probe.version != STATE_VERSION {
            warn!(
                name,
                stored_version = probe.version,
                current_version = STATE_VERSION,
                "Discarding stored state with unsupported version"
            );
            return Ok(None);
        }

        let envelope: PersistedEnvelope<S> = serde_json::from_str(raw)
            .with_context(|| format!("Failed to deserialize stored state for {}", name))?;
        Ok(Some(envelope.state))
    }

    /// Load the state stored under `name`, `None` if nothing usable is stored
    pub async fn load<S: DeserializeOwned>(&self, name: &str) -> Result<Option<S>> {
        match self.storage.get_item(name).await? {
            Some(raw) => {
                debug!(name, bytes = raw.len(), "Loaded stored state");
                Self::decode(name, &raw)
            }
            None => {
                debug!(name, "No stored state found");
                Ok(None)
            }
        }
    }

    /// Serialize and store the full state under `name`
    pub async fn save<S: Serialize>(&self, name: &str, state: &S) -> Result<()> {
        let payload = Self::encode(state)?;
        self.save_encoded(name, &payload).await
    }

    /// Store an already-encoded envelope under `name`
    pub async fn save_encoded(&self, name: &str, payload: &str) -> Result<()> {
        self.storage
            .set_item(name, payload)
            .await
            .with_context(|| format!("Failed to write state for {}", name))
    }

    pub async fn remove(&self, name: &str) -> Result<()> {
        self.storage
            .remove_item(name)
            .await
            .with_context(|| format!("Failed to remove state for {}", name))
    }
}
