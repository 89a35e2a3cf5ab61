//! # Write-Through Queue
//!
//! Fire-and-forget persistence for store mutations. Every mutation enqueues
//! the full encoded state; a single background task writes the queue in
//! submission order, so a slow write can never be overtaken by an older one.
//! Failed writes are logged and dropped, never retried.

use anyhow::{anyhow, Result};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::storage::persistence::PersistenceAdapter;

enum WriteRequest {
    Save { name: String, payload: String },
    Remove { name: String },
    Flush(oneshot::Sender<()>),
}

/// Handle to the background persistence task.
///
/// The task exits once every handle has been dropped and the queue is drained.
#[derive(Clone)]
pub struct WriteThrough {
    sender: mpsc::UnboundedSender<WriteRequest>,
}

impl WriteThrough {
    /// Start the write task on the current tokio runtime. Fails when called
    /// outside a runtime.
    pub fn spawn(adapter: PersistenceAdapter) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow!("Write-through queue needs a tokio runtime: {}", e))?;
        let (sender, receiver) = mpsc::unbounded_channel();
        runtime.spawn(Self::run(adapter, receiver));
        Ok(Self { sender })
    }

    /// Queue a full-state save. Never blocks and never fails the caller.
    pub fn schedule(&self, name: &str, payload: String) {
        let request = WriteRequest::Save {
            name: name.to_string(),
            payload,
        };
        if self.sender.send(request).is_err() {
            warn!(name, "Write-through task is gone, dropping save");
        }
    }

    /// Queue removal of the stored value
    pub fn schedule_remove(&self, name: &str) {
        let request = WriteRequest::Remove {
            name: name.to_string(),
        };
        if self.sender.send(request).is_err() {
            warn!(name, "Write-through task is gone, dropping remove");
        }
    }

    /// Wait until everything queued before this call has been written
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.sender
            .send(WriteRequest::Flush(done_tx))
            .map_err(|_| anyhow!("Write-through task is not running"))?;
        done_rx
            .await
            .map_err(|_| anyhow!("Write-through task stopped before flushing"))
    }

    async fn run(adapter: PersistenceAdapter, mut receiver: mpsc::UnboundedReceiver<WriteRequest>) {
        while let Some(request) = receiver.recv().await {
            match request {
                WriteRequest::Save { name, payload } => {
                    match adapter.save_encoded(&name, &payload).await {
                        Ok(()) => debug!(name = %name, "Persisted state"),
                        Err(e) => warn!(name = %name, error = %e, "Failed to persist state"),
                    }
                }
                WriteRequest::Remove { name } => {
                    if let Err(e) = adapter.remove(&name).await {
                        warn!(name = %name, error = %e, "Failed to remove persisted state");
                    }
                }
                WriteRequest::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Write-through task finished");
    }
}
