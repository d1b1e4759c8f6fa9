//! Channel registry and broadcast

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::RelayError;
use crate::models::PushPayload;

/// Opaque identity of one connected push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Registry of live push channels
#[derive(Default)]
pub struct PushRelay {
    channels: Mutex<HashMap<ChannelId, UnboundedSender<Arc<str>>>>,
}

impl PushRelay {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<ChannelId, UnboundedSender<Arc<str>>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a channel; the receiver yields every payload broadcast from now on
    pub fn register(&self) -> (ChannelId, UnboundedReceiver<Arc<str>>) {
        let id = ChannelId(Uuid::new_v4());
        let (tx, rx) = unbounded_channel();
        let mut channels = self.channels();
        channels.insert(id, tx);
        debug!(channel = %id, connected = channels.len(), "push channel registered");
        (id, rx)
    }

    /// Remove a channel. Returns false if it was already gone.
    pub fn unregister(&self, id: ChannelId) -> bool {
        let mut channels = self.channels();
        let removed = channels.remove(&id).is_some();
        if removed {
            debug!(channel = %id, connected = channels.len(), "push channel unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.channels().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels().is_empty()
    }

    /// Serialize `payload` once and queue it on every registered channel.
    ///
    /// A channel whose receiver is gone is skipped and pruned; the others
    /// still get the payload.
    pub fn broadcast(&self, payload: &PushPayload) -> Result<BroadcastReport, RelayError> {
        let text: Arc<str> = serde_json::to_string(payload)
            .map_err(|e| RelayError::Channel(format!("failed to encode push payload: {e}")))?
            .into();

        let mut report = BroadcastReport::default();
        let mut channels = self.channels();
        channels.retain(|id, tx| match tx.send(Arc::clone(&text)) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(_) => {
                let err = RelayError::Channel(format!("channel {id} closed"));
                warn!(error = %err, "dropping push channel");
                report.failed += 1;
                false
            }
        });

        Ok(report)
    }
}
