//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the orchestrator and
//! whoever wants to observe collection changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event names published by the update orchestrator.
pub mod event_types {
    pub const COLLECTION_UPDATED: &str = "collection.updated";
    pub const UPDATE_FAILED: &str = "update.failed";
    pub const COLLECTION_ROLLED_BACK: &str = "collection.rolled_back";
    pub const COLLECTION_RESTORED: &str = "collection.restored";
    pub const ACTIVE_DEFAULT_SET: &str = "collection.active_default_set";
}

// ---------------------------------------------------------------------------
// StoreEvent
// ---------------------------------------------------------------------------

/// Something that happened to a collection.
///
/// Constructed via [`StoreEvent::new`] and enriched with
/// [`with_version`](StoreEvent::with_version) and
/// [`with_payload`](StoreEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    /// Dot-separated event name, e.g. `"collection.updated"`.
    pub event_type: String,

    pub collection_id: String,

    /// Collection version after the change, when one applies.
    pub version: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl StoreEvent {
    pub fn new(event_type: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            collection_id: collection_id.into(),
            version: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// ```rust
/// use designvault_events::{EventBus, StoreEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(StoreEvent::new("collection.updated", "ds_1"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer wraps.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped when nobody
    /// is listening.
    pub fn publish(&self, event: StoreEvent) {
        tracing::trace!(
            event_type = %event.event_type,
            collection_id = %event.collection_id,
            "Publishing store event"
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
