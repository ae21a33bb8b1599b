//! Change notifications for collections.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`StoreEvent`]: the envelope published after every audited change.
//! - [`event_types`]: the event names the orchestrator publishes.

pub mod bus;

pub use bus::{event_types, EventBus, StoreEvent};
