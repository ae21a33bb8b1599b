//! Registered update schedules.
//!
//! A schedule pairs a collection with an update callback and a timing spec.
//! Nothing here runs on a timer; schedules are triggered explicitly through
//! [`crate::UpdateOrchestrator::trigger_schedule`].

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use designvault_core::types::Timestamp;
use designvault_core::{Collection, CoreError};

/// Produces the update payload for a collection when a schedule fires.
pub type UpdateFn = Arc<dyn Fn(&Collection) -> Value + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScheduleSpec {
    #[serde(rename_all = "camelCase")]
    Interval { interval_ms: u64 },
    Once { at: Timestamp },
    Manual,
}

impl ScheduleSpec {
    /// Next run time after `from`, or `None` when the spec never fires on
    /// its own again.
    pub fn next_run(&self, from: Timestamp) -> Option<Timestamp> {
        match self {
            Self::Interval { interval_ms } => {
                let millis = i64::try_from(*interval_ms).unwrap_or(i64::MAX);
                Some(from + Duration::milliseconds(millis))
            }
            Self::Once { at } if *at > from => Some(*at),
            Self::Once { .. } | Self::Manual => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn ensure_runnable(&self, schedule_id: &str) -> Result<(), CoreError> {
        match self {
            Self::Scheduled => Ok(()),
            other => Err(CoreError::Conflict(format!(
                "Schedule {schedule_id} is {}",
                other.as_str()
            ))),
        }
    }
}

#[derive(Clone)]
pub struct ScheduledUpdate {
    pub id: String,
    pub collection_id: String,
    pub schedule: ScheduleSpec,
    pub update_fn: UpdateFn,
    pub created_at: Timestamp,
    pub status: ScheduleStatus,
    pub last_run: Option<Timestamp>,
    pub next_run: Option<Timestamp>,
}

impl fmt::Debug for ScheduledUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledUpdate")
            .field("id", &self.id)
            .field("collection_id", &self.collection_id)
            .field("schedule", &self.schedule)
            .field("status", &self.status)
            .field("last_run", &self.last_run)
            .field("next_run", &self.next_run)
            .finish_non_exhaustive()
    }
}
