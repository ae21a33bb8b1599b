//! Changesets: named groups of related history entries.

use serde::{Deserialize, Serialize};

use designvault_core::types::Timestamp;
use designvault_core::CoreError;

// ---------------------------------------------------------------------------
// ChangesetStatus
// ---------------------------------------------------------------------------

/// Lifecycle: `open -> closed -> merged`, or `open -> merged` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangesetStatus {
    Open,
    Closed,
    Merged,
}

impl ChangesetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }

    /// Statuses reachable from `self`. Merged is terminal.
    pub fn valid_transitions(&self) -> &'static [ChangesetStatus] {
        match self {
            Self::Open => &[Self::Closed, Self::Merged],
            Self::Closed => &[Self::Merged],
            Self::Merged => &[],
        }
    }

    pub fn can_transition(&self, to: ChangesetStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn validate_transition(&self, to: ChangesetStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Invalid changeset transition: {} -> {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}

impl std::fmt::Display for ChangesetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Changeset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changeset {
    pub id: String,
    pub collection_id: String,
    pub name: String,
    pub status: ChangesetStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Entry ids in the order they were grouped.
    pub entries: Vec<String>,
    pub metadata: ChangesetMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangesetMetadata {
    pub author: String,
    pub branch: String,
    pub total_changes: usize,
}
