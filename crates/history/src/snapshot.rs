//! Full point-in-time copies of a collection document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use designvault_core::hashing::content_hash;
use designvault_core::types::{new_id, Timestamp};
use designvault_core::value::serialized_len;

use crate::entry::DEFAULT_BRANCH;

/// Version label for snapshots of data without a `version` field.
pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub collection_id: String,
    pub timestamp: Timestamp,
    pub description: String,
    pub data: Value,
    pub hash: String,
    /// Serialized size of `data` in bytes.
    pub size: usize,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub version: String,
    pub branch: String,
    pub automatic: bool,
    #[serde(default)]
    pub pre_update: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub branch: Option<String>,
    pub automatic: bool,
    pub pre_update: bool,
    pub extra: Map<String, Value>,
}

impl SnapshotOptions {
    /// Options for snapshots the system takes on its own.
    pub fn automatic() -> Self {
        Self {
            automatic: true,
            ..Self::default()
        }
    }

    /// Options for the backup taken before an update or rollback.
    pub fn pre_update() -> Self {
        Self {
            automatic: true,
            pre_update: true,
            ..Self::default()
        }
    }
}

impl Snapshot {
    pub(crate) fn capture(
        collection_id: &str,
        data: &Value,
        description: &str,
        options: SnapshotOptions,
    ) -> Self {
        let version = data
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_VERSION)
            .to_string();

        Self {
            id: new_id("snap"),
            collection_id: collection_id.to_string(),
            timestamp: chrono::Utc::now(),
            description: description.to_string(),
            data: data.clone(),
            hash: content_hash(data),
            size: serialized_len(data),
            metadata: SnapshotMetadata {
                version,
                branch: options.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                automatic: options.automatic,
                pre_update: options.pre_update,
                extra: options.extra,
            },
        }
    }
}
