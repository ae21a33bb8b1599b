//! History entries: immutable records of one change to one collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use designvault_core::diff::ValueDiff;
use designvault_core::hashing::content_hash;
use designvault_core::types::{new_id, Timestamp};
use designvault_core::value::serialized_len;

use crate::change_types::ImpactLevel;

/// Branch every entry lands on unless told otherwise.
pub const DEFAULT_BRANCH: &str = "main";

/// Author recorded when the caller does not name one.
pub const DEFAULT_AUTHOR: &str = "system";

/// Name used when a changeset is requested without one.
pub const DEFAULT_CHANGESET_NAME: &str = "unnamed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub collection_id: String,
    pub timestamp: Timestamp,
    /// Dotted change type, e.g. `colors.updated`.
    pub change_type: String,
    pub description: String,
    /// Version label after the change. Usually `x.y.z`; failure entries use
    /// a non-version label so they never match version lookups.
    pub version: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub diff: ValueDiff,
    /// Content hash of `new_value`.
    pub hash: String,
    pub author: String,
    pub branch: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub metadata: EntryMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    /// Absolute difference in serialized size between old and new value.
    pub change_size: usize,
    pub impact_level: ImpactLevel,
    pub automated: bool,
    /// Caller-supplied context (section, snapshot id, error type, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-controlled attributes of a recorded change.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    pub author: Option<String>,
    pub branch: Option<String>,
    pub tags: Vec<String>,
    pub automated: bool,
    /// Group the entry into the open changeset named `changeset_name`.
    pub create_changeset: bool,
    pub changeset_name: Option<String>,
    pub extra: Map<String, Value>,
}

impl RecordOptions {
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

impl HistoryEntry {
    /// Build an entry, computing diff, hash, size and impact.
    pub(crate) fn build(
        collection_id: &str,
        change_type: &str,
        description: &str,
        old_value: Option<&Value>,
        new_value: Option<&Value>,
        version: &str,
        options: &RecordOptions,
    ) -> Self {
        let old_value = old_value.filter(|v| !v.is_null()).cloned();
        let new_value = new_value.filter(|v| !v.is_null()).cloned();

        let old_size = old_value.as_ref().map_or(0, serialized_len);
        let new_size = new_value.as_ref().map_or(0, serialized_len);

        Self {
            id: new_id("entry"),
            collection_id: collection_id.to_string(),
            timestamp: chrono::Utc::now(),
            change_type: change_type.to_string(),
            description: description.to_string(),
            version: version.to_string(),
            diff: ValueDiff::between(old_value.as_ref(), new_value.as_ref()),
            hash: content_hash(new_value.as_ref().unwrap_or(&Value::Null)),
            old_value,
            new_value,
            author: options
                .author
                .clone()
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            branch: options
                .branch
                .clone()
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            tags: options.tags.clone(),
            metadata: EntryMetadata {
                change_size: old_size.abs_diff(new_size),
                impact_level: ImpactLevel::for_change_type(change_type),
                automated: options.automated,
                extra: options.extra.clone(),
            },
        }
    }
}
