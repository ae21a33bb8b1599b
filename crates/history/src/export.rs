//! Serialized export of a collection's ledger.

use serde::{Deserialize, Serialize};

use designvault_core::types::Timestamp;
use designvault_core::{CoreError, CoreResult};

use crate::changeset::Changeset;
use crate::ledger::CollectionHistory;
use crate::snapshot::Snapshot;

/// Prefix of the `format` tag carried by every export.
pub const EXPORT_FORMAT_PREFIX: &str = "history-export-v1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "json" => Ok(Self::Json),
            _ => Err(CoreError::UnsupportedFormat(s.to_string())),
        }
    }

    /// Tag written into the export, e.g. `history-export-v1.0-json`.
    pub fn tag(&self) -> String {
        format!("{EXPORT_FORMAT_PREFIX}-{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExport {
    pub collection_id: String,
    pub exported_at: Timestamp,
    pub format: String,
    pub history: CollectionHistory,
    /// Newest first.
    pub snapshots: Vec<Snapshot>,
    pub changesets: Vec<Changeset>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Live plus archived entries.
    pub total_entries: usize,
    pub total_snapshots: usize,
    pub total_changesets: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl HistoryExport {
    pub(crate) fn build(
        history: CollectionHistory,
        snapshots: Vec<Snapshot>,
        changesets: Vec<Changeset>,
    ) -> Self {
        let first = history.all_entries().next().map(|e| e.timestamp);
        let last = history.all_entries().last().map(|e| e.timestamp);

        Self {
            collection_id: history.collection_id.clone(),
            exported_at: chrono::Utc::now(),
            format: ExportFormat::Json.tag(),
            metadata: ExportMetadata {
                total_entries: history.all_entries().count(),
                total_snapshots: snapshots.len(),
                total_changesets: changesets.len(),
                date_range: DateRange {
                    from: first,
                    to: last,
                },
            },
            history,
            snapshots,
            changesets,
        }
    }

    pub fn render(&self, format: ExportFormat) -> CoreResult<String> {
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
