//! Read-only aggregations over a ledger: history reports and version
//! comparisons.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use designvault_core::diff::ValueDiff;
use designvault_core::types::Timestamp;

use crate::change_types::ImpactLevel;
use crate::entry::HistoryEntry;
use crate::filter::HistoryFilter;
use crate::ledger::{HistoryView, LedgerMetadata};

// ---------------------------------------------------------------------------
// HistoryReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryReport {
    pub collection_id: String,
    pub report_generated_at: Timestamp,
    pub period: ReportPeriod,
    pub summary: ReportSummary,
    pub timeline: Vec<TimelineItem>,
    pub snapshots: usize,
    pub changesets: usize,
    pub metadata: LedgerMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportPeriod {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_changes: usize,
    pub change_types: IndexMap<String, usize>,
    pub authors: IndexMap<String, usize>,
    pub impact_levels: IndexMap<ImpactLevel, usize>,
    /// Distinct versions in order of first appearance.
    pub versions_in_period: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub timestamp: Timestamp,
    pub version: String,
    pub change_type: String,
    pub description: String,
    pub impact_level: ImpactLevel,
    pub author: String,
}

impl HistoryReport {
    /// Aggregate a filtered history view.
    ///
    /// Without explicit bounds the period spans the earliest and latest
    /// entries in the view.
    pub(crate) fn build(
        view: &HistoryView,
        filter: &HistoryFilter,
        snapshots: usize,
        changesets: usize,
    ) -> Self {
        let entries = &view.entries;
        let earliest = entries.iter().map(|e| e.timestamp).min();
        let latest = entries.iter().map(|e| e.timestamp).max();

        Self {
            collection_id: view.collection_id.clone(),
            report_generated_at: chrono::Utc::now(),
            period: ReportPeriod {
                from: filter.since.or(earliest),
                to: filter.until.or(latest),
            },
            summary: ReportSummary {
                total_changes: entries.len(),
                change_types: count_by(entries, |e| e.change_type.clone()),
                authors: count_by(entries, |e| e.author.clone()),
                impact_levels: count_by(entries, |e| e.metadata.impact_level),
                versions_in_period: distinct_versions(entries),
            },
            timeline: entries.iter().map(TimelineItem::from).collect(),
            snapshots,
            changesets,
            metadata: view.metadata.clone(),
        }
    }
}

impl From<&HistoryEntry> for TimelineItem {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            version: entry.version.clone(),
            change_type: entry.change_type.clone(),
            description: entry.description.clone(),
            impact_level: entry.metadata.impact_level,
            author: entry.author.clone(),
        }
    }
}

fn count_by<K, F>(entries: &[HistoryEntry], key: F) -> IndexMap<K, usize>
where
    K: std::hash::Hash + Eq,
    F: Fn(&HistoryEntry) -> K,
{
    let mut counts = IndexMap::new();
    for entry in entries {
        *counts.entry(key(entry)).or_insert(0) += 1;
    }
    counts
}

fn distinct_versions(entries: &[HistoryEntry]) -> Vec<String> {
    let mut versions: Vec<String> = Vec::new();
    for entry in entries {
        if !versions.contains(&entry.version) {
            versions.push(entry.version.clone());
        }
    }
    versions
}

// ---------------------------------------------------------------------------
// VersionComparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionComparison {
    pub version1: VersionPoint,
    pub version2: VersionPoint,
    pub diff: ValueDiff,
    pub changes_summary: ChangeSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionPoint {
    pub version: String,
    pub timestamp: Timestamp,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    /// Absolute time between the two entries, in milliseconds.
    pub timespan_ms: i64,
    pub version_jump: bool,
    pub change_types: [String; 2],
    pub impact: [ImpactLevel; 2],
}

impl VersionComparison {
    pub(crate) fn between(first: &HistoryEntry, second: &HistoryEntry) -> Self {
        Self {
            version1: VersionPoint::from(first),
            version2: VersionPoint::from(second),
            diff: ValueDiff::between(first.new_value.as_ref(), second.new_value.as_ref()),
            changes_summary: ChangeSummary {
                timespan_ms: (second.timestamp - first.timestamp).num_milliseconds().abs(),
                version_jump: first.version != second.version,
                change_types: [first.change_type.clone(), second.change_type.clone()],
                impact: [first.metadata.impact_level, second.metadata.impact_level],
            },
        }
    }
}

impl From<&HistoryEntry> for VersionPoint {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            version: entry.version.clone(),
            timestamp: entry.timestamp,
            data: entry.new_value.clone(),
        }
    }
}
