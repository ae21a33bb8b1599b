//! The History Ledger: per-collection entry log, snapshot store and
//! changeset registry.
//!
//! Everything is held in memory. Entries are append-only and ordered by
//! insertion; snapshots are capped per collection with the oldest evicted
//! first; at most one changeset per (collection, name) is open at a time.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use designvault_core::semver::{SemVer, INITIAL_VERSION};
use designvault_core::types::{new_id, Timestamp};
use designvault_core::{CoreError, CoreResult};

use crate::change_types::{self, ACTIVE_DEFAULT_SET, COLLECTION_CREATED, COLLECTION_RESTORED};
use crate::changeset::{Changeset, ChangesetMetadata, ChangesetStatus};
use crate::config::LedgerConfig;
use crate::entry::{HistoryEntry, RecordOptions, DEFAULT_BRANCH, DEFAULT_CHANGESET_NAME};
use crate::export::{ExportFormat, HistoryExport};
use crate::filter::HistoryFilter;
use crate::report::{HistoryReport, VersionComparison};
use crate::snapshot::{Snapshot, SnapshotOptions};

// ---------------------------------------------------------------------------
// Ledger records
// ---------------------------------------------------------------------------

/// Running counters kept alongside a collection's entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMetadata {
    /// Changes recorded after the genesis entry.
    pub total_changes: u64,
    pub last_major_update: Timestamp,
    pub last_minor_update: Timestamp,
    pub last_patch_update: Timestamp,
}

/// The complete ledger of one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionHistory {
    pub collection_id: String,
    pub created_at: Timestamp,
    /// Live entries, oldest first.
    pub entries: Vec<HistoryEntry>,
    /// Entries moved out of the live log by archival, oldest first.
    #[serde(default)]
    pub archived_entries: Vec<HistoryEntry>,
    pub branches: Vec<String>,
    pub current_branch: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub metadata: LedgerMetadata,
}

impl CollectionHistory {
    /// Archived entries followed by live entries, in insertion order.
    pub fn all_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.archived_entries.iter().chain(self.entries.iter())
    }

    fn last_entry(&self) -> Option<&HistoryEntry> {
        self.entries.last().or_else(|| self.archived_entries.last())
    }
}

/// A filtered read of a collection's live entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub collection_id: String,
    pub created_at: Timestamp,
    pub entries: Vec<HistoryEntry>,
    pub branches: Vec<String>,
    pub current_branch: String,
    pub tags: Vec<String>,
    pub metadata: LedgerMetadata,
    /// Whether the filter dropped any entry.
    pub filtered: bool,
}

// ---------------------------------------------------------------------------
// HistoryLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct HistoryLedger {
    config: LedgerConfig,
    histories: HashMap<String, CollectionHistory>,
    /// Per-collection snapshots, oldest first.
    snapshots: HashMap<String, VecDeque<Snapshot>>,
    changesets: IndexMap<String, Changeset>,
}

impl HistoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // -- lifecycle ----------------------------------------------------------

    /// Create the ledger of a collection with a genesis entry and a
    /// baseline snapshot.
    ///
    /// The genesis version is the data's `version` field, or `1.0.0`.
    /// Fails with `Conflict` if the collection already has a ledger.
    pub fn initialize(
        &mut self,
        collection_id: &str,
        initial_data: &Value,
    ) -> CoreResult<&CollectionHistory> {
        if self.histories.contains_key(collection_id) {
            return Err(CoreError::Conflict(format!(
                "History already initialized for collection {collection_id}"
            )));
        }

        let version = initial_data
            .get("version")
            .and_then(Value::as_str)
            .filter(|v| SemVer::is_valid(v))
            .unwrap_or(INITIAL_VERSION);

        let genesis = HistoryEntry::build(
            collection_id,
            COLLECTION_CREATED,
            "Initial collection creation",
            None,
            Some(initial_data),
            version,
            &RecordOptions::default(),
        );

        let now = chrono::Utc::now();
        let history = CollectionHistory {
            collection_id: collection_id.to_string(),
            created_at: now,
            entries: vec![genesis],
            archived_entries: Vec::new(),
            branches: vec![DEFAULT_BRANCH.to_string()],
            current_branch: DEFAULT_BRANCH.to_string(),
            tags: Vec::new(),
            metadata: LedgerMetadata {
                total_changes: 0,
                last_major_update: now,
                last_minor_update: now,
                last_patch_update: now,
            },
        };
        self.histories.insert(collection_id.to_string(), history);

        self.create_snapshot(
            collection_id,
            initial_data,
            "Initial baseline snapshot",
            SnapshotOptions::default(),
        );

        tracing::info!(collection_id, version, "History initialized");
        self.history(collection_id)
    }

    pub fn is_initialized(&self, collection_id: &str) -> bool {
        self.histories.contains_key(collection_id)
    }

    // -- recording ----------------------------------------------------------

    /// Append a change entry.
    ///
    /// Also moves the major/minor/patch bucket timestamp, groups the entry
    /// into a changeset when asked to, and takes an automatic snapshot of
    /// `new_value` for major change types.
    #[allow(clippy::too_many_arguments)]
    pub fn record_change(
        &mut self,
        collection_id: &str,
        change_type: &str,
        description: &str,
        old_value: Option<&Value>,
        new_value: Option<&Value>,
        version: &str,
        options: RecordOptions,
    ) -> CoreResult<HistoryEntry> {
        let history = self.history_mut(collection_id)?;

        let entry = HistoryEntry::build(
            collection_id,
            change_type,
            description,
            old_value,
            new_value,
            version,
            &options,
        );

        let now = entry.timestamp;
        let previous = history.last_entry().map(|e| e.version.clone());
        history.entries.push(entry.clone());
        history.metadata.total_changes += 1;
        if let Some(previous) = previous {
            move_version_bucket(&mut history.metadata, &previous, version, now);
        }

        if options.create_changeset {
            let name = options
                .changeset_name
                .as_deref()
                .unwrap_or(DEFAULT_CHANGESET_NAME);
            self.create_changeset(collection_id, &entry, name);
        }

        if change_types::is_major_change(change_type) {
            if let Some(data) = entry.new_value.as_ref() {
                self.create_snapshot(
                    collection_id,
                    data,
                    &format!("Auto-snapshot: {description}"),
                    SnapshotOptions::automatic(),
                );
            }
        }

        tracing::debug!(
            collection_id,
            change_type,
            version,
            entry_id = %entry.id,
            "Change recorded"
        );
        Ok(entry)
    }

    // -- snapshots ----------------------------------------------------------

    /// Store a full copy of `data`.
    ///
    /// When the collection already holds the maximum number of snapshots,
    /// the oldest are evicted first so the count never exceeds the cap.
    pub fn create_snapshot(
        &mut self,
        collection_id: &str,
        data: &Value,
        description: &str,
        options: SnapshotOptions,
    ) -> Snapshot {
        let snapshot = Snapshot::capture(collection_id, data, description, options);
        let max = self.config.max_snapshots_per_collection.max(1);

        let stored = self.snapshots.entry(collection_id.to_string()).or_default();
        if stored.len() >= max {
            let evicted = stored.len() - (max - 1);
            stored.drain(..evicted);
            tracing::debug!(collection_id, evicted, "Evicted oldest snapshots");
        }
        stored.push_back(snapshot.clone());

        snapshot
    }

    pub fn delete_snapshot(&mut self, collection_id: &str, snapshot_id: &str) -> CoreResult<Snapshot> {
        let stored = self
            .snapshots
            .get_mut(collection_id)
            .ok_or_else(|| CoreError::not_found("snapshot", snapshot_id))?;
        let index = stored
            .iter()
            .position(|s| s.id == snapshot_id)
            .ok_or_else(|| CoreError::not_found("snapshot", snapshot_id))?;
        stored
            .remove(index)
            .ok_or_else(|| CoreError::not_found("snapshot", snapshot_id))
    }

    /// Keep only the `keep` most recent snapshots. Returns how many were
    /// removed.
    pub fn prune_snapshots(&mut self, collection_id: &str, keep: usize) -> usize {
        let Some(stored) = self.snapshots.get_mut(collection_id) else {
            return 0;
        };
        let removed = stored.len().saturating_sub(keep);
        stored.drain(..removed);
        if removed > 0 {
            tracing::debug!(collection_id, removed, keep, "Pruned snapshots");
        }
        removed
    }

    pub fn get_snapshot(&self, collection_id: &str, snapshot_id: &str) -> CoreResult<&Snapshot> {
        self.snapshots
            .get(collection_id)
            .and_then(|stored| stored.iter().find(|s| s.id == snapshot_id))
            .ok_or_else(|| CoreError::not_found("snapshot", snapshot_id))
    }

    /// Snapshots of a collection, newest first.
    pub fn get_snapshots(&self, collection_id: &str) -> Vec<&Snapshot> {
        self.snapshots
            .get(collection_id)
            .map(|stored| stored.iter().rev().collect())
            .unwrap_or_default()
    }

    pub fn snapshot_count(&self, collection_id: &str) -> usize {
        self.snapshots.get(collection_id).map_or(0, VecDeque::len)
    }

    /// The newest snapshot taken of the given version.
    pub fn latest_snapshot_with_version(&self, collection_id: &str, version: &str) -> Option<&Snapshot> {
        self.snapshots
            .get(collection_id)?
            .iter()
            .rev()
            .find(|s| s.metadata.version == version)
    }

    /// Return the data of a snapshot, recording the restore as a
    /// `collection.restored` change.
    pub fn restore_from_snapshot(&mut self, collection_id: &str, snapshot_id: &str) -> CoreResult<Value> {
        let snapshot = self.get_snapshot(collection_id, snapshot_id)?.clone();

        let options = RecordOptions::default()
            .with_extra("snapshotId", snapshot.id.as_str())
            .with_extra("restoredAt", chrono::Utc::now().to_rfc3339());
        self.record_change(
            collection_id,
            COLLECTION_RESTORED,
            &format!("Restored from snapshot: {}", snapshot.description),
            None,
            Some(&snapshot.data),
            &snapshot.metadata.version,
            options,
        )?;

        tracing::info!(collection_id, snapshot_id, "Restored from snapshot");
        Ok(snapshot.data)
    }

    // -- status -------------------------------------------------------------

    /// Record that a collection became the active default, with a snapshot
    /// of `data` taken at that point.
    ///
    /// The entry version is the data's `version` field, or the last recorded
    /// version when the data carries none.
    pub fn register_active_default(&mut self, collection_id: &str, data: &Value) -> CoreResult<HistoryEntry> {
        let version = match data.get("version").and_then(Value::as_str) {
            Some(v) if SemVer::is_valid(v) => v.to_string(),
            _ => self
                .history(collection_id)?
                .last_entry()
                .map_or_else(|| INITIAL_VERSION.to_string(), |e| e.version.clone()),
        };

        let mut options = RecordOptions::default();
        if let Some(status) = data.get("status") {
            options = options.with_extra("status", status.clone());
        }
        let entry = self.record_change(
            collection_id,
            ACTIVE_DEFAULT_SET,
            "Collection set as active and default",
            None,
            Some(data),
            &version,
            options,
        )?;

        let snapshot = self.create_snapshot(
            collection_id,
            data,
            &format!("Active/default: {version}"),
            SnapshotOptions {
                extra: [("entryId".to_string(), Value::from(entry.id.as_str()))]
                    .into_iter()
                    .collect(),
                ..SnapshotOptions::automatic()
            },
        );

        tracing::info!(collection_id, %version, snapshot_id = %snapshot.id, "Registered active default");
        Ok(entry)
    }

    // -- changesets ---------------------------------------------------------

    /// Add `entry` to the open changeset named `name`, opening one first if
    /// none exists.
    pub fn create_changeset(&mut self, collection_id: &str, entry: &HistoryEntry, name: &str) -> Changeset {
        let now = chrono::Utc::now();

        let open = self
            .changesets
            .values()
            .find(|cs| {
                cs.collection_id == collection_id
                    && cs.name == name
                    && cs.status == ChangesetStatus::Open
            })
            .map(|cs| cs.id.clone());

        let id = match open {
            Some(id) => id,
            None => {
                let id = new_id("cs");
                self.changesets.insert(
                    id.clone(),
                    Changeset {
                        id: id.clone(),
                        collection_id: collection_id.to_string(),
                        name: name.to_string(),
                        status: ChangesetStatus::Open,
                        created_at: now,
                        updated_at: now,
                        entries: Vec::new(),
                        metadata: ChangesetMetadata {
                            author: entry.author.clone(),
                            branch: entry.branch.clone(),
                            total_changes: 0,
                        },
                    },
                );
                id
            }
        };

        let changeset = &mut self.changesets[&id];
        changeset.entries.push(entry.id.clone());
        changeset.updated_at = now;
        changeset.metadata.total_changes += 1;
        changeset.clone()
    }

    /// `open -> closed`. Frees the name for a new open changeset.
    pub fn close_changeset(&mut self, changeset_id: &str) -> CoreResult<Changeset> {
        self.transition_changeset(changeset_id, ChangesetStatus::Closed)
    }

    /// `open | closed -> merged`.
    pub fn merge_changeset(&mut self, changeset_id: &str) -> CoreResult<Changeset> {
        self.transition_changeset(changeset_id, ChangesetStatus::Merged)
    }

    fn transition_changeset(&mut self, changeset_id: &str, to: ChangesetStatus) -> CoreResult<Changeset> {
        let changeset = self
            .changesets
            .get_mut(changeset_id)
            .ok_or_else(|| CoreError::not_found("changeset", changeset_id))?;
        changeset.status.validate_transition(to)?;
        changeset.status = to;
        changeset.updated_at = chrono::Utc::now();

        tracing::info!(changeset_id, status = to.as_str(), "Changeset transitioned");
        Ok(changeset.clone())
    }

    pub fn get_changeset(&self, changeset_id: &str) -> Option<&Changeset> {
        self.changesets.get(changeset_id)
    }

    /// Changesets of a collection in creation order.
    pub fn get_changesets(&self, collection_id: &str) -> Vec<&Changeset> {
        self.changesets
            .values()
            .filter(|cs| cs.collection_id == collection_id)
            .collect()
    }

    // -- queries ------------------------------------------------------------

    pub fn history(&self, collection_id: &str) -> CoreResult<&CollectionHistory> {
        self.histories
            .get(collection_id)
            .ok_or_else(|| CoreError::not_found("history", collection_id))
    }

    fn history_mut(&mut self, collection_id: &str) -> CoreResult<&mut CollectionHistory> {
        self.histories
            .get_mut(collection_id)
            .ok_or_else(|| CoreError::not_found("history", collection_id))
    }

    /// Live entries matching `filter`.
    pub fn get_history(&self, collection_id: &str, filter: &HistoryFilter) -> CoreResult<HistoryView> {
        let history = self.history(collection_id)?;
        let entries = filter.apply(&history.entries);

        Ok(HistoryView {
            collection_id: history.collection_id.clone(),
            created_at: history.created_at,
            filtered: entries.len() != history.entries.len(),
            entries,
            branches: history.branches.clone(),
            current_branch: history.current_branch.clone(),
            tags: history.tags.clone(),
            metadata: history.metadata.clone(),
        })
    }

    /// Live entries in insertion order.
    pub fn entries(&self, collection_id: &str) -> CoreResult<&[HistoryEntry]> {
        Ok(&self.history(collection_id)?.entries)
    }

    pub fn entry_count(&self, collection_id: &str) -> usize {
        self.histories
            .get(collection_id)
            .map_or(0, |h| h.entries.len())
    }

    /// The first entry (archived entries first) carrying `version`.
    pub fn find_entry_by_version(&self, collection_id: &str, version: &str) -> CoreResult<&HistoryEntry> {
        self.history(collection_id)?
            .all_entries()
            .find(|e| e.version == version)
            .ok_or_else(|| CoreError::not_found("version", version))
    }

    pub fn compare_versions(
        &self,
        collection_id: &str,
        version1: &str,
        version2: &str,
    ) -> CoreResult<VersionComparison> {
        let first = self.find_entry_by_version(collection_id, version1)?;
        let second = self.find_entry_by_version(collection_id, version2)?;
        Ok(VersionComparison::between(first, second))
    }

    pub fn generate_history_report(
        &self,
        collection_id: &str,
        filter: &HistoryFilter,
    ) -> CoreResult<HistoryReport> {
        let view = self.get_history(collection_id, filter)?;
        Ok(HistoryReport::build(
            &view,
            filter,
            self.snapshot_count(collection_id),
            self.get_changesets(collection_id).len(),
        ))
    }

    // -- export -------------------------------------------------------------

    /// Structured export of everything the ledger holds for a collection.
    pub fn export(&self, collection_id: &str) -> CoreResult<HistoryExport> {
        let history = self.history(collection_id)?;
        let snapshots = self.get_snapshots(collection_id).into_iter().cloned().collect();
        let changesets = self
            .get_changesets(collection_id)
            .into_iter()
            .cloned()
            .collect();
        Ok(HistoryExport::build(history.clone(), snapshots, changesets))
    }

    /// Serialize [`Self::export`] in the named format. Only `json` exists.
    pub fn export_history(&self, collection_id: &str, format: &str) -> CoreResult<String> {
        let format = ExportFormat::from_str(format)?;
        self.export(collection_id)?.render(format)
    }

    // -- archival -----------------------------------------------------------

    /// Move all but the `retain` most recent live entries to the archive.
    /// Returns how many entries moved.
    pub fn archive_entries(&mut self, collection_id: &str, retain: usize) -> CoreResult<usize> {
        let history = self.history_mut(collection_id)?;
        let moved = history.entries.len().saturating_sub(retain.max(1));
        if moved == 0 {
            return Ok(0);
        }
        let archived: Vec<HistoryEntry> = history.entries.drain(..moved).collect();
        history.archived_entries.extend(archived);

        tracing::info!(collection_id, moved, retain, "Archived history entries");
        Ok(moved)
    }
}

/// Move the bucket timestamp for the component that increased between the
/// preceding entry's version and `version`.
fn move_version_bucket(metadata: &mut LedgerMetadata, previous: &str, version: &str, now: Timestamp) {
    let (Some(prev), Some(next)) = (SemVer::parse(previous), SemVer::parse(version)) else {
        return;
    };
    if next.major > prev.major {
        metadata.last_major_update = now;
    } else if next.minor > prev.minor {
        metadata.last_minor_update = now;
    } else if next.patch > prev.patch {
        metadata.last_patch_update = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    use crate::change_types::{ImpactLevel, COLORS_UPDATED, THEME_CHANGED};

    fn ledger_with(id: &str) -> HistoryLedger {
        let mut ledger = HistoryLedger::default();
        ledger
            .initialize(id, &json!({"id": id, "version": "1.0.0"}))
            .unwrap();
        ledger
    }

    // -- initialize ---------------------------------------------------------

    #[test]
    fn initialize_creates_genesis_and_baseline() {
        let ledger = ledger_with("ds_1");
        let entries = ledger.entries("ds_1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].change_type, COLLECTION_CREATED);
        assert_eq!(entries[0].version, "1.0.0");
        assert_eq!(ledger.snapshot_count("ds_1"), 1);
        assert_eq!(ledger.history("ds_1").unwrap().metadata.total_changes, 0);
    }

    #[test]
    fn initialize_uses_data_version() {
        let mut ledger = HistoryLedger::default();
        ledger.initialize("ds_1", &json!({"version": "2.1.0"})).unwrap();
        assert_eq!(ledger.entries("ds_1").unwrap()[0].version, "2.1.0");
    }

    #[test]
    fn initialize_twice_conflicts() {
        let mut ledger = ledger_with("ds_1");
        assert_matches!(ledger.initialize("ds_1", &json!({})), Err(CoreError::Conflict(_)));
        assert_eq!(ledger.entry_count("ds_1"), 1);
    }

    // -- record_change ------------------------------------------------------

    #[test]
    fn record_requires_initialized_ledger() {
        let mut ledger = HistoryLedger::default();
        let result = ledger.record_change(
            "ds_x",
            COLORS_UPDATED,
            "",
            None,
            None,
            "1.0.1",
            RecordOptions::default(),
        );
        assert_matches!(result, Err(CoreError::NotFound { entity: "history", .. }));
    }

    #[test]
    fn major_change_takes_automatic_snapshot() {
        let mut ledger = ledger_with("ds_1");
        ledger
            .record_change(
                "ds_1",
                THEME_CHANGED,
                "Dark theme",
                None,
                Some(&json!({"mode": "dark"})),
                "2.0.0",
                RecordOptions::default(),
            )
            .unwrap();
        let snapshots = ledger.get_snapshots("ds_1");
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].metadata.automatic);
        assert_eq!(snapshots[0].description, "Auto-snapshot: Dark theme");
    }

    #[test]
    fn minor_change_takes_no_snapshot() {
        let mut ledger = ledger_with("ds_1");
        ledger
            .record_change("ds_1", COLORS_UPDATED, "", None, Some(&json!({})), "1.1.0", RecordOptions::default())
            .unwrap();
        assert_eq!(ledger.snapshot_count("ds_1"), 1);
        assert_eq!(ledger.history("ds_1").unwrap().metadata.total_changes, 1);
    }

    #[test]
    fn bucket_follows_preceding_entry_only() {
        let mut ledger = ledger_with("ds_1");
        let before = ledger.history("ds_1").unwrap().metadata.clone();
        ledger
            .record_change("ds_1", COLORS_UPDATED, "", None, None, "1.1.0", RecordOptions::default())
            .unwrap();
        let after = ledger.history("ds_1").unwrap().metadata.clone();
        assert!(after.last_minor_update >= before.last_minor_update);
        assert_eq!(after.last_major_update, before.last_major_update);
        assert_eq!(after.last_patch_update, before.last_patch_update);
    }

    #[test]
    fn bucket_ignores_unparsable_versions() {
        let mut metadata = ledger_with("ds_1").history("ds_1").unwrap().metadata.clone();
        let original = metadata.clone();
        move_version_bucket(&mut metadata, "1.0.0", "error", chrono::Utc::now());
        assert_eq!(metadata, original);
    }

    // -- snapshots ----------------------------------------------------------

    #[test]
    fn snapshot_cap_evicts_oldest() {
        let mut ledger = HistoryLedger::new(LedgerConfig {
            max_snapshots_per_collection: 3,
        });
        let ids: Vec<String> = (0..5)
            .map(|i| {
                ledger
                    .create_snapshot("ds_1", &json!({"i": i}), "s", SnapshotOptions::default())
                    .id
            })
            .collect();
        let kept: Vec<&str> = ledger.get_snapshots("ds_1").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(kept, vec![ids[4].as_str(), ids[3].as_str(), ids[2].as_str()]);
    }

    #[test]
    fn delete_and_prune_snapshots() {
        let mut ledger = ledger_with("ds_1");
        let snap = ledger.create_snapshot("ds_1", &json!({}), "extra", SnapshotOptions::default());
        ledger.create_snapshot("ds_1", &json!({}), "extra", SnapshotOptions::default());

        ledger.delete_snapshot("ds_1", &snap.id).unwrap();
        assert_eq!(ledger.snapshot_count("ds_1"), 2);
        assert_matches!(
            ledger.delete_snapshot("ds_1", &snap.id),
            Err(CoreError::NotFound { entity: "snapshot", .. })
        );

        assert_eq!(ledger.prune_snapshots("ds_1", 1), 1);
        assert_eq!(ledger.snapshot_count("ds_1"), 1);
    }

    #[test]
    fn restore_from_foreign_snapshot_is_not_found() {
        let mut ledger = ledger_with("ds_1");
        ledger.initialize("ds_2", &json!({})).unwrap();
        let foreign = ledger.get_snapshots("ds_2")[0].id.clone();
        assert_matches!(
            ledger.restore_from_snapshot("ds_1", &foreign),
            Err(CoreError::NotFound { .. })
        );
        assert_eq!(ledger.entry_count("ds_1"), 1);
    }

    // -- changesets ---------------------------------------------------------

    #[test]
    fn changeset_groups_entries_by_name() {
        let mut ledger = ledger_with("ds_1");
        let options = RecordOptions {
            create_changeset: true,
            changeset_name: Some("rebrand".to_string()),
            ..RecordOptions::default()
        };
        let a = ledger
            .record_change("ds_1", COLORS_UPDATED, "", None, None, "1.1.0", options.clone())
            .unwrap();
        let b = ledger
            .record_change("ds_1", COLORS_UPDATED, "", None, None, "1.2.0", options)
            .unwrap();

        let changesets = ledger.get_changesets("ds_1");
        assert_eq!(changesets.len(), 1);
        assert_eq!(changesets[0].entries, vec![a.id, b.id]);
        assert_eq!(changesets[0].metadata.total_changes, 2);
    }

    #[test]
    fn closing_frees_the_name() {
        let mut ledger = ledger_with("ds_1");
        let entry = ledger.entries("ds_1").unwrap()[0].clone();
        let first = ledger.create_changeset("ds_1", &entry, "release");
        ledger.close_changeset(&first.id).unwrap();

        let second = ledger.create_changeset("ds_1", &entry, "release");
        assert_ne!(first.id, second.id);
        assert_eq!(ledger.get_changesets("ds_1").len(), 2);

        ledger.merge_changeset(&first.id).unwrap();
        assert_matches!(ledger.close_changeset(&first.id), Err(CoreError::Conflict(_)));
    }

    // -- archival -----------------------------------------------------------

    #[test]
    fn archived_entries_still_resolve_versions() {
        let mut ledger = ledger_with("ds_1");
        for v in ["1.0.1", "1.0.2", "1.0.3"] {
            ledger
                .record_change("ds_1", COLORS_UPDATED, "", None, None, v, RecordOptions::default())
                .unwrap();
        }
        assert_eq!(ledger.archive_entries("ds_1", 2).unwrap(), 2);
        assert_eq!(ledger.entry_count("ds_1"), 2);

        let genesis = ledger.find_entry_by_version("ds_1", "1.0.0").unwrap();
        assert_eq!(genesis.change_type, COLLECTION_CREATED);

        let view = ledger.get_history("ds_1", &HistoryFilter::default()).unwrap();
        assert_eq!(view.entries.len(), 2);
        assert!(!view.filtered);
    }

    // -- active default -----------------------------------------------------

    #[test]
    fn register_active_default_records_high_impact_entry_and_snapshot() {
        let mut ledger = ledger_with("ds_1");
        let data = json!({"id": "ds_1", "version": "1.2.0", "status": "active|default"});

        let entry = ledger.register_active_default("ds_1", &data).unwrap();
        assert_eq!(entry.change_type, ACTIVE_DEFAULT_SET);
        assert_eq!(entry.version, "1.2.0");
        assert_eq!(entry.metadata.impact_level, ImpactLevel::High);
        assert_eq!(entry.metadata.extra["status"], "active|default");
        assert_eq!(entry.new_value.as_ref(), Some(&data));

        assert_eq!(ledger.snapshot_count("ds_1"), 2);
        let snapshot = ledger.get_snapshots("ds_1")[0];
        assert_eq!(snapshot.metadata.version, "1.2.0");
        assert_eq!(snapshot.metadata.extra["entryId"], entry.id.as_str());
    }

    #[test]
    fn register_active_default_falls_back_to_last_version() {
        let mut ledger = ledger_with("ds_1");
        let entry = ledger
            .register_active_default("ds_1", &json!({"status": "active|default"}))
            .unwrap();
        assert_eq!(entry.version, "1.0.0");

        let err = ledger.register_active_default("ds_2", &json!({})).unwrap_err();
        assert_matches!(err, CoreError::NotFound { .. });
    }
}
