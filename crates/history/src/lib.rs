//! Per-collection History Ledger.
//!
//! The ledger keeps, for every collection, an append-only log of change
//! entries, a capped set of full snapshots, and named changesets grouping
//! related entries. It treats document data as opaque JSON and does not
//! depend on the Collection Store.
//!
//! - [`HistoryLedger`]: the ledger itself.
//! - [`change_types`]: the dotted change-type taxonomy and its impact table.
//! - [`HistoryFilter`]: filters for [`HistoryLedger::get_history`].
//! - [`report`] / [`export`]: read-only aggregation and serialization.

pub mod change_types;
pub mod changeset;
pub mod config;
pub mod entry;
pub mod export;
pub mod filter;
pub mod ledger;
pub mod report;
pub mod snapshot;

pub use change_types::ImpactLevel;
pub use changeset::{Changeset, ChangesetStatus};
pub use config::LedgerConfig;
pub use entry::{HistoryEntry, RecordOptions};
pub use export::{ExportFormat, HistoryExport};
pub use filter::{HistoryFilter, SortOrder};
pub use ledger::{CollectionHistory, HistoryLedger, HistoryView, LedgerMetadata};
pub use report::{HistoryReport, VersionComparison};
pub use snapshot::{Snapshot, SnapshotOptions};
