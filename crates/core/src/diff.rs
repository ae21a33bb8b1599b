//! Diffs between document values.
//!
//! Two granularities are provided:
//!
//! - [`ValueDiff`]: a whole-value diff recorded on every history entry. It
//!   never descends into the values; it only says whether something was
//!   added, removed, left absent, or modified.
//! - [`compare_sections`]: a key-by-key comparison of the top-level sections
//!   of two documents, used by difference analysis.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::is_absent;

// ---------------------------------------------------------------------------
// DiffStatus
// ---------------------------------------------------------------------------

/// The status of a key in a key-by-key comparison.
///
/// - `Added`     -- present only in the newer document.
/// - `Removed`   -- present only in the older document.
/// - `Changed`   -- present in both with different values.
/// - `Unchanged` -- present in both with identical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValueDiff
// ---------------------------------------------------------------------------

/// Whole-value diff between an old and a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "changes", rename_all = "snake_case")]
pub enum ValueDiff {
    Added(Value),
    Removed(Value),
    None,
    Modified { before: Value, after: Value },
}

impl ValueDiff {
    /// Classify the pair. `null` counts as absent.
    pub fn between(old: Option<&Value>, new: Option<&Value>) -> Self {
        match (is_absent(old), is_absent(new)) {
            (true, false) => Self::Added(new.cloned().unwrap_or(Value::Null)),
            (false, true) => Self::Removed(old.cloned().unwrap_or(Value::Null)),
            (true, true) => Self::None,
            (false, false) => Self::Modified {
                before: old.cloned().unwrap_or(Value::Null),
                after: new.cloned().unwrap_or(Value::Null),
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Removed(_) => "removed",
            Self::None => "none",
            Self::Modified { .. } => "modified",
        }
    }
}

// ---------------------------------------------------------------------------
// Section comparison
// ---------------------------------------------------------------------------

/// A single top-level section difference between two documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDiff {
    pub section: String,
    pub status: DiffStatus,
}

/// Compare two documents section by section (top-level keys).
///
/// Non-object inputs are treated as empty documents. The result is sorted by
/// section name.
pub fn compare_sections(a: &Value, b: &Value) -> Vec<SectionDiff> {
    let empty = serde_json::Map::new();
    let a_obj = a.as_object().unwrap_or(&empty);
    let b_obj = b.as_object().unwrap_or(&empty);

    let mut keys: Vec<&String> = a_obj.keys().chain(b_obj.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter_map(|key| {
            let status = match (a_obj.get(key), b_obj.get(key)) {
                (Some(va), Some(vb)) if va == vb => DiffStatus::Unchanged,
                (Some(_), Some(_)) => DiffStatus::Changed,
                (Some(_), None) => DiffStatus::Removed,
                (None, Some(_)) => DiffStatus::Added,
                (None, None) => return None,
            };
            Some(SectionDiff {
                section: key.clone(),
                status,
            })
        })
        .collect()
}
