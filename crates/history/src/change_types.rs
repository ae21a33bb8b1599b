//! Change-type taxonomy, impact classification and the major-change list.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Change type constants
// ---------------------------------------------------------------------------

pub const COLLECTION_CREATED: &str = "collection.created";
pub const COLLECTION_RESTORED: &str = "collection.restored";
pub const COLLECTION_ROLLED_BACK: &str = "collection.rolled_back";
pub const COLLECTION_MODIFIED: &str = "collection.modified";
pub const ACTIVE_DEFAULT_SET: &str = "collection.active_default_set";
pub const THEME_CHANGED: &str = "theme.changed";
pub const COLORS_UPDATED: &str = "colors.updated";
pub const COLORS_MAJOR_UPDATE: &str = "colors.major_update";
pub const TYPOGRAPHY_UPDATED: &str = "typography.updated";
pub const COMPONENTS_ADDED: &str = "components.added";
pub const COMPONENTS_MODIFIED: &str = "components.modified";
pub const COMPONENTS_BREAKING_CHANGE: &str = "components.breaking_change";
pub const ICONS_ADDED: &str = "icons.added";
pub const ANIMATIONS_ADDED: &str = "animations.added";
pub const LAYOUT_UPDATED: &str = "layout.updated";
pub const ACCESSIBILITY_IMPROVED: &str = "accessibility.improved";
pub const PERFORMANCE_OPTIMIZED: &str = "performance.optimized";
pub const TECHNICAL_UPDATED: &str = "technical.updated";
pub const ARCHITECTURE_CHANGED: &str = "architecture.changed";
pub const UPDATE_FAILED: &str = "update.failed";

/// Change types whose entries carry a complete collection document as
/// `newValue` (as opposed to a single section).
pub const FULL_DOCUMENT_CHANGES: &[&str] =
    &[COLLECTION_CREATED, COLLECTION_RESTORED, COLLECTION_ROLLED_BACK];

/// Change types that trigger an automatic full snapshot when recorded.
pub const MAJOR_CHANGES: &[&str] = &[
    COLLECTION_CREATED,
    COLLECTION_RESTORED,
    THEME_CHANGED,
    COLORS_MAJOR_UPDATE,
    COMPONENTS_BREAKING_CHANGE,
    ARCHITECTURE_CHANGED,
];

pub fn is_major_change(change_type: &str) -> bool {
    MAJOR_CHANGES.contains(&change_type)
}

pub fn is_full_document_change(change_type: &str) -> bool {
    FULL_DOCUMENT_CHANGES.contains(&change_type)
}

// ---------------------------------------------------------------------------
// ImpactLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }

    /// Fixed change-type to impact table; unlisted types are `Unknown`.
    pub fn for_change_type(change_type: &str) -> Self {
        match change_type {
            COLLECTION_CREATED | COLLECTION_RESTORED | ACTIVE_DEFAULT_SET | THEME_CHANGED => {
                Self::High
            }
            COLORS_UPDATED | COMPONENTS_ADDED | TYPOGRAPHY_UPDATED | ACCESSIBILITY_IMPROVED => {
                Self::Medium
            }
            COMPONENTS_MODIFIED | ICONS_ADDED | ANIMATIONS_ADDED | PERFORMANCE_OPTIMIZED
            | TECHNICAL_UPDATED => Self::Low,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
