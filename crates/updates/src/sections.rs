//! Fixed section tables: version inference, breaking-change detection and
//! the section to change-type mapping.

use serde_json::Value;

use designvault_core::VersionBump;
use designvault_history::change_types;

// ---------------------------------------------------------------------------
// Prefix lists
// ---------------------------------------------------------------------------

/// Update keys starting with one of these infer a major bump.
pub const MAJOR_PREFIXES: &[&str] = &["theme", "colors.modules", "components.buttons"];

/// Update keys starting with one of these infer a minor bump.
pub const MINOR_PREFIXES: &[&str] = &["components", "icons", "animations"];

/// Update keys starting with one of these require an explicit major bump.
pub const BREAKING_PREFIXES: &[&str] = &["colors.modules", "components", "typography.fontFamilies"];

pub fn matches_prefix(key: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| key.starts_with(p))
}

/// Infer the bump for an update payload.
///
/// Keys are scanned in payload order; the first key matching a major prefix
/// or a minor prefix decides. Defaults to patch.
pub fn infer_version_type(updates: &Value) -> VersionBump {
    let Some(map) = updates.as_object() else {
        return VersionBump::Patch;
    };
    for key in map.keys() {
        if matches_prefix(key, MAJOR_PREFIXES) {
            return VersionBump::Major;
        }
        if matches_prefix(key, MINOR_PREFIXES) {
            return VersionBump::Minor;
        }
    }
    VersionBump::Patch
}

// ---------------------------------------------------------------------------
// Per-section tables
// ---------------------------------------------------------------------------

/// Default bump for a single-section update.
pub fn section_version_type(section: &str) -> VersionBump {
    match section {
        "theme" => VersionBump::Major,
        "colors" | "typography" | "components" => VersionBump::Minor,
        _ => VersionBump::Patch,
    }
}

/// Change type recorded for an update to `section`.
pub fn change_type_for_section(section: &str) -> &'static str {
    match section {
        "theme" => change_types::THEME_CHANGED,
        "colors" => change_types::COLORS_UPDATED,
        "typography" => change_types::TYPOGRAPHY_UPDATED,
        "components" => change_types::COMPONENTS_MODIFIED,
        "icons" => change_types::ICONS_ADDED,
        "animations" => change_types::ANIMATIONS_ADDED,
        "layout" => change_types::LAYOUT_UPDATED,
        "accessibility" => change_types::ACCESSIBILITY_IMPROVED,
        "technical" => change_types::TECHNICAL_UPDATED,
        _ => change_types::COLLECTION_MODIFIED,
    }
}
