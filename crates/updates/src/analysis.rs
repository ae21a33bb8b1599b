//! Difference analysis between two recorded versions.

use serde::Serialize;
use serde_json::Value;

use designvault_core::diff::{compare_sections, DiffStatus, SectionDiff};
use designvault_history::{ImpactLevel, VersionComparison};

use crate::sections::{matches_prefix, BREAKING_PREFIXES, MAJOR_PREFIXES, MINOR_PREFIXES};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferenceAnalysis {
    #[serde(flatten)]
    pub comparison: VersionComparison,
    pub analysis: Analysis,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub sections: Vec<SectionDiff>,
    /// Dotted paths under a breaking prefix whose value differs.
    pub breaking_changes: Vec<String>,
    pub impact_assessment: ImpactAssessment,
    pub migration_notes: Vec<String>,
    pub compatibility: Compatibility,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactAssessment {
    pub level: ImpactLevel,
    /// Sections that are not unchanged.
    pub areas: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Compatibility {
    pub compatible: bool,
    pub warnings: Vec<String>,
}

impl DifferenceAnalysis {
    /// Analyze the two full documents behind a version comparison.
    pub fn build(comparison: VersionComparison, before: &Value, after: &Value) -> Self {
        Self {
            comparison,
            analysis: Analysis::between(before, after),
        }
    }
}

impl Analysis {
    pub fn between(before: &Value, after: &Value) -> Self {
        let sections = compare_sections(before, after);

        let areas: Vec<String> = sections
            .iter()
            .filter(|s| s.status != DiffStatus::Unchanged)
            .map(|s| s.section.clone())
            .collect();

        let breaking_changes: Vec<String> = breaking_paths()
            .into_iter()
            .filter(|path| lookup(before, path) != lookup(after, path))
            .map(str::to_string)
            .collect();

        let level = if !breaking_changes.is_empty() {
            ImpactLevel::High
        } else if areas.iter().any(|a| matches_prefix(a, MINOR_PREFIXES)) {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        };

        let removed: Vec<&str> = sections
            .iter()
            .filter(|s| s.status == DiffStatus::Removed)
            .map(|s| s.section.as_str())
            .collect();

        let mut migration_notes: Vec<String> = breaking_changes
            .iter()
            .map(|path| format!("{path} changed; review every consumer of {path} before upgrading"))
            .collect();
        migration_notes.extend(
            removed
                .iter()
                .map(|s| format!("Section {s} was removed; drop references to it")),
        );

        Self {
            compatibility: Compatibility {
                compatible: breaking_changes.is_empty(),
                warnings: removed.iter().map(|s| format!("Section {s} removed")).collect(),
            },
            sections,
            breaking_changes,
            impact_assessment: ImpactAssessment { level, areas },
            migration_notes,
        }
    }
}

/// Major-bump and breaking-change prefixes, deduplicated, in table order.
fn breaking_paths() -> Vec<&'static str> {
    let mut paths: Vec<&'static str> = Vec::new();
    for &path in MAJOR_PREFIXES.iter().chain(BREAKING_PREFIXES) {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// Resolve a dotted path (`colors.modules`) inside a document.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |node, key| node.get(key))
        .filter(|v| !v.is_null())
}
