//! Changelogs over a semantic-version range.

use serde::Serialize;

use designvault_core::semver::SemVer;
use designvault_core::types::Timestamp;
use designvault_core::{CoreError, CoreResult};
use designvault_history::change_types;
use designvault_history::{HistoryEntry, ImpactLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCategory {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl ChangeCategory {
    /// Fixed change-type to category table; unlisted types are `Changed`.
    pub fn for_change_type(change_type: &str) -> Self {
        match change_type {
            change_types::COLLECTION_CREATED
            | change_types::COMPONENTS_ADDED
            | change_types::ICONS_ADDED
            | change_types::ANIMATIONS_ADDED => Self::Added,
            _ => Self::Changed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogItem {
    pub description: String,
    pub version: String,
    pub timestamp: Timestamp,
    pub change_type: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangelogSections {
    pub added: Vec<ChangelogItem>,
    pub changed: Vec<ChangelogItem>,
    pub deprecated: Vec<ChangelogItem>,
    pub removed: Vec<ChangelogItem>,
    pub fixed: Vec<ChangelogItem>,
    pub security: Vec<ChangelogItem>,
}

impl ChangelogSections {
    fn push(&mut self, category: ChangeCategory, item: ChangelogItem) {
        let bucket = match category {
            ChangeCategory::Added => &mut self.added,
            ChangeCategory::Changed => &mut self.changed,
            ChangeCategory::Deprecated => &mut self.deprecated,
            ChangeCategory::Removed => &mut self.removed,
            ChangeCategory::Fixed => &mut self.fixed,
            ChangeCategory::Security => &mut self.security,
        };
        bucket.push(item);
    }

    pub fn total(&self) -> usize {
        self.added.len()
            + self.changed.len()
            + self.deprecated.len()
            + self.removed.len()
            + self.fixed.len()
            + self.security.len()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Changelog {
    pub collection_id: String,
    pub from_version: String,
    pub to_version: String,
    pub generated_at: Timestamp,
    pub sections: ChangelogSections,
    /// High-impact entries in the range.
    pub breaking_changes: Vec<HistoryEntry>,
    pub migration_guide: Vec<String>,
}

impl Changelog {
    /// Collect the entries with `from < version <= to`.
    ///
    /// Entries whose version label is not a semantic version are skipped.
    pub fn build<'a>(
        collection_id: &str,
        from: &str,
        to: &str,
        entries: impl IntoIterator<Item = &'a HistoryEntry>,
    ) -> CoreResult<Self> {
        let lower: SemVer = from.parse()?;
        let upper: SemVer = to.parse()?;
        if lower > upper {
            return Err(CoreError::validation(
                "version-range",
                format!("Range start {lower} is after range end {upper}"),
            ));
        }

        let mut sections = ChangelogSections::default();
        let mut breaking_changes = Vec::new();

        let in_range = entries.into_iter().filter(|e| {
            SemVer::parse(&e.version).is_some_and(|v| v.within(&lower, &upper))
        });
        for entry in in_range {
            sections.push(
                ChangeCategory::for_change_type(&entry.change_type),
                ChangelogItem {
                    description: entry.description.clone(),
                    version: entry.version.clone(),
                    timestamp: entry.timestamp,
                    change_type: entry.change_type.clone(),
                },
            );
            if entry.metadata.impact_level == ImpactLevel::High {
                breaking_changes.push(entry.clone());
            }
        }

        let migration_guide = breaking_changes
            .iter()
            .map(|e| format!("{}: {}", e.version, e.description))
            .collect();

        Ok(Self {
            collection_id: collection_id.to_string(),
            from_version: lower.to_string(),
            to_version: upper.to_string(),
            generated_at: chrono::Utc::now(),
            sections,
            breaking_changes,
            migration_guide,
        })
    }
}
