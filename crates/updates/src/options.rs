use serde::Serialize;

use designvault_core::VersionBump;

/// Caller options for one update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptions {
    /// Explicit version, used verbatim instead of a computed bump.
    pub version: Option<String>,
    /// Bump override; inferred from the payload keys when absent.
    pub version_type: Option<VersionBump>,
    pub author: Option<String>,
    pub automated: bool,
    /// Set on updates issued by a batch.
    pub batch: bool,
    pub create_changeset: bool,
    pub changeset_name: Option<String>,
    /// Restore `backup_id` if the pipeline fails after validation.
    pub auto_rollback: bool,
    pub backup_id: Option<String>,
    /// Set on updates issued for a single section.
    pub section_update: bool,
}

impl UpdateOptions {
    pub fn with_version_type(mut self, kind: VersionBump) -> Self {
        self.version_type = Some(kind);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn in_changeset(mut self, name: impl Into<String>) -> Self {
        self.create_changeset = true;
        self.changeset_name = Some(name.into());
        self
    }

    pub fn with_auto_rollback(mut self, backup_id: impl Into<String>) -> Self {
        self.auto_rollback = true;
        self.backup_id = Some(backup_id.into());
        self
    }
}

/// Caller options for a rollback.
#[derive(Debug, Clone, Default)]
pub struct RollbackOptions {
    pub author: Option<String>,
    /// Recorded on the rollback entry; defaults to "Manual rollback".
    pub reason: Option<String>,
}

impl RollbackOptions {
    pub fn because(reason: impl Into<String>) -> Self {
        Self {
            author: None,
            reason: Some(reason.into()),
        }
    }
}
