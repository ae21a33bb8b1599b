/// Domain error shared by the store, the history ledger and the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation {rule} failed: {reason}")]
    ValidationFailed { rule: String, reason: String },

    #[error("Format {0} not supported")]
    UnsupportedFormat(String),

    #[error("Update of collection {collection_id} failed: {reason}")]
    UpdateFailed {
        collection_id: String,
        reason: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{stage} timed out after {seconds}s")]
    Timeout { stage: String, seconds: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the workspace.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Short variant name, recorded as `errorType` on failure entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::ValidationFailed { .. } => "ValidationFailed",
            Self::UnsupportedFormat(_) => "UnsupportedFormat",
            Self::UpdateFailed { .. } => "UpdateFailed",
            Self::Conflict(_) => "Conflict",
            Self::Timeout { .. } => "Timeout",
            Self::Internal(_) => "Internal",
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization failed: {err}"))
    }
}
