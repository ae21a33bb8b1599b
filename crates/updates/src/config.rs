use std::time::Duration;

use designvault_core::config::env_or;
use designvault_core::CoreResult;

/// Update orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Snapshot count above which post-update cleanup prunes.
    pub snapshot_cleanup_threshold: usize,
    /// Snapshots kept by post-update cleanup.
    pub snapshot_cleanup_keep: usize,
    /// Live entry count above which post-update cleanup archives.
    pub archive_threshold: usize,
    /// Live entries kept by archival.
    pub archive_retain: usize,
    pub hook_timeout: Duration,
    pub validator_timeout: Duration,
    /// Largest accepted update payload, in serialized bytes.
    pub max_update_bytes: usize,
}

impl OrchestratorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                                | Default     |
    /// |----------------------------------------|-------------|
    /// | `DESIGNVAULT_SNAPSHOT_CLEANUP_THRESHOLD` | `100`     |
    /// | `DESIGNVAULT_SNAPSHOT_CLEANUP_KEEP`    | `50`        |
    /// | `DESIGNVAULT_ARCHIVE_THRESHOLD`        | `1000`      |
    /// | `DESIGNVAULT_ARCHIVE_RETAIN`           | `500`       |
    /// | `DESIGNVAULT_HOOK_TIMEOUT_SECS`        | `30`        |
    /// | `DESIGNVAULT_VALIDATOR_TIMEOUT_SECS`   | `10`        |
    /// | `DESIGNVAULT_MAX_UPDATE_BYTES`         | `1000000`   |
    pub fn from_env() -> CoreResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            snapshot_cleanup_threshold: env_or(
                "DESIGNVAULT_SNAPSHOT_CLEANUP_THRESHOLD",
                defaults.snapshot_cleanup_threshold,
            )?,
            snapshot_cleanup_keep: env_or(
                "DESIGNVAULT_SNAPSHOT_CLEANUP_KEEP",
                defaults.snapshot_cleanup_keep,
            )?,
            archive_threshold: env_or("DESIGNVAULT_ARCHIVE_THRESHOLD", defaults.archive_threshold)?,
            archive_retain: env_or("DESIGNVAULT_ARCHIVE_RETAIN", defaults.archive_retain)?,
            hook_timeout: Duration::from_secs(env_or("DESIGNVAULT_HOOK_TIMEOUT_SECS", 30)?),
            validator_timeout: Duration::from_secs(env_or(
                "DESIGNVAULT_VALIDATOR_TIMEOUT_SECS",
                10,
            )?),
            max_update_bytes: env_or("DESIGNVAULT_MAX_UPDATE_BYTES", defaults.max_update_bytes)?,
        })
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            snapshot_cleanup_threshold: 100,
            snapshot_cleanup_keep: 50,
            archive_threshold: 1000,
            archive_retain: 500,
            hook_timeout: Duration::from_secs(30),
            validator_timeout: Duration::from_secs(10),
            max_update_bytes: 1_000_000,
        }
    }
}
