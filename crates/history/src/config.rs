use designvault_core::config::env_or;
use designvault_core::CoreResult;

/// Default number of snapshots retained per collection.
pub const DEFAULT_MAX_SNAPSHOTS: usize = 50;

/// History ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Snapshots retained per collection; the oldest are evicted first.
    pub max_snapshots_per_collection: usize,
}

impl LedgerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `DESIGNVAULT_MAX_SNAPSHOTS` | `50`    |
    pub fn from_env() -> CoreResult<Self> {
        let max = env_or("DESIGNVAULT_MAX_SNAPSHOTS", DEFAULT_MAX_SNAPSHOTS)?;
        Ok(Self {
            max_snapshots_per_collection: max.max(1),
        })
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_snapshots_per_collection: DEFAULT_MAX_SNAPSHOTS,
        }
    }
}
