//! Environment-variable helpers shared by the ledger and orchestrator configs.

use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Read `key` from the environment, falling back to `default` when unset.
///
/// A set but unparsable value is a `config` validation error rather than a
/// silent fallback.
pub fn env_or<T: FromStr>(key: &str, default: T) -> CoreResult<T> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            CoreError::validation("config", format!("{key} has an invalid value: '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}
