//! Lifecycle hooks around the update pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use designvault_core::{CoreError, CoreResult};

use crate::options::UpdateOptions;

// ---------------------------------------------------------------------------
// HookPhase
// ---------------------------------------------------------------------------

/// Where in the pipeline a hook fires.
///
/// `BeforeVersion` / `AfterVersion` wrap version calculation;
/// `BeforeUpdate` runs before the pre-update backup and `AfterUpdate` after
/// history is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HookPhase {
    BeforeUpdate,
    AfterUpdate,
    BeforeVersion,
    AfterVersion,
}

impl HookPhase {
    pub const ALL: [HookPhase; 4] = [
        Self::BeforeUpdate,
        Self::AfterUpdate,
        Self::BeforeVersion,
        Self::AfterVersion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeUpdate => "beforeUpdate",
            Self::AfterUpdate => "afterUpdate",
            Self::BeforeVersion => "beforeVersion",
            Self::AfterVersion => "afterVersion",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "beforeUpdate" => Ok(Self::BeforeUpdate),
            "afterUpdate" => Ok(Self::AfterUpdate),
            "beforeVersion" => Ok(Self::BeforeVersion),
            "afterVersion" => Ok(Self::AfterVersion),
            _ => Err(CoreError::validation(
                "hook-phase",
                format!(
                    "Invalid hook phase: '{s}'. Must be one of: beforeUpdate, afterUpdate, beforeVersion, afterVersion"
                ),
            )),
        }
    }
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HookContext
// ---------------------------------------------------------------------------

/// What a hook sees of the update in flight.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    pub phase: HookPhase,
    pub collection_id: String,
    pub updates: Value,
    pub options: UpdateOptions,
    pub previous_version: String,
    /// The computed version; `None` before version calculation.
    pub version: Option<String>,
}

// ---------------------------------------------------------------------------
// Trait + registry
// ---------------------------------------------------------------------------

/// A hook. An `Err` aborts the update. Synchronous closures taking a
/// [`HookContext`] implement this trait directly.
#[async_trait]
pub trait UpdateHook: Send + Sync {
    async fn run(&self, context: &HookContext) -> CoreResult<()>;
}

#[async_trait]
impl<F> UpdateHook for F
where
    F: Fn(&HookContext) -> CoreResult<()> + Send + Sync,
{
    async fn run(&self, context: &HookContext) -> CoreResult<()> {
        self(context)
    }
}

#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<HookPhase, Vec<Arc<dyn UpdateHook>>>,
}

impl HookRegistry {
    pub fn register(&mut self, phase: HookPhase, hook: Arc<dyn UpdateHook>) {
        self.hooks.entry(phase).or_default().push(hook);
    }

    /// Hooks of a phase in registration order.
    pub fn for_phase(&self, phase: HookPhase) -> Vec<Arc<dyn UpdateHook>> {
        self.hooks.get(&phase).cloned().unwrap_or_default()
    }

    /// Phases with at least one hook, in pipeline order.
    pub fn enabled_phases(&self) -> Vec<HookPhase> {
        HookPhase::ALL
            .into_iter()
            .filter(|p| self.hooks.get(p).is_some_and(|h| !h.is_empty()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn phase_round_trips_through_str() {
        for phase in HookPhase::ALL {
            assert_eq!(HookPhase::from_str(phase.as_str()).unwrap(), phase);
        }
        assert_matches!(
            HookPhase::from_str("duringUpdate"),
            Err(CoreError::ValidationFailed { rule, .. }) if rule == "hook-phase"
        );
    }

    #[test]
    fn enabled_phases_follow_registration() {
        let mut registry = HookRegistry::default();
        assert!(registry.enabled_phases().is_empty());

        let noop = |_: &HookContext| -> CoreResult<()> { Ok(()) };
        registry.register(HookPhase::AfterUpdate, Arc::new(noop));
        registry.register(HookPhase::AfterUpdate, Arc::new(noop));

        assert_eq!(registry.enabled_phases(), vec![HookPhase::AfterUpdate]);
        assert_eq!(registry.for_phase(HookPhase::AfterUpdate).len(), 2);
        assert!(registry.for_phase(HookPhase::BeforeUpdate).is_empty());
    }
}
