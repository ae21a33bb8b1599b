//! The Update Orchestrator.
//!
//! Composes the Collection Store and the History Ledger into a sequential
//! update pipeline: pre-validation, version calculation, hooks, pre-update
//! backup, apply, post-validation, history recording and cleanup. Also
//! provides rollback, changelogs, difference analysis and schedule
//! registration.
//!
//! - [`UpdateOrchestrator`]: the pipeline itself.
//! - [`validators`] / [`hooks`]: per-instance registries of pluggable
//!   validation rules and lifecycle hooks.
//! - [`sections`]: the fixed section tables driving version inference.

pub mod analysis;
pub mod changelog;
pub mod config;
pub mod hooks;
pub mod options;
pub mod orchestrator;
pub mod schedule;
pub mod sections;
pub mod validators;

pub use analysis::DifferenceAnalysis;
pub use changelog::Changelog;
pub use config::OrchestratorConfig;
pub use hooks::{HookContext, HookPhase, UpdateHook};
pub use options::{RollbackOptions, UpdateOptions};
pub use orchestrator::{
    BatchItem, BatchOutcome, InitializeOutcome, RollbackOutcome, UpdateOrchestrator, UpdateOutcome,
};
pub use schedule::{ScheduleSpec, ScheduleStatus, ScheduledUpdate};
pub use validators::UpdateValidator;
