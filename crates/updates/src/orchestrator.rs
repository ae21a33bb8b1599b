//! The update pipeline, rollback, changelog and schedule registration.
//!
//! Every operation that mutates a collection takes that collection's lock
//! for its whole duration, so two updates to the same collection never
//! interleave. Store and ledger locks are only held for the individual step
//! that needs them and never at the same time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::sync::{Mutex, RwLock};

use designvault_core::semver::SemVer;
use designvault_core::types::new_id;
use designvault_core::value::summarize_keys;
use designvault_core::{
    Collection, CollectionStore, CoreError, CoreResult, Status, StatusSet, VersionBump,
};
use designvault_events::{event_types, EventBus, StoreEvent};
use designvault_history::change_types::{self, COLLECTION_ROLLED_BACK, UPDATE_FAILED};
use designvault_history::{HistoryEntry, HistoryLedger, RecordOptions, SnapshotOptions};

use crate::analysis::DifferenceAnalysis;
use crate::changelog::Changelog;
use crate::config::OrchestratorConfig;
use crate::hooks::{HookContext, HookPhase, HookRegistry, UpdateHook};
use crate::options::{RollbackOptions, UpdateOptions};
use crate::schedule::{ScheduleSpec, ScheduleStatus, ScheduledUpdate};
use crate::sections::{change_type_for_section, infer_version_type, section_version_type};
use crate::validators::{UpdateValidator, ValidatorRegistry};

/// Version label recorded on `update.failed` entries.
pub const FAILED_VERSION_LABEL: &str = "error";

/// Rule name of the structural check run after the merge.
pub const POST_UPDATE_RULE: &str = "post-update";

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOutcome {
    pub collection_id: String,
    /// `false` when the ledger already existed.
    pub initialized: bool,
    pub history_enabled: bool,
    pub validators_registered: Vec<String>,
    pub hooks_enabled: Vec<HookPhase>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub collection_id: String,
    pub version: SemVer,
    pub previous_version: SemVer,
    pub changes_applied: usize,
    pub sections: Vec<String>,
    /// One history entry id per updated section.
    pub entry_ids: Vec<String>,
    /// Pre-update snapshot id; pass it as `backup_id` to undo this update.
    pub backup_id: String,
    pub execution_time_ms: u64,
    pub collection: Collection,
}

#[derive(Debug)]
pub struct BatchItem {
    pub section: String,
    pub result: CoreResult<UpdateOutcome>,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub collection_id: String,
    pub items: Vec<BatchItem>,
    pub success_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackOutcome {
    pub collection_id: String,
    pub rolled_back_from: SemVer,
    pub rolled_back_to: SemVer,
    /// Pre-rollback snapshot, for version rollbacks.
    pub backup_id: Option<String>,
    /// Source snapshot, for snapshot rollbacks.
    pub snapshot_id: Option<String>,
    pub collection: Collection,
}

// ---------------------------------------------------------------------------
// UpdateOrchestrator
// ---------------------------------------------------------------------------

pub struct UpdateOrchestrator {
    config: OrchestratorConfig,
    store: Arc<RwLock<CollectionStore>>,
    ledger: Arc<RwLock<HistoryLedger>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    validators: RwLock<ValidatorRegistry>,
    hooks: RwLock<HookRegistry>,
    schedules: RwLock<IndexMap<String, ScheduledUpdate>>,
    events: Option<Arc<EventBus>>,
}

impl UpdateOrchestrator {
    /// Create an orchestrator over a store and a ledger, with the built-in
    /// validators registered.
    pub fn new(
        store: Arc<RwLock<CollectionStore>>,
        ledger: Arc<RwLock<HistoryLedger>>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            validators: RwLock::new(ValidatorRegistry::with_builtins(config.max_update_bytes)),
            config,
            store,
            ledger,
            locks: Mutex::new(HashMap::new()),
            hooks: RwLock::new(HookRegistry::default()),
            schedules: RwLock::new(IndexMap::new()),
            events: None,
        }
    }

    /// Publish change notifications on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RwLock<CollectionStore>> {
        &self.store
    }

    pub fn ledger(&self) -> &Arc<RwLock<HistoryLedger>> {
        &self.ledger
    }

    // -- registration -------------------------------------------------------

    /// Add a validation rule; a rule with the same name is replaced.
    pub async fn register_validator(
        &self,
        name: impl Into<String>,
        validator: impl UpdateValidator + 'static,
    ) {
        self.validators
            .write()
            .await
            .register(name, Arc::new(validator));
    }

    pub async fn register_hook(&self, phase: HookPhase, hook: impl UpdateHook + 'static) {
        self.hooks.write().await.register(phase, Arc::new(hook));
    }

    // -- initialization -----------------------------------------------------

    /// Make sure the collection has a ledger. Idempotent.
    pub async fn initialize_for_collection(&self, collection_id: &str) -> CoreResult<InitializeOutcome> {
        let lock = self.collection_lock(collection_id).await?;
        let _guard = lock.lock().await;

        let document = self.collection(collection_id).await?.to_document()?;
        let initialized = {
            let mut ledger = self.ledger.write().await;
            if ledger.is_initialized(collection_id) {
                false
            } else {
                ledger.initialize(collection_id, &document)?;
                true
            }
        };

        Ok(InitializeOutcome {
            collection_id: collection_id.to_string(),
            initialized,
            history_enabled: true,
            validators_registered: self.validators.read().await.names(),
            hooks_enabled: self.hooks.read().await.enabled_phases(),
        })
    }

    // -- updates ------------------------------------------------------------

    /// Run the full update pipeline for a partial attribute tree.
    ///
    /// Missing collection or ledger and failed pre-validation are returned
    /// as-is with nothing recorded. Any later failure is recorded as an
    /// `update.failed` entry and returned as [`CoreError::UpdateFailed`].
    pub async fn update_collection(
        &self,
        collection_id: &str,
        updates: Value,
        options: UpdateOptions,
    ) -> CoreResult<UpdateOutcome> {
        let lock = self.collection_lock(collection_id).await?;
        let _guard = lock.lock().await;
        self.update_locked(collection_id, &updates, &options).await
    }

    /// Update one existing section, bumping by the section's default kind
    /// unless `options` says otherwise.
    pub async fn update_section(
        &self,
        collection_id: &str,
        section: &str,
        section_updates: Value,
        options: UpdateOptions,
    ) -> CoreResult<UpdateOutcome> {
        let lock = self.collection_lock(collection_id).await?;
        let _guard = lock.lock().await;
        self.update_section_locked(collection_id, section, section_updates, options)
            .await
    }

    /// Update several sections one after another. A failing section does
    /// not stop the others.
    pub async fn batch_update(
        &self,
        collection_id: &str,
        batch: Value,
        options: UpdateOptions,
    ) -> CoreResult<BatchOutcome> {
        let Value::Object(sections) = batch else {
            return Err(CoreError::validation("input", "Batch updates must be a JSON object"));
        };

        let lock = self.collection_lock(collection_id).await?;
        let _guard = lock.lock().await;

        let options = UpdateOptions {
            batch: true,
            ..options
        };
        let mut items = Vec::with_capacity(sections.len());
        for (section, section_updates) in sections {
            let result = self
                .update_section_locked(collection_id, &section, section_updates, options.clone())
                .await;
            if let Err(e) = &result {
                tracing::warn!(collection_id, section = %section, error = %e, "Batch item failed");
            }
            items.push(BatchItem { section, result });
        }

        let success_count = items.iter().filter(|i| i.result.is_ok()).count();
        Ok(BatchOutcome {
            collection_id: collection_id.to_string(),
            error_count: items.len() - success_count,
            success_count,
            items,
        })
    }

    async fn update_section_locked(
        &self,
        collection_id: &str,
        section: &str,
        section_updates: Value,
        mut options: UpdateOptions,
    ) -> CoreResult<UpdateOutcome> {
        let collection = self.collection(collection_id).await?;
        if collection.section(section).is_none() {
            return Err(CoreError::not_found("section", section));
        }

        options.version_type = options.version_type.or(Some(section_version_type(section)));
        options.section_update = true;

        let mut updates = Map::new();
        updates.insert(section.to_string(), section_updates);
        self.update_locked(collection_id, &Value::Object(updates), &options)
            .await
    }

    async fn update_locked(
        &self,
        collection_id: &str,
        updates: &Value,
        options: &UpdateOptions,
    ) -> CoreResult<UpdateOutcome> {
        let started = Instant::now();

        let collection = self.collection(collection_id).await?;
        if !self.ledger.read().await.is_initialized(collection_id) {
            return Err(CoreError::not_found("history", collection_id));
        }
        if !updates.is_object() {
            return Err(CoreError::validation("input", "Updates must be a JSON object"));
        }
        self.pre_validate(&collection, updates, options).await?;

        match self.run_pipeline(&collection, updates, options, started).await {
            Ok(outcome) => {
                tracing::info!(
                    collection_id,
                    version = %outcome.version,
                    previous_version = %outcome.previous_version,
                    sections = outcome.sections.len(),
                    "Collection updated"
                );
                self.publish(
                    StoreEvent::new(event_types::COLLECTION_UPDATED, collection_id)
                        .with_version(outcome.version.to_string())
                        .with_payload(json!({
                            "previousVersion": outcome.previous_version,
                            "sections": outcome.sections,
                            "backupId": outcome.backup_id,
                        })),
                );
                Ok(outcome)
            }
            Err(err) => Err(self.handle_update_error(collection_id, updates, options, err).await),
        }
    }

    /// Pipeline stages from version calculation through cleanup.
    async fn run_pipeline(
        &self,
        collection: &Collection,
        updates: &Value,
        options: &UpdateOptions,
        started: Instant,
    ) -> CoreResult<UpdateOutcome> {
        let collection_id = collection.id.as_str();
        let mut context = HookContext {
            phase: HookPhase::BeforeVersion,
            collection_id: collection_id.to_string(),
            updates: updates.clone(),
            options: options.clone(),
            previous_version: collection.version.to_string(),
            version: None,
        };

        self.run_hooks(HookPhase::BeforeVersion, &mut context).await?;
        let (version, bump) = next_version(collection, updates, options)?;
        context.version = Some(version.to_string());
        self.run_hooks(HookPhase::AfterVersion, &mut context).await?;

        self.run_hooks(HookPhase::BeforeUpdate, &mut context).await?;

        let before = collection.to_document()?;
        let backup = self.ledger.write().await.create_snapshot(
            collection_id,
            &before,
            &format!("Pre-update backup for version {version}"),
            SnapshotOptions::pre_update(),
        );

        let updated = {
            let mut store = self.store.write().await;
            store.update(collection_id, updates)?;
            store.set_version(collection_id, version)?
        };

        let after = updated.to_document()?;
        verify_structure(&after)?;

        let entry_ids = self
            .record_sections(collection_id, updates, &before, &after, version, bump, options)
            .await?;

        self.run_hooks(HookPhase::AfterUpdate, &mut context).await?;

        self.cleanup(collection_id).await?;

        let sections: Vec<String> = updates
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        Ok(UpdateOutcome {
            collection_id: collection_id.to_string(),
            version,
            previous_version: collection.version,
            changes_applied: sections.len(),
            sections,
            entry_ids,
            backup_id: backup.id,
            execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            collection: updated,
        })
    }

    async fn pre_validate(
        &self,
        collection: &Collection,
        updates: &Value,
        options: &UpdateOptions,
    ) -> CoreResult<()> {
        let validators = self.validators.read().await.entries();
        let limit = self.config.validator_timeout;

        for (name, validator) in validators {
            let check = validator.validate(collection, updates, options);
            match tokio::time::timeout(limit, check).await {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => return Err(CoreError::validation(name, reason)),
                Err(_) => {
                    return Err(CoreError::validation(
                        name,
                        format!("timed out after {}s", limit.as_secs()),
                    ))
                }
            }
        }
        Ok(())
    }

    async fn run_hooks(&self, phase: HookPhase, context: &mut HookContext) -> CoreResult<()> {
        context.phase = phase;
        let hooks = self.hooks.read().await.for_phase(phase);
        let limit = self.config.hook_timeout;

        for hook in hooks {
            match tokio::time::timeout(limit, hook.run(context)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(CoreError::Timeout {
                        stage: format!("{phase} hook"),
                        seconds: limit.as_secs(),
                    })
                }
            }
        }
        Ok(())
    }

    /// One entry per top-level key of the payload.
    #[allow(clippy::too_many_arguments)]
    async fn record_sections(
        &self,
        collection_id: &str,
        updates: &Value,
        before: &Value,
        after: &Value,
        version: SemVer,
        bump: Option<VersionBump>,
        options: &UpdateOptions,
    ) -> CoreResult<Vec<String>> {
        let Some(sections) = updates.as_object() else {
            return Ok(Vec::new());
        };
        let version = version.to_string();
        let update_type = bump.map_or("explicit", |b| b.as_str());

        let mut ledger = self.ledger.write().await;
        let mut entry_ids = Vec::with_capacity(sections.len());
        for (section, section_updates) in sections {
            let record = RecordOptions {
                author: options.author.clone(),
                automated: options.automated,
                create_changeset: options.create_changeset,
                changeset_name: options.changeset_name.clone(),
                ..RecordOptions::default()
            }
            .with_extra("section", section.as_str())
            .with_extra("updateType", update_type)
            .with_extra("batch", options.batch);

            let entry = ledger.record_change(
                collection_id,
                change_type_for_section(section),
                &format!("Updated {section}: {}", summarize_keys(section_updates)),
                before.get(section),
                after.get(section),
                &version,
                record,
            )?;
            entry_ids.push(entry.id);
        }
        Ok(entry_ids)
    }

    /// Trim snapshots and archive entries past the configured thresholds.
    async fn cleanup(&self, collection_id: &str) -> CoreResult<()> {
        let mut ledger = self.ledger.write().await;

        if ledger.snapshot_count(collection_id) > self.config.snapshot_cleanup_threshold {
            let removed = ledger.prune_snapshots(collection_id, self.config.snapshot_cleanup_keep);
            tracing::debug!(collection_id, removed, "Post-update snapshot cleanup");
        }
        if ledger.entry_count(collection_id) > self.config.archive_threshold {
            ledger.archive_entries(collection_id, self.config.archive_retain)?;
        }
        Ok(())
    }

    /// Record the failure, attempt the requested auto-rollback (skipped for
    /// post-update check failures) and wrap the error.
    async fn handle_update_error(
        &self,
        collection_id: &str,
        updates: &Value,
        options: &UpdateOptions,
        err: CoreError,
    ) -> CoreError {
        tracing::warn!(collection_id, error = %err, "Update failed");

        let record = RecordOptions {
            author: options.author.clone(),
            automated: options.automated,
            ..RecordOptions::default()
        }
        .with_extra("errorType", err.kind());
        let failure = json!({ "error": err.to_string(), "updates": updates });
        let recorded = self.ledger.write().await.record_change(
            collection_id,
            UPDATE_FAILED,
            &format!("Update failed: {err}"),
            None,
            Some(&failure),
            FAILED_VERSION_LABEL,
            record,
        );
        if let Err(record_err) = recorded {
            tracing::warn!(collection_id, error = %record_err, "Could not record update failure");
        }

        let post_validation = matches!(
            &err,
            CoreError::ValidationFailed { rule, .. } if rule == POST_UPDATE_RULE
        );
        if options.auto_rollback && !post_validation {
            if let Some(backup_id) = options.backup_id.as_deref() {
                if let Err(rollback_err) = self.rollback_to_snapshot_locked(collection_id, backup_id).await {
                    tracing::error!(
                        collection_id,
                        backup_id,
                        error = %rollback_err,
                        "Auto-rollback failed"
                    );
                }
            }
        }

        self.publish(
            StoreEvent::new(event_types::UPDATE_FAILED, collection_id)
                .with_payload(json!({ "error": err.to_string(), "errorType": err.kind() })),
        );

        CoreError::UpdateFailed {
            collection_id: collection_id.to_string(),
            reason: err.to_string(),
            source: Box::new(err),
        }
    }

    // -- status -------------------------------------------------------------

    /// Tag the collection `active` and `default` and record the transition
    /// in its ledger with a snapshot of the resulting document.
    pub async fn set_active_default(&self, collection_id: &str) -> CoreResult<HistoryEntry> {
        let lock = self.collection_lock(collection_id).await?;
        let _guard = lock.lock().await;

        if !self.ledger.read().await.is_initialized(collection_id) {
            return Err(CoreError::not_found("history", collection_id));
        }
        let updated = self
            .store
            .write()
            .await
            .set_status(collection_id, StatusSet::of(&[Status::Active, Status::Default]))?;
        let document = updated.to_document()?;
        let entry = self
            .ledger
            .write()
            .await
            .register_active_default(collection_id, &document)?;

        self.publish(
            StoreEvent::new(event_types::ACTIVE_DEFAULT_SET, collection_id)
                .with_version(updated.version.to_string())
                .with_payload(json!({ "entryId": entry.id })),
        );
        Ok(entry)
    }

    // -- rollback -----------------------------------------------------------

    /// Replace the collection with the document recorded for `target`.
    ///
    /// The first entry carrying `target` must exist. Its full document is
    /// used when it has one; otherwise the newest snapshot of that version.
    pub async fn rollback_to_version(
        &self,
        collection_id: &str,
        target: &str,
        options: RollbackOptions,
    ) -> CoreResult<RollbackOutcome> {
        let lock = self.collection_lock(collection_id).await?;
        let _guard = lock.lock().await;

        let current = self.collection(collection_id).await?;
        let target_document = {
            let ledger = self.ledger.read().await;
            resolve_version_document(&ledger, collection_id, target)?
        };

        let before = current.to_document()?;
        let backup = self.ledger.write().await.create_snapshot(
            collection_id,
            &before,
            &format!("Pre-rollback backup from {}", current.version),
            SnapshotOptions::pre_update(),
        );

        let restored = self
            .store
            .write()
            .await
            .replace(collection_id, target_document)?;
        let after = restored.to_document()?;

        let reason = options.reason.as_deref().unwrap_or("Manual rollback");
        let record = RecordOptions {
            author: options.author.clone(),
            ..RecordOptions::default()
        }
        .with_extra("rollbackType", "version")
        .with_extra("targetVersion", target)
        .with_extra("backupId", backup.id.as_str())
        .with_extra("reason", reason);
        self.ledger.write().await.record_change(
            collection_id,
            COLLECTION_ROLLED_BACK,
            &format!("Rolled back from {} to {target}", current.version),
            Some(&before),
            Some(&after),
            target,
            record,
        )?;

        tracing::info!(
            collection_id,
            from = %current.version,
            to = target,
            backup_id = %backup.id,
            "Collection rolled back"
        );
        self.publish(
            StoreEvent::new(event_types::COLLECTION_ROLLED_BACK, collection_id)
                .with_version(target)
                .with_payload(json!({
                    "rolledBackFrom": current.version,
                    "backupId": backup.id,
                    "reason": reason,
                })),
        );

        Ok(RollbackOutcome {
            collection_id: collection_id.to_string(),
            rolled_back_from: current.version,
            rolled_back_to: restored.version,
            backup_id: Some(backup.id),
            snapshot_id: None,
            collection: restored,
        })
    }

    /// Replace the collection with a snapshot's data, recording the restore.
    pub async fn rollback_to_snapshot(
        &self,
        collection_id: &str,
        snapshot_id: &str,
        options: RollbackOptions,
    ) -> CoreResult<RollbackOutcome> {
        let lock = self.collection_lock(collection_id).await?;
        let _guard = lock.lock().await;

        if let Some(reason) = options.reason.as_deref() {
            tracing::debug!(collection_id, snapshot_id, reason, "Snapshot rollback requested");
        }
        self.rollback_to_snapshot_locked(collection_id, snapshot_id)
            .await
    }

    async fn rollback_to_snapshot_locked(
        &self,
        collection_id: &str,
        snapshot_id: &str,
    ) -> CoreResult<RollbackOutcome> {
        let current = self.collection(collection_id).await?;
        let mut ledger = self.ledger.write().await;
        Collection::from_document(ledger.get_snapshot(collection_id, snapshot_id)?.data.clone())?;
        // The restore entry lands before live state changes.
        let data = ledger.restore_from_snapshot(collection_id, snapshot_id)?;
        drop(ledger);
        let restored = self.store.write().await.replace(collection_id, data)?;

        tracing::info!(collection_id, snapshot_id, version = %restored.version, "Collection restored");
        self.publish(
            StoreEvent::new(event_types::COLLECTION_RESTORED, collection_id)
                .with_version(restored.version.to_string())
                .with_payload(json!({ "snapshotId": snapshot_id })),
        );

        Ok(RollbackOutcome {
            collection_id: collection_id.to_string(),
            rolled_back_from: current.version,
            rolled_back_to: restored.version,
            backup_id: None,
            snapshot_id: Some(snapshot_id.to_string()),
            collection: restored,
        })
    }

    // -- read-only analysis -------------------------------------------------

    /// Compare two recorded versions and analyze their full documents.
    pub async fn analyze_differences(
        &self,
        collection_id: &str,
        version1: &str,
        version2: &str,
    ) -> CoreResult<DifferenceAnalysis> {
        let ledger = self.ledger.read().await;
        let comparison = ledger.compare_versions(collection_id, version1, version2)?;

        let document = |version: &str, recorded: &Option<Value>| {
            resolve_version_document(&ledger, collection_id, version)
                .ok()
                .or_else(|| recorded.clone())
                .unwrap_or(Value::Null)
        };
        let before = document(version1, &comparison.version1.data);
        let after = document(version2, &comparison.version2.data);

        Ok(DifferenceAnalysis::build(comparison, &before, &after))
    }

    /// Changelog of entries with `from < version <= to`, archived included.
    pub async fn generate_changelog(&self, collection_id: &str, from: &str, to: &str) -> CoreResult<Changelog> {
        let ledger = self.ledger.read().await;
        let history = ledger.history(collection_id)?;
        Changelog::build(collection_id, from, to, history.all_entries())
    }

    // -- scheduling ---------------------------------------------------------

    /// Register an update callback under a schedule. Returns the schedule id.
    pub async fn schedule_update(
        &self,
        collection_id: &str,
        schedule: ScheduleSpec,
        update_fn: impl Fn(&Collection) -> Value + Send + Sync + 'static,
    ) -> CoreResult<String> {
        self.collection(collection_id).await?;

        let now = chrono::Utc::now();
        let id = new_id("sched");
        let scheduled = ScheduledUpdate {
            id: id.clone(),
            collection_id: collection_id.to_string(),
            next_run: schedule.next_run(now),
            schedule,
            update_fn: Arc::new(update_fn),
            created_at: now,
            status: ScheduleStatus::Scheduled,
            last_run: None,
        };
        self.schedules.write().await.insert(id.clone(), scheduled);

        tracing::info!(collection_id, schedule_id = %id, "Update scheduled");
        Ok(id)
    }

    pub async fn scheduled_update(&self, schedule_id: &str) -> Option<ScheduledUpdate> {
        self.schedules.read().await.get(schedule_id).cloned()
    }

    /// Schedules registered for a collection, in registration order.
    pub async fn scheduled_updates(&self, collection_id: &str) -> Vec<ScheduledUpdate> {
        self.schedules
            .read()
            .await
            .values()
            .filter(|s| s.collection_id == collection_id)
            .cloned()
            .collect()
    }

    pub async fn cancel_schedule(&self, schedule_id: &str) -> CoreResult<ScheduledUpdate> {
        let mut schedules = self.schedules.write().await;
        let scheduled = schedules
            .get_mut(schedule_id)
            .ok_or_else(|| CoreError::not_found("schedule", schedule_id))?;
        scheduled.status.ensure_runnable(schedule_id)?;
        scheduled.status = ScheduleStatus::Cancelled;
        scheduled.next_run = None;
        Ok(scheduled.clone())
    }

    /// Run a schedule's callback now and push its payload through the
    /// update pipeline as an automated update.
    pub async fn trigger_schedule(&self, schedule_id: &str) -> CoreResult<UpdateOutcome> {
        let scheduled = self
            .scheduled_update(schedule_id)
            .await
            .ok_or_else(|| CoreError::not_found("schedule", schedule_id))?;
        scheduled.status.ensure_runnable(schedule_id)?;

        let collection = self.collection(&scheduled.collection_id).await?;
        let updates = (scheduled.update_fn)(&collection);
        let options = UpdateOptions {
            automated: true,
            ..UpdateOptions::default()
        };
        let result = self
            .update_collection(&scheduled.collection_id, updates, options)
            .await;

        let now = chrono::Utc::now();
        if let Some(entry) = self.schedules.write().await.get_mut(schedule_id) {
            entry.last_run = Some(now);
            entry.next_run = entry.schedule.next_run(now);
            if matches!(entry.schedule, ScheduleSpec::Once { .. }) {
                entry.status = ScheduleStatus::Completed;
            }
        }
        result
    }

    // -- helpers ------------------------------------------------------------

    /// The per-collection lock. Only existing collections get one, so the
    /// map never grows past the store.
    async fn collection_lock(&self, collection_id: &str) -> CoreResult<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get(collection_id) {
            return Ok(Arc::clone(lock));
        }
        if self.store.read().await.get(collection_id).is_none() {
            return Err(CoreError::not_found("collection", collection_id));
        }
        Ok(Arc::clone(locks.entry(collection_id.to_string()).or_default()))
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }

    async fn collection(&self, collection_id: &str) -> CoreResult<Collection> {
        self.store
            .read()
            .await
            .get(collection_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("collection", collection_id))
    }

    fn publish(&self, event: StoreEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

/// The explicit version, or the current one bumped by the requested or
/// inferred kind.
fn next_version(
    collection: &Collection,
    updates: &Value,
    options: &UpdateOptions,
) -> CoreResult<(SemVer, Option<VersionBump>)> {
    if let Some(raw) = options.version.as_deref() {
        return Ok((raw.parse()?, None));
    }
    let bump = options
        .version_type
        .unwrap_or_else(|| infer_version_type(updates));
    Ok((collection.version.bump(bump)?, Some(bump)))
}

fn verify_structure(document: &Value) -> CoreResult<()> {
    let has_version = document
        .get("version")
        .and_then(Value::as_str)
        .is_some_and(SemVer::is_valid);
    let has_updated_at = document.get("updatedAt").is_some_and(|v| !v.is_null());
    if has_version && has_updated_at {
        Ok(())
    } else {
        Err(CoreError::validation(
            POST_UPDATE_RULE,
            "Updated collection is missing essential fields",
        ))
    }
}

/// The full document recorded for `version`.
fn resolve_version_document(ledger: &HistoryLedger, collection_id: &str, version: &str) -> CoreResult<Value> {
    let entry = ledger.find_entry_by_version(collection_id, version)?;
    if change_types::is_full_document_change(&entry.change_type) {
        if let Some(document) = &entry.new_value {
            return Ok(document.clone());
        }
    }
    ledger
        .latest_snapshot_with_version(collection_id, version)
        .map(|s| s.data.clone())
        .ok_or_else(|| CoreError::not_found("snapshot", format!("version {version}")))
}
