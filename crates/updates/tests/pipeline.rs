use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use designvault_core::{CollectionStore, CoreError, CoreResult, SemVer, StatusSet, VersionBump};
use designvault_events::{event_types, EventBus};
use designvault_history::change_types::{
    COLLECTION_CREATED, COLLECTION_RESTORED, COLLECTION_ROLLED_BACK, COLORS_UPDATED, UPDATE_FAILED,
};
use designvault_history::{HistoryFilter, HistoryLedger, ImpactLevel, LedgerConfig};
use designvault_updates::{
    HookContext, HookPhase, OrchestratorConfig, RollbackOptions, ScheduleSpec, ScheduleStatus,
    UpdateHook, UpdateOptions, UpdateOrchestrator,
};

async fn orchestrator_at(version: &str, config: OrchestratorConfig) -> (UpdateOrchestrator, String) {
    let store = Arc::new(RwLock::new(CollectionStore::new()));
    let ledger = Arc::new(RwLock::new(HistoryLedger::new(LedgerConfig::default())));
    let id = store
        .write()
        .await
        .create("Brand", "Brand collection", version, StatusSet::default())
        .unwrap()
        .id;
    let orchestrator = UpdateOrchestrator::new(store, ledger, config);
    orchestrator.initialize_for_collection(&id).await.unwrap();
    (orchestrator, id)
}

async fn orchestrator() -> (UpdateOrchestrator, String) {
    orchestrator_at("1.0.0", OrchestratorConfig::default()).await
}

async fn version_of(orchestrator: &UpdateOrchestrator, id: &str) -> SemVer {
    orchestrator.store().read().await.get(id).unwrap().version
}

struct SlowHook;

#[async_trait]
impl UpdateHook for SlowHook {
    async fn run(&self, _context: &HookContext) -> CoreResult<()> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

#[tokio::test]
async fn color_section_update_bumps_minor() {
    let (orchestrator, id) = orchestrator_at("1.2.3", OrchestratorConfig::default()).await;

    let outcome = orchestrator
        .update_section(
            &id,
            "colors",
            json!({"primary": {"main": "#0055ff"}}),
            UpdateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.version, SemVer::new(1, 3, 0));
    assert_eq!(outcome.previous_version, SemVer::new(1, 2, 3));
    assert_eq!(outcome.entry_ids.len(), 1);

    let ledger = orchestrator.ledger().read().await;
    let entries = ledger.entries(&id).unwrap();
    let last = entries.last().unwrap();
    assert_eq!(last.change_type, COLORS_UPDATED);
    assert_eq!(last.version, "1.3.0");
    assert_eq!(last.metadata.extra["section"], "colors");

    let backup = ledger.get_snapshot(&id, &outcome.backup_id).unwrap();
    assert!(backup.metadata.pre_update);
    assert_eq!(backup.metadata.version, "1.2.3");
}

#[tokio::test]
async fn breaking_update_without_major_has_no_side_effects() {
    let (orchestrator, id) = orchestrator().await;

    let result = orchestrator
        .update_collection(
            &id,
            json!({"components": {"buttons": {"radius": 4}}}),
            UpdateOptions::default(),
        )
        .await;

    assert_matches!(result, Err(CoreError::ValidationFailed { rule, .. }) if rule == "breaking-changes");
    assert_eq!(version_of(&orchestrator, &id).await, SemVer::new(1, 0, 0));
    let ledger = orchestrator.ledger().read().await;
    assert_eq!(ledger.entry_count(&id), 1);
    assert_eq!(ledger.snapshot_count(&id), 1);
}

#[tokio::test]
async fn breaking_update_with_major_goes_through() {
    let (orchestrator, id) = orchestrator().await;

    let outcome = orchestrator
        .update_collection(
            &id,
            json!({"components": {"buttons": {"radius": 4}}}),
            UpdateOptions::default().with_version_type(VersionBump::Major),
        )
        .await
        .unwrap();

    assert_eq!(outcome.version, SemVer::new(2, 0, 0));
    assert_eq!(outcome.collection.attributes["components"]["buttons"]["radius"], 4);
}

#[tokio::test]
async fn one_entry_per_key_and_increasing_versions() {
    let (orchestrator, id) = orchestrator().await;

    let first = orchestrator
        .update_collection(
            &id,
            json!({"layout": {"grid": 12}, "icons": {"library": "lucide"}}),
            UpdateOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(first.version, SemVer::new(1, 1, 0));
    assert_eq!(first.changes_applied, 2);
    assert_eq!(first.sections, vec!["layout", "icons"]);

    let second = orchestrator
        .update_collection(&id, json!({"layout": {"grid": 16}}), UpdateOptions::default())
        .await
        .unwrap();
    assert_eq!(second.version, SemVer::new(1, 1, 1));

    let ledger = orchestrator.ledger().read().await;
    let entries = ledger.entries(&id).unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[1].version, "1.1.0");
    assert_eq!(entries[2].version, "1.1.0");
    assert_eq!(entries[3].version, "1.1.1");
    assert_eq!(entries[3].old_value.as_ref().unwrap()["grid"], 12);
}

#[tokio::test]
async fn explicit_version_must_increase() {
    let (orchestrator, id) = orchestrator_at("2.0.0", OrchestratorConfig::default()).await;

    let result = orchestrator
        .update_collection(
            &id,
            json!({"layout": {}}),
            UpdateOptions::default().with_version("1.5.0"),
        )
        .await;
    assert_matches!(result, Err(CoreError::ValidationFailed { rule, .. }) if rule == "semantic-version");

    let outcome = orchestrator
        .update_collection(
            &id,
            json!({"layout": {}}),
            UpdateOptions::default().with_version("2.5.0"),
        )
        .await
        .unwrap();
    assert_eq!(outcome.version, SemVer::new(2, 5, 0));
}

#[tokio::test]
async fn bump_past_largest_version_is_rejected() {
    let (orchestrator, id) =
        orchestrator_at("18446744073709551615.0.0", OrchestratorConfig::default()).await;

    let result = orchestrator
        .update_collection(
            &id,
            json!({"theme": {"mode": "dark"}}),
            UpdateOptions::default().with_version_type(VersionBump::Major),
        )
        .await;
    assert_matches!(result, Err(CoreError::ValidationFailed { rule, .. }) if rule == "semantic-version");
    assert_eq!(version_of(&orchestrator, &id).await, SemVer::new(u64::MAX, 0, 0));
    {
        let ledger = orchestrator.ledger().read().await;
        assert_eq!(ledger.entry_count(&id), 1);
        assert_eq!(ledger.snapshot_count(&id), 1);
    }

    let outcome = orchestrator
        .update_collection(
            &id,
            json!({"layout": {"grid": 12}}),
            UpdateOptions::default().with_version_type(VersionBump::Minor),
        )
        .await
        .unwrap();
    assert_eq!(outcome.version, SemVer::new(u64::MAX, 1, 0));
}

#[tokio::test]
async fn invalid_hex_color_is_rejected() {
    let (orchestrator, id) = orchestrator().await;

    let result = orchestrator
        .update_section(&id, "colors", json!({"accent": "#12"}), UpdateOptions::default())
        .await;
    assert_matches!(result, Err(CoreError::ValidationFailed { rule, .. }) if rule == "accessibility");
}

#[tokio::test]
async fn unknown_section_is_not_found() {
    let (orchestrator, id) = orchestrator().await;

    let result = orchestrator
        .update_section(&id, "sounds", json!({}), UpdateOptions::default())
        .await;
    assert_matches!(result, Err(CoreError::NotFound { entity: "section", .. }));
}

#[tokio::test]
async fn custom_validator_runs_after_builtins() {
    let (orchestrator, id) = orchestrator().await;
    orchestrator
        .register_validator("no-layout", |_: &designvault_core::Collection, updates: &serde_json::Value, _: &UpdateOptions| {
            if updates.get("layout").is_some() {
                Err("layout is frozen".to_string())
            } else {
                Ok(())
            }
        })
        .await;

    let result = orchestrator
        .update_collection(&id, json!({"layout": {"grid": 8}}), UpdateOptions::default())
        .await;
    assert_matches!(result, Err(CoreError::ValidationFailed { rule, reason }) if rule == "no-layout" && reason == "layout is frozen");
}

#[tokio::test]
async fn hook_timeout_records_failure() {
    let config = OrchestratorConfig {
        hook_timeout: Duration::from_millis(50),
        ..OrchestratorConfig::default()
    };
    let (orchestrator, id) = orchestrator_at("1.0.0", config).await;
    orchestrator.register_hook(HookPhase::BeforeUpdate, SlowHook).await;

    let result = orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await;

    let err = result.unwrap_err();
    assert_matches!(&err, CoreError::UpdateFailed { source, .. } if matches!(**source, CoreError::Timeout { .. }));
    assert_eq!(version_of(&orchestrator, &id).await, SemVer::new(1, 0, 0));

    let ledger = orchestrator.ledger().read().await;
    let last = ledger.entries(&id).unwrap().last().unwrap().clone();
    assert_eq!(last.change_type, UPDATE_FAILED);
    assert_eq!(last.version, "error");
    assert_eq!(last.metadata.extra["errorType"], "Timeout");
}

#[tokio::test]
async fn failing_hook_auto_rolls_back_to_backup() {
    let (orchestrator, id) = orchestrator().await;

    let first = orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await
        .unwrap();

    orchestrator
        .register_hook(HookPhase::AfterUpdate, |_: &HookContext| -> CoreResult<()> {
            Err(CoreError::Internal("notifier down".to_string()))
        })
        .await;

    let result = orchestrator
        .update_collection(
            &id,
            json!({"layout": {"grid": 16}}),
            UpdateOptions::default().with_auto_rollback(first.backup_id.clone()),
        )
        .await;
    assert_matches!(result, Err(CoreError::UpdateFailed { .. }));

    let store = orchestrator.store().read().await;
    let restored = store.get(&id).unwrap();
    assert_eq!(restored.version, SemVer::new(1, 0, 0));
    assert_eq!(restored.attributes["layout"].get("grid"), None);

    let ledger = orchestrator.ledger().read().await;
    let types: Vec<&str> = ledger
        .entries(&id)
        .unwrap()
        .iter()
        .rev()
        .take(2)
        .map(|e| e.change_type.as_str())
        .collect();
    assert_eq!(types, vec![COLLECTION_RESTORED, UPDATE_FAILED]);
}

#[tokio::test]
async fn hooks_see_computed_version() {
    let (orchestrator, id) = orchestrator().await;
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    orchestrator
        .register_hook(HookPhase::AfterVersion, move |ctx: &HookContext| -> CoreResult<()> {
            sink.lock().unwrap().push((ctx.phase, ctx.version.clone()));
            Ok(())
        })
        .await;

    orchestrator
        .update_collection(&id, json!({"layout": {}}), UpdateOptions::default())
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![(HookPhase::AfterVersion, Some("1.0.1".to_string()))]);
}

#[tokio::test]
async fn rollback_to_unknown_version_changes_nothing() {
    let (orchestrator, id) = orchestrator().await;
    orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await
        .unwrap();
    let entries_before = orchestrator.ledger().read().await.entry_count(&id);
    let snapshots_before = orchestrator.ledger().read().await.snapshot_count(&id);

    let result = orchestrator
        .rollback_to_version(&id, "9.9.9", RollbackOptions::default())
        .await;

    assert_matches!(result, Err(CoreError::NotFound { entity: "version", .. }));
    assert_eq!(version_of(&orchestrator, &id).await, SemVer::new(1, 0, 1));
    let ledger = orchestrator.ledger().read().await;
    assert_eq!(ledger.entry_count(&id), entries_before);
    assert_eq!(ledger.snapshot_count(&id), snapshots_before);
}

#[tokio::test]
async fn rollback_to_genesis_restores_document() {
    let (orchestrator, id) = orchestrator().await;
    orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await
        .unwrap();

    let outcome = orchestrator
        .rollback_to_version(&id, "1.0.0", RollbackOptions::because("bad grid"))
        .await
        .unwrap();

    assert_eq!(outcome.rolled_back_from, SemVer::new(1, 0, 1));
    assert_eq!(outcome.rolled_back_to, SemVer::new(1, 0, 0));
    assert!(outcome.backup_id.is_some());
    assert_eq!(outcome.collection.attributes["layout"].get("grid"), None);

    let ledger = orchestrator.ledger().read().await;
    let last = ledger.entries(&id).unwrap().last().unwrap();
    assert_eq!(last.change_type, COLLECTION_ROLLED_BACK);
    assert_eq!(last.metadata.extra["reason"], "bad grid");
    assert_eq!(last.metadata.extra["rollbackType"], "version");
}

#[tokio::test]
async fn rollback_to_snapshot_records_restore() {
    let (orchestrator, id) = orchestrator().await;
    let outcome = orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await
        .unwrap();

    let rollback = orchestrator
        .rollback_to_snapshot(&id, &outcome.backup_id, RollbackOptions::default())
        .await
        .unwrap();
    assert_eq!(rollback.rolled_back_to, SemVer::new(1, 0, 0));
    assert_eq!(rollback.snapshot_id.as_deref(), Some(outcome.backup_id.as_str()));

    let missing = orchestrator
        .rollback_to_snapshot(&id, "snap_missing", RollbackOptions::default())
        .await;
    assert_matches!(missing, Err(CoreError::NotFound { entity: "snapshot", .. }));
}

#[tokio::test]
async fn batch_isolates_failures() {
    let (orchestrator, id) = orchestrator().await;

    let outcome = orchestrator
        .batch_update(
            &id,
            json!({
                "colors": {"primary": {"main": "#ff0000"}},
                "sounds": {"click": "pop"},
                "layout": {"grid": 12},
            }),
            UpdateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.error_count, 1);
    assert_eq!(outcome.items[1].section, "sounds");
    assert_matches!(outcome.items[1].result, Err(CoreError::NotFound { entity: "section", .. }));
    assert_eq!(version_of(&orchestrator, &id).await, SemVer::new(1, 1, 1));

    let ledger = orchestrator.ledger().read().await;
    let last = ledger.entries(&id).unwrap().last().unwrap();
    assert_eq!(last.metadata.extra["batch"], true);
}

#[tokio::test]
async fn updates_are_published() {
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();

    let store = Arc::new(RwLock::new(CollectionStore::new()));
    let ledger = Arc::new(RwLock::new(HistoryLedger::default()));
    let id = store
        .write()
        .await
        .create("Brand", "", "1.0.0", StatusSet::default())
        .unwrap()
        .id;
    let orchestrator =
        UpdateOrchestrator::new(store, ledger, OrchestratorConfig::default()).with_event_bus(bus);
    orchestrator.initialize_for_collection(&id).await.unwrap();

    orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await
        .unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.event_type, event_types::COLLECTION_UPDATED);
    assert_eq!(event.collection_id, id);
    assert_eq!(event.version.as_deref(), Some("1.0.1"));
    assert_eq!(event.payload["previousVersion"], "1.0.0");
}

#[tokio::test]
async fn changelog_covers_half_open_range() {
    let (orchestrator, id) = orchestrator().await;
    orchestrator
        .update_collection(&id, json!({"icons": {"library": "lucide"}}), UpdateOptions::default())
        .await
        .unwrap();
    orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await
        .unwrap();

    let changelog = orchestrator.generate_changelog(&id, "1.0.0", "1.1.0").await.unwrap();
    assert_eq!(changelog.sections.total(), 1);
    assert_eq!(changelog.sections.added.len(), 1);

    let everything = orchestrator.generate_changelog(&id, "0.0.0", "9.0.0").await.unwrap();
    assert_eq!(everything.sections.total(), 3);

    let reversed = orchestrator.generate_changelog(&id, "2.0.0", "1.0.0").await;
    assert_matches!(reversed, Err(CoreError::ValidationFailed { rule, .. }) if rule == "version-range");
}

#[tokio::test]
async fn difference_analysis_uses_full_documents() {
    let (orchestrator, id) = orchestrator().await;
    orchestrator
        .update_collection(
            &id,
            json!({"theme": {"primaryTheme": "dark"}}),
            UpdateOptions::default(),
        )
        .await
        .unwrap();
    orchestrator
        .update_collection(&id, json!({"layout": {"grid": 12}}), UpdateOptions::default())
        .await
        .unwrap();

    let analysis = orchestrator.analyze_differences(&id, "1.0.0", "2.0.0").await.unwrap();
    assert_eq!(analysis.comparison.version1.version, "1.0.0");
    assert_eq!(analysis.comparison.version2.version, "2.0.0");
    assert_eq!(analysis.analysis.breaking_changes, vec!["theme"]);
    assert!(!analysis.analysis.compatibility.compatible);
}

#[tokio::test]
async fn manual_schedule_runs_until_cancelled() {
    let (orchestrator, id) = orchestrator().await;
    let schedule_id = orchestrator
        .schedule_update(&id, ScheduleSpec::Manual, |collection| {
            json!({"technical": {"lastSync": collection.version.to_string()}})
        })
        .await
        .unwrap();

    let outcome = orchestrator.trigger_schedule(&schedule_id).await.unwrap();
    assert_eq!(outcome.version, SemVer::new(1, 0, 1));
    {
        let ledger = orchestrator.ledger().read().await;
        let last = ledger.entries(&id).unwrap().last().unwrap();
        assert!(last.metadata.automated);
    }

    let scheduled = orchestrator.scheduled_update(&schedule_id).await.unwrap();
    assert!(scheduled.last_run.is_some());
    assert_eq!(scheduled.status, ScheduleStatus::Scheduled);

    let cancelled = orchestrator.cancel_schedule(&schedule_id).await.unwrap();
    assert_eq!(cancelled.status, ScheduleStatus::Cancelled);
    assert_matches!(orchestrator.trigger_schedule(&schedule_id).await, Err(CoreError::Conflict(_)));
    assert_eq!(orchestrator.scheduled_updates(&id).await.len(), 1);
}

#[tokio::test]
async fn once_schedule_completes_after_running() {
    let (orchestrator, id) = orchestrator().await;
    let at = chrono::Utc::now() + chrono::Duration::hours(1);
    let schedule_id = orchestrator
        .schedule_update(&id, ScheduleSpec::Once { at }, |_| json!({"layout": {"grid": 4}}))
        .await
        .unwrap();
    assert_eq!(
        orchestrator.scheduled_update(&schedule_id).await.unwrap().next_run,
        Some(at)
    );

    orchestrator.trigger_schedule(&schedule_id).await.unwrap();

    let scheduled = orchestrator.scheduled_update(&schedule_id).await.unwrap();
    assert_eq!(scheduled.status, ScheduleStatus::Completed);
    assert_eq!(scheduled.next_run, None);
}

#[tokio::test]
async fn history_filter_sees_authored_updates() {
    let (orchestrator, id) = orchestrator().await;
    orchestrator
        .update_collection(
            &id,
            json!({"layout": {"grid": 12}}),
            UpdateOptions::default().with_author("dana"),
        )
        .await
        .unwrap();

    let filter = HistoryFilter {
        author: Some("dana".to_string()),
        ..HistoryFilter::default()
    };
    let view = orchestrator.ledger().read().await.get_history(&id, &filter).unwrap();
    assert_eq!(view.entries.len(), 1);
}

#[tokio::test]
async fn post_update_cleanup_prunes_snapshots_and_archives_entries() {
    let config = OrchestratorConfig {
        snapshot_cleanup_threshold: 4,
        snapshot_cleanup_keep: 2,
        archive_threshold: 3,
        archive_retain: 2,
        ..OrchestratorConfig::default()
    };
    let store = Arc::new(RwLock::new(CollectionStore::new()));
    let ledger = Arc::new(RwLock::new(HistoryLedger::new(LedgerConfig {
        max_snapshots_per_collection: 10,
    })));
    let id = store
        .write()
        .await
        .create("Brand", "", "1.0.0", StatusSet::default())
        .unwrap()
        .id;
    let orchestrator = UpdateOrchestrator::new(store, ledger, config);
    orchestrator.initialize_for_collection(&id).await.unwrap();

    // Each update adds one backup snapshot and one entry.
    for grid in 1..=3 {
        orchestrator
            .update_collection(&id, json!({"layout": {"grid": grid}}), UpdateOptions::default())
            .await
            .unwrap();
    }
    {
        let ledger = orchestrator.ledger().read().await;
        assert_eq!(ledger.snapshot_count(&id), 4);
        assert_eq!(ledger.entry_count(&id), 2);
        assert_eq!(ledger.history(&id).unwrap().archived_entries.len(), 2);
    }

    orchestrator
        .update_collection(&id, json!({"layout": {"grid": 4}}), UpdateOptions::default())
        .await
        .unwrap();
    assert_eq!(orchestrator.ledger().read().await.snapshot_count(&id), 2);

    orchestrator
        .update_collection(&id, json!({"layout": {"grid": 5}}), UpdateOptions::default())
        .await
        .unwrap();

    let ledger = orchestrator.ledger().read().await;
    assert_eq!(ledger.snapshot_count(&id), 3);
    assert_eq!(ledger.entry_count(&id), 2);

    let history = ledger.history(&id).unwrap();
    assert_eq!(history.archived_entries.len(), 4);
    assert_eq!(history.archived_entries[0].change_type, COLLECTION_CREATED);
    assert_eq!(history.entries.last().unwrap().version, "1.0.5");
    assert!(ledger.find_entry_by_version(&id, "1.0.1").is_ok());
}

#[tokio::test]
async fn active_default_is_audited() {
    let (orchestrator, id) = orchestrator().await;

    let entry = orchestrator.set_active_default(&id).await.unwrap();

    let store = orchestrator.store().read().await;
    assert_eq!(store.get_active().map(|c| c.id.as_str()), Some(id.as_str()));
    let ledger = orchestrator.ledger().read().await;
    let last = ledger.entries(&id).unwrap().last().unwrap();
    assert_eq!(last.id, entry.id);
    assert_eq!(last.metadata.impact_level, ImpactLevel::High);
    assert_eq!(ledger.get_snapshots(&id)[0].metadata.extra["entryId"], entry.id.as_str());
}
