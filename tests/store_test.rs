//! 資産台帳のテスト
//!
//! 登録・更新・削除と変更履歴、JSONファイルへの保存を検証

use chrono::Utc;
use gym_asset_ai::error::GymAssetError;
use gym_asset_ai::store::{AssetRepository, AssetStore, JsonFileRepository, MemoryRepository, StoreData};
use gym_asset_common::{
    AnalysisPayload, AssetDraft, AssetFilter, AssetStatus, AssetUpdate, AuditAction, EquipmentCondition,
    StoredAnalysisResult,
};
use tempfile::tempdir;

fn draft(tag: &str, name: &str, kind: &str) -> AssetDraft {
    AssetDraft {
        asset_tag: tag.to_string(),
        name: name.to_string(),
        equipment_type: kind.to_string(),
        location: "フリーウェイトエリア".to_string(),
        ..Default::default()
    }
}

fn memory_store() -> AssetStore<MemoryRepository> {
    AssetStore::open(MemoryRepository::new()).expect("open")
}

#[test]
fn test_create_normalizes_tag_and_logs() {
    let mut store = memory_store();
    let asset = store.create(draft("gym db 001", "Dumbbell 20kg", "dumbbell")).unwrap();

    assert_eq!(asset.asset_tag, "GYM-DB-001");
    assert_eq!(asset.status, AssetStatus::Active);
    assert_eq!(store.list().len(), 1);

    let logs = store.audit_logs(None);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, AuditAction::Create);
    assert_eq!(logs[0].asset_id, asset.id);
    assert_eq!(store.repository().save_count(), 1);
}

#[test]
fn test_duplicate_tag_rejected_case_insensitive() {
    let mut store = memory_store();
    store.create(draft("GYM-DB-001", "Dumbbell", "dumbbell")).unwrap();

    let err = store.create(draft("gym-db-001", "Another", "dumbbell")).unwrap_err();
    assert!(matches!(err, GymAssetError::DuplicateAssetTag(ref tag) if tag == "GYM-DB-001"));
    assert_eq!(store.list().len(), 1);
    assert_eq!(store.audit_logs(None).len(), 1);
}

#[test]
fn test_invalid_draft_rejected() {
    let mut store = memory_store();

    let err = store.create(draft("GYM-BN-001", "  ", "bench")).unwrap_err();
    assert!(matches!(err, GymAssetError::Common(gym_asset_common::Error::Validation(_))));

    let err = store.create(draft("X", "Bench", "bench")).unwrap_err();
    assert!(matches!(err, GymAssetError::Common(gym_asset_common::Error::Validation(_))));

    assert!(store.list().is_empty());
    assert_eq!(store.repository().save_count(), 0);
}

#[test]
fn test_update_records_changes() {
    let mut store = memory_store();
    store.create(draft("GYM-BN-001", "Flat Bench", "bench")).unwrap();

    let update = AssetUpdate {
        condition: Some(EquipmentCondition::NeedsRepair),
        status: Some(AssetStatus::Maintenance),
        ..Default::default()
    };
    let asset = store.update("gym-bn-001", &update).unwrap();

    assert_eq!(asset.condition, EquipmentCondition::NeedsRepair);
    assert_eq!(asset.status, AssetStatus::Maintenance);
    assert!(asset.updated_at >= asset.created_at);

    let logs = store.audit_logs(Some("GYM-BN-001"));
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].action, AuditAction::Update);
    assert!(logs[1].details.contains("condition"));
    assert!(logs[1].details.contains("status"));
}

#[test]
fn test_update_without_changes_is_noop() {
    let mut store = memory_store();
    store.create(draft("GYM-BN-001", "Flat Bench", "bench")).unwrap();

    let update = AssetUpdate {
        name: Some("Flat Bench".to_string()),
        ..Default::default()
    };
    store.update("GYM-BN-001", &update).unwrap();

    assert_eq!(store.audit_logs(None).len(), 1);
    assert_eq!(store.repository().save_count(), 1);
}

#[test]
fn test_update_and_delete_unknown_tag() {
    let mut store = memory_store();
    let update = AssetUpdate {
        notes: Some("x".to_string()),
        ..Default::default()
    };

    assert!(matches!(store.update("GYM-XX-999", &update), Err(GymAssetError::AssetNotFound(_))));
    assert!(matches!(store.delete("GYM-XX-999"), Err(GymAssetError::AssetNotFound(_))));
}

#[test]
fn test_delete_keeps_history() {
    let mut store = memory_store();
    store.create(draft("GYM-KB-016", "Kettlebell 16kg", "kettlebell")).unwrap();

    let removed = store.delete("GYM-KB-016").unwrap();
    assert_eq!(removed.asset_tag, "GYM-KB-016");
    assert!(store.get("GYM-KB-016").is_none());

    let logs = store.audit_logs(Some("gym-kb-016"));
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].action, AuditAction::Delete);

    // 削除後は同じタグで再登録できる
    store.create(draft("GYM-KB-016", "Kettlebell 16kg", "kettlebell")).unwrap();
}

#[test]
fn test_search_and_report() {
    let mut store = memory_store();
    store.create(draft("GYM-DB-001", "Hex Dumbbell", "dumbbell")).unwrap();
    store.create(draft("GYM-TM-001", "Treadmill", "cardio")).unwrap();
    store
        .update(
            "GYM-TM-001",
            &AssetUpdate {
                condition: Some(EquipmentCondition::Poor),
                ..Default::default()
            },
        )
        .unwrap();

    let found = store.search(&AssetFilter::query("hex"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].asset_tag, "GYM-DB-001");

    let report = store.report();
    assert_eq!(report.total, 2);
    assert_eq!(report.needs_attention, vec!["GYM-TM-001".to_string()]);
}

#[test]
fn test_record_analysis_replaces_same_job() {
    let mut store = memory_store();
    let result = |items: u32| StoredAnalysisResult {
        job_id: "job-1".to_string(),
        image_file: "rack.jpg".to_string(),
        image_hash: "abc".to_string(),
        image_quality: None,
        analyzed_at: Utc::now(),
        payload: AnalysisPayload {
            total_items: items,
            ..Default::default()
        },
    };

    store.record_analysis(result(1)).unwrap();
    store.record_analysis(result(2)).unwrap();

    assert_eq!(store.analyses().len(), 1);
    assert_eq!(store.analyses()[0].payload.total_items, 2);
}

#[test]
fn test_json_repository_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");

    {
        let mut store = AssetStore::open(JsonFileRepository::in_dir(dir.path())).unwrap();
        assert!(store.list().is_empty());
        store.create(draft("GYM-DB-001", "Hex Dumbbell", "dumbbell")).unwrap();
        store.create(draft("GYM-BN-001", "Flat Bench", "bench")).unwrap();
    }

    let store = AssetStore::open(JsonFileRepository::in_dir(dir.path())).unwrap();
    assert_eq!(store.list().len(), 2);
    assert_eq!(store.audit_logs(None).len(), 2);
    assert!(store.get("gym-bn-001").is_some());
    assert!(!dir.path().join("assets.json.tmp").exists());
}

#[test]
fn test_json_repository_missing_and_corrupt_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let repo = JsonFileRepository::in_dir(&dir.path().join("nested"));
    assert_eq!(repo.load().unwrap(), StoreData::default());

    std::fs::write(dir.path().join("assets.json"), "{ broken").unwrap();
    let repo = JsonFileRepository::in_dir(dir.path());
    assert!(matches!(repo.load(), Err(GymAssetError::JsonParse(_))));
}
