//! キャッシュ機能テスト
//!
//! 解析結果キャッシュの動作を検証

use chrono::Utc;
use gym_asset_ai::analyzer::cache::{compute_hash, CacheFile};
use gym_asset_common::{AnalysisPayload, StoredAnalysisResult};
use tempfile::tempdir;

fn stored(job_id: &str, file: &str, items: u32) -> StoredAnalysisResult {
    StoredAnalysisResult {
        job_id: job_id.to_string(),
        image_file: file.to_string(),
        image_hash: String::new(),
        image_quality: None,
        analyzed_at: Utc::now(),
        payload: AnalysisPayload {
            total_items: items,
            ..Default::default()
        },
    }
}

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert("abc123".to_string(), "bench.jpg".to_string(), 1024, stored("job-1", "bench.jpg", 2));
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);

    let cached = loaded.get("abc123").expect("キャッシュが見つからない");
    assert_eq!(cached.job_id, "job-1");
    assert_eq!(cached.image_file, "bench.jpg");
    assert_eq!(cached.payload.total_items, 2);
}

/// キャッシュヒット判定
#[test]
fn test_cache_hit() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut cache = CacheFile::load(dir.path());

    let hash = compute_hash(b"jpeg bytes");
    cache.insert(hash.clone(), "rack.jpg".to_string(), 10, stored("job-2", "rack.jpg", 1));

    assert!(cache.get(&hash).is_some());
    assert!(cache.get(&compute_hash(b"other bytes")).is_none());
}

/// ハッシュは内容のみに依存
#[test]
fn test_compute_hash() {
    let empty = compute_hash(b"");
    assert_eq!(empty, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    assert_eq!(compute_hash(b"abc"), compute_hash(b"abc"));
    assert_ne!(compute_hash(b"abc"), compute_hash(b"abd"));
}

/// キャッシュの上書き
#[test]
fn test_cache_overwrite() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut cache = CacheFile::load(dir.path());

    cache.insert("same_hash".to_string(), "a.jpg".to_string(), 1000, stored("job-old", "a.jpg", 1));
    cache.insert("same_hash".to_string(), "a.jpg".to_string(), 1000, stored("job-new", "a.jpg", 4));

    let cached = cache.get("same_hash").expect("キャッシュが見つからない");
    assert_eq!(cached.job_id, "job-new");
    assert_eq!(cache.len(), 1);
}

/// キャッシュファイルが破損している場合
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(CacheFile::cache_path(dir.path()), "{ invalid json }").unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// バージョン違いのキャッシュは作り直す
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        CacheFile::cache_path(dir.path()),
        r#"{"version": 99, "entries": {}}"#,
    )
    .unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// キャッシュの削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    assert!(!CacheFile::clear(dir.path()).unwrap());

    let mut cache = CacheFile::default();
    cache.insert("h".to_string(), "x.jpg".to_string(), 1, stored("job-3", "x.jpg", 0));
    cache.save(dir.path()).unwrap();
    assert!(CacheFile::cache_path(dir.path()).exists());

    assert!(CacheFile::clear(dir.path()).unwrap());
    assert!(!CacheFile::cache_path(dir.path()).exists());
}

/// 保存は一時ファイル経由で置き換える
#[test]
fn test_cache_save_replaces_via_temp_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let tmp_path = dir.path().join(".analysis-cache.json.tmp");

    let mut cache = CacheFile::load(dir.path());
    cache.insert("abc123".to_string(), "bench.jpg".to_string(), 1024, stored("job-1", "bench.jpg", 2));
    cache.save(dir.path()).expect("キャッシュ保存失敗");
    assert!(!tmp_path.exists());

    // 一時ファイルを作れない状態では保存に失敗するが、既存のキャッシュは壊れない
    std::fs::create_dir(&tmp_path).unwrap();
    cache.insert("def456".to_string(), "rack.jpg".to_string(), 2048, stored("job-2", "rack.jpg", 3));
    assert!(cache.save(dir.path()).is_err());

    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);
    assert!(loaded.get("abc123").is_some());
    assert!(loaded.get("def456").is_none());
}
