//! CSV/JSON/Excel出力の統合テスト

use chrono::{TimeZone, Utc};
use gym_asset_ai::cli::ExportFormat;
use gym_asset_ai::export::{export_assets, output_path_for_format, render};
use gym_asset_common::{Asset, AssetDraft, EquipmentCondition};
use tempfile::tempdir;

fn create_test_asset(index: usize) -> Asset {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    AssetDraft {
        asset_tag: format!("GYM-DB-{:03}", index),
        name: format!("Dumbbell {}kg", index * 2),
        equipment_type: "dumbbell".to_string(),
        location: "Rack A".to_string(),
        condition: EquipmentCondition::Good,
        weight: Some(format!("{}kg", index * 2)),
        notes: if index == 1 { "grip, \"knurled\"".to_string() } else { String::new() },
        ..Default::default()
    }
    .into_asset(now)
}

#[test]
fn test_csv_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assets: Vec<Asset> = (1..=3).map(create_test_asset).collect();
    let refs: Vec<&Asset> = assets.iter().collect();

    let path = export_assets(&refs, ExportFormat::Csv, dir.path(), "台帳").unwrap();
    assert_eq!(path, dir.path().join("台帳.csv"));

    let content = std::fs::read_to_string(&path).expect("CSV読み込み失敗");
    let lines: Vec<&str> = content.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("assetTag,name,equipmentType"));
    assert!(lines[1].starts_with("GYM-DB-001,Dumbbell 2kg,dumbbell"));
    assert!(lines[1].contains("\"grip, \"\"knurled\"\"\""));
}

#[test]
fn test_json_export_to_explicit_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assets: Vec<Asset> = (1..=2).map(create_test_asset).collect();
    let refs: Vec<&Asset> = assets.iter().collect();
    let output = dir.path().join("out").join("assets.json");

    let path = export_assets(&refs, ExportFormat::Json, &output, "台帳").unwrap();
    assert_eq!(path, output);

    let parsed: Vec<Asset> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, assets);
}

#[test]
fn test_excel_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assets: Vec<Asset> = (1..=5).map(create_test_asset).collect();
    let refs: Vec<&Asset> = assets.iter().collect();

    let path = export_assets(&refs, ExportFormat::Excel, dir.path(), "資産台帳").unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("xlsx"));

    let bytes = std::fs::read(&path).expect("Excel読み込み失敗");
    assert!(bytes.starts_with(b"PK"), "xlsxはzip形式");
}

#[test]
fn test_empty_export() {
    let csv = render(&[], ExportFormat::Csv, "台帳").unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(csv.lines().count(), 1);

    let json = render(&[], ExportFormat::Json, "台帳").unwrap();
    assert_eq!(String::from_utf8(json).unwrap(), "[]");

    assert!(render(&[], ExportFormat::Excel, "台帳").is_ok());
}

#[test]
fn test_output_path_for_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    assert_eq!(
        output_path_for_format(dir.path(), "台帳", ExportFormat::Excel),
        dir.path().join("台帳.xlsx")
    );

    let file = dir.path().join("custom.csv");
    assert_eq!(output_path_for_format(&file, "台帳", ExportFormat::Csv), file);
}
