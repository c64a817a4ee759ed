//! 解析結果から台帳登録候補を作成
//!
//! タグの決定順:
//! 1. 機器ごとの suggestedAssetTag
//! 2. 同じ位置の assetTags
//! 3. `GYM-<種別>-<連番>`

use crate::asset::{normalize_asset_tag, validate_asset_tag, AssetDraft, EquipmentCondition};
use crate::types::{AnalysisPayload, DetectedEquipment};

/// 種別が空の場合に使う名称
const UNKNOWN_TYPE: &str = "equipment";

/// 解析結果の機器ごとに登録候補を作成
pub fn suggest_assets(payload: &AnalysisPayload, job_id: &str, image_path: Option<&str>) -> Vec<AssetDraft> {
    payload
        .equipment
        .iter()
        .enumerate()
        .map(|(i, item)| AssetDraft {
            asset_tag: pick_tag(item, payload.asset_tags.get(i), i),
            name: display_name(item),
            equipment_type: equipment_type(item).to_string(),
            location: String::new(),
            condition: EquipmentCondition::from_lenient(&item.condition),
            status: Default::default(),
            weight: item.weight.clone(),
            notes: item.description.trim().to_string(),
            image_path: image_path.map(str::to_string),
            source_job_id: Some(job_id.to_string()),
        })
        .collect()
}

fn equipment_type(item: &DetectedEquipment) -> &str {
    let t = item.equipment_type.trim();
    if t.is_empty() {
        UNKNOWN_TYPE
    } else {
        t
    }
}

fn display_name(item: &DetectedEquipment) -> String {
    let kind = equipment_type(item);
    match item.weight.as_deref().map(str::trim) {
        Some(w) if !w.is_empty() => format!("{} ({})", kind, w),
        _ => kind.to_string(),
    }
}

fn pick_tag(item: &DetectedEquipment, listed: Option<&String>, index: usize) -> String {
    let candidates = [Some(item.suggested_asset_tag.as_str()), listed.map(String::as_str)];
    for raw in candidates.into_iter().flatten() {
        let tag = normalize_asset_tag(raw);
        if validate_asset_tag(&tag).is_ok() {
            return tag;
        }
    }
    fallback_tag(equipment_type(item), index)
}

/// `GYM-<種別の先頭12文字>-<連番3桁>`
fn fallback_tag(kind: &str, index: usize) -> String {
    let mut stem = normalize_asset_tag(kind);
    stem.truncate(12);
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { "ITEM" } else { stem };
    format!("GYM-{}-{:03}", stem, index + 1)
}
