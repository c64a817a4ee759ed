//! Export core modules shared by the CLI wrappers.
//!
//! 列定義は CSV / Excel で共通。

pub mod csv_core;

#[cfg(feature = "excel")]
pub mod excel_core;

use crate::asset::Asset;

/// 出力列（ヘッダー名）
pub const ASSET_COLUMNS: [&str; 12] = [
    "assetTag",
    "name",
    "equipmentType",
    "location",
    "condition",
    "status",
    "weight",
    "notes",
    "imagePath",
    "sourceJobId",
    "createdAt",
    "updatedAt",
];

/// 資産を1行分の文字列に変換（ASSET_COLUMNS の順）
pub fn asset_row(asset: &Asset) -> [String; 12] {
    [
        asset.asset_tag.clone(),
        asset.name.clone(),
        asset.equipment_type.clone(),
        asset.location.clone(),
        asset.condition.to_string(),
        asset.status.to_string(),
        asset.weight.clone().unwrap_or_default(),
        asset.notes.clone(),
        asset.image_path.clone().unwrap_or_default(),
        asset.source_job_id.clone().unwrap_or_default(),
        asset.created_at.to_rfc3339(),
        asset.updated_at.to_rfc3339(),
    ]
}
