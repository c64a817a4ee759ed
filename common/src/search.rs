//! 資産の検索・絞り込み

use crate::asset::{Asset, AssetStatus, EquipmentCondition};

/// 検索条件（None は条件なし）
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// タグ・名称・種別・設置場所・メモの部分一致（大文字小文字を区別しない）
    pub query: Option<String>,
    pub status: Option<AssetStatus>,
    pub condition: Option<EquipmentCondition>,
    /// 種別の完全一致（大文字小文字を区別しない）
    pub equipment_type: Option<String>,
}

impl AssetFilter {
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            query: Some(q.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.as_deref().map_or(true, |q| q.trim().is_empty())
            && self.status.is_none()
            && self.condition.is_none()
            && self.equipment_type.is_none()
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(status) = self.status {
            if asset.status != status {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if asset.condition != condition {
                return false;
            }
        }
        if let Some(t) = &self.equipment_type {
            if !asset.equipment_type.eq_ignore_ascii_case(t.trim()) {
                return false;
            }
        }
        if let Some(q) = &self.query {
            let q = q.trim().to_lowercase();
            if !q.is_empty() {
                let hit = [
                    asset.asset_tag.as_str(),
                    asset.name.as_str(),
                    asset.equipment_type.as_str(),
                    asset.location.as_str(),
                    asset.notes.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&q));
                if !hit {
                    return false;
                }
            }
        }
        true
    }

    /// 条件に一致する資産を元の順序のまま返す
    pub fn apply<'a>(&self, assets: &'a [Asset]) -> Vec<&'a Asset> {
        assets.iter().filter(|a| self.matches(a)).collect()
    }
}
