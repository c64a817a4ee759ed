//! 資産サマリーレポート

use crate::asset::{Asset, AssetStatus, EquipmentCondition};
use serde::Serialize;
use std::collections::BTreeMap;

/// 集計結果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReport {
    pub total: usize,
    pub by_status: BTreeMap<AssetStatus, usize>,
    pub by_condition: BTreeMap<EquipmentCondition, usize>,
    /// 種別ごとの件数（種別は小文字化して集計）
    pub by_type: BTreeMap<String, usize>,
    /// 要対応（状態が poor / needs_repair、またはメンテナンス中）の資産タグ
    pub needs_attention: Vec<String>,
}

impl AssetReport {
    pub fn from_assets<'a, I>(assets: I) -> Self
    where
        I: IntoIterator<Item = &'a Asset>,
    {
        let mut report = AssetReport::default();

        for asset in assets {
            report.total += 1;
            *report.by_status.entry(asset.status).or_default() += 1;
            *report.by_condition.entry(asset.condition).or_default() += 1;
            *report
                .by_type
                .entry(asset.equipment_type.trim().to_lowercase())
                .or_default() += 1;
            if asset.needs_attention() {
                report.needs_attention.push(asset.asset_tag.clone());
            }
        }

        report.needs_attention.sort();
        report
    }

    /// 稼働中の割合（0.0〜1.0、資産なしは0.0）
    pub fn active_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.by_status.get(&AssetStatus::Active).copied().unwrap_or(0) as f64 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetDraft;
    use chrono::Utc;

    fn asset(tag: &str, kind: &str, condition: EquipmentCondition, status: AssetStatus) -> Asset {
        AssetDraft {
            asset_tag: tag.into(),
            name: tag.into(),
            equipment_type: kind.into(),
            condition,
            status,
            ..Default::default()
        }
        .into_asset(Utc::now())
    }

    #[test]
    fn test_report_counts() {
        let assets = vec![
            asset("GYM-003", "Cardio", EquipmentCondition::Good, AssetStatus::Active),
            asset("GYM-001", "cardio", EquipmentCondition::NeedsRepair, AssetStatus::Active),
            asset("GYM-002", "bench", EquipmentCondition::Good, AssetStatus::Maintenance),
            asset("GYM-004", "rack", EquipmentCondition::Excellent, AssetStatus::Retired),
        ];
        let report = AssetReport::from_assets(&assets);

        assert_eq!(report.total, 4);
        assert_eq!(report.by_status[&AssetStatus::Active], 2);
        assert_eq!(report.by_status[&AssetStatus::Maintenance], 1);
        assert_eq!(report.by_condition[&EquipmentCondition::Good], 2);
        assert_eq!(report.by_type["cardio"], 2);
        assert_eq!(report.needs_attention, vec!["GYM-001", "GYM-002"]);
        assert_eq!(report.active_ratio(), 0.5);
    }

    #[test]
    fn test_empty_report() {
        let assets: Vec<Asset> = Vec::new();
        let report = AssetReport::from_assets(&assets);
        assert_eq!(report.total, 0);
        assert!(report.needs_attention.is_empty());
        assert_eq!(report.active_ratio(), 0.0);
    }
}
