//! 資産台帳の型定義
//!
//! - Asset: 管理対象の機器
//! - AssetDraft / AssetUpdate: 登録・更新フォームの入力
//! - AuditLog: 変更履歴
//! - StoredAnalysisResult: 保存済みの解析結果

use crate::error::{Error, Result};
use crate::quality::ImageQualityMetrics;
use crate::types::AnalysisPayload;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

lazy_static! {
    static ref ASSET_TAG_RE: Regex = Regex::new(r"^[A-Z0-9][A-Z0-9-]{2,31}$").unwrap();
    static ref TAG_SEPARATOR_RE: Regex = Regex::new(r"[^A-Z0-9]+").unwrap();
}

/// 機器の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCondition {
    Excellent,
    Good,
    #[default]
    Fair,
    Poor,
    NeedsRepair,
}

impl EquipmentCondition {
    pub const ALL: [EquipmentCondition; 5] = [
        EquipmentCondition::Excellent,
        EquipmentCondition::Good,
        EquipmentCondition::Fair,
        EquipmentCondition::Poor,
        EquipmentCondition::NeedsRepair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCondition::Excellent => "excellent",
            EquipmentCondition::Good => "good",
            EquipmentCondition::Fair => "fair",
            EquipmentCondition::Poor => "poor",
            EquipmentCondition::NeedsRepair => "needs_repair",
        }
    }

    /// バックエンドの自由記述を寛容に解釈（不明な値は fair）
    pub fn from_lenient(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "excellent" | "new" | "like_new" => EquipmentCondition::Excellent,
            "good" => EquipmentCondition::Good,
            "poor" | "damaged" | "worn_out" => EquipmentCondition::Poor,
            "needs_repair" | "repair" | "broken" | "needs_maintenance" => EquipmentCondition::NeedsRepair,
            _ => EquipmentCondition::Fair,
        }
    }

    /// 要対応とみなす状態か
    pub fn needs_attention(&self) -> bool {
        matches!(self, EquipmentCondition::Poor | EquipmentCondition::NeedsRepair)
    }
}

impl std::str::FromStr for EquipmentCondition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "excellent" => Ok(EquipmentCondition::Excellent),
            "good" => Ok(EquipmentCondition::Good),
            "fair" => Ok(EquipmentCondition::Fair),
            "poor" => Ok(EquipmentCondition::Poor),
            "needs_repair" | "repair" => Ok(EquipmentCondition::NeedsRepair),
            _ => Err(format!(
                "Unknown condition: {}. Use excellent, good, fair, poor, or needs_repair",
                s
            )),
        }
    }
}

impl std::fmt::Display for EquipmentCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// 運用状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    #[default]
    Active,
    Maintenance,
    Retired,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "active",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::Retired => "retired",
        }
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AssetStatus::Active),
            "maintenance" => Ok(AssetStatus::Maintenance),
            "retired" => Ok(AssetStatus::Retired),
            _ => Err(format!("Unknown status: {}. Use active, maintenance, or retired", s)),
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// 管理対象の機器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub asset_tag: String,
    pub name: String,
    pub equipment_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub condition: EquipmentCondition,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// 登録元の画像
    #[serde(default)]
    pub image_path: Option<String>,
    /// 登録元の解析ジョブ
    #[serde(default)]
    pub source_job_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn needs_attention(&self) -> bool {
        self.condition.needs_attention() || self.status == AssetStatus::Maintenance
    }
}

/// 登録フォームの入力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetDraft {
    pub asset_tag: String,
    pub name: String,
    pub equipment_type: String,
    pub location: String,
    pub condition: EquipmentCondition,
    pub status: AssetStatus,
    pub weight: Option<String>,
    pub notes: String,
    pub image_path: Option<String>,
    pub source_job_id: Option<String>,
}

impl AssetDraft {
    /// 入力チェック（タグは正規化済みであること）
    pub fn validate(&self) -> Result<()> {
        validate_asset_tag(&self.asset_tag)?;
        if self.name.trim().is_empty() {
            return Err(Error::Validation("名称が空です".into()));
        }
        if self.equipment_type.trim().is_empty() {
            return Err(Error::Validation("機器種別が空です".into()));
        }
        Ok(())
    }

    pub fn into_asset(self, now: DateTime<Utc>) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            asset_tag: self.asset_tag,
            name: self.name.trim().to_string(),
            equipment_type: self.equipment_type.trim().to_string(),
            location: self.location.trim().to_string(),
            condition: self.condition,
            status: self.status,
            weight: self.weight.filter(|w| !w.trim().is_empty()),
            notes: self.notes,
            image_path: self.image_path,
            source_job_id: self.source_job_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 更新フォームの入力（None は変更なし）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub equipment_type: Option<String>,
    pub location: Option<String>,
    pub condition: Option<EquipmentCondition>,
    pub status: Option<AssetStatus>,
    pub weight: Option<String>,
    pub notes: Option<String>,
}

impl AssetUpdate {
    pub fn is_empty(&self) -> bool {
        *self == AssetUpdate::default()
    }

    pub fn validate(&self) -> Result<()> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(Error::Validation("名称が空です".into()));
        }
        if matches!(&self.equipment_type, Some(t) if t.trim().is_empty()) {
            return Err(Error::Validation("機器種別が空です".into()));
        }
        Ok(())
    }

    /// 変更を適用し、変更のあった項目を "項目: 旧 → 新" 形式で返す
    pub fn apply(&self, asset: &mut Asset, now: DateTime<Utc>) -> Vec<String> {
        let mut changes = Vec::new();

        fn set_text(field: &str, target: &mut String, value: &Option<String>, changes: &mut Vec<String>) {
            if let Some(v) = value {
                let v = v.trim();
                if target.as_str() != v {
                    changes.push(format!("{}: {} → {}", field, target, v));
                    *target = v.to_string();
                }
            }
        }

        set_text("name", &mut asset.name, &self.name, &mut changes);
        set_text("equipmentType", &mut asset.equipment_type, &self.equipment_type, &mut changes);
        set_text("location", &mut asset.location, &self.location, &mut changes);
        set_text("notes", &mut asset.notes, &self.notes, &mut changes);

        if let Some(c) = self.condition {
            if asset.condition != c {
                changes.push(format!("condition: {} → {}", asset.condition, c));
                asset.condition = c;
            }
        }
        if let Some(s) = self.status {
            if asset.status != s {
                changes.push(format!("status: {} → {}", asset.status, s));
                asset.status = s;
            }
        }
        if let Some(w) = &self.weight {
            let new = Some(w.trim().to_string()).filter(|w| !w.is_empty());
            if asset.weight != new {
                changes.push(format!(
                    "weight: {} → {}",
                    asset.weight.as_deref().unwrap_or("-"),
                    new.as_deref().unwrap_or("-")
                ));
                asset.weight = new;
            }
        }

        if !changes.is_empty() {
            asset.updated_at = now;
        }
        changes
    }
}

/// 変更操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        })
    }
}

/// 変更履歴
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub asset_tag: String,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: String,
}

impl AuditLog {
    pub fn new(asset: &Asset, action: AuditAction, details: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id: asset.id,
            asset_tag: asset.asset_tag.clone(),
            action,
            timestamp: now,
            details: details.into(),
        }
    }
}

/// 保存済みの解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysisResult {
    pub job_id: String,
    pub image_file: String,
    /// アップロード画像のSHA-256（hex）
    #[serde(default)]
    pub image_hash: String,
    #[serde(default)]
    pub image_quality: Option<ImageQualityMetrics>,
    pub analyzed_at: DateTime<Utc>,
    pub payload: AnalysisPayload,
}

/// 資産タグを正規化（大文字化、英数字以外は `-` に置換）
///
/// ```
/// use gym_asset_common::normalize_asset_tag;
///
/// assert_eq!(normalize_asset_tag(" gym db_001 "), "GYM-DB-001");
/// ```
pub fn normalize_asset_tag(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    TAG_SEPARATOR_RE
        .replace_all(&upper, "-")
        .trim_matches('-')
        .to_string()
}

/// 資産タグの形式チェック
pub fn validate_asset_tag(tag: &str) -> Result<()> {
    if ASSET_TAG_RE.is_match(tag) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "資産タグの形式が不正です: '{}'（英大文字・数字・ハイフン 3〜32文字）",
            tag
        )))
    }
}
