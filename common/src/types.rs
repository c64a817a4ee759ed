//! 解析バックエンドとの送受信型
//!
//! - SubmitResponse: 画像送信時の応答
//! - JobStatusResponse: ジョブ状態照会の応答
//! - AnalysisPayload: 解析完了時の結果本体

use serde::{Deserialize, Deserializer, Serialize};

/// ジョブ状態（バックエンド側の値）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// 進捗表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "待機中",
            JobStatus::Processing => "解析中",
            JobStatus::Completed => "完了",
            JobStatus::Failed => "失敗",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 画像送信の応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub message: String,
}

/// ジョブ状態照会の応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<AnalysisPayload>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    /// 処理時間（バックエンド計測値）
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// 解析結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisPayload {
    pub asset_tags: Vec<String>,
    pub equipment: Vec<DetectedEquipment>,
    /// バックエンド側の画質評価（形式はバックエンド依存）
    pub image_quality: serde_json::Value,
    pub total_items: u32,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
}

/// 検出された機器
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectedEquipment {
    #[serde(rename = "type")]
    pub equipment_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub weight: Option<String>,
    pub description: String,
    pub condition: String,
    pub suggested_asset_tag: String,
    /// 画像内の位置（形式はバックエンド依存）
    pub location_in_image: serde_json::Value,
}

/// `"20kg"` と `20` の両方を受け付ける
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
