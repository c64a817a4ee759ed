//! APIレスポンスパーサー
//!
//! 解析バックエンドの応答ボディをパースする

use crate::error::{Error, Result};
use crate::types::{JobStatusResponse, SubmitResponse};
use serde::de::DeserializeOwned;

/// 応答ボディをパース
///
/// 空ボディはエラー。パース失敗時は先頭200文字をエラーに含める。
fn parse_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(Error::Parse(format!("{}: 応答ボディが空です", what)));
    }

    serde_json::from_str(trimmed).map_err(|e| {
        let preview: String = trimmed.chars().take(200).collect();
        Error::Parse(format!("{} JSONパースエラー: {} ({})", what, e, preview))
    })
}

/// 画像送信の応答をパース
///
/// # Examples
/// ```
/// use gym_asset_common::parse_submit_response;
///
/// let body = r#"{"jobId": "job-1", "status": "pending", "message": "accepted"}"#;
/// let resp = parse_submit_response(body).unwrap();
/// assert_eq!(resp.job_id, "job-1");
/// ```
pub fn parse_submit_response(body: &str) -> Result<SubmitResponse> {
    let resp: SubmitResponse = parse_body(body, "送信応答")?;
    if resp.job_id.trim().is_empty() {
        return Err(Error::Parse("送信応答: jobIdが空です".into()));
    }
    Ok(resp)
}

/// ジョブ状態照会の応答をパース
pub fn parse_status_response(body: &str) -> Result<JobStatusResponse> {
    parse_body(body, "状態応答")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobStatus;

    #[test]
    fn test_parse_submit_response() {
        let body = r#"{"jobId": "abc-123", "status": "pending", "message": "Image queued"}"#;
        let resp = parse_submit_response(body).unwrap();
        assert_eq!(resp.job_id, "abc-123");
        assert_eq!(resp.status, JobStatus::Pending);
        assert_eq!(resp.message, "Image queued");
    }

    #[test]
    fn test_parse_submit_response_empty_job_id() {
        let body = r#"{"jobId": "  ", "status": "pending"}"#;
        assert!(matches!(parse_submit_response(body), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_empty_body() {
        let err = parse_status_response("   ").unwrap_err();
        assert!(format!("{}", err).contains("空"));
    }

    #[test]
    fn test_parse_status_completed() {
        let body = r#"{
            "id": "abc-123",
            "status": "completed",
            "confidenceScore": 0.91,
            "processingTime": 4.2,
            "createdAt": "2026-01-10T10:00:00Z",
            "completedAt": "2026-01-10T10:00:04Z",
            "result": {
                "assetTags": ["GYM-DB-001"],
                "equipment": [{
                    "type": "Dumbbell",
                    "weight": "20kg",
                    "description": "Hex dumbbell",
                    "condition": "good",
                    "suggestedAssetTag": "GYM-DB-001",
                    "locationInImage": "center"
                }],
                "imageQuality": "good",
                "totalItems": 1,
                "recommendations": ["Store on rack"],
                "confidenceScore": 0.91
            }
        }"#;
        let resp = parse_status_response(body).unwrap();
        assert_eq!(resp.status, JobStatus::Completed);
        let result = resp.result.expect("result missing");
        assert_eq!(result.total_items, 1);
        assert_eq!(result.equipment[0].equipment_type, "Dumbbell");
        assert_eq!(result.equipment[0].suggested_asset_tag, "GYM-DB-001");
        assert_eq!(result.image_quality, serde_json::json!("good"));
    }

    #[test]
    fn test_parse_status_failed() {
        let body = r#"{"id": "x", "status": "failed", "errorMessage": "No equipment detected"}"#;
        let resp = parse_status_response(body).unwrap();
        assert_eq!(resp.status, JobStatus::Failed);
        assert_eq!(resp.error_message.as_deref(), Some("No equipment detected"));
        assert!(resp.result.is_none());
    }

    #[test]
    fn test_parse_status_unknown_status() {
        let body = r#"{"id": "x", "status": "exploded"}"#;
        assert!(matches!(parse_status_response(body), Err(Error::Parse(_))));
    }
}
