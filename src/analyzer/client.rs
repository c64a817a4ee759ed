//! 解析バックエンド連携
//!
//! - POST {base}/api/analysis         画像送信（multipart, フィールド名 `image`）
//! - GET  {base}/api/analysis/{jobId}  ジョブ状態照会

use crate::error::{GymAssetError, Result};
use async_trait::async_trait;
use gym_asset_common::{parse_status_response, parse_submit_response, JobStatusResponse, SubmitResponse};
use reqwest::multipart::{Form, Part};
use reqwest::Url;

const ANALYSIS_PATH: [&str; 2] = ["api", "analysis"];

/// エラー応答ボディの最大表示長
const ERROR_BODY_LIMIT: usize = 300;

/// 送信する画像
#[derive(Debug, Clone)]
pub struct UploadImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadImage {
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: "image/jpeg".into(),
            bytes,
        }
    }
}

/// 解析バックエンド
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// 画像を送信してジョブを作成
    async fn submit_image(&self, image: &UploadImage) -> Result<SubmitResponse>;

    /// ジョブ状態を1回照会
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse>;
}

/// HTTP版バックエンド
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpAnalysisClient {
    /// ベースURLは http/https のみ受け付ける
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| GymAssetError::Config(format!("APIのURLが不正です ({}): {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(GymAssetError::Config(format!(
                "APIのURLは http または https で指定してください: {}",
                base_url
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: parsed,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// ベースURLにパスセグメントを追加（各セグメントはパーセントエンコード）
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| GymAssetError::Config(format!("APIのURLが不正です: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

/// 2xx以外はボディ付きでエラーにする
async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        return Err(GymAssetError::ApiStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisClient {
    async fn submit_image(&self, image: &UploadImage) -> Result<SubmitResponse> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        let form = Form::new().part("image", part);

        let url = self.endpoint(&ANALYSIS_PATH)?;
        tracing::debug!(%url, bytes = image.bytes.len(), "submitting image");

        let response = self.authorize(self.client.post(url)).multipart(form).send().await?;
        let body = read_body(response).await?;

        parse_submit_response(&body).map_err(|e| GymAssetError::ApiParse(e.to_string()))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        // "." や ".." はセグメントとして送れないため弾く
        if matches!(job_id.trim(), "" | "." | "..") {
            return Err(GymAssetError::InvalidJobId(job_id.to_string()));
        }
        let [api, analysis] = ANALYSIS_PATH;
        let url = self.endpoint(&[api, analysis, job_id])?;
        let response = self.authorize(self.client.get(url)).send().await?;
        let body = read_body(response).await?;

        parse_status_response(&body).map_err(|e| GymAssetError::ApiParse(e.to_string()))
    }
}
