pub mod cache;
mod client;
mod poller;

pub use cache::{compute_hash, CacheFile};
pub use client::{AnalysisBackend, HttpAnalysisClient, UploadImage};
pub use poller::{
    FailureReason, JobPoller, NoopObserver, PollEvent, PollObserver, PollOutcome, PollPolicy,
};

use crate::error::Result;
use gym_asset_common::JobStatus;
use tokio_util::sync::CancellationToken;

/// 1回の解析（送信＋ポーリング）の結果
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRun {
    pub job_id: String,
    pub outcome: PollOutcome,
}

/// 画像を送信し、終了状態までポーリング
///
/// 送信自体の失敗は `Err`、送信後の失敗は `PollOutcome::Failed` で返す。
pub async fn analyze_image<B: AnalysisBackend + ?Sized>(
    backend: &B,
    image: &UploadImage,
    policy: PollPolicy,
    cancel: CancellationToken,
    observer: &dyn PollObserver,
) -> Result<AnalysisRun> {
    let submitted = backend.submit_image(image).await?;
    tracing::info!(job_id = %submitted.job_id, status = %submitted.status, "image submitted");

    // 受付時点で失敗していればポーリングしない
    if submitted.status == JobStatus::Failed {
        let message = if submitted.message.trim().is_empty() {
            "解析に失敗しました".to_string()
        } else {
            submitted.message.clone()
        };
        let reason = FailureReason::Remote(message);
        observer.on_event(&PollEvent::Failed(reason.clone()));
        return Ok(AnalysisRun {
            job_id: submitted.job_id,
            outcome: PollOutcome::Failed(reason),
        });
    }

    let outcome = JobPoller::new(backend, policy)
        .with_cancellation(cancel)
        .run(&submitted.job_id, observer)
        .await;

    Ok(AnalysisRun {
        job_id: submitted.job_id,
        outcome,
    })
}
