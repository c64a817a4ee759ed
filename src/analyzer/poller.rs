//! 解析ジョブのポーリング
//!
//! 状態遷移:
//! - Pending（送信直後、初回照会前）
//! - Pending / Processing → 次の照会を1回だけ予約（interval後）
//! - Completed / Failed で終了。照会回数が上限に達したら TimedOut で失敗
//!
//! 通信エラーは再試行せず即失敗。キャンセル後は照会もイベント通知も行わない。

use super::client::AnalysisBackend;
use gym_asset_common::{AnalysisPayload, JobStatus};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 照会間隔と照会回数の上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// 失敗理由（そのまま画面表示できる文言を持つ）
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// バックエンドが failed を返した
    Remote(String),
    /// 通信エラー・HTTPエラー
    Transport(String),
    /// 照会回数の上限に達した
    TimedOut { attempts: u32 },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Remote(msg) => write!(f, "{}", msg),
            FailureReason::Transport(msg) => write!(f, "{}", msg),
            FailureReason::TimedOut { attempts } => {
                write!(f, "解析がタイムアウトしました（{}回照会）", attempts)
            }
        }
    }
}

/// 画面に通知するイベント
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// 未完了の状態（attempt 0 は送信直後）
    Status { attempt: u32, status: JobStatus },
    Completed(AnalysisPayload),
    Failed(FailureReason),
}

/// ポーリング結果
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(AnalysisPayload),
    Failed(FailureReason),
    Cancelled,
}

impl PollOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollOutcome::Cancelled)
    }
}

/// イベントの受け取り口
pub trait PollObserver: Send + Sync {
    fn on_event(&self, event: &PollEvent);
}

impl<F> PollObserver for F
where
    F: Fn(&PollEvent) + Send + Sync,
{
    fn on_event(&self, event: &PollEvent) {
        self(event)
    }
}

/// 何もしない受け取り口
pub struct NoopObserver;

impl PollObserver for NoopObserver {
    fn on_event(&self, _event: &PollEvent) {}
}

/// 1ジョブ分のポーリングを行う
pub struct JobPoller<'a, B: AnalysisBackend + ?Sized> {
    backend: &'a B,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a, B: AnalysisBackend + ?Sized> JobPoller<'a, B> {
    pub fn new(backend: &'a B, policy: PollPolicy) -> Self {
        Self {
            backend,
            policy,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 終了状態またはキャンセルまでポーリング
    pub async fn run(&self, job_id: &str, observer: &dyn PollObserver) -> PollOutcome {
        if self.cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        observer.on_event(&PollEvent::Status {
            attempt: 0,
            status: JobStatus::Pending,
        });

        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return self.cancelled(job_id, attempt - 1),
                r = self.backend.job_status(job_id) => r,
            };
            if self.cancel.is_cancelled() {
                return self.cancelled(job_id, attempt);
            }

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(job_id, attempt, error = %e, "status check failed");
                    return self.fail(job_id, observer, FailureReason::Transport(e.to_string()));
                }
            };
            tracing::debug!(job_id, attempt, status = %response.status, "status checked");

            match response.status {
                JobStatus::Completed => {
                    return match response.result {
                        Some(result) => {
                            tracing::info!(job_id, attempt, items = result.total_items, "analysis completed");
                            observer.on_event(&PollEvent::Completed(result.clone()));
                            PollOutcome::Completed(result)
                        }
                        None => self.fail(
                            job_id,
                            observer,
                            FailureReason::Remote("解析は完了しましたが結果がありません".into()),
                        ),
                    };
                }
                JobStatus::Failed => {
                    let message = response
                        .error_message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| "解析に失敗しました".into());
                    return self.fail(job_id, observer, FailureReason::Remote(message));
                }
                status @ (JobStatus::Pending | JobStatus::Processing) => {
                    observer.on_event(&PollEvent::Status { attempt, status });

                    if attempt < max_attempts {
                        tokio::select! {
                            biased;
                            _ = self.cancel.cancelled() => return self.cancelled(job_id, attempt),
                            _ = tokio::time::sleep(self.policy.interval) => {}
                        }
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            return self.cancelled(job_id, max_attempts);
        }
        self.fail(job_id, observer, FailureReason::TimedOut { attempts: max_attempts })
    }

    fn fail(&self, job_id: &str, observer: &dyn PollObserver, reason: FailureReason) -> PollOutcome {
        tracing::info!(job_id, reason = %reason, "analysis failed");
        observer.on_event(&PollEvent::Failed(reason.clone()));
        PollOutcome::Failed(reason)
    }

    fn cancelled(&self, job_id: &str, checks: u32) -> PollOutcome {
        tracing::info!(job_id, checks, "polling cancelled");
        PollOutcome::Cancelled
    }
}
