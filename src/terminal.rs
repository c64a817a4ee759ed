//! 端末まわりの補助（ポーリング中のスピナーと Ctrl-C）

use indicatif::ProgressBar;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Ctrl-C で終了した時の終了コード
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// 処理の成否にかかわらず、終わったらスピナーを消す
pub async fn with_spinner<F: Future>(spinner: &ProgressBar, fut: F) -> F::Output {
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

/// Ctrl-C を受けた時の動作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// ポーリングを中止
    Cancel,
    /// プロセスを終了
    Exit,
}

/// ポーリング中の Ctrl-C をキャンセルに変換する
///
/// 有効な間の最初の1回だけトークンをキャンセルし、
/// `disarm` の後や2回目以降はプロセスを終了させる。
#[derive(Debug, Clone)]
pub struct CtrlCHandler {
    cancel: CancellationToken,
    armed: Arc<AtomicBool>,
}

impl CtrlCHandler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            armed: Arc::new(AtomicBool::new(true)),
        }
    }

    /// シグナル待ちタスクを起動
    ///
    /// tokio は一度登録したシグナルハンドラをプロセス終了まで保持するので、
    /// タスクは止めずに `disarm` で動作を切り替える。
    pub fn spawn(cancel: CancellationToken) -> Self {
        let handler = Self::new(cancel);
        let listener = handler.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if listener.interrupt() == Interrupt::Exit {
                    tracing::debug!("interrupted, exiting");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        });
        handler
    }

    /// ポーリング終了。以降の Ctrl-C はプロセス終了
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Ctrl-C 1回分の処理
    pub fn interrupt(&self) -> Interrupt {
        if self.armed.swap(false, Ordering::SeqCst) && !self.cancel.is_cancelled() {
            tracing::info!("ctrl-c received, cancelling poll");
            self.cancel.cancel();
            Interrupt::Cancel
        } else {
            Interrupt::Exit
        }
    }
}
