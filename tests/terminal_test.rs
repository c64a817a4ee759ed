//! スピナー・Ctrl-C の扱いのテスト

use gym_asset_ai::terminal::{with_spinner, CtrlCHandler, Interrupt};
use indicatif::ProgressBar;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_spinner_cleared_on_error() {
    let spinner = ProgressBar::hidden();
    let result: Result<(), String> = with_spinner(&spinner, async { Err("送信失敗".to_string()) }).await;

    assert_eq!(result, Err("送信失敗".to_string()));
    assert!(spinner.is_finished());
}

#[tokio::test]
async fn test_spinner_cleared_on_success() {
    let spinner = ProgressBar::hidden();
    let value = with_spinner(&spinner, async { 42 }).await;

    assert_eq!(value, 42);
    assert!(spinner.is_finished());
}

/// ポーリング中の最初の Ctrl-C はキャンセル、2回目は終了
#[test]
fn test_first_ctrl_c_cancels_then_exits() {
    let cancel = CancellationToken::new();
    let handler = CtrlCHandler::new(cancel.clone());
    assert!(handler.is_armed());

    assert_eq!(handler.interrupt(), Interrupt::Cancel);
    assert!(cancel.is_cancelled());
    assert!(!handler.is_armed());

    assert_eq!(handler.interrupt(), Interrupt::Exit);
}

/// ポーリング終了後の Ctrl-C はトークンに触れず終了
#[test]
fn test_ctrl_c_after_disarm_exits() {
    let cancel = CancellationToken::new();
    let handler = CtrlCHandler::new(cancel.clone());
    handler.disarm();

    assert_eq!(handler.interrupt(), Interrupt::Exit);
    assert!(!cancel.is_cancelled());
}

/// 他の経路で既にキャンセル済みなら終了
#[test]
fn test_ctrl_c_after_cancel_exits() {
    let cancel = CancellationToken::new();
    let handler = CtrlCHandler::new(cancel.clone());
    cancel.cancel();

    assert_eq!(handler.interrupt(), Interrupt::Exit);
}

/// クローンは同じ状態を共有する
#[test]
fn test_disarm_shared_with_listener_clone() {
    let handler = CtrlCHandler::new(CancellationToken::new());
    let listener = handler.clone();
    handler.disarm();

    assert!(!listener.is_armed());
    assert_eq!(listener.interrupt(), Interrupt::Exit);
}
