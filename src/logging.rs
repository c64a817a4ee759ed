//! ログ初期化
//!
//! 診断ログは tracing で stderr に出力する。画面表示は println! のまま。

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` があればそれを使用、なければ verbose に応じて debug / warn
pub fn init(verbose: bool) {
    let default_level = if verbose { "gym_asset_ai=debug,gym_asset_common=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // テストなどで二重初期化された場合は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
