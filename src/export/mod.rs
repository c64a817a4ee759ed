//! 資産一覧のファイル出力（CSV / JSON / Excel）

use crate::cli::ExportFormat;
use crate::error::{GymAssetError, Result};
use gym_asset_common::export::{csv_core, excel_core};
use gym_asset_common::Asset;
use std::path::{Path, PathBuf};

pub const DEFAULT_TITLE: &str = "資産台帳";

/// 出力先がディレクトリ（または拡張子なし）なら `title.ext` を付ける
pub fn output_path_for_format(output: &Path, title: &str, format: ExportFormat) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, format.extension()))
    } else {
        output.to_path_buf()
    }
}

/// 資産一覧を書き出し、書き込んだパスを返す
pub fn export_assets(
    assets: &[&Asset],
    format: ExportFormat,
    output: &Path,
    title: &str,
) -> Result<PathBuf> {
    let output_path = output_path_for_format(output, title, format);
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let bytes = render(assets, format, title)?;
    std::fs::write(&output_path, bytes)?;

    tracing::info!(path = %output_path.display(), count = assets.len(), format = %format, "assets exported");
    Ok(output_path)
}

/// 形式ごとのバイト列を生成
pub fn render(assets: &[&Asset], format: ExportFormat, title: &str) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => Ok(csv_core::assets_to_csv(assets.iter().copied()).into_bytes()),
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(assets)?;
            Ok(json.into_bytes())
        }
        ExportFormat::Excel => excel_core::generate_asset_workbook(assets.iter().copied(), title)
            .map_err(GymAssetError::ExcelGeneration),
    }
}
