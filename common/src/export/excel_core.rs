//! Excel生成（共通ライブラリ）
//!
//! 資産台帳を1シートの一覧表として出力する

use super::{asset_row, ASSET_COLUMNS};
use crate::asset::Asset;
use rust_xlsxwriter::*;

/// 列幅（文字数）
const COLUMN_WIDTHS: [f64; 12] = [16.0, 28.0, 16.0, 18.0, 12.0, 12.0, 10.0, 40.0, 28.0, 24.0, 26.0, 26.0];

/// Excelをバッファに生成
///
/// # Arguments
/// * `assets` - 出力する資産
/// * `sheet_name` - シート名（31文字まで）
pub fn generate_asset_workbook<'a, I>(assets: I, sheet_name: &str) -> Result<Vec<u8>, String>
where
    I: IntoIterator<Item = &'a Asset>,
{
    let mut workbook = Workbook::new();

    // フォーマット定義
    let header_format = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xE8EEF4))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_font_size(10.0)
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let attention_format = value_format
        .clone()
        .set_font_color(Color::RGB(0xB00020))
        .set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, (title, width)) in ASSET_COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet
            .write_string_with_format(0, col, *title, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    let mut last_row: u32 = 0;
    for (i, asset) in assets.into_iter().enumerate() {
        let row = i as u32 + 1;
        last_row = row;
        // 要対応の資産はタグを強調
        for (col, value) in asset_row(asset).iter().enumerate() {
            let format = if col == 0 && asset.needs_attention() {
                &attention_format
            } else {
                &value_format
            };
            worksheet
                .write_string_with_format(row, col as u16, value, format)
                .map_err(|e| format!("セル書き込みエラー: {}", e))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;
    worksheet
        .autofilter(0, 0, last_row, (ASSET_COLUMNS.len() - 1) as u16)
        .map_err(|e| format!("フィルタ設定エラー: {}", e))?;

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
