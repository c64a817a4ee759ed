//! CSV生成（RFC 4180形式、改行はCRLF）

use super::{asset_row, ASSET_COLUMNS};
use crate::asset::Asset;

/// フィールドをクォート
///
/// カンマ・ダブルクォート・改行を含む場合のみ `"` で囲み、`"` は二重化する。
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_line(out: &mut String, fields: &[String]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// 資産一覧をCSV文字列に変換（ヘッダー行付き）
pub fn assets_to_csv<'a, I>(assets: I) -> String
where
    I: IntoIterator<Item = &'a Asset>,
{
    let mut out = String::new();
    let header: Vec<String> = ASSET_COLUMNS.iter().map(|c| c.to_string()).collect();
    write_line(&mut out, &header);

    for asset in assets {
        write_line(&mut out, &asset_row(asset));
    }
    out
}
