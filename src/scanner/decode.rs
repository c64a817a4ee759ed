//! 画像の読み込み・縮小・アップロード用エンコード
//!
//! 品質判定は縮小後のピクセルに対して行う（送信される画像と同じもの）。

use crate::error::{GymAssetError, Result};
use gym_asset_common::ImageQualityMetrics;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// 判定・送信の準備ができた画像
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub file_name: String,
    /// 元画像のサイズ
    pub original_size: (u32, u32),
    /// 縮小後のRGBAピクセル
    pub rgba: RgbaImage,
    /// アップロード用JPEG
    pub jpeg: Vec<u8>,
}

impl PreparedImage {
    pub fn was_resized(&self) -> bool {
        self.original_size != self.rgba.dimensions()
    }

    /// 縮小後の画像で品質判定（3x3未満はエラー）
    pub fn assess(&self) -> Result<ImageQualityMetrics> {
        let (width, height) = self.rgba.dimensions();
        Ok(gym_asset_common::assess(self.rgba.as_raw(), width, height)?)
    }
}

/// 画像を読み込んで縮小し、RGBAバッファとJPEGを作成
///
/// # Arguments
/// * `max_dimension` - 長辺の上限（超える場合のみ縦横比を保って縮小）
/// * `jpeg_quality` - JPEG品質 (1-100)
pub fn prepare_image(path: &Path, max_dimension: u32, jpeg_quality: u8) -> Result<PreparedImage> {
    if !path.exists() {
        return Err(GymAssetError::FileNotFound(path.display().to_string()));
    }

    let img = image::open(path)
        .map_err(|e| GymAssetError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let original_size = (img.width(), img.height());
    let img = downscale(img, max_dimension);

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, jpeg_quality.clamp(1, 100))
        .encode_image(&img.to_rgb8())
        .map_err(|e| GymAssetError::ImageLoad(format!("JPEGエンコードエラー: {}", e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image.jpg".to_string());

    tracing::debug!(
        file = %file_name,
        original = ?original_size,
        resized = ?(width, height),
        jpeg_bytes = jpeg.len(),
        "image prepared"
    );

    Ok(PreparedImage {
        file_name,
        original_size,
        rgba,
        jpeg,
    })
}

fn downscale(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if max_dimension == 0 || (img.width() <= max_dimension && img.height() <= max_dimension) {
        return img;
    }
    // resize は縦横比を保って枠内に収める
    img.resize(max_dimension, max_dimension, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_downscale_keeps_aspect() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(400, 200));
        let small = downscale(img, 100);
        assert_eq!((small.width(), small.height()), (100, 50));
    }

    #[test]
    fn test_downscale_noop_when_small() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 40, Rgb([1, 2, 3])));
        let same = downscale(img, 100);
        assert_eq!((same.width(), same.height()), (50, 40));
    }

    #[test]
    fn test_prepare_missing_file() {
        let result = prepare_image(Path::new("/nonexistent/x.jpg"), 100, 85);
        assert!(matches!(result, Err(GymAssetError::FileNotFound(_))));
    }
}
