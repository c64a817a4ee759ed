//! 画像品質判定
//!
//! RGBAピクセルバッファから明るさ・コントラスト・シャープネスを算出し、
//! 品質ランクと撮影アドバイスを返す。
//!
//! ## 算出方法
//! 1. 輝度 `L = 0.299R + 0.587G + 0.114B`（αは無視）
//! 2. 明るさ = 輝度平均（四捨五入）
//! 3. コントラスト = 輝度の母標準偏差（平均は丸めた明るさを使用）
//! 4. シャープネス = 内側ピクセルのSobel勾配強度の平均（外周1pxは除外）
//! 5. 4項目の点数（各0〜3点）を合計して品質ランクを決定

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 判定に必要な最小の幅・高さ（Sobelの3x3窓のため）
pub const MIN_DIMENSION: u32 = 3;

/// 1920x1080相当
pub const PIXELS_FULL_HD: u64 = 2_073_600;
/// 1280x720相当
pub const PIXELS_HD: u64 = 921_600;
/// 640x480相当
pub const PIXELS_VGA: u64 = 307_200;

/// 照明不足とみなす明るさ
pub const BRIGHTNESS_TOO_DARK: u32 = 80;
/// 照明過多とみなす明るさ
pub const BRIGHTNESS_TOO_BRIGHT: u32 = 220;
/// コントラスト不足とみなす値
pub const CONTRAST_TOO_LOW: u32 = 20;
/// ブレ・ピンボケとみなす値
pub const SHARPNESS_TOO_LOW: u32 = 5;

/// 解像度情報
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    /// メガピクセル（小数2桁）
    pub megapixels: f64,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        let megapixels = (width as f64 * height as f64 / 1_000_000.0 * 100.0).round() / 100.0;
        Self { width, height, megapixels }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// 品質ランク
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityTier {
    /// 合計点（0〜12）からランクを決定
    pub fn from_score(total: u8) -> Self {
        match total {
            10.. => QualityTier::Excellent,
            7..=9 => QualityTier::Good,
            4..=6 => QualityTier::Fair,
            _ => QualityTier::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "excellent",
            QualityTier::Good => "good",
            QualityTier::Fair => "fair",
            QualityTier::Poor => "poor",
        }
    }

    /// 表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "優",
            QualityTier::Good => "良",
            QualityTier::Fair => "可",
            QualityTier::Poor => "不可",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 撮影アドバイス
///
/// 並び順は 照明 → コントラスト → シャープネス → 解像度 で固定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    IncreaseLighting,
    ReduceLighting,
    ImproveContrast,
    HoldSteady,
    MoveCloser,
    Optimal,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::IncreaseLighting => "暗すぎます。照明を明るくしてください",
            Recommendation::ReduceLighting => "明るすぎます。照明を弱めるか逆光を避けてください",
            Recommendation::ImproveContrast => "コントラストが不足しています。背景と機器の差がはっきりする角度で撮影してください",
            Recommendation::HoldSteady => "ブレ・ピンボケの可能性があります。カメラを固定してピントを合わせ直してください",
            Recommendation::MoveCloser => "解像度が不足しています。機器に近づくか高解像度で撮影してください",
            Recommendation::Optimal => "画像品質は良好です",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// 項目別の点数（各0〜3点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityScore {
    pub brightness: u8,
    pub contrast: u8,
    pub sharpness: u8,
    pub resolution: u8,
}

impl QualityScore {
    pub fn from_metrics(brightness: u32, contrast: u32, sharpness: u32, pixel_count: u64) -> Self {
        Self {
            brightness: brightness_score(brightness),
            contrast: contrast_score(contrast),
            sharpness: sharpness_score(sharpness),
            resolution: resolution_score(pixel_count),
        }
    }

    pub fn total(&self) -> u8 {
        self.brightness + self.contrast + self.sharpness + self.resolution
    }

    pub fn tier(&self) -> QualityTier {
        QualityTier::from_score(self.total())
    }
}

fn brightness_score(brightness: u32) -> u8 {
    match brightness {
        120..=180 => 3,
        100..=200 => 2,
        80..=220 => 1,
        _ => 0,
    }
}

fn contrast_score(contrast: u32) -> u8 {
    match contrast {
        50..=80 => 3,
        30..=100 => 2,
        20..=120 => 1,
        _ => 0,
    }
}

fn sharpness_score(sharpness: u32) -> u8 {
    match sharpness {
        15.. => 3,
        10..=14 => 2,
        5..=9 => 1,
        _ => 0,
    }
}

fn resolution_score(pixel_count: u64) -> u8 {
    if pixel_count >= PIXELS_FULL_HD {
        3
    } else if pixel_count >= PIXELS_HD {
        2
    } else if pixel_count >= PIXELS_VGA {
        1
    } else {
        0
    }
}

/// 4項目からアドバイスを生成（空にはならない）
pub fn recommendations_for(
    brightness: u32,
    contrast: u32,
    sharpness: u32,
    pixel_count: u64,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if brightness < BRIGHTNESS_TOO_DARK {
        recs.push(Recommendation::IncreaseLighting);
    } else if brightness > BRIGHTNESS_TOO_BRIGHT {
        recs.push(Recommendation::ReduceLighting);
    }
    if contrast < CONTRAST_TOO_LOW {
        recs.push(Recommendation::ImproveContrast);
    }
    if sharpness < SHARPNESS_TOO_LOW {
        recs.push(Recommendation::HoldSteady);
    }
    if pixel_count < PIXELS_VGA {
        recs.push(Recommendation::MoveCloser);
    }

    if recs.is_empty() {
        recs.push(Recommendation::Optimal);
    }
    recs
}

/// 画像品質の判定結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageQualityMetrics {
    pub resolution: Resolution,
    pub brightness: u32,
    pub contrast: u32,
    pub sharpness: u32,
    pub score: QualityScore,
    pub quality: QualityTier,
    pub recommendations: Vec<Recommendation>,
}

impl ImageQualityMetrics {
    /// 算出済みの4項目から判定結果を組み立てる
    pub fn from_parts(resolution: Resolution, brightness: u32, contrast: u32, sharpness: u32) -> Self {
        let pixel_count = resolution.pixel_count();
        let score = QualityScore::from_metrics(brightness, contrast, sharpness, pixel_count);
        Self {
            resolution,
            brightness,
            contrast,
            sharpness,
            score,
            quality: score.tier(),
            recommendations: recommendations_for(brightness, contrast, sharpness, pixel_count),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.recommendations == [Recommendation::Optimal]
    }
}

/// RGBA8のピクセルバッファ（stride = width * 4）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_buffer(&data, width, height)?;
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn assess(&self) -> Result<ImageQualityMetrics> {
        assess(&self.data, self.width, self.height)
    }
}

fn check_buffer(pixels: &[u8], width: u32, height: u32) -> Result<()> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(Error::InvalidInput(format!(
            "画像サイズが小さすぎます: {}x{}（最小 {}x{}）",
            width, height, MIN_DIMENSION, MIN_DIMENSION
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| Error::InvalidInput(format!("画像サイズが大きすぎます: {}x{}", width, height)))?;
    if pixels.len() != expected {
        return Err(Error::InvalidInput(format!(
            "ピクセル数が一致しません: {} bytes（期待値 {} bytes）",
            pixels.len(),
            expected
        )));
    }
    Ok(())
}

/// 画像品質を判定
///
/// # Arguments
/// * `pixels` - RGBA8のピクセル列（行優先、stride = width * 4）
/// * `width` / `height` - 画像サイズ（いずれも3以上）
///
/// # Returns
/// * `Err(Error::InvalidInput)` - サイズ不足・過大、またはバッファ長不一致
pub fn assess(pixels: &[u8], width: u32, height: u32) -> Result<ImageQualityMetrics> {
    check_buffer(pixels, width, height)?;

    let luma: Vec<f64> = pixels
        .chunks_exact(4)
        .map(|px| 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64)
        .collect();
    let count = luma.len() as f64;

    let brightness = (luma.iter().sum::<f64>() / count).round();
    let variance = luma.iter().map(|&l| (l - brightness).powi(2)).sum::<f64>() / count;
    let contrast = variance.sqrt().round();
    let sharpness = mean_sobel_magnitude(&luma, width as usize, height as usize).round();

    Ok(ImageQualityMetrics::from_parts(
        Resolution::new(width, height),
        brightness as u32,
        contrast as u32,
        sharpness as u32,
    ))
}

/// 外周1pxを除いた内側ピクセルのSobel勾配強度の平均
fn mean_sobel_magnitude(luma: &[f64], width: usize, height: usize) -> f64 {
    let at = |x: usize, y: usize| luma[y * width + x];
    let mut total = 0.0;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = -at(x - 1, y - 1) + at(x + 1, y - 1)
                - 2.0 * at(x - 1, y) + 2.0 * at(x + 1, y)
                - at(x - 1, y + 1) + at(x + 1, y + 1);
            let gy = -at(x - 1, y - 1) - 2.0 * at(x, y - 1) - at(x + 1, y - 1)
                + at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1);
            total += (gx * gx + gy * gy).sqrt();
        }
    }

    let interior = ((width - 2) * (height - 2)) as f64;
    total / interior
}
