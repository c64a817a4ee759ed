//! 台帳データの保存先
//!
//! - JsonFileRepository: JSONファイル（一時ファイルに書いてからリネーム）
//! - MemoryRepository: メモリ上のみ（テスト・一時利用）

use crate::error::Result;
use gym_asset_common::{Asset, AuditLog, StoredAnalysisResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const STORE_FILE_NAME: &str = "assets.json";

/// 保存データ一式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreData {
    pub version: u32,
    pub assets: Vec<Asset>,
    pub audit_logs: Vec<AuditLog>,
    pub analyses: Vec<StoredAnalysisResult>,
}

impl StoreData {
    pub const CURRENT_VERSION: u32 = 1;
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            assets: Vec::new(),
            audit_logs: Vec::new(),
            analyses: Vec::new(),
        }
    }
}

/// 台帳の読み書き
pub trait AssetRepository {
    fn load(&self) -> Result<StoreData>;
    fn save(&mut self, data: &StoreData) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// データディレクトリ直下の assets.json
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AssetRepository for JsonFileRepository {
    /// ファイルがなければ空の台帳
    fn load(&self) -> Result<StoreData> {
        if !self.path.exists() {
            return Ok(StoreData::default());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let data: StoreData = serde_json::from_reader(reader)?;
        Ok(data)
    }

    fn save(&mut self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, data)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), assets = data.assets.len(), "store saved");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    data: StoreData,
    saves: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreData) -> Self {
        Self { data, saves: 0 }
    }

    /// save が呼ばれた回数
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl AssetRepository for MemoryRepository {
    fn load(&self) -> Result<StoreData> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &StoreData) -> Result<()> {
        self.data = data.clone();
        self.saves += 1;
        Ok(())
    }
}
