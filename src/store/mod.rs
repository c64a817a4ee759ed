//! 資産台帳
//!
//! 変更操作は すべて 入力チェック → 変更履歴の追加 → 保存 の順で行う。
//! 保存に失敗した場合はメモリ上の台帳も変更前のまま。

mod repository;

pub use repository::{AssetRepository, JsonFileRepository, MemoryRepository, StoreData, STORE_FILE_NAME};

use crate::error::{GymAssetError, Result};
use chrono::Utc;
use gym_asset_common::{
    normalize_asset_tag, Asset, AssetDraft, AssetFilter, AssetReport, AssetUpdate, AuditAction,
    AuditLog, StoredAnalysisResult,
};

pub struct AssetStore<R: AssetRepository> {
    repo: R,
    data: StoreData,
}

impl<R: AssetRepository> AssetStore<R> {
    pub fn open(repo: R) -> Result<Self> {
        let data = repo.load()?;
        tracing::debug!(assets = data.assets.len(), logs = data.audit_logs.len(), "store opened");
        Ok(Self { repo, data })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn list(&self) -> &[Asset] {
        &self.data.assets
    }

    /// タグで検索（大文字小文字・区切り文字の揺れは正規化して比較）
    pub fn get(&self, tag: &str) -> Option<&Asset> {
        let tag = normalize_asset_tag(tag);
        self.data.assets.iter().find(|a| a.asset_tag == tag)
    }

    pub fn search(&self, filter: &AssetFilter) -> Vec<&Asset> {
        filter.apply(&self.data.assets)
    }

    pub fn report(&self) -> AssetReport {
        AssetReport::from_assets(&self.data.assets)
    }

    /// 変更履歴（古い順）。tag 指定時はその資産のみ
    pub fn audit_logs(&self, tag: Option<&str>) -> Vec<&AuditLog> {
        let tag = tag.map(normalize_asset_tag);
        self.data
            .audit_logs
            .iter()
            .filter(|log| tag.as_deref().map_or(true, |t| log.asset_tag == t))
            .collect()
    }

    pub fn analyses(&self) -> &[StoredAnalysisResult] {
        &self.data.analyses
    }

    /// 資産を登録
    pub fn create(&mut self, mut draft: AssetDraft) -> Result<Asset> {
        draft.asset_tag = normalize_asset_tag(&draft.asset_tag);
        draft.validate()?;
        if self.get(&draft.asset_tag).is_some() {
            return Err(GymAssetError::DuplicateAssetTag(draft.asset_tag));
        }

        let now = Utc::now();
        let asset = draft.into_asset(now);
        let details = format!("{} ({})", asset.name, asset.equipment_type);
        let log = AuditLog::new(&asset, AuditAction::Create, details, now);

        self.commit(|data| {
            data.assets.push(asset.clone());
            data.audit_logs.push(log);
        })?;
        tracing::info!(tag = %asset.asset_tag, "asset created");
        Ok(asset)
    }

    /// 資産を更新（変更がなければ履歴も保存もしない）
    pub fn update(&mut self, tag: &str, update: &AssetUpdate) -> Result<Asset> {
        update.validate()?;
        let index = self.index_of(tag)?;

        let now = Utc::now();
        let mut asset = self.data.assets[index].clone();
        let changes = update.apply(&mut asset, now);
        if changes.is_empty() {
            return Ok(asset);
        }

        let log = AuditLog::new(&asset, AuditAction::Update, changes.join("; "), now);
        self.commit(|data| {
            data.assets[index] = asset.clone();
            data.audit_logs.push(log);
        })?;
        tracing::info!(tag = %asset.asset_tag, changes = changes.len(), "asset updated");
        Ok(asset)
    }

    /// 資産を削除（履歴は残す）
    pub fn delete(&mut self, tag: &str) -> Result<Asset> {
        let index = self.index_of(tag)?;
        let asset = self.data.assets[index].clone();
        let log = AuditLog::new(&asset, AuditAction::Delete, asset.name.clone(), Utc::now());

        self.commit(|data| {
            data.assets.remove(index);
            data.audit_logs.push(log);
        })?;
        tracing::info!(tag = %asset.asset_tag, "asset deleted");
        Ok(asset)
    }

    /// 解析結果を保存（同じジョブIDは上書き）
    pub fn record_analysis(&mut self, result: StoredAnalysisResult) -> Result<()> {
        self.commit(|data| {
            data.analyses.retain(|a| a.job_id != result.job_id);
            data.analyses.push(result);
        })
    }

    fn index_of(&self, tag: &str) -> Result<usize> {
        let normalized = normalize_asset_tag(tag);
        self.data
            .assets
            .iter()
            .position(|a| a.asset_tag == normalized)
            .ok_or_else(|| GymAssetError::AssetNotFound(tag.to_string()))
    }

    /// 複製に変更を適用して保存し、成功したら差し替える
    fn commit<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoreData),
    {
        let mut next = self.data.clone();
        change(&mut next);
        self.repo.save(&next)?;
        self.data = next;
        Ok(())
    }
}
