use crate::analyzer::PollPolicy;
use crate::error::{GymAssetError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "GYM_ASSET_API_URL";
pub const ENV_API_KEY: &str = "GYM_ASSET_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    /// アップロード前に縮小する長辺の上限
    pub max_image_dimension: u32,
    pub jpeg_quality: u8,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    /// 資産台帳・キャッシュの保存先（省略時はOSのデータディレクトリ）
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_key: None,
            max_image_dimension: 1920,
            jpeg_quality: 85,
            poll_interval_secs: 2,
            max_poll_attempts: 30,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GymAssetError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("gym-asset-ai").join("config.json"))
    }

    /// 解析APIのベースURL（環境変数を優先、末尾の `/` は除去）
    pub fn api_base_url(&self) -> Result<String> {
        let url = std::env::var(ENV_API_URL)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .ok_or(GymAssetError::MissingApiUrl)?;
        Ok(url.trim().trim_end_matches('/').to_string())
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(ENV_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GymAssetError::Config(format!(
                "URLは http:// または https:// で始まる必要があります: {}",
                url
            )));
        }
        self.api_base_url = Some(url);
        self.save()
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_poll_attempts.max(1),
        }
    }

    /// データディレクトリ（引数 > 設定 > OS既定）
    pub fn data_dir(&self, overridden: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = overridden.or_else(|| self.data_dir.clone()) {
            return Ok(dir);
        }
        let base = dirs::data_dir()
            .ok_or_else(|| GymAssetError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("gym-asset-ai"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_policy() {
        let policy = Config::default().poll_policy();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, 30);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"api_base_url": "http://localhost:3000/"}"#).unwrap();
        assert_eq!(config.max_image_dimension, 1920);
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.api_base_url.as_deref(), Some("http://localhost:3000/"));
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/from-config")),
            ..Default::default()
        };
        assert_eq!(config.data_dir(None).unwrap(), PathBuf::from("/tmp/from-config"));
        assert_eq!(
            config.data_dir(Some(PathBuf::from("/tmp/from-arg"))).unwrap(),
            PathBuf::from("/tmp/from-arg")
        );
    }
}
