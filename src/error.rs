use thiserror::Error;

#[derive(Error, Debug)]
pub enum GymAssetError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("解析APIのURLが設定されていません。`gym-asset config --set-api-url URL` で設定してください")]
    MissingApiUrl,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("API呼び出しエラー (HTTP {status}): {body}")]
    ApiStatus { status: u16, body: String },

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("ジョブIDが不正です: {0:?}")]
    InvalidJobId(String),

    #[error("解析に失敗しました: {0}")]
    Analysis(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] gym_asset_common::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("資産が見つかりません: {0}")]
    AssetNotFound(String),

    #[error("資産タグが重複しています: {0}")]
    DuplicateAssetTag(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),
}

impl From<reqwest::Error> for GymAssetError {
    fn from(e: reqwest::Error) -> Self {
        GymAssetError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GymAssetError>;
