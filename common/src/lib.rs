//! Gym Asset AI Common Library
//!
//! CLIと解析バックエンド連携で共有される型とユーティリティ。
//! I/Oを持たない純粋なロジックのみを置く。

pub mod asset;
pub mod catalog;
pub mod error;
pub mod export;
pub mod parser;
pub mod quality;
pub mod report;
pub mod search;
pub mod types;

pub use asset::{
    normalize_asset_tag, validate_asset_tag, Asset, AssetDraft, AssetStatus, AssetUpdate,
    AuditAction, AuditLog, EquipmentCondition, StoredAnalysisResult,
};
pub use catalog::suggest_assets;
pub use error::{Error, Result};
pub use parser::{parse_status_response, parse_submit_response};
pub use quality::{
    assess, recommendations_for, ImageQualityMetrics, PixelBuffer, QualityScore, QualityTier,
    Recommendation, Resolution,
};
pub use report::AssetReport;
pub use search::AssetFilter;
pub use types::{AnalysisPayload, DetectedEquipment, JobStatus, JobStatusResponse, SubmitResponse};
