use clap::{Args, Parser, Subcommand};
use gym_asset_common::{AssetFilter, AssetStatus, EquipmentCondition};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gym-asset")]
#[command(about = "ジム機器AI解析・資産台帳管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 資産台帳・キャッシュの保存先
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像の撮影品質を評価（ファイル/フォルダ指定）
    Assess {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// JSONで出力
        #[arg(long)]
        json: bool,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 画像を解析APIに送信して機器を検出
    Scan {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 送信のみ（完了を待たない）
        #[arg(long)]
        no_wait: bool,

        /// 検出結果を1件ずつ確認して資産登録
        #[arg(long)]
        review: bool,

        /// キャッシュを使用（同じ画像の再送信をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 解析ジョブの状態を表示
    Status {
        /// ジョブID
        #[arg(required = true)]
        job_id: String,

        /// 終了状態まで待つ
        #[arg(long)]
        wait: bool,
    },

    /// 資産の登録・更新・削除・一覧
    Asset {
        #[command(subcommand)]
        action: AssetCommand,
    },

    /// 変更履歴を表示
    Log {
        /// 資産タグで絞り込み
        #[arg(long)]
        tag: Option<String>,
    },

    /// 資産サマリーを表示
    Report {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 資産一覧をファイル出力
    Export {
        /// 出力形式 (csv/json/excel)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// 設定を表示/編集
    Config {
        /// 解析APIのURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Subcommand)]
pub enum AssetCommand {
    /// 資産を登録
    Add {
        /// 資産タグ（例: GYM-DB-001）
        #[arg(required = true)]
        tag: String,

        /// 名称
        #[arg(short, long)]
        name: String,

        /// 機器種別（dumbbell, bench など）
        #[arg(short = 't', long = "type")]
        equipment_type: String,

        /// 設置場所
        #[arg(short, long, default_value = "")]
        location: String,

        /// 状態 (excellent/good/fair/poor/needs_repair)
        #[arg(short, long, default_value = "fair")]
        condition: EquipmentCondition,

        /// 重量
        #[arg(short, long)]
        weight: Option<String>,

        /// メモ
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// 資産を更新（指定した項目のみ）
    Update {
        #[arg(required = true)]
        tag: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 't', long = "type")]
        equipment_type: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(short, long)]
        condition: Option<EquipmentCondition>,

        /// 稼働状況 (active/maintenance/retired)
        #[arg(short, long)]
        status: Option<AssetStatus>,

        #[arg(short, long)]
        weight: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// 資産を削除
    Delete {
        #[arg(required = true)]
        tag: String,

        /// 確認をスキップ
        #[arg(short, long)]
        yes: bool,
    },

    /// 資産の詳細を表示
    Show {
        #[arg(required = true)]
        tag: String,
    },

    /// 資産一覧
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// キーワードで検索
    Search {
        #[arg(required = true)]
        query: String,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

/// 一覧・出力の絞り込み条件
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// 稼働状況で絞り込み
    #[arg(long)]
    pub status: Option<AssetStatus>,

    /// 状態で絞り込み
    #[arg(long)]
    pub condition: Option<EquipmentCondition>,

    /// 機器種別で絞り込み
    #[arg(long = "equipment-type")]
    pub equipment_type: Option<String>,
}

impl FilterArgs {
    pub fn into_filter(self, query: Option<String>) -> AssetFilter {
        AssetFilter {
            query,
            status: self.status,
            condition: self.condition,
            equipment_type: self.equipment_type,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            _ => Err(format!("Unknown format: {}. Use csv, json, or excel", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
