use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orgchart")]
#[command(about = "組織図ビューア（バックエンドAPIのクライアント）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// APIのベースURL（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// フォルダとテーブルの一覧
    Folders,

    /// 組織ツリーを表示
    Show {
        /// テーブルID（省略時は設定の既定値か対話選択）
        table_id: Option<i64>,

        /// 名前で検索して一致部分を強調
        #[arg(short, long)]
        search: Option<String>,

        /// 役職も検索対象にする
        #[arg(long)]
        search_roles: bool,

        /// 全て展開
        #[arg(long, conflicts_with = "collapse_all")]
        expand_all: bool,

        /// 全て折りたたむ
        #[arg(long)]
        collapse_all: bool,

        /// 役職を主ラベルにする
        #[arg(long)]
        org_mode: bool,

        /// 名前・役職で絞り込み（複数可）
        #[arg(short, long)]
        filter: Vec<String>,

        /// 強調するノード（hierarchical_structure、複数可）
        #[arg(long)]
        highlight: Vec<String>,
    },

    /// バックエンドで人物を検索
    Search {
        folder_id: i64,
        table_id: i64,
        query: String,

        /// 検索する列（カンマ区切り）
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// 部下の一覧
    Reports {
        table_id: i64,
        /// 名前（完全一致）
        name: String,
    },

    /// 人物の在籍履歴
    Timeline {
        folder_id: i64,
        name: String,

        /// 基準テーブル
        #[arg(short, long)]
        table: Option<i64>,
    },

    /// 2つのテーブルを比較
    Compare {
        table1_id: i64,
        table2_id: i64,

        /// レポートの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
    },

    /// CSV/XLSX をアップロード
    Upload {
        #[arg(required = true)]
        file: PathBuf,

        /// アップロード日 (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// 追加先フォルダID
        #[arg(long)]
        folder_id: Option<i64>,

        /// 新規フォルダ名
        #[arg(long)]
        folder_name: Option<String>,
    },

    /// 人物を別の上司の下へ移す
    Move {
        folder_id: i64,
        table_id: i64,
        person_id: String,
        target_person_id: String,

        /// 新しい役職名
        #[arg(long)]
        new_role: Option<String>,

        /// 変更方法 (create_new/override)
        #[arg(long, default_value = "create_new")]
        update_type: String,

        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },

    /// 複数テーブルの個人情報を更新
    UpdatePerson {
        folder_id: i64,
        /// 検索する値（名前など）
        query: String,

        /// 対象テーブル（複数可）
        #[arg(short, long = "table", required = true)]
        tables: Vec<i64>,

        /// 検索する列
        #[arg(long, default_value = "name")]
        column: String,

        /// 更新内容 key=value（複数可）
        #[arg(long = "set", required = true)]
        updates: Vec<String>,

        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },

    /// 組織ツリーをファイルに出力
    Export {
        table_id: i64,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
    },

    /// 設定を表示/編集
    Config {
        /// APIのベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// 既定のテーブルIDを設定
        #[arg(long)]
        set_default_table: Option<i64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ExportFormat {
    #[default]
    Json,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}

/// `key=value` を分解。値はJSONとして読めればJSON、だめなら文字列
pub fn parse_assignment(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("key=value の形式で指定してください: {}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("キーが空です: {}", s));
    }
    let value = value.trim();
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}
