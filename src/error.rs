use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrgChartError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIエラー ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("テーブルが見つかりません: {0}")]
    TableNotFound(i64),

    #[error("人物が見つかりません: {0}")]
    PersonNotFound(String),

    #[error("引数が不正: {0}")]
    InvalidArgument(String),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] orgchart_common::Error),
}

impl OrgChartError {
    /// APIの非2xxレスポンスから作る。本文がJSONで `error` があればそれを使う
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.chars().take(200).collect());
        OrgChartError::Api { status, message }
    }

    /// テーブル単位の取得で 404 なら TableNotFound
    pub fn for_table(self, table_id: i64) -> Self {
        match self {
            OrgChartError::Api { status: 404, .. } => OrgChartError::TableNotFound(table_id),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrgChartError>;
