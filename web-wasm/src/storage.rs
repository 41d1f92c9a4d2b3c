//! ブラウザに保存する設定（localStorage）

use crate::api::DEFAULT_API_URL;
use gloo::storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

const SETTINGS_KEY: &str = "orgchart.settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    pub api_base_url: String,
    pub org_mode: bool,
    /// 最後に開いたテーブル
    pub last_table_id: Option<i64>,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            org_mode: false,
            last_table_id: None,
        }
    }
}

impl WebSettings {
    /// 保存が無い・壊れているときは既定値
    pub fn load() -> Self {
        LocalStorage::get(SETTINGS_KEY).unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), String> {
        LocalStorage::set(SETTINGS_KEY, self).map_err(|e| format!("設定の保存に失敗: {}", e))
    }
}
