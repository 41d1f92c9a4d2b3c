use crate::error::{OrgChartError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// APIのベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "ORGCHART_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub timeout_seconds: u64,
    pub default_table_id: Option<i64>,
    pub org_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.into(),
            timeout_seconds: 60,
            default_table_id: None,
            org_mode: false,
        }
    }
}

/// http(s) のURLだけを受け付ける。前後の空白は除く
pub fn validate_api_url(url: &str) -> Result<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(OrgChartError::Config(format!(
            "URLは http:// または https:// で始めてください: {}",
            url
        )));
    }
    Ok(url.to_string())
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// ファイルが無ければ既定値
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| OrgChartError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("orgchart").join("config.json"))
    }

    /// 環境変数を優先したベースURL（末尾の `/` は除く）
    pub fn api_url(&self) -> String {
        let url = match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.api_base_url.clone(),
        };
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        self.api_base_url = validate_api_url(&url)?;
        Ok(())
    }
}
