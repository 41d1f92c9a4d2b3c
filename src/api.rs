//! 組織図バックエンドのRESTクライアント
//!
//! バックエンドは外部サービスで、このクライアントは契約どおりに
//! リクエストを送りレスポンスをデコードするだけ。

use crate::config::Config;
use crate::error::{OrgChartError, Result};
use orgchart_common::compare::ComparisonReport;
use orgchart_common::types::{
    FolderEntry, HierarchyUpdateRequest, OrgNode, PersonalUpdateRequest, SearchResponse, TimelineResponse,
    UpdateResponse, UploadResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// アップロード時のフォルダ指定
#[derive(Debug, Clone, Default)]
pub struct UploadTarget {
    pub folder_id: Option<i64>,
    pub folder_name: Option<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("orgchart/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url(), Duration::from_secs(config.timeout_seconds))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// ベースURLにパスを連結
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OrgChartError::from_status(status.as_u16(), &body));
        }
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        let response = self.http.get(&url).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    /// フォルダとテーブルの一覧
    pub async fn folder_structure(&self) -> Result<Vec<FolderEntry>> {
        self.get("folder_structure", &[]).await
    }

    /// テーブルの組織ツリー全体
    pub async fn org_data(&self, table_id: i64) -> Result<OrgNode> {
        info!(table_id, "fetching org data");
        self.get("org-data", &[("table_id", table_id.to_string())]).await
    }

    /// CSV/XLSX をアップロード。日付は YYYY-MM-DD
    pub async fn upload(&self, file: &Path, upload_date: &str, target: &UploadTarget) -> Result<UploadResponse> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| OrgChartError::InvalidArgument(format!("ファイル名が不正: {}", file.display())))?
            .to_string();
        let bytes = tokio::fs::read(file).await?;
        info!(%file_name, bytes = bytes.len(), upload_date, "uploading table");

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("upload_date", upload_date.to_string());
        if let Some(id) = target.folder_id {
            form = form.text("folder_id", id.to_string());
        }
        if let Some(name) = &target.folder_name {
            form = form.text("folder_name", name.clone());
        }

        let response = self.http.post(self.url("upload")).multipart(form).send().await?;
        Self::decode(response).await
    }

    /// 人物の在籍履歴と経歴
    pub async fn timeline(&self, folder_id: i64, name: &str, table_id: Option<i64>) -> Result<TimelineResponse> {
        let mut query = vec![("name", name.to_string())];
        if let Some(id) = table_id {
            query.push(("table_id", id.to_string()));
        }
        self.get(&format!("timeline/{}", folder_id), &query).await
    }

    /// バックエンドでの人物検索
    pub async fn search(&self, folder_id: i64, table_id: i64, query: &str, columns: &[String]) -> Result<SearchResponse> {
        let mut params = vec![("query", query.to_string())];
        if !columns.is_empty() {
            params.push(("columns", columns.join(",")));
        }
        self.get(&format!("search/{}/{}", folder_id, table_id), &params).await
    }

    /// 2テーブルの比較
    pub async fn compare(&self, table1_id: i64, table2_id: i64) -> Result<ComparisonReport> {
        info!(table1_id, table2_id, "comparing tables");
        self.get(
            "compare",
            &[("table1_id", table1_id.to_string()), ("table2_id", table2_id.to_string())],
        )
        .await
    }

    /// 階層の変更（異動・役職の付け替え）
    pub async fn update_hierarchy(
        &self,
        folder_id: i64,
        table_id: i64,
        request: &HierarchyUpdateRequest,
    ) -> Result<UpdateResponse> {
        let response: UpdateResponse = self
            .post_json(&format!("update_hierarchical_structure/{}/{}", folder_id, table_id), request)
            .await?;
        ensure_no_error(response)
    }

    /// 複数テーブルにまたがる個人情報の更新
    pub async fn update_person(&self, folder_id: i64, request: &PersonalUpdateRequest) -> Result<UpdateResponse> {
        let response: UpdateResponse = self.post_json(&format!("update_node/{}", folder_id), request).await?;
        ensure_no_error(response)
    }
}

/// 2xx でも `error` が入っていれば失敗扱い
fn ensure_no_error(response: UpdateResponse) -> Result<UpdateResponse> {
    match &response.error {
        Some(message) => Err(OrgChartError::Api {
            status: 200,
            message: message.clone(),
        }),
        None => Ok(response),
    }
}
