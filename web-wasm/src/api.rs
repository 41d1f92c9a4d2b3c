//! バックエンドAPI呼び出し（fetch）
//!
//! エラーは画面に出す文字列で返す。

use orgchart_common::compare::ComparisonReport;
use orgchart_common::types::{
    FolderEntry, HierarchyUpdateRequest, OrgNode, PersonalUpdateRequest, SearchResponse, TimelineResponse,
    UpdateResponse, UploadResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Headers, Request, RequestInit, RequestMode, Response};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

/// 非2xxの本文からメッセージを作る（JSONの `error` を優先）
pub fn error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());
    if detail.is_empty() {
        format!("API error: {}", status)
    } else {
        format!("API error ({}): {}", status, detail)
    }
}

/// 2xx でも `error` が入っていれば失敗扱い
pub fn ensure_no_error(response: UpdateResponse) -> Result<UpdateResponse, String> {
    match &response.error {
        Some(message) => Err(format!("API error (200): {}", message)),
        None => Ok(response),
    }
}

/// クエリ文字列を組み立てる
pub fn build_url(base_url: &str, path: &str, query: &[(&str, String)]) -> String {
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    for (i, (key, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, String> {
        let window = web_sys::window().ok_or_else(|| "window がありません".to_string())?;
        let value = JsFuture::from(window.fetch_with_request(&request)).await.map_err(js_err)?;
        let response: Response = value.dyn_into().map_err(js_err)?;
        let text = JsFuture::from(response.text().map_err(js_err)?).await.map_err(js_err)?;
        let body = text.as_string().unwrap_or_default();

        if !response.ok() {
            return Err(error_message(response.status(), &body));
        }
        serde_json::from_str(&body).map_err(|e| format!("JSON parse error: {}", e))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, String> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);
        let url = build_url(&self.base_url, path, query);
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        self.send(request).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, String> {
        let json = serde_json::to_string(body).map_err(|e| format!("JSON encode error: {}", e))?;
        let headers = Headers::new().map_err(js_err)?;
        headers.set("Content-Type", "application/json").map_err(js_err)?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_headers(&headers);
        opts.set_body(&JsValue::from_str(&json));
        let url = build_url(&self.base_url, path, &[]);
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        self.send(request).await
    }

    pub async fn folder_structure(&self) -> Result<Vec<FolderEntry>, String> {
        self.get("folder_structure", &[]).await
    }

    pub async fn org_data(&self, table_id: i64) -> Result<OrgNode, String> {
        self.get("org-data", &[("table_id", table_id.to_string())]).await
    }

    pub async fn timeline(&self, folder_id: i64, name: &str, table_id: Option<i64>) -> Result<TimelineResponse, String> {
        let mut query = vec![("name", name.to_string())];
        if let Some(id) = table_id {
            query.push(("table_id", id.to_string()));
        }
        self.get(&format!("timeline/{}", folder_id), &query).await
    }

    /// バックエンドでの人物検索（空文字なら全員）
    pub async fn search(&self, folder_id: i64, table_id: i64, query: &str, columns: &[&str]) -> Result<SearchResponse, String> {
        let mut params = vec![("query", query.to_string())];
        if !columns.is_empty() {
            params.push(("columns", columns.join(",")));
        }
        self.get(&format!("search/{}/{}", folder_id, table_id), &params).await
    }

    pub async fn update_hierarchy(
        &self,
        folder_id: i64,
        table_id: i64,
        request: &HierarchyUpdateRequest,
    ) -> Result<UpdateResponse, String> {
        let response = self
            .post_json(&format!("update_hierarchical_structure/{}/{}", folder_id, table_id), request)
            .await?;
        ensure_no_error(response)
    }

    pub async fn update_person(&self, folder_id: i64, request: &PersonalUpdateRequest) -> Result<UpdateResponse, String> {
        let response = self.post_json(&format!("update_node/{}", folder_id), request).await?;
        ensure_no_error(response)
    }

    pub async fn compare(&self, table1_id: i64, table2_id: i64) -> Result<ComparisonReport, String> {
        self.get(
            "compare",
            &[("table1_id", table1_id.to_string()), ("table2_id", table2_id.to_string())],
        )
        .await
    }

    /// ファイルと日付（YYYY-MM-DD）を multipart で送る
    pub async fn upload(
        &self,
        file: &File,
        upload_date: &str,
        folder_id: Option<i64>,
        folder_name: Option<&str>,
    ) -> Result<UploadResponse, String> {
        let form = FormData::new().map_err(js_err)?;
        form.append_with_blob_and_filename("file", file, &file.name()).map_err(js_err)?;
        form.append_with_str("upload_date", upload_date).map_err(js_err)?;
        if let Some(id) = folder_id {
            form.append_with_str("folder_id", &id.to_string()).map_err(js_err)?;
        }
        if let Some(name) = folder_name.filter(|n| !n.trim().is_empty()) {
            form.append_with_str("folder_name", name.trim()).map_err(js_err)?;
        }

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&form);
        let url = build_url(&self.base_url, "upload", &[]);
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        self.send(request).await
    }
}
