//! 組織図データの型定義
//!
//! CLI・Web(WASM)・デスクトップで共有される型:
//! - OrgNode: `/org-data` が返す入れ子の組織ツリー
//! - FolderEntry / TableEntry: `/folder_structure` のフォルダ・テーブル一覧
//! - Timeline / Search / Update 系: 外部APIのリクエスト・レスポンス

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 名前が無いノードの表示文字列
pub const UNNAMED: &str = "Unnamed";
/// 役職が無いノードの表示文字列
pub const NO_ROLE: &str = "No Role";

/// 数値でも文字列でも来るID系フィールド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(v) => write!(f, "{}", v),
        }
    }
}

/// 組織図の1ノード（1人・1役職）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// ツリー内で一意なパス形式の識別子（例: `/1/2/5`）
    pub hierarchical_structure: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// 表示順の部下リスト。空なら葉
    pub children: Vec<OrgNode>,
}

impl OrgNode {
    pub fn new(key: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            role: Some(role.into()),
            hierarchical_structure: key.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<OrgNode>) -> Self {
        self.children = children;
        self
    }

    /// 表示用の名前（未設定・空文字は "Unnamed"）
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or(UNNAMED)
    }

    /// 表示用の役職（未設定・空文字は "No Role"）
    pub fn display_role(&self) -> &str {
        non_empty(self.role.as_deref()).unwrap_or(NO_ROLE)
    }

    pub fn name_str(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn role_str(&self) -> &str {
        self.role.as_deref().unwrap_or("")
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// JSON文字列からツリーを読み込み
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// `/folder_structure` のフォルダ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderEntry {
    pub id: i64,
    pub name: String,
    pub tables: Vec<TableEntry>,
}

/// フォルダ内のテーブル（アップロードされたスナップショット）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableEntry {
    pub id: i64,
    pub name: String,
    pub upload_date: Option<String>,
}

/// テーブルIDから所属フォルダとテーブルを探す
pub fn find_table(folders: &[FolderEntry], table_id: i64) -> Option<(&FolderEntry, &TableEntry)> {
    folders.iter().find_map(|folder| {
        folder
            .tables
            .iter()
            .find(|t| t.id == table_id)
            .map(|t| (folder, t))
    })
}

/// `/upload` のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub message: Option<String>,
    pub table_id: Option<i64>,
    pub folder_id: Option<i64>,
}

/// `/timeline/{folder}` のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineResponse {
    pub timeline: Vec<TimelineEntry>,
    pub cv: Option<Vec<CvEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub table_id: i64,
    pub name: String,
    pub upload_date: String,
    pub org_tree: Option<OrgNode>,
    pub person_info: Option<OrgNode>,
}

/// 経歴（役職ごとの在任期間）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvEntry {
    pub role: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// `/search/{folder}/{table}` のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub results: Vec<PersonRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonRecord {
    pub person_id: Option<Scalar>,
    pub name: String,
    pub role: String,
    pub department: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// 階層変更の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// 対象者の下に新しい役職ノードを作る
    CreateNew,
    /// 対象者のノードを上書きする
    Override,
}

impl std::str::FromStr for UpdateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create_new" | "create-new" | "new" => Ok(UpdateType::CreateNew),
            "override" => Ok(UpdateType::Override),
            _ => Err(format!("Unknown update type: {}. Use create_new or override", s)),
        }
    }
}

/// `/update_hierarchical_structure/{folder}/{table}` のリクエスト
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyUpdateRequest {
    pub person_id: Scalar,
    pub update_type: UpdateType,
    pub target_person_id: Scalar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_role: Option<String>,
}

/// `/update_node/{folder}` のリクエスト
#[derive(Debug, Clone, Serialize)]
pub struct PersonalUpdateRequest {
    pub table_ids: Vec<i64>,
    pub search_query: String,
    pub search_column: String,
    pub updates: BTreeMap<String, serde_json::Value>,
}

/// 更新系エンドポイントの共通レスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateResponse {
    pub message: Option<String>,
    pub error: Option<String>,
    pub results: Option<serde_json::Value>,
}
