//! 人物の編集フォーム
//!
//! - HierarchyEdit: 階層の変更（既存ノードの上書き / 別の上司の下に新規ノード）
//! - PersonalEdit: 個人情報を複数テーブルにまたがって更新
//!
//! どちらも入力を検証してからリクエストを組み立てる。送信後はツリーを丸ごと取り直す。

use crate::compare::parse_upload_date;
use crate::error::{Error, Result};
use crate::types::{HierarchyUpdateRequest, OrgNode, PersonRecord, PersonalUpdateRequest, Scalar, UpdateType};
use std::collections::BTreeMap;

/// 移動先候補の検索で取得する列
pub const CANDIDATE_COLUMNS: [&str; 4] = ["name", "person_id", "role", "department"];

/// 個人情報フォームの項目（キー, ラベル）
pub const PERSONAL_FIELDS: [(&str, &str); 6] = [
    ("name", "名前"),
    ("role", "役職"),
    ("department", "部署"),
    ("rank", "ランク"),
    ("birth_date", "生年月日"),
    ("organization_id", "組織ID"),
];

/// 数値で送り返す項目
const NUMERIC_FIELDS: [&str; 2] = ["rank", "organization_id"];

impl UpdateType {
    pub fn label(&self) -> &'static str {
        match self {
            UpdateType::Override => "既存ノードを上書き",
            UpdateType::CreateNew => "新しいノードを作成",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Override => "override",
            UpdateType::CreateNew => "create_new",
        }
    }
}

/// 移動先の候補。自分自身と ID の無い行は除く
pub fn candidates(results: &[PersonRecord], node: &OrgNode) -> Vec<PersonRecord> {
    results
        .iter()
        .filter(|p| p.person_id.is_some() && p.person_id != node.person_id)
        .cloned()
        .collect()
}

/// 階層変更フォーム
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyEdit {
    pub update_type: Option<UpdateType>,
    pub target: Option<PersonRecord>,
    pub new_role: String,
    reviewing: bool,
}

impl HierarchyEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_update_type(&mut self, update_type: UpdateType) {
        self.update_type = Some(update_type);
        if update_type == UpdateType::Override {
            self.new_role.clear();
        }
    }

    /// 対象欄の見出し
    pub fn target_label(&self) -> &'static str {
        match self.update_type {
            Some(UpdateType::Override) => "上書きする人",
            _ => "新しい上司",
        }
    }

    pub fn needs_new_role(&self) -> bool {
        self.update_type == Some(UpdateType::CreateNew)
    }

    pub fn is_reviewing(&self) -> bool {
        self.reviewing
    }

    /// 入力が揃っていれば確認画面へ進む
    pub fn review(&mut self, node: &OrgNode) -> Result<()> {
        self.request(node)?;
        self.reviewing = true;
        Ok(())
    }

    pub fn back(&mut self) {
        self.reviewing = false;
    }

    pub fn request(&self, node: &OrgNode) -> Result<HierarchyUpdateRequest> {
        let person_id = node.person_id.clone().ok_or(Error::MissingField("person_id"))?;
        let update_type = self.update_type.ok_or(Error::MissingField("update_type"))?;
        let target_person_id = self
            .target
            .as_ref()
            .and_then(|t| t.person_id.clone())
            .ok_or(Error::MissingField("target_person_id"))?;
        let new_role = match update_type {
            UpdateType::CreateNew => {
                let role = self.new_role.trim();
                if role.is_empty() {
                    return Err(Error::MissingField("new_role"));
                }
                Some(role.to_string())
            }
            UpdateType::Override => None,
        };
        Ok(HierarchyUpdateRequest {
            person_id,
            update_type,
            target_person_id,
            new_role,
        })
    }
}

/// 個人情報フォーム
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalEdit {
    values: BTreeMap<&'static str, String>,
    tables: Vec<i64>,
}

fn scalar_text(value: &Option<Scalar>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// 日付部分だけを `YYYY-MM-DD` で。読めなければそのまま
fn date_text(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(raw) => parse_upload_date(raw)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => String::new(),
    }
}

impl PersonalEdit {
    /// ノードの現在値で埋め、表示中のテーブルを選択済みにする
    pub fn from_node(node: &OrgNode, current_table: Option<i64>) -> Self {
        let mut values = BTreeMap::new();
        values.insert("name", node.name_str().to_string());
        values.insert("role", node.role_str().to_string());
        values.insert("department", node.department.clone().unwrap_or_default());
        values.insert("rank", scalar_text(&node.rank));
        values.insert("birth_date", date_text(&node.birth_date));
        values.insert("organization_id", scalar_text(&node.organization_id));
        Self {
            values,
            tables: current_table.into_iter().collect(),
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// 未知の項目は無視
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        if let Some((key, _)) = PERSONAL_FIELDS.iter().find(|(key, _)| *key == field) {
            self.values.insert(*key, value.into());
        }
    }

    pub fn tables(&self) -> &[i64] {
        &self.tables
    }

    pub fn is_table_selected(&self, table_id: i64) -> bool {
        self.tables.contains(&table_id)
    }

    pub fn toggle_table(&mut self, table_id: i64) {
        if let Some(pos) = self.tables.iter().position(|&t| t == table_id) {
            self.tables.remove(pos);
        } else {
            self.tables.push(table_id);
        }
    }

    /// 名前で人物を探し、選択した全テーブルに同じ値を書く
    pub fn request(&self, node: &OrgNode) -> Result<PersonalUpdateRequest> {
        if self.tables.is_empty() {
            return Err(Error::NoTablesSelected);
        }
        let mut updates = BTreeMap::new();
        for (key, _) in PERSONAL_FIELDS {
            let raw = self.value(key).trim();
            let value = if key == "birth_date" {
                if raw.is_empty() {
                    serde_json::Value::Null
                } else {
                    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .map_err(|_| Error::InvalidDate(raw.to_string()))?;
                    serde_json::Value::String(raw.to_string())
                }
            } else if NUMERIC_FIELDS.contains(&key) {
                raw.parse::<i64>()
                    .map(serde_json::Value::from)
                    .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
            } else {
                serde_json::Value::String(raw.to_string())
            };
            updates.insert(key.to_string(), value);
        }
        Ok(PersonalUpdateRequest {
            table_ids: self.tables.clone(),
            search_query: node.name_str().to_string(),
            search_column: "name".to_string(),
            updates,
        })
    }
}
