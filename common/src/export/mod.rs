//! エクスポート用の表形式データ
//!
//! 組織ツリーを1人1行の表に平坦化する。Excel出力は `excel` フィーチャ。

use crate::tree::OrgTree;
use serde::Serialize;

#[cfg(feature = "excel")]
pub mod excel_core;

/// 組織表の列見出し
pub const ORG_COLUMNS: [&str; 9] = [
    "Hierarchical Structure",
    "Level",
    "Name",
    "Role",
    "Department",
    "Email",
    "Person ID",
    "Rank",
    "Manager",
];

/// 組織表の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgRow {
    pub key: String,
    pub depth: usize,
    pub name: String,
    pub role: String,
    pub department: String,
    pub email: String,
    pub person_id: String,
    pub rank: String,
    /// 上司の名前（ルートは空）
    pub manager: String,
}

impl OrgRow {
    /// `ORG_COLUMNS` と同じ順序のセル値（Level は1始まり）
    pub fn cells(&self) -> [String; 9] {
        [
            self.key.clone(),
            (self.depth + 1).to_string(),
            self.name.clone(),
            self.role.clone(),
            self.department.clone(),
            self.email.clone(),
            self.person_id.clone(),
            self.rank.clone(),
            self.manager.clone(),
        ]
    }
}

/// 前順で1人1行に平坦化
pub fn flatten_tree(tree: &OrgTree) -> Vec<OrgRow> {
    tree.pre_order()
        .map(|id| {
            let node = tree.node(id);
            OrgRow {
                key: tree.key(id).to_string(),
                depth: tree.depth(id),
                name: node.display_name().to_string(),
                role: node.display_role().to_string(),
                department: node.department.clone().unwrap_or_default(),
                email: node.email.clone().unwrap_or_default(),
                person_id: node.person_id.as_ref().map(|v| v.to_string()).unwrap_or_default(),
                rank: node.rank.as_ref().map(|v| v.to_string()).unwrap_or_default(),
                manager: tree
                    .parent(id)
                    .map(|p| tree.node(p).display_name().to_string())
                    .unwrap_or_default(),
            }
        })
        .collect()
}
