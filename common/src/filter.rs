//! 名前・役職フィルタ
//!
//! フィルタ語のいずれかが名前または役職に（大文字小文字無視で）含まれる
//! ノードだけを残す。条件を満たさないノードはその部下ごと表示されない。

use crate::search::contains_ignore_case;
use crate::tree::{NodeId, OrgTree};
use crate::types::OrgNode;
use serde::{Deserialize, Serialize};

/// 表示中のノードを絞り込むフィルタ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFilter {
    terms: Vec<String>,
}

impl NodeFilter {
    pub fn new(terms: Vec<String>) -> Self {
        let terms = terms
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_active(&self) -> bool {
        !self.terms.is_empty()
    }

    /// フィルタ語が無ければ常に true
    pub fn matches(&self, node: &OrgNode) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        self.terms.iter().any(|term| {
            contains_ignore_case(node.name_str(), term) || contains_ignore_case(node.role_str(), term)
        })
    }

    pub fn matches_id(&self, tree: &OrgTree, id: NodeId) -> bool {
        self.matches(tree.node(id))
    }

    /// 条件を満たすノードだけの入れ子ツリーを返す。ルートが落ちれば None
    pub fn prune(&self, tree: &OrgTree) -> Option<OrgNode> {
        let root = tree.root();
        if !self.matches_id(tree, root) {
            return None;
        }
        if !self.is_active() {
            return Some(tree.to_org_node(root));
        }

        let mut kept: Vec<Option<OrgNode>> = vec![None; tree.len()];
        // 前順の逆なら子は親より先に組み上がる
        for index in (0..tree.len()).rev() {
            let id = NodeId(index);
            if !self.matches_id(tree, id) {
                continue;
            }
            let mut node = tree.node(id).clone();
            node.children = tree
                .children(id)
                .iter()
                .filter_map(|c| kept[c.0].take())
                .collect();
            kept[index] = Some(node);
        }
        kept[root.0].take()
    }
}

/// フィルタ候補の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterField {
    #[default]
    Name,
    Role,
}

/// フィルタ選択画面の状態
#[derive(Debug, Clone, Default)]
pub struct FilterPicker {
    names: Vec<String>,
    roles: Vec<String>,
    pub field: FilterField,
    pub input: String,
    selected: Vec<String>,
}

impl FilterPicker {
    pub fn new(tree: Option<&OrgTree>, active: &NodeFilter) -> Self {
        let (names, roles) = tree.map(|t| t.names_and_roles()).unwrap_or_default();
        Self {
            names,
            roles,
            field: FilterField::Name,
            input: String::new(),
            selected: active.terms().to_vec(),
        }
    }

    /// 種類を切り替えると入力はクリアされる
    pub fn set_field(&mut self, field: FilterField) {
        self.field = field;
        self.input.clear();
    }

    /// 入力で絞り込んだ候補
    pub fn options(&self) -> Vec<&str> {
        let all = match self.field {
            FilterField::Name => &self.names,
            FilterField::Role => &self.roles,
        };
        if self.input.trim().is_empty() {
            return all.iter().map(|s| s.as_str()).collect();
        }
        all.iter()
            .filter(|option| contains_ignore_case(option, &self.input))
            .map(|s| s.as_str())
            .collect()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, option: &str) -> bool {
        self.selected.iter().any(|s| s == option)
    }

    pub fn toggle(&mut self, option: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == option) {
            self.selected.remove(pos);
        } else {
            self.selected.push(option.to_string());
        }
    }

    /// 入力中の文字列をそのままフィルタ語に追加
    pub fn add_custom(&mut self) -> bool {
        let term = self.input.trim().to_string();
        if term.is_empty() || self.is_selected(&term) {
            return false;
        }
        self.selected.push(term);
        self.input.clear();
        true
    }

    pub fn apply(&self) -> NodeFilter {
        NodeFilter::new(self.selected.clone())
    }
}
