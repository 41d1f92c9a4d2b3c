//! ノードの展開・折りたたみ状態
//!
//! ノードごとのローカルな開閉と、「すべて展開 / すべて折りたたむ」の
//! グローバル指示を1か所で管理する。優先順位は「最後の操作が勝つ」:
//! グローバル指示はそれ以前のローカル開閉をすべて上書きし、
//! その後のローカル開閉はそのノードに限りグローバル指示を上書きする。
//!
//! 状態はキー（`hierarchical_structure`）で持つので、編集後の再取得で
//! NodeId が振り直されても開閉状態は維持される。

use crate::tree::{NodeId, OrgTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 初期表示で開いておく階層数
pub const DEFAULT_OPEN_DEPTH: usize = 2;

/// グローバルな開閉指示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalSignal {
    ExpandAll,
    CollapseAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    global: Option<GlobalSignal>,
    local: HashMap<String, bool>,
    open_depth: usize,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::with_open_depth(DEFAULT_OPEN_DEPTH)
    }

    /// 何も操作されていないノードを `depth < open_depth` で開く
    pub fn with_open_depth(open_depth: usize) -> Self {
        Self {
            global: None,
            local: HashMap::new(),
            open_depth,
        }
    }

    pub fn global(&self) -> Option<GlobalSignal> {
        self.global
    }

    /// ノードが展開されているか（葉は常に false）
    pub fn is_expanded(&self, tree: &OrgTree, id: NodeId) -> bool {
        if !tree.has_children(id) {
            return false;
        }
        if let Some(&open) = self.local.get(tree.key(id)) {
            return open;
        }
        match self.global {
            Some(GlobalSignal::ExpandAll) => true,
            Some(GlobalSignal::CollapseAll) => false,
            None => tree.depth(id) < self.open_depth,
        }
    }

    /// 1ノードだけ開閉を反転。葉なら何もしない。反転後の状態を返す
    pub fn toggle(&mut self, tree: &OrgTree, id: NodeId) -> bool {
        if !tree.has_children(id) {
            return false;
        }
        let open = !self.is_expanded(tree, id);
        self.local.insert(tree.key(id).to_string(), open);
        open
    }

    pub fn set(&mut self, tree: &OrgTree, id: NodeId, open: bool) {
        if tree.has_children(id) {
            self.local.insert(tree.key(id).to_string(), open);
        }
    }

    pub fn expand_all(&mut self) {
        self.apply_global(GlobalSignal::ExpandAll);
    }

    pub fn collapse_all(&mut self) {
        self.apply_global(GlobalSignal::CollapseAll);
    }

    pub fn apply_global(&mut self, signal: GlobalSignal) {
        self.local.clear();
        self.global = Some(signal);
    }

    /// id までの祖先をすべて開く（検索結果へのジャンプ用）
    pub fn reveal(&mut self, tree: &OrgTree, id: NodeId) {
        let mut current = tree.parent(id);
        while let Some(ancestor) = current {
            self.local.insert(tree.key(ancestor).to_string(), true);
            current = tree.parent(ancestor);
        }
    }

    /// テーブル切替時の初期化
    pub fn reset(&mut self) {
        self.global = None;
        self.local.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::sample_tree;

    fn expanded_keys(state: &ExpansionState, tree: &OrgTree) -> Vec<String> {
        tree.pre_order()
            .filter(|&id| state.is_expanded(tree, id))
            .map(|id| tree.key(id).to_string())
            .collect()
    }

    #[test]
    fn test_default_opens_two_levels() {
        let tree = sample_tree();
        let state = ExpansionState::new();
        // depth 0, 1 の親ノードのみ。/1/1/2 は depth 2 なので閉じている
        assert_eq!(expanded_keys(&state, &tree), vec!["/1", "/1/1"]);
    }

    #[test]
    fn test_expand_all_opens_every_parent() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        state.toggle(&tree, tree.root());
        state.expand_all();

        for id in tree.pre_order() {
            assert_eq!(state.is_expanded(&tree, id), tree.has_children(id), "{}", tree.key(id));
        }
    }

    #[test]
    fn test_collapse_all_overrides_local_toggles() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        let ben = tree.id_of("/1/1/2").unwrap();
        state.set(&tree, ben, true);
        state.collapse_all();

        assert!(expanded_keys(&state, &tree).is_empty());
    }

    #[test]
    fn test_toggle_affects_only_that_node() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        state.expand_all();
        let avi = tree.id_of("/1/1").unwrap();
        let ben = tree.id_of("/1/1/2").unwrap();

        assert!(!state.toggle(&tree, avi));
        assert!(!state.is_expanded(&tree, avi));
        assert!(state.is_expanded(&tree, tree.root()));
        assert!(state.is_expanded(&tree, ben));
    }

    #[test]
    fn test_most_recent_operation_wins() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        let avi = tree.id_of("/1/1").unwrap();

        state.toggle(&tree, avi); // 閉じる
        state.expand_all(); // グローバルが後なので開く
        assert!(state.is_expanded(&tree, avi));

        state.toggle(&tree, avi); // ローカルが後なので閉じる
        assert!(!state.is_expanded(&tree, avi));
        assert_eq!(state.global(), Some(GlobalSignal::ExpandAll));
    }

    #[test]
    fn test_leaf_never_expands() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        let noa = tree.id_of("/1/2").unwrap();
        assert!(!state.toggle(&tree, noa));
        state.expand_all();
        assert!(!state.is_expanded(&tree, noa));
    }

    #[test]
    fn test_reveal_opens_ancestors() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        state.collapse_all();
        let joanne = tree.id_of("/1/1/2/1").unwrap();
        state.reveal(&tree, joanne);
        assert_eq!(expanded_keys(&state, &tree), vec!["/1", "/1/1", "/1/1/2"]);
    }
}
