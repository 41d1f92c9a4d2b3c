use std::collections::HashSet;
use std::path::PathBuf;

use orgchart_common::{
    render, ExpansionState, NodeFilter, OrgTree, RenderContext, RenderPass, SearchFields, SearchState,
    ViewportController,
};
use orgchart_common::{press::PressTracker, SystemClock};

/// 表示中の組織図と操作状態
#[derive(Debug, Default)]
pub struct ViewerState {
    pub tree: Option<OrgTree>,
    pub source_path: Option<PathBuf>,
    pub expansion: ExpansionState,
    pub search: SearchState,
    pub search_input: String,
    pub filter: NodeFilter,
    pub filter_input: String,
    pub highlighted: HashSet<String>,
    pub org_mode: bool,
    pub selected: Option<String>,
    pub viewport: ViewportController,
    pub press: PressTracker,
    pub clock: SystemClock,
}

impl ViewerState {
    /// ツリーを差し替え、表示状態を初期化
    pub fn replace_tree(&mut self, tree: OrgTree, source: PathBuf) {
        self.tree = Some(tree);
        self.source_path = Some(source);
        self.expansion.reset();
        self.search.clear();
        self.search_input.clear();
        self.highlighted.clear();
        self.selected = None;
        self.viewport.reset();
        self.press.cancel();
    }

    pub fn render_pass(&self) -> RenderPass {
        let ctx = RenderContext::new(&self.expansion)
            .with_search(&self.search)
            .with_filter(&self.filter)
            .with_highlighted(&self.highlighted)
            .with_org_mode(self.org_mode);
        render(self.tree.as_ref(), &ctx)
    }

    pub fn run_search(&mut self) {
        self.search.update(self.tree.as_ref(), &self.search_input, SearchFields::NAME_AND_ROLE);
        self.reveal_current();
    }

    pub fn next_result(&mut self) {
        self.search.next();
        self.reveal_current();
    }

    pub fn prev_result(&mut self) {
        self.search.prev();
        self.reveal_current();
    }

    fn reveal_current(&mut self) {
        let (Some(tree), Some(key)) = (self.tree.as_ref(), self.search.current_key()) else {
            return;
        };
        if let Some(id) = tree.id_of(key) {
            self.expansion.reveal(tree, id);
        }
    }

    pub fn toggle_expand(&mut self, key: &str) {
        if let Some(tree) = &self.tree {
            if let Some(id) = tree.id_of(key) {
                self.expansion.toggle(tree, id);
            }
        }
    }

    pub fn toggle_highlight(&mut self, key: &str) {
        if !self.highlighted.remove(key) {
            self.highlighted.insert(key.to_string());
        }
    }

    /// カンマ区切りの入力からフィルタを作る
    pub fn apply_filter_input(&mut self) {
        let terms = self
            .filter_input
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self.filter = NodeFilter::new(terms);
    }
}
