//! 組織ツリーの描画パス
//!
//! `render` はツリーと描画コンテキスト（展開状態・ハイライト・検索・
//! 組織モード・フィルタ）から、表示されるノードの一覧を作る純粋関数。
//! 各フロントエンド（Web・デスクトップ・CLIテキスト）はこの結果を
//! そのまま描画する。
//!
//! ノードの出現・消滅と画面位置の通知は `RenderTracker` が前回のパスとの
//! 差分から `NodeObserver` に送る。

use crate::expansion::ExpansionState;
use crate::filter::NodeFilter;
use crate::layout::TreeLayout;
use crate::search::{highlight_segments, SearchState};
use crate::tree::{NodeId, OrgTree};
use crate::types::OrgNode;
use crate::viewport::{Point, ViewportTransform};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 階層ごとの色（`depth mod 5` で巡回）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelColor {
    Blue,
    Green,
    Purple,
    Yellow,
    Pink,
}

impl LevelColor {
    pub const PALETTE: [LevelColor; 5] = [
        LevelColor::Blue,
        LevelColor::Green,
        LevelColor::Purple,
        LevelColor::Yellow,
        LevelColor::Pink,
    ];

    pub fn for_depth(depth: usize) -> Self {
        Self::PALETTE[depth % Self::PALETTE.len()]
    }

    /// Tailwind のクラス
    pub fn css_class(self) -> &'static str {
        match self {
            LevelColor::Blue => "bg-blue-100 border-blue-300",
            LevelColor::Green => "bg-green-100 border-green-300",
            LevelColor::Purple => "bg-purple-100 border-purple-300",
            LevelColor::Yellow => "bg-yellow-100 border-yellow-300",
            LevelColor::Pink => "bg-pink-100 border-pink-300",
        }
    }

    /// 背景色（RGB）
    pub fn fill_rgb(self) -> [u8; 3] {
        match self {
            LevelColor::Blue => [219, 234, 254],
            LevelColor::Green => [220, 252, 231],
            LevelColor::Purple => [243, 232, 255],
            LevelColor::Yellow => [254, 249, 195],
            LevelColor::Pink => [252, 231, 243],
        }
    }

    /// 枠線色（RGB）
    pub fn border_rgb(self) -> [u8; 3] {
        match self {
            LevelColor::Blue => [147, 197, 253],
            LevelColor::Green => [134, 239, 172],
            LevelColor::Purple => [216, 180, 254],
            LevelColor::Yellow => [253, 224, 71],
            LevelColor::Pink => [249, 168, 212],
        }
    }
}

/// ノードの装飾。`Current` が最優先、`Match` と `Highlighted` は同じ見た目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decoration {
    None,
    Highlighted,
    Match,
    Current,
}

impl Decoration {
    pub fn resolve(is_current: bool, is_match: bool, is_highlighted: bool) -> Self {
        if is_current {
            Decoration::Current
        } else if is_match {
            Decoration::Match
        } else if is_highlighted {
            Decoration::Highlighted
        } else {
            Decoration::None
        }
    }

    /// 枠線だけの二次装飾か
    pub fn is_border(self) -> bool {
        matches!(self, Decoration::Match | Decoration::Highlighted)
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Decoration::None => "",
            Decoration::Highlighted | Decoration::Match => "ring-2 ring-blue-400",
            Decoration::Current => "ring-4 ring-orange-500 bg-orange-50",
        }
    }
}

/// 親から子への接続線の形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connector {
    /// 表示中の子がいない
    None,
    /// 子が1人: 長い縦線1本
    Single,
    /// 子が2人以上: 最初の子から最後の子の中心までの横棒と各子への縦線
    Branch,
}

impl Connector {
    fn for_children(count: usize) -> Self {
        match count {
            0 => Connector::None,
            1 => Connector::Single,
            _ => Connector::Branch,
        }
    }
}

/// ラベルの断片（一致部分は強調表示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPart {
    pub text: String,
    pub matched: bool,
}

fn label_parts(text: &str, term: &str) -> Vec<LabelPart> {
    highlight_segments(text, term)
        .into_iter()
        .map(|s| LabelPart {
            text: s.text.to_string(),
            matched: s.matched,
        })
        .collect()
}

/// 表示される1ノード
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNode {
    /// 元ノードへの参照（`OrgTree::node`）
    pub id: NodeId,
    pub key: String,
    pub depth: usize,
    pub color: LevelColor,
    /// 太字の主ラベル（組織モードでは役職）
    pub primary: Vec<LabelPart>,
    pub secondary: Vec<LabelPart>,
    /// 子が1人以上いれば開閉ボタンを出す
    pub has_disclosure: bool,
    pub expanded: bool,
    pub decoration: Decoration,
    pub connector: Connector,
    /// パス内の親の位置
    pub parent: Option<usize>,
    /// パス内の表示中の子の位置（表示順）
    pub children: Vec<usize>,
}

impl RenderedNode {
    pub fn primary_text(&self) -> String {
        self.primary.iter().map(|p| p.text.as_str()).collect()
    }

    pub fn secondary_text(&self) -> String {
        self.secondary.iter().map(|p| p.text.as_str()).collect()
    }
}

/// 描画の入力（ツリー以外）
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub expansion: &'a ExpansionState,
    pub highlighted: Option<&'a HashSet<String>>,
    pub search: Option<&'a SearchState>,
    pub org_mode: bool,
    pub filter: Option<&'a NodeFilter>,
}

impl<'a> RenderContext<'a> {
    pub fn new(expansion: &'a ExpansionState) -> Self {
        Self {
            expansion,
            highlighted: None,
            search: None,
            org_mode: false,
            filter: None,
        }
    }

    pub fn with_highlighted(mut self, highlighted: &'a HashSet<String>) -> Self {
        self.highlighted = Some(highlighted);
        self
    }

    pub fn with_search(mut self, search: &'a SearchState) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_org_mode(mut self, org_mode: bool) -> Self {
        self.org_mode = org_mode;
        self
    }

    pub fn with_filter(mut self, filter: &'a NodeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    fn term(&self) -> &str {
        self.search.map(|s| s.term()).unwrap_or("")
    }

    fn decoration(&self, key: &str) -> Decoration {
        let (is_current, is_match) = match self.search {
            Some(search) => (search.is_current(key), search.is_match(key)),
            None => (false, false),
        };
        let is_highlighted = self.highlighted.is_some_and(|h| h.contains(key));
        Decoration::resolve(is_current, is_match, is_highlighted)
    }

    fn passes(&self, tree: &OrgTree, id: NodeId) -> bool {
        self.filter.map_or(true, |f| f.matches_id(tree, id))
    }
}

/// 1回の描画結果（前順）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPass {
    nodes: Vec<RenderedNode>,
    index: HashMap<String, usize>,
}

impl RenderPass {
    pub fn nodes(&self) -> &[RenderedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&RenderedNode> {
        self.nodes.first()
    }

    pub fn get(&self, index: usize) -> Option<&RenderedNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn find(&self, key: &str) -> Option<&RenderedNode> {
        self.index_of(key).map(|i| &self.nodes[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(|n| n.key.as_str())
    }
}

/// 表示されるノードを前順で列挙する
///
/// 閉じたノードの子と、フィルタを通らないノード（とその部下）は出てこない。
/// ツリーが無ければ空のパス。
pub fn render(tree: Option<&OrgTree>, ctx: &RenderContext<'_>) -> RenderPass {
    let mut pass = RenderPass::default();
    let Some(tree) = tree else {
        return pass;
    };
    if tree.is_empty() || !ctx.passes(tree, tree.root()) {
        return pass;
    }

    let term = ctx.term();
    let mut stack: Vec<(NodeId, Option<usize>)> = vec![(tree.root(), None)];

    while let Some((id, parent)) = stack.pop() {
        let node = tree.node(id);
        let key = tree.key(id).to_string();
        let depth = tree.depth(id);
        let expanded = ctx.expansion.is_expanded(tree, id);

        let (primary, secondary) = if ctx.org_mode {
            (node.display_role(), node.display_name())
        } else {
            (node.display_name(), node.display_role())
        };

        let index = pass.nodes.len();
        if let Some(p) = parent {
            pass.nodes[p].children.push(index);
        }
        pass.index.insert(key.clone(), index);
        pass.nodes.push(RenderedNode {
            id,
            decoration: ctx.decoration(&key),
            key,
            depth,
            color: LevelColor::for_depth(depth),
            primary: label_parts(primary, term),
            secondary: label_parts(secondary, term),
            has_disclosure: tree.has_children(id),
            expanded,
            connector: Connector::None,
            parent,
            children: Vec::new(),
        });

        if expanded {
            for &child in tree.children(id).iter().rev() {
                if ctx.passes(tree, child) {
                    stack.push((child, Some(index)));
                }
            }
        }
    }

    for node in &mut pass.nodes {
        node.connector = Connector::for_children(node.children.len());
    }
    pass
}

/// 描画結果の通知先
pub trait NodeObserver {
    /// ノードが新たに表示された
    fn on_rendered(&mut self, node: &OrgNode);
    /// ノードが表示されなくなった
    fn on_unrendered(&mut self, key: &str);
    /// ノードの画面上の位置（左上）
    fn on_position(&mut self, key: &str, x: f64, y: f64);
}

/// 前回のパスとの差分を通知する
#[derive(Debug, Clone, Default)]
pub struct RenderTracker {
    visible: HashSet<String>,
}

impl RenderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.contains(key)
    }

    /// 出現したノードを表示順に、消えたノードをキー順に通知
    pub fn sync(&mut self, tree: Option<&OrgTree>, pass: &RenderPass, observer: &mut dyn NodeObserver) {
        let current: HashSet<String> = pass.keys().map(str::to_string).collect();

        let mut gone: Vec<&String> = self.visible.difference(&current).collect();
        gone.sort();
        for key in gone {
            observer.on_unrendered(key);
        }

        if let Some(tree) = tree {
            for node in pass.nodes() {
                if !self.visible.contains(&node.key) {
                    observer.on_rendered(tree.node(node.id));
                }
            }
        }

        self.visible = current;
    }

    /// レイアウト後の画面位置をすべて通知
    pub fn report_positions(
        &self,
        layout: &TreeLayout,
        transform: &ViewportTransform,
        observer: &mut dyn NodeObserver,
    ) {
        for b in layout.boxes() {
            let screen = transform.to_screen(Point::new(b.x, b.y));
            observer.on_position(&b.key, screen.x, screen.y);
        }
    }

    /// テーブル切替時など、全ノードを消えたものとして通知
    pub fn clear(&mut self, observer: &mut dyn NodeObserver) {
        let mut keys: Vec<String> = self.visible.drain().collect();
        keys.sort();
        for key in keys {
            observer.on_unrendered(&key);
        }
    }
}

/// キーから画面位置を引ける索引（検索結果へのスクロール用）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionIndex {
    positions: HashMap<String, Point>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Point> {
        self.positions.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl NodeObserver for PositionIndex {
    fn on_rendered(&mut self, _node: &OrgNode) {}

    fn on_unrendered(&mut self, key: &str) {
        self.positions.remove(key);
    }

    fn on_position(&mut self, key: &str, x: f64, y: f64) {
        self.positions.insert(key.to_string(), Point::new(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, LayoutConfig};
    use crate::search::SearchFields;
    use crate::tree::tests::sample_tree;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl NodeObserver for Recorder {
        fn on_rendered(&mut self, node: &OrgNode) {
            self.events.push(format!("+{}", node.hierarchical_structure));
        }
        fn on_unrendered(&mut self, key: &str) {
            self.events.push(format!("-{}", key));
        }
        fn on_position(&mut self, key: &str, _x: f64, _y: f64) {
            self.events.push(format!("@{}", key));
        }
    }

    /// `[A(B, C), D]` を根 R の下にぶら下げたツリー
    fn abcd_tree() -> OrgTree {
        let root = OrgNode::new("/r", "R", "Root").with_children(vec![
            OrgNode::new("/r/a", "A", "Lead")
                .with_children(vec![OrgNode::new("/r/a/b", "B", "x"), OrgNode::new("/r/a/c", "C", "y")]),
            OrgNode::new("/r/d", "D", "Solo"),
        ]);
        OrgTree::from_root(root).unwrap()
    }

    #[test]
    fn test_level_colors_cycle() {
        assert_eq!(LevelColor::for_depth(0), LevelColor::Blue);
        assert_eq!(LevelColor::for_depth(4), LevelColor::Pink);
        assert_eq!(LevelColor::for_depth(5), LevelColor::Blue);
        assert_eq!(LevelColor::for_depth(7), LevelColor::Purple);
    }

    #[test]
    fn test_render_none_tree() {
        let expansion = ExpansionState::new();
        let pass = render(None, &RenderContext::new(&expansion));
        assert!(pass.is_empty());
        assert!(pass.root().is_none());
    }

    #[test]
    fn test_render_default_expansion() {
        let tree = sample_tree();
        let expansion = ExpansionState::new();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        // Joanne は /1/1/2 (depth 2) が閉じているので出ない
        let keys: Vec<_> = pass.keys().collect();
        assert_eq!(keys, vec!["/1", "/1/1", "/1/1/1", "/1/1/2", "/1/2"]);

        let ben = pass.find("/1/1/2").unwrap();
        assert!(ben.has_disclosure);
        assert!(!ben.expanded);
        assert_eq!(ben.connector, Connector::None);
    }

    #[test]
    fn test_disclosure_and_connectors() {
        let tree = abcd_tree();
        let mut expansion = ExpansionState::new();
        expansion.expand_all();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));

        let a = pass.find("/r/a").unwrap();
        let d = pass.find("/r/d").unwrap();
        assert!(a.has_disclosure);
        assert_eq!(a.connector, Connector::Branch);
        assert!(!d.has_disclosure);
        assert_eq!(d.connector, Connector::None);

        let children: Vec<_> = a.children.iter().map(|&i| pass.nodes()[i].key.as_str()).collect();
        assert_eq!(children, vec!["/r/a/b", "/r/a/c"]);

        // 子が1人だけのノードは縦線のみ
        let single = OrgNode::new("/p", "P", "x").with_children(vec![OrgNode::new("/p/q", "Q", "y")]);
        let tree = OrgTree::from_root(single).unwrap();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        assert_eq!(pass.root().unwrap().connector, Connector::Single);
    }

    #[test]
    fn test_collapse_all_hides_children() {
        let tree = sample_tree();
        let mut expansion = ExpansionState::new();
        expansion.collapse_all();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        assert_eq!(pass.len(), 1);
        assert_eq!(pass.root().unwrap().connector, Connector::None);
    }

    #[test]
    fn test_toggle_keeps_siblings_visible() {
        let tree = abcd_tree();
        let mut expansion = ExpansionState::new();
        let a = tree.id_of("/r/a").unwrap();
        expansion.toggle(&tree, a);
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        let keys: Vec<_> = pass.keys().collect();
        assert_eq!(keys, vec!["/r", "/r/a", "/r/d"]);
    }

    #[test]
    fn test_search_decoration() {
        let tree = sample_tree();
        let expansion = ExpansionState::new();
        let mut search = SearchState::new();
        search.update(Some(&tree), "ann", SearchFields::NAME);

        let ctx = RenderContext::new(&expansion).with_search(&search);
        let pass = render(Some(&tree), &ctx);
        let anna = pass.find("/1/1/1").unwrap();
        assert_eq!(anna.decoration, Decoration::Current);
        assert_eq!(
            anna.primary,
            vec![
                LabelPart { text: "Ann".into(), matched: true },
                LabelPart { text: "a".into(), matched: false },
            ]
        );

        // 現在位置を Joanne に進めると Anna は一致のみ
        search.next();
        let ctx = RenderContext::new(&expansion).with_search(&search);
        let pass = render(Some(&tree), &ctx);
        let anna = pass.find("/1/1/1").unwrap();
        assert_eq!(anna.decoration, Decoration::Match);
        assert!(anna.decoration.is_border());
    }

    #[test]
    fn test_current_beats_highlight() {
        let tree = sample_tree();
        let expansion = ExpansionState::new();
        let mut search = SearchState::new();
        search.update(Some(&tree), "Dana", SearchFields::NAME);
        let highlighted: HashSet<String> = ["/1".to_string(), "/1/2".to_string()].into();

        let ctx = RenderContext::new(&expansion)
            .with_search(&search)
            .with_highlighted(&highlighted);
        let pass = render(Some(&tree), &ctx);
        assert_eq!(pass.find("/1").unwrap().decoration, Decoration::Current);
        assert_eq!(pass.find("/1/2").unwrap().decoration, Decoration::Highlighted);
        assert_eq!(pass.find("/1/1").unwrap().decoration, Decoration::None);
    }

    #[test]
    fn test_org_mode_swaps_labels() {
        let tree = sample_tree();
        let expansion = ExpansionState::new();
        let pass = render(Some(&tree), &RenderContext::new(&expansion).with_org_mode(true));
        let root = pass.root().unwrap();
        assert_eq!(root.primary_text(), "CEO");
        assert_eq!(root.secondary_text(), "Dana");
    }

    #[test]
    fn test_missing_labels_fallback() {
        let tree = OrgTree::from_root(OrgNode {
            hierarchical_structure: "/x".into(),
            ..Default::default()
        })
        .unwrap();
        let expansion = ExpansionState::new();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        assert_eq!(pass.root().unwrap().primary_text(), "Unnamed");
        assert_eq!(pass.root().unwrap().secondary_text(), "No Role");
    }

    #[test]
    fn test_filter_prunes_subtree() {
        let tree = sample_tree();
        let mut expansion = ExpansionState::new();
        expansion.expand_all();
        let filter = NodeFilter::new(vec!["C".into(), "Ben".into(), "Joanne".into()]);
        // Avi (CTO) は通るが Anna は落ちる。Joanne は Ben 経由で残る
        let pass = render(Some(&tree), &RenderContext::new(&expansion).with_filter(&filter));
        let keys: Vec<_> = pass.keys().collect();
        assert_eq!(keys, vec!["/1", "/1/1", "/1/1/2", "/1/1/2/1", "/1/2"]);
        assert_eq!(pass.find("/1/1").unwrap().connector, Connector::Single);

        let filter = NodeFilter::new(vec!["Engineer".into()]);
        let pass = render(Some(&tree), &RenderContext::new(&expansion).with_filter(&filter));
        assert!(pass.is_empty());
    }

    #[test]
    fn test_tracker_reports_diff() {
        let tree = sample_tree();
        let mut expansion = ExpansionState::new();
        let mut tracker = RenderTracker::new();
        let mut recorder = Recorder::default();

        expansion.collapse_all();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        tracker.sync(Some(&tree), &pass, &mut recorder);
        assert_eq!(recorder.events, vec!["+/1"]);

        recorder.events.clear();
        expansion.set(&tree, tree.root(), true);
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        tracker.sync(Some(&tree), &pass, &mut recorder);
        assert_eq!(recorder.events, vec!["+/1/1", "+/1/2"]);

        recorder.events.clear();
        expansion.collapse_all();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        tracker.sync(Some(&tree), &pass, &mut recorder);
        assert_eq!(recorder.events, vec!["-/1/1", "-/1/2"]);
        assert!(tracker.is_visible("/1"));
    }

    #[test]
    fn test_position_index_follows_transform() {
        let tree = sample_tree();
        let expansion = ExpansionState::new();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        let tree_layout = layout(&pass, &LayoutConfig::default());

        let mut tracker = RenderTracker::new();
        let mut index = PositionIndex::new();
        tracker.sync(Some(&tree), &pass, &mut index);

        let transform = ViewportTransform::new(10.0, -20.0, 0.5);
        tracker.report_positions(&tree_layout, &transform, &mut index);
        assert_eq!(index.len(), pass.len());

        let b = tree_layout.box_of("/1/2").unwrap();
        let p = index.get("/1/2").unwrap();
        assert_eq!(p, Point::new(10.0 + 0.5 * b.x, -20.0 + 0.5 * b.y));

        tracker.clear(&mut index);
        assert!(index.is_empty());
    }

    #[test]
    fn test_transform_round_trip_reproduces_positions() {
        let tree = sample_tree();
        let mut expansion = ExpansionState::new();
        expansion.expand_all();
        let pass = render(Some(&tree), &RenderContext::new(&expansion));
        let tree_layout = layout(&pass, &LayoutConfig::default());
        let tracker = RenderTracker::new();

        let transform = ViewportTransform::new(-137.25, 42.5, 0.625);
        let mut before = PositionIndex::new();
        tracker.report_positions(&tree_layout, &transform, &mut before);

        let json = serde_json::to_string(&transform).unwrap();
        let restored: ViewportTransform = serde_json::from_str(&json).unwrap();
        let mut after = PositionIndex::new();
        tracker.report_positions(&tree_layout, &restored, &mut after);

        assert_eq!(before, after);
        assert_eq!(after.len(), tree.len());
    }
}
