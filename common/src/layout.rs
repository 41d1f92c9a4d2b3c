//! 組織図のレイアウト計算
//!
//! 描画パスの各ノードに、変換前のコンテンツ座標でのボックスと
//! 接続線を割り当てる。部分木の幅は子の部分木幅の合計（＋間隔）と
//! ノード幅の大きい方。親は最初と最後の子の中心の中点に置く。
//!
//! パスは前順なので、逆順に走査すれば子が親より先に確定する。
//! 再帰は使わない。

use crate::render::{Connector, RenderPass};
use crate::viewport::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// レイアウト定数（px）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// 隣り合う部分木の間隔
    pub sibling_gap: f64,
    /// 親の下端から子の上端まで
    pub vertical_gap: f64,
    pub padding: f64,
    pub top_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 288.0,
            node_height: 140.0,
            sibling_gap: 48.0,
            vertical_gap: 128.0,
            padding: 32.0,
            top_padding: 80.0,
        }
    }
}

/// 1ノードのボックス（左上原点）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBox {
    pub key: String,
    /// 描画パス内の位置
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.y + self.height / 2.0)
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.bottom()
    }
}

/// 線分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

impl Line {
    fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn is_vertical(&self) -> bool {
        self.from.x == self.to.x
    }

    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y
    }
}

/// 親から子への接続線一式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// 親の描画パス内の位置
    pub parent: usize,
    pub kind: Connector,
    pub segments: Vec<Line>,
}

impl Link {
    /// 分岐の横棒（Branch のときのみ）
    pub fn bar(&self) -> Option<&Line> {
        match self.kind {
            Connector::Branch => self.segments.iter().find(|s| s.is_horizontal() && s.from.x != s.to.x),
            _ => None,
        }
    }
}

/// レイアウト結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeLayout {
    boxes: Vec<NodeBox>,
    links: Vec<Link>,
    index: HashMap<String, usize>,
    bounds: Size,
}

impl TreeLayout {
    /// 描画パスと同じ順序のボックス
    pub fn boxes(&self) -> &[NodeBox] {
        &self.boxes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn box_of(&self, key: &str) -> Option<&NodeBox> {
        self.index.get(key).map(|&i| &self.boxes[i])
    }

    pub fn link_of(&self, key: &str) -> Option<&Link> {
        let parent = *self.index.get(key)?;
        self.links.iter().find(|l| l.parent == parent)
    }

    /// 余白込みのコンテンツサイズ
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// コンテンツ座標の点にあるノード
    pub fn hit_test(&self, p: Point) -> Option<&NodeBox> {
        self.boxes.iter().find(|b| b.contains(p))
    }
}

/// 描画パスをレイアウトする
pub fn layout(pass: &RenderPass, config: &LayoutConfig) -> TreeLayout {
    let nodes = pass.nodes();
    if nodes.is_empty() {
        return TreeLayout::default();
    }
    let n = nodes.len();
    let root_depth = nodes[0].depth;

    // 部分木の幅
    let mut widths = vec![0.0_f64; n];
    for i in (0..n).rev() {
        let children = &nodes[i].children;
        let total: f64 = children.iter().map(|&c| widths[c]).sum::<f64>()
            + config.sibling_gap * children.len().saturating_sub(1) as f64;
        widths[i] = total.max(config.node_width);
    }

    // 部分木の左端を上から割り当てる
    let mut lefts = vec![0.0_f64; n];
    lefts[0] = config.padding;
    for i in 0..n {
        let children = &nodes[i].children;
        if children.is_empty() {
            continue;
        }
        let total: f64 = children.iter().map(|&c| widths[c]).sum::<f64>()
            + config.sibling_gap * (children.len() - 1) as f64;
        let mut cursor = lefts[i] + (widths[i] - total) / 2.0;
        for &c in children {
            lefts[c] = cursor;
            cursor += widths[c] + config.sibling_gap;
        }
    }

    // 中心は子から決まる
    let mut centers = vec![0.0_f64; n];
    for i in (0..n).rev() {
        let children = &nodes[i].children;
        centers[i] = match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => (centers[first] + centers[last]) / 2.0,
            _ => lefts[i] + widths[i] / 2.0,
        };
    }

    let level_height = config.node_height + config.vertical_gap;
    let mut result = TreeLayout::default();
    let mut max_x = 0.0_f64;
    let mut max_y = 0.0_f64;

    for (i, node) in nodes.iter().enumerate() {
        let level = node.depth.saturating_sub(root_depth) as f64;
        let b = NodeBox {
            key: node.key.clone(),
            index: i,
            x: centers[i] - config.node_width / 2.0,
            y: config.top_padding + level * level_height,
            width: config.node_width,
            height: config.node_height,
        };
        max_x = max_x.max(b.x + b.width);
        max_y = max_y.max(b.bottom());
        result.index.insert(b.key.clone(), i);
        result.boxes.push(b);
    }

    for (i, node) in nodes.iter().enumerate() {
        if node.children.is_empty() {
            continue;
        }
        let parent = &result.boxes[i];
        let top = parent.bottom();
        let bottom = top + config.vertical_gap;
        let cx = parent.center_x();

        let segments = match node.connector {
            Connector::Single => vec![Line::new(Point::new(cx, top), Point::new(cx, bottom))],
            _ => {
                let bar_y = top + config.vertical_gap / 2.0;
                let first = result.boxes[node.children[0]].center_x();
                let last = result.boxes[node.children[node.children.len() - 1]].center_x();
                let mut segments = vec![
                    Line::new(Point::new(cx, top), Point::new(cx, bar_y)),
                    Line::new(Point::new(first, bar_y), Point::new(last, bar_y)),
                ];
                segments.extend(node.children.iter().map(|&c| {
                    let child_x = result.boxes[c].center_x();
                    Line::new(Point::new(child_x, bar_y), Point::new(child_x, bottom))
                }));
                segments
            }
        };
        result.links.push(Link {
            parent: i,
            kind: node.connector,
            segments,
        });
    }

    result.bounds = Size::new(max_x + config.padding, max_y + config.padding);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::ExpansionState;
    use crate::render::{render, RenderContext};
    use crate::tree::tests::sample_tree;
    use crate::tree::OrgTree;
    use crate::types::OrgNode;

    fn expanded_layout(tree: &OrgTree) -> TreeLayout {
        let mut expansion = ExpansionState::new();
        expansion.expand_all();
        let pass = render(Some(tree), &RenderContext::new(&expansion));
        layout(&pass, &LayoutConfig::default())
    }

    #[test]
    fn test_empty_pass() {
        let layout = layout(&RenderPass::default(), &LayoutConfig::default());
        assert!(layout.boxes().is_empty());
        assert_eq!(layout.bounds(), Size::new(0.0, 0.0));
    }

    #[test]
    fn test_children_below_parent() {
        let tree = sample_tree();
        let layout = expanded_layout(&tree);
        let config = LayoutConfig::default();

        let root = layout.box_of("/1").unwrap();
        let avi = layout.box_of("/1/1").unwrap();
        assert_eq!(root.y, config.top_padding);
        assert_eq!(avi.y, root.bottom() + config.vertical_gap);
        assert_eq!(layout.box_of("/1/1/2/1").unwrap().y, config.top_padding + 3.0 * 268.0);
    }

    #[test]
    fn test_siblings_do_not_overlap() {
        let tree = sample_tree();
        let layout = expanded_layout(&tree);
        let mut rows: HashMap<i64, Vec<&NodeBox>> = HashMap::new();
        for b in layout.boxes() {
            rows.entry(b.y as i64).or_default().push(b);
        }
        for row in rows.values_mut() {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            for pair in row.windows(2) {
                assert!(pair[0].x + pair[0].width + 48.0 <= pair[1].x + 1e-9);
            }
        }
    }

    #[test]
    fn test_branch_bar_spans_first_to_last_child() {
        let tree = sample_tree();
        let layout = expanded_layout(&tree);
        let link = layout.link_of("/1/1").unwrap();
        assert_eq!(link.kind, Connector::Branch);

        let bar = link.bar().unwrap();
        let anna = layout.box_of("/1/1/1").unwrap();
        let ben = layout.box_of("/1/1/2").unwrap();
        assert_eq!(bar.from.x, anna.center_x());
        assert_eq!(bar.to.x, ben.center_x());

        // 親の縦線は横棒の中点に落ちる
        let avi = layout.box_of("/1/1").unwrap();
        assert_eq!(avi.center_x(), (bar.from.x + bar.to.x) / 2.0);
        assert_eq!(link.segments.len(), 4);
    }

    #[test]
    fn test_single_child_is_one_vertical_line() {
        let tree = sample_tree();
        let layout = expanded_layout(&tree);
        let link = layout.link_of("/1/1/2").unwrap();
        assert_eq!(link.kind, Connector::Single);
        assert_eq!(link.segments.len(), 1);
        assert!(link.segments[0].is_vertical());
        assert!(link.bar().is_none());

        let ben = layout.box_of("/1/1/2").unwrap();
        let joanne = layout.box_of("/1/1/2/1").unwrap();
        assert_eq!(ben.center_x(), joanne.center_x());
        assert_eq!(link.segments[0].to.y, joanne.y);
    }

    #[test]
    fn test_bounds_and_hit_test() {
        let tree = sample_tree();
        let layout = expanded_layout(&tree);
        let bounds = layout.bounds();
        for b in layout.boxes() {
            assert!(b.x >= 32.0);
            assert!(b.x + b.width <= bounds.width - 32.0 + 1e-9);
            assert!(b.bottom() <= bounds.height - 32.0 + 1e-9);
        }

        let noa = layout.box_of("/1/2").unwrap();
        assert_eq!(layout.hit_test(noa.center()).unwrap().key, "/1/2");
        assert!(layout.hit_test(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_wide_tree_is_iterative() {
        let children: Vec<OrgNode> = (0..5_000)
            .map(|i| OrgNode::new(format!("/r/{}", i), "N", "x"))
            .collect();
        let tree = OrgTree::from_root(OrgNode::new("/r", "R", "x").with_children(children)).unwrap();
        let layout = expanded_layout(&tree);
        assert_eq!(layout.boxes().len(), 5_001);
        assert_eq!(layout.link_of("/r").unwrap().segments.len(), 5_002);
    }
}
