//! 組織ツリーのアリーナ表現
//!
//! APIから取得した入れ子の `OrgNode` を、NodeId で添字アクセスできる
//! フラットな配列に変換する。構築・走査はすべて反復処理で、
//! 深いツリーでもスタックを消費しない。
//!
//! NodeId は前順（pre-order）で振られるため、あるノードの部分木は
//! `id..id + 部分木サイズ` の連続区間になる。

use crate::error::{Error, Result};
use crate::types::OrgNode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// ツリー内のノード番号（前順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
struct Slot {
    /// children を取り除いたノード本体
    node: OrgNode,
    key: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
}

/// フラット化された組織ツリー
#[derive(Debug, Clone)]
pub struct OrgTree {
    slots: Vec<Slot>,
    index: HashMap<String, NodeId>,
}

impl OrgTree {
    /// ルートノードからツリーを構築
    ///
    /// `hierarchical_structure` が重複していれば `Error::DuplicateKey`。
    /// 空のキーは親キーと兄弟番号から `<親>/#<番号>` を合成する。
    pub fn from_root(root: OrgNode) -> Result<Self> {
        let mut slots: Vec<Slot> = Vec::new();
        let mut index = HashMap::new();
        let mut stack: Vec<(OrgNode, Option<NodeId>, usize, usize)> = vec![(root, None, 0, 0)];

        while let Some((mut node, parent, depth, sibling)) = stack.pop() {
            let id = NodeId(slots.len());
            let children = std::mem::take(&mut node.children);

            let key = if node.hierarchical_structure.is_empty() {
                match parent {
                    Some(p) => format!("{}/#{}", slots[p.0].key, sibling),
                    None => "/#0".to_string(),
                }
            } else {
                node.hierarchical_structure.clone()
            };

            if index.insert(key.clone(), id).is_some() {
                return Err(Error::DuplicateKey(key));
            }
            if let Some(p) = parent {
                slots[p.0].children.push(id);
            }

            slots.push(Slot {
                node,
                key,
                parent,
                children: Vec::with_capacity(children.len()),
                depth,
            });

            // 先頭の子から処理されるよう逆順に積む
            for (i, child) in children.into_iter().enumerate().rev() {
                stack.push((child, Some(id), depth + 1, i));
            }
        }

        Ok(Self { slots, index })
    }

    /// JSON文字列から構築
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_root(OrgNode::from_json(json)?)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.slots.len()
    }

    /// ノード本体（children は空）
    pub fn node(&self, id: NodeId) -> &OrgNode {
        &self.slots[id.0].node
    }

    pub fn get(&self, id: NodeId) -> Option<&OrgNode> {
        self.slots.get(id.0).map(|s| &s.node)
    }

    /// 識別キー（`hierarchical_structure` または合成キー）
    pub fn key(&self, id: NodeId) -> &str {
        &self.slots[id.0].key
    }

    pub fn id_of(&self, key: &str) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.slots[id.0].children.is_empty()
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.slots[id.0].depth
    }

    pub fn max_depth(&self) -> usize {
        self.slots.iter().map(|s| s.depth).max().unwrap_or(0)
    }

    /// 前順の全ノード
    pub fn pre_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.slots.len()).map(NodeId)
    }

    /// 幅優先の全ノード
    pub fn breadth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.slots.len());
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.children(id).iter().copied());
        }
        order
    }

    /// 部分木の NodeId 区間（自身を含む）
    fn subtree_range(&self, id: NodeId) -> std::ops::Range<usize> {
        let depth = self.depth(id);
        let end = (id.0 + 1..self.slots.len())
            .find(|&i| self.slots[i].depth <= depth)
            .unwrap_or(self.slots.len());
        id.0..end
    }

    /// 直属の部下
    pub fn direct_reports(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).to_vec()
    }

    /// 全ての部下（前順、自身を含まない）
    pub fn all_reports(&self, id: NodeId) -> Vec<NodeId> {
        self.subtree_range(id).skip(1).map(NodeId).collect()
    }

    /// 間接の部下（直属より下の全員）
    pub fn indirect_reports(&self, id: NodeId) -> Vec<NodeId> {
        let depth = self.depth(id);
        self.subtree_range(id)
            .map(NodeId)
            .filter(|&n| self.depth(n) > depth + 1)
            .collect()
    }

    /// ルートから id までの経路
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// 名前が完全一致する最初のノード（前順）
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.pre_order().find(|&id| self.node(id).name_str() == name)
    }

    /// 重複を除いた名前と役職の一覧（出現順）
    pub fn names_and_roles(&self) -> (Vec<String>, Vec<String>) {
        let mut names = Vec::new();
        let mut roles = Vec::new();
        let mut seen_names = HashSet::new();
        let mut seen_roles = HashSet::new();

        for id in self.pre_order() {
            let node = self.node(id);
            let name = node.name_str();
            if !name.is_empty() && seen_names.insert(name) {
                names.push(name.to_string());
            }
            let role = node.role_str();
            if !role.is_empty() && seen_roles.insert(role) {
                roles.push(role.to_string());
            }
        }

        (names, roles)
    }

    /// id を根とする入れ子の OrgNode を組み立て直す
    pub fn to_org_node(&self, id: NodeId) -> OrgNode {
        let range = self.subtree_range(id);
        let mut built: HashMap<usize, OrgNode> = HashMap::with_capacity(range.len());

        // 子は必ず親より後ろにあるので逆順に組み立てる
        for i in range.rev() {
            let slot = &self.slots[i];
            let mut node = slot.node.clone();
            node.children = slot
                .children
                .iter()
                .filter_map(|c| built.remove(&c.0))
                .collect();
            built.insert(i, node);
        }

        built.remove(&id.0).unwrap_or_default()
    }
}
