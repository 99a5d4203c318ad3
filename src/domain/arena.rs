//! Arena-backed rooted hierarchy.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::geometry::Point;
use crate::domain::record::NodeKey;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub key: NodeKey,
    /// Label as supplied; empty or absent labels are resolved at scene time
    pub label: Option<String>,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, ordered by ascending height
    pub children: Vec<Index>,
    /// Distance from the root (root = 0)
    pub depth: usize,
    /// Longest distance to a descendant leaf (leaves = 0)
    pub height: usize,
    /// Set by the layout step; `x` is the sibling-spread axis, `y` the depth axis
    pub position: Option<Point>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for HierarchyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) if !label.is_empty() => write!(f, "{}", label),
            _ => write!(f, "{}", self.key),
        }
    }
}

/// Parent-child relation, `source` is the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub source: Index,
    pub target: Index,
}

/// Rooted hierarchy built from one record snapshot.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// There is always exactly one root: the synthetic one.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    arena: Arena<HierarchyNode>,
    root: Index,
    keys: HashMap<NodeKey, Index>,
}

impl Hierarchy {
    pub(crate) fn with_root(label: Option<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(HierarchyNode {
            key: NodeKey::Root,
            label,
            parent: None,
            children: Vec::new(),
            depth: 0,
            height: 0,
            position: None,
        });
        let mut keys = HashMap::new();
        keys.insert(NodeKey::Root, root);
        Self { arena, root, keys }
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn insert_node(
        &mut self,
        key: NodeKey,
        label: Option<String>,
        parent: Index,
    ) -> Index {
        let depth = self.arena.get(parent).map_or(0, |p| p.depth + 1);
        let node_idx = self.arena.insert(HierarchyNode {
            key: key.clone(),
            label,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            height: 0,
            position: None,
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        self.keys.insert(key, node_idx);
        node_idx
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_node(&self) -> &HierarchyNode {
        &self.arena[self.root]
    }

    pub fn node(&self, idx: Index) -> Option<&HierarchyNode> {
        self.arena.get(idx)
    }

    pub(crate) fn node_mut(&mut self, idx: Index) -> Option<&mut HierarchyNode> {
        self.arena.get_mut(idx)
    }

    pub fn find(&self, key: &NodeKey) -> Option<Index> {
        self.keys.get(key).copied()
    }

    pub fn get(&self, key: &NodeKey) -> Option<&HierarchyNode> {
        self.find(key).and_then(|idx| self.node(idx))
    }

    /// Number of nodes including the synthetic root.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Maximum node depth.
    pub fn depth(&self) -> usize {
        self.root_node().height
    }

    /// True once every node carries a position.
    pub fn is_laid_out(&self) -> bool {
        self.arena.iter().all(|(_, n)| n.position.is_some())
    }

    pub fn position(&self, idx: Index) -> Option<Point> {
        self.node(idx).and_then(|n| n.position)
    }

    /// Pre-order traversal, children in sorted order.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Breadth-first traversal starting at the root.
    pub fn descendants(&self) -> Vec<Index> {
        let mut order = Vec::with_capacity(self.len());
        let mut queue = VecDeque::from([self.root]);
        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            if let Some(node) = self.node(idx) {
                queue.extend(node.children.iter().copied());
            }
        }
        order
    }

    /// One link per non-root node, in breadth-first order of the child.
    pub fn links(&self) -> Vec<Link> {
        self.descendants()
            .into_iter()
            .filter_map(|target| {
                self.node(target)
                    .and_then(|n| n.parent)
                    .map(|source| Link { source, target })
            })
            .collect()
    }

    pub fn leaves(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, n)| n.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Path from `idx` up to the root, `idx` first.
    pub fn ancestors(&self, idx: Index) -> Vec<Index> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            match self.node(i) {
                Some(node) => {
                    path.push(i);
                    current = node.parent;
                }
                None => break,
            }
        }
        path
    }

    /// Render the subtree at `idx` as an indented tree of node labels.
    ///
    /// Works for arbitrarily deep hierarchies; the output itself grows with
    /// depth times node count.
    #[instrument(level = "debug", skip(self))]
    pub fn render_tree(&self, idx: Index) -> String {
        let tree = self.to_termtree(idx);
        let rendered = tree.to_string();
        dismantle(tree);
        rendered
    }

    /// Build the termtree bottom-up, children in `children` order.
    fn to_termtree(&self, idx: Index) -> Tree<String> {
        let mut done: HashMap<Index, Tree<String>> = HashMap::new();
        let mut stack = vec![(idx, false)];
        while let Some((current, expanded)) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if expanded {
                let leaves: Vec<_> = node
                    .children
                    .iter()
                    .filter_map(|c| done.remove(c))
                    .collect();
                done.insert(current, Tree::new(node.to_string()).with_leaves(leaves));
            } else {
                stack.push((current, true));
                stack.extend(node.children.iter().map(|&c| (c, false)));
            }
        }
        done.remove(&idx).unwrap_or_else(|| Tree::new(String::new()))
    }
}

/// Drop a termtree level by level; its own drop recurses once per level.
fn dismantle(tree: Tree<String>) {
    let mut stack = vec![tree];
    while let Some(mut tree) = stack.pop() {
        stack.append(&mut tree.leaves);
    }
}

pub struct PreOrderIterator<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(hierarchy: &'a Hierarchy) -> Self {
        Self {
            hierarchy,
            stack: vec![hierarchy.root()],
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.hierarchy.node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev().copied());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(hierarchy: &'a Hierarchy) -> Self {
        Self {
            hierarchy,
            stack: vec![(hierarchy.root(), false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.hierarchy.node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
