//! Tidy-tree layout.
//!
//! Reingold–Tilford node placement with the linear-time apportioning of
//! Buchheim, Jünger and Leipert ("Improving Walker's Algorithm to Run in
//! Linear Time", 2002):
//!
//! 1. **First walk (post-order):** preliminary spread coordinates; sibling
//!    subtrees are pushed apart along their contours, using threads so contour
//!    traversal stays amortized O(1).
//! 2. **Second walk (pre-order):** accumulated modifiers turn preliminary
//!    values into final positions.
//! 3. **Normalization:** the spread axis is scaled into `[0, extent.spread]`
//!    and the depth axis into `[0, extent.depth]`.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::Hierarchy;
use crate::domain::error::{ConfigError, DomainResult};
use crate::domain::geometry::Point;

/// Four-sided inset, serialized as `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl Default for Insets {
    fn default() -> Self {
        Self::new(20.0, 120.0, 20.0, 120.0)
    }
}

impl From<[f64; 4]> for Insets {
    fn from([top, right, bottom, left]: [f64; 4]) -> Self {
        Self::new(top, right, bottom, left)
    }
}

impl From<Insets> for [f64; 4] {
    fn from(i: Insets) -> Self {
        [i.top, i.right, i.bottom, i.left]
    }
}

/// Drawing surface size and padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub padding: Insets,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            padding: Insets::default(),
        }
    }
}

impl Canvas {
    /// Area left for the tree once the padding is removed.
    ///
    /// Nodes spread vertically and grow in depth horizontally.
    pub fn inner_extent(&self) -> Result<Extent, ConfigError> {
        let extent = Extent {
            spread: self.height - self.padding.top - self.padding.bottom,
            depth: self.width - self.padding.left - self.padding.right,
        };
        extent.validate()?;
        Ok(extent)
    }
}

/// Layout target size along the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spread: f64,
    pub depth: f64,
}

impl Extent {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, extent) in [("spread", self.spread), ("depth", self.depth)] {
            if !extent.is_finite() {
                return Err(ConfigError::NonFiniteExtent { axis, extent });
            }
            if extent <= 0.0 {
                return Err(ConfigError::NonPositiveExtent { axis, extent });
            }
        }
        Ok(())
    }
}

/// Separation between neighbouring nodes, in units of the unscaled layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Between nodes sharing a parent
    pub sibling_separation: f64,
    /// Between nodes of different parents
    pub subtree_separation: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            sibling_separation: 1.0,
            subtree_separation: 2.0,
        }
    }
}

impl LayoutOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("sibling_separation", self.sibling_separation),
            ("subtree_separation", self.subtree_separation),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Working state of one node during the walks.
#[derive(Debug)]
struct LayoutNode {
    /// `None` only for the sentinel parent of the root
    source: Option<Index>,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among siblings
    number: usize,
    depth: usize,
    prelim: f64,
    modifier: f64,
    shift: f64,
    change: f64,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
    x: f64,
}

impl LayoutNode {
    fn new(
        slot: usize,
        source: Option<Index>,
        parent: Option<usize>,
        number: usize,
        depth: usize,
    ) -> Self {
        Self {
            source,
            parent,
            children: Vec::new(),
            number,
            depth,
            prelim: 0.0,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
            thread: None,
            ancestor: slot,
            default_ancestor: None,
            x: 0.0,
        }
    }
}

const SENTINEL: usize = 0;
const ROOT: usize = 1;

#[derive(Debug, Clone, Default)]
pub struct TidyTree {
    options: LayoutOptions,
}

impl TidyTree {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Assign a position to every node of `hierarchy`.
    ///
    /// `x` lies in `[0, extent.spread]`, `y = depth * extent.depth / max_depth`.
    #[instrument(level = "debug", skip(self, hierarchy), fields(nodes = hierarchy.len()))]
    pub fn layout(&self, hierarchy: &mut Hierarchy, extent: Extent) -> DomainResult<()> {
        extent.validate()?;
        self.options.validate()?;

        let mut nodes = Self::mirror(hierarchy);
        let post: Vec<usize> = postorder(&nodes);
        for &v in &post {
            self.first_walk(v, &mut nodes);
        }
        nodes[SENTINEL].modifier = -nodes[ROOT].prelim;
        for v in preorder(&nodes) {
            let parent_mod = nodes[v].parent.map_or(0.0, |p| nodes[p].modifier);
            nodes[v].x = nodes[v].prelim + parent_mod;
            nodes[v].modifier += parent_mod;
        }

        // Extremes in pre-order, first hit wins
        let (mut left, mut right, mut bottom) = (ROOT, ROOT, ROOT);
        for v in preorder(&nodes) {
            if nodes[v].x < nodes[left].x {
                left = v;
            }
            if nodes[v].x > nodes[right].x {
                right = v;
            }
            if nodes[v].depth > nodes[bottom].depth {
                bottom = v;
            }
        }
        let s = if left == right {
            1.0
        } else {
            self.separation(left, right, &nodes) / 2.0
        };
        let tx = s - nodes[left].x;
        let kx = extent.spread / (nodes[right].x + s + tx);
        let ky = extent.depth / nodes[bottom].depth.max(1) as f64;

        for node in nodes.iter().skip(ROOT) {
            if let Some(target) = node.source.and_then(|idx| hierarchy.node_mut(idx)) {
                target.position = Some(Point::new(
                    (node.x + tx) * kx,
                    node.depth as f64 * ky,
                ));
            }
        }
        debug!(kx, ky, "layout done");
        Ok(())
    }

    /// Copy the hierarchy shape into a flat vector; slot 0 is the sentinel
    /// parent of the root, slot 1 the root.
    fn mirror(hierarchy: &Hierarchy) -> Vec<LayoutNode> {
        let mut nodes = Vec::with_capacity(hierarchy.len() + 1);
        nodes.push(LayoutNode::new(SENTINEL, None, None, 0, 0));
        nodes.push(LayoutNode::new(ROOT, Some(hierarchy.root()), Some(SENTINEL), 0, 0));
        nodes[SENTINEL].children.push(ROOT);

        let mut stack = vec![ROOT];
        while let Some(slot) = stack.pop() {
            let Some(source) = nodes[slot].source.and_then(|idx| hierarchy.node(idx)) else {
                continue;
            };
            let depth = nodes[slot].depth + 1;
            for (number, &child) in source.children.iter().enumerate() {
                let child_slot = nodes.len();
                nodes.push(LayoutNode::new(child_slot, Some(child), Some(slot), number, depth));
                nodes[slot].children.push(child_slot);
                stack.push(child_slot);
            }
        }
        nodes
    }

    fn separation(&self, a: usize, b: usize, nodes: &[LayoutNode]) -> f64 {
        if nodes[a].parent == nodes[b].parent {
            self.options.sibling_separation
        } else {
            self.options.subtree_separation
        }
    }

    fn first_walk(&self, v: usize, nodes: &mut [LayoutNode]) {
        let Some(parent) = nodes[v].parent else {
            return;
        };
        let number = nodes[v].number;
        let left_sibling = (number > 0).then(|| nodes[parent].children[number - 1]);

        let extremes = nodes[v]
            .children
            .first()
            .copied()
            .zip(nodes[v].children.last().copied());
        if let Some((first, last)) = extremes {
            execute_shifts(v, nodes);
            let midpoint = (nodes[first].prelim + nodes[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    nodes[v].prelim = nodes[w].prelim + self.separation(v, w, nodes);
                    nodes[v].modifier = nodes[v].prelim - midpoint;
                }
                None => nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            nodes[v].prelim = nodes[w].prelim + self.separation(v, w, nodes);
        }

        let default_ancestor = nodes[parent]
            .default_ancestor
            .unwrap_or(nodes[parent].children[0]);
        let default_ancestor = self.apportion(v, left_sibling, default_ancestor, nodes);
        nodes[parent].default_ancestor = Some(default_ancestor);
    }

    /// Push the subtree of `v` clear of its left siblings' subtrees.
    ///
    /// `vip`/`vop` walk the inside/outside contours of `v`, `vim`/`vom` those
    /// of the forest to its left; `s*` accumulate the modifiers along each.
    fn apportion(
        &self,
        v: usize,
        left_sibling: Option<usize>,
        mut ancestor: usize,
        nodes: &mut [LayoutNode],
    ) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        let Some(parent) = nodes[v].parent else {
            return ancestor;
        };

        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = nodes[parent].children[0];
        let mut sip = nodes[vip].modifier;
        let mut sop = nodes[vop].modifier;
        let mut sim = nodes[vim].modifier;
        let mut som = nodes[vom].modifier;

        let mut next_vim = next_right(vim, nodes);
        let mut next_vip = next_left(vip, nodes);
        while let (Some(im), Some(ip)) = (next_vim, next_vip) {
            vim = im;
            vip = ip;
            let (Some(om), Some(op)) = (next_left(vom, nodes), next_right(vop, nodes)) else {
                break;
            };
            vom = om;
            vop = op;
            nodes[vop].ancestor = v;

            let shift = nodes[vim].prelim + sim - nodes[vip].prelim - sip
                + self.separation(vim, vip, nodes);
            if shift > 0.0 {
                let wm = next_ancestor(vim, v, ancestor, nodes);
                move_subtree(wm, v, shift, nodes);
                sip += shift;
                sop += shift;
            }
            sim += nodes[vim].modifier;
            sip += nodes[vip].modifier;
            som += nodes[vom].modifier;
            sop += nodes[vop].modifier;

            next_vim = next_right(vim, nodes);
            next_vip = next_left(vip, nodes);
        }

        if let Some(im) = next_vim {
            if next_right(vop, nodes).is_none() {
                nodes[vop].thread = Some(im);
                nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_vip {
            if next_left(vom, nodes).is_none() {
                nodes[vom].thread = Some(ip);
                nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }
}

fn next_left(v: usize, nodes: &[LayoutNode]) -> Option<usize> {
    nodes[v].children.first().copied().or(nodes[v].thread)
}

fn next_right(v: usize, nodes: &[LayoutNode]) -> Option<usize> {
    nodes[v].children.last().copied().or(nodes[v].thread)
}

fn next_ancestor(vim: usize, v: usize, ancestor: usize, nodes: &[LayoutNode]) -> usize {
    let candidate = nodes[vim].ancestor;
    if nodes[candidate].parent == nodes[v].parent {
        candidate
    } else {
        ancestor
    }
}

fn move_subtree(wm: usize, wp: usize, shift: f64, nodes: &mut [LayoutNode]) {
    let subtrees = nodes[wp].number.saturating_sub(nodes[wm].number).max(1) as f64;
    let change = shift / subtrees;
    nodes[wp].change -= change;
    nodes[wp].shift += shift;
    nodes[wm].change += change;
    nodes[wp].prelim += shift;
    nodes[wp].modifier += shift;
}

fn execute_shifts(v: usize, nodes: &mut [LayoutNode]) {
    let mut shift = 0.0;
    let mut change = 0.0;
    let children = nodes[v].children.clone();
    for &w in children.iter().rev() {
        nodes[w].prelim += shift;
        nodes[w].modifier += shift;
        change += nodes[w].change;
        shift += nodes[w].shift + change;
    }
}

fn preorder(nodes: &[LayoutNode]) -> Vec<usize> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack = vec![ROOT];
    while let Some(v) = stack.pop() {
        order.push(v);
        stack.extend(nodes[v].children.iter().rev().copied());
    }
    order
}

fn postorder(nodes: &[LayoutNode]) -> Vec<usize> {
    let mut order = preorder_reversed_children(nodes);
    order.reverse();
    order
}

/// Root-first order visiting the last child first; reversed it is a post-order
/// visiting the first child first.
fn preorder_reversed_children(nodes: &[LayoutNode]) -> Vec<usize> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack = vec![ROOT];
    while let Some(v) = stack.pop() {
        order.push(v);
        stack.extend(nodes[v].children.iter().copied());
    }
    order
}
