//! Per-node and per-edge spring state across layout changes.
//!
//! Motions are keyed by node identity (edges by their child's key) so they
//! survive rebuilds of the hierarchy. All points are in screen orientation:
//! `x` along the depth axis, `y` along the sibling-spread axis.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::spring::{frames_for, Spring, SpringConfig, SpringPoint};
use crate::domain::{Hierarchy, NodeKey, Point};

/// Scale factor of the selected node's marker.
pub const DEFAULT_SELECTED_SCALE: f64 = 1.15;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMotion {
    pub position: SpringPoint,
    pub scale: Spring,
}

impl NodeMotion {
    fn step(&mut self) {
        self.position.step();
        self.scale.step();
    }

    pub fn is_animating(&self) -> bool {
        self.position.is_animating() || self.scale.is_animating()
    }
}

/// Both endpoints of one edge, `source` being the parent end.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkMotion {
    pub source: SpringPoint,
    pub target: SpringPoint,
}

impl LinkMotion {
    fn step(&mut self) {
        self.source.step();
        self.target.step();
    }

    pub fn is_animating(&self) -> bool {
        self.source.is_animating() || self.target.is_animating()
    }
}

/// Current and target value of an animated quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<T> {
    pub current: T,
    pub target: T,
}

#[derive(Debug, Clone)]
pub struct TreeAnimator {
    config: SpringConfig,
    selected_scale: f64,
    nodes: HashMap<NodeKey, NodeMotion>,
    links: HashMap<NodeKey, LinkMotion>,
    pending: f64,
}

impl Default for TreeAnimator {
    fn default() -> Self {
        Self::new(SpringConfig::default(), DEFAULT_SELECTED_SCALE)
    }
}

impl TreeAnimator {
    pub fn new(config: SpringConfig, selected_scale: f64) -> Self {
        Self {
            config,
            selected_scale,
            nodes: HashMap::new(),
            links: HashMap::new(),
            pending: 0.0,
        }
    }

    pub fn selected_scale(&self) -> f64 {
        self.selected_scale
    }

    /// Point every motion at the positions of a freshly laid out hierarchy.
    ///
    /// Surviving keys keep their current value and velocity. New nodes and
    /// edges start at the current position of their closest surviving
    /// ancestor, or at the root's target. Keys no longer present are dropped.
    #[instrument(level = "debug", skip(self, hierarchy), fields(nodes = hierarchy.len()))]
    pub fn retarget(
        &mut self,
        hierarchy: &Hierarchy,
        selected: Option<&NodeKey>,
    ) -> ApplicationResult<()> {
        let order = hierarchy.descendants();
        let mut targets = HashMap::with_capacity(order.len());
        for &idx in &order {
            let point = hierarchy
                .position(idx)
                .ok_or(ApplicationError::NotLaidOut)?;
            targets.insert(idx, point.transposed());
        }
        let root_target = targets[&hierarchy.root()];

        // Entry points are resolved against the motions as they were before
        // this call, so a new parent does not count as a survivor.
        let entries: HashMap<Index, Point> = order
            .iter()
            .filter_map(|&idx| {
                let key = &hierarchy.node(idx)?.key;
                (!self.nodes.contains_key(key))
                    .then(|| (idx, self.entry_point(hierarchy, idx, root_target)))
            })
            .collect();

        let live: HashSet<&NodeKey> = order
            .iter()
            .filter_map(|&idx| hierarchy.node(idx).map(|n| &n.key))
            .collect();
        let before = self.nodes.len();
        self.nodes.retain(|key, _| live.contains(key));
        self.links.retain(|key, _| live.contains(key));
        let dropped = before - self.nodes.len();

        let config = self.config;
        for &idx in &order {
            let Some(node) = hierarchy.node(idx) else {
                continue;
            };
            let target = targets[&idx];
            let scale = if selected == Some(&node.key) {
                self.selected_scale
            } else {
                1.0
            };

            match self.nodes.get_mut(&node.key) {
                Some(motion) => {
                    motion.position.set_target(target);
                    motion.scale.set_target(scale);
                }
                None => {
                    let origin = entries.get(&idx).copied().unwrap_or(root_target);
                    trace!(key = %node.key, %origin, %target, "node enters");
                    self.nodes.insert(
                        node.key.clone(),
                        NodeMotion {
                            position: SpringPoint::between(origin, target, config),
                            scale: Spring::between(1.0, scale, config),
                        },
                    );
                }
            }

            let Some(parent) = node.parent else {
                continue;
            };
            let source_target = targets[&parent];
            match self.links.get_mut(&node.key) {
                Some(link) => {
                    link.source.set_target(source_target);
                    link.target.set_target(target);
                }
                None => {
                    let origin = entries.get(&idx).copied().unwrap_or(root_target);
                    self.links.insert(
                        node.key.clone(),
                        LinkMotion {
                            source: SpringPoint::between(origin, source_target, config),
                            target: SpringPoint::between(origin, target, config),
                        },
                    );
                }
            }
        }

        debug!(
            entered = entries.len(),
            dropped,
            total = self.nodes.len(),
            "retargeted"
        );
        Ok(())
    }

    /// Current position of the closest ancestor that already has a motion.
    fn entry_point(&self, hierarchy: &Hierarchy, idx: Index, fallback: Point) -> Point {
        hierarchy
            .ancestors(idx)
            .into_iter()
            .skip(1)
            .filter_map(|a| hierarchy.node(a))
            .find_map(|a| self.nodes.get(&a.key))
            .map(|motion| motion.position.get())
            .unwrap_or(fallback)
    }

    /// Update only the selection emphasis.
    pub fn select(&mut self, selected: Option<&NodeKey>) {
        let selected_scale = self.selected_scale;
        for (key, motion) in self.nodes.iter_mut() {
            let scale = if selected == Some(key) {
                selected_scale
            } else {
                1.0
            };
            motion.scale.set_target(scale);
        }
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
        for motion in self.nodes.values_mut() {
            motion.position.set_config(config);
            motion.scale.set_config(config);
        }
        for link in self.links.values_mut() {
            link.source.set_config(config);
            link.target.set_config(config);
        }
    }

    /// Advance every motion by one frame.
    pub fn step(&mut self) {
        self.nodes.values_mut().for_each(NodeMotion::step);
        self.links.values_mut().for_each(LinkMotion::step);
    }

    /// Advance by `dt` seconds; returns the number of frames stepped.
    pub fn tick(&mut self, dt: f64) -> u32 {
        let frames = frames_for(&mut self.pending, dt);
        for _ in 0..frames {
            self.step();
        }
        frames
    }

    /// Step until nothing moves or `max_frames` is reached; returns frames stepped.
    pub fn settle(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.is_animating() {
            self.step();
            frames += 1;
        }
        frames
    }

    pub fn is_animating(&self) -> bool {
        self.nodes.values().any(NodeMotion::is_animating)
            || self.links.values().any(LinkMotion::is_animating)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.pending = 0.0;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_motion(&self, key: &NodeKey) -> Option<&NodeMotion> {
        self.nodes.get(key)
    }

    pub fn link_motion(&self, child: &NodeKey) -> Option<&LinkMotion> {
        self.links.get(child)
    }

    pub fn position(&self, key: &NodeKey) -> Option<Transition<Point>> {
        self.nodes.get(key).map(|m| Transition {
            current: m.position.get(),
            target: m.position.target(),
        })
    }

    pub fn scale(&self, key: &NodeKey) -> Option<Transition<f64>> {
        self.nodes.get(key).map(|m| Transition {
            current: m.scale.get(),
            target: m.scale.target(),
        })
    }
}
