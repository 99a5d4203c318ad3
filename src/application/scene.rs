//! Renderable scene graph: one curved edge per relation, one marker and label
//! per node. Plain data; drawing it is up to the host.

use serde::{Deserialize, Serialize};

use crate::application::animator::TreeAnimator;
use crate::domain::{curvy_link, CubicBezier, Hierarchy, HierarchyNode, Insets, NodeKey, Point};

/// Horizontal gap between a marker and its label.
pub const LABEL_GAP: f64 = 8.0;
/// Vertical nudge that centers the label on the marker.
pub const LABEL_BASELINE: f64 = 3.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneStyle {
    pub width: f64,
    pub height: f64,
    pub padding: Insets,
    pub default_label: String,
    pub font_size: f64,
    pub node_radius: f64,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            padding: Insets::default(),
            default_label: "(No Value)".into(),
            font_size: 12.0,
            node_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeShape {
    pub key: NodeKey,
    pub label: String,
    /// Marker center relative to the scene offset
    pub center: Point,
    /// Marker radius with the scale applied
    pub radius: f64,
    pub scale: f64,
    pub anchor: TextAnchor,
    /// Label position relative to `center`
    pub label_offset: Point,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkShape {
    /// Key of the child end
    pub key: NodeKey,
    pub curve: CubicBezier,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    /// Translation applied to every shape (left and top padding)
    pub offset: Point,
    pub links: Vec<LinkShape>,
    pub nodes: Vec<NodeShape>,
}

impl Scene {
    /// Snapshot of the animator's current values.
    ///
    /// Nodes without a motion yet are drawn at their layout target.
    pub fn from_animator(hierarchy: &Hierarchy, animator: &TreeAnimator, style: &SceneStyle) -> Self {
        let links = hierarchy
            .links()
            .into_iter()
            .filter_map(|link| {
                let child = hierarchy.node(link.target)?;
                let (source, target) = match animator.link_motion(&child.key) {
                    Some(motion) => (motion.source.get(), motion.target.get()),
                    None => (
                        hierarchy.position(link.source)?.transposed(),
                        child.position?.transposed(),
                    ),
                };
                let curve = curvy_link(source, target);
                Some(LinkShape {
                    key: child.key.clone(),
                    path: curve.to_svg_path(),
                    curve,
                })
            })
            .collect();

        let nodes = hierarchy
            .descendants()
            .into_iter()
            .filter_map(|idx| {
                let node = hierarchy.node(idx)?;
                let (center, scale) = match animator.node_motion(&node.key) {
                    Some(motion) => (motion.position.get(), motion.scale.get()),
                    None => (node.position?.transposed(), 1.0),
                };
                Some(node_shape(node, center, scale, style))
            })
            .collect();

        Self {
            width: style.width,
            height: style.height,
            offset: Point::new(style.padding.left, style.padding.top),
            links,
            nodes,
        }
    }

    /// Scene at the final layout positions, selection ignored.
    pub fn at_rest(hierarchy: &Hierarchy, style: &SceneStyle) -> Self {
        Self::from_animator(hierarchy, &TreeAnimator::default(), style)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&NodeShape> {
        self.nodes.iter().find(|n| &n.key == key)
    }
}

fn node_shape(node: &HierarchyNode, center: Point, scale: f64, style: &SceneStyle) -> NodeShape {
    let label = match node.label.as_deref() {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => style.default_label.clone(),
    };
    let (anchor, dx) = if node.is_leaf() {
        (TextAnchor::Start, LABEL_GAP)
    } else {
        (TextAnchor::End, -LABEL_GAP)
    };
    NodeShape {
        key: node.key.clone(),
        label,
        center,
        radius: style.node_radius * scale,
        scale,
        anchor,
        label_offset: Point::new(dx, LABEL_BASELINE),
        font_size: style.font_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Extent, HierarchyBuilder, Record, TidyTree};

    fn laid_out(records: &[Record]) -> Hierarchy {
        let mut h = HierarchyBuilder::default().build(records).unwrap().unwrap();
        TidyTree::default()
            .layout(
                &mut h,
                Extent {
                    spread: 460.0,
                    depth: 560.0,
                },
            )
            .unwrap();
        h
    }

    #[test]
    fn given_rest_scene_then_shapes_use_screen_orientation() {
        let h = laid_out(&[Record::new("a", None, "A"), Record::new("b", Some("a"), "")]);
        let scene = Scene::at_rest(&h, &SceneStyle::default());

        assert_eq!(scene.links.len(), 2);
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.offset, Point::new(120.0, 20.0));

        let b = scene.node(&NodeKey::from("b")).unwrap();
        // depth along screen x, spread along screen y
        assert_eq!(b.center, Point::new(560.0, 230.0));
        assert_eq!(b.label, "(No Value)");
        assert_eq!(b.anchor, TextAnchor::Start);
        assert_eq!(b.label_offset, Point::new(8.0, 3.5));

        let root = scene.node(&NodeKey::Root).unwrap();
        assert_eq!(root.label, "ROOT");
        assert_eq!(root.anchor, TextAnchor::End);
        assert_eq!(root.radius, 3.0);
    }

    #[test]
    fn given_animator_scene_then_uses_current_values() {
        let h = laid_out(&[Record::new("a", None, "A")]);
        let mut animator = TreeAnimator::default();
        animator.retarget(&h, Some(&NodeKey::from("a"))).unwrap();
        let style = SceneStyle::default();

        let start = Scene::from_animator(&h, &animator, &style);
        let root_center = start.node(&NodeKey::Root).unwrap().center;
        assert_eq!(start.node(&NodeKey::from("a")).unwrap().center, root_center);
        assert_eq!(start.links[0].path, curvy_link(root_center, root_center).to_svg_path());

        animator.settle(1_000);
        let end = Scene::from_animator(&h, &animator, &style);
        let a = end.node(&NodeKey::from("a")).unwrap();
        assert_eq!(a.center, Point::new(560.0, 230.0));
        assert!((a.radius - 3.0 * 1.15).abs() < 1e-12);
    }
}
