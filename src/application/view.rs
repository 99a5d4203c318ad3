//! Tree view: thin adapter holding data, selection and animation state.
//!
//! Every state update rebuilds and lays out the hierarchy synchronously and
//! retargets the animator. Frames are advanced by the host via `tick`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::animator::{TreeAnimator, DEFAULT_SELECTED_SCALE};
use crate::application::error::ApplicationResult;
use crate::application::scene::{Scene, SceneStyle};
use crate::application::spring::SpringConfig;
use crate::domain::{
    records_from_values, Canvas, ConfigError, FieldNames, Hierarchy, HierarchyBuilder,
    HierarchyNode, LayoutOptions, NodeKey, Record, TidyTree,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Label of the synthetic root
    pub root_label: String,
    pub fields: FieldNames,
    /// Shown for records without a label
    pub default_label: String,
    pub canvas: Canvas,
    pub font_size: f64,
    pub node_radius: f64,
    pub selected_scale: f64,
    pub spring: SpringConfig,
    pub layout: LayoutOptions,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            root_label: "ROOT".into(),
            fields: FieldNames::default(),
            default_label: "(No Value)".into(),
            canvas: Canvas::default(),
            font_size: 12.0,
            node_radius: 3.0,
            selected_scale: DEFAULT_SELECTED_SCALE,
            spring: SpringConfig::default(),
            layout: LayoutOptions::default(),
        }
    }
}

impl ViewOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("font_size", self.font_size),
            ("selected_scale", self.selected_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if !(self.node_radius.is_finite() && self.node_radius >= 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "node_radius",
                reason: format!("must not be negative, got {}", self.node_radius),
            });
        }
        self.canvas.inner_extent()?;
        self.spring.validate()?;
        self.layout.validate()
    }

    pub fn scene_style(&self) -> SceneStyle {
        SceneStyle {
            width: self.canvas.width,
            height: self.canvas.height,
            padding: self.canvas.padding,
            default_label: self.default_label.clone(),
            font_size: self.font_size,
            node_radius: self.node_radius,
        }
    }
}

type NodeCallback = Box<dyn FnMut(&HierarchyNode)>;
type BackgroundCallback = Box<dyn FnMut()>;

pub struct TreeView {
    options: ViewOptions,
    builder: HierarchyBuilder,
    layout: TidyTree,
    records: Vec<Record>,
    hierarchy: Option<Hierarchy>,
    selected: Option<NodeKey>,
    animator: TreeAnimator,
    on_node_activate: NodeCallback,
    on_background_activate: BackgroundCallback,
}

impl fmt::Debug for TreeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeView")
            .field("options", &self.options)
            .field("records", &self.records.len())
            .field("nodes", &self.hierarchy.as_ref().map(Hierarchy::len))
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl TreeView {
    pub fn new(options: ViewOptions) -> ApplicationResult<Self> {
        options.validate()?;
        Ok(Self {
            builder: HierarchyBuilder::new(options.root_label.clone()),
            layout: TidyTree::new(options.layout),
            animator: TreeAnimator::new(options.spring, options.selected_scale),
            options,
            records: Vec::new(),
            hierarchy: None,
            selected: None,
            on_node_activate: Box::new(|_| {}),
            on_background_activate: Box::new(|| {}),
        })
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Replace the data with JSON objects read through the configured field names.
    pub fn set_values(&mut self, values: &[Value]) -> ApplicationResult<()> {
        let records = records_from_values(values, &self.options.fields)?;
        self.set_records(records)
    }

    /// Replace the data. On error the previous state is kept untouched.
    #[instrument(level = "debug", skip(self, records), fields(count = records.len()))]
    pub fn set_records(&mut self, records: Vec<Record>) -> ApplicationResult<()> {
        let hierarchy = match self.builder.build(&records)? {
            Some(mut hierarchy) => {
                let extent = self.options.canvas.inner_extent()?;
                self.layout.layout(&mut hierarchy, extent)?;
                Some(hierarchy)
            }
            None => None,
        };
        self.records = records;
        self.hierarchy = hierarchy;
        self.sync_animator()
    }

    /// Resize the drawing surface and lay out again.
    pub fn set_canvas(&mut self, canvas: Canvas) -> ApplicationResult<()> {
        if let Some(hierarchy) = self.hierarchy.as_mut() {
            self.layout.layout(hierarchy, canvas.inner_extent()?)?;
        } else {
            canvas.inner_extent()?;
        }
        self.options.canvas = canvas;
        self.sync_animator()
    }

    /// Change the emphasized node; `None` clears the selection.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.map(NodeKey::from);
        debug!(selected = ?self.selected, "selection changed");
        self.animator.select(self.selected.as_ref());
    }

    pub fn selected(&self) -> Option<&NodeKey> {
        self.selected.as_ref()
    }

    fn sync_animator(&mut self) -> ApplicationResult<()> {
        match &self.hierarchy {
            Some(hierarchy) => self.animator.retarget(hierarchy, self.selected.as_ref()),
            None => {
                self.animator.clear();
                Ok(())
            }
        }
    }

    pub fn tick(&mut self, dt: f64) -> u32 {
        self.animator.tick(dt)
    }

    pub fn settle(&mut self, max_frames: usize) -> usize {
        self.animator.settle(max_frames)
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Current frame; `None` when there is nothing to draw.
    pub fn scene(&self) -> Option<Scene> {
        let hierarchy = self.hierarchy.as_ref()?;
        Some(Scene::from_animator(
            hierarchy,
            &self.animator,
            &self.options.scene_style(),
        ))
    }

    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn animator(&self) -> &TreeAnimator {
        &self.animator
    }

    pub fn on_node_activate(&mut self, callback: impl FnMut(&HierarchyNode) + 'static) {
        self.on_node_activate = Box::new(callback);
    }

    pub fn on_background_activate(&mut self, callback: impl FnMut() + 'static) {
        self.on_background_activate = Box::new(callback);
    }

    /// Fire the node callback; false if no such node is shown.
    pub fn activate_node(&mut self, key: &NodeKey) -> bool {
        match self.hierarchy.as_ref().and_then(|h| h.get(key)) {
            Some(node) => {
                (self.on_node_activate)(node);
                true
            }
            None => false,
        }
    }

    pub fn activate_background(&mut self) {
        (self.on_background_activate)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::domain::{DomainError, StructureError};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn view_with(records: Vec<Record>) -> TreeView {
        let mut view = TreeView::new(ViewOptions::default()).unwrap();
        view.set_records(records).unwrap();
        view
    }

    #[test]
    fn given_no_records_then_no_scene() {
        let view = view_with(vec![]);
        assert!(view.scene().is_none());
        assert!(view.hierarchy().is_none());
    }

    #[test]
    fn given_broken_update_then_previous_state_kept() {
        let mut view = view_with(vec![Record::new("a", None, "A")]);
        let err = view
            .set_records(vec![Record::new("x", Some("missing"), "X")])
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::Structure(StructureError::MissingParent { .. }))
        ));
        assert_eq!(view.records().len(), 1);
        assert!(view.hierarchy().unwrap().get(&NodeKey::from("a")).is_some());
    }

    #[test]
    fn given_too_small_canvas_then_config_error_and_canvas_unchanged() {
        let mut view = view_with(vec![Record::new("a", None, "A")]);
        let err = view
            .set_canvas(Canvas {
                width: 100.0,
                ..Canvas::default()
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Domain(DomainError::Config(_))));
        assert_eq!(view.options().canvas, Canvas::default());
    }

    #[test]
    fn given_resize_mid_flight_then_retargets_without_jump() {
        let mut view = view_with(vec![Record::new("a", None, "A"), Record::new("b", None, "B")]);
        view.tick(0.1);
        let before = view.scene().unwrap();
        view.set_canvas(Canvas {
            width: 1000.0,
            height: 800.0,
            ..Canvas::default()
        })
        .unwrap();
        let after = view.scene().unwrap();
        assert_eq!(before.node(&NodeKey::from("a")).unwrap().center, after.node(&NodeKey::from("a")).unwrap().center);
        view.settle(1_000);
        let settled = view.scene().unwrap();
        // depth extent is now 1000 - 240
        assert_eq!(settled.node(&NodeKey::from("a")).unwrap().center.x, 760.0);
    }

    #[test]
    fn given_callbacks_when_activating_then_invoked() {
        let mut view = view_with(vec![Record::new("a", None, "A")]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        view.on_node_activate(move |node| sink.borrow_mut().push(node.key.clone()));
        let background = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&background);
        view.on_background_activate(move || *counter.borrow_mut() += 1);

        assert!(view.activate_node(&NodeKey::from("a")));
        assert!(!view.activate_node(&NodeKey::from("zzz")));
        view.activate_background();

        assert_eq!(*seen.borrow(), vec![NodeKey::from("a")]);
        assert_eq!(*background.borrow(), 1);
    }

    #[test]
    fn given_invalid_options_then_new_fails() {
        let options = ViewOptions {
            font_size: 0.0,
            ..ViewOptions::default()
        };
        assert!(TreeView::new(options).is_err());
    }
}
