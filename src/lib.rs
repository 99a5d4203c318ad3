//! Tidy-tree layout with spring animation for flat, parent-referencing records.
//!
//! Layers, innermost first:
//! - [`domain`]: records, hierarchy building, tidy layout, edge geometry
//! - [`application`]: springs, the node/link animator, scene and view state
//! - [`infrastructure`]: reading record snapshots
//! - [`cli`]: the `springtree` binary
//!
//! ```
//! use springtree::application::{TreeView, ViewOptions};
//! use springtree::domain::Record;
//!
//! let mut view = TreeView::new(ViewOptions::default()).unwrap();
//! view.set_records(vec![
//!     Record::new("a", None, "A"),
//!     Record::new("b", Some("a"), "B"),
//! ])
//! .unwrap();
//! view.settle(1_000);
//! let scene = view.scene().unwrap();
//! assert_eq!(scene.nodes.len(), 3);
//! assert_eq!(scene.links.len(), 2);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
