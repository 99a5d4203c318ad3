//! Domain layer: records, hierarchy, layout geometry
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod record;

pub use arena::{Hierarchy, HierarchyNode, Link};
pub use builder::HierarchyBuilder;
pub use error::{ConfigError, DomainError, DomainResult, StructureError};
pub use geometry::{curvy_link, CubicBezier, Point};
pub use layout::{Canvas, Extent, Insets, LayoutOptions, TidyTree};
pub use record::{records_from_values, FieldNames, NodeKey, Record};
