//! Application layer: animation and view state
//!
//! This layer drives the domain pipeline over time; it performs no I/O.

pub mod animator;
pub mod error;
pub mod scene;
pub mod spring;
pub mod view;

pub use animator::{LinkMotion, NodeMotion, Transition, TreeAnimator};
pub use error::{ApplicationError, ApplicationResult};
pub use scene::{LinkShape, NodeShape, Scene, SceneStyle, TextAnchor};
pub use spring::{Spring, SpringConfig, SpringPoint};
pub use view::{TreeView, ViewOptions};
