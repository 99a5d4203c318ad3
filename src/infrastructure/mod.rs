//! Infrastructure layer: I/O at the edges
//!
//! Reads record snapshots; everything behind it stays pure.

pub mod error;
pub mod source;

pub use error::{InfraError, InfraResult, IoResultExt};
pub use source::{load_values, read_values};
