//! Shared data model for Lantern content.
//!
//! Authored worlds are plain serde data: scenes, objects, exits and their
//! interaction tables. [`validate_world`] checks referential integrity before
//! the engine compiles a `WorldDef` into its runtime graph.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_world};
