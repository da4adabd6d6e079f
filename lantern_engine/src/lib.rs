#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! Lantern: a rule engine for text adventures.
//!
//! Content is compiled from a `WorldDef` into an immutable [`WorldGraph`];
//! play happens through [`Engine::execute`], which turns a tokenized
//! [`Command`] into a [`Response`] while keeping the world state consistent.

pub const LANTERN_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod command;
pub mod condition;
pub mod config;
pub mod container;
pub mod data_paths;
pub mod description;
mod dispatch;
pub mod engine;
pub mod error;
pub mod flags;
pub mod graph;
pub mod interaction;
pub mod light;
pub mod loader;
pub mod movement;
pub mod object;
pub mod repl;
pub mod save_files;
pub mod scene;
pub mod score;
pub mod snapshot;
pub mod state;
pub mod style;
pub mod visibility;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use command::{Command, Response};
pub use condition::Condition;
pub use config::{EngineConfig, load_config};
pub use engine::Engine;
pub use error::EngineError;
pub use flags::{FlagKey, FlagStore};
pub use graph::WorldGraph;
pub use loader::{compile_world, load_world, load_world_from};
pub use repl::run_repl;
pub use snapshot::StateSnapshot;
pub use state::{Location, WorldState};
