//! Loader utilities for building a `WorldGraph` from serialized data.
//!
//! World content comes from a `WorldDef` RON file, validated as a whole
//! before it is compiled. Engine tuning stays TOML-backed (see
//! [`crate::config`]).

pub mod worlddef;

use std::path::Path;

use anyhow::{Context, Result, bail};
use lantern_data::WorldDef;
use log::info;

use crate::data_paths::data_path;
use crate::graph::WorldGraph;
use crate::loader::worlddef::{build_graph, load_worlddef};

/// Load the world from `world.ron` in the data directory.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, or validation.
pub fn load_world() -> Result<WorldGraph> {
    load_world_from(&data_path("world.ron"))
}

/// Load, validate and compile the world at `path`.
///
/// # Errors
/// Returns an error if the file can't be read or parsed, or if validation
/// finds any problem (all problems are listed together).
pub fn load_world_from(path: &Path) -> Result<WorldGraph> {
    let worlddef = load_worlddef(path).context("while loading worlddef from file")?;
    compile_world(&worlddef)
}

/// Validate and compile an in-memory `WorldDef`.
///
/// # Errors
/// Returns an aggregated validation error, or the integrity error raised
/// while compiling.
pub fn compile_world(worlddef: &WorldDef) -> Result<WorldGraph> {
    validate_worlddef(worlddef)?;
    let graph = build_graph(worlddef).context("while building world graph from worlddef")?;
    info!("{} scenes added to WorldGraph", graph.scenes.len());
    info!("{} objects added to WorldGraph", graph.objects.len());
    info!(
        "{} interactions registered",
        graph.objects.values().map(|object| object.interactions.len()).sum::<usize>()
    );
    info!("maximum score is {}", graph.max_score);
    Ok(graph)
}

/// Validate the WorldDef and return a single aggregated error.
fn validate_worlddef(def: &WorldDef) -> Result<()> {
    let errors = lantern_data::validate_world(def);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("worlddef validation failed:\n{details}");
}
