//! Exit lookup and scene traversal.

use log::info;

use crate::config::Messages;
use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::graph::WorldGraph;
use crate::light::{has_light, recompute_light};
use crate::scene::{Exit, resolve_scene};
use crate::score::award_once;
use crate::state::WorldState;

/// Whether an exit can be taken right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    Allowed,
    Blocked(String),
}

/// What the player sees and earns on arriving in a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub description: String,
    pub points: u32,
    pub achievements: Vec<String>,
}

/// Compass and vertical directions a bare command word may name.
pub const DIRECTIONS: &[&str] = &[
    "north",
    "south",
    "east",
    "west",
    "northeast",
    "northwest",
    "southeast",
    "southwest",
    "up",
    "down",
    "in",
    "out",
];

/// Expand the usual one- and two-letter direction abbreviations.
pub fn normalize_direction(token: &str) -> String {
    let lower = token.trim().to_lowercase();
    let full = match lower.as_str() {
        "n" => "north",
        "s" => "south",
        "e" => "east",
        "w" => "west",
        "ne" => "northeast",
        "nw" => "northwest",
        "se" => "southeast",
        "sw" => "southwest",
        "u" => "up",
        "d" => "down",
        other => other,
    };
    full.to_string()
}

/// Find the exit out of `scene` matching `token`.
///
/// Direction names (and abbreviations) match only an exit in that direction.
/// Any other token is looked for in the exit description or the destination's
/// name, so "go kitchen" works but "south" never lands in "Southern Hall".
///
/// # Errors
/// `EngineError::UnknownScene` if `scene` or an exit target is missing.
pub fn get_exit<'a>(graph: &'a WorldGraph, scene: &str, token: &str) -> Result<Option<&'a Exit>, EngineError> {
    let scene = graph.scene(scene)?;
    let wanted = normalize_direction(token);
    if wanted.is_empty() {
        return Ok(None);
    }
    if let Some(exit) = scene
        .exits
        .iter()
        .find(|exit| normalize_direction(&exit.direction) == wanted)
    {
        return Ok(Some(exit));
    }
    if DIRECTIONS.contains(&wanted.as_str()) {
        return Ok(None);
    }
    for exit in &scene.exits {
        let target = graph.scene(&exit.to)?;
        if exit.description.to_lowercase().contains(&wanted) || target.name.to_lowercase().contains(&wanted) {
            return Ok(Some(exit));
        }
    }
    Ok(None)
}

/// Check light and the exit's precondition without changing anything.
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn can_traverse(
    graph: &WorldGraph,
    state: &WorldState,
    exit: &Exit,
    messages: &Messages,
) -> Result<Traversal, EngineError> {
    if !has_light(graph, state)? {
        return Ok(Traversal::Blocked(messages.too_dark_to_move.clone()));
    }
    if !exit.precondition.evaluate(state.flags()) {
        let message = exit.barred_message.clone().unwrap_or_else(|| messages.cant_go.clone());
        return Ok(Traversal::Blocked(message));
    }
    Ok(Traversal::Allowed)
}

/// Move the player along `exit`, awarding its one-time score.
///
/// Callers check [`can_traverse`] first.
///
/// # Errors
/// `EngineError::UnknownScene` if the exit's target is missing; nothing is
/// changed in that case.
pub fn traverse(graph: &WorldGraph, state: &mut WorldState, exit: &Exit) -> Result<Arrival, EngineError> {
    graph.scene(&exit.to)?;
    let description = enter_scene(graph, state, &exit.to)?;

    let mut points = 0;
    let mut achievements = Vec::new();
    if exit.score > 0 {
        let delta = i32::try_from(exit.score).unwrap_or(i32::MAX);
        if let Some(messages) = award_once(graph, state, FlagKey::ExitScored(exit.to.clone()), delta) {
            points = exit.score;
            achievements = messages;
        }
    }
    Ok(Arrival {
        description,
        points,
        achievements,
    })
}

/// Make `scene` the current scene and describe it.
///
/// The description is chosen before the scene is marked visited, so a first
/// visit never sees the return-visit text.
///
/// # Errors
/// `EngineError::UnknownScene` if the scene is missing.
pub fn enter_scene(graph: &WorldGraph, state: &mut WorldState, scene: &str) -> Result<String, EngineError> {
    graph.scene(scene)?;
    let previous = std::mem::replace(&mut state.current_scene, scene.to_string());
    recompute_light(graph, state)?;
    let description = resolve_scene(graph, state, scene)?.describe();
    state.flags.set(FlagKey::SceneVisited(scene.to_string()));
    info!("player moved from '{previous}' to '{scene}'");
    Ok(description)
}
