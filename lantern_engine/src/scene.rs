//! Scenes, exits, and live scene resolution.

use std::fmt::Write as _;

use log::debug;

use crate::condition::Condition;
use crate::description::DescriptionTable;
use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::graph::WorldGraph;
use crate::light::has_light;
use crate::state::WorldState;
use crate::visibility::is_visible_with_light;

/// A directed connection out of a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    pub direction: String,
    pub to: String,
    pub description: String,
    pub precondition: Condition,
    pub barred_message: Option<String>,
    /// One-time points for arriving in `to`, guarded per target scene.
    pub score: u32,
    /// Hidden exits are never listed but may still be traversed.
    pub hidden: bool,
}

impl Exit {
    pub fn new(direction: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            direction: direction.into(),
            to: to.into(),
            description: String::new(),
            precondition: Condition::True,
            barred_message: None,
            score: 0,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDefinition {
    pub id: String,
    pub name: String,
    pub region: String,
    pub natural_light: bool,
    pub description: DescriptionTable,
    /// Objects authored to start in this scene.
    pub objects: Vec<String>,
    pub exits: Vec<Exit>,
}

impl SceneDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: String::new(),
            natural_light: true,
            description: DescriptionTable::plain(text),
            objects: Vec::new(),
            exits: Vec::new(),
        }
    }
}

/// Live view of one object in a resolved scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedObject {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub open: bool,
    pub locked: bool,
    pub revealed: bool,
    /// Display name of the container holding this object, if any.
    pub inside: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExit {
    pub direction: String,
    pub to: String,
    pub to_name: String,
    pub passable: bool,
    pub visited: bool,
}

/// A scene merged with the current world state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScene {
    pub id: String,
    pub name: String,
    pub description: String,
    pub lit: bool,
    pub visited: bool,
    pub objects: Vec<ResolvedObject>,
    pub exits: Vec<ResolvedExit>,
}

impl ResolvedScene {
    pub fn visible_objects(&self) -> impl Iterator<Item = &ResolvedObject> {
        self.objects.iter().filter(|object| object.visible)
    }

    /// Plain-text rendering: name, description, visible objects, exits.
    pub fn describe(&self) -> String {
        let mut text = format!("{}\n{}", self.name, self.description);
        if !self.lit {
            return text;
        }
        let names: Vec<String> = self
            .visible_objects()
            .map(|object| match &object.inside {
                Some(holder) => format!("{} (in the {holder})", object.name),
                None => object.name.clone(),
            })
            .collect();
        if !names.is_empty() {
            let _ = write!(text, "\nYou see: {}.", names.join(", "));
        }
        if !self.exits.is_empty() {
            let dirs: Vec<&str> = self.exits.iter().map(|exit| exit.direction.as_str()).collect();
            let _ = write!(text, "\nExits: {}.", dirs.join(", "));
        }
        text
    }
}

/// Merge the static scene `id` with live state.
///
/// # Errors
/// Returns `EngineError::UnknownScene` or `UnknownObject` if the graph and
/// state disagree about what exists.
pub fn resolve_scene(graph: &WorldGraph, state: &WorldState, id: &str) -> Result<ResolvedScene, EngineError> {
    let scene = graph.scene(id)?;
    let flags = state.flags();
    let lit = if state.current_scene() == id {
        has_light(graph, state)?
    } else {
        scene.natural_light
    };
    let visited = state.is_visited(id);
    let description = scene.description.select(flags, lit, visited).to_string();

    let mut objects = Vec::new();
    for (object_id, inside) in state.scene_tree(id) {
        let object = graph.object(&object_id)?;
        objects.push(ResolvedObject {
            visible: is_visible_with_light(graph, state, &object_id, lit)?,
            open: flags.has(&FlagKey::ObjectOpen(object_id.clone())),
            locked: flags.has(&FlagKey::ObjectLocked(object_id.clone())),
            revealed: flags.has(&FlagKey::ObjectRevealed(object_id.clone())),
            name: object.name.clone(),
            id: object_id,
            inside: inside
                .map(|holder| graph.object(&holder).map(|h| h.name.clone()))
                .transpose()?,
        });
    }

    let mut exits = Vec::new();
    for exit in scene.exits.iter().filter(|exit| !exit.hidden) {
        let target = graph.scene(&exit.to)?;
        exits.push(ResolvedExit {
            direction: exit.direction.clone(),
            to: exit.to.clone(),
            to_name: target.name.clone(),
            passable: exit.precondition.evaluate(flags),
            visited: state.is_visited(&exit.to),
        });
    }

    debug!("resolved scene '{id}' (lit: {lit}, {} objects)", objects.len());
    Ok(ResolvedScene {
        id: scene.id.clone(),
        name: scene.name.clone(),
        description,
        lit,
        visited,
        objects,
        exits,
    })
}
