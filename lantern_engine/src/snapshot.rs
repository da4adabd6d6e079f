//! Flat, serializable copy of a `WorldState`.
//!
//! Snapshots carry ids and canonical flag text only, so they survive content
//! edits that keep ids stable. Importing checks every id against the graph
//! and builds a fresh state; the caller swaps it in only if that succeeds.

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::LANTERN_VERSION;
use crate::error::EngineError;
use crate::flags::{FlagKey, FlagStore};
use crate::graph::WorldGraph;
use crate::light::recompute_light;
use crate::state::WorldState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Engine version that wrote the snapshot.
    pub version: String,
    /// Slug of the world the snapshot belongs to.
    pub world: String,
    pub current_scene: String,
    pub flags: BTreeMap<String, bool>,
    pub inventory: Vec<String>,
    pub containers: BTreeMap<String, Vec<String>>,
    pub scenes: BTreeMap<String, Vec<String>>,
    pub score: u32,
    pub turns: u32,
    pub visited: Vec<String>,
    pub light_usage: BTreeMap<String, u32>,
}

/// Export the state as a snapshot.
pub fn export(graph: &WorldGraph, state: &WorldState) -> StateSnapshot {
    let list = |items: &BTreeSet<String>| items.iter().cloned().collect::<Vec<_>>();
    StateSnapshot {
        version: LANTERN_VERSION.to_string(),
        world: graph.slug.clone(),
        current_scene: state.current_scene.clone(),
        flags: state.flags.iter().map(|flag| (flag.to_string(), true)).collect(),
        inventory: list(&state.inventory),
        containers: state
            .containers
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(id, items)| (id.clone(), list(items)))
            .collect(),
        scenes: state
            .scenes
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(id, items)| (id.clone(), list(items)))
            .collect(),
        score: state.score,
        turns: state.turns,
        visited: state.visited_scenes(),
        light_usage: state.light_usage.clone(),
    }
}

fn reject(reason: impl Into<String>) -> EngineError {
    EngineError::Snapshot(reason.into())
}

fn known_object(graph: &WorldGraph, id: &str, context: &str) -> Result<(), EngineError> {
    if graph.has_object(id) {
        Ok(())
    } else {
        Err(reject(format!("{context} names unknown object '{id}'")))
    }
}

fn known_scene(graph: &WorldGraph, id: &str, context: &str) -> Result<(), EngineError> {
    if graph.has_scene(id) {
        Ok(())
    } else {
        Err(reject(format!("{context} names unknown scene '{id}'")))
    }
}

/// Check that a typed flag refers to something that exists.
fn check_flag(graph: &WorldGraph, flag: &FlagKey) -> Result<(), EngineError> {
    match flag {
        FlagKey::ObjectOpen(id)
        | FlagKey::ObjectLocked(id)
        | FlagKey::ObjectRevealed(id)
        | FlagKey::LightOn(id)
        | FlagKey::LightDead(id) => known_object(graph, id, &format!("flag '{flag}'")),
        FlagKey::InteractionScored { object, .. } => known_object(graph, object, &format!("flag '{flag}'")),
        FlagKey::SceneVisited(id) | FlagKey::ExitScored(id) => known_scene(graph, id, &format!("flag '{flag}'")),
        FlagKey::Light | FlagKey::Achievement(_) | FlagKey::Custom(_) => Ok(()),
    }
}

/// Build a state from a snapshot.
///
/// # Errors
/// `EngineError::Snapshot` if the snapshot belongs to another world, names
/// unknown ids, lists a non-container as a holder, places an object in more
/// than one holder, or nests a container inside itself.
pub fn import(graph: &WorldGraph, snapshot: &StateSnapshot) -> Result<WorldState, EngineError> {
    if !graph.slug.is_empty() && !snapshot.world.is_empty() && snapshot.world != graph.slug {
        return Err(reject(format!(
            "snapshot is for world '{}', not '{}'",
            snapshot.world, graph.slug
        )));
    }
    if snapshot.version != LANTERN_VERSION {
        warn!(
            "snapshot written by engine version {} (running {LANTERN_VERSION})",
            snapshot.version
        );
    }
    known_scene(graph, &snapshot.current_scene, "current scene")?;

    let mut flags = FlagStore::new();
    for (text, value) in &snapshot.flags {
        let key = FlagKey::parse_canonical(text);
        check_flag(graph, &key)?;
        flags.assign(key, *value);
    }
    for scene in &snapshot.visited {
        known_scene(graph, scene, "visited list")?;
        flags.set(FlagKey::SceneVisited(scene.clone()));
    }

    let mut state = WorldState {
        current_scene: snapshot.current_scene.clone(),
        flags,
        score: snapshot.score,
        turns: snapshot.turns,
        ..WorldState::default()
    };
    for id in graph.scenes.keys() {
        state.scenes.insert(id.clone(), BTreeSet::new());
    }
    for (id, def) in &graph.objects {
        if def.is_container() {
            state.containers.insert(id.clone(), BTreeSet::new());
        }
    }

    for item in &snapshot.inventory {
        known_object(graph, item, "inventory")?;
        state.inventory.insert(item.clone());
    }
    for (holder, items) in &snapshot.containers {
        known_object(graph, holder, "container list")?;
        if !graph.object(holder)?.is_container() {
            return Err(reject(format!("'{holder}' holds items but is not a container")));
        }
        for item in items {
            known_object(graph, item, &format!("container '{holder}'"))?;
            state.containers.entry(holder.clone()).or_default().insert(item.clone());
        }
    }
    for (scene, items) in &snapshot.scenes {
        known_scene(graph, scene, "scene list")?;
        for item in items {
            known_object(graph, item, &format!("scene '{scene}'"))?;
            state.scenes.entry(scene.clone()).or_default().insert(item.clone());
        }
    }
    state
        .check_single_placement()
        .map_err(|err| reject(err.to_string()))?;
    if let Some(looped) = state
        .containers
        .keys()
        .find(|id| state.enclosing_containers(id.as_str()).contains(*id))
    {
        return Err(reject(format!("container '{looped}' ends up inside itself")));
    }

    for (id, used) in &snapshot.light_usage {
        known_object(graph, id, "light usage")?;
        if !graph.object(id)?.is_light_source() {
            return Err(reject(format!("'{id}' has light usage but is not a light source")));
        }
        state.light_usage.insert(id.clone(), *used);
    }

    recompute_light(graph, &mut state)?;
    info!(
        "imported snapshot at '{}' (score {}, turn {})",
        state.current_scene, state.score, state.turns
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Location;
    use crate::testing::{create_test_graph, create_test_state};

    #[test]
    fn export_then_import_restores_state() {
        let graph = create_test_graph();
        let mut state = create_test_state(&graph);
        state.flags.set(FlagKey::ObjectOpen("mailbox".into()));
        state.unplace("leaflet");
        state.place(&graph, "leaflet", Location::Inventory).expect("place");
        state.score = 7;
        state.turns = 3;
        state.light_usage.insert("lamp".into(), 2);
        crate::light::recompute_light(&graph, &mut state).expect("light");

        let restored = import(&graph, &export(&graph, &state)).expect("import");
        assert_eq!(restored, state);
    }

    #[test]
    fn snapshot_survives_serde_json() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        let snapshot = export(&graph, &state);
        let text = serde_json::to_string(&snapshot).expect("serialize");
        let back: StateSnapshot = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, snapshot);
    }

    #[test]
    fn double_placement_is_rejected() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        let mut snapshot = export(&graph, &state);
        snapshot.inventory.push("mailbox".into());
        assert!(matches!(import(&graph, &snapshot), Err(EngineError::Snapshot(_))));
    }

    #[test]
    fn self_containing_container_is_rejected() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        let mut snapshot = export(&graph, &state);
        snapshot.scenes.get_mut("kitchen").expect("kitchen").retain(|id| id != "sack");
        snapshot.containers.insert("sack".into(), vec!["sack".into()]);
        assert!(matches!(import(&graph, &snapshot), Err(EngineError::Snapshot(_))));
    }

    #[test]
    fn containers_nested_in_a_loop_are_rejected() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        let mut snapshot = export(&graph, &state);
        snapshot
            .scenes
            .get_mut("kitchen")
            .expect("kitchen")
            .retain(|id| id != "sack" && id != "chest");
        snapshot.containers.insert("sack".into(), vec!["chest".into()]);
        snapshot.containers.insert("chest".into(), vec!["sack".into()]);
        assert!(matches!(import(&graph, &snapshot), Err(EngineError::Snapshot(_))));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);

        let mut snapshot = export(&graph, &state);
        snapshot.current_scene = "attic".into();
        assert!(import(&graph, &snapshot).is_err());

        let mut snapshot = export(&graph, &state);
        snapshot.flags.insert("open:piano".into(), true);
        assert!(import(&graph, &snapshot).is_err());

        let mut snapshot = export(&graph, &state);
        snapshot.containers.insert("rug".into(), vec!["key".into()]);
        assert!(import(&graph, &snapshot).is_err());
    }

    #[test]
    fn other_worlds_are_rejected() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        let mut snapshot = export(&graph, &state);
        snapshot.world = "another-game".into();
        assert!(import(&graph, &snapshot).is_err());
    }
}
