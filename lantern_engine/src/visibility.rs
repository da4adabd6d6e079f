//! What the player can currently see and reach.
//!
//! An object is visible when it has been revealed (or was never hidden), when
//! light is available or it glows on its own, and when every container around
//! it is open.

use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::graph::WorldGraph;
use crate::light::has_light;
use crate::state::{Location, WorldState};

/// Visibility of `object` in the player's current light.
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn is_visible(graph: &WorldGraph, state: &WorldState, object: &str) -> Result<bool, EngineError> {
    let lit = has_light(graph, state)?;
    is_visible_with_light(graph, state, object, lit)
}

/// Visibility of `object` given an explicit light level.
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn is_visible_with_light(
    graph: &WorldGraph,
    state: &WorldState,
    object: &str,
    lit: bool,
) -> Result<bool, EngineError> {
    let def = graph.object(object)?;
    if def.requires_light && !lit {
        return Ok(false);
    }
    let flags = state.flags();
    let carried = state.location_of(object).is_inventory();
    let revealed = def.visible_on_entry || flags.has(&FlagKey::ObjectRevealed(object.to_string()));
    if !carried && !revealed {
        return Ok(false);
    }
    Ok(closed_container_around(state, object).is_none())
}

/// Innermost closed container enclosing `object`, with whether it is locked.
pub fn closed_container_around(state: &WorldState, object: &str) -> Option<(String, bool)> {
    let flags = state.flags();
    state
        .enclosing_containers(object)
        .into_iter()
        .find(|holder| !flags.has(&FlagKey::ObjectOpen(holder.clone())))
        .map(|holder| {
            let locked = flags.has(&FlagKey::ObjectLocked(holder.clone()));
            (holder, locked)
        })
}

/// Find an object in the current scene or inventory by name or alias.
///
/// Carried objects win over objects in the scene, and visible matches win
/// over hidden ones, so "lamp" finds the lamp in hand before one in a
/// closed cupboard.
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn find_present(graph: &WorldGraph, state: &WorldState, name: &str) -> Result<Option<String>, EngineError> {
    let lit = has_light(graph, state)?;
    let candidates = state
        .inventory_tree()
        .into_iter()
        .chain(state.scene_tree(state.current_scene()))
        .map(|(id, _)| id);

    let mut fallback = None;
    for id in candidates {
        if !graph.object(&id)?.matches_name(name) {
            continue;
        }
        if is_visible_with_light(graph, state, &id, lit)? {
            return Ok(Some(id));
        }
        fallback.get_or_insert(id);
    }
    Ok(fallback)
}

/// Objects the player can see in the current scene (not counting inventory).
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn visible_in_scene(graph: &WorldGraph, state: &WorldState) -> Result<Vec<String>, EngineError> {
    let lit = has_light(graph, state)?;
    let mut out = Vec::new();
    for (id, _) in state.scene_tree(state.current_scene()) {
        if is_visible_with_light(graph, state, &id, lit)? {
            out.push(id);
        }
    }
    Ok(out)
}

/// True if `location` is somewhere the player could reach right now.
pub fn is_reachable_holder(state: &WorldState, location: &Location) -> bool {
    match location {
        Location::Inventory => true,
        Location::Scene(scene) => scene == state.current_scene(),
        Location::Container(holder) => state.is_present(holder),
        Location::Nowhere => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_test_graph, create_test_state};

    #[test]
    fn object_in_closed_container_is_hidden() {
        let graph = create_test_graph();
        let mut state = create_test_state(&graph);
        assert!(!is_visible(&graph, &state, "leaflet").expect("visible"));
        assert_eq!(closed_container_around(&state, "leaflet"), Some(("mailbox".into(), false)));

        state.flags.set(FlagKey::ObjectOpen("mailbox".into()));
        assert!(is_visible(&graph, &state, "leaflet").expect("visible"));
        assert_eq!(closed_container_around(&state, "leaflet"), None);
    }

    #[test]
    fn hidden_objects_need_revealing() {
        let graph = create_test_graph();
        let mut state = create_test_state(&graph);
        state.current_scene = "living_room".into();
        assert!(!is_visible(&graph, &state, "trapdoor").expect("visible"));
        state.flags.set(FlagKey::ObjectRevealed("trapdoor".into()));
        assert!(is_visible(&graph, &state, "trapdoor").expect("visible"));
    }

    #[test]
    fn darkness_hides_objects_that_need_light() {
        let graph = create_test_graph();
        let mut state = create_test_state(&graph);
        state.current_scene = "cellar".into();
        assert!(!is_visible(&graph, &state, "painting").expect("visible"));
        assert!(is_visible_with_light(&graph, &state, "painting", true).expect("visible"));
    }

    #[test]
    fn find_present_resolves_names_and_aliases() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        assert_eq!(find_present(&graph, &state, "mailbox").expect("find"), Some("mailbox".into()));
        assert_eq!(find_present(&graph, &state, "leaflet").expect("find"), Some("leaflet".into()));
        assert_eq!(find_present(&graph, &state, "lamp").expect("find"), None);
    }

    #[test]
    fn visible_in_scene_skips_closed_contents() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        let visible = visible_in_scene(&graph, &state).expect("visible");
        assert!(visible.contains(&"mailbox".to_string()));
        assert!(!visible.contains(&"leaflet".to_string()));
    }
}
