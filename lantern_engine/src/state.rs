//! Mutable world state.
//!
//! `WorldState` is the single mutable aggregate of a running game: the
//! player's scene, the flag store, the holder sets that say where each object
//! is, the score, the turn counter, and light usage counters. Derived facts
//! (open, locked, visited, lit) are always read from flags.
//!
//! Fields are crate-private; outside the engine the state is read-only.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use log::info;
use variantly::Variantly;

use crate::error::EngineError;
use crate::flags::{FlagKey, FlagStore};
use crate::graph::WorldGraph;

/// Where an object currently is.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Variantly)]
pub enum Location {
    Scene(String),
    Container(String),
    Inventory,
    #[default]
    Nowhere,
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Scene(id) => write!(f, "scene '{id}'"),
            Location::Container(id) => write!(f, "container '{id}'"),
            Location::Inventory => write!(f, "inventory"),
            Location::Nowhere => write!(f, "nowhere"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldState {
    pub(crate) current_scene: String,
    pub(crate) flags: FlagStore,
    pub(crate) inventory: BTreeSet<String>,
    pub(crate) containers: BTreeMap<String, BTreeSet<String>>,
    pub(crate) scenes: BTreeMap<String, BTreeSet<String>>,
    pub(crate) score: u32,
    pub(crate) turns: u32,
    pub(crate) light_usage: BTreeMap<String, u32>,
}

impl WorldState {
    /// Fresh state for a new game: start scene, initial flags, and every
    /// object at its authored start location.
    ///
    /// # Errors
    /// Returns an integrity error if the start scene or a start location
    /// names something the graph does not contain.
    pub fn new(graph: &WorldGraph) -> Result<Self, EngineError> {
        graph.scene(&graph.start_scene)?;
        let mut state = WorldState {
            current_scene: graph.start_scene.clone(),
            ..WorldState::default()
        };
        for scene_id in graph.scenes.keys() {
            state.scenes.insert(scene_id.clone(), BTreeSet::new());
        }
        for (id, object) in &graph.objects {
            if object.is_container() {
                state.containers.insert(id.clone(), BTreeSet::new());
            }
        }

        for (id, object) in &graph.objects {
            state.place(graph, id, object.start.clone())?;
            if let Some(container) = &object.container {
                if container.starts_open {
                    state.flags.set(FlagKey::ObjectOpen(id.clone()));
                }
                if container.starts_locked {
                    state.flags.set(FlagKey::ObjectLocked(id.clone()));
                }
            }
            if let Some(light) = &object.light_source
                && light.starts_on
            {
                state.flags.set(FlagKey::LightOn(id.clone()));
            }
        }
        for flag in &graph.initial_flags {
            state.flags.set(flag.clone());
        }
        info!(
            "new world state at '{}' with {} objects placed",
            state.current_scene,
            graph.objects.len()
        );
        Ok(state)
    }

    pub fn current_scene(&self) -> &str {
        &self.current_scene
    }

    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn inventory(&self) -> impl Iterator<Item = &String> {
        self.inventory.iter()
    }

    pub fn in_inventory(&self, object: &str) -> bool {
        self.inventory.contains(object)
    }

    /// Direct contents of a container (empty for unknown ids).
    pub fn contents_of(&self, container: &str) -> impl Iterator<Item = &String> {
        self.containers.get(container).into_iter().flatten()
    }

    /// Objects lying directly in a scene.
    pub fn scene_contents(&self, scene: &str) -> impl Iterator<Item = &String> {
        self.scenes.get(scene).into_iter().flatten()
    }

    pub fn is_visited(&self, scene: &str) -> bool {
        self.flags.has(&FlagKey::SceneVisited(scene.to_string()))
    }

    /// Ids of visited scenes, derived from `SceneVisited` flags.
    pub fn visited_scenes(&self) -> Vec<String> {
        self.flags
            .iter()
            .filter_map(|flag| match flag {
                FlagKey::SceneVisited(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Turns a light source has spent switched on.
    pub fn light_usage(&self, object: &str) -> u32 {
        self.light_usage.get(object).copied().unwrap_or(0)
    }

    /// Current holder of `object`. Unplaced objects are `Nowhere`.
    pub fn location_of(&self, object: &str) -> Location {
        if self.inventory.contains(object) {
            return Location::Inventory;
        }
        if let Some((id, _)) = self.containers.iter().find(|(_, items)| items.contains(object)) {
            return Location::Container(id.clone());
        }
        if let Some((id, _)) = self.scenes.iter().find(|(_, items)| items.contains(object)) {
            return Location::Scene(id.clone());
        }
        Location::Nowhere
    }

    /// Containers enclosing `object`, innermost first.
    pub fn enclosing_containers(&self, object: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cursor = object.to_string();
        while let Location::Container(holder) = self.location_of(&cursor) {
            if chain.contains(&holder) {
                break;
            }
            chain.push(holder.clone());
            cursor = holder;
        }
        chain
    }

    /// The top-level holder of `object` once its container chain is unwound.
    pub fn root_location(&self, object: &str) -> Location {
        let outermost = self
            .enclosing_containers(object)
            .pop()
            .unwrap_or_else(|| object.to_string());
        match self.location_of(&outermost) {
            Location::Container(_) => Location::Nowhere,
            other => other,
        }
    }

    /// True if the object is in the current scene (at any depth) or carried.
    pub fn is_present(&self, object: &str) -> bool {
        match self.root_location(object) {
            Location::Inventory => true,
            Location::Scene(scene) => scene == self.current_scene,
            _ => false,
        }
    }

    /// Every object in `scene` with the container directly holding it
    /// (`None` for objects lying in the scene itself), depth first.
    pub fn scene_tree(&self, scene: &str) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        for object in self.scene_contents(scene) {
            self.collect_tree(object, None, &mut out);
        }
        out
    }

    /// Carried objects and anything inside them, like [`Self::scene_tree`].
    pub fn inventory_tree(&self) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        for object in &self.inventory {
            self.collect_tree(object, None, &mut out);
        }
        out
    }

    fn collect_tree(&self, object: &str, holder: Option<&str>, out: &mut Vec<(String, Option<String>)>) {
        if out.iter().any(|(id, _)| id == object) {
            return;
        }
        out.push((object.to_string(), holder.map(str::to_string)));
        for inner in self.contents_of(object) {
            self.collect_tree(inner, Some(object), out);
        }
    }

    /// Weight of an object including everything inside it.
    ///
    /// # Errors
    /// `EngineError::UnknownObject` for ids missing from the graph.
    pub fn total_weight(&self, graph: &WorldGraph, object: &str) -> Result<u32, EngineError> {
        let mut weight = graph.object(object)?.weight;
        for inner in self.contents_of(object) {
            weight = weight.saturating_add(self.total_weight(graph, inner)?);
        }
        Ok(weight)
    }

    /// Combined weight of a holder's direct contents.
    ///
    /// # Errors
    /// `EngineError::UnknownObject` for ids missing from the graph.
    pub fn load_of(&self, graph: &WorldGraph, holder: &Location) -> Result<u32, EngineError> {
        let items: Vec<&String> = match holder {
            Location::Inventory => self.inventory.iter().collect(),
            Location::Container(id) => self.contents_of(id).collect(),
            Location::Scene(id) => self.scene_contents(id).collect(),
            Location::Nowhere => Vec::new(),
        };
        let mut total = 0u32;
        for item in items {
            total = total.saturating_add(self.total_weight(graph, item)?);
        }
        Ok(total)
    }

    /// Put an unplaced object into `to`. Callers remove it from its previous
    /// holder first with [`Self::unplace`].
    pub(crate) fn place(&mut self, graph: &WorldGraph, object: &str, to: Location) -> Result<(), EngineError> {
        graph.object(object)?;
        match to {
            Location::Inventory => {
                self.inventory.insert(object.to_string());
            },
            Location::Container(holder) => {
                if !graph.object(&holder)?.is_container() {
                    return Err(EngineError::NotAContainer(holder));
                }
                self.containers.entry(holder).or_default().insert(object.to_string());
            },
            Location::Scene(scene) => {
                graph.scene(&scene)?;
                self.scenes.entry(scene).or_default().insert(object.to_string());
            },
            Location::Nowhere => {},
        }
        Ok(())
    }

    /// Remove an object from whichever holder has it and return that holder.
    pub(crate) fn unplace(&mut self, object: &str) -> Location {
        let from = self.location_of(object);
        match &from {
            Location::Inventory => {
                self.inventory.remove(object);
            },
            Location::Container(holder) => {
                if let Some(items) = self.containers.get_mut(holder) {
                    items.remove(object);
                }
            },
            Location::Scene(scene) => {
                if let Some(items) = self.scenes.get_mut(scene) {
                    items.remove(object);
                }
            },
            Location::Nowhere => {},
        }
        from
    }

    /// Check that no object is listed by more than one holder.
    ///
    /// # Errors
    /// `EngineError::MultiplePlacement` naming the first duplicate found.
    pub fn check_single_placement(&self) -> Result<(), EngineError> {
        let mut seen = BTreeSet::new();
        let holders = std::iter::once(&self.inventory)
            .chain(self.containers.values())
            .chain(self.scenes.values());
        for items in holders {
            for item in items {
                if !seen.insert(item) {
                    return Err(EngineError::MultiplePlacement { object: item.clone() });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_graph;

    #[test]
    fn new_state_places_objects_at_start() {
        let graph = create_test_graph();
        let state = WorldState::new(&graph).expect("state");
        assert_eq!(state.current_scene(), "west_of_house");
        assert_eq!(state.location_of("mailbox"), Location::Scene("west_of_house".into()));
        assert_eq!(state.location_of("leaflet"), Location::Container("mailbox".into()));
        assert_eq!(state.location_of("lamp"), Location::Scene("living_room".into()));
        assert!(state.check_single_placement().is_ok());
    }

    #[test]
    fn container_chain_and_root_location() {
        let graph = create_test_graph();
        let state = WorldState::new(&graph).expect("state");
        assert_eq!(state.enclosing_containers("leaflet"), vec!["mailbox".to_string()]);
        assert_eq!(state.root_location("leaflet"), Location::Scene("west_of_house".into()));
        assert!(state.is_present("leaflet"));
        assert!(!state.is_present("lamp"));
    }

    #[test]
    fn scene_tree_includes_container_contents() {
        let graph = create_test_graph();
        let state = WorldState::new(&graph).expect("state");
        let tree = state.scene_tree("west_of_house");
        assert!(tree.contains(&("mailbox".to_string(), None)));
        assert!(tree.contains(&("leaflet".to_string(), Some("mailbox".to_string()))));
    }

    #[test]
    fn place_and_unplace_keep_single_holder() {
        let graph = create_test_graph();
        let mut state = WorldState::new(&graph).expect("state");
        let from = state.unplace("leaflet");
        assert_eq!(from, Location::Container("mailbox".into()));
        assert_eq!(state.location_of("leaflet"), Location::Nowhere);
        state.place(&graph, "leaflet", Location::Inventory).expect("place");
        assert_eq!(state.location_of("leaflet"), Location::Inventory);
        assert!(state.check_single_placement().is_ok());
    }

    #[test]
    fn placing_into_non_container_is_an_integrity_error() {
        let graph = create_test_graph();
        let mut state = WorldState::new(&graph).expect("state");
        state.unplace("leaflet");
        let err = state
            .place(&graph, "leaflet", Location::Container("lamp".into()))
            .expect_err("lamp is not a container");
        assert_eq!(err, EngineError::NotAContainer("lamp".into()));
    }

    #[test]
    fn duplicate_placement_is_detected() {
        let graph = create_test_graph();
        let mut state = WorldState::new(&graph).expect("state");
        state.inventory.insert("mailbox".into());
        assert_eq!(
            state.check_single_placement(),
            Err(EngineError::MultiplePlacement {
                object: "mailbox".into()
            })
        );
    }

    #[test]
    fn weights_include_contents() {
        let graph = create_test_graph();
        let state = WorldState::new(&graph).expect("state");
        let mailbox = graph.object("mailbox").expect("mailbox").weight;
        let leaflet = graph.object("leaflet").expect("leaflet").weight;
        assert_eq!(state.total_weight(&graph, "mailbox").expect("weight"), mailbox + leaflet);
        assert_eq!(
            state
                .load_of(&graph, &Location::Container("mailbox".into()))
                .expect("load"),
            leaflet
        );
    }
}
