//! The compiled, immutable world graph.
//!
//! `WorldGraph` holds everything that does not change during play: scenes,
//! exits, object definitions with their interaction tables, and the scoring
//! rules. It is built once by the loader and shared read-only by every
//! engine service.

use std::collections::{BTreeMap, HashMap};

use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::interaction::{InteractionSpec, Verb};
use crate::object::ObjectDefinition;
use crate::scene::SceneDefinition;

/// A title awarded for reaching a percentage of the maximum score.
#[derive(Debug, Clone, PartialEq)]
pub struct Rank {
    pub threshold: f32,
    pub name: String,
    pub description: String,
}

/// Announced once, the first time the running score reaches `threshold`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: String,
    pub threshold: u32,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringRules {
    pub report_title: String,
    /// Sorted by threshold, highest first.
    pub ranks: Vec<Rank>,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Default)]
pub struct WorldGraph {
    pub title: String,
    pub slug: String,
    pub author: String,
    pub version: String,
    pub intro: String,
    pub start_scene: String,
    pub carry_limit: Option<u32>,
    pub initial_flags: Vec<FlagKey>,
    pub scenes: BTreeMap<String, SceneDefinition>,
    pub objects: BTreeMap<String, ObjectDefinition>,
    pub scoring: ScoringRules,
    pub max_score: u32,
}

impl WorldGraph {
    /// # Errors
    /// `EngineError::UnknownScene` if no scene has this id.
    pub fn scene(&self, id: &str) -> Result<&SceneDefinition, EngineError> {
        self.scenes
            .get(id)
            .ok_or_else(|| EngineError::UnknownScene(id.to_string()))
    }

    /// # Errors
    /// `EngineError::UnknownObject` if no object has this id.
    pub fn object(&self, id: &str) -> Result<&ObjectDefinition, EngineError> {
        self.objects
            .get(id)
            .ok_or_else(|| EngineError::UnknownObject(id.to_string()))
    }

    pub fn has_scene(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    pub fn has_object(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    /// Authored interaction entry for `verb` on `object`, if any.
    pub fn interaction(&self, object: &str, verb: &Verb) -> Option<&InteractionSpec> {
        self.objects.get(object).and_then(|def| def.interaction(verb))
    }

    /// Resolve an authored flag name against this graph's ids.
    pub fn resolve_flag(&self, name: &str) -> FlagKey {
        FlagKey::resolve(name, |id| self.has_object(id), |id| self.has_scene(id))
    }

    /// Highest score attainable: every positive interaction score plus the
    /// best exit score into each scene (exit scores are guarded per target).
    pub fn compute_max_score(&self) -> u32 {
        let interactions = self
            .objects
            .values()
            .flat_map(|object| object.interactions.values())
            .filter_map(|spec| u32::try_from(spec.score).ok())
            .fold(0u32, u32::saturating_add);

        let mut best_exit: HashMap<&str, u32> = HashMap::new();
        for exit in self.scenes.values().flat_map(|scene| scene.exits.iter()) {
            let entry = best_exit.entry(exit.to.as_str()).or_default();
            *entry = (*entry).max(exit.score);
        }
        best_exit.values().fold(interactions, |total, score| total.saturating_add(*score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Exit;
    use crate::state::Location;

    fn create_test_graph() -> WorldGraph {
        let mut hall = SceneDefinition::new("hall", "Hall", "A hall.");
        let mut up = Exit::new("up", "attic");
        up.score = 5;
        let mut ladder = Exit::new("climb", "attic");
        ladder.score = 3;
        hall.exits = vec![up, ladder];
        let attic = SceneDefinition::new("attic", "Attic", "Dusty.");

        let mut bell = ObjectDefinition::new("bell", "brass bell", Location::Scene("hall".into()));
        bell.interactions.insert(
            Verb::Other("ring".into()),
            InteractionSpec {
                score: 10,
                ..InteractionSpec::default()
            },
        );
        bell.interactions.insert(
            Verb::Other("kick".into()),
            InteractionSpec {
                score: -2,
                ..InteractionSpec::default()
            },
        );

        WorldGraph {
            start_scene: "hall".into(),
            scenes: [("hall".to_string(), hall), ("attic".to_string(), attic)].into(),
            objects: [("bell".to_string(), bell)].into(),
            ..WorldGraph::default()
        }
    }

    #[test]
    fn lookups_report_unknown_ids() {
        let graph = create_test_graph();
        assert!(graph.scene("hall").is_ok());
        assert!(matches!(graph.scene("cellar"), Err(EngineError::UnknownScene(id)) if id == "cellar"));
        assert!(matches!(graph.object("ghost"), Err(EngineError::UnknownObject(id)) if id == "ghost"));
    }

    #[test]
    fn max_score_counts_positive_scores_and_best_exit_per_target() {
        let graph = create_test_graph();
        assert_eq!(graph.compute_max_score(), 15);
    }

    #[test]
    fn max_score_saturates_instead_of_overflowing() {
        let mut graph = create_test_graph();
        let hall = graph.scenes.get_mut("hall").expect("hall");
        hall.exits[0].score = u32::MAX;
        let mut down = Exit::new("down", "hall");
        down.score = u32::MAX;
        graph.scenes.get_mut("attic").expect("attic").exits = vec![down];
        graph
            .objects
            .get_mut("bell")
            .expect("bell")
            .interactions
            .insert(
                Verb::Other("polish".into()),
                InteractionSpec {
                    score: i32::MAX,
                    ..InteractionSpec::default()
                },
            );
        assert_eq!(graph.compute_max_score(), u32::MAX);
    }

    #[test]
    fn interaction_lookup() {
        let graph = create_test_graph();
        assert!(graph.interaction("bell", &Verb::Other("ring".into())).is_some());
        assert!(graph.interaction("bell", &Verb::Take).is_none());
        assert!(graph.interaction("ghost", &Verb::Take).is_none());
    }

    #[test]
    fn flag_resolution_uses_graph_ids() {
        let graph = create_test_graph();
        assert_eq!(graph.resolve_flag("attic_visited"), FlagKey::SceneVisited("attic".into()));
        assert_eq!(graph.resolve_flag("bellOn"), FlagKey::LightOn("bell".into()));
        assert_eq!(graph.resolve_flag("doorOpen"), FlagKey::Custom("doorOpen".into()));
    }
}
