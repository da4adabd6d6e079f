//! WorldDef loader and conversion helpers.
//!
//! Converts the serialized `WorldDef` data model into the compiled
//! [`WorldGraph`]. Condition clauses and flag names are resolved here, once,
//! against the ids the world actually contains.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use lantern_data::{
    ConditionDef, DescriptionDef, ExitDef, InteractionDef, LocationRef, ObjectDef, SceneDef, ScoringDef, TransferDef,
    WorldDef,
};

use crate::condition::Condition;
use crate::description::DescriptionTable;
use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::graph::{Achievement, Rank, ScoringRules, WorldGraph};
use crate::interaction::{InteractionSpec, Transfer, Verb};
use crate::object::{ContainerSpec, LightSourceSpec, ObjectDefinition};
use crate::scene::{Exit, SceneDefinition};
use crate::state::Location;

/// Load a `WorldDef` from a RON file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid RON.
pub fn load_worlddef(path: &Path) -> Result<WorldDef> {
    let text = fs::read_to_string(path).with_context(|| format!("reading worlddef from '{}'", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing worlddef RON from '{}'", path.display()))
}

/// Compile a `WorldDef` into a `WorldGraph`.
///
/// The definition should already have passed `validate_world`; anything
/// that still fails to compile is reported as an integrity error.
///
/// # Errors
/// `EngineError::Condition` for malformed condition clauses.
pub fn build_graph(def: &WorldDef) -> Result<WorldGraph, EngineError> {
    let mut graph = WorldGraph {
        title: def.game.title.clone(),
        slug: def.game.slug.clone(),
        author: def.game.author.clone(),
        version: def.game.version.clone(),
        intro: def.game.intro.clone(),
        start_scene: def.game.start_scene.clone(),
        carry_limit: def.game.carry_limit,
        scoring: scoring_from_def(&def.game.scoring),
        ..WorldGraph::default()
    };

    // Ids first, so flag names can be resolved against them.
    for scene in &def.scenes {
        graph
            .scenes
            .insert(scene.id.clone(), SceneDefinition::new(&scene.id, &scene.name, ""));
    }
    for object in &def.objects {
        graph.objects.insert(
            object.id.clone(),
            ObjectDefinition::new(&object.id, &object.name, Location::Nowhere),
        );
    }

    let mut scenes = Vec::with_capacity(def.scenes.len());
    for scene in &def.scenes {
        scenes.push(scene_from_def(&graph, scene)?);
    }
    let mut objects = Vec::with_capacity(def.objects.len());
    for object in &def.objects {
        objects.push(object_from_def(&graph, object)?);
    }
    graph.initial_flags = def.game.initial_flags.iter().map(|name| graph.resolve_flag(name)).collect();

    graph.scenes = scenes.into_iter().map(|scene| (scene.id.clone(), scene)).collect();
    for object in &objects {
        if let Location::Scene(scene_id) = &object.start
            && let Some(scene) = graph.scenes.get_mut(scene_id)
        {
            scene.objects.push(object.id.clone());
        }
    }
    graph.objects = objects.into_iter().map(|object| (object.id.clone(), object)).collect();
    graph.max_score = graph.compute_max_score();
    Ok(graph)
}

fn scoring_from_def(def: &ScoringDef) -> ScoringRules {
    let mut ranks: Vec<Rank> = def
        .ranks
        .iter()
        .map(|rank| Rank {
            threshold: rank.threshold,
            name: rank.name.clone(),
            description: rank.description.clone(),
        })
        .collect();
    ranks.sort_by(|a, b| b.threshold.partial_cmp(&a.threshold).unwrap_or(std::cmp::Ordering::Equal));
    ScoringRules {
        report_title: def.report_title.clone(),
        ranks,
        achievements: def
            .achievements
            .iter()
            .map(|achievement| Achievement {
                id: achievement.id.clone(),
                threshold: achievement.threshold,
                message: achievement.message.clone(),
            })
            .collect(),
    }
}

fn condition_from_def(graph: &WorldGraph, def: &ConditionDef, context: &str) -> Result<Condition, EngineError> {
    Condition::parse_clauses(def, &|name| graph.resolve_flag(name)).map_err(|source| EngineError::Condition {
        context: context.to_string(),
        source,
    })
}

fn description_from_def(graph: &WorldGraph, def: &DescriptionDef, context: &str) -> Result<DescriptionTable, EngineError> {
    let mut overrides = Vec::with_capacity(def.overrides.len());
    for (index, over) in def.overrides.iter().enumerate() {
        let condition = condition_from_def(graph, &over.when, &format!("{context} override {index}"))?;
        overrides.push((condition, over.text.clone()));
    }
    Ok(DescriptionTable {
        default: def.text.clone(),
        overrides,
        dark: def.dark.clone(),
        visited: def.visited.clone(),
    })
}

fn scene_from_def(graph: &WorldGraph, def: &SceneDef) -> Result<SceneDefinition, EngineError> {
    let context = format!("scene '{}'", def.id);
    let exits = def
        .exits
        .iter()
        .map(|exit| exit_from_def(graph, exit, &context))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SceneDefinition {
        id: def.id.clone(),
        name: def.name.clone(),
        region: def.region.clone(),
        natural_light: def.lit,
        description: description_from_def(graph, &def.desc, &context)?,
        objects: Vec::new(),
        exits,
    })
}

fn exit_from_def(graph: &WorldGraph, def: &ExitDef, scene_context: &str) -> Result<Exit, EngineError> {
    let context = format!("{scene_context} exit '{}'", def.direction);
    Ok(Exit {
        direction: def.direction.clone(),
        to: def.to.clone(),
        description: def.desc.clone(),
        precondition: condition_from_def(graph, &def.requires, &context)?,
        barred_message: def.barred_message.clone(),
        score: def.score,
        hidden: def.hidden,
    })
}

fn object_from_def(graph: &WorldGraph, def: &ObjectDef) -> Result<ObjectDefinition, EngineError> {
    let context = format!("object '{}'", def.id);
    let mut interactions = HashMap::new();
    for interaction in &def.interactions {
        let verb = Verb::parse(&interaction.verb);
        let spec = interaction_from_def(graph, interaction, &format!("{context} verb '{}'", interaction.verb))?;
        if interactions.insert(verb, spec).is_some() {
            return Err(EngineError::Content(format!(
                "{context} has more than one '{}' interaction",
                interaction.verb
            )));
        }
    }
    Ok(ObjectDefinition {
        id: def.id.clone(),
        name: def.name.clone(),
        aliases: def.aliases.clone(),
        description: description_from_def(graph, &def.desc, &context)?,
        start: location_from_ref(&def.location),
        visible_on_entry: def.visible_on_entry,
        requires_light: def.requires_light,
        takeable: def.takeable,
        weight: def.weight,
        container: def.container.as_ref().map(|container| ContainerSpec {
            capacity: container.capacity,
            starts_open: container.open,
            starts_locked: container.locked,
        }),
        light_source: def.light_source.as_ref().map(|light| LightSourceSpec {
            battery_life: light.battery_life,
            starts_on: light.on,
        }),
        interactions,
    })
}

fn interaction_from_def(graph: &WorldGraph, def: &InteractionDef, context: &str) -> Result<InteractionSpec, EngineError> {
    let message = def
        .message
        .as_ref()
        .map(|message| description_from_def(graph, message, context))
        .transpose()?;
    let flags = |names: &[String]| names.iter().map(|name| graph.resolve_flag(name)).collect::<Vec<FlagKey>>();
    Ok(InteractionSpec {
        message,
        failure_message: def.failure_message.clone(),
        precondition: condition_from_def(graph, &def.requires, context)?,
        requires_held: def.requires_held.clone(),
        grants: flags(def.grants.as_slice()),
        removes: flags(def.removes.as_slice()),
        score: def.score,
        reveals: def.reveals.clone(),
        transfers: def.transfers.iter().map(transfer_from_def).collect(),
        target_scene: def.target_scene.clone(),
    })
}

fn transfer_from_def(def: &TransferDef) -> Transfer {
    Transfer {
        object: def.object.clone(),
        to: location_from_ref(&def.to),
    }
}

fn location_from_ref(loc: &LocationRef) -> Location {
    match loc {
        LocationRef::Inventory => Location::Inventory,
        LocationRef::Nowhere => Location::Nowhere,
        LocationRef::Scene(id) => Location::Scene(id.clone()),
        LocationRef::Container(id) => Location::Container(id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_data::{ContainerDef, GameDef, OverrideDef};

    fn create_test_def() -> WorldDef {
        let field = SceneDef {
            id: "field".into(),
            name: "Field".into(),
            region: String::new(),
            lit: true,
            desc: DescriptionDef {
                text: "An open field.".into(),
                overrides: vec![OverrideDef {
                    when: vec!["boxOpen".into()],
                    text: "An open field with an open box.".into(),
                }],
                ..DescriptionDef::default()
            },
            exits: vec![ExitDef {
                direction: "north".into(),
                to: "forest".into(),
                desc: String::new(),
                requires: vec!["boxOpen|field_visited".into()],
                barred_message: None,
                score: 3,
                hidden: false,
            }],
        };
        let forest = SceneDef {
            id: "forest".into(),
            name: "Forest".into(),
            region: String::new(),
            lit: false,
            desc: DescriptionDef::plain("Trees."),
            exits: Vec::new(),
        };
        let boxed = ObjectDef {
            id: "box".into(),
            name: "cardboard box".into(),
            aliases: Vec::new(),
            desc: DescriptionDef::plain("A box."),
            location: LocationRef::Scene("field".into()),
            visible_on_entry: true,
            requires_light: true,
            takeable: false,
            weight: 1,
            container: Some(ContainerDef {
                capacity: 3,
                open: false,
                locked: false,
            }),
            light_source: None,
            interactions: vec![InteractionDef {
                verb: "kick".into(),
                grants: vec!["boxKicked".into()],
                score: 2,
                ..InteractionDef::default()
            }],
        };
        WorldDef {
            game: GameDef {
                title: "Field".into(),
                start_scene: "field".into(),
                ..GameDef::default()
            },
            scenes: vec![field, forest],
            objects: vec![boxed],
        }
    }

    #[test]
    fn conventional_flag_names_resolve_to_typed_keys() {
        let graph = build_graph(&create_test_def()).expect("graph");
        let field = graph.scene("field").expect("field");
        assert_eq!(
            field.description.overrides[0].0,
            Condition::flag(FlagKey::ObjectOpen("box".into()))
        );
        assert_eq!(
            field.exits[0].precondition,
            Condition::Or(vec![
                Condition::flag(FlagKey::ObjectOpen("box".into())),
                Condition::flag(FlagKey::SceneVisited("field".into())),
            ])
        );
        let kick = graph.interaction("box", &Verb::Other("kick".into())).expect("kick");
        assert_eq!(kick.grants, vec![FlagKey::Custom("boxKicked".into())]);
    }

    #[test]
    fn scene_object_lists_and_max_score_are_derived() {
        let graph = build_graph(&create_test_def()).expect("graph");
        assert_eq!(graph.scene("field").expect("field").objects, vec!["box".to_string()]);
        assert_eq!(graph.max_score, 5);
        assert!(!graph.scene("forest").expect("forest").natural_light);
    }

    #[test]
    fn malformed_conditions_are_integrity_errors() {
        let mut def = create_test_def();
        def.scenes[0].exits[0].requires = vec!["!".into()];
        assert!(matches!(build_graph(&def), Err(EngineError::Condition { .. })));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_worlddef(&dir.path().join("world.ron")).is_err());
    }
}
