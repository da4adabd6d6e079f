use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in a WorldDef.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
    MalformedCondition { clause: String, context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
            ValidationError::MalformedCondition { clause, context } => {
                write!(f, "malformed condition clause '{clause}' ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Flag name prefixes that refer to a specific object or scene.
const OBJECT_FLAG_PREFIXES: &[&str] = &["open:", "locked:", "revealed:", "on:", "dead:"];
const SCENE_FLAG_PREFIXES: &[&str] = &["visited:", "exit-scored:"];

struct IdSets<'a> {
    scenes: &'a HashSet<String>,
    objects: &'a HashSet<String>,
    containers: &'a HashSet<String>,
}

/// Validate cross-references and basic invariants in a WorldDef.
///
/// ```
/// use lantern_data::{DescriptionDef, GameDef, SceneDef, WorldDef, validate_world};
///
/// let world = WorldDef {
///     game: GameDef {
///         title: "Demo".into(),
///         start_scene: "start".into(),
///         ..GameDef::default()
///     },
///     scenes: vec![SceneDef {
///         id: "start".into(),
///         name: "Start".into(),
///         region: String::new(),
///         lit: true,
///         desc: DescriptionDef::plain("A room."),
///         exits: Vec::new(),
///     }],
///     ..WorldDef::default()
/// };
/// assert!(validate_world(&world).is_empty());
/// ```
pub fn validate_world(world: &WorldDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut scenes = HashSet::new();
    let mut objects = HashSet::new();
    track_ids(
        "scene",
        world.scenes.iter().map(|s| s.id.as_str()),
        &mut scenes,
        &mut errors,
    );
    track_ids(
        "object",
        world.objects.iter().map(|o| o.id.as_str()),
        &mut objects,
        &mut errors,
    );
    let containers: HashSet<String> = world
        .objects
        .iter()
        .filter(|o| o.container.is_some())
        .map(|o| o.id.clone())
        .collect();

    let ids = IdSets {
        scenes: &scenes,
        objects: &objects,
        containers: &containers,
    };

    validate_game(&world.game, &ids, &mut errors);

    for scene in &world.scenes {
        let context = format!("scene '{}'", scene.id);
        validate_description(&scene.desc, &ids, &mut errors, &context);
        let mut directions = HashSet::new();
        for exit in &scene.exits {
            let exit_context = format!("scene '{}' exit '{}'", scene.id, exit.direction);
            if exit.direction.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    context: format!("{context} has an exit with no direction"),
                });
            } else if !directions.insert(exit.direction.to_lowercase()) {
                errors.push(ValidationError::DuplicateId {
                    kind: "exit",
                    id: format!("{}:{}", scene.id, exit.direction),
                });
            }
            check_ref("scene", &exit.to, ids.scenes, exit_context.clone(), &mut errors);
            validate_condition(&exit.requires, &ids, &mut errors, &exit_context);
        }
    }

    for object in &world.objects {
        validate_object(object, &ids, &mut errors);
    }
    validate_containment_cycles(&world.objects, &mut errors);

    errors
}

fn validate_game(game: &GameDef, ids: &IdSets<'_>, errors: &mut Vec<ValidationError>) {
    if game.start_scene.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "game start scene missing".to_string(),
        });
    } else {
        check_ref(
            "scene",
            &game.start_scene,
            ids.scenes,
            "game start scene".to_string(),
            errors,
        );
    }

    for flag in &game.initial_flags {
        validate_flag_name(flag, ids, errors, "game initial flags");
    }

    if game.scoring.ranks.is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "scoring ranks empty".to_string(),
        });
    }
    for rank in &game.scoring.ranks {
        if !(0.0..=100.0).contains(&rank.threshold) {
            errors.push(ValidationError::InvalidValue {
                context: format!(
                    "scoring rank '{}' threshold out of range ({})",
                    rank.name, rank.threshold
                ),
            });
        }
    }

    let mut achievements = HashSet::new();
    track_ids(
        "achievement",
        game.scoring.achievements.iter().map(|a| a.id.as_str()),
        &mut achievements,
        errors,
    );
    for achievement in &game.scoring.achievements {
        if achievement.threshold == 0 {
            errors.push(ValidationError::InvalidValue {
                context: format!("achievement '{}' threshold must be positive", achievement.id),
            });
        }
    }
}

fn validate_object(object: &ObjectDef, ids: &IdSets<'_>, errors: &mut Vec<ValidationError>) {
    let context = format!("object '{}'", object.id);
    validate_location(&object.location, ids, errors, &context);
    if let LocationRef::Container(holder) = &object.location
        && holder == &object.id
    {
        errors.push(ValidationError::InvalidValue {
            context: format!("{context} is placed inside itself"),
        });
    }
    validate_description(&object.desc, ids, errors, &context);

    if let Some(container) = &object.container
        && container.open
        && container.locked
    {
        errors.push(ValidationError::InvalidValue {
            context: format!("{context} cannot start both open and locked"),
        });
    }
    if let Some(light) = &object.light_source
        && light.battery_life == Some(0)
    {
        errors.push(ValidationError::InvalidValue {
            context: format!("{context} light source has zero battery life"),
        });
    }

    let mut verbs = HashSet::new();
    for interaction in &object.interactions {
        let verb = interaction.verb.trim().to_lowercase();
        let inter_context = format!("object '{}' interaction '{}'", object.id, interaction.verb);
        if verb.is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("{context} has an interaction with no verb"),
            });
            continue;
        }
        if !verbs.insert(verb.clone()) {
            errors.push(ValidationError::DuplicateId {
                kind: "interaction",
                id: format!("{}:{verb}", object.id),
            });
        }
        validate_interaction(interaction, ids, errors, &inter_context);
    }
}

fn validate_interaction(
    interaction: &InteractionDef,
    ids: &IdSets<'_>,
    errors: &mut Vec<ValidationError>,
    context: &str,
) {
    validate_condition(&interaction.requires, ids, errors, context);
    if let Some(message) = &interaction.message {
        validate_description(message, ids, errors, context);
    }
    for flag in interaction.grants.iter().chain(&interaction.removes) {
        validate_flag_name(flag, ids, errors, context);
    }
    for tool in &interaction.requires_held {
        check_ref("object", tool, ids.objects, format!("{context} tool"), errors);
    }
    for revealed in &interaction.reveals {
        check_ref("object", revealed, ids.objects, format!("{context} reveals"), errors);
    }
    for transfer in &interaction.transfers {
        check_ref(
            "object",
            &transfer.object,
            ids.objects,
            format!("{context} transfer"),
            errors,
        );
        validate_location(&transfer.to, ids, errors, &format!("{context} transfer destination"));
    }
    if let Some(scene) = &interaction.target_scene {
        check_ref("scene", scene, ids.scenes, format!("{context} target scene"), errors);
    }
}

fn validate_description(desc: &DescriptionDef, ids: &IdSets<'_>, errors: &mut Vec<ValidationError>, context: &str) {
    for over in &desc.overrides {
        validate_condition(&over.when, ids, errors, &format!("{context} description override"));
    }
}

fn validate_location(loc: &LocationRef, ids: &IdSets<'_>, errors: &mut Vec<ValidationError>, context: &str) {
    match loc {
        LocationRef::Inventory | LocationRef::Nowhere => {},
        LocationRef::Scene(scene) => {
            check_ref("scene", scene, ids.scenes, context.to_string(), errors);
        },
        LocationRef::Container(holder) => {
            if !ids.objects.contains(holder) {
                check_ref("object", holder, ids.objects, context.to_string(), errors);
            } else if !ids.containers.contains(holder) {
                errors.push(ValidationError::InvalidValue {
                    context: format!("{context} placed in '{holder}', which is not a container"),
                });
            }
        },
    }
}

/// Check clause syntax and any typed flag references inside a condition.
fn validate_condition(cond: &ConditionDef, ids: &IdSets<'_>, errors: &mut Vec<ValidationError>, context: &str) {
    for clause in cond {
        if clause.trim().is_empty() {
            errors.push(ValidationError::MalformedCondition {
                clause: clause.clone(),
                context: context.to_string(),
            });
            continue;
        }
        for term in clause.split('|') {
            let name = term.trim();
            let name = name.strip_prefix('!').map_or(name, str::trim);
            if name.is_empty() {
                errors.push(ValidationError::MalformedCondition {
                    clause: clause.clone(),
                    context: context.to_string(),
                });
                break;
            }
            validate_flag_name(name, ids, errors, context);
        }
    }
}

/// Flags written in the typed `kind:id` form must point at something that exists.
fn validate_flag_name(name: &str, ids: &IdSets<'_>, errors: &mut Vec<ValidationError>, context: &str) {
    let name = name.trim();
    if name.is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: format!("{context} has an empty flag name"),
        });
        return;
    }
    for prefix in OBJECT_FLAG_PREFIXES {
        if let Some(id) = name.strip_prefix(prefix) {
            check_ref("object", id, ids.objects, format!("{context} flag '{name}'"), errors);
            return;
        }
    }
    for prefix in SCENE_FLAG_PREFIXES {
        if let Some(id) = name.strip_prefix(prefix) {
            check_ref("scene", id, ids.scenes, format!("{context} flag '{name}'"), errors);
            return;
        }
    }
    if let Some(rest) = name.strip_prefix("scored:") {
        let object = rest.split_once('/').map_or(rest, |(object, _)| object);
        check_ref("object", object, ids.objects, format!("{context} flag '{name}'"), errors);
    }
}

/// Report objects whose starting container chain loops back on itself.
fn validate_containment_cycles(objects: &[ObjectDef], errors: &mut Vec<ValidationError>) {
    let parents: HashMap<&str, &str> = objects
        .iter()
        .filter_map(|o| match &o.location {
            LocationRef::Container(holder) => Some((o.id.as_str(), holder.as_str())),
            _ => None,
        })
        .collect();

    for start in parents.keys() {
        let mut seen = HashSet::new();
        let mut cursor = *start;
        while let Some(parent) = parents.get(cursor) {
            if !seen.insert(cursor) {
                errors.push(ValidationError::InvalidValue {
                    context: format!("object '{start}' is part of a containment cycle"),
                });
                break;
            }
            cursor = parent;
        }
    }
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if !set.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, set: &HashSet<String>, context: String, errors: &mut Vec<ValidationError>) {
    if !set.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}
