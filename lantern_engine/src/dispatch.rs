//! Command dispatch.
//!
//! Turns a [`Command`] into a [`Response`]. Object commands run in two
//! stages: everything that can refuse the command is checked first against
//! an untouched state, then the effects are applied in a fixed order against
//! a checkpoint that is restored if anything fails part-way.
//!
//! Effect order: built-in state change and granted flags, removed flags, the
//! one-time score, reveals, transfers (built-in first, then authored), and
//! finally a scene change.

use std::fmt::Write as _;

use log::{info, warn};

use crate::command::{Command, Response};
use crate::config::{EngineConfig, fill};
use crate::container::{self, ContainerError};
use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::graph::WorldGraph;
use crate::interaction::{InteractionSpec, Verb};
use crate::light::{self, LightError, LightEvent, LightState, light_state, recompute_light};
use crate::movement::{DIRECTIONS, Traversal, can_traverse, enter_scene, get_exit, normalize_direction, traverse};
use crate::object::ObjectDefinition;
use crate::scene::resolve_scene;
use crate::score::{award_once, percent_of, rank_for};
use crate::state::{Location, WorldState};
use crate::visibility::{closed_container_around, find_present, is_visible_with_light};

/// Why an effect could not be applied.
enum Refusal {
    Player(String),
    Integrity(EngineError),
}

impl From<EngineError> for Refusal {
    fn from(err: EngineError) -> Self {
        Refusal::Integrity(err)
    }
}

impl From<ContainerError> for Refusal {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::Integrity(inner) => Refusal::Integrity(inner),
            other => Refusal::Player(other.to_string()),
        }
    }
}

impl From<LightError> for Refusal {
    fn from(err: LightError) -> Self {
        match err {
            LightError::Integrity(inner) => Refusal::Integrity(inner),
            other => Refusal::Player(other.to_string()),
        }
    }
}

/// A validated object command, ready to apply.
struct Action<'a> {
    verb: Verb,
    object: &'a ObjectDefinition,
    target: Option<&'a ObjectDefinition>,
    entry: Option<&'a InteractionSpec>,
    builtin: bool,
}

/// Execute one command against the world.
///
/// # Errors
/// Returns an `EngineError` only for integrity problems; every player-facing
/// refusal is an unsuccessful `Response`.
pub(crate) fn dispatch(
    graph: &WorldGraph,
    state: &mut WorldState,
    config: &EngineConfig,
    command: &Command,
) -> Result<Response, EngineError> {
    let verb = command.verb.trim().to_lowercase();
    let object = command.object.as_deref().map(str::trim).filter(|o| !o.is_empty());

    let response = match (verb.as_str(), object) {
        ("look" | "l", None) => Response::free(resolve_scene(graph, state, state.current_scene())?.describe()),
        ("inventory" | "i", None) => Response::free(inventory_listing(graph, state, config)?),
        ("score", None) => Response::free(score_report(graph, state)),
        ("wait" | "z", None) => Response::success(config.messages.wait.clone()),
        ("go" | "walk" | "run", Some(direction)) => go(graph, state, config, direction)?,
        ("go" | "walk" | "run", None) => Response::failure(fill(&config.messages.what, "go", "")),
        (word, None) if DIRECTIONS.contains(&normalize_direction(word).as_str()) => go(graph, state, config, word)?,
        _ => interact(graph, state, config, command)?,
    };
    end_turn(graph, state, config, response)
}

/// Advance time after a turn-consuming command.
fn end_turn(
    graph: &WorldGraph,
    state: &mut WorldState,
    config: &EngineConfig,
    mut response: Response,
) -> Result<Response, EngineError> {
    if !response.increment_turn {
        return Ok(response);
    }
    state.turns += 1;
    for event in light::tick(graph, state, config.battery_policy())? {
        let (template, object) = match &event {
            LightEvent::Depleted { object } => (&config.messages.light_depleted, object),
            LightEvent::LowBattery { object, .. } => (&config.messages.light_low, object),
        };
        let name = &graph.object(object)?.name;
        let _ = write!(response.message, "\n{}", fill(template, "", name));
    }
    Ok(response)
}

fn go(graph: &WorldGraph, state: &mut WorldState, config: &EngineConfig, token: &str) -> Result<Response, EngineError> {
    let Some(exit) = get_exit(graph, state.current_scene(), token)? else {
        return Ok(Response::failure(config.messages.cant_go.clone()));
    };
    if let Traversal::Blocked(message) = can_traverse(graph, state, exit, &config.messages)? {
        return Ok(Response::failure(message));
    }

    let checkpoint = state.clone();
    let arrival = match traverse(graph, state, exit) {
        Ok(arrival) => arrival,
        Err(err) => {
            *state = checkpoint;
            return Err(err);
        },
    };
    let mut message = arrival.description;
    for line in arrival.achievements {
        let _ = write!(message, "\n{line}");
    }
    Ok(Response::success(message))
}

fn interact(
    graph: &WorldGraph,
    state: &mut WorldState,
    config: &EngineConfig,
    command: &Command,
) -> Result<Response, EngineError> {
    let messages = &config.messages;
    let verb = Verb::parse(&command.verb);
    let verb_words = verb.to_string();

    let Some(noun) = command.object.as_deref().map(str::trim).filter(|o| !o.is_empty()) else {
        return Ok(Response::failure(fill(&messages.what, &verb_words, "")));
    };
    let object = match locate(graph, state, config, noun)? {
        Ok(id) => graph.object(&id)?,
        Err(refusal) => return Ok(refusal),
    };

    let target = match command.target.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(target_noun) => match locate(graph, state, config, target_noun)? {
            Ok(id) => Some(graph.object(&id)?),
            Err(refusal) => return Ok(refusal),
        },
        None => None,
    };

    let entry = object.interaction(&verb);
    let builtin = builtin_applies(&verb, object);
    if !builtin && entry.is_none() {
        return Ok(Response::failure(unsupported_message(config, &verb, object)));
    }
    if verb == Verb::Put && builtin && target.is_none() {
        return Ok(Response::failure(format!("What do you want to put the {} in?", object.name)));
    }

    let action = Action {
        verb,
        object,
        target,
        entry,
        builtin,
    };

    // Authored requirements speak before the built-in checks.
    if let Some(entry) = action.entry {
        for tool in &entry.requires_held {
            if !state.in_inventory(tool) {
                let name = &graph.object(tool)?.name;
                let message = entry
                    .failure_message
                    .clone()
                    .unwrap_or_else(|| format!("You need the {name} to do that."));
                return Ok(Response::failure(message));
            }
        }
        if !entry.precondition.evaluate(state.flags()) {
            let message = entry
                .failure_message
                .clone()
                .unwrap_or_else(|| fill(&messages.cant_do, &verb_words, &object.name));
            return Ok(Response::failure(message));
        }
    }

    // Validate against a scratch copy so nothing leaks on refusal.
    if action.builtin {
        let mut trial = state.clone();
        match apply_builtin_state(graph, &mut trial, &action).and_then(|()| apply_builtin_transfer(graph, &mut trial, &action)) {
            Ok(()) => {},
            Err(Refusal::Player(message)) => return Ok(Response::failure(message)),
            Err(Refusal::Integrity(err)) => return Err(err),
        }
    }

    let checkpoint = state.clone();
    match apply(graph, state, &action) {
        Ok(extra) => {
            info!("'{}' applied to '{}'", action.verb.as_key(), action.object.id);
            let mut message = success_message(graph, state, config, &action)?;
            for line in extra {
                let _ = write!(message, "\n{line}");
            }
            Ok(Response::success(message))
        },
        Err(Refusal::Player(message)) => {
            *state = checkpoint;
            info!("'{}' on '{}' rolled back: {message}", action.verb.as_key(), action.object.id);
            Ok(Response::failure(message))
        },
        Err(Refusal::Integrity(err)) => {
            *state = checkpoint;
            warn!("'{}' on '{}' rolled back: {err}", action.verb.as_key(), action.object.id);
            Err(err)
        },
    }
}

/// Find a present object by name and check it can be interacted with.
/// The inner `Err` is the refusal to hand back to the player.
fn locate(
    graph: &WorldGraph,
    state: &WorldState,
    config: &EngineConfig,
    noun: &str,
) -> Result<Result<String, Response>, EngineError> {
    let messages = &config.messages;
    let Some(id) = find_present(graph, state, noun)? else {
        return Ok(Err(Response::failure(fill(&messages.not_here, "", noun))));
    };
    let def = graph.object(&id)?;
    let lit = light::has_light(graph, state)?;
    if def.requires_light && !lit {
        return Ok(Err(Response::failure(messages.too_dark_to_see.clone())));
    }
    if let Some((holder, locked)) = closed_container_around(state, &id) {
        let name = graph.object(&holder)?.name.clone();
        let err = if locked {
            ContainerError::Locked(name)
        } else {
            ContainerError::Closed(name)
        };
        return Ok(Err(Response::failure(err.to_string())));
    }
    if !is_visible_with_light(graph, state, &id, lit)? {
        return Ok(Err(Response::failure(fill(&messages.not_here, "", noun))));
    }
    Ok(Ok(id))
}

fn builtin_applies(verb: &Verb, object: &ObjectDefinition) -> bool {
    match verb {
        Verb::Take => object.takeable,
        Verb::Drop | Verb::Put | Verb::Examine => true,
        Verb::Open | Verb::Close | Verb::Lock | Verb::Unlock => object.is_container(),
        Verb::TurnOn | Verb::TurnOff => object.is_light_source(),
        Verb::Other(_) => false,
    }
}

fn unsupported_message(config: &EngineConfig, verb: &Verb, object: &ObjectDefinition) -> String {
    match verb {
        Verb::Take => ContainerError::NotTakeable(object.name.clone()).to_string(),
        Verb::TurnOn | Verb::TurnOff => LightError::NotALightSource(object.name.clone()).to_string(),
        _ => fill(&config.messages.cant_do, &verb.to_string(), &object.name),
    }
}

fn apply_builtin_state(graph: &WorldGraph, state: &mut WorldState, action: &Action<'_>) -> Result<(), Refusal> {
    let id = action.object.id.as_str();
    match action.verb {
        Verb::Open => container::open(graph, state, id)?,
        Verb::Close => container::close(graph, state, id)?,
        Verb::Lock => container::lock(graph, state, id)?,
        Verb::Unlock => container::unlock(graph, state, id)?,
        Verb::TurnOn => light::switch_on(graph, state, id)?,
        Verb::TurnOff => light::switch_off(graph, state, id)?,
        _ => {},
    }
    Ok(())
}

fn apply_builtin_transfer(graph: &WorldGraph, state: &mut WorldState, action: &Action<'_>) -> Result<(), Refusal> {
    let id = action.object.id.as_str();
    match action.verb {
        Verb::Take => container::transfer_to_inventory(graph, state, id)?,
        Verb::Drop => {
            let here = Location::Scene(state.current_scene().to_string());
            container::transfer_from_inventory(graph, state, id, here)?;
        },
        Verb::Put => {
            let Some(target) = action.target else {
                return Ok(());
            };
            if !target.is_container() {
                return Err(ContainerError::NotAContainer(target.name.clone()).into());
            }
            container::transfer_from_inventory(graph, state, id, Location::Container(target.id.clone()))?;
        },
        _ => {},
    }
    Ok(())
}

/// Apply every effect of a validated action. Returns extra lines for the
/// response (scene description after a scene change, achievements).
fn apply(graph: &WorldGraph, state: &mut WorldState, action: &Action<'_>) -> Result<Vec<String>, Refusal> {
    let mut extra = Vec::new();
    let mut achievements = Vec::new();

    if action.builtin {
        apply_builtin_state(graph, state, action)?;
    }
    if let Some(entry) = action.entry {
        for flag in &entry.grants {
            state.flags.set(flag.clone());
        }
        for flag in &entry.removes {
            state.flags.clear(flag);
        }
        if entry.score != 0
            && let Some(lines) = award_once(graph, state, action.verb.score_guard(&action.object.id), entry.score)
        {
            achievements.extend(lines);
        }
        for revealed in &entry.reveals {
            graph.object(revealed)?;
            state.flags.set(FlagKey::ObjectRevealed(revealed.clone()));
        }
    }
    if action.builtin {
        apply_builtin_transfer(graph, state, action)?;
    }
    if let Some(entry) = action.entry {
        for transfer in &entry.transfers {
            match container::transfer(graph, state, &transfer.object, transfer.to.clone()) {
                Ok(()) | Err(ContainerError::AlreadyThere(_)) => {},
                Err(err) => return Err(err.into()),
            }
        }
    }
    recompute_light(graph, state)?;
    if let Some(scene) = action.entry.and_then(|entry| entry.target_scene.as_deref()) {
        extra.push(enter_scene(graph, state, scene)?);
    }
    extra.extend(achievements);
    Ok(extra)
}

fn success_message(
    graph: &WorldGraph,
    state: &WorldState,
    config: &EngineConfig,
    action: &Action<'_>,
) -> Result<String, EngineError> {
    if let Some(table) = action.entry.and_then(|entry| entry.message.as_ref()) {
        let lit = light::has_light(graph, state)?;
        return Ok(table.select(state.flags(), lit, false).to_string());
    }
    let object = action.object;
    let message = match &action.verb {
        Verb::Take if action.builtin => "Taken.".to_string(),
        Verb::Drop => "Dropped.".to_string(),
        Verb::Put => match action.target {
            Some(target) => format!("You put the {} in the {}.", object.name, target.name),
            None => "Done.".to_string(),
        },
        Verb::Open if action.builtin => {
            let contents = visible_contents(graph, state, &object.id)?;
            if contents.is_empty() {
                "Opened.".to_string()
            } else {
                format!("Opening the {} reveals {}.", object.name, contents.join(", "))
            }
        },
        Verb::Close if action.builtin => "Closed.".to_string(),
        Verb::Lock if action.builtin => "Locked.".to_string(),
        Verb::Unlock if action.builtin => "Unlocked.".to_string(),
        Verb::TurnOn if action.builtin => format!("The {} is now on.", object.name),
        Verb::TurnOff if action.builtin => format!("The {} is now off.", object.name),
        Verb::Examine => examine_text(graph, state, object)?,
        _ => config.messages.nothing_happens.clone(),
    };
    Ok(message)
}

fn visible_contents(graph: &WorldGraph, state: &WorldState, container: &str) -> Result<Vec<String>, EngineError> {
    let lit = light::has_light(graph, state)?;
    let mut names = Vec::new();
    for id in state.contents_of(container) {
        if is_visible_with_light(graph, state, id, lit)? {
            names.push(graph.object(id)?.name.clone());
        }
    }
    Ok(names)
}

fn examine_text(graph: &WorldGraph, state: &WorldState, object: &ObjectDefinition) -> Result<String, EngineError> {
    let lit = light::has_light(graph, state)?;
    let mut text = object.description.select(state.flags(), lit, false).to_string();
    if object.is_container() {
        if state.flags().has(&FlagKey::ObjectOpen(object.id.clone())) {
            let contents = visible_contents(graph, state, &object.id)?;
            if contents.is_empty() {
                let _ = write!(text, " The {} is empty.", object.name);
            } else {
                let _ = write!(text, " The {} contains: {}.", object.name, contents.join(", "));
            }
        } else {
            let _ = write!(text, " The {} is closed.", object.name);
        }
    }
    if object.is_light_source() {
        let status = match light_state(state.flags(), &object.id) {
            LightState::On => "on",
            LightState::Off => "off",
            LightState::Dead => "dead",
        };
        let _ = write!(text, " It is {status}.");
    }
    Ok(text)
}

fn inventory_listing(graph: &WorldGraph, state: &WorldState, config: &EngineConfig) -> Result<String, EngineError> {
    let tree = state.inventory_tree();
    if tree.is_empty() {
        return Ok(config.messages.empty_handed.clone());
    }
    let lit = light::has_light(graph, state)?;
    let mut text = String::from("You are carrying:");
    for (id, holder) in tree {
        if holder.is_some() && !is_visible_with_light(graph, state, &id, lit)? {
            continue;
        }
        let def = graph.object(&id)?;
        let indent = if holder.is_some() { "    " } else { "  " };
        let status = if def.is_light_source() && light_state(state.flags(), &id) == LightState::On {
            " (providing light)"
        } else {
            ""
        };
        let _ = write!(text, "\n{indent}{}{status}", def.name);
    }
    Ok(text)
}

/// Score line with the current rank.
pub(crate) fn score_report(graph: &WorldGraph, state: &WorldState) -> String {
    let percent = percent_of(state.score(), graph.max_score);
    let mut text = format!(
        "Your score is {} (out of {}), in {} turns.",
        state.score(),
        graph.max_score,
        state.turns()
    );
    if let Some(rank) = rank_for(&graph.scoring, percent) {
        let _ = write!(text, " This gives you the rank of {}.", rank.name);
    }
    text
}
