//! Container and inventory operations.
//!
//! Every move of an object between holders goes through this module so the
//! one-holder rule is kept: the object is taken out of its source, admitted to
//! its destination, and put back where it was if the destination refuses it.
//!
//! Player-driven moves (`add_item`, `remove_item`, `transfer_to_inventory`,
//! `transfer_from_inventory`) respect open and locked containers. Authored
//! effects use [`transfer`], which only enforces capacity and containment.

use log::info;
use thiserror::Error;

use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::graph::WorldGraph;
use crate::object::ContainerSpec;
use crate::state::{Location, WorldState};

/// Refusals from container and inventory operations. `Display` is the text
/// shown to the player.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("The {0} isn't a container.")]
    NotAContainer(String),
    #[error("The {0} is locked.")]
    Locked(String),
    #[error("The {0} is closed.")]
    Closed(String),
    #[error("The {0} is already open.")]
    AlreadyOpen(String),
    #[error("The {0} is already closed.")]
    AlreadyClosed(String),
    #[error("The {0} is already locked.")]
    AlreadyLocked(String),
    #[error("The {0} isn't locked.")]
    AlreadyUnlocked(String),
    #[error("You'll have to close the {0} first.")]
    MustCloseFirst(String),
    #[error("The {item} won't fit in the {container}.")]
    OverCapacity { item: String, container: String },
    #[error("You're carrying too much to take the {0}.")]
    InventoryFull(String),
    #[error("The {item} isn't in the {container}.")]
    NotPresent { item: String, container: String },
    #[error("You can't put the {0} inside itself.")]
    IntoItself(String),
    #[error("You can't take the {0}.")]
    NotTakeable(String),
    #[error("You already have the {0}.")]
    AlreadyCarried(String),
    #[error("You aren't carrying the {0}.")]
    NotCarried(String),
    #[error("The {0} is already there.")]
    AlreadyThere(String),
    #[error(transparent)]
    Integrity(#[from] EngineError),
}

fn name_of(graph: &WorldGraph, id: &str) -> Result<String, EngineError> {
    Ok(graph.object(id)?.name.clone())
}

fn container_spec(graph: &WorldGraph, id: &str) -> Result<ContainerSpec, ContainerError> {
    let def = graph.object(id)?;
    def.container
        .ok_or_else(|| ContainerError::NotAContainer(def.name.clone()))
}

fn is_open(state: &WorldState, id: &str) -> bool {
    state.flags().has(&FlagKey::ObjectOpen(id.to_string()))
}

fn is_locked(state: &WorldState, id: &str) -> bool {
    state.flags().has(&FlagKey::ObjectLocked(id.to_string()))
}

/// Error for reaching into a container that is not open, if any.
fn access_error(graph: &WorldGraph, state: &WorldState, id: &str) -> Result<Option<ContainerError>, EngineError> {
    if is_open(state, id) {
        return Ok(None);
    }
    let name = name_of(graph, id)?;
    Ok(Some(if is_locked(state, id) {
        ContainerError::Locked(name)
    } else {
        ContainerError::Closed(name)
    }))
}

/// # Errors
/// Fails if the object is not a container, is locked, or is already open.
pub fn open(graph: &WorldGraph, state: &mut WorldState, container: &str) -> Result<(), ContainerError> {
    container_spec(graph, container)?;
    let name = name_of(graph, container)?;
    if is_locked(state, container) {
        return Err(ContainerError::Locked(name));
    }
    if is_open(state, container) {
        return Err(ContainerError::AlreadyOpen(name));
    }
    state.flags.set(FlagKey::ObjectOpen(container.to_string()));
    info!("opened '{container}'");
    Ok(())
}

/// # Errors
/// Fails if the object is not a container, is locked, or is already closed.
pub fn close(graph: &WorldGraph, state: &mut WorldState, container: &str) -> Result<(), ContainerError> {
    container_spec(graph, container)?;
    let name = name_of(graph, container)?;
    if is_locked(state, container) {
        return Err(ContainerError::Locked(name));
    }
    if !is_open(state, container) {
        return Err(ContainerError::AlreadyClosed(name));
    }
    state.flags.clear(&FlagKey::ObjectOpen(container.to_string()));
    info!("closed '{container}'");
    Ok(())
}

/// # Errors
/// Fails if the object is not a container, is open, or is already locked.
pub fn lock(graph: &WorldGraph, state: &mut WorldState, container: &str) -> Result<(), ContainerError> {
    container_spec(graph, container)?;
    let name = name_of(graph, container)?;
    if is_locked(state, container) {
        return Err(ContainerError::AlreadyLocked(name));
    }
    if is_open(state, container) {
        return Err(ContainerError::MustCloseFirst(name));
    }
    state.flags.set(FlagKey::ObjectLocked(container.to_string()));
    info!("locked '{container}'");
    Ok(())
}

/// # Errors
/// Fails if the object is not a container or is not locked.
pub fn unlock(graph: &WorldGraph, state: &mut WorldState, container: &str) -> Result<(), ContainerError> {
    container_spec(graph, container)?;
    if !is_locked(state, container) {
        return Err(ContainerError::AlreadyUnlocked(name_of(graph, container)?));
    }
    state.flags.clear(&FlagKey::ObjectLocked(container.to_string()));
    info!("unlocked '{container}'");
    Ok(())
}

/// Put `item` into an open container, moving it from wherever it is.
///
/// # Errors
/// Fails for non-containers, closed or locked containers, containment
/// cycles, and when the contents would exceed the capacity.
pub fn add_item(graph: &WorldGraph, state: &mut WorldState, container: &str, item: &str) -> Result<(), ContainerError> {
    move_object(graph, state, item, Location::Container(container.to_string()), true)
}

/// Take `item` out of an open container, leaving it unplaced.
///
/// # Errors
/// Fails if the container is closed or does not hold the item.
pub fn remove_item(graph: &WorldGraph, state: &mut WorldState, container: &str, item: &str) -> Result<(), ContainerError> {
    container_spec(graph, container)?;
    if state.location_of(item) != Location::Container(container.to_string()) {
        return Err(ContainerError::NotPresent {
            item: name_of(graph, item)?,
            container: name_of(graph, container)?,
        });
    }
    if let Some(err) = access_error(graph, state, container)? {
        return Err(err);
    }
    state.unplace(item);
    info!("removed '{item}' from '{container}'");
    Ok(())
}

/// Move `item` into the player's inventory.
///
/// # Errors
/// Fails for fixed objects, objects already carried, objects in closed
/// containers, and when the carry limit would be exceeded.
pub fn transfer_to_inventory(graph: &WorldGraph, state: &mut WorldState, item: &str) -> Result<(), ContainerError> {
    let def = graph.object(item)?;
    if !def.takeable {
        return Err(ContainerError::NotTakeable(def.name.clone()));
    }
    if state.in_inventory(item) {
        return Err(ContainerError::AlreadyCarried(def.name.clone()));
    }
    move_object(graph, state, item, Location::Inventory, true)
}

/// Move a carried `item` to `to` (the current scene or a container).
///
/// # Errors
/// Fails if the item is not carried or the destination refuses it.
pub fn transfer_from_inventory(
    graph: &WorldGraph,
    state: &mut WorldState,
    item: &str,
    to: Location,
) -> Result<(), ContainerError> {
    if !state.in_inventory(item) {
        return Err(ContainerError::NotCarried(name_of(graph, item)?));
    }
    move_object(graph, state, item, to, true)
}

/// General move used by authored effects; ignores open/closed state.
///
/// # Errors
/// Fails on containment cycles, capacity limits, or unknown ids.
pub fn transfer(graph: &WorldGraph, state: &mut WorldState, item: &str, to: Location) -> Result<(), ContainerError> {
    move_object(graph, state, item, to, false)
}

fn move_object(
    graph: &WorldGraph,
    state: &mut WorldState,
    item: &str,
    to: Location,
    player: bool,
) -> Result<(), ContainerError> {
    graph.object(item)?;
    let from = state.location_of(item);
    if from == to {
        return Err(ContainerError::AlreadyThere(name_of(graph, item)?));
    }
    if player
        && let Location::Container(holder) = &from
        && let Some(err) = access_error(graph, state, holder)?
    {
        return Err(err);
    }

    state.unplace(item);
    if let Err(err) = admit(graph, state, item, &to, player) {
        state.place(graph, item, from)?;
        return Err(err);
    }
    info!("moved '{item}' from {from} to {to}");
    Ok(())
}

/// Check that `to` accepts the (currently unplaced) `item`, then place it.
fn admit(graph: &WorldGraph, state: &mut WorldState, item: &str, to: &Location, player: bool) -> Result<(), ContainerError> {
    match to {
        Location::Container(holder) => {
            let spec = container_spec(graph, holder)?;
            if holder == item || state.enclosing_containers(holder).iter().any(|c| c == item) {
                return Err(ContainerError::IntoItself(name_of(graph, item)?));
            }
            if player && let Some(err) = access_error(graph, state, holder)? {
                return Err(err);
            }
            let load = state.load_of(graph, to)?;
            let weight = state.total_weight(graph, item)?;
            if load.saturating_add(weight) > spec.capacity {
                return Err(ContainerError::OverCapacity {
                    item: name_of(graph, item)?,
                    container: name_of(graph, holder)?,
                });
            }
        },
        Location::Inventory => {
            if let Some(limit) = graph.carry_limit {
                let load = state.load_of(graph, to)?;
                let weight = state.total_weight(graph, item)?;
                if load.saturating_add(weight) > limit {
                    return Err(ContainerError::InventoryFull(name_of(graph, item)?));
                }
            }
        },
        Location::Scene(_) | Location::Nowhere => {},
    }
    state.place(graph, item, to.clone())?;
    Ok(())
}
