//! Light sources and global illumination.
//!
//! A light source is `Off`, `On`, or `Dead`, read from the `on:` and `dead:`
//! flags. The player has light when the scene is naturally lit or when they
//! carry a source that is on. Usage accumulates only while a source is on;
//! once it reaches the battery life the source dies for good.

use log::info;
use thiserror::Error;

use crate::error::EngineError;
use crate::flags::{FlagKey, FlagStore};
use crate::graph::WorldGraph;
use crate::state::WorldState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    Off,
    On,
    Dead,
}

/// Refusals from switching a light source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LightError {
    #[error("The {0} isn't something you can switch.")]
    NotALightSource(String),
    #[error("The {0} has no power left.")]
    Dead(String),
    #[error("The {0} is already on.")]
    AlreadyOn(String),
    #[error("The {0} is already off.")]
    AlreadyOff(String),
    #[error(transparent)]
    Integrity(#[from] EngineError),
}

/// Something that happened to a light source while time passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightEvent {
    LowBattery { object: String, remaining: u32 },
    Depleted { object: String },
}

/// Battery settings used by [`tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryPolicy {
    pub default_life: u32,
    /// Warn when this many turns remain.
    pub low_warning: Option<u32>,
}

impl Default for BatteryPolicy {
    fn default() -> Self {
        Self {
            default_life: 100,
            low_warning: None,
        }
    }
}

pub fn light_state(flags: &FlagStore, object: &str) -> LightState {
    if flags.has(&FlagKey::LightDead(object.to_string())) {
        LightState::Dead
    } else if flags.has(&FlagKey::LightOn(object.to_string())) {
        LightState::On
    } else {
        LightState::Off
    }
}

/// True if the player can see in the current scene.
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn has_light(graph: &WorldGraph, state: &WorldState) -> Result<bool, EngineError> {
    if graph.scene(state.current_scene())?.natural_light {
        return Ok(true);
    }
    for (id, _) in state.inventory_tree() {
        if graph.object(&id)?.is_light_source() && light_state(state.flags(), &id) == LightState::On {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Recompute global light and store it as the `light` flag.
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn recompute_light(graph: &WorldGraph, state: &mut WorldState) -> Result<bool, EngineError> {
    let lit = has_light(graph, state)?;
    state.flags.assign(FlagKey::Light, lit);
    Ok(lit)
}

/// # Errors
/// Returns a [`LightError`] if the object is not a light source, is dead, or
/// is already on.
pub fn switch_on(graph: &WorldGraph, state: &mut WorldState, object: &str) -> Result<(), LightError> {
    let def = graph.object(object)?;
    if !def.is_light_source() {
        return Err(LightError::NotALightSource(def.name.clone()));
    }
    match light_state(state.flags(), object) {
        LightState::Dead => Err(LightError::Dead(def.name.clone())),
        LightState::On => Err(LightError::AlreadyOn(def.name.clone())),
        LightState::Off => {
            state.flags.set(FlagKey::LightOn(object.to_string()));
            recompute_light(graph, state)?;
            info!("light source '{object}' switched on");
            Ok(())
        },
    }
}

/// # Errors
/// Returns a [`LightError`] if the object is not a light source or is not on.
pub fn switch_off(graph: &WorldGraph, state: &mut WorldState, object: &str) -> Result<(), LightError> {
    let def = graph.object(object)?;
    if !def.is_light_source() {
        return Err(LightError::NotALightSource(def.name.clone()));
    }
    match light_state(state.flags(), object) {
        LightState::On => {
            state.flags.clear(&FlagKey::LightOn(object.to_string()));
            recompute_light(graph, state)?;
            info!("light source '{object}' switched off");
            Ok(())
        },
        LightState::Off | LightState::Dead => Err(LightError::AlreadyOff(def.name.clone())),
    }
}

/// Advance every lit source by one turn of usage.
///
/// # Errors
/// Integrity errors for ids missing from the graph.
pub fn tick(graph: &WorldGraph, state: &mut WorldState, policy: BatteryPolicy) -> Result<Vec<LightEvent>, EngineError> {
    let mut events = Vec::new();
    for (id, def) in &graph.objects {
        let Some(source) = def.light_source else {
            continue;
        };
        if light_state(state.flags(), id) != LightState::On {
            continue;
        }
        let life = source.battery_life.unwrap_or(policy.default_life);
        let used = state.light_usage.entry(id.clone()).or_insert(0);
        *used = used.saturating_add(1);
        let used = *used;

        if used >= life {
            state.flags.clear(&FlagKey::LightOn(id.clone()));
            state.flags.set(FlagKey::LightDead(id.clone()));
            info!("light source '{id}' depleted after {used} turns");
            events.push(LightEvent::Depleted { object: id.clone() });
        } else if let Some(warning) = policy.low_warning
            && life - used == warning
        {
            events.push(LightEvent::LowBattery {
                object: id.clone(),
                remaining: warning,
            });
        }
    }
    recompute_light(graph, state)?;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Location;
    use crate::testing::{create_test_graph, create_test_state};

    fn carrying_lamp_in_cellar() -> (WorldGraph, WorldState) {
        let graph = create_test_graph();
        let mut state = create_test_state(&graph);
        state.unplace("lamp");
        state.place(&graph, "lamp", Location::Inventory).expect("place");
        state.current_scene = "cellar".into();
        (graph, state)
    }

    #[test]
    fn naturally_lit_scene_has_light() {
        let graph = create_test_graph();
        let state = create_test_state(&graph);
        assert!(has_light(&graph, &state).expect("light"));
    }

    #[test]
    fn carried_lamp_lights_dark_scene() {
        let (graph, mut state) = carrying_lamp_in_cellar();
        assert!(!has_light(&graph, &state).expect("light"));
        switch_on(&graph, &mut state, "lamp").expect("switch on");
        assert!(state.flags().has(&FlagKey::Light));
        switch_off(&graph, &mut state, "lamp").expect("switch off");
        assert!(!state.flags().has(&FlagKey::Light));
    }

    #[test]
    fn lamp_left_behind_does_not_help() {
        let graph = create_test_graph();
        let mut state = create_test_state(&graph);
        switch_on(&graph, &mut state, "lamp").expect("switch on");
        state.current_scene = "cellar".into();
        assert!(!recompute_light(&graph, &mut state).expect("light"));
    }

    #[test]
    fn switching_rejects_invalid_transitions() {
        let (graph, mut state) = carrying_lamp_in_cellar();
        assert_eq!(
            switch_off(&graph, &mut state, "lamp"),
            Err(LightError::AlreadyOff("brass lantern".into()))
        );
        switch_on(&graph, &mut state, "lamp").expect("switch on");
        assert_eq!(
            switch_on(&graph, &mut state, "lamp"),
            Err(LightError::AlreadyOn("brass lantern".into()))
        );
        assert!(matches!(
            switch_on(&graph, &mut state, "mailbox"),
            Err(LightError::NotALightSource(_))
        ));
    }

    #[test]
    fn depletes_exactly_at_battery_life() {
        let (graph, mut state) = carrying_lamp_in_cellar();
        let life = graph.object("lamp").expect("lamp").light_source.expect("source").battery_life.expect("life");
        switch_on(&graph, &mut state, "lamp").expect("switch on");

        for _ in 1..life {
            let events = tick(&graph, &mut state, BatteryPolicy::default()).expect("tick");
            assert!(events.is_empty());
            assert_eq!(light_state(state.flags(), "lamp"), LightState::On);
        }
        let events = tick(&graph, &mut state, BatteryPolicy::default()).expect("tick");
        assert_eq!(events, vec![LightEvent::Depleted { object: "lamp".into() }]);
        assert_eq!(light_state(state.flags(), "lamp"), LightState::Dead);
        assert!(!state.flags().has(&FlagKey::Light));
        assert_eq!(
            switch_on(&graph, &mut state, "lamp"),
            Err(LightError::Dead("brass lantern".into()))
        );
    }

    #[test]
    fn usage_pauses_while_off() {
        let (graph, mut state) = carrying_lamp_in_cellar();
        switch_on(&graph, &mut state, "lamp").expect("switch on");
        tick(&graph, &mut state, BatteryPolicy::default()).expect("tick");
        switch_off(&graph, &mut state, "lamp").expect("switch off");
        tick(&graph, &mut state, BatteryPolicy::default()).expect("tick");
        tick(&graph, &mut state, BatteryPolicy::default()).expect("tick");
        assert_eq!(state.light_usage("lamp"), 1);
    }

    #[test]
    fn low_battery_warning_fires_once() {
        let (graph, mut state) = carrying_lamp_in_cellar();
        let policy = BatteryPolicy {
            default_life: 100,
            low_warning: Some(1),
        };
        switch_on(&graph, &mut state, "lamp").expect("switch on");
        let mut warnings = 0;
        for _ in 0..3 {
            warnings += tick(&graph, &mut state, policy)
                .expect("tick")
                .iter()
                .filter(|event| matches!(event, LightEvent::LowBattery { .. }))
                .count();
        }
        assert_eq!(warnings, 1);
    }
}
