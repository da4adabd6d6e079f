//! The `Engine` facade.
//!
//! Owns the immutable [`WorldGraph`], the private [`WorldState`], and the
//! [`EngineConfig`]. Everything that changes the state goes through a
//! `&mut Engine` method.

use log::info;

use crate::command::{Command, Response};
use crate::condition::Condition;
use crate::config::EngineConfig;
use crate::dispatch::{dispatch, score_report};
use crate::error::EngineError;
use crate::flags::FlagKey;
use crate::graph::{Rank, WorldGraph};
use crate::light::recompute_light;
use crate::movement::enter_scene;
use crate::scene::{ResolvedScene, resolve_scene};
use crate::score::{percent_of, rank_for};
use crate::snapshot::{self, StateSnapshot};
use crate::state::WorldState;

#[derive(Debug, Clone)]
pub struct Engine {
    graph: WorldGraph,
    state: WorldState,
    config: EngineConfig,
}

impl Engine {
    /// Set up a new game. Configured carry limit and ranks replace the
    /// world's own.
    ///
    /// # Errors
    /// Integrity errors if the graph's start locations are inconsistent.
    pub fn new(mut graph: WorldGraph, config: EngineConfig) -> Result<Self, EngineError> {
        if config.carry_limit.is_some() {
            graph.carry_limit = config.carry_limit;
        }
        if !config.ranks.is_empty() {
            graph.scoring.ranks = config
                .ranks
                .iter()
                .map(|rank| Rank {
                    threshold: rank.threshold,
                    name: rank.name.clone(),
                    description: rank.description.clone(),
                })
                .collect();
        }
        let mut state = WorldState::new(&graph)?;
        recompute_light(&graph, &mut state)?;
        info!("engine ready for '{}' ({} scenes)", graph.title, graph.scenes.len());
        Ok(Self { graph, state, config })
    }

    /// Enter the start scene and return its description. Marks it visited.
    ///
    /// # Errors
    /// `EngineError::UnknownScene` if the current scene is missing.
    pub fn start(&mut self) -> Result<String, EngineError> {
        let scene = self.state.current_scene.clone();
        enter_scene(&self.graph, &mut self.state, &scene)
    }

    /// Run one command.
    ///
    /// # Errors
    /// Integrity errors only; refusals come back as unsuccessful responses
    /// and leave the state untouched.
    pub fn execute(&mut self, command: &Command) -> Result<Response, EngineError> {
        dispatch(&self.graph, &mut self.state, &self.config, command)
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn graph(&self) -> &WorldGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// # Errors
    /// Integrity errors for ids missing from the graph.
    pub fn describe_current_scene(&self) -> Result<ResolvedScene, EngineError> {
        resolve_scene(&self.graph, &self.state, self.state.current_scene())
    }

    /// Set a flag from outside the command loop (scripted events, tests).
    ///
    /// # Errors
    /// Integrity errors while recomputing light.
    pub fn set_flag(&mut self, key: FlagKey) -> Result<(), EngineError> {
        self.state.flags.set(key);
        recompute_light(&self.graph, &mut self.state)?;
        Ok(())
    }

    /// # Errors
    /// Integrity errors while recomputing light.
    pub fn clear_flag(&mut self, key: &FlagKey) -> Result<(), EngineError> {
        self.state.flags.clear(key);
        recompute_light(&self.graph, &mut self.state)?;
        Ok(())
    }

    pub fn has_flag(&self, key: &FlagKey) -> bool {
        self.state.flags.has(key)
    }

    pub fn evaluate(&self, condition: &Condition) -> bool {
        condition.evaluate(self.state.flags())
    }

    pub fn export_state(&self) -> StateSnapshot {
        snapshot::export(&self.graph, &self.state)
    }

    /// Replace the state with a snapshot. The current state is kept if the
    /// snapshot is rejected.
    ///
    /// # Errors
    /// `EngineError::Snapshot` for inconsistent or foreign snapshots.
    pub fn import_state(&mut self, snapshot: &StateSnapshot) -> Result<(), EngineError> {
        self.state = snapshot::import(&self.graph, snapshot)?;
        Ok(())
    }

    pub fn percent(&self) -> f32 {
        percent_of(self.state.score(), self.graph.max_score)
    }

    pub fn rank(&self) -> Option<&Rank> {
        rank_for(&self.graph.scoring, self.percent())
    }

    pub fn score_report(&self) -> String {
        score_report(&self.graph, &self.state)
    }
}
