//! Running score, one-time awards, achievements, and ranks.

use log::info;

use crate::flags::FlagKey;
use crate::graph::{Rank, ScoringRules, WorldGraph};
use crate::state::WorldState;

/// Adjust the score by `delta` (never below zero) and return the messages of
/// any achievements crossed for the first time.
pub fn add_score(graph: &WorldGraph, state: &mut WorldState, delta: i32) -> Vec<String> {
    let before = state.score;
    state.score = before.saturating_add_signed(delta);
    info!("score {before} -> {} ({delta:+})", state.score);

    let mut messages = Vec::new();
    for achievement in &graph.scoring.achievements {
        if state.score >= achievement.threshold
            && state.flags.set(FlagKey::Achievement(achievement.id.clone()))
        {
            info!("achievement '{}' unlocked", achievement.id);
            messages.push(achievement.message.clone());
        }
    }
    messages
}

/// Award `delta` once per game under `guard`.
///
/// Returns `None` (and changes nothing) if the guard is already set;
/// otherwise sets the guard, applies the delta, and returns any achievement
/// messages.
pub fn award_once(graph: &WorldGraph, state: &mut WorldState, guard: FlagKey, delta: i32) -> Option<Vec<String>> {
    if state.flags.has(&guard) {
        return None;
    }
    state.flags.set(guard);
    Some(add_score(graph, state, delta))
}

/// Percentage of the maximum score, 0.0 when nothing can be scored.
pub fn percent_of(score: u32, max: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = score as f32 / max as f32 * 100.0;
    pct.min(100.0)
}

/// Highest rank whose threshold the percentage meets.
pub fn rank_for(rules: &ScoringRules, percent: f32) -> Option<&Rank> {
    rules
        .ranks
        .iter()
        .find(|rank| percent >= rank.threshold)
        .or_else(|| rules.ranks.last())
}
