//! Engine configuration loaded from `lantern.toml`.
//!
//! Every field has a default, and a missing or malformed file only produces a
//! warning. Message templates may use `{verb}` and `{object}` placeholders.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::light::BatteryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Turns a light source lasts when the object does not say otherwise.
    pub battery_life: u32,
    /// Warn the player when this many turns of light remain.
    pub low_battery_warning: Option<u32>,
    /// Overrides the world's carry limit when set.
    pub carry_limit: Option<u32>,
    /// Replaces the world's rank table when non-empty.
    pub ranks: Vec<RankConfig>,
    pub messages: Messages,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            battery_life: 100,
            low_battery_warning: None,
            carry_limit: None,
            ranks: Vec::new(),
            messages: Messages::default(),
        }
    }
}

impl EngineConfig {
    pub fn battery_policy(&self) -> BatteryPolicy {
        BatteryPolicy {
            default_life: self.battery_life,
            low_warning: self.low_battery_warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankConfig {
    pub threshold: f32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Generic player-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub cant_go: String,
    pub too_dark_to_move: String,
    pub too_dark_to_see: String,
    pub not_here: String,
    pub cant_do: String,
    pub what: String,
    pub nothing_happens: String,
    pub empty_handed: String,
    pub wait: String,
    pub light_depleted: String,
    pub light_low: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            cant_go: "You can't go that way.".into(),
            too_dark_to_move: "It is too dark to find your way.".into(),
            too_dark_to_see: "It's too dark to see.".into(),
            not_here: "You don't see any {object} here.".into(),
            cant_do: "You can't {verb} the {object}.".into(),
            what: "What do you want to {verb}?".into(),
            nothing_happens: "Nothing happens.".into(),
            empty_handed: "You are empty-handed.".into(),
            wait: "Time passes.".into(),
            light_depleted: "The {object} has run out of power.".into(),
            light_low: "The {object} is getting dim.".into(),
        }
    }
}

/// Fill `{verb}` and `{object}` placeholders in a message template.
pub fn fill(template: &str, verb: &str, object: &str) -> String {
    template.replace("{verb}", verb).replace("{object}", object)
}

/// Load configuration, falling back to defaults if the file can't be used.
pub fn load_config(path: &Path) -> EngineConfig {
    match try_load_config(path) {
        Ok(config) => {
            info!("engine configuration loaded from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!(
                "Could not load engine configuration from '{}': {e:#}. Using defaults.",
                path.display()
            );
            EngineConfig::default()
        },
    }
}

/// # Errors
/// Returns an error if the file cannot be read or parsed.
fn try_load_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading config from '{}'", path.display()))?;
    let mut config: EngineConfig =
        toml::from_str(&text).with_context(|| format!("parsing config from '{}'", path.display()))?;
    config.ranks.sort_by(|a, b| {
        b.threshold
            .partial_cmp(&a.threshold)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(config)
}
