//! Static object definitions.
//!
//! An `ObjectDefinition` never changes during play. Whether a container is
//! open, a lamp is lit, or a hidden object has been found all live in the
//! flag store; where the object currently is lives in the world state.

use std::collections::HashMap;

use crate::description::DescriptionTable;
use crate::interaction::{InteractionSpec, Verb};
use crate::state::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Total weight of contents the container accepts.
    pub capacity: u32,
    pub starts_open: bool,
    pub starts_locked: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightSourceSpec {
    /// Per-object battery life; the engine default applies when `None`.
    pub battery_life: Option<u32>,
    pub starts_on: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDefinition {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub description: DescriptionTable,
    pub start: Location,
    pub visible_on_entry: bool,
    pub requires_light: bool,
    pub takeable: bool,
    pub weight: u32,
    pub container: Option<ContainerSpec>,
    pub light_source: Option<LightSourceSpec>,
    pub interactions: HashMap<Verb, InteractionSpec>,
}

impl ObjectDefinition {
    /// Minimal visible, portable object with a plain description.
    pub fn new(id: impl Into<String>, name: impl Into<String>, start: Location) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            description: DescriptionTable::plain(format!("It's a {name}.")),
            name,
            aliases: Vec::new(),
            start,
            visible_on_entry: true,
            requires_light: true,
            takeable: false,
            weight: 1,
            container: None,
            light_source: None,
            interactions: HashMap::new(),
        }
    }

    /// True if `query` names this object by id, display name, alias, or the
    /// last word of its display name (`"mailbox"` for "small mailbox").
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        let name = self.name.to_lowercase();
        self.id.to_lowercase() == query
            || name == query
            || name.split_whitespace().last() == Some(query.as_str())
            || self.aliases.iter().any(|alias| alias.to_lowercase() == query)
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn is_light_source(&self) -> bool {
        self.light_source.is_some()
    }

    pub fn interaction(&self, verb: &Verb) -> Option<&InteractionSpec> {
        self.interactions.get(verb)
    }
}
