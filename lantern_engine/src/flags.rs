//! Typed world flags and the flag store.
//!
//! Every dynamic fact in a Lantern world is a flag: containers being open or
//! locked, hidden objects being revealed, scenes being visited, lamps being on
//! or dead, one-time score guards, and any custom fact authored in content.
//! Flags are boolean by presence; an absent flag is false.

use std::collections::BTreeSet;
use std::fmt::Display;

use log::info;

/// Identifies a single boolean fact in the world.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlagKey {
    ObjectOpen(String),
    ObjectLocked(String),
    ObjectRevealed(String),
    SceneVisited(String),
    LightOn(String),
    LightDead(String),
    /// Derived global illumination for the player's current scene.
    Light,
    InteractionScored { object: String, verb: String },
    ExitScored(String),
    Achievement(String),
    Custom(String),
}

impl Display for FlagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagKey::ObjectOpen(id) => write!(f, "open:{id}"),
            FlagKey::ObjectLocked(id) => write!(f, "locked:{id}"),
            FlagKey::ObjectRevealed(id) => write!(f, "revealed:{id}"),
            FlagKey::SceneVisited(id) => write!(f, "visited:{id}"),
            FlagKey::LightOn(id) => write!(f, "on:{id}"),
            FlagKey::LightDead(id) => write!(f, "dead:{id}"),
            FlagKey::Light => write!(f, "light"),
            FlagKey::InteractionScored { object, verb } => write!(f, "scored:{object}/{verb}"),
            FlagKey::ExitScored(id) => write!(f, "exit-scored:{id}"),
            FlagKey::Achievement(id) => write!(f, "achievement:{id}"),
            FlagKey::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl FlagKey {
    /// Parse the canonical `kind:id` text form produced by `Display`.
    ///
    /// Anything that is not a recognized canonical form becomes `Custom`.
    pub fn parse_canonical(text: &str) -> FlagKey {
        let text = text.trim();
        if text == "light" {
            return FlagKey::Light;
        }
        let Some((kind, id)) = text.split_once(':') else {
            return FlagKey::Custom(text.to_string());
        };
        if id.is_empty() {
            return FlagKey::Custom(text.to_string());
        }
        let id = id.to_string();
        match kind {
            "open" => FlagKey::ObjectOpen(id),
            "locked" => FlagKey::ObjectLocked(id),
            "revealed" => FlagKey::ObjectRevealed(id),
            "visited" => FlagKey::SceneVisited(id),
            "on" => FlagKey::LightOn(id),
            "dead" => FlagKey::LightDead(id),
            "exit-scored" => FlagKey::ExitScored(id),
            "achievement" => FlagKey::Achievement(id),
            "scored" => match id.split_once('/') {
                Some((object, verb)) if !object.is_empty() && !verb.is_empty() => FlagKey::InteractionScored {
                    object: object.to_string(),
                    verb: verb.to_string(),
                },
                _ => FlagKey::Custom(text.to_string()),
            },
            _ => FlagKey::Custom(text.to_string()),
        }
    }

    /// Resolve an authored flag name, accepting both canonical forms and the
    /// camel-case conventions (`mailboxOpen`, `kitchen_visited`, `hasLight`).
    ///
    /// Conventional names only map to typed keys when the embedded id names a
    /// known object or scene; otherwise they stay custom flags.
    pub fn resolve(name: &str, is_object: impl Fn(&str) -> bool, is_scene: impl Fn(&str) -> bool) -> FlagKey {
        let name = name.trim();
        let canonical = FlagKey::parse_canonical(name);
        if !matches!(canonical, FlagKey::Custom(_)) {
            return canonical;
        }
        if name == "hasLight" {
            return FlagKey::Light;
        }
        if let Some(scene) = name.strip_suffix("_visited")
            && is_scene(scene)
        {
            return FlagKey::SceneVisited(scene.to_string());
        }
        let object_suffixes: [(&str, fn(String) -> FlagKey); 5] = [
            ("Open", FlagKey::ObjectOpen),
            ("Locked", FlagKey::ObjectLocked),
            ("Revealed", FlagKey::ObjectRevealed),
            ("On", FlagKey::LightOn),
            ("Dead", FlagKey::LightDead),
        ];
        for (suffix, make) in object_suffixes {
            if let Some(object) = name.strip_suffix(suffix)
                && is_object(object)
            {
                return make(object.to_string());
            }
        }
        canonical
    }
}

/// Set of flags currently true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagStore {
    flags: BTreeSet<FlagKey>,
}

impl FlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag. Returns true if the flag was not already set.
    pub fn set(&mut self, key: FlagKey) -> bool {
        let fresh = self.flags.insert(key.clone());
        if fresh {
            info!("flag set: {key}");
        }
        fresh
    }

    /// Clear a flag. Returns true if the flag had been set.
    pub fn clear(&mut self, key: &FlagKey) -> bool {
        let removed = self.flags.remove(key);
        if removed {
            info!("flag cleared: {key}");
        }
        removed
    }

    /// Set or clear a flag according to `value`.
    pub fn assign(&mut self, key: FlagKey, value: bool) {
        if value {
            self.set(key);
        } else {
            self.clear(&key);
        }
    }

    pub fn has(&self, key: &FlagKey) -> bool {
        self.flags.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagKey> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<FlagKey> for FlagStore {
    fn from_iter<T: IntoIterator<Item = FlagKey>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(ids: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |id| ids.contains(&id)
    }

    #[test]
    fn canonical_text_round_trips_through_display() {
        let keys = [
            FlagKey::ObjectOpen("mailbox".into()),
            FlagKey::ObjectLocked("grate".into()),
            FlagKey::ObjectRevealed("trapdoor".into()),
            FlagKey::SceneVisited("kitchen".into()),
            FlagKey::LightOn("lamp".into()),
            FlagKey::LightDead("lamp".into()),
            FlagKey::Light,
            FlagKey::InteractionScored {
                object: "leaflet".into(),
                verb: "read".into(),
            },
            FlagKey::ExitScored("cellar".into()),
            FlagKey::Achievement("first_steps".into()),
            FlagKey::Custom("rugMoved".into()),
        ];
        for key in keys {
            assert_eq!(FlagKey::parse_canonical(&key.to_string()), key);
        }
    }

    #[test]
    fn malformed_canonical_forms_are_custom() {
        assert_eq!(FlagKey::parse_canonical("scored:leaflet"), FlagKey::Custom("scored:leaflet".into()));
        assert_eq!(FlagKey::parse_canonical("open:"), FlagKey::Custom("open:".into()));
        assert_eq!(FlagKey::parse_canonical("weird:thing"), FlagKey::Custom("weird:thing".into()));
    }

    #[test]
    fn conventional_names_resolve_for_known_ids() {
        let objects = known(&["mailbox", "window", "lamp"]);
        let scenes = known(&["kitchen"]);
        assert_eq!(
            FlagKey::resolve("mailboxOpen", &objects, &scenes),
            FlagKey::ObjectOpen("mailbox".into())
        );
        assert_eq!(
            FlagKey::resolve("windowOpen", &objects, &scenes),
            FlagKey::ObjectOpen("window".into())
        );
        assert_eq!(FlagKey::resolve("lampOn", &objects, &scenes), FlagKey::LightOn("lamp".into()));
        assert_eq!(FlagKey::resolve("lampDead", &objects, &scenes), FlagKey::LightDead("lamp".into()));
        assert_eq!(
            FlagKey::resolve("kitchen_visited", &objects, &scenes),
            FlagKey::SceneVisited("kitchen".into())
        );
        assert_eq!(FlagKey::resolve("hasLight", &objects, &scenes), FlagKey::Light);
    }

    #[test]
    fn conventional_names_for_unknown_ids_stay_custom() {
        let objects = known(&["mailbox"]);
        let scenes = known(&[]);
        assert_eq!(
            FlagKey::resolve("doorOpen", &objects, &scenes),
            FlagKey::Custom("doorOpen".into())
        );
        assert_eq!(
            FlagKey::resolve("attic_visited", &objects, &scenes),
            FlagKey::Custom("attic_visited".into())
        );
    }

    #[test]
    fn store_set_clear_has() {
        let mut store = FlagStore::new();
        let key = FlagKey::Custom("rugMoved".into());
        assert!(!store.has(&key));
        assert!(store.set(key.clone()));
        assert!(!store.set(key.clone()));
        assert!(store.has(&key));
        assert!(store.clear(&key));
        assert!(!store.clear(&key));
        assert!(store.is_empty());
    }

    #[test]
    fn assign_sets_and_clears() {
        let mut store = FlagStore::new();
        store.assign(FlagKey::Light, true);
        assert!(store.has(&FlagKey::Light));
        store.assign(FlagKey::Light, false);
        assert!(!store.has(&FlagKey::Light));
    }
}
