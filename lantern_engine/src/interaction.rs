//! Verbs and per-object interaction entries.

use std::fmt::Display;

use crate::condition::Condition;
use crate::description::DescriptionTable;
use crate::flags::FlagKey;
use crate::state::Location;

/// Verb of a player command after synonym folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Take,
    Drop,
    Put,
    Open,
    Close,
    Lock,
    Unlock,
    TurnOn,
    TurnOff,
    Examine,
    /// Any authored verb without built-in behavior (`read`, `move`, `ring`...).
    Other(String),
}

impl Verb {
    /// Fold a verb word (or two-word phrase) into a `Verb`.
    pub fn parse(word: &str) -> Verb {
        let lower = word.trim().to_lowercase();
        let normalized = lower.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "take" | "get" | "grab" | "pick up" => Verb::Take,
            "drop" | "discard" => Verb::Drop,
            "put" | "place" | "insert" => Verb::Put,
            "open" => Verb::Open,
            "close" | "shut" => Verb::Close,
            "lock" => Verb::Lock,
            "unlock" => Verb::Unlock,
            "turn on" | "turn_on" | "switch on" | "light" | "activate" => Verb::TurnOn,
            "turn off" | "turn_off" | "switch off" | "extinguish" | "deactivate" => Verb::TurnOff,
            "examine" | "x" | "inspect" | "look at" | "look" => Verb::Examine,
            _ => Verb::Other(normalized),
        }
    }

    /// Stable identifier used in flag names such as `scored:lamp/turn_on`.
    pub fn as_key(&self) -> &str {
        match self {
            Verb::Take => "take",
            Verb::Drop => "drop",
            Verb::Put => "put",
            Verb::Open => "open",
            Verb::Close => "close",
            Verb::Lock => "lock",
            Verb::Unlock => "unlock",
            Verb::TurnOn => "turn_on",
            Verb::TurnOff => "turn_off",
            Verb::Examine => "examine",
            Verb::Other(word) => word,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Verb::Other(_))
    }

    /// Guard flag for the one-time score of this verb on `object`.
    pub fn score_guard(&self, object: &str) -> FlagKey {
        FlagKey::InteractionScored {
            object: object.to_string(),
            verb: self.as_key().to_string(),
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verb::TurnOn => write!(f, "turn on"),
            Verb::TurnOff => write!(f, "turn off"),
            other => write!(f, "{}", other.as_key()),
        }
    }
}

/// Move `object` to `to` as part of an interaction's effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub object: String,
    pub to: Location,
}

/// A verb-triggered, precondition-gated bundle of effects on one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionSpec {
    pub message: Option<DescriptionTable>,
    pub failure_message: Option<String>,
    pub precondition: Condition,
    pub requires_held: Vec<String>,
    pub grants: Vec<FlagKey>,
    pub removes: Vec<FlagKey>,
    pub score: i32,
    pub reveals: Vec<String>,
    pub transfers: Vec<Transfer>,
    pub target_scene: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_fold_to_builtins() {
        assert_eq!(Verb::parse("Get"), Verb::Take);
        assert_eq!(Verb::parse("pick   up"), Verb::Take);
        assert_eq!(Verb::parse("shut"), Verb::Close);
        assert_eq!(Verb::parse("switch on"), Verb::TurnOn);
        assert_eq!(Verb::parse("turn_off"), Verb::TurnOff);
        assert_eq!(Verb::parse("x"), Verb::Examine);
    }

    #[test]
    fn unknown_words_become_other() {
        assert_eq!(Verb::parse("Read"), Verb::Other("read".into()));
        assert!(!Verb::parse("ring").is_builtin());
        assert!(Verb::parse("open").is_builtin());
    }

    #[test]
    fn display_uses_player_words() {
        assert_eq!(Verb::TurnOn.to_string(), "turn on");
        assert_eq!(Verb::TurnOn.as_key(), "turn_on");
        assert_eq!(Verb::Other("move".into()).to_string(), "move");
    }

    #[test]
    fn score_guard_names_object_and_verb() {
        assert_eq!(
            Verb::Open.score_guard("mailbox").to_string(),
            "scored:mailbox/open"
        );
    }
}
