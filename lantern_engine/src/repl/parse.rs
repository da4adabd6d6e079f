//! Word-pattern tokenizer for player input.
//!
//! Turns a line of text into either a driver command (save, load, quit...)
//! or an engine [`Command`]. Articles are dropped and two-word verbs such as
//! `turn on` or `pick up` are folded into one verb.

use crate::command::Command;

/// Prepositions that split a direct object from its target.
const PREPOSITIONS: &[&str] = &["in", "into", "inside", "on", "onto", "with", "from", "to"];
const ARTICLES: &[&str] = &["a", "an", "the"];

/// What the REPL should do with a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Game(Command),
    Save(String),
    Load(String),
    ListSaves,
    Help,
    Quit,
    Unknown,
}

/// Tokenize a line of player input.
pub fn parse_command(input: &str) -> ReplCommand {
    let lower = input.trim().to_lowercase();
    let words: Vec<&str> = lower
        .split_whitespace()
        .filter(|word| !ARTICLES.contains(word))
        .collect();

    match words.as_slice() {
        [] => ReplCommand::Unknown,
        ["quit" | "exit" | "q"] => ReplCommand::Quit,
        ["help" | "?" | "h"] => ReplCommand::Help,
        ["saves"] => ReplCommand::ListSaves,
        ["save", slot @ ..] => ReplCommand::Save(slot_name(slot)),
        ["load" | "restore", slot @ ..] => ReplCommand::Load(slot_name(slot)),
        ["look" | "l", "at" | "in", rest @ ..] if !rest.is_empty() => object_command("examine", rest),
        ["pick", "up", rest @ ..] => object_command("take", rest),
        ["put" | "set", "down", rest @ ..] => object_command("drop", rest),
        ["turn" | "switch", state @ ("on" | "off"), rest @ ..] => object_command(&format!("turn {state}"), rest),
        ["turn" | "switch", rest @ .., state @ ("on" | "off")] if !rest.is_empty() => {
            object_command(&format!("turn {state}"), rest)
        },
        ["go" | "walk" | "run", rest @ ..] if !rest.is_empty() => ReplCommand::Game(Command::new("go").with_object(rest.join(" "))),
        [verb, rest @ ..] => object_command(verb, rest),
    }
}

fn slot_name(words: &[&str]) -> String {
    if words.is_empty() {
        "quicksave".to_string()
    } else {
        words.join("-")
    }
}

fn object_command(verb: &str, rest: &[&str]) -> ReplCommand {
    let mut command = Command::new(verb);
    if rest.is_empty() {
        return ReplCommand::Game(command);
    }
    match rest.iter().position(|word| PREPOSITIONS.contains(word)) {
        Some(split) if split > 0 && split + 1 < rest.len() => {
            command = command
                .with_object(rest[..split].join(" "))
                .with_target(rest[split], rest[split + 1..].join(" "));
        },
        _ => command = command.with_object(rest.join(" ")),
    }
    ReplCommand::Game(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(input: &str) -> Command {
        match parse_command(input) {
            ReplCommand::Game(command) => command,
            other => panic!("expected a game command, got {other:?}"),
        }
    }

    #[test]
    fn simple_verbs_and_objects() {
        assert_eq!(game("look"), Command::new("look"));
        assert_eq!(game("Open the Mailbox"), Command::new("open").with_object("mailbox"));
        assert_eq!(game("take brass lantern"), Command::new("take").with_object("brass lantern"));
    }

    #[test]
    fn prepositions_split_targets() {
        assert_eq!(
            game("put the leaflet in the mailbox"),
            Command::new("put").with_object("leaflet").with_target("in", "mailbox")
        );
        assert_eq!(game("unlock chest with key").target.as_deref(), Some("key"));
    }

    #[test]
    fn two_word_verbs_fold() {
        assert_eq!(game("turn on lamp"), Command::new("turn on").with_object("lamp"));
        assert_eq!(game("turn lamp off"), Command::new("turn off").with_object("lamp"));
        assert_eq!(game("pick up the leaflet"), Command::new("take").with_object("leaflet"));
        assert_eq!(game("look at rug"), Command::new("examine").with_object("rug"));
        assert_eq!(game("go north"), Command::new("go").with_object("north"));
        assert_eq!(game("n"), Command::new("n"));
    }

    #[test]
    fn driver_commands() {
        assert_eq!(parse_command("quit"), ReplCommand::Quit);
        assert_eq!(parse_command("save"), ReplCommand::Save("quicksave".into()));
        assert_eq!(parse_command("load before cellar"), ReplCommand::Load("before-cellar".into()));
        assert_eq!(parse_command("   "), ReplCommand::Unknown);
    }
}
