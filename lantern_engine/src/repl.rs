//! REPL and command handling utilities.
//!
//! The reference driver reads a line, tokenizes it into a [`ReplCommand`],
//! hands game commands to the [`Engine`], and prints the response. Saving and
//! loading go through [`crate::save_files`].

mod input;
pub mod parse;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use log::{error, info, warn};
use textwrap::{fill, termwidth};

use crate::engine::Engine;
use crate::save_files::{SaveFileStatus, build_save_entries, find_slot, format_modified, load_save_file, write_save};
use crate::style::GameStyle;

use input::{InputEvent, InputManager};
pub use parse::{ReplCommand, parse_command};

/// Control flow signal used by handlers to exit the REPL.
pub enum ReplControl {
    Continue,
    Quit,
}

const HELP_TEXT: &str = "\
Movement: go <direction>, or just north/south/east/west/up/down (n, s, e, w, u, d).
Objects: take, drop, put <x> in <y>, open, close, lock, unlock, turn on, turn off, examine,
         plus anything the world suggests (read, move, ring...).
Other: look, inventory, wait, score, save [slot], load [slot], saves, quit.";

/// Run the main read–eval–print loop until the player quits.
///
/// # Errors
/// Propagates integrity errors from the engine; player mistakes never end the
/// loop.
pub fn run_repl(engine: &mut Engine, save_dir: &Path) -> Result<()> {
    let mut input_manager = InputManager::new(save_dir.to_path_buf());
    let mut current_turn = engine.state().turns();
    info!("================> BEGIN TURN {current_turn} <================");

    loop {
        let prompt = format!(
            "\n[Turn: {}|Score: {}]>> ",
            engine.state().turns(),
            engine.state().score()
        )
        .prompt_style()
        .to_string();

        let line = match input_manager.read_line(&prompt) {
            Ok(InputEvent::Line(line)) => line,
            Ok(InputEvent::Eof) => "quit".to_string(),
            Ok(InputEvent::Interrupted) => {
                println!("Command canceled.");
                continue;
            },
            Err(err) => {
                warn!("failed to read input: {err}");
                println!("{}", "Failed to read input. Try again.".error_style());
                continue;
            },
        };

        let control = match parse_command(&line) {
            ReplCommand::Game(command) => match engine.execute(&command) {
                Ok(response) => {
                    print_response(&response.message, response.success);
                    ReplControl::Continue
                },
                Err(err) => {
                    error!("integrity error while running {command:?}: {err}");
                    return Err(anyhow::Error::new(err).context("engine failure"));
                },
            },
            ReplCommand::Save(slot) => {
                save_handler(engine, save_dir, &slot);
                ReplControl::Continue
            },
            ReplCommand::Load(slot) => {
                load_handler(engine, save_dir, &slot);
                ReplControl::Continue
            },
            ReplCommand::ListSaves => {
                list_saves_handler(save_dir);
                ReplControl::Continue
            },
            ReplCommand::Help => {
                println!("{}", HELP_TEXT.description_style());
                ReplControl::Continue
            },
            ReplCommand::Quit => quit_handler(engine),
            ReplCommand::Unknown => {
                println!("{}", "Didn't quite catch that?".italic());
                ReplControl::Continue
            },
        };
        if let ReplControl::Quit = control {
            break;
        }

        if engine.state().turns() > current_turn {
            current_turn = engine.state().turns();
            info!("================> BEGIN TURN {current_turn} <================");
        }
    }
    Ok(())
}

/// Print an engine message wrapped to the terminal width.
pub fn print_response(message: &str, success: bool) {
    let width = termwidth();
    for paragraph in message.lines() {
        let wrapped = fill(paragraph, width);
        if success {
            println!("{}", wrapped.response_style());
        } else {
            println!("{}", wrapped.denied_style());
        }
    }
}

/// Print a scene description: the title bar, then the wrapped body.
pub fn print_scene(text: &str) {
    let mut lines = text.lines();
    if let Some(title) = lines.next() {
        println!("\n{}", title.scene_titlebar_style());
    }
    let width = termwidth();
    for line in lines {
        println!("{}", fill(line, width).description_style());
    }
}

fn quit_handler(engine: &Engine) -> ReplControl {
    info!(
        "player quit with a score of {} after {} turns",
        engine.state().score(),
        engine.state().turns()
    );
    info!("ending flags:");
    engine.state().flags().iter().for_each(|flag| info!("* {flag}"));

    let scoring = &engine.graph().scoring;
    println!("\n{}", scoring.report_title.subheading_style());
    println!("{}", engine.score_report());
    if let Some(rank) = engine.rank()
        && !rank.description.is_empty()
    {
        println!("{}", rank.description.description_style());
    }
    println!("\nGoodbye.");
    ReplControl::Quit
}

fn save_handler(engine: &Engine, save_dir: &Path, slot: &str) {
    match write_save(save_dir, slot, &engine.export_state()) {
        Ok(path) => {
            println!("Game saved as {}", slot.underline());
            info!("player saved game to '{}'", path.display());
        },
        Err(err) => {
            warn!("save to slot '{slot}' failed: {err:#}");
            println!("{} {err:#}", "Save failed:".error_style());
        },
    }
}

fn load_handler(engine: &mut Engine, save_dir: &Path, slot: &str) {
    let found = match find_slot(save_dir, slot) {
        Ok(Some(found)) => found,
        Ok(None) => {
            println!("Unable to find {} save file. Load aborted.", slot.error_style());
            return;
        },
        Err(err) => {
            warn!("could not search saves for '{slot}': {err:#}");
            println!("Unable to read the save directory. Load aborted.");
            return;
        },
    };
    let result: Result<PathBuf> = load_save_file(&found.path).and_then(|snapshot| {
        engine
            .import_state(&snapshot)
            .with_context(|| format!("restoring '{}'", found.path.display()))?;
        Ok(found.path.clone())
    });
    match result {
        Ok(path) => {
            info!("player reloaded state from '{}'", path.display());
            println!("Saved game {} loaded successfully.", slot.underline().green());
            match engine.describe_current_scene() {
                Ok(scene) => print_scene(&scene.describe()),
                Err(err) => warn!("could not describe scene after load: {err}"),
            }
        },
        Err(err) => {
            warn!("player attempted to load '{slot}': {err:#}");
            println!(
                "Unable to load the {} save file. Your current game is unchanged.",
                slot.error_style()
            );
        },
    }
}

fn list_saves_handler(save_dir: &Path) {
    let entries = match build_save_entries(save_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("could not list saves: {err:#}");
            println!("{}", "Unable to read the save directory.".error_style());
            return;
        },
    };
    if entries.is_empty() {
        println!("No saved games yet.");
        return;
    }
    println!("{}", "Saved games".subheading_style());
    for entry in entries {
        let age = entry.slot.modified.map(format_modified).unwrap_or_default();
        let detail = match (&entry.status, &entry.snapshot) {
            (SaveFileStatus::Ready, Some(snapshot)) => {
                format!("turn {}, score {}", snapshot.turns, snapshot.score)
            },
            (SaveFileStatus::VersionMismatch { save_version, .. }, _) => format!("from v{save_version}"),
            (SaveFileStatus::Corrupted { message }, _) => format!("unreadable: {message}"),
            (SaveFileStatus::Ready, None) => String::new(),
        };
        println!("  {} ({detail}) {age}", entry.slot.slot.underline());
    }
}
