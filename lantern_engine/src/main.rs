#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Lantern **
//! Reference driver for the Lantern text-adventure engine.

use lantern_engine::data_paths::data_path;
use lantern_engine::repl::print_scene;
use lantern_engine::save_files::{SAVE_DIR, save_dir_for_world};
use lantern_engine::style::GameStyle;
use lantern_engine::{Engine, load_config, load_world, run_repl};

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use std::io::Write;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading Lantern world...");
    let graph = load_world().context("while loading world")?;
    let config = load_config(&data_path("lantern.toml"));
    let save_dir = save_dir_for_world(Path::new(SAVE_DIR), &graph.slug);
    let mut engine = Engine::new(graph, config).context("while starting engine")?;
    info!("World loaded successfully.");

    // clear the screen
    print!("\x1B[2J\x1B[H");
    std::io::stdout().flush().context("flushing stdout")?;
    info!("Starting the game!");

    let title = engine.graph().title.to_uppercase();
    println!("{:^84}", title.bright_yellow().underline());
    if !engine.graph().author.is_empty() {
        println!("{:^84}", format!("by {}", engine.graph().author).italic());
    }
    if !engine.graph().intro.is_empty() {
        println!("\n{}", engine.graph().intro.description_style());
    }

    let opening = engine.start().context("while entering the start scene")?;
    print_scene(&opening);

    run_repl(&mut engine, &save_dir)
}
