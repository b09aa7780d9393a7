#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that carves mazes and walks an agent through them.

mod agent;
mod config;
mod game;

use anyhow::{bail, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use maze_runner_world::{query, Grid};

use crate::config::{Cli, Settings};
use crate::game::GameState;

/// Entry point for the maze runner command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = Settings::resolve(Cli::parse())?;
    let mut game = GameState::new(&settings)?;
    println!("{}", query::welcome_banner(game.grid()));
    info!(
        "carving a {0}x{0} maze from cell {1} with seed {2}",
        settings.grid.rows,
        settings.grid.start.get(),
        settings.grid.seed
    );

    let mut frames = 0u64;
    while game.solved() < settings.rounds {
        if frames >= settings.max_frames {
            bail!(
                "gave up after {frames} frames with {} of {} rounds solved",
                game.solved(),
                settings.rounds
            );
        }
        frames += 1;

        let report = game.run_frame()?;
        if report.completed {
            if settings.ascii {
                print!("{}", query::render_ascii(game.grid()));
            }
            if settings.print_masks {
                print!("{}", format_masks(game.grid()));
            }
        }
        if report.solved {
            println!("round {} solved after {frames} frames", game.solved());
        }
    }

    Ok(())
}

/// Formats the wall bit-masks one grid row per line.
fn format_masks(grid: &Grid) -> String {
    let masks = query::wall_masks(grid);
    let mut out = String::new();
    for row in masks.chunks(grid.rows() as usize) {
        let line = row
            .iter()
            .map(|mask| format!("{mask:2}"))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}
