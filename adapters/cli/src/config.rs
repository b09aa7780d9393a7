//! Command-line flags and the optional TOML settings file they override.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use maze_runner_core::CellIndex;
use maze_runner_world::{GridConfig, Layout};
use serde::Deserialize;

/// Command-line flags accepted by the maze runner.
#[derive(Debug, Parser)]
#[command(
    name = "maze-runner",
    about = "Carves a maze and walks an agent through it"
)]
pub(crate) struct Cli {
    /// TOML file providing defaults for every other flag.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Number of rows (and columns) of the maze.
    #[arg(long)]
    pub(crate) rows: Option<u32>,
    /// Row-major index of the cell the generator starts from.
    #[arg(long)]
    pub(crate) start: Option<usize>,
    /// Seed for the first maze; drawn from system entropy when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Milliseconds between generation batches; zero generates instantly.
    #[arg(long)]
    pub(crate) step_interval_ms: Option<u64>,
    /// Number of mazes to solve before exiting.
    #[arg(long)]
    pub(crate) rounds: Option<u32>,
    /// Print the maze as text whenever generation completes.
    #[arg(long)]
    pub(crate) ascii: bool,
    /// Print the wall bit-mask grid whenever generation completes.
    #[arg(long)]
    pub(crate) print_masks: bool,
}

/// Settings read from the TOML file; every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileSettings {
    rows: Option<u32>,
    start: Option<usize>,
    seed: Option<u64>,
    step_interval_ms: Option<u64>,
    steps_per_interval: Option<u32>,
    settle_delay_ms: Option<u64>,
    frame_ms: Option<u64>,
    agent_speed: Option<f32>,
    rounds: Option<u32>,
    max_frames: Option<u64>,
    layout: Option<Layout>,
}

impl FileSettings {
    fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }
}

/// Fully resolved settings for a run.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) grid: GridConfig,
    pub(crate) step_interval: Duration,
    pub(crate) steps_per_interval: u32,
    pub(crate) settle_delay: Duration,
    pub(crate) frame: Duration,
    pub(crate) agent_speed: f32,
    pub(crate) rounds: u32,
    pub(crate) max_frames: u64,
    pub(crate) ascii: bool,
    pub(crate) print_masks: bool,
}

impl Settings {
    /// Merges flags over the settings file over built-in defaults.
    pub(crate) fn resolve(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };

        let defaults = GridConfig::default();
        let rows = cli.rows.or(file.rows).unwrap_or(defaults.rows);
        let start = cli
            .start
            .or(file.start)
            .map(CellIndex::new)
            .unwrap_or_else(|| default_start(rows, defaults.start));
        let seed = cli.seed.or(file.seed).unwrap_or_else(rand::random);
        let steps_per_interval = file.steps_per_interval.unwrap_or(1);
        if steps_per_interval == 0 {
            bail!("steps_per_interval must be at least 1");
        }

        Ok(Self {
            grid: GridConfig {
                rows,
                start,
                seed,
                layout: file.layout.unwrap_or_default(),
            },
            step_interval: Duration::from_millis(
                cli.step_interval_ms.or(file.step_interval_ms).unwrap_or(16),
            ),
            steps_per_interval,
            settle_delay: Duration::from_millis(file.settle_delay_ms.unwrap_or(500)),
            frame: Duration::from_millis(file.frame_ms.unwrap_or(16)),
            agent_speed: file.agent_speed.unwrap_or(160.0),
            rounds: cli.rounds.or(file.rounds).unwrap_or(1),
            max_frames: file.max_frames.unwrap_or(1_000_000),
            ascii: cli.ascii,
            print_masks: cli.print_masks,
        })
    }
}

/// Keeps the default start cell when it fits, otherwise starts from the first cell.
fn default_start(rows: u32, start: CellIndex) -> CellIndex {
    let len = (rows as usize).saturating_mul(rows as usize);
    if start.get() < len {
        start
    } else {
        CellIndex::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("maze-runner").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_defaults() {
        let settings =
            Settings::resolve(cli(&["--rows", "8", "--seed", "5", "--ascii"])).expect("resolves");

        assert_eq!(settings.grid.rows, 8);
        assert_eq!(settings.grid.seed, 5);
        assert_eq!(settings.grid.start, CellIndex::new(37));
        assert!(settings.ascii);
        assert_eq!(settings.step_interval, Duration::from_millis(16));
    }

    #[test]
    fn small_grids_fall_back_to_the_first_cell() {
        let settings = Settings::resolve(cli(&["--rows", "4", "--seed", "1"])).expect("resolves");
        assert_eq!(settings.grid.start, CellIndex::new(0));
    }

    #[test]
    fn settings_file_parses_layout_overrides() {
        let contents = "rows = 6\nsettle_delay_ms = 0\n[layout]\ncell_size = 20.0\n";
        let file: FileSettings = toml::from_str(contents).expect("valid toml");

        assert_eq!(file.rows, Some(6));
        assert_eq!(file.settle_delay_ms, Some(0));
        let layout = file.layout.expect("layout table");
        assert_eq!(layout.cell_size, 20.0);
        assert_eq!(layout.wall_thickness, Layout::default().wall_thickness);
    }

    #[test]
    fn zero_steps_per_interval_is_rejected() {
        let name = format!("maze-runner-zero-steps-{}.toml", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, "steps_per_interval = 0\n").expect("write settings");
        let config = path.to_string_lossy().into_owned();

        let args = cli(&["--config", config.as_str(), "--seed", "1"]);
        let error = Settings::resolve(args).expect_err("rejected");
        let _ = fs::remove_file(&path);

        assert!(error.to_string().contains("steps_per_interval"));
    }

    #[test]
    fn unknown_settings_are_rejected() {
        assert!(toml::from_str::<FileSettings>("colour = \"red\"\n").is_err());
    }
}
