//! Frame loop tying the grid, the pacing and round systems, and the agent together.

use std::time::Duration;

use anyhow::Result;
use glam::Vec3;
use log::{debug, info};
use maze_runner_core::{Command, DrawSink, DrawUnit, Event, GenerationPhase, Material};
use maze_runner_system_pacing::{self as pacing, Pacing};
use maze_runner_system_rounds::{self as rounds, Rounds};
use maze_runner_world::{self as world, Grid};

use crate::agent::{self, Agent};
use crate::config::Settings;

/// Counts the blocks a renderer would draw this frame.
#[derive(Debug, Default)]
pub(crate) struct FrameScene {
    walls: usize,
    floors: usize,
    latest_carve: Option<Duration>,
}

impl FrameScene {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl DrawSink for FrameScene {
    fn draw(&mut self, unit: &DrawUnit) {
        match unit.material {
            Material::Wall(_) => self.walls += 1,
            Material::Floor | Material::GoalFloor => self.floors += 1,
        }
        self.latest_carve = self.latest_carve.max(unit.carved_at);
    }
}

/// What happened during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameReport {
    pub(crate) completed: bool,
    pub(crate) solved: bool,
}

/// Every piece of mutable state owned by a run.
#[derive(Debug)]
pub(crate) struct GameState {
    grid: Grid,
    pacing: Pacing,
    rounds: Rounds,
    agent: Agent,
    spawn: Vec3,
    routed: bool,
    frame: Duration,
    scene: FrameScene,
}

impl GameState {
    pub(crate) fn new(settings: &Settings) -> Result<Self> {
        let grid = Grid::new(settings.grid)?;
        let spawn = agent::spawn_point(&grid)?;
        let pacing_config = if settings.step_interval.is_zero() {
            pacing::Config::instant()
        } else {
            pacing::Config::new(settings.step_interval, settings.steps_per_interval)
        };

        Ok(Self {
            grid,
            pacing: Pacing::new(pacing_config),
            rounds: Rounds::new(rounds::Config::new(
                settings.settle_delay,
                settings.grid.seed.wrapping_add(1),
            )),
            agent: Agent::new(spawn, settings.agent_speed),
            spawn,
            routed: false,
            frame: settings.frame,
            scene: FrameScene::default(),
        })
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn solved(&self) -> u32 {
        self.rounds.solved()
    }

    /// Advances the simulation by one frame.
    pub(crate) fn run_frame(&mut self) -> Result<FrameReport> {
        let mut events = Vec::new();
        let tick = Command::Tick { dt: self.frame };
        world::apply(&mut self.grid, tick, &mut events);

        let mut commands = Vec::new();
        self.pacing.handle(&events, self.grid.phase(), &mut commands);
        self.apply_all(commands, &mut events);
        self.observe(&events);

        let completed = events
            .iter()
            .any(|event| matches!(event, Event::GenerationCompleted { .. }));

        self.scene.clear();
        self.grid.draw(&mut self.scene);
        if completed {
            debug!(
                "scene: {} walls, {} floors, last carve at {:?}",
                self.scene.walls, self.scene.floors, self.scene.latest_carve
            );
        }

        let now = self.grid.now();
        if !self.rounds.is_settled(now) {
            return Ok(FrameReport {
                completed,
                solved: false,
            });
        }

        if !self.routed {
            self.agent.set_route(agent::plan_route(&self.grid)?);
            self.routed = true;
        }
        self.agent.advance(self.frame);
        self.grid.check_collision(&mut self.agent);
        let goal_reached = self.grid.is_goal_reached(self.agent.position());

        let mut commands = Vec::new();
        self.rounds.handle(now, goal_reached, &mut commands);
        let solved = !commands.is_empty();
        if solved {
            info!(
                "agent reached the goal at {now:?} after {} wall contacts",
                self.agent.contacts()
            );
            self.restart(commands);
        }

        Ok(FrameReport { completed, solved })
    }

    /// Feeds grid events to the round system and restarts a stalled walk.
    fn observe(&mut self, events: &[Event]) {
        self.rounds.observe(events);
        let mut commands = Vec::new();
        self.rounds.recover(&mut commands);
        if !commands.is_empty() {
            self.restart(commands);
        }
    }

    fn restart(&mut self, commands: Vec<Command>) {
        let mut reset_events = Vec::new();
        self.apply_all(commands, &mut reset_events);
        self.pacing
            .handle(&reset_events, self.grid.phase(), &mut Vec::new());
        self.rounds.observe(&reset_events);
        self.agent.respawn(self.spawn);
        self.routed = false;
    }

    fn apply_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            if command == Command::StepGeneration
                && self.grid.phase() != GenerationPhase::Generating
            {
                continue;
            }
            world::apply(&mut self.grid, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_runner_core::{CellIndex, MazeError};
    use maze_runner_world::GridConfig;

    fn settings(step_interval: Duration) -> Settings {
        Settings {
            grid: GridConfig::new(4, CellIndex::new(5), 9),
            step_interval,
            steps_per_interval: 1,
            settle_delay: Duration::from_millis(32),
            frame: Duration::from_millis(16),
            agent_speed: 400.0,
            rounds: 2,
            max_frames: 10_000,
            ascii: false,
            print_masks: false,
        }
    }

    fn run_until_solved(game: &mut GameState, rounds: u32) -> usize {
        let mut frames = 0;
        while game.solved() < rounds {
            frames += 1;
            assert!(frames < 10_000, "the agent never reached the goal");
            let _ = game.run_frame().expect("frame runs");
        }
        frames
    }

    #[test]
    fn paced_generation_completes_then_the_agent_solves_it() {
        let mut game = GameState::new(&settings(Duration::from_millis(16))).expect("game");

        let mut completed_at = None;
        for frame in 1..=64 {
            if game.run_frame().expect("frame runs").completed {
                completed_at = Some(frame);
                break;
            }
        }

        let frame = completed_at.expect("16 cells finish within 2N steps");
        assert!(frame <= 32);
        assert_eq!(game.grid().phase(), GenerationPhase::Complete);
        let _ = run_until_solved(&mut game, 1);
        assert_eq!(game.grid().visited_count(), 0, "solving resets the maze");
    }

    #[test]
    fn instant_generation_runs_several_rounds() {
        let mut game = GameState::new(&settings(Duration::ZERO)).expect("game");

        let _ = run_until_solved(&mut game, 2);

        assert_eq!(game.solved(), 2);
        assert_eq!(game.grid().phase(), GenerationPhase::Generating);
    }

    #[test]
    fn stalled_generation_restarts_the_walk() {
        let mut game = GameState::new(&settings(Duration::from_millis(16))).expect("game");
        for _ in 0..3 {
            let _ = game.run_frame().expect("frame runs");
        }
        assert!(game.grid().visited_count() > 0);

        let stalled = Event::CommandRejected {
            reason: MazeError::ExhaustedBacktrack {
                visited: game.grid().visited_count(),
                total: game.grid().len(),
            },
        };
        game.observe(&[stalled]);

        assert_eq!(game.grid().visited_count(), 0);
        assert_eq!(game.grid().phase(), GenerationPhase::Generating);
        assert_eq!(game.solved(), 0);
        let _ = run_until_solved(&mut game, 1);
    }

    #[test]
    fn scene_counts_every_block() {
        let mut game = GameState::new(&settings(Duration::ZERO)).expect("game");
        let _ = game.run_frame().expect("frame runs");

        assert_eq!(game.scene.floors, 17, "16 cells plus the goal floor");
        assert!(game.scene.walls > 0);
        assert!(game.scene.latest_carve.is_some());
    }
}
