#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round system that restarts the maze once the agent reaches the goal.
//!
//! Collision and goal checks only make sense after the freshly carved maze
//! has been on screen for a short settle delay. This system tracks the
//! completion timestamp broadcast by the grid, reports when that delay has
//! passed, and emits [`Command::ResetGrid`] with a newly drawn seed when the
//! driver reports that the goal was reached. A walk that stalls with
//! [`MazeError::ExhaustedBacktrack`] is recovered the same way, without
//! counting as a solved maze.

use std::time::Duration;

use log::{info, warn};
use maze_runner_core::{Command, Event, MazeError};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the round system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    settle_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the provided settle delay and seed source.
    #[must_use]
    pub const fn new(settle_delay: Duration, rng_seed: u64) -> Self {
        Self {
            settle_delay,
            rng_seed,
        }
    }
}

/// Pure system that gates gameplay checks and regenerates solved mazes.
#[derive(Debug)]
pub struct Rounds {
    settle_delay: Duration,
    completed_at: Option<Duration>,
    stalled: bool,
    rng: ChaCha8Rng,
    solved: u32,
}

impl Rounds {
    /// Creates a new round system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            settle_delay: config.settle_delay,
            completed_at: None,
            stalled: false,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            solved: 0,
        }
    }

    /// Consumes grid events, tracking when the current maze was completed.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::GenerationCompleted { at, .. } => self.completed_at = Some(*at),
                Event::GridReset { .. } | Event::GridConfigured { .. } => {
                    self.completed_at = None;
                    self.stalled = false;
                }
                Event::CommandRejected {
                    reason: MazeError::ExhaustedBacktrack { .. },
                } => self.stalled = true,
                _ => {}
            }
        }
    }

    /// Reports whether the settle delay after completion has elapsed at `now`.
    #[must_use]
    pub fn is_settled(&self, now: Duration) -> bool {
        self.completed_at
            .map_or(false, |at| now >= at.saturating_add(self.settle_delay))
    }

    /// Emits a reset with a fresh seed when a settled maze has been solved.
    pub fn handle(&mut self, now: Duration, goal_reached: bool, out: &mut Vec<Command>) {
        if !goal_reached || !self.is_settled(now) {
            return;
        }

        let seed = self.rng.next_u64();
        self.completed_at = None;
        self.solved = self.solved.saturating_add(1);
        info!("maze solved ({} so far), regenerating", self.solved);
        out.push(Command::ResetGrid { seed });
    }

    /// Emits a reset with a fresh seed when the last walk stalled.
    pub fn recover(&mut self, out: &mut Vec<Command>) {
        if !self.stalled {
            return;
        }

        let seed = self.rng.next_u64();
        self.stalled = false;
        warn!("maze generation stalled, restarting with seed {seed:#x}");
        out.push(Command::ResetGrid { seed });
    }

    /// Number of mazes solved since the system was created.
    #[must_use]
    pub const fn solved(&self) -> u32 {
        self.solved
    }
}
