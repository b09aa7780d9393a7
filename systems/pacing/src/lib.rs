#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pacing system that turns elapsed simulated time into generation steps.
//!
//! The grid never schedules its own work. This system accumulates
//! [`Event::TimeAdvanced`] deltas and emits one batch of
//! [`Command::StepGeneration`] per elapsed interval, which is how the maze
//! reveal is animated at a fixed cadence.

use std::time::Duration;

use log::debug;
use maze_runner_core::{Command, Event, GenerationPhase};

/// Upper bound on the steps emitted for a single batch of events.
///
/// Time beyond the bound is dropped rather than carried into later frames.
pub const MAX_STEPS_PER_FRAME: usize = 4_096;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Configuration parameters required to construct the pacing system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step_interval: Duration,
    steps_per_interval: u32,
}

impl Config {
    /// Creates a configuration emitting `steps_per_interval` steps every `step_interval`.
    ///
    /// A zero interval requests the whole maze in one go.
    #[must_use]
    pub const fn new(step_interval: Duration, steps_per_interval: u32) -> Self {
        Self {
            step_interval,
            steps_per_interval,
        }
    }

    /// Configuration that generates the whole maze as soon as time advances.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO, 1)
    }
}

/// Pure system that emits generation steps while the maze is being carved.
#[derive(Debug)]
pub struct Pacing {
    step_interval: Duration,
    steps_per_interval: u32,
    accumulator: Duration,
}

impl Pacing {
    /// Creates a new pacing system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            step_interval: config.step_interval,
            steps_per_interval: config.steps_per_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and the current generation phase to emit step commands.
    pub fn handle(&mut self, events: &[Event], phase: GenerationPhase, out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::GridReset { .. } | Event::GridConfigured { .. } => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                _ => {}
            }
        }

        if phase != GenerationPhase::Generating {
            self.accumulator = Duration::ZERO;
            return;
        }

        if accumulated.is_zero() {
            return;
        }

        if self.step_interval.is_zero() {
            out.push(Command::GenerateAll);
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let intervals = self.resolve_intervals();
        let requested = intervals.saturating_mul(u128::from(self.steps_per_interval));
        let steps = usize::try_from(requested)
            .map_or(MAX_STEPS_PER_FRAME, |steps| steps.min(MAX_STEPS_PER_FRAME));
        if requested > steps as u128 {
            debug!("pacing capped {requested} requested steps at {steps}");
        } else if steps > 0 {
            debug!("pacing emits {steps} generation steps");
        }
        out.extend(std::iter::repeat(Command::StepGeneration).take(steps));
    }

    fn resolve_intervals(&mut self) -> u128 {
        let interval = self.step_interval.as_nanos();
        if interval == 0 {
            return 0;
        }

        let elapsed = self.accumulator.as_nanos();
        // The remainder is shorter than one interval, so its seconds fit in a u64.
        let remainder = elapsed % interval;
        self.accumulator = Duration::new(
            (remainder / NANOS_PER_SEC) as u64,
            (remainder % NANOS_PER_SEC) as u32,
        );
        elapsed / interval
    }
}
