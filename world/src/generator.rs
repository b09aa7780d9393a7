//! Incremental randomized depth-first maze generation.
//!
//! The walk keeps its cursor and backtracking stack between calls so drivers
//! can advance it one carve-or-backtrack step per frame for an animated
//! reveal, or run it to completion in a single call. Directions are drawn
//! uniformly from all four sides and redrawn when they leave the grid or lead
//! to a visited cell; the draw is never renormalised over the valid sides, as
//! that would change the corridor statistics of the resulting mazes.

use std::time::Duration;

use log::{debug, info};
use maze_runner_core::{CellIndex, GenerationPhase, MazeError, Side};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::Grid;

/// Cursor, backtracking stack and random source of the generation walk.
#[derive(Debug)]
pub(crate) struct Walk {
    start: CellIndex,
    current: CellIndex,
    stack: Vec<CellIndex>,
    rng: ChaCha8Rng,
    phase: GenerationPhase,
    completed_at: Option<Duration>,
    rejected_draws: u64,
}

impl Walk {
    pub(crate) fn new(start: CellIndex, seed: u64) -> Self {
        Self {
            start,
            current: start,
            stack: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: GenerationPhase::Generating,
            completed_at: None,
            rejected_draws: 0,
        }
    }

    /// Rewinds the walk to its start cell while keeping the stack allocation.
    pub(crate) fn restart(&mut self, seed: u64) {
        self.current = self.start;
        self.stack.clear();
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.phase = GenerationPhase::Generating;
        self.completed_at = None;
        self.rejected_draws = 0;
    }

    pub(crate) fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub(crate) fn current(&self) -> CellIndex {
        self.current
    }

    pub(crate) fn stack(&self) -> &[CellIndex] {
        &self.stack
    }

    pub(crate) fn completed_at(&self) -> Option<Duration> {
        self.completed_at
    }
}

/// Outcome of a single generation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Cell marked visited for the first time during the step, with its timestamp.
    pub visited: Option<(CellIndex, Duration)>,
    /// Move performed by the cursor.
    pub action: StepAction,
    /// Present when the step finished the maze.
    pub completion: Option<Completion>,
}

/// Cursor move performed by a generation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepAction {
    /// A wall pair was removed and the cursor moved into the new cell.
    Carved {
        /// Cell the cursor left.
        from: CellIndex,
        /// Side of `from` that was opened.
        side: Side,
        /// Cell the cursor entered.
        to: CellIndex,
    },
    /// The cursor jumped back to a stacked cell that still has a frontier.
    Backtracked {
        /// Cell the cursor moved to.
        to: CellIndex,
    },
    /// The stack ran dry without finding a frontier.
    Drained,
}

/// Completion details recorded when the last cell is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Simulated time at which generation finished.
    pub at: Duration,
    /// Interior cell whose right wall was opened onto the goal cell.
    pub exit: CellIndex,
}

impl Grid {
    /// Performs one carve-or-backtrack step of the generation walk.
    ///
    /// Fails with [`MazeError::InvariantViolation`] once generation has ended
    /// and with [`MazeError::ExhaustedBacktrack`] if the stack runs dry while
    /// cells are still unvisited, which moves the grid into
    /// [`GenerationPhase::Stalled`].
    pub fn step(&mut self) -> Result<StepReport, MazeError> {
        let phase = self.walk.phase;
        if phase != GenerationPhase::Generating {
            return Err(MazeError::InvariantViolation { phase });
        }

        let now = self.clock;
        let current = self.walk.current;
        let visited = self.cells[current.get()]
            .mark_visited(now)
            .then_some((current, now));
        self.walk.stack.push(current);

        let action = if self.has_frontier(current) {
            let (side, next) = self.draw_unvisited_neighbour(current);
            self.carve(current, side, next);
            self.walk.current = next;
            StepAction::Carved {
                from: current,
                side,
                to: next,
            }
        } else if let Some(to) = self.backtrack() {
            self.walk.current = to;
            StepAction::Backtracked { to }
        } else {
            let visited = self.visited_count();
            let total = self.len();
            if visited < total {
                self.walk.phase = GenerationPhase::Stalled;
                return Err(MazeError::ExhaustedBacktrack { visited, total });
            }
            StepAction::Drained
        };
        debug!("generation step {action:?}");

        let completion = if self.walk.stack.is_empty() && !self.has_frontier(self.walk.current) {
            Some(self.complete(now))
        } else {
            None
        };

        Ok(StepReport {
            visited,
            action,
            completion,
        })
    }

    /// Runs the walk until the maze is complete, returning the number of steps taken.
    pub fn generate_all(&mut self) -> Result<usize, MazeError> {
        let mut steps = 0;
        while self.walk.phase == GenerationPhase::Generating {
            let _ = self.step()?;
            steps += 1;
        }

        match self.walk.phase {
            GenerationPhase::Complete => Ok(steps),
            phase => Err(MazeError::InvariantViolation { phase }),
        }
    }

    fn draw_unvisited_neighbour(&mut self, current: CellIndex) -> (Side, CellIndex) {
        loop {
            let side = Side::ALL[self.walk.rng.gen_range(0..Side::ALL.len())];
            match self.topology.neighbour(current, side) {
                Some(next) if !self.cells[next.get()].is_visited() => return (side, next),
                _ => self.walk.rejected_draws += 1,
            }
        }
    }

    fn backtrack(&mut self) -> Option<CellIndex> {
        while let Some(candidate) = self.walk.stack.pop() {
            if self.has_frontier(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn complete(&mut self, now: Duration) -> Completion {
        let exit = CellIndex::new(self.len() - 1);
        self.cells[exit.get()].clear_wall(Side::Right);
        self.goal.clear_wall(Side::Left);
        self.walk.phase = GenerationPhase::Complete;
        self.walk.completed_at = Some(now);
        info!(
            "maze of {} cells complete after {} rejected direction draws",
            self.len(),
            self.walk.rejected_draws
        );
        Completion { at: now, exit }
    }
}
