//! Per-cell wall and visitation state.

use std::time::Duration;

use maze_runner_core::Side;

/// One grid square with four independently removable walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    walls: [bool; 4],
    visited: bool,
    carved_at: Option<Duration>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    /// Creates a cell with all four walls standing and no visit recorded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            walls: [true; 4],
            visited: false,
            carved_at: None,
        }
    }

    /// Reports whether the wall on `side` is still standing.
    #[must_use]
    pub const fn has_wall(&self, side: Side) -> bool {
        self.walls[side.index()]
    }

    /// Wall flags indexed `TOP, BOTTOM, LEFT, RIGHT`.
    #[must_use]
    pub const fn walls(&self) -> [bool; 4] {
        self.walls
    }

    /// Reports whether the generator reached this cell.
    #[must_use]
    pub const fn is_visited(&self) -> bool {
        self.visited
    }

    /// Simulated time at which the generator first reached this cell.
    #[must_use]
    pub const fn carved_at(&self) -> Option<Duration> {
        self.carved_at
    }

    /// Packs the standing walls into `TOP=1, BOTTOM=2, LEFT=4, RIGHT=8`.
    #[must_use]
    pub fn wall_mask(&self) -> u8 {
        Side::ALL
            .iter()
            .filter(|side| self.has_wall(**side))
            .map(|side| side.mask_bit())
            .sum()
    }

    pub(crate) fn clear_wall(&mut self, side: Side) {
        self.walls[side.index()] = false;
    }

    /// Marks the cell visited, returning `true` only for the first visit.
    pub(crate) fn mark_visited(&mut self, now: Duration) -> bool {
        if self.visited {
            return false;
        }

        self.visited = true;
        self.carved_at = Some(now);
        true
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}
