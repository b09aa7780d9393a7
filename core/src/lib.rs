#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Runner engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative grid, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the grid executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Rendering and physics stay outside the engine:
//! the grid hands [`DrawUnit`] values to a [`DrawSink`] and [`WallCollider`]
//! values to a [`CollisionSink`] without knowing how either is implemented.

use std::time::Duration;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Runner.";

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the grid with new dimensions and a new generation start cell.
    ConfigureGrid {
        /// Number of rows (and columns) of the square grid.
        rows: u32,
        /// Cell the generation walk starts from.
        start: CellIndex,
        /// Seed used for the generation walk.
        seed: u64,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Performs exactly one carve-or-backtrack step of the generator.
    StepGeneration,
    /// Runs the generator until the maze is complete.
    GenerateAll,
    /// Restores every cell to its pre-generation state and reseeds the walk.
    ResetGrid {
        /// Seed used for the next generation walk.
        seed: u64,
    },
    /// Removes the wall pair on the given side of a cell.
    RemoveWall {
        /// Cell whose wall should be removed.
        cell: CellIndex,
        /// Side of the cell that should be opened.
        side: Side,
    },
}

/// Events broadcast by the grid after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the grid was rebuilt with new dimensions.
    GridConfigured {
        /// Number of rows (and columns) of the square grid.
        rows: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that the generator reached a cell for the first time.
    CellVisited {
        /// Cell that became visited.
        cell: CellIndex,
        /// Simulated time at which the cell was carved.
        at: Duration,
    },
    /// Confirms that a wall pair was removed.
    WallRemoved {
        /// Cell whose wall was removed.
        cell: CellIndex,
        /// Side of the cell that was opened.
        side: Side,
    },
    /// Reports that the generation cursor jumped back to an earlier cell.
    Backtracked {
        /// Cell the cursor moved to.
        to: CellIndex,
    },
    /// Announces that every cell was visited and the exit was opened.
    GenerationCompleted {
        /// Simulated time at which generation finished.
        at: Duration,
        /// Interior cell whose outer wall now leads to the goal cell.
        exit: CellIndex,
    },
    /// Confirms that the grid was restored to its pre-generation state.
    GridReset {
        /// Seed that drives the next generation walk.
        seed: u64,
    },
    /// Reports that a command was rejected.
    CommandRejected {
        /// Specific reason the command failed.
        reason: MazeError,
    },
}

/// One of the four sides of a square cell.
///
/// The discriminants match the wall indices `TOP=0, BOTTOM=1, LEFT=2, RIGHT=3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Side facing decreasing row indices.
    Top = 0,
    /// Side facing increasing row indices.
    Bottom = 1,
    /// Side facing decreasing column indices.
    Left = 2,
    /// Side facing increasing column indices.
    Right = 3,
}

impl Side {
    /// Every side in wall-index order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Position of the side within a cell's wall array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Side shared with the neighbour across this side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Bit contributed by this side to a cell's wall mask.
    ///
    /// `TOP=1, BOTTOM=2, LEFT=4, RIGHT=8`.
    #[must_use]
    pub const fn mask_bit(self) -> u8 {
        1 << self as u8
    }

    /// Row and column offset of the neighbour across this side.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Top => (-1, 0),
            Self::Bottom => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = MazeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Side::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(MazeError::InvalidSide { value })
    }
}

/// Row-major index of an interior grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(usize);

impl CellIndex {
    /// Creates a new cell index with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Identifies which cell owns a wall or floor handed to a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellSlot {
    /// Cell inside the generated maze.
    Interior(CellIndex),
    /// Exit cell placed just outside the last interior cell.
    Goal,
}

/// Progress of the maze generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationPhase {
    /// Cells remain unvisited and the walk continues.
    Generating,
    /// Every cell was visited and the exit is open.
    Complete,
    /// The visit stack ran dry with cells still unvisited.
    Stalled,
}

/// Faults raised by grid operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum MazeError {
    /// The cell index lies outside the grid.
    #[error("cell index {index} is outside a grid of {len} cells")]
    InvalidIndex {
        /// Offending index.
        index: usize,
        /// Number of interior cells.
        len: usize,
    },
    /// A raw side value did not name one of the four sides.
    #[error("side value {value} is not one of TOP=0, BOTTOM=1, LEFT=2, RIGHT=3")]
    InvalidSide {
        /// Offending raw value.
        value: u8,
    },
    /// The side faces the grid boundary and has no neighbour to pair with.
    #[error("cell {index} has no neighbour on its {side:?} side")]
    OutOfBounds {
        /// Cell whose side was requested.
        index: usize,
        /// Side that faces the boundary.
        side: Side,
    },
    /// The operation is not valid in the current generation phase.
    #[error("operation is not permitted while generation is {phase:?}")]
    InvariantViolation {
        /// Phase the grid was in when the operation was attempted.
        phase: GenerationPhase,
    },
    /// The visit stack emptied before every cell was visited.
    #[error("generation stalled after visiting {visited} of {total} cells")]
    ExhaustedBacktrack {
        /// Number of cells visited before the stall.
        visited: usize,
        /// Number of interior cells.
        total: usize,
    },
    /// The requested grid dimensions or start cell are unusable.
    #[error("grid of {rows} rows cannot start from cell {start}")]
    InvalidDimensions {
        /// Requested number of rows.
        rows: u32,
        /// Requested start cell.
        start: usize,
    },
}

/// Axis-aligned bounding box in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Corner with the smallest coordinates.
    pub min: Vec3,
    /// Corner with the largest coordinates.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box centred at `center` spanning `size` along each axis.
    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Centre point of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the box extent along each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Reports whether two boxes overlap with a positive volume.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Returns the same box moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Collision volume of a wall that is still standing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallCollider {
    /// Cell that owns the wall.
    pub owner: CellSlot,
    /// Side of the owning cell the wall sits on.
    pub side: Side,
    /// World-space bounds of the wall block.
    pub bounds: Aabb,
}

/// Physics capability that resolves an agent against wall colliders.
pub trait CollisionSink {
    /// Registers a single live wall against the agent.
    fn collide(&mut self, collider: &WallCollider);
}

impl CollisionSink for Vec<WallCollider> {
    fn collide(&mut self, collider: &WallCollider) {
        self.push(*collider);
    }
}

/// Material a draw unit should be shaded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    /// Floor slab under an interior cell.
    Floor,
    /// Floor slab under the goal cell.
    GoalFloor,
    /// Wall block on the given side of a cell.
    Wall(Side),
}

/// One block the renderer should draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawUnit {
    /// Cell the block belongs to.
    pub owner: CellSlot,
    /// Material used to shade the block.
    pub material: Material,
    /// Local block dimensions in world units.
    pub scale: Vec3,
    /// World-space model transform.
    pub transform: Mat4,
    /// Simulated time at which the owning cell was carved, if it was.
    pub carved_at: Option<Duration>,
}

/// Drawing capability supplied by a rendering adapter.
pub trait DrawSink {
    /// Draws a single block.
    fn draw(&mut self, unit: &DrawUnit);
}

impl DrawSink for Vec<DrawUnit> {
    fn draw(&mut self, unit: &DrawUnit) {
        self.push(*unit);
    }
}
