#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for Maze Runner.
//!
//! The [`Grid`] owns every cell by value, the goal cell outside the interior,
//! and the incremental generator that carves the maze. Adapters mutate it
//! through [`apply`] and read it through [`query`].

mod cell;
mod collision;
mod generator;
mod layout;
mod topology;

use std::time::Duration;

use log::{info, warn};
use maze_runner_core::{
    CellIndex, Command, Event, GenerationPhase, MazeError, Side, WELCOME_BANNER,
};
use serde::{Deserialize, Serialize};

pub use self::cell::Cell;
pub use self::generator::{Completion, StepAction, StepReport};
pub use self::layout::Layout;

use self::generator::Walk;
use self::topology::Topology;

const DEFAULT_ROWS: u32 = 16;
const DEFAULT_START: CellIndex = CellIndex::new(37);
const DEFAULT_SEED: u64 = 0x6d61_7a65_5f72_756e;

/// Parameters required to construct a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of rows (and columns) of the square grid.
    pub rows: u32,
    /// Cell the generation walk starts from.
    pub start: CellIndex,
    /// Seed for the generation walk.
    pub seed: u64,
    /// World-space geometry of cells and walls.
    pub layout: Layout,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            start: DEFAULT_START,
            seed: DEFAULT_SEED,
            layout: Layout::default(),
        }
    }
}

impl GridConfig {
    /// Creates a configuration with the default layout.
    #[must_use]
    pub fn new(rows: u32, start: CellIndex, seed: u64) -> Self {
        Self {
            rows,
            start,
            seed,
            layout: Layout::default(),
        }
    }

    fn topology(&self) -> Result<Topology, MazeError> {
        let invalid = MazeError::InvalidDimensions {
            rows: self.rows,
            start: self.start.get(),
        };
        let topology = Topology::new(self.rows).ok_or(invalid)?;
        topology.check(self.start).map_err(|_| invalid)?;
        Ok(topology)
    }
}

/// Represents the authoritative maze grid.
#[derive(Debug)]
pub struct Grid {
    banner: &'static str,
    layout: Layout,
    topology: Topology,
    cells: Vec<Cell>,
    goal: Cell,
    walk: Walk,
    clock: Duration,
}

impl Default for Grid {
    fn default() -> Self {
        let config = GridConfig::default();
        match Self::new(config) {
            Ok(grid) => grid,
            Err(error) => unreachable!("default grid configuration is valid: {error}"),
        }
    }
}

impl Grid {
    /// Creates a grid with every wall standing, ready for generation.
    pub fn new(config: GridConfig) -> Result<Self, MazeError> {
        let topology = config.topology()?;
        Ok(Self {
            banner: WELCOME_BANNER,
            layout: config.layout,
            cells: vec![Cell::new(); topology.len()],
            goal: Cell::new(),
            walk: Walk::new(config.start, config.seed),
            topology,
            clock: Duration::ZERO,
        })
    }

    /// Number of rows (and columns) of the grid.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.topology.rows()
    }

    /// Number of interior cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topology.len()
    }

    /// Always `false`; a grid holds at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Interior cell at `index`.
    pub fn cell(&self, index: CellIndex) -> Result<&Cell, MazeError> {
        self.topology.check(index)?;
        Ok(&self.cells[index.get()])
    }

    /// Exit cell placed one step right of the last interior cell.
    #[must_use]
    pub fn goal(&self) -> &Cell {
        &self.goal
    }

    /// Current generation phase.
    #[must_use]
    pub fn phase(&self) -> GenerationPhase {
        self.walk.phase()
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Advances the simulated clock used for carve and completion timestamps.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock = self.clock.saturating_add(dt);
    }

    /// Neighbour across `side`, or `None` when the step would leave the grid.
    pub fn neighbour_in_direction(
        &self,
        index: CellIndex,
        side: Side,
    ) -> Result<Option<CellIndex>, MazeError> {
        self.topology.check(index)?;
        Ok(self.topology.neighbour(index, side))
    }

    /// Reports whether any in-bounds neighbour of `index` is still unvisited.
    pub fn has_unvisited_neighbours(&self, index: CellIndex) -> Result<bool, MazeError> {
        self.topology.check(index)?;
        Ok(self.has_frontier(index))
    }

    /// Removes the wall on `side` of `index` together with the neighbour's
    /// matching wall, returning the neighbour.
    ///
    /// Sides facing the grid boundary are rejected and leave the grid untouched.
    pub fn remove_wall(&mut self, index: CellIndex, side: Side) -> Result<CellIndex, MazeError> {
        self.topology.check(index)?;
        let out_of_bounds = MazeError::OutOfBounds {
            index: index.get(),
            side,
        };
        let neighbour = self.topology.neighbour(index, side).ok_or(out_of_bounds)?;
        self.carve(index, side, neighbour);
        Ok(neighbour)
    }

    /// Restores every cell to its pre-generation state and reseeds the walk.
    ///
    /// The cell storage is reused; only the flags are rewritten.
    pub fn reset(&mut self, seed: u64) {
        for cell in &mut self.cells {
            cell.reset();
        }
        self.goal.reset();
        self.walk.restart(seed);
        info!("grid reset with seed {seed:#x}");
    }

    /// Number of interior cells reached by the generator.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_visited()).count()
    }

    fn carve(&mut self, index: CellIndex, side: Side, neighbour: CellIndex) {
        self.cells[index.get()].clear_wall(side);
        self.cells[neighbour.get()].clear_wall(side.opposite());
    }

    fn has_frontier(&self, index: CellIndex) -> bool {
        self.topology
            .neighbours(index)
            .any(|(_, next)| !self.cells[next.get()].is_visited())
    }
}

/// Applies the provided command to the grid, mutating state deterministically.
///
/// Rejected commands emit [`Event::CommandRejected`] instead of failing.
pub fn apply(grid: &mut Grid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { rows, start, seed } => {
            let config = GridConfig {
                rows,
                start,
                seed,
                layout: grid.layout,
            };
            match Grid::new(config) {
                Ok(mut configured) => {
                    configured.clock = grid.clock;
                    *grid = configured;
                    out_events.push(Event::GridConfigured { rows });
                }
                Err(reason) => reject(reason, out_events),
            }
        }
        Command::Tick { dt } => {
            grid.advance_time(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StepGeneration => match grid.step() {
            Ok(report) => record_step(&report, out_events),
            Err(reason) => reject(reason, out_events),
        },
        Command::GenerateAll => {
            while grid.phase() == GenerationPhase::Generating {
                match grid.step() {
                    Ok(report) => record_step(&report, out_events),
                    Err(reason) => {
                        reject(reason, out_events);
                        return;
                    }
                }
            }
        }
        Command::ResetGrid { seed } => {
            grid.reset(seed);
            out_events.push(Event::GridReset { seed });
        }
        Command::RemoveWall { cell, side } => match grid.remove_wall(cell, side) {
            Ok(_) => out_events.push(Event::WallRemoved { cell, side }),
            Err(reason) => reject(reason, out_events),
        },
    }
}

fn record_step(report: &StepReport, out_events: &mut Vec<Event>) {
    if let Some((cell, at)) = report.visited {
        out_events.push(Event::CellVisited { cell, at });
    }

    match report.action {
        StepAction::Carved { from, side, .. } => {
            out_events.push(Event::WallRemoved { cell: from, side });
        }
        StepAction::Backtracked { to } => out_events.push(Event::Backtracked { to }),
        StepAction::Drained => {}
    }

    if let Some(completion) = report.completion {
        out_events.push(Event::GenerationCompleted {
            at: completion.at,
            exit: completion.exit,
        });
    }
}

fn reject(reason: MazeError, out_events: &mut Vec<Event>) {
    warn!("command rejected: {reason}");
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use std::time::Duration;

    use glam::Vec3;
    use maze_runner_core::{CellCoord, CellIndex, GenerationPhase, MazeError, Side};

    use super::{Cell, Grid, Layout};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(grid: &Grid) -> &'static str {
        grid.banner
    }

    /// Provides read-only access to the grid's geometry constants.
    #[must_use]
    pub fn layout(grid: &Grid) -> &Layout {
        &grid.layout
    }

    /// Current generation phase, the progress signal consumed by drivers.
    #[must_use]
    pub fn phase(grid: &Grid) -> GenerationPhase {
        grid.phase()
    }

    /// Fraction of interior cells visited so far, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(grid: &Grid) -> f32 {
        grid.visited_count() as f32 / grid.len() as f32
    }

    /// Simulated time at which generation completed, if it has.
    #[must_use]
    pub fn completed_at(grid: &Grid) -> Option<Duration> {
        grid.walk.completed_at()
    }

    /// Cell the generation cursor currently points at.
    #[must_use]
    pub fn cursor(grid: &Grid) -> CellIndex {
        grid.walk.current()
    }

    /// Cells on the backtracking stack, oldest first.
    #[must_use]
    pub fn visit_stack(grid: &Grid) -> &[CellIndex] {
        grid.walk.stack()
    }

    /// Row and column of an interior cell.
    pub fn coord(grid: &Grid, index: CellIndex) -> Result<CellCoord, MazeError> {
        grid.topology.check(index)?;
        Ok(grid.topology.coord(index))
    }

    /// World-space centre of an interior cell.
    pub fn cell_center(grid: &Grid, index: CellIndex) -> Result<Vec3, MazeError> {
        let coord = coord(grid, index)?;
        Ok(grid.layout.cell_center(grid.rows(), coord))
    }

    /// World-space centre of the goal cell.
    #[must_use]
    pub fn goal_center(grid: &Grid) -> Vec3 {
        grid.layout.cell_center(grid.rows(), goal_coord(grid))
    }

    /// Logical coordinate of the goal cell, one column past the last row's end.
    #[must_use]
    pub fn goal_coord(grid: &Grid) -> CellCoord {
        CellCoord::new(grid.rows() - 1, grid.rows())
    }

    /// Interior cell whose right wall opens onto the goal cell.
    #[must_use]
    pub fn exit_cell(grid: &Grid) -> CellIndex {
        CellIndex::new(grid.len() - 1)
    }

    /// Every interior cell in row-major order.
    #[must_use]
    pub fn cells(grid: &Grid) -> &[Cell] {
        &grid.cells
    }

    /// Carved passages between interior cells, each listed once.
    #[must_use]
    pub fn carved_edges(grid: &Grid) -> Vec<(CellIndex, CellIndex)> {
        let mut edges = Vec::new();
        for (offset, cell) in grid.cells.iter().enumerate() {
            let index = CellIndex::new(offset);
            for side in [Side::Bottom, Side::Right] {
                if cell.has_wall(side) {
                    continue;
                }
                if let Some(next) = grid.topology.neighbour(index, side) {
                    edges.push((index, next));
                }
            }
        }
        edges
    }

    /// Wall bit-masks (`TOP=1, BOTTOM=2, LEFT=4, RIGHT=8`) in row-major order.
    #[must_use]
    pub fn wall_masks(grid: &Grid) -> Vec<u8> {
        grid.cells.iter().map(Cell::wall_mask).collect()
    }

    /// Renders the maze as text: one line of horizontal walls per row edge and
    /// one line of cells, with `G` marking the goal cell once the exit is open.
    #[must_use]
    pub fn render_ascii(grid: &Grid) -> String {
        let rows = grid.topology.rows() as usize;
        let mut out = String::new();

        for row in 0..rows {
            let line = &grid.cells[row * rows..(row + 1) * rows];
            for cell in line {
                out.push('+');
                out.push_str(edge(cell.has_wall(Side::Top)));
            }
            out.push_str("+\n");

            for cell in line {
                out.push(if cell.has_wall(Side::Left) { '|' } else { ' ' });
                out.push_str(if cell.is_visited() { "   " } else { " # " });
            }
            let last = &line[rows - 1];
            out.push(if last.has_wall(Side::Right) { '|' } else { ' ' });
            if row == rows - 1 && !last.has_wall(Side::Right) {
                out.push_str(" G");
            }
            out.push('\n');
        }

        for cell in &grid.cells[(rows - 1) * rows..] {
            out.push('+');
            out.push_str(edge(cell.has_wall(Side::Bottom)));
        }
        out.push_str("+\n");
        out
    }

    fn edge(wall: bool) -> &'static str {
        if wall { "---" } else { "   " }
    }
}
