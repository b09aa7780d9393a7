//! World-space placement of cells, walls and floors.

use glam::{Mat4, Vec3};
use maze_runner_core::{Aabb, CellCoord, Side};
use serde::{Deserialize, Serialize};

/// Geometry constants used to lay the grid out in world units.
///
/// The grid is centred on the origin in the XY plane with row zero at the
/// top; walls stand along +Z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Distance between neighbouring cell centres.
    pub cell_size: f32,
    /// Thickness of a wall block across the cell edge.
    pub wall_thickness: f32,
    /// Length of a wall block along the cell edge, overlapping at corners.
    pub wall_span: f32,
    /// Height of a wall block along Z.
    pub wall_height: f32,
    /// Thickness of the floor slab under each cell.
    pub floor_thickness: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            wall_thickness: 5.0,
            wall_span: 45.0,
            wall_height: 50.0,
            floor_thickness: 4.0,
        }
    }
}

impl Layout {
    /// Centre of the cell at `coord` for a grid of `rows` rows.
    ///
    /// Columns may equal `rows` so the goal cell outside the grid can be placed.
    #[must_use]
    pub fn cell_center(&self, rows: u32, coord: CellCoord) -> Vec3 {
        let origin = (rows / 2) as f32 * self.cell_size - self.cell_size * 0.5;
        Vec3::new(
            coord.column() as f32 * self.cell_size - origin,
            -(coord.row() as f32) * self.cell_size + origin,
            0.0,
        )
    }

    /// Offset from a cell centre to the centre of its wall on `side`.
    #[must_use]
    pub fn wall_offset(&self, side: Side) -> Vec3 {
        let half = self.cell_size * 0.5;
        match side {
            Side::Top => Vec3::new(0.0, half, 0.0),
            Side::Bottom => Vec3::new(0.0, -half, 0.0),
            Side::Left => Vec3::new(-half, 0.0, 0.0),
            Side::Right => Vec3::new(half, 0.0, 0.0),
        }
    }

    /// Block dimensions of the wall on `side`.
    #[must_use]
    pub fn wall_size(&self, side: Side) -> Vec3 {
        match side {
            Side::Top | Side::Bottom => {
                Vec3::new(self.wall_span, self.wall_thickness, self.wall_height)
            }
            Side::Left | Side::Right => {
                Vec3::new(self.wall_thickness, self.wall_span, self.wall_height)
            }
        }
    }

    /// Bounds of the wall on `side` of a cell centred at `center`.
    #[must_use]
    pub fn wall_bounds(&self, center: Vec3, side: Side) -> Aabb {
        Aabb::from_center_size(center + self.wall_offset(side), self.wall_size(side))
    }

    /// Block dimensions of a floor slab.
    #[must_use]
    pub fn floor_size(&self) -> Vec3 {
        Vec3::new(self.cell_size, self.cell_size, self.floor_thickness)
    }

    /// Model transform of the floor slab under a cell centred at `center`.
    #[must_use]
    pub fn floor_transform(&self, center: Vec3) -> Mat4 {
        Mat4::from_translation(center - Vec3::new(0.0, 0.0, self.floor_thickness * 0.5))
    }

    /// Model transform of the wall on `side` of a cell centred at `center`.
    #[must_use]
    pub fn wall_transform(&self, center: Vec3, side: Side) -> Mat4 {
        Mat4::from_translation(center + self.wall_offset(side))
    }

    /// Half the open space between two facing walls of a cell.
    #[must_use]
    pub fn goal_threshold(&self) -> f32 {
        (self.cell_size - self.wall_thickness) * 0.5
    }
}
