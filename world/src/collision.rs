//! Wall colliders, draw units and goal detection.
//!
//! Carved walls simply stop being emitted, so the standing walls are the only
//! description of navigable space the adapters ever need.

use glam::Vec3;
use maze_runner_core::{
    CellIndex, CellSlot, CollisionSink, DrawSink, DrawUnit, Material, Side, WallCollider,
};

use super::{Cell, Grid};

impl Grid {
    /// Iterates the colliders of every wall still standing, goal cell included.
    pub fn active_colliders(&self) -> impl Iterator<Item = WallCollider> + '_ {
        self.slots().flat_map(move |(owner, cell, center)| {
            Side::ALL
                .into_iter()
                .filter(move |side| cell.has_wall(*side))
                .map(move |side| WallCollider {
                    owner,
                    side,
                    bounds: self.layout.wall_bounds(center, side),
                })
        })
    }

    /// Hands every standing wall to the agent's collision capability.
    pub fn check_collision<C>(&self, agent: &mut C)
    where
        C: CollisionSink + ?Sized,
    {
        for collider in self.active_colliders() {
            agent.collide(&collider);
        }
    }

    /// Reports whether `position` lies within the goal threshold on both X and Y.
    #[must_use]
    pub fn is_goal_reached(&self, position: Vec3) -> bool {
        let goal = self.goal_center();
        let threshold = self.layout.goal_threshold();
        (position.x - goal.x).abs() <= threshold && (position.y - goal.y).abs() <= threshold
    }

    /// Emits a floor for every cell and a block for every standing wall.
    pub fn draw<D>(&self, sink: &mut D)
    where
        D: DrawSink + ?Sized,
    {
        let floor_scale = self.layout.floor_size();
        for (owner, cell, center) in self.slots() {
            for side in Side::ALL {
                if !cell.has_wall(side) {
                    continue;
                }
                sink.draw(&DrawUnit {
                    owner,
                    material: Material::Wall(side),
                    scale: self.layout.wall_size(side),
                    transform: self.layout.wall_transform(center, side),
                    carved_at: cell.carved_at(),
                });
            }

            let material = match owner {
                CellSlot::Interior(_) => Material::Floor,
                CellSlot::Goal => Material::GoalFloor,
            };
            sink.draw(&DrawUnit {
                owner,
                material,
                scale: floor_scale,
                transform: self.layout.floor_transform(center),
                carved_at: cell.carved_at(),
            });
        }
    }

    fn goal_center(&self) -> Vec3 {
        super::query::goal_center(self)
    }

    fn slots(&self) -> impl Iterator<Item = (CellSlot, &Cell, Vec3)> + '_ {
        let rows = self.rows();
        let interior = self.cells.iter().enumerate().map(move |(offset, cell)| {
            let index = CellIndex::new(offset);
            let center = self.layout.cell_center(rows, self.topology.coord(index));
            (CellSlot::Interior(index), cell, center)
        });
        let goal = std::iter::once((CellSlot::Goal, &self.goal, self.goal_center()));
        interior.chain(goal)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{query, GridConfig};
    use super::*;
    use maze_runner_core::{Aabb, DrawUnit};

    fn grid(rows: u32) -> Grid {
        Grid::new(GridConfig::new(rows, CellIndex::new(0), 21)).expect("valid grid")
    }

    #[test]
    fn fresh_grid_emits_every_wall() {
        let grid = grid(3);
        let mut colliders: Vec<WallCollider> = Vec::new();
        grid.check_collision(&mut colliders);

        assert_eq!(colliders.len(), (9 + 1) * 4);
        assert!(colliders
            .iter()
            .any(|collider| collider.owner == CellSlot::Goal && collider.side == Side::Left));
    }

    #[test]
    fn colliders_sit_on_cell_edges() {
        let grid = grid(2);
        let collider = grid
            .active_colliders()
            .find(|collider| {
                collider.owner == CellSlot::Interior(CellIndex::new(0))
                    && collider.side == Side::Right
            })
            .expect("standing wall");
        let center = query::cell_center(&grid, CellIndex::new(0)).expect("cell");

        assert_eq!(
            collider.bounds,
            Aabb::from_center_size(
                center + Vec3::new(20.0, 0.0, 0.0),
                Vec3::new(5.0, 45.0, 50.0)
            )
        );
    }

    #[test]
    fn draw_emits_walls_then_floor_per_cell() {
        let grid = grid(2);
        let mut units: Vec<DrawUnit> = Vec::new();
        grid.draw(&mut units);

        assert_eq!(units.len(), 5 * 5);
        assert_eq!(units[4].material, Material::Floor);
        assert_eq!(units[24].material, Material::GoalFloor);
        assert!(units.iter().all(|unit| unit.carved_at.is_none()));
    }

    #[test]
    fn draw_carries_carve_timestamps() {
        let mut grid = grid(2);
        grid.advance_time(std::time::Duration::from_secs(4));
        let _ = grid.step().expect("generating");
        let mut units: Vec<DrawUnit> = Vec::new();
        grid.draw(&mut units);

        let first_floor = units
            .iter()
            .find(|unit| unit.material == Material::Floor)
            .expect("floor");
        assert_eq!(
            first_floor.carved_at,
            Some(std::time::Duration::from_secs(4))
        );
    }

    #[test]
    fn goal_is_right_of_the_last_cell() {
        let grid = grid(4);
        let last = query::cell_center(&grid, CellIndex::new(15)).expect("cell");
        assert_eq!(query::goal_center(&grid), last + Vec3::new(40.0, 0.0, 0.0));
    }
}
