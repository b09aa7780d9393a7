//! Autopilot agent standing in for the player avatar.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use anyhow::{anyhow, Result};
use glam::Vec3;
use maze_runner_core::{Aabb, CellIndex, CollisionSink, WallCollider};
use maze_runner_world::{query, Grid};

const AGENT_SIZE: f32 = 25.0;
const AGENT_HEIGHT: f32 = 10.0;

/// Box-shaped agent that walks a planned route and is pushed out of walls.
#[derive(Debug)]
pub(crate) struct Agent {
    position: Vec3,
    speed: f32,
    route: VecDeque<Vec3>,
    contacts: u64,
}

impl Agent {
    pub(crate) fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            speed,
            route: VecDeque::new(),
            contacts: 0,
        }
    }

    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn contacts(&self) -> u64 {
        self.contacts
    }

    pub(crate) fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.route.clear();
    }

    pub(crate) fn set_route(&mut self, route: Vec<Vec3>) {
        self.route = route.into();
    }

    /// Moves towards the next waypoint, consuming waypoints as they are reached.
    pub(crate) fn advance(&mut self, dt: Duration) {
        let mut budget = self.speed * dt.as_secs_f32();
        while budget > 0.0 {
            let Some(target) = self.route.front().copied() else {
                return;
            };
            let target = Vec3::new(target.x, target.y, self.position.z);
            let offset = target - self.position;
            let distance = offset.length();
            if distance <= budget {
                self.position = target;
                budget -= distance;
                let _ = self.route.pop_front();
            } else {
                self.position += offset / distance * budget;
                budget = 0.0;
            }
        }
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, Vec3::splat(AGENT_SIZE))
    }
}

impl CollisionSink for Agent {
    /// Resolves overlap by pushing the agent out along the shallower horizontal axis.
    fn collide(&mut self, collider: &WallCollider) {
        let bounds = self.bounds();
        if !bounds.intersects(&collider.bounds) {
            return;
        }

        let wall = collider.bounds;
        let push_x = if self.position.x < wall.center().x {
            wall.min.x - bounds.max.x
        } else {
            wall.max.x - bounds.min.x
        };
        let push_y = if self.position.y < wall.center().y {
            wall.min.y - bounds.max.y
        } else {
            wall.max.y - bounds.min.y
        };

        if push_x.abs() < push_y.abs() {
            self.position.x += push_x;
        } else {
            self.position.y += push_y;
        }
        self.contacts += 1;
    }
}

/// Spawn point of the agent: above the first cell's floor.
pub(crate) fn spawn_point(grid: &Grid) -> Result<Vec3> {
    let center = query::cell_center(grid, CellIndex::new(0))?;
    Ok(center + Vec3::new(0.0, 0.0, AGENT_HEIGHT))
}

/// Breadth-first route through carved passages from the first cell to the goal.
pub(crate) fn plan_route(grid: &Grid) -> Result<Vec<Vec3>> {
    let mut links: HashMap<CellIndex, Vec<CellIndex>> = HashMap::new();
    for (a, b) in query::carved_edges(grid) {
        links.entry(a).or_default().push(b);
        links.entry(b).or_default().push(a);
    }

    let start = CellIndex::new(0);
    let exit = query::exit_cell(grid);
    let mut previous: HashMap<CellIndex, CellIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        if cell == exit {
            break;
        }
        for next in links.get(&cell).into_iter().flatten() {
            if *next != start && !previous.contains_key(next) {
                let _ = previous.insert(*next, cell);
                queue.push_back(*next);
            }
        }
    }

    let mut cells = vec![exit];
    let mut cursor = exit;
    while cursor != start {
        cursor = *previous
            .get(&cursor)
            .ok_or_else(|| anyhow!("exit cell {exit:?} is not reachable from the start"))?;
        cells.push(cursor);
    }
    cells.reverse();

    let mut route = cells
        .into_iter()
        .map(|cell| query::cell_center(grid, cell))
        .collect::<Result<Vec<_>, _>>()?;
    route.push(query::goal_center(grid));
    Ok(route)
}
