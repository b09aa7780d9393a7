use std::time::Duration;

use maze_runner_core::{CellIndex, Command, Event, GenerationPhase, MazeError};
use maze_runner_world::{self as world, query, Grid};

#[test]
fn replaying_a_script_reproduces_events_and_layout() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::GenerationCompleted { .. })));
}

#[test]
fn stepping_emits_visit_and_carve_events() {
    let mut grid = Grid::default();
    let mut events = Vec::new();
    world::apply(
        &mut grid,
        Command::ConfigureGrid {
            rows: 3,
            start: CellIndex::new(4),
            seed: 17,
        },
        &mut events,
    );
    events.clear();

    world::apply(&mut grid, Command::StepGeneration, &mut events);

    assert!(matches!(
        events.as_slice(),
        [
            Event::CellVisited { cell, at },
            Event::WallRemoved { cell: carved, .. },
        ] if *cell == CellIndex::new(4) && *at == Duration::ZERO && *carved == CellIndex::new(4)
    ));
}

#[test]
fn generate_all_ends_with_completion_and_later_steps_are_rejected() {
    let mut grid = Grid::default();
    let mut events = Vec::new();
    world::apply(
        &mut grid,
        Command::ConfigureGrid {
            rows: 4,
            start: CellIndex::new(5),
            seed: 2,
        },
        &mut events,
    );
    world::apply(&mut grid, Command::GenerateAll, &mut events);

    let visits = events
        .iter()
        .filter(|event| matches!(event, Event::CellVisited { .. }))
        .count();
    let carves = events
        .iter()
        .filter(|event| matches!(event, Event::WallRemoved { .. }))
        .count();
    assert_eq!(visits, 16);
    assert_eq!(carves, 15);
    assert_eq!(
        events.last(),
        Some(&Event::GenerationCompleted {
            at: Duration::ZERO,
            exit: CellIndex::new(15),
        })
    );

    events.clear();
    world::apply(&mut grid, Command::StepGeneration, &mut events);
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: MazeError::InvariantViolation {
                phase: GenerationPhase::Complete
            }
        }]
    );
}

#[test]
fn invalid_configuration_keeps_the_previous_grid() {
    let mut grid = Grid::default();
    let mut events = Vec::new();
    world::apply(
        &mut grid,
        Command::ConfigureGrid {
            rows: 2,
            start: CellIndex::new(9),
            seed: 0,
        },
        &mut events,
    );

    assert_eq!(grid.rows(), 16);
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: MazeError::InvalidDimensions { rows: 2, start: 9 }
        }]
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut grid = Grid::default();
    let mut events = Vec::new();

    for command in commands {
        world::apply(&mut grid, command, &mut events);
    }

    ReplayOutcome {
        masks: query::wall_masks(&grid),
        goal_mask: grid.goal().wall_mask(),
        phase: grid.phase(),
        events,
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![Command::ConfigureGrid {
        rows: 6,
        start: CellIndex::new(7),
        seed: 0x1234_5678,
    }];
    for _ in 0..40 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(16),
        });
        commands.push(Command::StepGeneration);
    }
    commands.push(Command::GenerateAll);
    commands.push(Command::ResetGrid { seed: 99 });
    commands.push(Command::GenerateAll);
    commands
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ReplayOutcome {
    masks: Vec<u8>,
    goal_mask: u8,
    phase: GenerationPhase,
    events: Vec<Event>,
}
