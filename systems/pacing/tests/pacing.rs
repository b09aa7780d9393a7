use std::time::Duration;

use maze_runner_core::{CellIndex, Command, Event, GenerationPhase};
use maze_runner_system_pacing::{Config, Pacing};
use maze_runner_world::{self as world, Grid};

fn tick(ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(ms),
    }
}

#[test]
fn emits_one_batch_per_elapsed_interval() {
    let mut pacing = Pacing::new(Config::new(Duration::from_millis(50), 2));
    let mut commands = Vec::new();

    pacing.handle(&[tick(120)], GenerationPhase::Generating, &mut commands);

    assert_eq!(commands, vec![Command::StepGeneration; 4]);

    commands.clear();
    pacing.handle(&[tick(30)], GenerationPhase::Generating, &mut commands);
    assert_eq!(
        commands,
        vec![Command::StepGeneration; 2],
        "leftover time carries into the next frame"
    );
}

#[test]
fn stays_silent_once_generation_completes() {
    let mut pacing = Pacing::new(Config::new(Duration::from_millis(10), 1));
    let mut commands = Vec::new();

    pacing.handle(&[tick(500)], GenerationPhase::Complete, &mut commands);

    assert!(commands.is_empty(), "complete grids need no more steps");
}

#[test]
fn zero_interval_requests_the_whole_maze() {
    let mut pacing = Pacing::new(Config::instant());
    let mut commands = Vec::new();

    pacing.handle(&[tick(16)], GenerationPhase::Generating, &mut commands);

    assert_eq!(commands, vec![Command::GenerateAll]);
}

#[test]
fn reset_discards_accumulated_time() {
    let mut pacing = Pacing::new(Config::new(Duration::from_millis(100), 1));
    let mut commands = Vec::new();
    pacing.handle(&[tick(90)], GenerationPhase::Generating, &mut commands);
    assert!(commands.is_empty());

    pacing.handle(
        &[Event::GridReset { seed: 3 }, tick(20)],
        GenerationPhase::Generating,
        &mut commands,
    );

    assert!(
        commands.is_empty(),
        "time recorded before the reset must not count"
    );
}

#[test]
fn drives_a_grid_to_completion() {
    let mut grid = Grid::default();
    let mut events = Vec::new();
    world::apply(
        &mut grid,
        Command::ConfigureGrid {
            rows: 5,
            start: CellIndex::new(12),
            seed: 77,
        },
        &mut events,
    );

    let mut pacing = Pacing::new(Config::new(Duration::from_millis(16), 1));
    let mut frames = 0;
    while grid.phase() == GenerationPhase::Generating {
        frames += 1;
        assert!(frames <= 100, "generation should finish within 2N frames");

        let mut frame_events = Vec::new();
        world::apply(
            &mut grid,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut frame_events,
        );

        let mut commands = Vec::new();
        pacing.handle(&frame_events, grid.phase(), &mut commands);
        for command in commands {
            world::apply(&mut grid, command, &mut frame_events);
        }
    }

    assert_eq!(grid.visited_count(), 25);
}
