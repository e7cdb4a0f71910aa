//! End-to-end planning scenarios on small grids.

use dstar_core::{
    DStarPlanner, GridCoord, GridGeometry, PlanMode, PlanOutcome, PlannerConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::SQRT_2;

const LETHAL: u8 = 254;

fn open_grid(nx: usize, ny: usize) -> (DStarPlanner, Vec<u8>) {
    let geometry = GridGeometry::new(nx, ny, 1.0);
    let planner = DStarPlanner::new(geometry, PlannerConfig::default()).unwrap();
    (planner, vec![0; geometry.cell_count()])
}

fn set(costs: &mut [u8], nx: usize, x: usize, y: usize, value: u8) {
    costs[x + y * nx] = value;
}

fn assert_valid_path(outcome: &PlanOutcome, costs: &[u8], nx: usize) {
    let path = outcome.path();
    assert!(!path.is_empty(), "expected a path");
    for cell in path {
        assert!(costs[cell.x + cell.y * nx] < LETHAL, "path crosses lethal {cell:?}");
    }
    for pair in path.windows(2) {
        let dx = pair[0].x.abs_diff(pair[1].x);
        let dy = pair[0].y.abs_diff(pair[1].y);
        assert!(dx <= 1 && dy <= 1 && (dx, dy) != (0, 0), "not 8-connected: {pair:?}");
    }
}

#[test]
fn open_grid_follows_the_diagonal() {
    let (mut planner, costs) = open_grid(10, 10);
    let outcome = planner
        .plan(&costs, GridCoord::new(0, 0), GridCoord::new(9, 9))
        .unwrap();

    assert!(outcome.is_found());
    let path = outcome.path();
    assert_eq!(path.first(), Some(&GridCoord::new(0, 0)));
    assert_eq!(path.last(), Some(&GridCoord::new(9, 9)));
    assert_eq!(path.len(), 10);
    assert!(path.iter().all(|cell| cell.x == cell.y));

    let stats = outcome.stats();
    assert_eq!(stats.mode, PlanMode::FullSearch);
    assert!((stats.path_cost.unwrap() - 9.0 * SQRT_2).abs() < 1e-9);
    assert!(!outcome.expanded().is_empty());
    assert_valid_path(&outcome, &costs, 10);
}

#[test]
fn new_obstacle_on_path_is_avoided() {
    let (mut planner, mut costs) = open_grid(10, 10);
    let start = GridCoord::new(0, 0);
    let goal = GridCoord::new(9, 9);
    let first = planner.plan(&costs, start, goal).unwrap();
    assert!(first.path().contains(&GridCoord::new(5, 5)));

    set(&mut costs, 10, 5, 5, LETHAL);
    let second = planner.plan(&costs, start, goal).unwrap();

    assert!(second.is_found());
    assert_eq!(second.stats().mode, PlanMode::Replan);
    assert!(second.stats().repairs >= 1);
    assert!(!second.path().contains(&GridCoord::new(5, 5)));
    assert_eq!(second.path().first(), Some(&start));
    assert_eq!(second.path().last(), Some(&goal));
    assert_valid_path(&second, &costs, 10);
}

#[test]
fn repair_stays_local() {
    let (mut planner, mut costs) = open_grid(10, 10);
    let start = GridCoord::new(0, 0);
    let goal = GridCoord::new(9, 9);
    let full = planner.plan(&costs, start, goal).unwrap();

    set(&mut costs, 10, 5, 5, LETHAL);
    let repaired = planner.plan(&costs, start, goal).unwrap();

    let full_work = full.stats().states_processed;
    let repair_work = repaired.stats().states_processed;
    assert!(repair_work > 0);
    assert!(
        repair_work * 2 < full_work,
        "repair processed {repair_work} states, full search {full_work}"
    );
}

#[test]
fn wall_across_the_grid_has_no_path() {
    let (mut planner, mut costs) = open_grid(10, 10);
    for x in 0..10 {
        set(&mut costs, 10, x, 5, LETHAL);
    }
    let outcome = planner
        .plan(&costs, GridCoord::new(0, 0), GridCoord::new(9, 9))
        .unwrap();

    assert!(!outcome.is_found());
    assert!(outcome.path().is_empty());
    assert!(outcome.stats().path_cost.is_none());
    // Only the goal side of the wall was searched
    assert!(outcome.expanded().iter().all(|cell| cell.y > 5));
}

#[test]
fn wall_dropped_during_replanning_cuts_the_path() {
    let (mut planner, mut costs) = open_grid(10, 10);
    let start = GridCoord::new(0, 0);
    let goal = GridCoord::new(9, 9);
    assert!(planner.plan(&costs, start, goal).unwrap().is_found());

    for x in 0..10 {
        set(&mut costs, 10, x, 5, LETHAL);
    }
    let outcome = planner.plan(&costs, start, goal).unwrap();
    assert!(!outcome.is_found());
    assert!(planner.last_path().is_empty());

    // Clearing the wall lets the next call search again from scratch
    for x in 0..10 {
        set(&mut costs, 10, x, 5, 0);
    }
    let outcome = planner.plan(&costs, start, goal).unwrap();
    assert!(outcome.is_found());
    assert_eq!(outcome.stats().mode, PlanMode::FullSearch);
}

#[test]
fn repeated_call_returns_the_same_path() {
    let (mut planner, costs) = open_grid(10, 10);
    let start = GridCoord::new(0, 0);
    let goal = GridCoord::new(9, 9);
    let first = planner.plan(&costs, start, goal).unwrap();
    let second = planner.plan(&costs, start, goal).unwrap();

    assert_eq!(first.path(), second.path());
    assert_eq!(first.expanded(), second.expanded());
    assert_eq!(second.stats().states_processed, 0);
    assert_eq!(second.stats().repairs, 0);
}

#[test]
fn obstacle_off_the_corridor_changes_nothing() {
    let (mut planner, mut costs) = open_grid(10, 10);
    let start = GridCoord::new(0, 0);
    let goal = GridCoord::new(9, 9);
    let first = planner.plan(&costs, start, goal).unwrap();

    set(&mut costs, 10, 0, 9, LETHAL);
    set(&mut costs, 10, 9, 0, LETHAL);
    let second = planner.plan(&costs, start, goal).unwrap();

    assert_eq!(first.path(), second.path());
    assert_eq!(second.stats().repairs, 0);
}

#[test]
fn changing_goal_resets_the_search() {
    let (mut planner, costs) = open_grid(10, 10);
    let start = GridCoord::new(0, 0);
    planner.plan(&costs, start, GridCoord::new(9, 9)).unwrap();
    let moved = planner.plan(&costs, start, GridCoord::new(0, 9)).unwrap();

    let (mut fresh, _) = open_grid(10, 10);
    let reference = fresh.plan(&costs, start, GridCoord::new(0, 9)).unwrap();

    assert_eq!(moved.stats().mode, PlanMode::FullSearch);
    assert_eq!(moved.path(), reference.path());
    assert_eq!(moved.expanded(), reference.expanded());
    assert_eq!(moved.path().len(), 10);
    assert!(moved.path().iter().all(|cell| cell.x == 0));
}

#[test]
fn identical_histories_give_identical_results() {
    let run = || {
        let (mut planner, mut costs) = open_grid(12, 8);
        for y in 1..7 {
            set(&mut costs, 12, 6, y, LETHAL);
        }
        let start = GridCoord::new(1, 4);
        let goal = GridCoord::new(11, 3);
        let first = planner.plan(&costs, start, goal).unwrap();
        set(&mut costs, 12, 6, 7, LETHAL);
        let second = planner.plan(&costs, start, goal).unwrap();
        (first, second)
    };

    let (a1, a2) = run();
    let (b1, b2) = run();
    assert_eq!(a1, b1);
    assert_eq!(a2, b2);
}

#[test]
fn detour_around_growing_obstacle_stays_valid() {
    let (mut planner, mut costs) = open_grid(12, 12);
    let start = GridCoord::new(1, 1);
    let goal = GridCoord::new(10, 10);
    assert!(planner.plan(&costs, start, goal).unwrap().is_found());

    // Sensor reveals a block in stages as the robot sits at the start
    for (x, y) in [(5, 5), (6, 6), (4, 6), (6, 4), (5, 6), (6, 5)] {
        set(&mut costs, 12, x, y, LETHAL);
        let outcome = planner.plan(&costs, start, goal).unwrap();
        assert!(outcome.is_found(), "lost the path after blocking ({x}, {y})");
        assert_valid_path(&outcome, &costs, 12);
        assert_eq!(outcome.path().last(), Some(&goal));
    }
}

#[test]
fn replanning_follows_robot_progress() {
    let (mut planner, mut costs) = open_grid(10, 10);
    let goal = GridCoord::new(9, 9);
    planner.plan(&costs, GridCoord::new(0, 0), goal).unwrap();

    set(&mut costs, 10, 7, 7, LETHAL);
    let outcome = planner.plan(&costs, GridCoord::new(3, 3), goal).unwrap();

    assert!(outcome.is_found());
    assert_eq!(outcome.path().first(), Some(&GridCoord::new(3, 3)));
    assert!(!outcome.path().contains(&GridCoord::new(7, 7)));
    assert_valid_path(&outcome, &costs, 10);
}

#[test]
fn detour_found_when_robot_is_upstream_of_the_blocked_edge() {
    // Column 4 is walled off except at (4, 0); column 0 is blocked at y = 1..=2
    //   y=3  . S . . # G
    //   y=2  # . . . # .
    //   y=1  # . . x # .
    //   y=0  . . . . . .
    let walls = [(4, 1), (4, 2), (4, 3), (0, 1), (0, 2)];
    let start = GridCoord::new(1, 3);
    let goal = GridCoord::new(5, 3);
    let blocked = GridCoord::new(3, 1);

    for robot in [GridCoord::new(1, 3), GridCoord::new(2, 2)] {
        let (mut planner, mut costs) = open_grid(6, 4);
        for (x, y) in walls {
            set(&mut costs, 6, x, y, LETHAL);
        }
        let first = planner.plan(&costs, start, goal).unwrap();
        assert_eq!(
            first.path(),
            &[
                start,
                GridCoord::new(2, 2),
                blocked,
                GridCoord::new(4, 0),
                GridCoord::new(5, 1),
                GridCoord::new(5, 2),
                goal,
            ]
        );

        set(&mut costs, 6, blocked.x, blocked.y, LETHAL);
        let outcome = planner.plan(&costs, robot, goal).unwrap();
        let (mut fresh, _) = open_grid(6, 4);
        let reference = fresh.plan(&costs, robot, goal).unwrap();

        assert!(outcome.is_found(), "no detour from {robot:?}");
        assert_valid_path(&outcome, &costs, 6);
        assert_eq!(outcome.path().first(), Some(&robot));
        assert_eq!(outcome.path().last(), Some(&goal));
        assert!(!outcome.path().contains(&blocked));

        let cost = outcome.stats().path_cost.unwrap();
        assert!(cost < 100.0, "stale cost {cost} reported");
        assert!(cost + 1e-9 >= reference.stats().path_cost.unwrap());
    }
}

#[test]
fn replanning_agrees_with_a_fresh_search_on_random_maps() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut compared = 0;

    for _ in 0..300 {
        let nx: usize = rng.random_range(3..=14);
        let ny: usize = rng.random_range(3..=14);
        let mut costs: Vec<u8> = (0..nx * ny)
            .map(|_| if rng.random_range(0..6) == 0 { LETHAL } else { 0 })
            .collect();
        let start = GridCoord::new(rng.random_range(0..nx), rng.random_range(0..ny));
        let goal = GridCoord::new(rng.random_range(0..nx), rng.random_range(0..ny));
        set(&mut costs, nx, start.x, start.y, 0);
        set(&mut costs, nx, goal.x, goal.y, 0);

        let (mut planner, _) = open_grid(nx, ny);
        let first = planner.plan(&costs, start, goal).unwrap();
        if first.path().len() < 3 {
            continue;
        }

        let path = first.path().to_vec();
        let blocked = path[rng.random_range(1..path.len() - 1)];
        let robot_at = rng.random_range(0..path.iter().position(|c| *c == blocked).unwrap());
        let robot = path[robot_at];
        set(&mut costs, nx, blocked.x, blocked.y, LETHAL);

        let outcome = planner.plan(&costs, robot, goal).unwrap();
        let (mut fresh, _) = open_grid(nx, ny);
        let reference = fresh.plan(&costs, robot, goal).unwrap();

        assert_eq!(
            outcome.is_found(),
            reference.is_found(),
            "{nx}x{ny} start {start:?} goal {goal:?} robot {robot:?} blocked {blocked:?}"
        );
        if outcome.is_found() {
            assert_valid_path(&outcome, &costs, nx);
            assert_eq!(outcome.path().first(), Some(&robot));
            assert_eq!(outcome.path().last(), Some(&goal));
            compared += 1;
        }
    }

    assert!(compared > 20, "only {compared} replans found a path");
}
