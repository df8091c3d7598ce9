use std::collections::BTreeSet;

use lane_defense_core::{
    Capabilities, CellCoord, CellId, CellKind, CellPath, Command, HighlightColor, LaneId,
    NullHighlighter, ObstacleDecision, PathOutcome,
};
use lane_defense_world::{
    self as world, navigation, query, reservations::PathReservations, visibility, GridLayout,
    World,
};

const LANE: LaneId = LaneId::new(0);
const LANE_COLOR: HighlightColor = HighlightColor::from_rgb(0xc8, 0x2a, 0x36);

fn at(world: &World, column: u32, row: u32) -> CellId {
    query::cell_at(world, CellCoord::new(column, row)).expect("cell inside grid")
}

fn coords(world: &World, cells: &[CellId]) -> Vec<(u32, u32)> {
    cells
        .iter()
        .filter_map(|&cell| query::coord(world, cell))
        .map(|coord| (coord.column(), coord.row()))
        .collect()
}

fn commit_obstacle(world: &mut World, cell: CellId) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SetCapabilities {
            cell,
            capabilities: Capabilities::obstacle(),
        },
        &mut events,
    );
    assert_eq!(events.len(), 1, "obstacle should change the cell's flags");
}

#[test]
fn range_two_from_the_center_of_an_open_field() {
    let world = World::build(&GridLayout::filled(5, 5, CellKind::Plain));
    let origin = at(&world, 2, 2);

    let visible: BTreeSet<(u32, u32)> = visibility::visible_cells(&world, origin, 2)
        .into_iter()
        .filter_map(|cell| query::coord(&world, cell))
        .map(|coord| (coord.column(), coord.row()))
        .collect();

    assert!(!visible.contains(&(2, 2)), "origin is never part of its own view");
    assert!(visible.contains(&(2, 4)));
    assert!(visible.contains(&(4, 2)));
    assert!(visible.contains(&(3, 3)));
    assert!(!visible.contains(&(0, 0)), "(0,0) lies four steps away");
    assert_eq!(visible.len(), 12, "an open field sees the whole Manhattan disc");
}

#[test]
fn blocked_center_forces_a_detour() {
    let mut layout = GridLayout::filled(3, 3, CellKind::Plain);
    layout
        .set(CellCoord::new(1, 1), Some(CellKind::Block))
        .expect("in bounds");
    let world = World::build(&layout);

    let outcome = navigation::shortest_path(&world, at(&world, 0, 1), at(&world, 2, 1));
    let PathOutcome::Found(path) = outcome else {
        panic!("the outer ring connects both sides");
    };

    assert_eq!(path.steps(), 4);
    let route = coords(&world, path.cells());
    let top = vec![(0, 1), (0, 0), (1, 0), (2, 0), (2, 1)];
    let bottom = vec![(0, 1), (0, 2), (1, 2), (2, 2), (2, 1)];
    assert!(route == top || route == bottom, "unexpected route {route:?}");
}

#[test]
fn obstacle_on_a_lane_with_an_alternative_is_accepted() {
    let mut world = World::build(&GridLayout::filled(2, 5, CellKind::Plain));
    let mut reservations = PathReservations::new();
    let _ = reservations.register(
        &world,
        LANE,
        at(&world, 0, 0),
        at(&world, 0, 4),
        LANE_COLOR,
        &mut NullHighlighter,
    );
    let before = reservations.path(LANE).cloned().expect("lane registered");
    assert_eq!(before.steps(), 4);

    let blocked = at(&world, 0, 2);
    assert!(before.contains(blocked));

    let decision = reservations.check_obstacle(&world, blocked);
    let ObstacleDecision::Accept { updates } = decision else {
        panic!("the second column keeps the lane connected");
    };
    assert_eq!(updates.len(), 1);
    assert_eq!(
        reservations.path(LANE),
        Some(&before),
        "checking must not touch stored paths"
    );

    commit_obstacle(&mut world, blocked);
    reservations
        .apply_updates(updates, &mut NullHighlighter)
        .expect("updates come from an accepted decision");

    let rerouted = reservations.path(LANE).expect("lane registered");
    assert_eq!(rerouted.steps(), 6);
    assert!(!rerouted.contains(blocked));
    assert_eq!(rerouted.start(), Some(at(&world, 0, 0)));
    assert_eq!(rerouted.end(), Some(at(&world, 0, 4)));
    for pair in rerouted.cells().windows(2) {
        assert!(query::neighbors(&world, pair[0]).contains(&pair[1]));
    }
}

#[test]
fn obstacle_in_a_single_width_corridor_is_rejected() {
    let world = World::build(&GridLayout::filled(1, 5, CellKind::Plain));
    let mut reservations = PathReservations::new();
    let _ = reservations.register(
        &world,
        LANE,
        at(&world, 0, 0),
        at(&world, 0, 4),
        LANE_COLOR,
        &mut NullHighlighter,
    );
    let before = reservations.path(LANE).cloned();

    let decision = reservations.check_obstacle(&world, at(&world, 0, 2));

    assert_eq!(
        decision,
        ObstacleDecision::Reject {
            severed: vec![LANE]
        }
    );
    assert_eq!(reservations.path(LANE).cloned(), before);
}

#[test]
fn one_obstacle_threatening_two_lanes_needs_both_to_survive() {
    // Both lanes cross (1,1). Lane 0 can detour around the block in the
    // third row; lane 1 starts in a dead-end stub above (1,1).
    let layout = GridLayout::from_text("#.#\n...\n.#.\n...", |symbol| match symbol {
        '#' => Some(CellKind::Block),
        _ => Some(CellKind::Plain),
    })
    .expect("layout");
    let world = World::build(&layout);
    let crossing = at(&world, 1, 1);
    let mut reservations = PathReservations::new();
    let _ = reservations.register(
        &world,
        LaneId::new(0),
        at(&world, 0, 1),
        at(&world, 2, 1),
        LANE_COLOR,
        &mut NullHighlighter,
    );
    let _ = reservations.register(
        &world,
        LaneId::new(1),
        at(&world, 1, 0),
        at(&world, 0, 1),
        LANE_COLOR,
        &mut NullHighlighter,
    );
    assert!(reservations.iter().all(|(_, lane)| lane.path().contains(crossing)));

    let decision = reservations.check_obstacle(&world, crossing);

    assert_eq!(
        decision,
        ObstacleDecision::Reject {
            severed: vec![LaneId::new(1)]
        }
    );
    assert_eq!(
        reservations.path(LaneId::new(0)).map(CellPath::steps),
        Some(2),
        "a rejected decision leaves every lane untouched"
    );
}

#[test]
fn wall_between_origin_and_target_hides_the_target() {
    let mut world = World::build(&GridLayout::filled(5, 1, CellKind::Plain));
    let origin = at(&world, 0, 0);
    let target = at(&world, 4, 0);
    assert!(visibility::visible_cells(&world, origin, 4).contains(&target));

    let wall = at(&world, 2, 0);
    commit_obstacle(&mut world, wall);

    let visible = visibility::visible_cells(&world, origin, 4);
    assert!(!visible.contains(&target));
    assert!(visible.contains(&at(&world, 1, 0)));
}
