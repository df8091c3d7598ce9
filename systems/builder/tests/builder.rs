use std::collections::BTreeMap;

use lane_defense_core::{
    Capabilities, CellCoord, CellHighlighter, CellId, CellKind, Event, HighlightColor, LaneId,
    NullHighlighter, PlacementError,
};
use lane_defense_system_builder::Builder;
use lane_defense_world::{query, reservations::PathReservations, GridLayout, World};

const LANE: LaneId = LaneId::new(0);
const LANE_COLOR: HighlightColor = HighlightColor::from_rgb(0xc8, 0x2a, 0x36);

#[derive(Default)]
struct RecordingHighlighter {
    selected: BTreeMap<CellId, HighlightColor>,
}

impl CellHighlighter for RecordingHighlighter {
    fn select(&mut self, cell: CellId, color: HighlightColor) {
        let _ = self.selected.insert(cell, color);
    }

    fn unselect(&mut self, cell: CellId) {
        let _ = self.selected.remove(&cell);
    }
}

fn at(world: &World, column: u32, row: u32) -> CellId {
    query::cell_at(world, CellCoord::new(column, row)).expect("cell inside grid")
}

fn lane_world(
    columns: u32,
    rows: u32,
    highlighter: &mut RecordingHighlighter,
) -> (World, PathReservations) {
    let world = World::build(&GridLayout::filled(columns, rows, CellKind::Plain));
    let mut reservations = PathReservations::new();
    let _ = reservations.register(
        &world,
        LANE,
        at(&world, 0, 0),
        at(&world, 0, rows - 1),
        LANE_COLOR,
        highlighter,
    );
    (world, reservations)
}

#[test]
fn obstacle_on_lane_is_committed_and_lane_rerouted() {
    let mut highlighter = RecordingHighlighter::default();
    let (mut world, mut reservations) = lane_world(2, 5, &mut highlighter);
    let mut builder = Builder::new();
    let mut events = Vec::new();

    let report = builder
        .place_obstacle(
            &mut world,
            &mut reservations,
            CellCoord::new(0, 2),
            &mut highlighter,
            &mut events,
        )
        .expect("second column keeps the lane open");

    let blocked = at(&world, 0, 2);
    assert_eq!(report.cell, blocked);
    assert_eq!(report.rerouted, vec![LANE]);
    assert_eq!(
        query::capabilities(&world, blocked),
        Some(Capabilities::obstacle())
    );
    assert_eq!(events.len(), 2, "tentative mark followed by the commit");

    let path = reservations.path(LANE).expect("lane registered");
    assert_eq!(path.steps(), 6);
    assert!(!path.contains(blocked));
    assert!(!highlighter.selected.contains_key(&blocked));
    assert!(path
        .cells()
        .iter()
        .all(|cell| highlighter.selected.get(cell) == Some(&LANE_COLOR)));
    assert_eq!(highlighter.selected.len(), path.cells().len());
    assert_eq!((builder.accepted(), builder.rejected()), (1, 0));
}

#[test]
fn obstacle_that_severs_a_lane_is_reverted() {
    let mut highlighter = RecordingHighlighter::default();
    let (mut world, mut reservations) = lane_world(1, 5, &mut highlighter);
    let before = reservations.path(LANE).cloned();
    let highlighted = highlighter.selected.clone();
    let mut builder = Builder::new();
    let mut events = Vec::new();

    let error = builder
        .place_obstacle(
            &mut world,
            &mut reservations,
            CellCoord::new(0, 2),
            &mut highlighter,
            &mut events,
        )
        .expect_err("corridor has no alternative");

    assert_eq!(
        error,
        PlacementError::WouldSeverLanes {
            cell: CellCoord::new(0, 2),
            lanes: vec![LANE],
        }
    );
    let blocked = at(&world, 0, 2);
    assert_eq!(
        query::capabilities(&world, blocked),
        Some(CellKind::Plain.capabilities())
    );
    assert!(matches!(
        events.as_slice(),
        [
            Event::CapabilitiesChanged { current: tentative, .. },
            Event::CapabilitiesChanged { current: restored, .. },
        ] if !tentative.walkable() && restored.walkable()
    ));
    assert_eq!(reservations.path(LANE).cloned(), before);
    assert_eq!(highlighter.selected, highlighted);
    assert_eq!((builder.accepted(), builder.rejected()), (0, 1));
}

#[test]
fn obstacle_off_every_lane_reroutes_nothing() {
    let mut highlighter = RecordingHighlighter::default();
    let (mut world, mut reservations) = lane_world(3, 3, &mut highlighter);
    let before = reservations.path(LANE).cloned();
    let mut builder = Builder::new();

    let report = builder
        .place_obstacle(
            &mut world,
            &mut reservations,
            CellCoord::new(2, 2),
            &mut highlighter,
            &mut Vec::new(),
        )
        .expect("cell is off the lane");

    assert!(report.rerouted.is_empty());
    assert_eq!(reservations.path(LANE).cloned(), before);
    assert!(!query::is_walkable(&world, at(&world, 2, 2)));
}

#[test]
fn placement_requires_an_existing_buildable_cell() {
    let layout = GridLayout::from_text("G..\n..?", |symbol| match symbol {
        'G' => Some(CellKind::Gate),
        '?' => None,
        _ => Some(CellKind::Plain),
    })
    .expect("layout");
    let mut world = World::build(&layout);
    let mut reservations = PathReservations::new();
    let mut builder = Builder::new();
    let mut events = Vec::new();

    let gate = builder.place_obstacle(
        &mut world,
        &mut reservations,
        CellCoord::new(0, 0),
        &mut NullHighlighter,
        &mut events,
    );
    let absent = builder.place_obstacle(
        &mut world,
        &mut reservations,
        CellCoord::new(2, 1),
        &mut NullHighlighter,
        &mut events,
    );
    let outside = builder.place_obstacle(
        &mut world,
        &mut reservations,
        CellCoord::new(9, 9),
        &mut NullHighlighter,
        &mut events,
    );

    assert_eq!(gate, Err(PlacementError::NotBuildable(CellCoord::new(0, 0))));
    assert_eq!(absent, Err(PlacementError::MissingCell(CellCoord::new(2, 1))));
    assert_eq!(outside, Err(PlacementError::MissingCell(CellCoord::new(9, 9))));
    assert!(events.is_empty());
    assert_eq!(builder.rejected(), 3);
}

#[test]
fn committed_obstacle_cannot_be_built_on_again() {
    let mut highlighter = RecordingHighlighter::default();
    let (mut world, mut reservations) = lane_world(3, 3, &mut highlighter);
    let mut builder = Builder::new();
    let coord = CellCoord::new(2, 1);

    let first = builder.place_obstacle(
        &mut world,
        &mut reservations,
        coord,
        &mut highlighter,
        &mut Vec::new(),
    );
    let second = builder.place_obstacle(
        &mut world,
        &mut reservations,
        coord,
        &mut highlighter,
        &mut Vec::new(),
    );

    assert!(first.is_ok());
    assert_eq!(second, Err(PlacementError::NotBuildable(coord)));
}
