use std::collections::BTreeMap;

use lane_defense_core::{
    CellCoord, CellHighlighter, CellId, CellKind, GateIndex, HighlightColor, LaneId,
    NullHighlighter,
};
use lane_defense_system_bootstrap::{Bootstrap, BootstrapError, LaneSpec};
use lane_defense_world::{query, GridLayout};

const RED: HighlightColor = HighlightColor::from_rgb(0xff, 0, 0);

#[derive(Default)]
struct Recorder {
    selected: BTreeMap<CellId, HighlightColor>,
}

impl CellHighlighter for Recorder {
    fn select(&mut self, cell: CellId, color: HighlightColor) {
        let _ = self.selected.insert(cell, color);
    }

    fn unselect(&mut self, cell: CellId) {
        let _ = self.selected.remove(&cell);
    }
}

fn legend(symbol: char) -> Option<CellKind> {
    match symbol {
        'G' => Some(CellKind::Gate),
        '#' => Some(CellKind::Block),
        _ => Some(CellKind::Plain),
    }
}

fn lane(id: u32, start: u32, end: u32) -> LaneSpec {
    LaneSpec {
        id: LaneId::new(id),
        start_gate: GateIndex::new(start),
        end_gate: GateIndex::new(end),
        highlight: RED,
    }
}

#[test]
fn lanes_connect_gates_in_registry_order() {
    let layout = GridLayout::from_text("G...\n.##.\n...G", legend).expect("layout");
    let mut highlighter = Recorder::default();

    let session = Bootstrap
        .initialise(&layout, &[lane(0, 0, 1)], &mut highlighter)
        .expect("both gates exist");

    let path = session
        .reservations
        .path(LaneId::new(0))
        .expect("lane registered");
    let start = query::cell_at(&session.world, CellCoord::new(0, 0));
    let end = query::cell_at(&session.world, CellCoord::new(3, 2));
    assert_eq!(path.start(), start);
    assert_eq!(path.end(), end);
    assert_eq!(path.steps(), 5);
    assert_eq!(highlighter.selected.len(), path.cells().len());
    assert!(highlighter.selected.values().all(|&color| color == RED));
}

#[test]
fn unknown_gate_aborts_before_registering_anything() {
    let layout = GridLayout::from_text("G..G", legend).expect("layout");
    let mut highlighter = Recorder::default();

    let error = Bootstrap
        .initialise(&layout, &[lane(0, 0, 1), lane(1, 0, 2)], &mut highlighter)
        .expect_err("gate #2 does not exist");

    assert_eq!(
        error,
        BootstrapError::MissingGate {
            lane: LaneId::new(1),
            gate: GateIndex::new(2),
            available: 2,
        }
    );
    assert!(highlighter.selected.is_empty());
}

#[test]
fn walled_off_gates_register_an_empty_lane() {
    let layout = GridLayout::from_text("G#G", legend).expect("layout");

    let session = Bootstrap
        .initialise(&layout, &[lane(3, 0, 1)], &mut NullHighlighter)
        .expect("gates exist");

    assert_eq!(
        session.reservations.path(LaneId::new(3)).map(|path| path.is_empty()),
        Some(true)
    );
}
