#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for Lane Defense.
//!
//! The [`World`] owns every cell minted from a [`GridLayout`] together with
//! its four-directional neighbour links. Links are fixed at construction;
//! only capability flags change afterwards, and only through [`apply`].
//! Path search, visibility and lane reservations live in the
//! [`navigation`], [`visibility`] and [`reservations`] modules and read the
//! world through [`query`].

pub mod navigation;
pub mod reservations;
pub mod visibility;

use lane_defense_core::{Capabilities, CellCoord, CellId, CellKind, Command, Event};
use thiserror::Error;
use tracing::{debug, trace};

/// Character used by [`GridLayout::from_text`] for a slot without a cell.
pub const ABSENT_SLOT: char = '?';

/// Errors raised while assembling a [`GridLayout`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The coordinate lies outside the layout's dimensions.
    #[error("{coord} lies outside a {columns}x{rows} layout")]
    OutOfBounds {
        /// Offending coordinate.
        coord: CellCoord,
        /// Layout width in cells.
        columns: u32,
        /// Layout height in cells.
        rows: u32,
    },
    /// The layout text did not contain any row.
    #[error("layout text is empty")]
    Empty,
}

/// Typed source grid consumed by [`World::build`].
///
/// Slots are stored in row-major order; `None` marks a position without a
/// cell, which is distinct from a present [`CellKind::Empty`] cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridLayout {
    columns: u32,
    rows: u32,
    slots: Vec<Option<CellKind>>,
}

impl GridLayout {
    /// Creates a layout of the provided size with every slot absent.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let len = slot_count(columns, rows);
        Self {
            columns,
            rows,
            slots: vec![None; len],
        }
    }

    /// Creates a layout of the provided size filled with a single kind.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, kind: CellKind) -> Self {
        let len = slot_count(columns, rows);
        Self {
            columns,
            rows,
            slots: vec![Some(kind); len],
        }
    }

    /// Parses a layout from text, one grid row per line.
    ///
    /// Every character is resolved through `legend`; [`ABSENT_SLOT`] and
    /// characters the legend maps to `None` leave the slot empty. Rows shorter
    /// than the widest row are padded with absent slots.
    pub fn from_text<F>(text: &str, mut legend: F) -> Result<Self, LayoutError>
    where
        F: FnMut(char) -> Option<CellKind>,
    {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err(LayoutError::Empty);
        }

        let columns = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let columns = u32::try_from(columns).unwrap_or(u32::MAX);
        let rows = u32::try_from(lines.len()).unwrap_or(u32::MAX);
        let mut layout = Self::new(columns, rows);

        for (row, line) in (0..rows).zip(lines) {
            for (column, symbol) in (0..columns).zip(line.chars()) {
                if symbol == ABSENT_SLOT {
                    continue;
                }
                layout.set(CellCoord::new(column, row), legend(symbol))?;
            }
        }

        Ok(layout)
    }

    /// Replaces the slot at the provided coordinate.
    pub fn set(&mut self, coord: CellCoord, kind: Option<CellKind>) -> Result<(), LayoutError> {
        let index = self.index(coord).ok_or(LayoutError::OutOfBounds {
            coord,
            columns: self.columns,
            rows: self.rows,
        })?;
        self.slots[index] = kind;
        Ok(())
    }

    /// Kind stored at the provided coordinate; `None` for absent or out-of-bounds slots.
    #[must_use]
    pub fn get(&self, coord: CellCoord) -> Option<CellKind> {
        self.index(coord).and_then(|index| self.slots[index])
    }

    /// Dimensions of the layout as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        dense_index(self.columns, self.rows, coord)
    }
}

#[derive(Clone, Debug)]
struct CellState {
    coord: CellCoord,
    kind: CellKind,
    capabilities: Capabilities,
    neighbors: Vec<CellId>,
}

/// Represents the authoritative Lane Defense grid.
#[derive(Clone, Debug)]
pub struct World {
    columns: u32,
    rows: u32,
    slots: Vec<Option<CellId>>,
    cells: Vec<CellState>,
    gates: Vec<CellId>,
}

impl World {
    /// Builds the grid described by `layout` and links every cell to its
    /// axis-aligned neighbours.
    ///
    /// Cells are minted column by column. Gates are registered in the same
    /// order, which defines their [`lane_defense_core::GateIndex`].
    #[must_use]
    pub fn build(layout: &GridLayout) -> Self {
        let (columns, rows) = layout.dimensions();
        let mut world = Self {
            columns,
            rows,
            slots: vec![None; slot_count(columns, rows)],
            cells: Vec::new(),
            gates: Vec::new(),
        };

        for column in 0..columns {
            for row in 0..rows {
                let coord = CellCoord::new(column, row);
                let Some(kind) = layout.get(coord) else {
                    trace!(%coord, "no cell in layout slot");
                    continue;
                };

                let id = CellId::new(u32::try_from(world.cells.len()).unwrap_or(u32::MAX));
                if let Some(index) = dense_index(columns, rows, coord) {
                    world.slots[index] = Some(id);
                }
                if kind == CellKind::Gate {
                    world.gates.push(id);
                }
                world.cells.push(CellState {
                    coord,
                    kind,
                    capabilities: kind.capabilities(),
                    neighbors: Vec::new(),
                });
            }
        }

        world.link_neighbors();

        debug!(
            columns,
            rows,
            cells = world.cells.len(),
            gates = world.gates.len(),
            "built grid"
        );
        world
    }

    fn link_neighbors(&mut self) {
        for index in 0..self.cells.len() {
            let coord = self.cells[index].coord;
            let neighbors: Vec<CellId> = [(0, 1), (0, -1), (1, 0), (-1, 0)]
                .into_iter()
                .filter_map(|(columns, rows)| coord.offset(columns, rows))
                .filter_map(|candidate| self.cell_at(candidate))
                .collect();
            self.cells[index].neighbors = neighbors;
        }
    }

    fn cell_at(&self, coord: CellCoord) -> Option<CellId> {
        dense_index(self.columns, self.rows, coord).and_then(|index| self.slots[index])
    }

    fn state(&self, cell: CellId) -> Option<&CellState> {
        self.cells.get(cell.index())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetCapabilities { cell, capabilities } => {
            let Some(state) = world.cells.get_mut(cell.index()) else {
                return;
            };
            let previous = state.capabilities;
            if previous == capabilities {
                return;
            }
            state.capabilities = capabilities;
            trace!(coord = %state.coord, ?previous, ?capabilities, "capabilities changed");
            out_events.push(Event::CapabilitiesChanged {
                cell,
                previous,
                current: capabilities,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lane_defense_core::{Capabilities, CellCoord, CellId, CellKind, GateIndex};

    use super::World;

    /// Dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }

    /// Number of cells minted by the grid.
    #[must_use]
    pub fn cell_count(world: &World) -> usize {
        world.cells.len()
    }

    /// Cell occupying the provided coordinate.
    ///
    /// Out-of-bounds coordinates and absent slots both yield `None`.
    #[must_use]
    pub fn cell_at(world: &World, coord: CellCoord) -> Option<CellId> {
        world.cell_at(coord)
    }

    /// Coordinate of the provided cell.
    #[must_use]
    pub fn coord(world: &World, cell: CellId) -> Option<CellCoord> {
        world.state(cell).map(|state| state.coord)
    }

    /// Variant the cell was built from.
    #[must_use]
    pub fn kind(world: &World, cell: CellId) -> Option<CellKind> {
        world.state(cell).map(|state| state.kind)
    }

    /// Live capability triple of the provided cell.
    #[must_use]
    pub fn capabilities(world: &World, cell: CellId) -> Option<Capabilities> {
        world.state(cell).map(|state| state.capabilities)
    }

    /// Reports whether the cell can currently be walked.
    #[must_use]
    pub fn is_walkable(world: &World, cell: CellId) -> bool {
        capabilities(world, cell).is_some_and(|flags| flags.walkable())
    }

    /// Reports whether the cell currently lets sight pass.
    #[must_use]
    pub fn is_see_through(world: &World, cell: CellId) -> bool {
        capabilities(world, cell).is_some_and(|flags| flags.see_through())
    }

    /// Axis-aligned neighbours of the provided cell.
    #[must_use]
    pub fn neighbors(world: &World, cell: CellId) -> &[CellId] {
        world
            .state(cell)
            .map(|state| state.neighbors.as_slice())
            .unwrap_or_default()
    }

    /// Iterator over every cell in identity order.
    pub fn cells(world: &World) -> impl Iterator<Item = CellId> + '_ {
        (0..world.cells.len())
            .filter_map(|index| u32::try_from(index).ok())
            .map(CellId::new)
    }

    /// Cell registered under the provided gate index.
    #[must_use]
    pub fn gate(world: &World, index: GateIndex) -> Option<CellId> {
        let index = usize::try_from(index.get()).ok()?;
        world.gates.get(index).copied()
    }

    /// Gate registry in index order.
    #[must_use]
    pub fn gates(world: &World) -> &[CellId] {
        &world.gates
    }
}

fn slot_count(columns: u32, rows: u32) -> usize {
    let columns = usize::try_from(columns).unwrap_or(0);
    let rows = usize::try_from(rows).unwrap_or(0);
    columns.checked_mul(rows).unwrap_or(0)
}

fn dense_index(columns: u32, rows: u32, coord: CellCoord) -> Option<usize> {
    if coord.column() >= columns || coord.row() >= rows {
        return None;
    }
    let width = usize::try_from(columns).ok()?;
    let column = usize::try_from(coord.column()).ok()?;
    let row = usize::try_from(coord.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
