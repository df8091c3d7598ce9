#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defense engine.
//!
//! This crate defines the vocabulary that connects the authoritative grid,
//! the pure systems built on top of it, and the adapters that present it.
//! Cells are addressed by [`CellCoord`] when they come from the outside
//! world and by the opaque [`CellId`] once the grid has minted them. Cell
//! variants are resolved exactly once into [`Capabilities`]; the search and
//! visibility algorithms only ever consult the capability triple.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Overwrites the capability triple of a single cell.
    SetCapabilities {
        /// Cell whose flags are replaced.
        cell: CellId,
        /// Flags the cell carries after the command is applied.
        capabilities: Capabilities,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a cell's capability triple changed.
    CapabilitiesChanged {
        /// Cell whose flags were replaced.
        cell: CellId,
        /// Flags carried before the command.
        previous: Capabilities,
        /// Flags carried after the command.
        current: Capabilities,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the coordinate shifted by the provided deltas.
    ///
    /// Yields `None` when the shift would leave the non-negative quadrant;
    /// upper bounds are the grid's concern.
    #[must_use]
    pub fn offset(self, columns: i64, rows: i64) -> Option<CellCoord> {
        let column = u32::try_from(i64::from(self.column) + columns).ok()?;
        let row = u32::try_from(i64::from(self.row) + rows).ok()?;
        Some(CellCoord::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Opaque identity minted by the grid for each cell it owns.
///
/// Identities are allocated in construction order and never reused within
/// the lifetime of a single grid, even though coordinates may repeat across
/// rebuilt grids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Dense index suitable for addressing per-cell scratch buffers.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

/// Closed set of cell variants that can appear in a source layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Open ground that can be walked, seen through and built upon.
    Plain,
    /// Slot reserved for a tower; traversable but no longer buildable.
    Tower,
    /// Anchor cell that serves as a lane endpoint.
    Gate,
    /// Solid obstacle that blocks both movement and sight.
    Block,
    /// Occupied slot without any capability.
    Empty,
}

impl CellKind {
    /// Resolves the variant into the capability triple consulted by the algorithms.
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Plain => Capabilities::new(true, true, true),
            Self::Tower | Self::Gate => Capabilities::new(true, true, false),
            Self::Block | Self::Empty => Capabilities::inert(),
        }
    }
}

/// Capability flags carried by every cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    walkable: bool,
    see_through: bool,
    buildable: bool,
}

impl Capabilities {
    /// Creates a capability triple from explicit flags.
    #[must_use]
    pub const fn new(walkable: bool, see_through: bool, buildable: bool) -> Self {
        Self {
            walkable,
            see_through,
            buildable,
        }
    }

    /// Triple without any capability.
    #[must_use]
    pub const fn inert() -> Self {
        Self::new(false, false, false)
    }

    /// Triple committed to a cell once an obstacle has been placed on it.
    #[must_use]
    pub const fn obstacle() -> Self {
        Self::inert()
    }

    /// Reversible triple applied while an obstacle placement is evaluated.
    ///
    /// Walking and building are withdrawn; sight is left untouched until the
    /// placement commits.
    #[must_use]
    pub const fn tentative(self) -> Self {
        Self::new(false, self.see_through, false)
    }

    /// Whether an agent may occupy or traverse the cell.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Whether a line-of-sight sample may pass through the cell.
    #[must_use]
    pub const fn see_through(&self) -> bool {
        self.see_through
    }

    /// Whether an obstacle may be placed on the cell.
    #[must_use]
    pub const fn buildable(&self) -> bool {
        self.buildable
    }
}

/// Position of a gate within the grid's ordered gate registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateIndex(u32);

impl GateIndex {
    /// Creates a new gate index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for GateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gate #{}", self.0)
    }
}

/// Stable identifier of a reserved lane between two gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(u32);

impl LaneId {
    /// Creates a new lane identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane {}", self.0)
    }
}

/// Presentation tag handed to highlight hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl HighlightColor {
    /// Tag applied to the origin of a vision query.
    pub const SELECTION: Self = Self::from_rgb(0xff, 0xeb, 0x04);
    /// Tag applied to cells visible from a vision query origin.
    pub const VISIBLE: Self = Self::from_rgb(0x00, 0xff, 0x00);

    /// Creates a new highlight color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Ordered walk between two cells, endpoints included.
///
/// Consecutive cells are neighbours. An empty path marks a lane that has no
/// route yet; a single-cell path is the trivial walk from a cell to itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellPath {
    cells: Vec<CellId>,
}

impl CellPath {
    /// Wraps an ordered sequence of cells.
    #[must_use]
    pub fn new(cells: Vec<CellId>) -> Self {
        Self { cells }
    }

    /// Path that holds no cells.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Cells visited by the path in travel order.
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// First cell of the path, if any.
    #[must_use]
    pub fn start(&self) -> Option<CellId> {
        self.cells.first().copied()
    }

    /// Last cell of the path, if any.
    #[must_use]
    pub fn end(&self) -> Option<CellId> {
        self.cells.last().copied()
    }

    /// Number of moves needed to walk the path.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Reports whether the path holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the path visits the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }
}

/// Result of a shortest-path query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// A shortest walk between the requested cells.
    Found(CellPath),
    /// No walkable route connects the requested cells.
    NotFound,
}

impl PathOutcome {
    /// Converts the outcome into the discovered path, if any.
    #[must_use]
    pub fn into_path(self) -> Option<CellPath> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }

    /// Reports whether a route was discovered.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Replacement path for a lane, staged until an obstacle is committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathUpdate {
    /// Lane that receives the new path.
    pub lane: LaneId,
    /// Path that replaces the lane's stored path.
    pub path: CellPath,
}

/// Verdict returned when an obstacle is proposed on a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObstacleDecision {
    /// Every affected lane stays connected; the staged updates must be applied
    /// once the obstacle is committed.
    Accept {
        /// New paths for the lanes that crossed the proposed cell.
        updates: Vec<PathUpdate>,
    },
    /// At least one lane would lose its only route.
    Reject {
        /// Lanes that would be severed by the obstacle.
        severed: Vec<LaneId>,
    },
}

impl ObstacleDecision {
    /// Reports whether the obstacle may be committed.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept { .. })
    }
}

/// Errors raised while maintaining lane reservations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// An update referenced a lane that was never registered.
    #[error("{0} is not registered")]
    UnknownLane(LaneId),
}

/// Reasons an obstacle placement request may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// No cell occupies the requested coordinate.
    #[error("no cell at {0}")]
    MissingCell(CellCoord),
    /// The targeted cell does not accept obstacles.
    #[error("cell {0} is not buildable")]
    NotBuildable(CellCoord),
    /// Committing the obstacle would leave at least one lane without a route.
    #[error("an obstacle at {cell} would sever {} lane(s)", .lanes.len())]
    WouldSeverLanes {
        /// Cell that was proposed for the obstacle.
        cell: CellCoord,
        /// Lanes that would lose their only route.
        lanes: Vec<LaneId>,
    },
    /// Staged updates could not be applied to the reservations.
    #[error(transparent)]
    Reservation(#[from] ReservationError),
}

/// Presentation hooks invoked when the engine highlights cells.
///
/// The engine only calls these hooks; it never interprets their effect.
pub trait CellHighlighter {
    /// Marks the cell with the provided tag.
    fn select(&mut self, cell: CellId, color: HighlightColor);

    /// Restores the cell's default presentation.
    fn unselect(&mut self, cell: CellId);
}

/// Highlighter that discards every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHighlighter;

impl CellHighlighter for NullHighlighter {
    fn select(&mut self, _cell: CellId, _color: HighlightColor) {}

    fn unselect(&mut self, _cell: CellId) {}
}
