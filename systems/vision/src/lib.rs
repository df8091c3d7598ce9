#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Vision-range inspection tool.
//!
//! Selecting a cell highlights it together with every cell it can see within
//! the configured range. Selecting the same cell again clears the display.

use std::collections::BTreeSet;

use lane_defense_core::{CellHighlighter, CellId, HighlightColor};
use lane_defense_world::{query, visibility, World};
use tracing::debug;

/// Cells highlighted by the most recent selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisionSelection {
    /// Cell the view was computed from.
    pub origin: CellId,
    /// Cells visible from the origin, excluding the origin itself.
    pub visible: BTreeSet<CellId>,
}

/// Toggleable vision display with a fixed range.
#[derive(Clone, Debug)]
pub struct VisionRange {
    range: u32,
    selected: Option<CellId>,
}

impl VisionRange {
    /// Creates a tool that inspects `range` graph steps around the selection.
    #[must_use]
    pub const fn new(range: u32) -> Self {
        Self {
            range,
            selected: None,
        }
    }

    /// Range used for every selection.
    #[must_use]
    pub const fn range(&self) -> u32 {
        self.range
    }

    /// Cell currently selected, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<CellId> {
        self.selected
    }

    /// Toggles the selection on `cell`.
    ///
    /// Every cell of the grid is unselected first. Selecting the cell that is
    /// already selected leaves the display empty and returns `None`.
    pub fn toggle<H>(
        &mut self,
        world: &World,
        cell: CellId,
        highlighter: &mut H,
    ) -> Option<VisionSelection>
    where
        H: CellHighlighter + ?Sized,
    {
        for existing in query::cells(world) {
            highlighter.unselect(existing);
        }

        if self.selected.take() == Some(cell) {
            debug!(cell = cell.get(), "vision selection cleared");
            return None;
        }
        if query::coord(world, cell).is_none() {
            return None;
        }

        let visible = visibility::visible_cells(world, cell, self.range);
        highlighter.select(cell, HighlightColor::SELECTION);
        for &seen in &visible {
            highlighter.select(seen, HighlightColor::VISIBLE);
        }
        self.selected = Some(cell);
        debug!(
            cell = cell.get(),
            range = self.range,
            visible = visible.len(),
            "vision selection updated"
        );

        Some(VisionSelection {
            origin: cell,
            visible,
        })
    }
}
