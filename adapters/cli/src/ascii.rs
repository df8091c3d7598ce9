//! Text rendering of the grid and its highlighted cells.

use std::collections::BTreeMap;

use lane_defense_core::{Capabilities, CellCoord, CellHighlighter, CellId, CellKind, HighlightColor};
use lane_defense_world::{query, World};

const ABSENT_GLYPH: char = '?';
const OBSTACLE_GLYPH: char = 'X';
const UNKNOWN_HIGHLIGHT_GLYPH: char = 'o';

/// Presentation adapter that records highlights and draws them as characters.
#[derive(Clone, Debug, Default)]
pub(crate) struct AsciiCanvas {
    highlights: BTreeMap<CellId, HighlightColor>,
    palette: Vec<(HighlightColor, char)>,
}

impl AsciiCanvas {
    /// Creates a canvas with the tool colours already assigned.
    pub(crate) fn new() -> Self {
        let mut canvas = Self::default();
        canvas.assign(HighlightColor::SELECTION, '@');
        canvas.assign(HighlightColor::VISIBLE, '*');
        canvas
    }

    /// Draws cells highlighted with `color` as `glyph`. The first assignment wins.
    pub(crate) fn assign(&mut self, color: HighlightColor, glyph: char) {
        if self.palette.iter().all(|&(existing, _)| existing != color) {
            self.palette.push((color, glyph));
        }
    }

    /// Number of highlighted cells.
    pub(crate) fn highlighted(&self) -> usize {
        self.highlights.len()
    }

    /// Renders the grid one row per line.
    pub(crate) fn render(&self, world: &World) -> String {
        let (columns, rows) = query::dimensions(world);
        let mut output = String::new();

        for row in 0..rows {
            for column in 0..columns {
                let glyph = match query::cell_at(world, CellCoord::new(column, row)) {
                    Some(cell) => self.glyph(world, cell),
                    None => ABSENT_GLYPH,
                };
                output.push(glyph);
            }
            output.push('\n');
        }

        output
    }

    fn glyph(&self, world: &World, cell: CellId) -> char {
        if let Some(color) = self.highlights.get(&cell) {
            return self
                .palette
                .iter()
                .find(|(candidate, _)| candidate == color)
                .map_or(UNKNOWN_HIGHLIGHT_GLYPH, |&(_, glyph)| glyph);
        }

        match query::kind(world, cell) {
            Some(CellKind::Plain)
                if query::capabilities(world, cell) == Some(Capabilities::obstacle()) =>
            {
                OBSTACLE_GLYPH
            }
            Some(CellKind::Plain) => '.',
            Some(CellKind::Tower) => 'T',
            Some(CellKind::Gate) => 'G',
            Some(CellKind::Block) => '#',
            Some(CellKind::Empty) => ' ',
            None => ABSENT_GLYPH,
        }
    }
}

impl CellHighlighter for AsciiCanvas {
    fn select(&mut self, cell: CellId, color: HighlightColor) {
        let _ = self.highlights.insert(cell, color);
    }

    fn unselect(&mut self, cell: CellId) {
        let _ = self.highlights.remove(&cell);
    }
}
