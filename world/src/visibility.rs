//! Range-limited line-of-sight queries over the grid.
//!
//! A query first collects every cell within `range` graph steps of the
//! origin, ignoring walkability, and then keeps the candidates whose straight
//! segment from the origin only crosses see-through cells.

use std::collections::BTreeSet;

use lane_defense_core::{CellCoord, CellId};

use crate::{navigation::DistanceField, query, World};

/// Cells whose graph distance from `origin` lies in `1..=range`.
///
/// The expansion follows every neighbour link, so the result is a Manhattan
/// disc clipped by absent slots. The origin itself is never included.
#[must_use]
pub fn cells_in_range(world: &World, origin: CellId, range: u32) -> BTreeSet<CellId> {
    if range == 0 {
        return BTreeSet::new();
    }

    DistanceField::from_origin(world, origin, Some(range), |_| true)
        .reached()
        .filter(|&(_, distance)| (1..=range).contains(&distance))
        .map(|(cell, _)| cell)
        .collect()
}

/// Cells visible from `origin` within `range`, judged by live see-through flags.
#[must_use]
pub fn visible_cells(world: &World, origin: CellId, range: u32) -> BTreeSet<CellId> {
    visible_cells_with(world, origin, range, |cell| {
        query::is_see_through(world, cell)
    })
}

/// Cells visible from `origin` within `range`.
///
/// A candidate is visible when every cell sampled along the segment from the
/// origin to it, the candidate included, passes `can_see_through`.
pub fn visible_cells_with<F>(
    world: &World,
    origin: CellId,
    range: u32,
    mut can_see_through: F,
) -> BTreeSet<CellId>
where
    F: FnMut(CellId) -> bool,
{
    let Some(from) = query::coord(world, origin) else {
        return BTreeSet::new();
    };

    cells_in_range(world, origin, range)
        .into_iter()
        .filter(|&candidate| {
            query::coord(world, candidate)
                .is_some_and(|to| line_is_clear(world, from, to, &mut can_see_through))
        })
        .collect()
}

/// Walks the sampled segment and reports whether no sample blocks sight.
///
/// Samples that land on an absent slot block sight.
fn line_is_clear<F>(
    world: &World,
    from: CellCoord,
    to: CellCoord,
    can_see_through: &mut F,
) -> bool
where
    F: FnMut(CellId) -> bool,
{
    let mut passes = |coord: CellCoord| {
        query::cell_at(world, coord).is_some_and(|cell| can_see_through(cell))
    };

    let steps = i64::from(from.manhattan_distance(to));
    let mut previous = from;

    for step in 1..=steps {
        let column = AxisSample::along(from.column(), to.column(), step, steps);
        let row = AxisSample::along(from.row(), to.row(), step, steps);

        let Some(resolved) = resolve_sample(column, row, previous, &mut passes) else {
            return false;
        };
        if !passes(resolved) {
            return false;
        }
        previous = resolved;
    }

    true
}

/// Position of a sample along one axis, kept in exact rational form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AxisSample {
    /// The sample rounds unambiguously to this lattice index.
    Whole(i64),
    /// The sample sits exactly halfway between `floor` and `floor + 1`.
    Half { floor: i64 },
}

impl AxisSample {
    /// Samples `from + (to - from) * step / steps` without leaving integers.
    fn along(from: u32, to: u32, step: i64, steps: i64) -> Self {
        let numerator = i64::from(from) * steps + (i64::from(to) - i64::from(from)) * step;
        let doubled = 2 * numerator;

        if doubled.rem_euclid(steps) == 0 {
            let twice = doubled.div_euclid(steps);
            if twice.rem_euclid(2) == 1 {
                return Self::Half {
                    floor: (twice - 1).div_euclid(2),
                };
            }
        }

        Self::Whole((doubled + steps).div_euclid(2 * steps))
    }

    /// Rounds a lone half-integer to the even neighbour.
    fn rounded(self) -> i64 {
        match self {
            Self::Whole(value) => value,
            Self::Half { floor } if floor.rem_euclid(2) == 0 => floor,
            Self::Half { floor } => floor + 1,
        }
    }
}

/// Maps a sample to the grid coordinate it is charged to.
///
/// When both axes sit on a half-integer the sample lies on a four-cell
/// corner. If the previous cell is strictly greater on both axes the line
/// runs along the `/` pair (`floor, ceil` and `ceil, floor`), otherwise along
/// the `\` pair (`floor, floor` and `ceil, ceil`). Within the pair the first
/// cell wins only when it passes and the second does not.
fn resolve_sample<P>(
    column: AxisSample,
    row: AxisSample,
    previous: CellCoord,
    passes: &mut P,
) -> Option<CellCoord>
where
    P: FnMut(CellCoord) -> bool,
{
    let (AxisSample::Half { floor: x }, AxisSample::Half { floor: y }) = (column, row) else {
        return lattice(column.rounded(), row.rounded());
    };

    let slash = i64::from(previous.column()) > x && i64::from(previous.row()) > y;
    let (preferred, fallback) = if slash {
        (lattice(x, y + 1), lattice(x + 1, y))
    } else {
        (lattice(x + 1, y + 1), lattice(x, y))
    };

    let preferred_passes = preferred.is_some_and(|coord| passes(coord));
    let fallback_passes = fallback.is_some_and(|coord| passes(coord));
    if preferred_passes && !fallback_passes {
        preferred
    } else {
        fallback
    }
}

fn lattice(column: i64, row: i64) -> Option<CellCoord> {
    Some(CellCoord::new(
        u32::try_from(column).ok()?,
        u32::try_from(row).ok()?,
    ))
}
