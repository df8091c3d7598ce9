//! Breadth-first path search over the grid's neighbour links.

use std::collections::VecDeque;

use lane_defense_core::{CellId, CellPath, PathOutcome};

use crate::{query, World};

const UNVISITED: u32 = u32::MAX;

/// Computes a shortest walk between `start` and `end` using live walkability.
#[must_use]
pub fn shortest_path(world: &World, start: CellId, end: CellId) -> PathOutcome {
    shortest_path_with(world, start, end, |cell| query::is_walkable(world, cell))
}

/// Computes a shortest walk between `start` and `end`.
///
/// The search expands in rings: ring zero holds `start`, ring `k + 1` holds
/// the unvisited neighbours of ring `k` accepted by `is_walkable`. The
/// endpoints are never filtered, so a walk may begin or end on a cell whose
/// walkability is about to change. Expansion stops as soon as `end` is
/// reached or a ring comes up empty. The walk is then rebuilt backwards by
/// stepping to any neighbour recorded one ring closer to `start`.
pub fn shortest_path_with<F>(
    world: &World,
    start: CellId,
    end: CellId,
    mut is_walkable: F,
) -> PathOutcome
where
    F: FnMut(CellId) -> bool,
{
    let cell_count = query::cell_count(world);
    if start.index() >= cell_count || end.index() >= cell_count {
        return PathOutcome::NotFound;
    }
    if start == end {
        return PathOutcome::Found(CellPath::new(vec![start]));
    }

    let mut ring_of = vec![UNVISITED; cell_count];
    ring_of[start.index()] = 0;
    let mut frontier = vec![start];
    let mut ring: u32 = 0;

    loop {
        let mut next = Vec::new();
        let mut reached_end = false;

        for &cell in &frontier {
            for &neighbor in query::neighbors(world, cell) {
                if neighbor != end && !is_walkable(neighbor) {
                    continue;
                }
                if neighbor == end {
                    reached_end = true;
                }
                if ring_of[neighbor.index()] == UNVISITED {
                    ring_of[neighbor.index()] = ring + 1;
                    next.push(neighbor);
                }
            }
        }

        ring += 1;
        if reached_end {
            break;
        }
        if next.is_empty() {
            return PathOutcome::NotFound;
        }
        frontier = next;
    }

    let mut cells = vec![end];
    let mut current = end;
    for previous_ring in (0..ring).rev() {
        let Some(&step) = query::neighbors(world, current)
            .iter()
            .find(|&&neighbor| ring_of[neighbor.index()] == previous_ring)
        else {
            return PathOutcome::NotFound;
        };
        cells.push(step);
        current = step;
    }
    cells.reverse();

    PathOutcome::Found(CellPath::new(cells))
}

/// Dense breadth-first distance grid seeded from a single origin.
///
/// Distances are graph distances over neighbour links accepted by the
/// passability predicate. Cells that were not reached report `None`.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    distances: Vec<u32>,
}

impl DistanceField {
    /// Expands from `origin` up to `max_distance` rings (unbounded when `None`).
    ///
    /// The origin is always seeded, regardless of `is_passable`.
    pub fn from_origin<F>(
        world: &World,
        origin: CellId,
        max_distance: Option<u32>,
        mut is_passable: F,
    ) -> Self
    where
        F: FnMut(CellId) -> bool,
    {
        let cell_count = query::cell_count(world);
        let mut distances = vec![UNVISITED; cell_count];
        if origin.index() >= cell_count {
            return Self { distances };
        }

        let limit = max_distance.unwrap_or(UNVISITED - 1);
        let mut queue = VecDeque::new();
        distances[origin.index()] = 0;
        queue.push_back(origin);

        while let Some(cell) = queue.pop_front() {
            let current_distance = distances[cell.index()];
            if current_distance >= limit {
                continue;
            }

            let next_distance = current_distance + 1;
            for &neighbor in query::neighbors(world, cell) {
                if distances[neighbor.index()] <= next_distance {
                    continue;
                }
                if !is_passable(neighbor) {
                    continue;
                }
                distances[neighbor.index()] = next_distance;
                queue.push_back(neighbor);
            }
        }

        Self { distances }
    }

    /// Distance captured for the provided cell, if it was reached.
    #[must_use]
    pub fn distance(&self, cell: CellId) -> Option<u32> {
        self.distances
            .get(cell.index())
            .copied()
            .filter(|&distance| distance != UNVISITED)
    }

    /// Iterator over every reached cell paired with its distance.
    pub fn reached(&self) -> impl Iterator<Item = (CellId, u32)> + '_ {
        self.distances
            .iter()
            .enumerate()
            .filter(|&(_, &distance)| distance != UNVISITED)
            .filter_map(|(index, &distance)| {
                u32::try_from(index)
                    .ok()
                    .map(|id| (CellId::new(id), distance))
            })
    }
}
