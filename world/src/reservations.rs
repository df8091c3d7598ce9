//! Lane reservations that keep enemy paths connected while obstacles are placed.
//!
//! Placing an obstacle is a two-phase protocol. [`PathReservations::check_obstacle`]
//! evaluates the proposal against the current grid without touching any
//! stored path and either rejects it or stages replacement paths. The caller
//! commits the obstacle to the world and only then hands the staged updates
//! to [`PathReservations::apply_updates`].

use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use lane_defense_core::{
    CellHighlighter, CellId, CellPath, HighlightColor, LaneId, ObstacleDecision, PathUpdate,
    ReservationError,
};
use tracing::{debug, error, info};

use crate::{navigation, query, World};

/// Reserved route between two gates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lane {
    start: CellId,
    end: CellId,
    highlight: HighlightColor,
    path: CellPath,
}

impl Lane {
    /// Cell the lane departs from.
    #[must_use]
    pub const fn start(&self) -> CellId {
        self.start
    }

    /// Cell the lane arrives at.
    #[must_use]
    pub const fn end(&self) -> CellId {
        self.end
    }

    /// Tag used when highlighting the lane's path.
    #[must_use]
    pub const fn highlight(&self) -> HighlightColor {
        self.highlight
    }

    /// Path currently committed to the lane; empty while no route exists.
    #[must_use]
    pub fn path(&self) -> &CellPath {
        &self.path
    }
}

/// Registry of lanes whose paths must survive obstacle placement.
#[derive(Clone, Debug, Default)]
pub struct PathReservations {
    lanes: BTreeMap<LaneId, Lane>,
}

impl PathReservations {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lane and computes its initial path.
    ///
    /// When no route exists yet the lane is stored with an empty path.
    /// Registering an existing identifier replaces that lane.
    pub fn register<H>(
        &mut self,
        world: &World,
        id: LaneId,
        start: CellId,
        end: CellId,
        highlight: HighlightColor,
        highlighter: &mut H,
    ) -> &CellPath
    where
        H: CellHighlighter + ?Sized,
    {
        let path = navigation::shortest_path(world, start, end)
            .into_path()
            .unwrap_or_default();
        debug!(
            lane = %id,
            steps = path.steps(),
            routed = !path.is_empty(),
            "registered lane"
        );

        let lane = Lane {
            start,
            end,
            highlight,
            path,
        };
        let cleared: BTreeSet<CellId> = self
            .lanes
            .get(&id)
            .map(|previous| previous.path.cells().iter().copied().collect())
            .unwrap_or_default();
        for &cell in &cleared {
            highlighter.unselect(cell);
        }
        for (_, other) in self.lanes.iter().filter(|&(&other_id, _)| other_id != id) {
            for &cell in other.path.cells().iter().filter(|cell| cleared.contains(*cell)) {
                highlighter.select(cell, other.highlight);
            }
        }
        highlight_path(&lane, highlighter);

        match self.lanes.entry(id) {
            Entry::Occupied(slot) => {
                let stored = slot.into_mut();
                *stored = lane;
                &stored.path
            }
            Entry::Vacant(slot) => &slot.insert(lane).path,
        }
    }

    /// Evaluates an obstacle on `cell` without mutating any lane.
    ///
    /// Every lane whose path visits `cell` is re-routed as if `cell` were no
    /// longer walkable; the remaining cells keep their live flags. The
    /// obstacle is rejected if any of those lanes loses its route.
    #[must_use]
    pub fn check_obstacle(&self, world: &World, cell: CellId) -> ObstacleDecision {
        let mut updates = Vec::new();
        let mut severed = Vec::new();

        for (&id, lane) in &self.lanes {
            if !lane.path.contains(cell) {
                continue;
            }

            let outcome =
                navigation::shortest_path_with(world, lane.start, lane.end, |candidate| {
                    candidate != cell && query::is_walkable(world, candidate)
                });
            match outcome.into_path() {
                Some(path) => updates.push(PathUpdate { lane: id, path }),
                None => severed.push(id),
            }
        }

        if severed.is_empty() {
            debug!(affected = updates.len(), "obstacle accepted");
            ObstacleDecision::Accept { updates }
        } else {
            info!(?severed, "obstacle would sever lanes");
            ObstacleDecision::Reject { severed }
        }
    }

    /// Replaces the stored paths named by `updates` and refreshes highlights.
    ///
    /// Every lane is validated before any path changes; an unknown lane means
    /// the updates did not come from an accepted decision on this registry.
    /// Lanes not named by `updates` keep their paths and highlights.
    pub fn apply_updates<H>(
        &mut self,
        updates: Vec<PathUpdate>,
        highlighter: &mut H,
    ) -> Result<(), ReservationError>
    where
        H: CellHighlighter + ?Sized,
    {
        if let Some(unknown) = updates
            .iter()
            .find(|update| !self.lanes.contains_key(&update.lane))
        {
            error!(lane = %unknown.lane, "update references an unregistered lane");
            debug_assert!(
                self.lanes.contains_key(&unknown.lane),
                "update references unregistered {}",
                unknown.lane
            );
            return Err(ReservationError::UnknownLane(unknown.lane));
        }

        let mut cleared = BTreeSet::new();
        let mut touched = BTreeSet::new();
        for update in updates {
            let Some(lane) = self.lanes.get_mut(&update.lane) else {
                continue;
            };
            for &cell in lane.path.cells() {
                highlighter.unselect(cell);
                let _ = cleared.insert(cell);
            }
            lane.path = update.path;
            let _ = touched.insert(update.lane);
            debug!(lane = %update.lane, steps = lane.path.steps(), "lane re-routed");
        }

        for (id, lane) in &self.lanes {
            if touched.contains(id) {
                highlight_path(lane, highlighter);
                continue;
            }
            for &cell in lane.path.cells().iter().filter(|cell| cleared.contains(*cell)) {
                highlighter.select(cell, lane.highlight);
            }
        }

        Ok(())
    }

    /// Recomputes every lane from the live grid flags.
    pub fn recompute_all<H>(&mut self, world: &World, highlighter: &mut H)
    where
        H: CellHighlighter + ?Sized,
    {
        let updates = self
            .lanes
            .iter()
            .map(|(&lane, entry)| PathUpdate {
                lane,
                path: navigation::shortest_path(world, entry.start, entry.end)
                    .into_path()
                    .unwrap_or_default(),
            })
            .collect();

        if let Err(error) = self.apply_updates(updates, highlighter) {
            error!(%error, "recomputed lanes drifted from the registry");
        }
    }

    /// Lane registered under the provided identifier.
    #[must_use]
    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(&id)
    }

    /// Path currently committed to the provided lane.
    #[must_use]
    pub fn path(&self, id: LaneId) -> Option<&CellPath> {
        self.lanes.get(&id).map(Lane::path)
    }

    /// Iterator over every lane in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (LaneId, &Lane)> {
        self.lanes.iter().map(|(&id, lane)| (id, lane))
    }

    /// Number of registered lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Reports whether no lane is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

fn highlight_path<H>(lane: &Lane, highlighter: &mut H)
where
    H: CellHighlighter + ?Sized,
{
    for &cell in lane.path.cells() {
        highlighter.select(cell, lane.highlight);
    }
}
