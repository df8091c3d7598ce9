#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Obstacle-placement workflow that never severs a reserved lane.
//!
//! A placement tentatively withdraws the cell's walkability, asks the lane
//! reservations whether every affected lane can be re-routed, and then either
//! commits the obstacle and applies the staged paths or restores the cell.

use lane_defense_core::{
    Capabilities, CellCoord, CellHighlighter, CellId, Command, Event, LaneId, ObstacleDecision,
    PlacementError,
};
use lane_defense_world::{self as world, query, reservations::PathReservations, World};
use tracing::{debug, warn};

/// Summary of a committed obstacle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementReport {
    /// Cell that received the obstacle.
    pub cell: CellId,
    /// Coordinate of the cell that received the obstacle.
    pub coord: CellCoord,
    /// Lanes whose paths were replaced to avoid the obstacle.
    pub rerouted: Vec<LaneId>,
}

/// Builder system that places obstacles on behalf of the player.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    accepted: u32,
    rejected: u32,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accepted: 0,
            rejected: 0,
        }
    }

    /// Attempts to place an obstacle on the cell at `coord`.
    ///
    /// Capability changes are reported through `out_events`, including the
    /// tentative mark and its reversal when the placement is refused.
    pub fn place_obstacle<H>(
        &mut self,
        world: &mut World,
        reservations: &mut PathReservations,
        coord: CellCoord,
        highlighter: &mut H,
        out_events: &mut Vec<Event>,
    ) -> Result<PlacementReport, PlacementError>
    where
        H: CellHighlighter + ?Sized,
    {
        let Some(cell) = query::cell_at(world, coord) else {
            self.rejected += 1;
            return Err(PlacementError::MissingCell(coord));
        };
        let previous = query::capabilities(world, cell).unwrap_or_else(Capabilities::inert);
        if !previous.buildable() {
            self.rejected += 1;
            return Err(PlacementError::NotBuildable(coord));
        }

        set_capabilities(world, cell, previous.tentative(), out_events);

        match reservations.check_obstacle(world, cell) {
            ObstacleDecision::Reject { severed } => {
                set_capabilities(world, cell, previous, out_events);
                self.rejected += 1;
                warn!(%coord, ?severed, "obstacle refused");
                Err(PlacementError::WouldSeverLanes {
                    cell: coord,
                    lanes: severed,
                })
            }
            ObstacleDecision::Accept { updates } => {
                set_capabilities(world, cell, Capabilities::obstacle(), out_events);
                let rerouted = updates.iter().map(|update| update.lane).collect();
                if let Err(error) = reservations.apply_updates(updates, highlighter) {
                    set_capabilities(world, cell, previous, out_events);
                    self.rejected += 1;
                    return Err(error.into());
                }
                self.accepted += 1;
                debug!(%coord, ?rerouted, "obstacle placed");
                Ok(PlacementReport {
                    cell,
                    coord,
                    rerouted,
                })
            }
        }
    }

    /// Number of obstacles committed by this builder.
    #[must_use]
    pub const fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Number of placement requests this builder refused.
    #[must_use]
    pub const fn rejected(&self) -> u32 {
        self.rejected
    }
}

fn set_capabilities(
    world: &mut World,
    cell: CellId,
    capabilities: Capabilities,
    out_events: &mut Vec<Event>,
) {
    world::apply(
        world,
        Command::SetCapabilities { cell, capabilities },
        out_events,
    );
}
