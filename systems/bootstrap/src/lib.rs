#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that wires a typed layout into a playable grid.
//!
//! The grid is built first, then every configured lane is resolved against
//! the gate registry and registered with a fresh set of reservations.

use lane_defense_core::{CellHighlighter, GateIndex, HighlightColor, LaneId};
use lane_defense_world::{query, reservations::PathReservations, GridLayout, World};
use thiserror::Error;
use tracing::{info, warn};

/// Lane requested between two entries of the gate registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneSpec {
    /// Identifier the lane is registered under.
    pub id: LaneId,
    /// Gate the lane departs from.
    pub start_gate: GateIndex,
    /// Gate the lane arrives at.
    pub end_gate: GateIndex,
    /// Tag used when highlighting the lane's path.
    pub highlight: HighlightColor,
}

/// Errors raised while wiring lanes to the grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// A lane referenced a gate the layout does not contain.
    #[error("{lane} references {gate}, but the layout only has {available} gate(s)")]
    MissingGate {
        /// Lane whose configuration is invalid.
        lane: LaneId,
        /// Gate index that could not be resolved.
        gate: GateIndex,
        /// Number of gates found in the layout.
        available: usize,
    },
}

/// Grid and reservations produced by [`Bootstrap::initialise`].
#[derive(Debug)]
pub struct Session {
    /// Authoritative grid built from the layout.
    pub world: World,
    /// Lanes registered against the grid's gates.
    pub reservations: PathReservations,
}

/// Produces the initial grid and lane reservations.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Builds the grid and registers every lane.
    ///
    /// All gate references are validated before any lane is registered, so a
    /// failed bootstrap never highlights anything.
    pub fn initialise<H>(
        &self,
        layout: &GridLayout,
        lanes: &[LaneSpec],
        highlighter: &mut H,
    ) -> Result<Session, BootstrapError>
    where
        H: CellHighlighter + ?Sized,
    {
        let world = World::build(layout);
        let available = query::gates(&world).len();

        let mut endpoints = Vec::with_capacity(lanes.len());
        for spec in lanes {
            let resolve = |gate: GateIndex| {
                query::gate(&world, gate).ok_or(BootstrapError::MissingGate {
                    lane: spec.id,
                    gate,
                    available,
                })
            };
            endpoints.push((spec, resolve(spec.start_gate)?, resolve(spec.end_gate)?));
        }

        let mut reservations = PathReservations::new();
        for (spec, start, end) in endpoints {
            let path =
                reservations.register(&world, spec.id, start, end, spec.highlight, highlighter);
            if path.is_empty() {
                warn!(lane = %spec.id, "lane has no route between its gates yet");
            }
        }

        info!(
            cells = query::cell_count(&world),
            gates = available,
            lanes = reservations.len(),
            "session initialised"
        );
        Ok(Session {
            world,
            reservations,
        })
    }
}
