#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting lane-defense maps.

mod ascii;
mod config;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lane_defense_core::{CellCoord, CellId, PathOutcome};
use lane_defense_system_bootstrap::{Bootstrap, Session};
use lane_defense_system_builder::Builder;
use lane_defense_system_vision::VisionRange;
use lane_defense_world::{navigation, query, GridLayout, World};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{ascii::AsciiCanvas, config::Config};

/// Inspect paths, sight lines and obstacle placement on a lane-defense map.
#[derive(Debug, Parser)]
#[command(name = "lane-defense", version)]
struct Cli {
    /// Configuration file; the built-in configuration is used when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(short, long)]
    verbose: bool,
    /// Text map, one grid row per line.
    map: PathBuf,
    #[command(subcommand)]
    command: Action,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
enum Action {
    /// Print the shortest walk between two cells.
    Path {
        /// Start cell as `column,row`.
        #[arg(value_parser = parse_coord)]
        from: CellCoord,
        /// End cell as `column,row`.
        #[arg(value_parser = parse_coord)]
        to: CellCoord,
    },
    /// Render the cells visible from a cell.
    Visible {
        /// Origin cell as `column,row`.
        #[arg(value_parser = parse_coord)]
        origin: CellCoord,
        /// Range in graph steps; defaults to the configured range.
        #[arg(long)]
        range: Option<u32>,
    },
    /// Place obstacles in order and render the resulting lanes.
    Build {
        /// Cells as `column,row`.
        #[arg(value_parser = parse_coord, required = true)]
        cells: Vec<CellCoord>,
    },
    /// Render every configured lane.
    Lanes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::builtin()?,
    };
    let layout = config.load_map(&cli.map)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &config, &layout, &mut out)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn execute(
    action: &Action,
    config: &Config,
    layout: &GridLayout,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        Action::Path { from, to } => {
            let world = World::build(layout);
            let start = require_cell(&world, *from)?;
            let end = require_cell(&world, *to)?;
            match navigation::shortest_path(&world, start, end) {
                PathOutcome::Found(path) => {
                    let route = path
                        .cells()
                        .iter()
                        .filter_map(|&cell| query::coord(&world, cell))
                        .map(|coord| coord.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    writeln!(out, "{} steps: {route}", path.steps())?;
                }
                PathOutcome::NotFound => writeln!(out, "no path from {from} to {to}")?,
            }
        }
        Action::Visible { origin, range } => {
            let world = World::build(layout);
            let cell = require_cell(&world, *origin)?;
            let mut canvas = AsciiCanvas::new();
            let mut tool = VisionRange::new(range.unwrap_or(config.vision_range));
            let visible = tool
                .toggle(&world, cell, &mut canvas)
                .map_or(0, |selection| selection.visible.len());
            writeln!(
                out,
                "{visible} cell(s) visible from {origin} within {}",
                tool.range()
            )?;
            render(&canvas, &world, out)?;
        }
        Action::Build { cells } => {
            let mut canvas = lane_canvas(config);
            let Session {
                mut world,
                mut reservations,
            } = Bootstrap.initialise(layout, &config.lanes, &mut canvas)?;
            let mut builder = Builder::new();
            let mut events = Vec::new();

            for &coord in cells {
                match builder.place_obstacle(
                    &mut world,
                    &mut reservations,
                    coord,
                    &mut canvas,
                    &mut events,
                ) {
                    Ok(report) if report.rerouted.is_empty() => {
                        writeln!(out, "accepted {coord}")?;
                    }
                    Ok(report) => {
                        let lanes = report
                            .rerouted
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ");
                        writeln!(out, "accepted {coord}, re-routed {lanes}")?;
                    }
                    Err(error) => writeln!(out, "rejected {coord}: {error}")?,
                }
            }
            debug!(events = events.len(), "capability changes applied");

            writeln!(
                out,
                "{} accepted, {} rejected",
                builder.accepted(),
                builder.rejected()
            )?;
            render(&canvas, &world, out)?;
        }
        Action::Lanes => {
            let mut canvas = lane_canvas(config);
            let session = Bootstrap.initialise(layout, &config.lanes, &mut canvas)?;
            for (id, lane) in session.reservations.iter() {
                let from = describe(&session.world, lane.start());
                let to = describe(&session.world, lane.end());
                if lane.path().is_empty() {
                    writeln!(out, "{id}: {from} -> {to}, no route")?;
                } else {
                    writeln!(
                        out,
                        "{id}: {from} -> {to}, {} steps",
                        lane.path().steps()
                    )?;
                }
            }
            render(&canvas, &session.world, out)?;
        }
    }

    Ok(())
}

fn lane_canvas(config: &Config) -> AsciiCanvas {
    let mut canvas = AsciiCanvas::new();
    for lane in &config.lanes {
        let glyph = char::from_digit(lane.id.get() % 10, 10).unwrap_or('~');
        canvas.assign(lane.highlight, glyph);
    }
    canvas
}

fn render(canvas: &AsciiCanvas, world: &World, out: &mut dyn Write) -> Result<()> {
    debug!(highlighted = canvas.highlighted(), "rendering grid");
    write!(out, "{}", canvas.render(world))?;
    Ok(())
}

fn require_cell(world: &World, coord: CellCoord) -> Result<CellId> {
    query::cell_at(world, coord).with_context(|| format!("no cell at {coord}"))
}

fn describe(world: &World, cell: CellId) -> String {
    query::coord(world, cell).map_or_else(|| "?".to_owned(), |coord| coord.to_string())
}

fn parse_coord(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `column,row`, got `{value}`"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(CellCoord::new(column, row))
}
