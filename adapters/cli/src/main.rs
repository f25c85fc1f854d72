#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a Boxpush puzzle and reports its score.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use boxpush_core::{CellCoord, EntityShape};
use boxpush_system_scoring::{ScoreReport, Scoring};
use boxpush_system_simulation::Simulator;
use boxpush_world::{
    layout::{self, Layout, Puzzle},
    query,
};
use clap::{ArgAction, Parser, ValueEnum};
use log::{info, LevelFilter};
use serde::Serialize;

/// Command-line arguments accepted by the `boxpush` binary.
#[derive(Debug, Parser)]
#[command(name = "boxpush", about = "Replays a push puzzle and prints its score")]
struct CliArgs {
    /// Puzzle file: the map, a blank line, then the instructions.
    input: PathBuf,

    /// Map variant to solve. Both variants are solved when omitted.
    #[arg(long, value_enum)]
    layout: Option<LayoutMode>,

    /// Output format of the results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Include the final grid in the output.
    #[arg(long)]
    render: bool,

    /// Raise log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
enum LayoutMode {
    /// Solve the map as written.
    Narrow,
    /// Solve the map after doubling every cell horizontally.
    Wide,
}

impl LayoutMode {
    const fn label(self) -> &'static str {
        match self {
            Self::Narrow => "narrow",
            Self::Wide => "wide",
        }
    }

    const fn scored_shape(self) -> EntityShape {
        match self {
            Self::Narrow => EntityShape::Single,
            Self::Wide => EntityShape::HorizontalPair,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `layout: score` line per solved variant.
    Text,
    /// A JSON array with one object per solved variant.
    Json,
}

#[derive(Debug, Serialize)]
struct Solution {
    layout: LayoutMode,
    actor: CellCoord,
    instructions: usize,
    score: ScoreReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    grid: Option<String>,
}

/// Entry point for the Boxpush command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let input = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read puzzle from {}", args.input.display()))?;
    let puzzle = layout::parse_puzzle(&input)
        .with_context(|| format!("failed to parse puzzle {}", args.input.display()))?;

    let modes = match args.layout {
        Some(mode) => vec![mode],
        None => vec![LayoutMode::Narrow, LayoutMode::Wide],
    };

    let solutions = modes
        .into_iter()
        .map(|mode| solve(&puzzle, mode, args.render))
        .collect::<Result<Vec<_>>>()?;

    match args.format {
        OutputFormat::Text => {
            for solution in &solutions {
                println!("{}: {}", solution.layout.label(), solution.score.total);
                if let Some(grid) = &solution.grid {
                    println!("{grid}");
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&solutions)
                .context("failed to serialise results")?;
            println!("{json}");
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            let _ = builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            let _ = builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn solve(puzzle: &Puzzle, mode: LayoutMode, render: bool) -> Result<Solution> {
    let map = match mode {
        LayoutMode::Narrow => puzzle.map.clone(),
        LayoutMode::Wide => layout::widen(&puzzle.map).context("failed to widen map")?,
    };
    let Layout { mut world, actor } = layout::parse_map(&map)
        .with_context(|| format!("failed to build {} world", mode.label()))?;

    let mut simulator = Simulator::new(actor, puzzle.instructions.clone());
    let mut events = Vec::new();
    let instructions = simulator.run(&mut world, &mut events);
    info!(
        "{} replay finished with {} events",
        mode.label(),
        events.len()
    );

    let score = Scoring::default().report(&query::entity_view(&world), mode.scored_shape());
    let grid = render.then(|| layout::render(&world, Some(simulator.actor())));

    Ok(Solution {
        layout: mode,
        actor: simulator.actor(),
        instructions,
        score,
        grid,
    })
}
