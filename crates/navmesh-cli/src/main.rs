//! navbake: Command-line front end for navmesh baking.
//!
//! Bakes exported walkable triangulations into navmesh results from the
//! command line, suitable for scripting and build pipelines.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=navmesh_bake=info` - One line per stage
//! - `RUST_LOG=navmesh_bake=debug` - Per-item detail (welds, splits, links)
//! - `RUST_LOG=navmesh_bake::timing=debug` - Stage timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Bake with stage logging
//! RUST_LOG=navmesh_bake=info navbake bake level.json -o level.nav.json
//!
//! # Inspect an export before baking
//! navbake info level.json --format json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use navmesh_bake::{BakeError, BakeFailure};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{bake, config, info};

/// navbake - Bake walkable triangulations into navmeshes.
///
/// Cleans, classifies and links exported level geometry for the pathfinding runtime.
#[derive(Parser)]
#[command(name = "navbake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake an exported input into a navmesh result
    Bake {
        /// Input file (JSON export)
        input: PathBuf,

        /// Output file path for the bake result
        #[arg(short, long)]
        output: PathBuf,

        /// Bake options file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Start from a preset instead of the defaults
        #[arg(long, conflicts_with = "config")]
        preset: Option<Preset>,

        /// Run Delaunay optimization
        #[arg(long)]
        delaunay: bool,

        /// Vertex welding distance
        #[arg(long)]
        weld_epsilon: Option<f64>,

        /// Region classification mode
        #[arg(long)]
        region_mode: Option<RegionMode>,

        /// Radius within which link endpoints snap onto the surface
        #[arg(long)]
        link_error_correction: Option<f64>,

        /// Also write the bake report to this path (JSON)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Display statistics for an exported input
    Info {
        /// Input file (JSON export)
        input: PathBuf,

        /// Show per-tag triangle counts
        #[arg(long)]
        detailed: bool,
    },

    /// Print or write a bake options file
    Config {
        /// Preset to start from
        #[arg(long, default_value = "default")]
        preset: Preset,

        /// Check this options file instead of printing a preset
        #[arg(long, conflicts_with = "output")]
        check: Option<PathBuf>,

        /// Write the options to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Preset {
    /// Welding and T-junction fixing only
    Default,
    /// Classify by tag table
    Tagged,
    /// Classify islands against region volumes
    Volumes,
    /// Full cleanup with Delaunay and link snapping
    Optimized,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RegionMode {
    /// Everything lands in MainArea
    Disabled,
    /// Look up area tags in the tag table
    Simple,
    /// Match same-tag islands against region volumes
    Advanced,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "navmesh_bake=info",
            2 => "navmesh_bake=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn print_bake_error(error: &BakeError) {
    eprintln!("{}: {}", "Error".red().bold(), error);
    eprintln!("  {}: {}", "Code".cyan(), error.code());
    if let Some(help) = miette::Diagnostic::help(error) {
        eprintln!("  {}: {}", "Suggestion".green(), help);
    }
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Bake {
            input,
            output,
            config,
            preset,
            delaunay,
            weld_epsilon,
            region_mode,
            link_error_correction,
            report,
        } => bake::run(
            &bake::BakeArgs {
                input,
                output,
                config: config.as_deref(),
                preset: *preset,
                delaunay: *delaunay,
                weld_epsilon: *weld_epsilon,
                region_mode: *region_mode,
                link_error_correction: *link_error_correction,
                report: report.as_deref(),
            },
            &cli,
        ),
        Commands::Info { input, detailed } => info::run(input, *detailed, &cli),
        Commands::Config {
            preset,
            check,
            output,
        } => config::run(*preset, check.as_deref(), output.as_deref(), &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(failure) = e.downcast_ref::<BakeFailure>() {
                print_bake_error(&failure.error);
                eprintln!("  {}: {}", "Stage".yellow(), failure.stage);
            } else if let Some(error) = e.downcast_ref::<BakeError>() {
                print_bake_error(error);
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
