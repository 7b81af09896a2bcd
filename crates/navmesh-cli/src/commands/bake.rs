//! navbake bake command - run the full bake pipeline.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use navmesh_bake::progress::{Progress, ProgressCallback};
use navmesh_bake::{BakeInput, BakePipeline, BakeReport, BakeSummary, RegionModeKind};
use serde::Serialize;

use crate::commands::{load_config, preset_config};
use crate::{Cli, OutputFormat, Preset, RegionMode, output};

/// Arguments of one `bake` invocation.
pub struct BakeArgs<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub config: Option<&'a Path>,
    pub preset: Option<Preset>,
    pub delaunay: bool,
    pub weld_epsilon: Option<f64>,
    pub region_mode: Option<RegionMode>,
    pub link_error_correction: Option<f64>,
    pub report: Option<&'a Path>,
}

#[derive(Serialize)]
struct BakeSummaryOutput<'a> {
    input: String,
    output: String,
    success: bool,
    stages_executed: usize,
    regions: &'a [String],
    summary: &'a BakeSummary,
    warnings: usize,
    issues: usize,
}

fn write_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {} file {:?}", what, path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {} to {:?}", what, path))
}

fn print_report(report: &BakeReport) {
    for warning in &report.warnings {
        println!("  {}: {}", "Warning".yellow(), warning);
    }
    for issue in &report.issues {
        println!("  {}: {}", "Dropped".red(), issue);
    }
}

pub fn run(args: &BakeArgs<'_>, cli: &Cli) -> Result<()> {
    let input = BakeInput::load_json(args.input)
        .with_context(|| format!("Failed to load bake input from {:?}", args.input))?;

    let mut config = match (args.config, args.preset) {
        (Some(path), _) => load_config(path)?,
        (None, Some(preset)) => preset_config(preset),
        (None, None) => Default::default(),
    };

    // Command-line flags override the options file
    if args.delaunay {
        config.delaunay = true;
    }
    if let Some(epsilon) = args.weld_epsilon {
        config.weld_epsilon = epsilon;
    }
    if let Some(mode) = args.region_mode {
        config.region_mode = match mode {
            RegionMode::Disabled => RegionModeKind::Disabled,
            RegionMode::Simple => RegionModeKind::Simple,
            RegionMode::Advanced => RegionModeKind::Advanced,
        };
    }
    if let Some(radius) = args.link_error_correction {
        config.link_error_correction = radius;
    }

    let show_progress = !cli.quiet && matches!(cli.format, OutputFormat::Text);
    let callback: ProgressCallback = Box::new(move |progress: &Progress| {
        if show_progress {
            eprintln!(
                "{} {}",
                format!("[{:>3}%]", progress.percent()).dimmed(),
                progress.phase
            );
        }
        true
    });

    let baked = BakePipeline::new(&input, &config)
        .with_progress(&callback)
        .run()?;

    write_json(&baked.result, args.output, "bake result")?;
    if let Some(path) = args.report {
        write_json(&baked.report, path, "bake report")?;
    }

    let summary = BakeSummaryOutput {
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        success: true,
        stages_executed: baked.stages_executed,
        regions: &baked.result.regions,
        summary: &baked.report.summary,
        warnings: baked.report.warnings.len(),
        issues: baked.report.issues.len(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&summary, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Baked navmesh saved to {}", args.output.display()),
                    cli.format,
                    cli.quiet,
                );
                let s = &baked.report.summary;
                println!(
                    "  {}: {} → {}",
                    "Vertices".cyan(),
                    s.input_vertices,
                    s.output_vertices
                );
                println!(
                    "  {}: {} → {}",
                    "Triangles".cyan(),
                    s.input_triangles,
                    s.output_triangles
                );
                if s.vertices_welded > 0 || s.degenerate_triangles_removed > 0 {
                    println!(
                        "  {}: {} vertices welded, {} degenerate triangles removed",
                        "Cleanup".green(),
                        s.vertices_welded,
                        s.degenerate_triangles_removed
                    );
                }
                if s.t_junctions_split > 0 {
                    println!(
                        "  {}: {} T-junctions split",
                        "Edges".green(),
                        s.t_junctions_split
                    );
                }
                if s.delaunay_passes > 0 {
                    println!(
                        "  {}: {} flips in {} passes",
                        "Delaunay".green(),
                        s.edges_flipped,
                        s.delaunay_passes
                    );
                }
                println!(
                    "  {}: {}",
                    "Regions".cyan(),
                    baked.result.regions.join(", ")
                );
                println!(
                    "  {}: {} resolved, {} dropped",
                    "Links".cyan(),
                    s.links_resolved,
                    s.links_dropped
                );
                print_report(&baked.report);
            }
        }
    }

    if !baked.report.is_clean() {
        output::warning(
            &format!(
                "Bake finished with {} warnings and {} dropped items",
                baked.report.warnings.len(),
                baked.report.issues.len()
            ),
            cli.format,
            cli.quiet,
        );
    }

    Ok(())
}
