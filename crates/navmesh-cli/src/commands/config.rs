//! navbake config command - print, write or check bake options.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::commands::{load_config, preset_config};
use crate::{Cli, OutputFormat, Preset, output};

#[derive(Serialize)]
struct CheckResult {
    path: String,
    valid: bool,
    region_mode: String,
    delaunay: bool,
    max_regions: usize,
}

pub fn run(preset: Preset, check: Option<&Path>, output_path: Option<&Path>, cli: &Cli) -> Result<()> {
    if let Some(path) = check {
        let config = load_config(path)?;
        let result = CheckResult {
            path: path.display().to_string(),
            valid: true,
            region_mode: config.region_mode.to_string(),
            delaunay: config.delaunay,
            max_regions: config.max_regions,
        };
        match cli.format {
            OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
            OutputFormat::Text => {
                output::success(
                    &format!("{} is a valid options file", path.display()),
                    cli.format,
                    cli.quiet,
                );
                if !cli.quiet {
                    println!("  {}: {}", "Region mode".cyan(), result.region_mode);
                    println!("  {}: {}", "Delaunay".cyan(), result.delaunay);
                    println!("  {}: {}", "Max regions".cyan(), result.max_regions);
                }
            }
        }
        return Ok(());
    }

    let config = preset_config(preset);

    if let Some(path) = output_path {
        config
            .save_toml(path)
            .with_context(|| format!("Failed to write bake options to {:?}", path))?;
        output::success(
            &format!("Bake options written to {}", path.display()),
            cli.format,
            cli.quiet,
        );
        return Ok(());
    }

    match cli.format {
        OutputFormat::Json => output::print(&config, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                let toml = config
                    .to_toml()
                    .context("Failed to serialize bake options")?;
                print!("{}", toml);
            }
        }
    }

    Ok(())
}
