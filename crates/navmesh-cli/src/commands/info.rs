//! navbake info command - display input statistics.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use navmesh_bake::BakeInput;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct InputInfo {
    path: String,
    vertices: usize,
    triangles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    links: usize,
    disabled_links: usize,
    tag_regions: usize,
    region_volumes: usize,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<BTreeMap<i32, usize>>,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(input_path: &Path, detailed: bool, cli: &Cli) -> Result<()> {
    let input = BakeInput::load_json(input_path)
        .with_context(|| format!("Failed to load bake input from {:?}", input_path))?;

    let problem = input.validate().err().map(|e| e.to_string());
    // Out-of-range indices would panic when building the mesh
    let bounds = if problem.is_none() {
        input.to_mesh().bounds().map(|b| {
            let dims = b.max - b.min;
            BoundsInfo {
                min: [b.min.x, b.min.y, b.min.z],
                max: [b.max.x, b.max.y, b.max.z],
                dimensions: [dims.x, dims.y, dims.z],
            }
        })
    } else {
        None
    };

    let tags = detailed.then(|| {
        let mut counts = BTreeMap::new();
        for tri in &input.triangles {
            *counts.entry(tri.area_tag).or_insert(0) += 1;
        }
        counts
    });

    let info = InputInfo {
        path: input_path.display().to_string(),
        vertices: input.vertices.len(),
        triangles: input.triangles.len(),
        bounds,
        links: input.links.len(),
        disabled_links: input.links.iter().filter(|l| !l.enabled).count(),
        tag_regions: input.tag_regions.len(),
        region_volumes: input.region_volumes.len(),
        valid: problem.is_none(),
        problem,
        tags,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Bake Input".bold().underline());
                println!("  {}: {}", "File".cyan(), input_path.display());
                println!("  {}: {}", "Vertices".cyan(), info.vertices);
                println!("  {}: {}", "Triangles".cyan(), info.triangles);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: {:.2} x {:.2} x {:.2}",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1],
                        b.dimensions[2]
                    );
                    println!(
                        "  {}: ({:.2}, {:.2}, {:.2})",
                        "Min bounds".cyan(),
                        b.min[0],
                        b.min[1],
                        b.min[2]
                    );
                    println!(
                        "  {}: ({:.2}, {:.2}, {:.2})",
                        "Max bounds".cyan(),
                        b.max[0],
                        b.max[1],
                        b.max[2]
                    );
                }

                println!(
                    "  {}: {} ({} disabled)",
                    "Links".cyan(),
                    info.links,
                    info.disabled_links
                );
                println!("  {}: {}", "Tag regions".cyan(), info.tag_regions);
                println!("  {}: {}", "Region volumes".cyan(), info.region_volumes);

                if let Some(ref tags) = info.tags {
                    println!("  {}:", "Triangles per tag".cyan());
                    for (tag, count) in tags {
                        let name = input
                            .tag_regions
                            .get(tag)
                            .map(|r| r.name.as_str())
                            .unwrap_or("-");
                        println!("    {:>4} {:<16} {}", tag, name, count);
                    }
                }

                match info.problem {
                    None => println!("  {}: {}", "Valid".cyan(), "yes".green()),
                    Some(ref problem) => {
                        println!("  {}: {} ({})", "Valid".cyan(), "no".red(), problem)
                    }
                }
            }
        }
    }

    Ok(())
}
