//! Subcommand implementations.

pub mod bake;
pub mod config;
pub mod info;

use std::path::Path;

use anyhow::{Context, Result};
use navmesh_bake::BakeConfig;

use crate::Preset;

/// The configuration a preset stands for.
pub fn preset_config(preset: Preset) -> BakeConfig {
    match preset {
        Preset::Default => BakeConfig::default(),
        Preset::Tagged => BakeConfig::for_tagged_areas(),
        Preset::Volumes => BakeConfig::for_region_volumes(0.1),
        Preset::Optimized => BakeConfig::optimized(),
    }
}

/// Load and validate an options file.
pub fn load_config(path: &Path) -> Result<BakeConfig> {
    let config = BakeConfig::from_toml_file(path)
        .with_context(|| format!("Failed to load bake options from {:?}", path))?;
    config
        .validate()
        .with_context(|| format!("Invalid bake options in {:?}", path))?;
    Ok(config)
}
