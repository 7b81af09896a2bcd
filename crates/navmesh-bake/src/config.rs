//! Bake configuration.
//!
//! `BakeConfig` carries every option the authoring tool exposes, plus the caps
//! that keep a bake bounded. Configurations can be saved and loaded as TOML or
//! JSON so that a level's bake settings live next to its source data.
//!
//! # Example TOML
//!
//! ```toml
//! weld_vertices = true
//! weld_epsilon = 1e-6
//! delaunay = true
//! region_mode = "advanced"
//! region_margin = 0.25
//! link_error_correction = 0.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BakeError, ConfigError, NavResult};
use crate::grid::MAX_GRID_CELLS;
use crate::types::MAX_REGIONS;

/// How triangles are assigned to named regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionModeKind {
    /// Every triangle lands in `MainArea`.
    #[default]
    Disabled,
    /// Area tags are looked up in the tag table.
    Simple,
    /// Same-tag islands are matched against labeled bounding volumes.
    Advanced,
}

impl std::fmt::Display for RegionModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RegionModeKind::Disabled => "disabled",
            RegionModeKind::Simple => "simple",
            RegionModeKind::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

/// Options for one bake.
///
/// # Example
///
/// ```
/// use navmesh_bake::BakeConfig;
///
/// let config = BakeConfig {
///     delaunay: true,
///     link_error_correction: 0.5,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Whether to merge near-duplicate vertices.
    ///
    /// Default: `true`
    pub weld_vertices: bool,

    /// Weld threshold, compared against the **squared** distance between two
    /// vertices. A value of `0` disables welding.
    ///
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Whether to run the Delaunay edge-flip optimizer.
    ///
    /// Default: `false`
    pub delaunay: bool,

    /// Only flip edges between coplanar triangles.
    ///
    /// Keeps ramps and stairs from being re-triangulated across their creases.
    ///
    /// Default: `true`
    pub delaunay_restrict_to_planes: bool,

    /// Upper bound on full edge scans before the optimizer gives up and keeps
    /// its current triangulation.
    ///
    /// Default: `1000`
    pub delaunay_max_passes: usize,

    /// Whether to split triangles at T-junctions.
    ///
    /// Default: `true`
    pub fix_t_junctions: bool,

    /// Maximum in-plane distance from a vertex to an edge for the vertex to
    /// count as lying on it.
    ///
    /// Default: `1e-3`
    pub t_junction_epsilon: f64,

    /// Maximum distance from a vertex to the triangle's plane for the vertex
    /// to count as lying on one of its edges.
    ///
    /// Default: `1e-2`
    pub t_junction_height_epsilon: f64,

    /// Region classification strategy.
    ///
    /// Default: [`RegionModeKind::Disabled`]
    pub region_mode: RegionModeKind,

    /// Margin added on every side of a region volume before testing island
    /// containment.
    ///
    /// Default: `0.1`
    pub region_margin: f64,

    /// Area tags eligible for classification. Empty selects every tag.
    ///
    /// Default: empty
    pub region_tag_allowlist: Vec<i32>,

    /// Search radius for snapping link endpoints onto the surface.
    ///
    /// At `0` an endpoint must sit directly above or below a triangle, and is
    /// never moved.
    ///
    /// Default: `0.0`
    pub link_error_correction: f64,

    /// Cells per axis of the link search grid.
    ///
    /// Default: `32`
    pub link_grid_cells: usize,

    /// Maximum number of distinct regions, `MainArea` included.
    ///
    /// Default: `64`
    pub max_regions: usize,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            weld_vertices: true,
            weld_epsilon: 1e-6,
            delaunay: false,
            delaunay_restrict_to_planes: true,
            delaunay_max_passes: 1000,
            fix_t_junctions: true,
            t_junction_epsilon: 1e-3,
            t_junction_height_epsilon: 1e-2,
            region_mode: RegionModeKind::Disabled,
            region_margin: 0.1,
            region_tag_allowlist: Vec::new(),
            link_error_correction: 0.0,
            link_grid_cells: 32,
            max_regions: MAX_REGIONS,
        }
    }
}

impl BakeConfig {
    /// Classify by area tag through the tag table.
    pub fn for_tagged_areas() -> Self {
        Self {
            region_mode: RegionModeKind::Simple,
            ..Default::default()
        }
    }

    /// Classify same-tag islands against labeled region volumes.
    pub fn for_region_volumes(margin: f64) -> Self {
        Self {
            region_mode: RegionModeKind::Advanced,
            region_margin: margin,
            ..Default::default()
        }
    }

    /// Full cleanup with Delaunay optimization and a small link snapping radius.
    pub fn optimized() -> Self {
        Self {
            delaunay: true,
            link_error_correction: 0.25,
            ..Default::default()
        }
    }

    /// Whether `tag` is eligible for region classification.
    #[inline]
    pub fn is_tag_selected(&self, tag: i32) -> bool {
        self.region_tag_allowlist.is_empty() || self.region_tag_allowlist.contains(&tag)
    }

    /// Check caps and ranges.
    ///
    /// # Errors
    ///
    /// [`BakeError::InvalidRegionCap`] if `max_regions` is outside
    /// `1..=MAX_REGIONS`; [`BakeError::InvalidConfig`] for any other value
    /// out of range.
    pub fn validate(&self) -> NavResult<()> {
        if self.max_regions == 0 || self.max_regions > MAX_REGIONS {
            return Err(BakeError::InvalidRegionCap {
                cap: self.max_regions,
                max: MAX_REGIONS,
            });
        }
        if self.link_grid_cells == 0 || self.link_grid_cells > MAX_GRID_CELLS {
            return Err(BakeError::invalid_config(
                "link_grid_cells",
                format!(
                    "must be between 1 and {MAX_GRID_CELLS}, got {}",
                    self.link_grid_cells
                ),
            ));
        }

        let non_negative = [
            ("weld_epsilon", self.weld_epsilon),
            ("t_junction_epsilon", self.t_junction_epsilon),
            ("t_junction_height_epsilon", self.t_junction_height_epsilon),
            ("region_margin", self.region_margin),
            ("link_error_correction", self.link_error_correction),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(BakeError::invalid_config(
                    field,
                    format!("must be a finite non-negative number, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or doesn't match the schema.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or the TOML is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
