//! Authoring data handed to a bake.
//!
//! The authoring tool exports a flat vertex array, indexed triangles with area
//! tags, the region tables and the off-mesh links. [`BakeInput`] is that
//! contract. It validates itself before any stage runs, and can be read from
//! or written to JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BakeError, NavResult};
use crate::region::{RegionVolume, TagTable};
use crate::types::{NavMesh, Triangle, Vertex};

/// An input triangle: three vertex indices and an opaque area tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTriangle {
    /// Vertex indices into [`BakeInput::vertices`].
    pub vertices: [usize; 3],

    /// Source classification.
    #[serde(default)]
    pub area_tag: i32,
}

impl SourceTriangle {
    /// Create a source triangle.
    pub fn new(vertices: [usize; 3], area_tag: i32) -> Self {
        Self { vertices, area_tag }
    }
}

fn default_true() -> bool {
    true
}

fn default_cost() -> f64 {
    1.0
}

/// An authored off-mesh link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
    /// Name reported in diagnostics.
    pub name: String,

    /// Start point in world space.
    pub start: [f64; 3],

    /// End point in world space.
    pub end: [f64; 3],

    /// Whether the link can be traversed in both directions.
    #[serde(default = "default_true")]
    pub bidirectional: bool,

    /// Traversal cost.
    #[serde(default = "default_cost")]
    pub cost_modifier: f64,

    /// Area tag used to pick the link's region.
    #[serde(default)]
    pub area_tag: i32,

    /// Disabled links are skipped entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SourceLink {
    /// Create an enabled, bidirectional link with unit cost.
    pub fn new(name: impl Into<String>, start: [f64; 3], end: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            bidirectional: true,
            cost_modifier: 1.0,
            area_tag: 0,
            enabled: true,
        }
    }

    /// Start point.
    #[inline]
    pub fn start_point(&self) -> Point3<f64> {
        Point3::from(self.start)
    }

    /// End point.
    #[inline]
    pub fn end_point(&self) -> Point3<f64> {
        Point3::from(self.end)
    }
}

/// Everything a bake consumes besides its configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeInput {
    /// Vertex positions.
    pub vertices: Vec<[f64; 3]>,

    /// Indexed triangles.
    pub triangles: Vec<SourceTriangle>,

    /// Tag to region table, used in simple and advanced region modes.
    pub tag_regions: TagTable,

    /// Labeled bounding volumes, used in advanced region mode.
    pub region_volumes: Vec<RegionVolume>,

    /// Off-mesh links.
    pub links: Vec<SourceLink>,
}

impl BakeInput {
    /// Create an input from vertex positions and triangles.
    pub fn new(vertices: Vec<[f64; 3]>, triangles: Vec<SourceTriangle>) -> Self {
        Self {
            vertices,
            triangles,
            ..Default::default()
        }
    }

    /// Create an input from flat arrays as exported by the authoring tool.
    ///
    /// `positions` holds `x, y, z` triples. `triangles` holds
    /// `v0, v1, v2, area_tag` quadruples.
    ///
    /// # Errors
    ///
    /// [`BakeError::MalformedInput`] if either array has a trailing partial
    /// record, [`BakeError::InvalidVertexIndex`] for a negative index.
    pub fn from_flat(positions: &[f64], triangles: &[i32]) -> NavResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(BakeError::malformed_input(format!(
                "vertex array length {} is not a multiple of 3",
                positions.len()
            )));
        }
        if triangles.len() % 4 != 0 {
            return Err(BakeError::malformed_input(format!(
                "triangle array length {} is not a multiple of 4",
                triangles.len()
            )));
        }

        let vertices: Vec<[f64; 3]> = positions
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let vertex_count = vertices.len();

        let triangles = triangles
            .chunks_exact(4)
            .enumerate()
            .map(|(triangle_index, c)| {
                let mut indices = [0usize; 3];
                for (slot, &raw) in indices.iter_mut().zip(&c[..3]) {
                    *slot = usize::try_from(raw).map_err(|_| BakeError::InvalidVertexIndex {
                        triangle_index,
                        vertex_index: raw.unsigned_abs() as usize,
                        vertex_count,
                    })?;
                }
                Ok(SourceTriangle::new(indices, c[3]))
            })
            .collect::<NavResult<Vec<_>>>()?;

        Ok(Self::new(vertices, triangles))
    }

    /// Set the tag to region table.
    pub fn with_tag_regions(mut self, table: TagTable) -> Self {
        self.tag_regions = table;
        self
    }

    /// Set the labeled region volumes.
    pub fn with_region_volumes(mut self, volumes: Vec<RegionVolume>) -> Self {
        self.region_volumes = volumes;
        self
    }

    /// Set the off-mesh links.
    pub fn with_links(mut self, links: Vec<SourceLink>) -> Self {
        self.links = links;
        self
    }

    /// Check the input before baking.
    ///
    /// # Errors
    ///
    /// - [`BakeError::EmptyInput`] if there are no triangles.
    /// - [`BakeError::InvalidVertexIndex`] for a dangling index.
    /// - [`BakeError::InvalidCoordinate`] for a NaN or infinite coordinate.
    pub fn validate(&self) -> NavResult<()> {
        if self.triangles.is_empty() {
            return Err(BakeError::empty_input(format!(
                "{} vertices but no triangles",
                self.vertices.len()
            )));
        }

        for (vertex_index, p) in self.vertices.iter().enumerate() {
            for (axis, &value) in ["x", "y", "z"].into_iter().zip(p) {
                if !value.is_finite() {
                    return Err(BakeError::InvalidCoordinate {
                        vertex_index,
                        axis,
                        value,
                    });
                }
            }
        }

        let vertex_count = self.vertices.len();
        for (triangle_index, tri) in self.triangles.iter().enumerate() {
            if let Some(&vertex_index) = tri.vertices.iter().find(|&&v| v >= vertex_count) {
                return Err(BakeError::InvalidVertexIndex {
                    triangle_index,
                    vertex_index,
                    vertex_count,
                });
            }
        }

        debug!(
            vertices = vertex_count,
            triangles = self.triangles.len(),
            links = self.links.len(),
            "Input validated"
        );
        Ok(())
    }

    /// Build the working mesh. Vertex ids are their input indices.
    pub fn to_mesh(&self) -> NavMesh {
        NavMesh {
            vertices: self
                .vertices
                .iter()
                .enumerate()
                .map(|(id, &p)| Vertex::new(id, Point3::from(p)))
                .collect(),
            triangles: self
                .triangles
                .iter()
                .map(|t| Triangle::new(t.vertices, t.area_tag))
                .collect(),
        }
    }

    /// Parse an input from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load an input from a JSON file.
    ///
    /// # Errors
    ///
    /// [`BakeError::IoRead`] if the file cannot be opened,
    /// [`BakeError::ParseError`] if its contents are not a valid input.
    pub fn load_json(path: impl AsRef<Path>) -> NavResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BakeError::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        let input: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| BakeError::parse_error(path, e.to_string()))?;

        info!(
            path = %path.display(),
            vertices = input.vertices.len(),
            triangles = input.triangles.len(),
            "Loaded bake input"
        );
        Ok(input)
    }

    /// Save this input to a JSON file.
    ///
    /// # Errors
    ///
    /// [`BakeError::IoWrite`] if the file cannot be written.
    pub fn save_json(&self, path: impl AsRef<Path>) -> NavResult<()> {
        let path = path.as_ref();
        let io_err = |source| BakeError::IoWrite {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| io_err(std::io::Error::other(e)))?;
        Ok(())
    }
}
