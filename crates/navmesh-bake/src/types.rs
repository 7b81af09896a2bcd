//! Core navmesh data types.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::fixed::Fixed;
use crate::geometry::{Aabb, horizontal};

/// Name of the default region every unclassified triangle falls back to.
pub const MAIN_AREA: &str = "MainArea";

/// Upper bound on the number of distinct regions a bake may produce.
///
/// The runtime stores region membership as a 64-bit mask.
pub const MAX_REGIONS: usize = 64;

/// A vertex of the walkable surface.
///
/// Positions are kept in double precision so repeated authoring-time edits do
/// not accumulate error before the fixed-point conversion at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Stable identifier: the vertex's index in the original input.
    pub id: usize,

    /// World-space position (Y-up).
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a vertex.
    #[inline]
    pub fn new(id: usize, position: Point3<f64>) -> Self {
        Self { id, position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self::new(id, Point3::new(x, y, z))
    }
}

/// An indexed triangle of the walkable surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertex indices `[v0, v1, v2]` into the owning vertex array.
    pub vertices: [usize; 3],

    /// Source classification from the authoring tool. Opaque to the bake.
    pub area_tag: i32,

    /// Region assigned by the classifier.
    pub region_id: Option<String>,

    /// Pathing weight.
    pub cost: Fixed,
}

impl Triangle {
    /// Create an unclassified triangle with the default cost.
    pub fn new(vertices: [usize; 3], area_tag: i32) -> Self {
        Self {
            vertices,
            area_tag,
            region_id: None,
            cost: Fixed::ONE,
        }
    }

    /// Whether two of the three indices coincide.
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        let [a, b, c] = self.vertices;
        a == b || b == c || a == c
    }

    /// Whether `vertex` is one of this triangle's corners.
    #[inline]
    pub fn contains_vertex(&self, vertex: usize) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Number of vertex indices shared with `other`.
    pub fn shared_vertex_count(&self, other: &Triangle) -> usize {
        self.vertices
            .iter()
            .filter(|v| other.vertices.contains(v))
            .count()
    }

    /// The three directed edges `(v0, v1)`, `(v1, v2)`, `(v2, v0)`.
    #[inline]
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// An off-mesh link between two surface locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Author-facing name, used in diagnostics.
    pub name: String,

    /// Start position. Snapped onto the surface when error correction is enabled.
    pub start: Point3<f64>,

    /// End position. Snapped onto the surface when error correction is enabled.
    pub end: Point3<f64>,

    /// Triangle containing `start`, once resolved.
    pub start_triangle: Option<usize>,

    /// Triangle containing `end`, once resolved.
    pub end_triangle: Option<usize>,

    /// Whether the link may be traversed end-to-start.
    pub bidirectional: bool,

    /// Pathing cost of traversing the link.
    pub cost_override: Fixed,

    /// Region assigned from the link's area tag.
    pub region_id: Option<String>,
}

impl Link {
    /// Whether both endpoints have been resolved to triangles.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.start_triangle.is_some() && self.end_triangle.is_some()
    }
}

/// The vertex/triangle pair handed from stage to stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangles indexing into `vertices`.
    pub triangles: Vec<Triangle>,
}

impl NavMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Position of vertex `index`.
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        self.vertices[index].position
    }

    /// Corner positions of triangle `index`.
    #[inline]
    pub fn corners(&self, index: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[index].vertices;
        [self.position(a), self.position(b), self.position(c)]
    }

    /// Axis-aligned bounds of all vertices, or `None` for an empty vertex array.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Horizontal (XZ) bounds of all vertices as `(min, max)`.
    pub fn horizontal_bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut iter = self.vertices.iter().map(|v| horizontal(&v.position));
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        Some((min, max))
    }
}

/// Final output of a bake, consumed by the runtime serializer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BakeResult {
    /// Cleaned vertices.
    pub vertices: Vec<Vertex>,

    /// Cleaned, classified triangles.
    pub triangles: Vec<Triangle>,

    /// Resolved links. Links that failed to resolve are absent.
    pub links: Vec<Link>,

    /// Distinct region names in use. [`MAIN_AREA`] is first whenever present.
    pub regions: Vec<String>,
}

impl BakeResult {
    /// Index of `name` in the region table.
    pub fn region_index(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r == name)
    }
}
