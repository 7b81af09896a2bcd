//! T-junction detection and repair.
//!
//! A T-junction is a vertex of one triangle lying on the edge of another
//! triangle that does not use it. Consumers that derive adjacency from shared
//! indices see a crack there. Splitting the edge's triangle at the vertex
//! restores a proper triangulation.

use tracing::{debug, info, warn};

use crate::geometry::normal;
use crate::types::NavMesh;
use crate::weld::remove_unused_vertices;

/// A vertex found lying inside one of a triangle's edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TJunction {
    /// Triangle owning the edge.
    pub triangle: usize,
    /// Edge slot: the edge runs from corner `edge` to corner `(edge + 1) % 3`.
    pub edge: usize,
    /// The foreign vertex.
    pub vertex: usize,
    /// Position of the vertex along the edge, strictly inside `(0, 1)`.
    pub param: f64,
}

/// Counts from one T-junction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TJunctionStats {
    /// Triangles split.
    pub splits: usize,
    /// Vertices dropped by the compaction that follows.
    pub unused_removed: usize,
}

/// Find the first T-junction on triangle `triangle`.
///
/// Edges are checked in order. On an edge with several foreign vertices, the
/// one closest to the edge's start is returned. Vertices of triangles sharing
/// two or more corners with `triangle` are ignored, as are vertices within
/// `epsilon` of either edge endpoint.
pub fn find_t_junction(
    mesh: &NavMesh,
    triangle: usize,
    epsilon: f64,
    height_epsilon: f64,
) -> Option<TJunction> {
    let tri = &mesh.triangles[triangle];
    let [p0, p1, p2] = mesh.corners(triangle);
    let n = normal(&p0, &p1, &p2)?;

    for (edge, (a, b)) in tri.edges().into_iter().enumerate() {
        let pa = mesh.position(a);
        let ab = mesh.position(b) - pa;
        let len_sq = ab.norm_squared();
        if len_sq <= f64::EPSILON {
            continue;
        }
        let len = len_sq.sqrt();

        let mut best: Option<TJunction> = None;
        for (other_idx, other) in mesh.triangles.iter().enumerate() {
            if other_idx == triangle || tri.shared_vertex_count(other) >= 2 {
                continue;
            }
            for &v in &other.vertices {
                if tri.contains_vertex(v) {
                    continue;
                }
                let av = mesh.position(v) - pa;
                let param = av.dot(&ab) / len_sq;
                if param * len <= epsilon || (1.0 - param) * len <= epsilon {
                    continue;
                }

                let offset = av - ab * param;
                let height = offset.dot(&n);
                if height.abs() > height_epsilon {
                    continue;
                }
                if (offset - n * height).norm() > epsilon {
                    continue;
                }

                let closer = best.is_none_or(|b| param < b.param || (param == b.param && v < b.vertex));
                if closer {
                    best = Some(TJunction {
                        triangle,
                        edge,
                        vertex: v,
                        param,
                    });
                }
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}

/// Split the triangle of `junction` in two at its vertex.
///
/// The original triangle keeps the half touching the edge's start; the new
/// half is appended and copies tag, region and cost. Winding is preserved.
pub fn split_at(mesh: &mut NavMesh, junction: TJunction) {
    let k = junction.edge;
    let tri = &mut mesh.triangles[junction.triangle];
    let b = tri.vertices[(k + 1) % 3];
    let c = tri.vertices[(k + 2) % 3];
    tri.vertices[(k + 1) % 3] = junction.vertex;

    let mut half = tri.clone();
    half.vertices = [junction.vertex, b, c];
    mesh.triangles.push(half);
}

/// Split triangles at every T-junction, then compact unused vertices.
///
/// Triangles produced by a split are checked in turn, so an edge carrying
/// several foreign vertices is split at each of them. A split can expose a
/// junction on a triangle that was already checked, so passes repeat until
/// one makes no split.
pub fn fix_t_junctions(mesh: &mut NavMesh, epsilon: f64, height_epsilon: f64) -> TJunctionStats {
    let mut stats = TJunctionStats::default();
    let split_limit = mesh.vertex_count().saturating_mul(mesh.triangle_count().max(1));

    'passes: loop {
        let splits_before = stats.splits;
        let mut triangle = 0;
        while triangle < mesh.triangles.len() {
            match find_t_junction(mesh, triangle, epsilon, height_epsilon) {
                Some(junction) if stats.splits < split_limit => {
                    debug!(
                        triangle,
                        vertex = junction.vertex,
                        param = junction.param,
                        "Splitting T-junction"
                    );
                    split_at(mesh, junction);
                    stats.splits += 1;
                }
                Some(_) => {
                    warn!(splits = stats.splits, "T-junction split limit reached");
                    break 'passes;
                }
                None => triangle += 1,
            }
        }
        if stats.splits == splits_before {
            break;
        }
    }

    stats.unused_removed = remove_unused_vertices(mesh);

    if stats.splits > 0 {
        info!("Split {} T-junctions", stats.splits);
    }
    stats
}
