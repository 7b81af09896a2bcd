//! Delaunay optimization by edge flipping.
//!
//! Authoring-tool triangulations are often fans with long, thin slivers. The
//! optimizer flips interior edges until every quad formed by two neighbors uses
//! its Delaunay diagonal. Only connectivity changes: vertex positions and the
//! triangle count stay the same.

use hashbrown::HashMap;
use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::geometry::{angle_at, in_circumcircle, normal, normal_unnormalized};
use crate::half_edge::HalfEdgeMesh;
use crate::types::NavMesh;

/// Scale-normalized in-circle value a flip must exceed.
const IN_CIRCLE_EPSILON: f64 = 1e-9;

/// Minimum improvement in opposite-angle sum, in radians.
const ANGLE_EPSILON: f64 = 1e-9;

/// Unit normals of coplanar faces may differ by at most this in their dot product.
const COPLANAR_TOLERANCE: f64 = 1e-6;

/// Counts from one optimizer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelaunayStats {
    /// Edges flipped across all passes.
    pub flips: usize,
    /// Full edge scans performed.
    pub passes: usize,
    /// Whether the pass limit stopped the optimizer while it was still flipping.
    pub hit_pass_limit: bool,
    /// Triangles whose winding was reversed before optimizing.
    pub rewound: usize,
}

/// Reverse triangles whose normal points down, so all faces wind the same way.
///
/// Vertical and degenerate triangles are left alone. Returns the number of
/// triangles reversed.
pub fn normalize_winding(mesh: &mut NavMesh) -> usize {
    let mut reversed = 0;
    for t in 0..mesh.triangles.len() {
        let [a, b, c] = mesh.corners(t);
        if normal_unnormalized(&a, &b, &c).y < 0.0 {
            mesh.triangles[t].vertices.swap(1, 2);
            reversed += 1;
        }
    }
    reversed
}

fn undirected(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Decide whether interior edge `e` should be flipped.
fn should_flip(
    mesh: &NavMesh,
    he: &HalfEdgeMesh,
    edge_counts: &HashMap<(usize, usize), usize>,
    e: usize,
    o: usize,
    restrict_to_planes: bool,
) -> bool {
    let f1 = he.edges[e].face;
    let f2 = he.edges[o].face;
    if mesh.triangles[f1].area_tag != mesh.triangles[f2].area_tag {
        return false;
    }

    let (a, b) = (he.origin(e), he.dest(e));
    let c = he.apex(e);
    let d = he.apex(o);
    if c == d || edge_counts.contains_key(&undirected(c, d)) {
        return false;
    }

    let (pa, pb, pc, pd) = (
        mesh.position(a),
        mesh.position(b),
        mesh.position(c),
        mesh.position(d),
    );

    let (Some(n1), Some(n2)) = (normal(&pa, &pb, &pc), normal(&pb, &pa, &pd)) else {
        return false;
    };
    if restrict_to_planes && n1.dot(&n2) < 1.0 - COPLANAR_TOLERANCE {
        return false;
    }

    if in_circumcircle(&pa, &pb, &pc, &pd) <= IN_CIRCLE_EPSILON {
        return false;
    }

    // The quad a, d, b, c must be strictly convex for the new diagonal to
    // stay inside it.
    let reference: Vector3<f64> = n1 + n2;
    let scale = (pa - pb).norm_squared().max((pc - pd).norm_squared());
    let min_area = scale * 1e-12;
    if normal_unnormalized(&pd, &pc, &pa).dot(&reference) <= min_area
        || normal_unnormalized(&pc, &pd, &pb).dot(&reference) <= min_area
    {
        return false;
    }

    let opposite_now = angle_at(&pc, &pa, &pb) + angle_at(&pd, &pb, &pa);
    let opposite_after = angle_at(&pa, &pc, &pd) + angle_at(&pb, &pd, &pc);
    opposite_after + ANGLE_EPSILON < opposite_now
}

/// Flip non-Delaunay edges until a full pass flips nothing.
///
/// Flips only happen between triangles with the same area tag, never create an
/// edge that already exists, and with `restrict_to_planes` only join coplanar
/// triangles. Stops after `max_passes` full scans; the triangulation reached so
/// far is kept.
pub fn optimize(mesh: &mut NavMesh, restrict_to_planes: bool, max_passes: usize) -> DelaunayStats {
    let mut stats = DelaunayStats {
        rewound: normalize_winding(mesh),
        ..Default::default()
    };
    if stats.rewound > 0 {
        debug!("Reversed winding of {} triangles", stats.rewound);
    }

    let mut he = HalfEdgeMesh::from_mesh(mesh);
    // Half-edges per undirected edge; a non-manifold edge keeps its entry
    // while any face still uses it.
    let mut edge_counts: HashMap<(usize, usize), usize> = HashMap::new();
    for e in 0..he.edges.len() {
        *edge_counts.entry(undirected(he.origin(e), he.dest(e))).or_insert(0) += 1;
    }
    let candidates: Vec<(usize, usize)> = he.interior_edges().collect();
    debug!(
        edges = he.edges.len(),
        interior = candidates.len(),
        "Built half-edge mesh"
    );

    loop {
        if stats.passes >= max_passes {
            // Only report the limit if another pass would still change something
            stats.hit_pass_limit = candidates
                .iter()
                .any(|&(e, o)| should_flip(mesh, &he, &edge_counts, e, o, restrict_to_planes));
            break;
        }
        stats.passes += 1;

        let mut flipped = 0;
        for &(e, o) in &candidates {
            if !should_flip(mesh, &he, &edge_counts, e, o, restrict_to_planes) {
                continue;
            }
            let old = undirected(he.origin(e), he.dest(e));
            let new = undirected(he.apex(e), he.apex(o));
            if he.flip(e) {
                if let Some(count) = edge_counts.get_mut(&old) {
                    *count = count.saturating_sub(2);
                    if *count == 0 {
                        edge_counts.remove(&old);
                    }
                }
                *edge_counts.entry(new).or_insert(0) += 2;
                flipped += 1;
            }
        }

        stats.flips += flipped;
        if flipped == 0 {
            break;
        }
    }

    he.write_back(mesh);

    if stats.hit_pass_limit {
        warn!(
            passes = stats.passes,
            flips = stats.flips,
            "Delaunay pass limit reached; keeping current triangulation"
        );
    }
    info!(
        "Delaunay: {} flips in {} passes",
        stats.flips, stats.passes
    );
    stats
}
