//! Off-mesh link resolution.
//!
//! Each link endpoint is attached to the triangle it stands on. Candidates
//! come from the [`SpatialGrid`]; a candidate qualifies when the endpoint lies
//! within the error-correction radius of it on the horizontal plane, so links
//! may hover above or below the surface by any amount. Among qualifying
//! triangles the one closest in 3D wins, which picks the right floor where
//! levels overlap.

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::geometry::{closest_point_on_triangle, horizontal_distance_to_triangle};
use crate::grid::SpatialGrid;
use crate::report::{BakeIssue, LinkEndpoint};
use crate::types::{Link, NavMesh};

/// Horizontal slack for an endpoint to count as standing on a triangle when
/// error correction is off.
pub const ON_MESH_TOLERANCE: f64 = 1e-6;

/// Where an endpoint landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointHit {
    /// Triangle index.
    pub triangle: usize,
    /// Closest point on that triangle.
    pub point: Point3<f64>,
    /// 3D distance from the endpoint to `point`.
    pub distance: f64,
}

/// Counts from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Links with both endpoints resolved.
    pub resolved: usize,
    /// Links dropped for an unresolved endpoint.
    pub dropped: usize,
}

/// Resolves link endpoints against one mesh.
pub struct LinkResolver<'m> {
    mesh: &'m NavMesh,
    grid: SpatialGrid,
    error_correction: f64,
}

impl<'m> LinkResolver<'m> {
    /// Build a resolver, indexing `mesh` with `grid_cells` cells per axis.
    pub fn new(mesh: &'m NavMesh, grid_cells: usize, error_correction: f64) -> Self {
        Self {
            mesh,
            grid: SpatialGrid::build(mesh, grid_cells),
            error_correction: error_correction.max(0.0),
        }
    }

    /// The underlying grid.
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Find the triangle `p` stands on.
    ///
    /// Ties in 3D distance go to the lower triangle index.
    pub fn resolve_point(&self, p: &Point3<f64>) -> Option<EndpointHit> {
        let reach = self.error_correction.max(ON_MESH_TOLERANCE);
        let mut best: Option<EndpointHit> = None;

        for t in self.grid.candidates(p, self.error_correction) {
            let [a, b, c] = self.mesh.corners(t);
            if horizontal_distance_to_triangle(p, &a, &b, &c) > reach {
                continue;
            }
            let point = closest_point_on_triangle(p, &a, &b, &c);
            let distance = (point - p).norm();
            // Candidates arrive in ascending order, so strict `<` keeps the lower index
            if best.is_none_or(|hit| distance < hit.distance) {
                best = Some(EndpointHit {
                    triangle: t,
                    point,
                    distance,
                });
            }
        }
        best
    }

    /// Resolve both endpoints of `link`.
    ///
    /// On success the triangle indices are filled in and, with error
    /// correction enabled, the endpoints snapped onto the surface. Returns the
    /// endpoints that failed; the link is left untouched in that case.
    pub fn resolve(&self, link: &mut Link) -> Vec<LinkEndpoint> {
        let start = self.resolve_point(&link.start);
        let end = self.resolve_point(&link.end);

        let mut failed = Vec::new();
        if start.is_none() {
            failed.push(LinkEndpoint::Start);
        }
        if end.is_none() {
            failed.push(LinkEndpoint::End);
        }

        if let (Some(start), Some(end)) = (start, end) {
            link.start_triangle = Some(start.triangle);
            link.end_triangle = Some(end.triangle);
            if self.error_correction > 0.0 {
                link.start = start.point;
                link.end = end.point;
            }
        }
        failed
    }
}

/// Resolve every link, dropping those with an endpoint off the mesh.
///
/// Returns the surviving links, one [`BakeIssue::LinkUnresolved`] per failed
/// endpoint, and counts.
pub fn resolve_links(
    mesh: &NavMesh,
    links: Vec<Link>,
    grid_cells: usize,
    error_correction: f64,
) -> (Vec<Link>, Vec<BakeIssue>, LinkStats) {
    let mut stats = LinkStats::default();
    let mut issues = Vec::new();
    if links.is_empty() {
        return (links, issues, stats);
    }

    let resolver = LinkResolver::new(mesh, grid_cells, error_correction);
    let mut resolved = Vec::with_capacity(links.len());

    for mut link in links {
        let failed = resolver.resolve(&mut link);
        if failed.is_empty() {
            debug!(
                link = %link.name,
                start_triangle = ?link.start_triangle,
                end_triangle = ?link.end_triangle,
                "Resolved link"
            );
            stats.resolved += 1;
            resolved.push(link);
            continue;
        }

        stats.dropped += 1;
        for endpoint in failed {
            let p = match endpoint {
                LinkEndpoint::Start => link.start,
                LinkEndpoint::End => link.end,
            };
            warn!(link = %link.name, %endpoint, "Link endpoint is not on the navmesh");
            issues.push(BakeIssue::LinkUnresolved {
                link: link.name.clone(),
                endpoint,
                position: [p.x, p.y, p.z],
            });
        }
    }

    info!(
        "Resolved {} links ({} dropped)",
        stats.resolved, stats.dropped
    );
    (resolved, issues, stats)
}
