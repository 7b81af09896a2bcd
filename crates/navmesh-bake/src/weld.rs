//! Vertex welding and compaction.
//!
//! Authoring tools export each object separately, so coincident vertices along
//! object seams arrive as distinct indices. Welding merges them so adjacency can
//! be recovered from shared indices alone.

use tracing::{debug, info};

use crate::types::NavMesh;

/// Counts from one welding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeldStats {
    /// Vertices merged into an earlier vertex.
    pub vertices_welded: usize,
    /// Triangles removed because two of their corners merged.
    pub degenerate_removed: usize,
    /// Vertices dropped because no triangle referenced them.
    pub unused_removed: usize,
}

/// Merge vertices whose squared distance is at most `epsilon`.
///
/// Every vertex is merged into the lowest-indexed vertex within range that has
/// not itself been merged, so the result depends only on input order. Triangle
/// indices are remapped; vertex storage is left untouched until
/// [`remove_unused_vertices`] compacts it.
///
/// Returns the number of vertices merged. An `epsilon` of zero or below is a
/// no-op.
pub fn weld_vertices(mesh: &mut NavMesh, epsilon: f64) -> usize {
    let count = mesh.vertices.len();
    if count == 0 || epsilon <= 0.0 {
        return 0;
    }

    let mut remap: Vec<usize> = (0..count).collect();
    let mut merged = 0;

    for i in 0..count {
        if remap[i] != i {
            continue;
        }
        let anchor = mesh.vertices[i].position;
        for j in (i + 1)..count {
            if remap[j] != j {
                continue;
            }
            if (mesh.vertices[j].position - anchor).norm_squared() <= epsilon {
                remap[j] = i;
                merged += 1;
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    for tri in &mut mesh.triangles {
        for v in &mut tri.vertices {
            *v = remap[*v];
        }
    }

    info!(
        "Welded {} vertices (epsilon = {:e}): {} → {}",
        merged,
        epsilon,
        count,
        count - merged
    );
    merged
}

/// Remove triangles with two or more identical corner indices.
///
/// Returns the number of triangles removed.
pub fn remove_collapsed_triangles(mesh: &mut NavMesh) -> usize {
    let before = mesh.triangles.len();
    mesh.triangles.retain(|t| !t.is_collapsed());
    let removed = before - mesh.triangles.len();
    if removed > 0 {
        debug!("Removed {} collapsed triangles", removed);
    }
    removed
}

/// Drop vertices no triangle references and compact triangle indices.
///
/// Surviving vertices keep their relative order and their `id`.
///
/// Returns the number of vertices removed.
pub fn remove_unused_vertices(mesh: &mut NavMesh) -> usize {
    let original_count = mesh.vertices.len();

    let mut referenced = vec![false; original_count];
    for tri in &mesh.triangles {
        for &v in &tri.vertices {
            referenced[v] = true;
        }
    }

    if referenced.iter().all(|&r| r) {
        return 0;
    }

    let mut remap = vec![usize::MAX; original_count];
    let mut new_vertices = Vec::with_capacity(original_count);
    for (old_idx, vertex) in mesh.vertices.drain(..).enumerate() {
        if referenced[old_idx] {
            remap[old_idx] = new_vertices.len();
            new_vertices.push(vertex);
        }
    }

    for tri in &mut mesh.triangles {
        for v in &mut tri.vertices {
            *v = remap[*v];
        }
    }

    let removed = original_count - new_vertices.len();
    mesh.vertices = new_vertices;

    if removed > 0 {
        debug!("Removed {} unused vertices", removed);
    }
    removed
}

/// Weld, drop collapsed triangles and compact.
pub fn weld(mesh: &mut NavMesh, epsilon: f64) -> WeldStats {
    let vertices_welded = weld_vertices(mesh, epsilon);
    let degenerate_removed = remove_collapsed_triangles(mesh);
    let unused_removed = remove_unused_vertices(mesh);
    WeldStats {
        vertices_welded,
        degenerate_removed,
        unused_removed,
    }
}
