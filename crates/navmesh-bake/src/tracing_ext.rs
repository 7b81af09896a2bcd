//! Tracing helpers for bake stages.
//!
//! Stages log their own summaries at `info`. This module adds per-stage timing
//! and mesh-state snapshots under dedicated targets, so they can be filtered
//! separately:
//!
//! - `navmesh_bake::timing`: stage start at `debug`, elapsed time at `info`
//! - `navmesh_bake::mesh_state`: vertex/triangle counts and extent at `debug`
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::new("navmesh_bake=info,navmesh_bake::mesh_state=debug"))
//!     .init();
//! ```

use std::time::Instant;
use tracing::{Span, debug, info};

use crate::types::NavMesh;

/// Times one bake stage and logs the duration on drop.
///
/// ```rust,ignore
/// let _timer = OperationTimer::with_context("weld", &mesh);
/// // ... stage work ...
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Start timing `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("bake_stage", stage = name);
        debug!(target: "navmesh_bake::timing", stage = name, "Starting stage");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Start timing `name`, recording the mesh size it starts from.
    pub fn with_context(name: &'static str, mesh: &NavMesh) -> Self {
        let span = tracing::info_span!(
            "bake_stage",
            stage = name,
            triangles = mesh.triangle_count(),
            vertices = mesh.vertex_count()
        );
        debug!(
            target: "navmesh_bake::timing",
            stage = name,
            triangles = mesh.triangle_count(),
            vertices = mesh.vertex_count(),
            "Starting stage"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        info!(
            target: "navmesh_bake::timing",
            stage = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Stage completed"
        );
    }
}

/// Log vertex/triangle counts and horizontal extent of `mesh`.
pub fn log_mesh_stats(mesh: &NavMesh, context: &str) {
    let (min, max) = mesh.horizontal_bounds().unwrap_or_default();
    debug!(
        target: "navmesh_bake::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        extent = format!("{:.2} x {:.2}", max[0] - min[0], max[1] - min[1]),
        "Mesh state"
    );
}
