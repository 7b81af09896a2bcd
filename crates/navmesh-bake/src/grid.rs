//! Uniform grid over triangle bounds on the horizontal plane.
//!
//! Built once per link resolution pass and read-only afterwards. Cells are
//! square; the grid spans the larger horizontal extent of the mesh in
//! `cells_per_axis` steps on both axes.

use nalgebra::Point3;
use tracing::debug;

use crate::geometry::horizontal;
use crate::types::NavMesh;

/// Largest supported `cells_per_axis`.
pub const MAX_GRID_CELLS: usize = 1024;

/// Spatial index from grid cell to the triangles overlapping it.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    origin: [f64; 2],
    cell_size: f64,
    cells_per_axis: usize,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    /// Build a grid over `mesh` with `cells_per_axis` cells per axis.
    ///
    /// `cells_per_axis` is clamped to `1..=MAX_GRID_CELLS`.
    pub fn build(mesh: &NavMesh, cells_per_axis: usize) -> Self {
        let n = cells_per_axis.clamp(1, MAX_GRID_CELLS);
        let (min, max) = mesh.horizontal_bounds().unwrap_or(([0.0; 2], [0.0; 2]));
        let extent = (max[0] - min[0]).max(max[1] - min[1]);
        let cell_size = if extent > 0.0 { extent / n as f64 } else { 1.0 };

        let mut grid = Self {
            origin: min,
            cell_size,
            cells_per_axis: n,
            cells: vec![Vec::new(); n * n],
        };

        for t in 0..mesh.triangles.len() {
            let corners = mesh.corners(t).map(|p| horizontal(&p));
            let lo = [
                corners.iter().map(|c| c[0]).fold(f64::INFINITY, f64::min),
                corners.iter().map(|c| c[1]).fold(f64::INFINITY, f64::min),
            ];
            let hi = [
                corners.iter().map(|c| c[0]).fold(f64::NEG_INFINITY, f64::max),
                corners.iter().map(|c| c[1]).fold(f64::NEG_INFINITY, f64::max),
            ];
            let (x0, z0) = grid.clamped_cell(lo);
            let (x1, z1) = grid.clamped_cell(hi);
            for z in z0..=z1 {
                for x in x0..=x1 {
                    grid.cells[z * n + x].push(t);
                }
            }
        }

        debug!(
            cells = n * n,
            cell_size,
            occupied = grid.cells.iter().filter(|c| !c.is_empty()).count(),
            "Built spatial grid"
        );
        grid
    }

    /// Edge length of one cell.
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cells per axis.
    #[inline]
    pub fn cells_per_axis(&self) -> usize {
        self.cells_per_axis
    }

    /// Unbounded cell coordinates of a horizontal point.
    fn raw_cell(&self, p: [f64; 2]) -> (f64, f64) {
        (
            ((p[0] - self.origin[0]) / self.cell_size).floor(),
            ((p[1] - self.origin[1]) / self.cell_size).floor(),
        )
    }

    fn clamped_cell(&self, p: [f64; 2]) -> (usize, usize) {
        let max = (self.cells_per_axis - 1) as f64;
        let (x, z) = self.raw_cell(p);
        (x.clamp(0.0, max) as usize, z.clamp(0.0, max) as usize)
    }

    /// Cell containing `p`, or `None` if `p` lies outside the grid.
    ///
    /// Points on the far boundary belong to the last cell.
    pub fn cell_of(&self, p: &Point3<f64>) -> Option<(usize, usize)> {
        let h = horizontal(p);
        if !h[0].is_finite() || !h[1].is_finite() {
            return None;
        }
        let (x, z) = self.raw_cell(h);
        let n = self.cells_per_axis as f64;
        let inside = |c: f64, coord: f64, origin: f64| {
            c >= 0.0 && (c < n || coord <= origin + n * self.cell_size)
        };
        if inside(x, h[0], self.origin[0]) && inside(z, h[1], self.origin[1]) {
            Some(self.clamped_cell(h))
        } else {
            None
        }
    }

    /// Triangles overlapping the cell.
    pub fn triangles_in(&self, x: usize, z: usize) -> &[usize] {
        &self.cells[z * self.cells_per_axis + x]
    }

    /// Candidate triangles for a query at `p` with search radius `radius`.
    ///
    /// Searches the cell containing `p` plus `ceil(radius / cell_size)` rings of
    /// neighbors. With a positive radius a point outside the grid is clamped to
    /// the nearest border cell; with a zero radius it has no candidates. Every
    /// triangle appears once, in ascending index order.
    pub fn candidates(&self, p: &Point3<f64>, radius: f64) -> Vec<usize> {
        let h = horizontal(p);
        if !h[0].is_finite() || !h[1].is_finite() {
            return Vec::new();
        }

        let rings = if radius > 0.0 {
            ((radius / self.cell_size).ceil() as usize).min(self.cells_per_axis)
        } else {
            0
        };

        let (cx, cz) = if rings == 0 {
            match self.cell_of(p) {
                Some(cell) => cell,
                None => return Vec::new(),
            }
        } else {
            self.clamped_cell(h)
        };

        let last = self.cells_per_axis - 1;
        let mut found = Vec::new();
        for z in cz.saturating_sub(rings)..=(cz + rings).min(last) {
            for x in cx.saturating_sub(rings)..=(cx + rings).min(last) {
                found.extend_from_slice(self.triangles_in(x, z));
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}
