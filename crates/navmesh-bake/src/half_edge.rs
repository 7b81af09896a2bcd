//! Arena-backed half-edge mesh.
//!
//! Face `f` owns half-edges `3f`, `3f + 1` and `3f + 2` when first built.
//! Flips rewire `next`/`prev`/`face` but never allocate, so the arena keeps its
//! size and every face keeps its index. That index is the triangle index in the
//! [`NavMesh`] the structure was built from.

use crate::types::NavMesh;

/// A directed edge of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Vertex the edge starts at.
    pub origin: usize,
    /// Next edge around the face.
    pub next: usize,
    /// Previous edge around the face.
    pub prev: usize,
    /// The matching edge of the neighboring face, if any.
    pub opposite: Option<usize>,
    /// Face this edge belongs to.
    pub face: usize,
}

/// Half-edge connectivity over a triangle mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalfEdgeMesh {
    /// Edge arena.
    pub edges: Vec<HalfEdge>,
    /// One edge per face.
    pub faces: Vec<usize>,
}

impl HalfEdgeMesh {
    /// Build connectivity for `mesh`.
    ///
    /// Opposite edges are matched pairwise: edge `a → b` pairs with the first
    /// unmatched edge `b' → a'` of another face where each endpoint is the same
    /// vertex or sits at the same position. Faces must already share a winding
    /// order; edges of inconsistently wound neighbors stay unmatched.
    pub fn from_mesh(mesh: &NavMesh) -> Self {
        let mut edges = Vec::with_capacity(mesh.triangles.len() * 3);
        let mut faces = Vec::with_capacity(mesh.triangles.len());

        for (face, tri) in mesh.triangles.iter().enumerate() {
            let base = face * 3;
            for k in 0..3 {
                edges.push(HalfEdge {
                    origin: tri.vertices[k],
                    next: base + (k + 1) % 3,
                    prev: base + (k + 2) % 3,
                    opposite: None,
                    face,
                });
            }
            faces.push(base);
        }

        let mut he = Self { edges, faces };
        he.link_opposites(mesh);
        he
    }

    fn link_opposites(&mut self, mesh: &NavMesh) {
        let same = |u: usize, v: usize| u == v || mesh.position(u) == mesh.position(v);

        for e in 0..self.edges.len() {
            if self.edges[e].opposite.is_some() {
                continue;
            }
            let (a, b) = (self.origin(e), self.dest(e));
            for f in (e + 1)..self.edges.len() {
                if self.edges[f].opposite.is_some() || self.edges[f].face == self.edges[e].face {
                    continue;
                }
                if same(self.origin(f), b) && same(self.dest(f), a) {
                    self.edges[e].opposite = Some(f);
                    self.edges[f].opposite = Some(e);
                    break;
                }
            }
        }
    }

    /// Number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Start vertex of edge `e`.
    #[inline]
    pub fn origin(&self, e: usize) -> usize {
        self.edges[e].origin
    }

    /// End vertex of edge `e`.
    #[inline]
    pub fn dest(&self, e: usize) -> usize {
        self.edges[self.edges[e].next].origin
    }

    /// Whether edge `e` lies on the mesh border.
    #[inline]
    pub fn is_border(&self, e: usize) -> bool {
        self.edges[e].opposite.is_none()
    }

    /// Interior edges, each reported once as `(edge, opposite)` with `edge < opposite`.
    pub fn interior_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(e, he)| he.opposite.filter(|&o| e < o).map(|o| (e, o)))
    }

    /// Corner vertices of face `f` in winding order.
    pub fn face_vertices(&self, f: usize) -> [usize; 3] {
        let e0 = self.faces[f];
        let e1 = self.edges[e0].next;
        let e2 = self.edges[e1].next;
        [self.origin(e0), self.origin(e1), self.origin(e2)]
    }

    /// The vertex of `e`'s face that is not on `e`.
    #[inline]
    pub fn apex(&self, e: usize) -> usize {
        self.edges[self.edges[e].prev].origin
    }

    /// Flip interior edge `e` to connect the two apexes of its faces.
    ///
    /// With `e = a → b` in face `(a, b, c)` and its opposite in `(b, a, d)`,
    /// the faces become `(d, c, a)` and `(c, d, b)`; winding is preserved.
    /// Returns `false` and leaves the mesh untouched for a border edge.
    pub fn flip(&mut self, e: usize) -> bool {
        let Some(o) = self.edges[e].opposite else {
            return false;
        };

        let e1 = self.edges[e].next;
        let e2 = self.edges[e].prev;
        let o1 = self.edges[o].next;
        let o2 = self.edges[o].prev;
        let f1 = self.edges[e].face;
        let f2 = self.edges[o].face;
        let c = self.edges[e2].origin;
        let d = self.edges[o2].origin;

        self.edges[e].origin = d;
        self.edges[o].origin = c;

        self.link_cycle([e, e2, o1], f1);
        self.link_cycle([o, o2, e1], f2);

        self.faces[f1] = e;
        self.faces[f2] = o;
        true
    }

    fn link_cycle(&mut self, cycle: [usize; 3], face: usize) {
        for k in 0..3 {
            let edge = &mut self.edges[cycle[k]];
            edge.next = cycle[(k + 1) % 3];
            edge.prev = cycle[(k + 2) % 3];
            edge.face = face;
        }
    }

    /// Write face corners back onto the mesh's triangles.
    pub fn write_back(&self, mesh: &mut NavMesh) {
        for (f, tri) in mesh.triangles.iter_mut().enumerate() {
            tri.vertices = self.face_vertices(f);
        }
    }
}
