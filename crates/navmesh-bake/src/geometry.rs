//! Geometric primitives and distance queries.
//!
//! The world is Y-up: "horizontal" always means the XZ plane. All queries run
//! in `f64`, and the triangle queries translate into a frame local to the first
//! corner before doing any arithmetic so large world coordinates do not eat the
//! mantissa.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// World up axis.
pub const UP: Vector3<f64> = Vector3::new(0.0, 1.0, 0.0);

/// Project a point onto the horizontal plane as `[x, z]`.
#[inline]
pub fn horizontal(p: &Point3<f64>) -> [f64; 2] {
    [p.x, p.z]
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from two arbitrary opposite corners.
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Create a box from its center and half extents.
    pub fn from_center(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Bounds of a point set, or `None` when the set is empty.
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.min.z = bounds.min.z.min(p.z);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
            bounds.max.z = bounds.max.z.max(p.z);
        }
        Some(bounds)
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vector3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Box volume.
    #[inline]
    pub fn volume(&self) -> f64 {
        let d = self.max - self.min;
        d.x * d.y * d.z
    }

    /// Area of the box's footprint on the horizontal plane.
    #[inline]
    pub fn horizontal_area(&self) -> f64 {
        let d = self.max - self.min;
        d.x * d.z
    }

    /// Box center.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Unnormalized triangle normal; its length is twice the triangle area.
#[inline]
pub fn normal_unnormalized(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

/// Unit triangle normal, or `None` for a zero-area triangle.
pub fn normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Vector3<f64>> {
    normal_unnormalized(a, b, c).try_normalize(f64::EPSILON)
}

/// Closest point on segment `ab` to `p`, with its parameter `t` in `[0, 1]`.
pub fn closest_point_on_segment(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
) -> (Point3<f64>, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON * f64::EPSILON {
        return (*a, 0.0);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest point on triangle `abc` to `p`.
///
/// Classifies `p` against the Voronoi regions of the triangle's vertices,
/// edges and face using barycentric coordinates.
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    // Work relative to `a`.
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = ap - ab;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = ap - ac;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Horizontal distance from `p` to triangle `abc`, ignoring height.
pub fn horizontal_distance_to_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> f64 {
    let flat = |q: &Point3<f64>| Point3::new(q.x, 0.0, q.z);
    let (fp, fa, fb, fc) = (flat(p), flat(a), flat(b), flat(c));
    // A vertical triangle flattens to a segment; the segment query still works.
    let closest = closest_point_on_triangle(&fp, &fa, &fb, &fc);
    (closest - fp).norm()
}

/// Orthonormal basis `(u, v)` of the plane with unit normal `n`, with `u × v = n`.
fn plane_basis(n: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = helper.cross(n).normalize();
    let v = n.cross(&u);
    (u, v)
}

/// Scale-normalized in-circumcircle predicate.
///
/// Projects `d` onto the plane of `abc` and evaluates the classic 2D in-circle
/// determinant with `abc` counter-clockwise around their own normal. The result
/// is divided by the fourth power of the longest edge of `abc`, so thresholds
/// are independent of mesh scale.
///
/// Positive: `d` lies inside the circumcircle. Zero: cocircular. Negative:
/// outside. Returns `0.0` for a degenerate `abc`.
pub fn in_circumcircle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let Some(n) = normal(a, b, c) else {
        return 0.0;
    };
    let (u, v) = plane_basis(&n);
    let project = |p: &Point3<f64>| {
        let r = p - d;
        (r.dot(&u), r.dot(&v))
    };
    let (ax, ay) = project(a);
    let (bx, by) = project(b);
    let (cx, cy) = project(c);

    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let det = ax * (by * c2 - b2 * cy) - ay * (bx * c2 - b2 * cx) + a2 * (bx * cy - by * cx);

    let scale = (b - a)
        .norm_squared()
        .max((c - b).norm_squared())
        .max((a - c).norm_squared());
    det / (scale * scale)
}

/// Interior angle at `apex` of the triangle `(apex, p, q)`, in radians.
pub fn angle_at(apex: &Point3<f64>, p: &Point3<f64>, q: &Point3<f64>) -> f64 {
    let e1 = p - apex;
    let e2 = q - apex;
    let denom = e1.norm() * e2.norm();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    (e1.dot(&e2) / denom).clamp(-1.0, 1.0).acos()
}
