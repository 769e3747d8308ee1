use serde::{Deserialize, Serialize};

use super::CurveEval;
use super::point::Point3d;
use super::poly_point::PolyPoint;
use super::surfaces::Surface;

/// Axis-aligned bounding box. A void box contains nothing and overlaps
/// nothing, itself included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::void()
    }
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn void() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point3d]) -> Self {
        let mut bb = Self::void();
        for p in points {
            bb.add_point(p);
        }
        bb
    }

    pub fn is_void(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn add_point(&mut self, p: &Point3d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn add_box(&mut self, other: &Self) {
        if other.is_void() {
            return;
        }
        self.add_point(&other.min);
        self.add_point(&other.max);
    }

    /// Grows the box by `gap` on every side. Void boxes stay void.
    pub fn enlarge(&mut self, gap: f64) {
        if self.is_void() {
            return;
        }
        let g = gap.abs();
        self.min = Point3d::new(self.min.x - g, self.min.y - g, self.min.z - g);
        self.max = Point3d::new(self.max.x + g, self.max.y + g, self.max.z + g);
    }

    pub fn enlarged(mut self, gap: f64) -> Self {
        self.enlarge(gap);
        self
    }

    /// True when the boxes are disjoint or either one is void.
    pub fn is_out(&self, other: &Self) -> bool {
        self.is_void()
            || other.is_void()
            || self.min.x > other.max.x
            || self.max.x < other.min.x
            || self.min.y > other.max.y
            || self.max.y < other.min.y
            || self.min.z > other.max.z
            || self.max.z < other.min.z
    }

    pub fn intersects(&self, other: &Self) -> bool {
        !self.is_out(other)
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        !self.is_void()
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Overlap of two boxes, void when they are disjoint.
    pub fn common(&self, other: &Self) -> Self {
        if self.is_out(other) {
            return Self::void();
        }
        Self::new(
            Point3d::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            Point3d::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        )
    }

    pub fn diagonal(&self) -> f64 {
        if self.is_void() {
            return 0.0;
        }
        self.min.distance_to(&self.max)
    }

    /// Box of `curve` over `[first, last]`, from `samples` segments grown by
    /// the largest gap between a segment's chord midpoint and the curve.
    pub fn of_curve_range<C: CurveEval + ?Sized>(
        curve: &C,
        first: f64,
        last: f64,
        samples: usize,
    ) -> Self {
        let n = samples.max(1);
        let step = (last - first) / n as f64;
        let mut bb = Self::void();
        let mut deflection: f64 = 0.0;
        let mut prev = curve.evaluate(first);
        bb.add_point(&prev);
        for i in 1..=n {
            let t = if i == n { last } else { first + step * i as f64 };
            let p = curve.evaluate(t);
            let mid = curve.evaluate(t - 0.5 * step);
            deflection = deflection.max(mid.distance_to(&prev.midpoint(&p)));
            bb.add_point(&p);
            prev = p;
        }
        bb.enlarge(deflection);
        bb
    }

    /// Box of the surface patch `[u0, u1] x [v0, v1]` sampled on an
    /// `n x n` grid, grown by the largest gap between a grid diagonal's
    /// chord midpoint and the surface point at the averaged parameters.
    pub fn of_surface_patch(surface: &Surface, u: (f64, f64), v: (f64, f64), n: usize) -> Self {
        let n = n.max(1);
        let du = (u.1 - u.0) / n as f64;
        let dv = (v.1 - v.0) / n as f64;
        let at = |i: usize, j: usize| {
            let ui = if i == n { u.1 } else { u.0 + du * i as f64 };
            let vj = if j == n { v.1 } else { v.0 + dv * j as f64 };
            PolyPoint::on_surface(surface, ui, vj)
        };
        let mut bb = Self::void();
        let mut deflection: f64 = 0.0;
        for i in 0..=n {
            for j in 0..=n {
                let p = at(i, j);
                bb.add_point(&p.position());
                if i > 0 && j > 0 {
                    let corner = at(i - 1, j - 1);
                    let chord = (p + corner) * 0.5;
                    let mid = p.middle(surface, &corner);
                    deflection = deflection.max(mid.square_distance(&chord).sqrt());
                }
            }
        }
        bb.enlarge(deflection);
        bb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::curves::{Circle3d, Curve};
    use crate::geometry::surfaces::Sphere;
    use crate::geometry::vector::Vec3;

    #[test]
    fn test_void_box_never_overlaps() {
        let v = BoundingBox::void();
        assert!(v.is_void());
        assert!(v.is_out(&v));
        let mut g = v;
        g.enlarge(10.0);
        assert!(g.is_void());
        let a = BoundingBox::new(Point3d::ORIGIN, Point3d::new(1.0, 1.0, 1.0));
        assert!(a.is_out(&v) && v.is_out(&a));
    }

    #[test]
    fn test_touching_boxes_overlap() {
        let a = BoundingBox::new(Point3d::ORIGIN, Point3d::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Point3d::new(1.0, 0.0, 0.0), Point3d::new(2.0, 1.0, 1.0));
        let c = BoundingBox::new(Point3d::new(1.5, 0.0, 0.0), Point3d::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(a.is_out(&c));
        assert!(a.enlarged(0.5).intersects(&c));
        let common = a.common(&b);
        assert_eq!(common.min.x, 1.0);
        assert_eq!(common.max.x, 1.0);
    }

    #[test]
    fn test_circle_box_contains_the_circle() {
        let c = Curve::Circle(Circle3d::new(Point3d::ORIGIN, Vec3::Z, 1.0));
        let bb = BoundingBox::of_curve_range(&c, 0.0, std::f64::consts::TAU, 16);
        for k in 0..100 {
            let p = c.evaluate(k as f64 * 0.0628);
            assert!(bb.contains_point(&p));
        }
    }

    #[test]
    fn test_sphere_patch_box_contains_the_patch() {
        let s = Surface::Sphere(Sphere::new(Point3d::ORIGIN, 2.0));
        let bb = BoundingBox::of_surface_patch(&s, (0.0, 1.5), (-0.5, 0.5), 3);
        for i in 0..=10 {
            for j in 0..=10 {
                let p = s.evaluate(0.15 * i as f64, -0.5 + 0.1 * j as f64);
                assert!(bb.contains_point(&p));
            }
        }
    }
}
