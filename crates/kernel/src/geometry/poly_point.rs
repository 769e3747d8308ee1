use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::surfaces::Surface;
use super::vector::Vec3;

/// Divisors with a smaller magnitude are treated as zero.
pub const DIVIDE_RESOLUTION: f64 = 1e-20;

/// A sample point carrying both its 3D position and the surface
/// parameters it was evaluated at, plus an integer classification tag.
///
/// Arithmetic acts on all five coordinates; the tag is kept from the
/// left-hand operand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolyPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub u: f64,
    pub v: f64,
    pub tag: i32,
}

impl PolyPoint {
    pub fn new(x: f64, y: f64, z: f64, u: f64, v: f64) -> Self {
        Self {
            x,
            y,
            z,
            u,
            v,
            tag: 0,
        }
    }

    /// Sample of `surface` at `(u, v)`.
    pub fn on_surface(surface: &Surface, u: f64, v: f64) -> Self {
        let p = surface.evaluate(u, v);
        Self::new(p.x, p.y, p.z, u, v)
    }

    pub fn with_tag(mut self, tag: i32) -> Self {
        self.tag = tag;
        self
    }

    pub fn position(&self) -> Point3d {
        Point3d::new(self.x, self.y, self.z)
    }

    /// Divides every coordinate by `r`.
    ///
    /// A divisor below `DIVIDE_RESOLUTION` yields the zero point (tag
    /// kept) instead of infinities; use `try_divide` to detect that case.
    pub fn divide(&self, r: f64) -> Self {
        self.try_divide(r).unwrap_or(Self {
            tag: self.tag,
            ..Self::default()
        })
    }

    pub fn try_divide(&self, r: f64) -> Option<Self> {
        if r.abs() < DIVIDE_RESOLUTION {
            return None;
        }
        Some(Self {
            x: self.x / r,
            y: self.y / r,
            z: self.z / r,
            u: self.u / r,
            v: self.v / r,
            tag: self.tag,
        })
    }

    /// Dot product of the 3D parts.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product of the 3D parts; parameters are zeroed.
    pub fn cross(&self, other: &Self) -> Self {
        let c = Vec3::new(self.x, self.y, self.z).cross(&Vec3::new(other.x, other.y, other.z));
        Self::new(c.x, c.y, c.z, 0.0, 0.0).with_tag(self.tag)
    }

    pub fn square_distance(&self, other: &Self) -> f64 {
        self.position().distance_squared_to(&other.position())
    }

    pub fn square_modulus(&self) -> f64 {
        self.dot(self)
    }

    /// Point of `surface` at the averaged parameters of `self` and `other`.
    /// On curved surfaces this differs from the chord midpoint, which is
    /// what deflection estimates measure.
    pub fn middle(&self, surface: &Surface, other: &Self) -> Self {
        let u = 0.5 * (self.u + other.u);
        let v = 0.5 * (self.v + other.v);
        Self::on_surface(surface, u, v)
    }
}

impl Add for PolyPoint {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
            u: self.u + rhs.u,
            v: self.v + rhs.v,
            tag: self.tag,
        }
    }
}

impl Sub for PolyPoint {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
            u: self.u - rhs.u,
            v: self.v - rhs.v,
            tag: self.tag,
        }
    }
}

impl Mul<f64> for PolyPoint {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
            u: self.u * rhs,
            v: self.v * rhs,
            tag: self.tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::surfaces::{Plane, Sphere};

    #[test]
    fn test_divide_by_zero_gives_zero_point() {
        let p = PolyPoint::new(1.0, 2.0, 3.0, 0.5, 0.25).with_tag(4);
        let z = p.divide(0.0);
        assert_eq!(z.x, 0.0);
        assert_eq!(z.u, 0.0);
        assert_eq!(z.tag, 4);
        assert!(p.try_divide(0.0).is_none());
    }

    #[test]
    fn test_tiny_divisor_counts_as_zero() {
        let p = PolyPoint::new(1.0, 2.0, 3.0, 0.5, 0.25);
        assert!(p.try_divide(1e-25).is_none());
        assert_eq!(p.divide(-1e-21).position(), Point3d::ORIGIN);
        assert!(p.try_divide(1e-15).is_some());
    }

    #[test]
    fn test_divide_undoes_multiply() {
        let p = PolyPoint::new(1.0, -2.0, 3.0, 0.5, 0.25);
        let back = (p * 3.5).divide(3.5);
        assert!(back.square_distance(&p) < 1e-24);
        assert!((back.u - p.u).abs() < 1e-15);
    }

    #[test]
    fn test_cross_and_dot() {
        let a = PolyPoint::new(1.0, 0.0, 0.0, 0.0, 0.0);
        let b = PolyPoint::new(0.0, 1.0, 0.0, 0.0, 0.0);
        let c = a.cross(&b);
        assert_eq!((c.x, c.y, c.z), (0.0, 0.0, 1.0));
        assert_eq!(a.dot(&b), 0.0);
        assert_eq!((a - b).square_modulus(), 2.0);
    }

    #[test]
    fn test_middle_lies_on_surface() {
        let sphere = Surface::Sphere(Sphere::new(Point3d::ORIGIN, 1.0));
        let a = PolyPoint::on_surface(&sphere, 0.0, 0.0);
        let b = PolyPoint::on_surface(&sphere, 1.5, 0.0);
        let m = a.middle(&sphere, &b);
        assert!((m.position().distance_to(&Point3d::ORIGIN) - 1.0).abs() < 1e-12);
        assert!((m.u - 0.75).abs() < 1e-15);

        // On a plane the surface midpoint and the chord midpoint agree.
        let plane = Surface::Plane(Plane::xy());
        let a = PolyPoint::on_surface(&plane, 0.0, 0.0);
        let b = PolyPoint::on_surface(&plane, 2.0, 4.0);
        let m = a.middle(&plane, &b);
        assert!(m.position().distance_to(&a.position().midpoint(&b.position())) < 1e-12);
    }
}
