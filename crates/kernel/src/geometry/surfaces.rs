use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use super::nurbs::NurbsSurface;
use super::point::Point3d;
use super::vector::Vec3;

/// Closed set of surface geometries the engine can intersect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Surface {
    Plane(Plane),
    Cylinder(Cylinder),
    Cone(Cone),
    Sphere(Sphere),
    Bspline(NurbsSurface),
}

/// An infinite plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl Plane {
    pub fn new(origin: Point3d, normal: Vec3) -> Self {
        let normal = normal.normalized_or(Vec3::Z);
        let u_axis = normal.any_perpendicular();
        let v_axis = normal.cross(&u_axis);
        Self {
            origin,
            normal,
            u_axis,
            v_axis,
        }
    }

    /// Plane spanned by `u_axis` and `v_axis`; the normal is their cross
    /// product, so the pair fixes the orientation.
    pub fn from_axes(origin: Point3d, u_axis: Vec3, v_axis: Vec3) -> Self {
        let u = u_axis.normalized_or(Vec3::X);
        let normal = u.cross(&v_axis).normalized_or(u.any_perpendicular());
        let v = normal.cross(&u);
        Self {
            origin,
            normal,
            u_axis: u,
            v_axis: v,
        }
    }

    pub fn xy() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            normal: Vec3::Z,
            u_axis: Vec3::X,
            v_axis: Vec3::Y,
        }
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        self.origin + self.u_axis * u + self.v_axis * v
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    pub fn project_point(&self, p: &Point3d) -> Point3d {
        *p - self.normal * self.distance_to_point(p)
    }

    pub fn parameters_of(&self, p: &Point3d) -> (f64, f64) {
        let v = *p - self.origin;
        (v.dot(&self.u_axis), v.dot(&self.v_axis))
    }
}

/// A cylinder, infinite along its axis: `u` is the angle, `v` the height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cylinder {
    pub origin: Point3d,
    pub axis: Vec3,
    pub radius: f64,
    pub ref_dir: Vec3,
}

impl Cylinder {
    pub fn new(origin: Point3d, axis: Vec3, radius: f64) -> Self {
        let axis = axis.normalized_or(Vec3::Z);
        Self {
            origin,
            axis,
            radius,
            ref_dir: axis.any_perpendicular(),
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.cross(&self.ref_dir)
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        self.origin
            + self.ref_dir * (self.radius * u.cos())
            + self.y_dir() * (self.radius * u.sin())
            + self.axis * v
    }

    pub fn normal_at(&self, u: f64, _v: f64) -> Vec3 {
        self.ref_dir * u.cos() + self.y_dir() * u.sin()
    }

    pub fn parameters_of(&self, p: &Point3d) -> (f64, f64) {
        let d = *p - self.origin;
        let u = d.dot(&self.y_dir()).atan2(d.dot(&self.ref_dir));
        (u.rem_euclid(TAU), d.dot(&self.axis))
    }

    /// Distance from `p` to the axis line.
    pub fn axis_distance(&self, p: &Point3d) -> f64 {
        let d = *p - self.origin;
        (d - self.axis * d.dot(&self.axis)).length()
    }
}

/// A cone: `u` is the angle, `v` the signed distance from the apex along
/// the axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cone {
    pub apex: Point3d,
    pub axis: Vec3,
    pub half_angle: f64,
    pub ref_dir: Vec3,
}

impl Cone {
    pub fn new(apex: Point3d, axis: Vec3, half_angle: f64) -> Self {
        let axis = axis.normalized_or(Vec3::Z);
        Self {
            apex,
            axis,
            half_angle,
            ref_dir: axis.any_perpendicular(),
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.cross(&self.ref_dir)
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        let r = v * self.half_angle.tan();
        self.apex + self.axis * v + self.ref_dir * (r * u.cos()) + self.y_dir() * (r * u.sin())
    }

    pub fn normal_at(&self, u: f64, _v: f64) -> Vec3 {
        let radial = self.ref_dir * u.cos() + self.y_dir() * u.sin();
        (radial * self.half_angle.cos() - self.axis * self.half_angle.sin())
            .normalized_or(radial)
    }

    pub fn parameters_of(&self, p: &Point3d) -> (f64, f64) {
        let d = *p - self.apex;
        let mut u = d.dot(&self.y_dir()).atan2(d.dot(&self.ref_dir));
        let v = d.dot(&self.axis);
        // The lower nappe has a negative radius, so its angle is flipped.
        if v < 0.0 {
            u += std::f64::consts::PI;
        }
        (u.rem_euclid(TAU), v)
    }
}

/// A sphere: `u` longitude in `[0, 2π)`, `v` latitude in `[-π/2, π/2]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Point3d,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3d, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        let cos_v = v.cos();
        Point3d::new(
            self.center.x + self.radius * cos_v * u.cos(),
            self.center.y + self.radius * cos_v * u.sin(),
            self.center.z + self.radius * v.sin(),
        )
    }

    pub fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        let cos_v = v.cos();
        Vec3::new(cos_v * u.cos(), cos_v * u.sin(), v.sin())
    }

    pub fn parameters_of(&self, p: &Point3d) -> (f64, f64) {
        let d = *p - self.center;
        let len = d.length();
        if len < 1e-15 {
            return (0.0, 0.0);
        }
        let v = (d.z / len).clamp(-1.0, 1.0).asin();
        let u = d.y.atan2(d.x).rem_euclid(TAU);
        (u, v)
    }
}

impl Surface {
    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        match self {
            Surface::Plane(p) => p.evaluate(u, v),
            Surface::Cylinder(c) => c.evaluate(u, v),
            Surface::Cone(c) => c.evaluate(u, v),
            Surface::Sphere(s) => s.evaluate(u, v),
            Surface::Bspline(n) => n.evaluate(u, v),
        }
    }

    /// Central finite-difference partials `(dS/du, dS/dv)`.
    pub fn partials(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let h = 1e-6;
        let su = (self.evaluate(u + h, v) - self.evaluate(u - h, v)) / (2.0 * h);
        let sv = (self.evaluate(u, v + h) - self.evaluate(u, v - h)) / (2.0 * h);
        (su, sv)
    }

    /// Unit normal. Falls back to the partials' cross product for
    /// free-form surfaces and to +Z at singular points.
    pub fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        match self {
            Surface::Plane(p) => p.normal,
            Surface::Cylinder(c) => c.normal_at(u, v),
            Surface::Cone(c) => c.normal_at(u, v),
            Surface::Sphere(s) => s.normal_at(u, v),
            Surface::Bspline(_) => {
                let (su, sv) = self.partials(u, v);
                su.cross(&sv).normalized_or(Vec3::Z)
            }
        }
    }

    /// Natural `((u_min, u_max), (v_min, v_max))`, `None` on unbounded axes.
    pub fn natural_bounds(&self) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
        match self {
            Surface::Plane(_) => (None, None),
            Surface::Cylinder(_) | Surface::Cone(_) => (Some((0.0, TAU)), None),
            Surface::Sphere(_) => (Some((0.0, TAU)), Some((-FRAC_PI_2, FRAC_PI_2))),
            Surface::Bspline(n) => (Some(n.domain_u()), Some(n.domain_v())),
        }
    }

    pub fn u_period(&self) -> Option<f64> {
        match self {
            Surface::Cylinder(_) | Surface::Cone(_) | Surface::Sphere(_) => Some(TAU),
            _ => None,
        }
    }

    pub fn is_u_periodic(&self) -> bool {
        self.u_period().is_some()
    }

    /// Parameters of the foot of `p` on the surface. Analytic surfaces use
    /// the closed-form inverse; B-splines are projected numerically.
    pub fn parameters_of(&self, p: &Point3d) -> (f64, f64) {
        match self {
            Surface::Plane(pl) => pl.parameters_of(p),
            Surface::Cylinder(c) => c.parameters_of(p),
            Surface::Cone(c) => c.parameters_of(p),
            Surface::Sphere(s) => s.parameters_of(p),
            Surface::Bspline(n) => self.project_numeric(p, n.domain_u(), n.domain_v()),
        }
    }

    /// Parameters and foot point of the projection of `p`.
    pub fn project(&self, p: &Point3d) -> (f64, f64, Point3d) {
        let (u, v) = self.parameters_of(p);
        (u, v, self.evaluate(u, v))
    }

    pub fn distance_to(&self, p: &Point3d) -> f64 {
        let (_, _, foot) = self.project(p);
        p.distance_to(&foot)
    }

    /// Gauss-Newton projection seeded from the best point of a coarse grid.
    fn project_numeric(&self, p: &Point3d, du: (f64, f64), dv: (f64, f64)) -> (f64, f64) {
        const GRID: usize = 12;
        let mut best = (du.0, dv.0);
        let mut best_d = f64::INFINITY;
        for i in 0..=GRID {
            let u = du.0 + (du.1 - du.0) * i as f64 / GRID as f64;
            for j in 0..=GRID {
                let v = dv.0 + (dv.1 - dv.0) * j as f64 / GRID as f64;
                let d = self.evaluate(u, v).distance_squared_to(p);
                if d < best_d {
                    best_d = d;
                    best = (u, v);
                }
            }
        }
        let (mut u, mut v) = best;
        for _ in 0..30 {
            let s = self.evaluate(u, v);
            let r = *p - s;
            let (su, sv) = self.partials(u, v);
            let a11 = su.dot(&su);
            let a12 = su.dot(&sv);
            let a22 = sv.dot(&sv);
            let det = a11 * a22 - a12 * a12;
            if det.abs() < 1e-300 {
                break;
            }
            let b1 = su.dot(&r);
            let b2 = sv.dot(&r);
            let step_u = (a22 * b1 - a12 * b2) / det;
            let step_v = (a11 * b2 - a12 * b1) / det;
            u = (u + step_u).clamp(du.0, du.1);
            v = (v + step_v).clamp(dv.0, dv.1);
            if step_u.abs() < 1e-14 && step_v.abs() < 1e-14 {
                break;
            }
        }
        (u, v)
    }

    pub fn surface_type_name(&self) -> &'static str {
        match self {
            Surface::Plane(_) => "Plane",
            Surface::Cylinder(_) => "Cylinder",
            Surface::Cone(_) => "Cone",
            Surface::Sphere(_) => "Sphere",
            Surface::Bspline(_) => "Bspline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_plane_from_axes_keeps_orientation() {
        let p = Plane::from_axes(Point3d::new(0.0, 0.0, 2.0), Vec3::Y, -Vec3::X);
        assert!((p.normal - Vec3::Z).length() < 1e-12);
        let (u, v) = p.parameters_of(&Point3d::new(-1.0, 3.0, 7.0));
        assert!((u - 3.0).abs() < 1e-12);
        assert!((v - 1.0).abs() < 1e-12);
        assert!((p.distance_to_point(&Point3d::new(0.0, 0.0, 7.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_analytic_inverses() {
        let surfaces = [
            Surface::Cylinder(Cylinder::new(Point3d::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 1.0), 2.0)),
            Surface::Cone(Cone::new(Point3d::ORIGIN, Vec3::Z, 0.4)),
            Surface::Sphere(Sphere::new(Point3d::new(0.0, 1.0, 0.0), 3.0)),
        ];
        for s in &surfaces {
            for (u, v) in [(0.3, 0.5), (2.0, 1.2), (5.5, 0.9)] {
                let p = s.evaluate(u, v);
                let (bu, bv) = s.parameters_of(&p);
                assert!(
                    s.evaluate(bu, bv).distance_to(&p) < 1e-9,
                    "{} ({u}, {v}) -> ({bu}, {bv})",
                    s.surface_type_name()
                );
            }
        }
    }

    #[test]
    fn test_cone_lower_nappe_roundtrip() {
        let c = Cone::new(Point3d::ORIGIN, Vec3::Z, 0.5);
        let p = c.evaluate(1.0, -2.0);
        let (u, v) = c.parameters_of(&p);
        assert!(c.evaluate(u, v).distance_to(&p) < 1e-12);
    }

    #[test]
    fn test_normals_are_unit_and_orthogonal_to_partials() {
        let s = Surface::Sphere(Sphere::new(Point3d::ORIGIN, 2.0));
        let n = s.normal_at(0.5, 0.3);
        let (su, sv) = s.partials(0.5, 0.3);
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!(n.dot(&su).abs() < 1e-6);
        assert!(n.dot(&sv).abs() < 1e-6);
    }

    #[test]
    fn test_bspline_projection() {
        let s = Surface::Bspline(
            NurbsSurface::new(
                1,
                1,
                vec![
                    Point3d::new(0.0, 0.0, 0.0),
                    Point3d::new(0.0, 1.0, 0.0),
                    Point3d::new(1.0, 0.0, 0.0),
                    Point3d::new(1.0, 1.0, 0.0),
                ],
                vec![],
                vec![0.0, 0.0, 1.0, 1.0],
                vec![0.0, 0.0, 1.0, 1.0],
                2,
                2,
            )
            .unwrap(),
        );
        let (u, v) = s.parameters_of(&Point3d::new(0.37, 0.81, 4.0));
        assert!((u - 0.37).abs() < 1e-9);
        assert!((v - 0.81).abs() < 1e-9);
        assert!(!s.is_u_periodic());
        assert_eq!(
            Surface::Sphere(Sphere::new(Point3d::ORIGIN, 1.0)).u_period(),
            Some(2.0 * PI)
        );
    }
}
