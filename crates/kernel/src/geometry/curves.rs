use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::conic::Conic2d;
use super::nurbs::NurbsCurve;
use super::point::{Point2d, Point3d};
use super::vector::Vec3;

/// Closed set of curve geometries the engine can intersect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Curve {
    Line(Line3d),
    Circle(Circle3d),
    Ellipse(Ellipse3d),
    Parabola(Parabola3d),
    Hyperbola(Hyperbola3d),
    Bspline(NurbsCurve),
}

/// Tag of a `Curve` variant, resolved once when a curve is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    Line,
    Circle,
    Ellipse,
    Parabola,
    Hyperbola,
    Bspline,
}

impl CurveKind {
    pub fn is_conic(self) -> bool {
        matches!(
            self,
            CurveKind::Circle | CurveKind::Ellipse | CurveKind::Parabola | CurveKind::Hyperbola
        )
    }
}

/// Right-handed orthonormal frame of a planar curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Frame3d {
    pub origin: Point3d,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub normal: Vec3,
}

impl Frame3d {
    /// Frame with the given normal; `x_hint` is made orthogonal to it, or
    /// replaced when parallel to the normal.
    pub fn new(origin: Point3d, normal: Vec3, x_hint: Vec3) -> Self {
        let normal = normal.normalized_or(Vec3::Z);
        let projected = x_hint - normal * x_hint.dot(&normal);
        let x_axis = projected
            .normalized()
            .unwrap_or_else(|| normal.any_perpendicular());
        let y_axis = normal.cross(&x_axis);
        Self {
            origin,
            x_axis,
            y_axis,
            normal,
        }
    }

    pub fn to_local(&self, p: &Point3d) -> Point2d {
        let d = *p - self.origin;
        Point2d::new(d.dot(&self.x_axis), d.dot(&self.y_axis))
    }

    pub fn to_global(&self, p: &Point2d) -> Point3d {
        self.origin + self.x_axis * p.x + self.y_axis * p.y
    }

    pub fn local_direction(&self, d: &Vec3) -> (f64, f64) {
        (d.dot(&self.x_axis), d.dot(&self.y_axis))
    }

    pub fn height_of(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }
}

/// An infinite line; bounded segments come from a parameter range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Line3d {
    pub origin: Point3d,
    /// Unit direction, or zero for a degenerate line.
    pub direction: Vec3,
}

impl Line3d {
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalized().unwrap_or(Vec3::ZERO),
        }
    }

    /// Line through `a` and `b`, parameterized so that `t = |b - a|` at `b`.
    pub fn from_points(a: Point3d, b: Point3d) -> Self {
        Self::new(a, b - a)
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }

    pub fn parameter_of(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.direction)
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        p.distance_to(&self.evaluate(self.parameter_of(p)))
    }
}

/// A circle: `P(t) = C + r cos t X + r sin t Y`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Circle3d {
    pub frame: Frame3d,
    pub radius: f64,
}

impl Circle3d {
    pub fn new(center: Point3d, normal: Vec3, radius: f64) -> Self {
        let n = normal.normalized_or(Vec3::Z);
        Self {
            frame: Frame3d::new(center, n, n.any_perpendicular()),
            radius,
        }
    }

    pub fn with_frame(frame: Frame3d, radius: f64) -> Self {
        Self { frame, radius }
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        let f = &self.frame;
        f.origin + f.x_axis * (self.radius * t.cos()) + f.y_axis * (self.radius * t.sin())
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        let f = &self.frame;
        f.x_axis * (-self.radius * t.sin()) + f.y_axis * (self.radius * t.cos())
    }

    pub fn parameter_of(&self, p: &Point3d) -> f64 {
        let l = self.frame.to_local(p);
        l.y.atan2(l.x).rem_euclid(TAU)
    }
}

/// An ellipse: `P(t) = C + A cos t X + B sin t Y`, `A >= B`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ellipse3d {
    pub frame: Frame3d,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Ellipse3d {
    pub fn new(
        center: Point3d,
        normal: Vec3,
        major_axis: Vec3,
        major_radius: f64,
        minor_radius: f64,
    ) -> Self {
        Self {
            frame: Frame3d::new(center, normal, major_axis),
            major_radius,
            minor_radius,
        }
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        let f = &self.frame;
        f.origin
            + f.x_axis * (self.major_radius * t.cos())
            + f.y_axis * (self.minor_radius * t.sin())
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        let f = &self.frame;
        f.x_axis * (-self.major_radius * t.sin()) + f.y_axis * (self.minor_radius * t.cos())
    }

    pub fn parameter_of(&self, p: &Point3d) -> f64 {
        let l = self.frame.to_local(p);
        (l.y / self.minor_radius)
            .atan2(l.x / self.major_radius)
            .rem_euclid(TAU)
    }
}

/// A parabola: `P(t) = O + t²/(4F) X + t Y`, F the focal length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Parabola3d {
    pub frame: Frame3d,
    pub focal: f64,
}

impl Parabola3d {
    pub fn evaluate(&self, t: f64) -> Point3d {
        let f = &self.frame;
        f.origin + f.x_axis * (t * t / (4.0 * self.focal)) + f.y_axis * t
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        self.frame.x_axis * (t / (2.0 * self.focal)) + self.frame.y_axis
    }

    pub fn parameter_of(&self, p: &Point3d) -> f64 {
        self.frame.to_local(p).y
    }
}

/// One branch of a hyperbola: `P(t) = C + A cosh t X + B sinh t Y`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hyperbola3d {
    pub frame: Frame3d,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Hyperbola3d {
    pub fn evaluate(&self, t: f64) -> Point3d {
        let f = &self.frame;
        f.origin
            + f.x_axis * (self.major_radius * t.cosh())
            + f.y_axis * (self.minor_radius * t.sinh())
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        let f = &self.frame;
        f.x_axis * (self.major_radius * t.sinh()) + f.y_axis * (self.minor_radius * t.cosh())
    }

    pub fn parameter_of(&self, p: &Point3d) -> f64 {
        (self.frame.to_local(p).y / self.minor_radius).asinh()
    }
}

impl Curve {
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Line(_) => CurveKind::Line,
            Curve::Circle(_) => CurveKind::Circle,
            Curve::Ellipse(_) => CurveKind::Ellipse,
            Curve::Parabola(_) => CurveKind::Parabola,
            Curve::Hyperbola(_) => CurveKind::Hyperbola,
            Curve::Bspline(_) => CurveKind::Bspline,
        }
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        match self {
            Curve::Line(l) => l.evaluate(t),
            Curve::Circle(c) => c.evaluate(t),
            Curve::Ellipse(e) => e.evaluate(t),
            Curve::Parabola(p) => p.evaluate(t),
            Curve::Hyperbola(h) => h.evaluate(t),
            Curve::Bspline(n) => n.evaluate(t),
        }
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        match self {
            Curve::Line(l) => l.direction,
            Curve::Circle(c) => c.derivative(t),
            Curve::Ellipse(e) => e.derivative(t),
            Curve::Parabola(p) => p.derivative(t),
            Curve::Hyperbola(h) => h.derivative(t),
            Curve::Bspline(n) => n.derivative(t),
        }
    }

    /// Period of periodic curves.
    pub fn period(&self) -> Option<f64> {
        match self {
            Curve::Circle(_) | Curve::Ellipse(_) => Some(TAU),
            _ => None,
        }
    }

    /// Natural parameter domain, `None` for unbounded curves.
    pub fn natural_range(&self) -> Option<(f64, f64)> {
        match self {
            Curve::Circle(_) | Curve::Ellipse(_) => Some((0.0, TAU)),
            Curve::Bspline(n) => Some(n.domain()),
            _ => None,
        }
    }

    pub fn is_degenerate(&self, tolerance: f64) -> bool {
        match self {
            Curve::Line(l) => l.direction.length() < 0.5,
            Curve::Circle(c) => c.radius < tolerance,
            Curve::Ellipse(e) => e.major_radius < tolerance || e.minor_radius < tolerance,
            Curve::Parabola(p) => p.focal.abs() < tolerance,
            Curve::Hyperbola(h) => h.major_radius < tolerance || h.minor_radius < tolerance,
            Curve::Bspline(n) => n.control_points.len() < 2,
        }
    }

    /// Whether the range `[first, last]` closes on itself.
    pub fn is_closed_on(&self, first: f64, last: f64, tol: f64) -> bool {
        match self.period() {
            Some(p) => (last - first - p).abs() < 1e-9,
            None => self.evaluate(first).distance_to(&self.evaluate(last)) < tol,
        }
    }

    /// Parameter of the foot of `p` on the curve, mapped into
    /// `[first, first + period)` for periodic curves. Returns `None` when
    /// the curve has no analytic inverse (B-splines are projected by the
    /// caller).
    pub fn parameter_of(&self, p: &Point3d, first: f64) -> Option<f64> {
        let t = match self {
            Curve::Line(l) => l.parameter_of(p),
            Curve::Circle(c) => c.parameter_of(p),
            Curve::Ellipse(e) => e.parameter_of(p),
            Curve::Parabola(pb) => pb.parameter_of(p),
            Curve::Hyperbola(h) => h.parameter_of(p),
            Curve::Bspline(_) => return None,
        };
        Some(match self.period() {
            Some(period) => first + (t - first).rem_euclid(period),
            None => t,
        })
    }

    /// Plane frame and implicit equation of a conic curve in that frame.
    pub fn local_conic(&self) -> Option<(Frame3d, Conic2d)> {
        match self {
            Curve::Circle(c) => Some((c.frame, Conic2d::circle(0.0, 0.0, c.radius))),
            Curve::Ellipse(e) => Some((e.frame, Conic2d::ellipse(e.major_radius, e.minor_radius))),
            Curve::Parabola(p) => Some((p.frame, Conic2d::parabola(p.focal))),
            Curve::Hyperbola(h) => {
                Some((h.frame, Conic2d::hyperbola(h.major_radius, h.minor_radius)))
            }
            _ => None,
        }
    }

    /// Parameter of a point known to lie in the plane of a conic, given
    /// in that conic's local frame.
    pub fn conic_parameter_of_local(&self, p: &Point2d) -> Option<f64> {
        match self {
            Curve::Circle(_) => Some(p.y.atan2(p.x).rem_euclid(TAU)),
            Curve::Ellipse(e) => {
                Some((p.y / e.minor_radius).atan2(p.x / e.major_radius).rem_euclid(TAU))
            }
            Curve::Parabola(_) => Some(p.y),
            Curve::Hyperbola(h) => Some((p.y / h.minor_radius).asinh()),
            _ => None,
        }
    }

    pub fn curve_type_name(&self) -> &'static str {
        match self.kind() {
            CurveKind::Line => "Line",
            CurveKind::Circle => "Circle",
            CurveKind::Ellipse => "Ellipse",
            CurveKind::Parabola => "Parabola",
            CurveKind::Hyperbola => "Hyperbola",
            CurveKind::Bspline => "Bspline",
        }
    }
}
