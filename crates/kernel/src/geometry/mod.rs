pub mod bbox;
pub mod conic;
pub mod curves;
pub mod nurbs;
pub mod point;
pub mod poly_point;
pub mod surfaces;
pub mod vector;

use self::curves::Curve;
use self::nurbs::NurbsCurve;
use self::point::Point3d;
use self::surfaces::Surface;
use self::vector::Vec3;

/// Anything that can be evaluated at a curve parameter.
pub trait CurveEval {
    fn evaluate(&self, t: f64) -> Point3d;
    fn derivative(&self, t: f64) -> Vec3;
}

/// Anything that can be evaluated at surface parameters.
pub trait SurfaceEval {
    fn evaluate(&self, u: f64, v: f64) -> Point3d;
    fn normal_at(&self, u: f64, v: f64) -> Vec3;
}

impl CurveEval for Curve {
    fn evaluate(&self, t: f64) -> Point3d {
        Curve::evaluate(self, t)
    }

    fn derivative(&self, t: f64) -> Vec3 {
        Curve::derivative(self, t)
    }
}

impl CurveEval for NurbsCurve {
    fn evaluate(&self, t: f64) -> Point3d {
        NurbsCurve::evaluate(self, t)
    }

    fn derivative(&self, t: f64) -> Vec3 {
        NurbsCurve::derivative(self, t)
    }
}

impl SurfaceEval for Surface {
    fn evaluate(&self, u: f64, v: f64) -> Point3d {
        Surface::evaluate(self, u, v)
    }

    fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        Surface::normal_at(self, u, v)
    }
}
