use nalgebra::{Isometry2, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::point::Point2d;

/// Implicit planar conic `a·x² + b·y² + 2c·xy + 2d·x + 2e·y + f = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conic2d {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Conic2d {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        Self::new(1.0, 1.0, 0.0, -cx, -cy, cx * cx + cy * cy - radius * radius)
    }

    /// Axis-aligned ellipse centred at the origin.
    pub fn ellipse(major_radius: f64, minor_radius: f64) -> Self {
        Self::new(
            1.0 / (major_radius * major_radius),
            1.0 / (minor_radius * minor_radius),
            0.0,
            0.0,
            0.0,
            -1.0,
        )
    }

    /// `y² = 4F·x`, apex at the origin, opening along +X.
    pub fn parabola(focal: f64) -> Self {
        Self::new(0.0, 1.0, 0.0, -2.0 * focal, 0.0, 0.0)
    }

    /// `x²/A² - y²/B² = 1`.
    pub fn hyperbola(major_radius: f64, minor_radius: f64) -> Self {
        Self::new(
            1.0 / (major_radius * major_radius),
            -1.0 / (minor_radius * minor_radius),
            0.0,
            0.0,
            0.0,
            -1.0,
        )
    }

    /// The degenerate conic of the line `la·x + lb·y + lc = 0`.
    pub fn line(la: f64, lb: f64, lc: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, la * 0.5, lb * 0.5, lc)
    }

    pub fn value(&self, x: f64, y: f64) -> f64 {
        self.a * x * x
            + self.b * y * y
            + 2.0 * self.c * x * y
            + 2.0 * self.d * x
            + 2.0 * self.e * y
            + self.f
    }

    pub fn gradient(&self, x: f64, y: f64) -> (f64, f64) {
        (
            2.0 * (self.a * x + self.c * y + self.d),
            2.0 * (self.c * x + self.b * y + self.e),
        )
    }

    /// Symmetric homogeneous matrix of the quadratic form.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.a, self.c, self.d, //
            self.c, self.b, self.e, //
            self.d, self.e, self.f,
        )
    }

    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        // Symmetrize so that rounding in the product does not leak into c, d, e.
        Self::new(
            m[(0, 0)],
            m[(1, 1)],
            0.5 * (m[(0, 1)] + m[(1, 0)]),
            0.5 * (m[(0, 2)] + m[(2, 0)]),
            0.5 * (m[(1, 2)] + m[(2, 1)]),
            m[(2, 2)],
        )
    }

    /// Coefficients of the same curve expressed in the frame whose
    /// coordinates map to the current ones through `frame`.
    ///
    /// A point `p` satisfies the returned conic iff `frame * p` satisfies
    /// `self`, so `c.in_frame(&t).in_frame(&t.inverse())` gives `c` back.
    pub fn in_frame(&self, frame: &Isometry2<f64>) -> Self {
        let m = frame.to_homogeneous();
        Self::from_matrix(&(m.transpose() * self.matrix() * m))
    }

    /// Parameters `t` at which `origin + t·dir` meets the conic, ascending.
    /// A tangent line yields a single root.
    pub fn intersect_line(&self, origin: Point2d, dir: (f64, f64)) -> Vec<f64> {
        let q = self.matrix();
        let d = Vector3::new(dir.0, dir.1, 0.0);
        let o = Vector3::new(origin.x, origin.y, 1.0);
        let qa = d.dot(&(q * d));
        let qb = d.dot(&(q * o));
        let qc = o.dot(&(q * o));

        let scale = qa.abs().max(qb.abs()).max(qc.abs()).max(1e-300);
        if qa.abs() < 1e-12 * scale {
            if qb.abs() < 1e-12 * scale {
                return Vec::new();
            }
            return vec![-qc / (2.0 * qb)];
        }

        let disc = qb * qb - qa * qc;
        let disc_tol = 1e-12 * scale * scale;
        if disc < -disc_tol {
            return Vec::new();
        }
        if disc.abs() <= disc_tol {
            return vec![-qb / qa];
        }
        let sq = disc.sqrt();
        // Stable form: avoid cancelling qb against sq.
        let k = -(qb + qb.signum() * sq);
        let (t1, t2) = if k.abs() < 1e-300 {
            ((-qb - sq) / qa, (-qb + sq) / qa)
        } else {
            (k / qa, qc / k)
        };
        if t1 <= t2 { vec![t1, t2] } else { vec![t2, t1] }
    }
}
