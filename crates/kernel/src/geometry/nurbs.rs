use serde::{Deserialize, Serialize};

use crate::error::{BopError, Location, Result};

use super::point::Point3d;
use super::vector::Vec3;

/// A non-rational or rational B-spline curve in 3D.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NurbsCurve {
    pub degree: usize,
    pub control_points: Vec<Point3d>,
    /// Empty for non-rational curves.
    pub weights: Vec<f64>,
    /// Knot vector, `control_points.len() + degree + 1` entries.
    pub knots: Vec<f64>,
}

impl NurbsCurve {
    pub fn new(
        degree: usize,
        control_points: Vec<Point3d>,
        weights: Vec<f64>,
        knots: Vec<f64>,
    ) -> Result<Self> {
        if degree == 0 || control_points.len() <= degree {
            return Err(BopError::malformed(
                Location::Geometry,
                format!(
                    "b-spline of degree {degree} needs more than {degree} poles, got {}",
                    control_points.len()
                ),
            ));
        }
        check_knots(&knots, control_points.len(), degree)?;
        if !weights.is_empty() && weights.len() != control_points.len() {
            return Err(BopError::malformed(
                Location::Geometry,
                "weights must be empty or match the poles",
            ));
        }
        Ok(Self {
            degree,
            control_points,
            weights,
            knots,
        })
    }

    pub fn bspline(degree: usize, control_points: Vec<Point3d>, knots: Vec<f64>) -> Result<Self> {
        Self::new(degree, control_points, vec![], knots)
    }

    /// Degree-1 curve through `points`, parameterized by chord length.
    pub fn polyline(points: &[Point3d]) -> Result<Self> {
        let mut knots = Vec::with_capacity(points.len() + 2);
        knots.push(0.0);
        let mut acc = 0.0;
        knots.push(acc);
        for w in points.windows(2) {
            acc += w[0].distance_to(&w[1]);
            knots.push(acc);
        }
        knots.push(acc);
        Self::bspline(1, points.to_vec(), knots)
    }

    pub fn domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.knots.len() - self.degree - 1],
        )
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        let span = find_span(&self.knots, self.control_points.len(), self.degree, t);
        let basis = basis_functions(&self.knots, span, t, self.degree);
        let mut acc = Vec3::ZERO;
        let mut w_sum = 0.0;
        for (i, b) in basis.iter().enumerate() {
            let idx = span - self.degree + i;
            let w = self.weights.get(idx).copied().unwrap_or(1.0);
            acc = acc + self.control_points[idx].to_vec3() * (b * w);
            w_sum += b * w;
        }
        if w_sum.abs() < 1e-300 {
            return self.control_points[span];
        }
        Point3d::ORIGIN + acc / w_sum
    }

    /// Central finite difference, one-sided at the domain ends.
    pub fn derivative(&self, t: f64) -> Vec3 {
        let (tmin, tmax) = self.domain();
        let dt = 1e-7 * (tmax - tmin).abs().max(1.0);
        let t0 = (t - dt).max(tmin);
        let t1 = (t + dt).min(tmax);
        if (t1 - t0).abs() < 1e-300 {
            return Vec3::ZERO;
        }
        (self.evaluate(t1) - self.evaluate(t0)) / (t1 - t0)
    }

    pub fn is_closed(&self, tol: f64) -> bool {
        let (a, b) = self.domain();
        self.evaluate(a).distance_to(&self.evaluate(b)) < tol
    }
}

/// A tensor-product B-spline surface. Poles are stored row-major in U.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NurbsSurface {
    pub degree_u: usize,
    pub degree_v: usize,
    /// `[u_index * num_v + v_index]`
    pub control_points: Vec<Point3d>,
    pub weights: Vec<f64>,
    pub knots_u: Vec<f64>,
    pub knots_v: Vec<f64>,
    pub num_u: usize,
    pub num_v: usize,
}

impl NurbsSurface {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        control_points: Vec<Point3d>,
        weights: Vec<f64>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        num_u: usize,
        num_v: usize,
    ) -> Result<Self> {
        if control_points.len() != num_u * num_v || num_u <= degree_u || num_v <= degree_v {
            return Err(BopError::malformed(
                Location::Geometry,
                format!("pole grid {num_u}x{num_v} does not match degrees ({degree_u}, {degree_v})"),
            ));
        }
        check_knots(&knots_u, num_u, degree_u)?;
        check_knots(&knots_v, num_v, degree_v)?;
        if !weights.is_empty() && weights.len() != control_points.len() {
            return Err(BopError::malformed(
                Location::Geometry,
                "weights must be empty or match the poles",
            ));
        }
        Ok(Self {
            degree_u,
            degree_v,
            control_points,
            weights,
            knots_u,
            knots_v,
            num_u,
            num_v,
        })
    }

    pub fn domain_u(&self) -> (f64, f64) {
        (
            self.knots_u[self.degree_u],
            self.knots_u[self.knots_u.len() - self.degree_u - 1],
        )
    }

    pub fn domain_v(&self) -> (f64, f64) {
        (
            self.knots_v[self.degree_v],
            self.knots_v[self.knots_v.len() - self.degree_v - 1],
        )
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        let span_u = find_span(&self.knots_u, self.num_u, self.degree_u, u);
        let span_v = find_span(&self.knots_v, self.num_v, self.degree_v, v);
        let basis_u = basis_functions(&self.knots_u, span_u, u, self.degree_u);
        let basis_v = basis_functions(&self.knots_v, span_v, v, self.degree_v);

        let mut acc = Vec3::ZERO;
        let mut w_sum = 0.0;
        for (i, bu) in basis_u.iter().enumerate() {
            let u_idx = span_u - self.degree_u + i;
            for (j, bv) in basis_v.iter().enumerate() {
                let idx = u_idx * self.num_v + span_v - self.degree_v + j;
                let w = self.weights.get(idx).copied().unwrap_or(1.0);
                let bw = bu * bv * w;
                acc = acc + self.control_points[idx].to_vec3() * bw;
                w_sum += bw;
            }
        }
        if w_sum.abs() < 1e-300 {
            return self.control_points[span_u * self.num_v + span_v];
        }
        Point3d::ORIGIN + acc / w_sum
    }
}

fn check_knots(knots: &[f64], num_poles: usize, degree: usize) -> Result<()> {
    if knots.len() != num_poles + degree + 1 {
        return Err(BopError::malformed(
            Location::Geometry,
            format!(
                "knot vector has {} entries, expected {}",
                knots.len(),
                num_poles + degree + 1
            ),
        ));
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(BopError::malformed(Location::Geometry, "knots must be non-decreasing"));
    }
    if knots[degree] >= knots[knots.len() - degree - 1] {
        return Err(BopError::malformed(Location::Geometry, "empty knot domain"));
    }
    Ok(())
}

/// Knot span containing `t`, by binary search.
fn find_span(knots: &[f64], num_poles: usize, degree: usize, t: f64) -> usize {
    let n = num_poles - 1;
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

fn basis_functions(knots: &[f64], span: usize, t: f64, degree: usize) -> Vec<f64> {
    let p = degree;
    let mut n_vals = vec![0.0; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    n_vals[0] = 1.0;
    for j in 1..=p {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() < 1e-300 { 0.0 } else { n_vals[r] / denom };
            n_vals[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n_vals[j] = saved;
    }
    n_vals
}
