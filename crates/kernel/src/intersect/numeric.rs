//! Local refinement of intersection seeds by alternating projection.

use crate::geometry::CurveEval;
use crate::geometry::curves::Curve;
use crate::geometry::point::Point3d;
use crate::geometry::surfaces::Surface;

const MAX_ITERATIONS: usize = 50;

/// Samples used to seed the projection onto a curve with no analytic
/// inverse.
const PROJECTION_SEEDS: usize = 32;

/// Newton iterations for the foot of `p` on `curve`, kept inside
/// `[first, last]`.
pub fn project_on_curve<C: CurveEval + ?Sized>(
    curve: &C,
    p: &Point3d,
    t0: f64,
    first: f64,
    last: f64,
) -> f64 {
    let mut t = t0.clamp(first, last);
    for _ in 0..MAX_ITERATIONS {
        let d = curve.derivative(t);
        let len2 = d.length_squared();
        if len2 < 1e-300 {
            break;
        }
        let step = (*p - curve.evaluate(t)).dot(&d) / len2;
        let next = (t + step).clamp(first, last);
        let moved = (next - t).abs();
        t = next;
        if moved < 1e-14 * (1.0 + t.abs()) {
            break;
        }
    }
    t
}

/// Parameter of the point of `curve` nearest to `p`: the analytic inverse
/// when there is one, otherwise a projection seeded from the closest of
/// evenly spaced samples over `[first, last]`.
pub fn foot_parameter(curve: &Curve, p: &Point3d, first: f64, last: f64) -> f64 {
    if let Some(t) = curve.parameter_of(p, first) {
        return t;
    }
    let seed = (0..=PROJECTION_SEEDS)
        .map(|i| first + (last - first) * i as f64 / PROJECTION_SEEDS as f64)
        .min_by(|a, b| {
            curve
                .evaluate(*a)
                .distance_squared_to(p)
                .total_cmp(&curve.evaluate(*b).distance_squared_to(p))
        })
        .unwrap_or(first);
    project_on_curve(curve, p, seed, first, last)
}

/// Parameters where two curves meet near `(t1, t2)`, found by projecting
/// each curve's point onto the other in turn.
pub fn refine_curve_curve<C1: CurveEval + ?Sized, C2: CurveEval + ?Sized>(
    (c1, r1): (&C1, (f64, f64)),
    (c2, r2): (&C2, (f64, f64)),
    (t1, t2): (f64, f64),
    tol: f64,
) -> Option<(f64, f64)> {
    let (mut t1, mut t2) = (t1.clamp(r1.0, r1.1), t2.clamp(r2.0, r2.1));
    for _ in 0..MAX_ITERATIONS {
        let next2 = project_on_curve(c2, &c1.evaluate(t1), t2, r2.0, r2.1);
        let next1 = project_on_curve(c1, &c2.evaluate(next2), t1, r1.0, r1.1);
        let moved = (next1 - t1).abs() + (next2 - t2).abs();
        t1 = next1;
        t2 = next2;
        if c1.evaluate(t1).distance_to(&c2.evaluate(t2)) <= 0.1 * tol
            || moved < 1e-15 * (1.0 + t1.abs() + t2.abs())
        {
            break;
        }
    }
    (c1.evaluate(t1).distance_to(&c2.evaluate(t2)) <= tol).then_some((t1, t2))
}

/// Point where `curve` meets `surface` near parameter `t0`, found by
/// projecting back and forth between them. Returns the parameter and the
/// point when they end up within `tol` of each other.
pub fn refine_curve_surface<C: CurveEval + ?Sized>(
    curve: &C,
    surface: &Surface,
    t0: f64,
    range: (f64, f64),
    tol: f64,
) -> Option<(f64, Point3d)> {
    let mut t = t0;
    for _ in 0..MAX_ITERATIONS {
        let p = curve.evaluate(t);
        let (_, _, foot) = surface.project(&p);
        if p.distance_to(&foot) <= 0.1 * tol {
            break;
        }
        let next = project_on_curve(curve, &foot, t, range.0, range.1);
        if (next - t).abs() < 1e-15 * (1.0 + t.abs()) {
            break;
        }
        t = next;
    }
    let p = curve.evaluate(t);
    (surface.distance_to(&p) <= tol).then_some((t, p))
}

/// Point on both surfaces near `seed`, found by alternating projection.
pub fn refine_surface_surface(
    s1: &Surface,
    s2: &Surface,
    seed: &Point3d,
    tol: f64,
) -> Option<Point3d> {
    let mut p = *seed;
    for _ in 0..MAX_ITERATIONS {
        let (_, _, a) = s1.project(&p);
        let (_, _, b) = s2.project(&a);
        let next = a.midpoint(&b);
        let moved = next.distance_to(&p);
        p = next;
        if a.distance_to(&b) <= 0.1 * tol || moved < 1e-15 {
            break;
        }
    }
    (s1.distance_to(&p) <= tol && s2.distance_to(&p) <= tol).then_some(p)
}
