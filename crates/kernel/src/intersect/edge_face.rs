//! Edge/face intersection: the points where an edge's curve pierces a face.

use tracing::{debug, instrument};

use crate::config::BopConfig;
use crate::ds::{DataStructure, EdgeFaceHit};
use crate::error::{Location, Result};
use crate::geometry::curves::{Curve, Line3d};
use crate::geometry::point::Point2d;
use crate::geometry::surfaces::{Cone, Cylinder, Plane, Sphere, Surface};
use crate::sampling::{CurveDomain, SurfaceDomain, localize_curve_surface};

use super::classify::FaceClassifier;
use super::numeric::refine_curve_surface;

/// Every point where `edge` meets `face`, ordered along the edge.
///
/// Edges lying in the face's surface produce no isolated hits here.
#[instrument(level = "debug", skip(ds, cfg))]
pub fn intersect_edge_face(
    ds: &DataStructure,
    edge: usize,
    face: usize,
    cfg: &BopConfig,
) -> Result<Vec<EdgeFaceHit>> {
    let (curve, first, last) = ds.edge_geometry(edge)?;
    let (surface, u, v) = ds.face_surface(face)?;
    let tol = (ds.entry(edge)?.tolerance + ds.entry(face)?.tolerance)
        .max(cfg.tolerance.coincidence);
    let ptol = cfg.tolerance.parametric;

    let params = match analytic_parameters(curve, surface, cfg) {
        Some(params) => params,
        None => {
            let leaves = localize_curve_surface(
                &CurveDomain::new(curve, first, last),
                &SurfaceDomain::new(surface, u, v),
                tol,
                cfg,
            );
            leaves
                .iter()
                .filter_map(|(cell, _)| {
                    let seed = cell.range(first, last, cfg.curve_samples).mid();
                    refine_curve_surface(curve, surface, seed, (first, last), tol).map(|(t, _)| t)
                })
                .collect()
        }
    };

    let classifier =
        FaceClassifier::new(ds, face, tol).map_err(|e| e.at(Location::Shape(face)))?;
    let mut hits: Vec<EdgeFaceHit> = params
        .into_iter()
        .map(|t| wrap_parameter(curve, t, first))
        .filter(|t| *t >= first - ptol && *t <= last + ptol)
        .map(|t| t.clamp(first, last))
        .filter_map(|t| {
            let point = curve.evaluate(t);
            (surface.distance_to(&point) <= tol && classifier.contains(&point)).then_some(
                EdgeFaceHit {
                    edge,
                    face,
                    parameter: t,
                    point,
                },
            )
        })
        .collect();

    hits.sort_by(|a, b| a.parameter.total_cmp(&b.parameter));
    hits.dedup_by(|b, a| {
        (b.parameter - a.parameter).abs() <= ptol || b.point.distance_to(&a.point) <= tol
    });
    debug!(edge, face, hits = hits.len(), "edge/face intersected");
    Ok(hits)
}

/// Closed-form parameters where `curve` meets `surface`, or `None` when no
/// closed form applies and the caller must go numeric.
fn analytic_parameters(curve: &Curve, surface: &Surface, cfg: &BopConfig) -> Option<Vec<f64>> {
    match (curve, surface) {
        (Curve::Line(l), Surface::Plane(p)) => Some(line_plane(l, p, cfg).into_iter().collect()),
        (Curve::Line(l), Surface::Cylinder(c)) => Some(line_cylinder(l, c)),
        (Curve::Line(l), Surface::Sphere(s)) => Some(line_sphere(l, s)),
        (Curve::Line(l), Surface::Cone(c)) => Some(line_cone(l, c)),
        (c, Surface::Plane(p)) if c.kind().is_conic() => conic_plane(c, p, cfg),
        _ => None,
    }
}

// ─── Line ───────────────────────────────────────────────────────────────────

/// `None` when the line is parallel to the plane, whether in it or not.
fn line_plane(line: &Line3d, plane: &Plane, cfg: &BopConfig) -> Option<f64> {
    let denom = line.direction.dot(&plane.normal);
    if denom.abs() < cfg.tolerance.angular {
        return None;
    }
    Some((plane.origin - line.origin).dot(&plane.normal) / denom)
}

fn line_sphere(line: &Line3d, sphere: &Sphere) -> Vec<f64> {
    let oc = line.origin - sphere.center;
    let a = line.direction.dot(&line.direction);
    let b = 2.0 * oc.dot(&line.direction);
    let c = oc.dot(&oc) - sphere.radius * sphere.radius;
    solve_quadratic(a, b, c)
}

fn line_cylinder(line: &Line3d, cyl: &Cylinder) -> Vec<f64> {
    let oc = line.origin - cyl.origin;
    // Components orthogonal to the axis.
    let d_proj = line.direction - cyl.axis * line.direction.dot(&cyl.axis);
    let oc_proj = oc - cyl.axis * oc.dot(&cyl.axis);

    let a = d_proj.dot(&d_proj);
    if a < 1e-15 {
        // Parallel to the axis: on the cylinder everywhere or nowhere.
        return Vec::new();
    }
    let b = 2.0 * d_proj.dot(&oc_proj);
    let c = oc_proj.dot(&oc_proj) - cyl.radius * cyl.radius;
    solve_quadratic(a, b, c)
}

/// Double cone: `((P - apex)·axis)² = |P - apex|² cos²(half_angle)`.
fn line_cone(line: &Line3d, cone: &Cone) -> Vec<f64> {
    let co = line.origin - cone.apex;
    let cos2 = cone.half_angle.cos().powi(2);
    let d_dot_a = line.direction.dot(&cone.axis);
    let co_dot_a = co.dot(&cone.axis);

    let a = d_dot_a * d_dot_a - cos2 * line.direction.dot(&line.direction);
    let b = 2.0 * (d_dot_a * co_dot_a - cos2 * co.dot(&line.direction));
    let c = co_dot_a * co_dot_a - cos2 * co.dot(&co);
    solve_quadratic(a, b, c)
}

/// Real roots of `a·x² + b·x + c = 0`, ascending; a double root once.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < 1e-15 {
        if b.abs() < 1e-15 {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    let scale = (b * b).max((4.0 * a * c).abs()).max(1e-300);
    if disc < -1e-12 * scale {
        return Vec::new();
    }
    if disc <= 1e-12 * scale {
        return vec![-b / (2.0 * a)];
    }
    let sq = disc.sqrt();
    let mut roots = vec![(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)];
    roots.sort_by(f64::total_cmp);
    roots
}

// ─── Conic ──────────────────────────────────────────────────────────────────

/// The plane cuts the conic's own plane along a 2D line; the conic's
/// implicit equation restricted to that line gives the hits. `Some(empty)`
/// when the planes are parallel.
fn conic_plane(curve: &Curve, plane: &Plane, cfg: &BopConfig) -> Option<Vec<f64>> {
    let (frame, conic) = curve.local_conic()?;
    let (la, lb) = frame.local_direction(&plane.normal);
    let lc = (frame.origin - plane.origin).dot(&plane.normal);
    let norm2 = la * la + lb * lb;
    if norm2.sqrt() < cfg.tolerance.angular {
        return Some(Vec::new());
    }
    let origin = Point2d::new(-lc * la / norm2, -lc * lb / norm2);
    let dir = (-lb, la);
    let params = conic
        .intersect_line(origin, dir)
        .into_iter()
        .filter_map(|s| {
            let p = Point2d::new(origin.x + s * dir.0, origin.y + s * dir.1);
            curve.conic_parameter_of_local(&p)
        })
        .collect();
    Some(params)
}

/// Parameters shifted into `[first, first + period)` for periodic curves.
pub(crate) fn wrap_parameter(curve: &Curve, t: f64, first: f64) -> f64 {
    match curve.period() {
        Some(period) => first + (t - first).rem_euclid(period),
        None => t,
    }
}
