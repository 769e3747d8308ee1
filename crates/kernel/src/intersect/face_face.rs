//! Face/face intersection: section curves bounded to the faces' common box.

use tracing::{debug, instrument, warn};

use crate::config::BopConfig;
use crate::diagnostics;
use crate::ds::{DataStructure, FaceFaceInterference, IntersectionCurve, PairOutcome, SectionCurve};
use crate::error::{Location, Result};
use crate::geometry::bbox::BoundingBox;
use crate::geometry::curves::{Circle3d, Curve, Ellipse3d, Line3d};
use crate::geometry::nurbs::NurbsCurve;
use crate::geometry::point::Point3d;
use crate::geometry::surfaces::{Cylinder, Plane, Sphere, Surface};
use crate::geometry::CurveEval;
use crate::sampling::{SurfaceDomain, localize_surface_surface};

use super::classify::FaceClassifier;
use super::numeric::refine_surface_surface;

/// Samples used to measure the normal angle along a curve.
const NORMAL_SAMPLES: usize = 16;
const SECTION_BOX_SAMPLES: usize = 32;
/// Passes of chord halving over a numeric section chain.
const MAX_REFINE_PASSES: usize = 8;
/// Points a refined chain may grow to.
const MAX_CHAIN_POINTS: usize = 4096;

/// Result of intersecting two unbounded analytic surfaces.
#[derive(Debug, Clone)]
enum AnalyticSection {
    None,
    Point(Point3d),
    Curves(Vec<Curve>),
    Coincident,
}

/// Intersects faces `f1` and `f2`. The curves of the returned interference
/// carry their range, box and both tolerances, but no pave blocks yet.
#[instrument(level = "debug", skip(ds, cfg))]
pub fn intersect_faces(
    ds: &DataStructure,
    f1: usize,
    f2: usize,
    cfg: &BopConfig,
) -> Result<FaceFaceInterference> {
    let (s1, u1, v1) = ds.face_surface(f1)?;
    let (s2, u2, v2) = ds.face_surface(f2)?;
    let e1 = ds.entry(f1)?;
    let e2 = ds.entry(f2)?;
    let tol = (e1.tolerance + e2.tolerance).max(cfg.tolerance.coincidence);

    let common = e1.bbox.common(&e2.bbox);
    if common.is_void() {
        return Ok(FaceFaceInterference::new(f1, f2, PairOutcome::Empty));
    }
    let window = common.enlarged(tol);

    let (curves, points, deviation) = match analytic_section(s1, s2, cfg) {
        Some(AnalyticSection::Coincident) => {
            debug!(f1, f2, "faces share their surface");
            return Ok(FaceFaceInterference::new(f1, f2, PairOutcome::Coincident));
        }
        Some(AnalyticSection::None) => (Vec::new(), Vec::new(), 0.0),
        Some(AnalyticSection::Point(p)) => (Vec::new(), vec![p], 0.0),
        Some(AnalyticSection::Curves(cs)) => {
            let bounded = cs
                .into_iter()
                .filter_map(|c| bound_to_window(c, &window))
                .collect();
            (bounded, Vec::new(), 0.0)
        }
        None => {
            let (bounded, dev) = numeric_section(
                ds,
                (f1, SurfaceDomain::new(s1, u1, v1)),
                (f2, SurfaceDomain::new(s2, u2, v2)),
                tol,
                cfg,
            )?;
            (bounded, Vec::new(), dev)
        }
    };

    let classifier1 = FaceClassifier::new(ds, f1, tol).map_err(|e| e.at(Location::Shape(f1)))?;
    let classifier2 = FaceClassifier::new(ds, f2, tol).map_err(|e| e.at(Location::Shape(f2)))?;
    let points: Vec<Point3d> = points
        .into_iter()
        .filter(|p| classifier1.contains(p) && classifier2.contains(p))
        .collect();

    let curve_tol = deviation.max(cfg.tolerance.coincidence).max(tol);
    let mut ff = FaceFaceInterference::new(f1, f2, PairOutcome::Empty);
    ff.tolerance = curve_tol;
    for section in curves {
        let bbox = BoundingBox::of_curve_range(
            &section,
            section.first,
            section.last,
            SECTION_BOX_SAMPLES,
        )
        .enlarged(curve_tol);
        let sin_min = min_normal_sine(s1, s2, &section);
        let mut ic = IntersectionCurve::new(section);
        ic.set_bbox(bbox);
        ic.set_tolerance(curve_tol);
        ic.set_tangential_tolerance(tangential_tolerance(curve_tol, sin_min, cfg));
        ff.curves.push(ic);
    }
    ff.points = points;

    ff.outcome = if deviation > cfg.max_curve_deviation {
        warn!(f1, f2, deviation, "numeric section exceeds the deviation limit");
        PairOutcome::Unreliable { deviation }
    } else if !ff.curves.is_empty() {
        PairOutcome::Curves
    } else if !ff.points.is_empty() {
        PairOutcome::Touching
    } else {
        PairOutcome::Empty
    };
    debug!(
        f1,
        f2,
        curves = ff.curves.len(),
        points = ff.points.len(),
        outcome = ?ff.outcome,
        "face/face intersected"
    );
    Ok(ff)
}

/// `tol / sin(θmin)`, capped so that nearly tangent sections stay usable.
pub fn tangential_tolerance(tol: f64, sin_min: f64, cfg: &BopConfig) -> f64 {
    (tol / sin_min.max(f64::EPSILON)).min(cfg.max_tangential_tolerance.max(tol))
}

/// Smallest sine of the angle between the two surface normals along a
/// curve.
fn min_normal_sine(s1: &Surface, s2: &Surface, curve: &SectionCurve) -> f64 {
    (0..=NORMAL_SAMPLES)
        .map(|i| {
            let t = curve.first + (curve.last - curve.first) * i as f64 / NORMAL_SAMPLES as f64;
            let p = curve.evaluate(t);
            let (a, b) = s1.parameters_of(&p);
            let (c, d) = s2.parameters_of(&p);
            s1.normal_at(a, b).sin_angle_to(&s2.normal_at(c, d))
        })
        .fold(1.0, f64::min)
}

// ─── Analytic pairs ─────────────────────────────────────────────────────────

fn analytic_section(s1: &Surface, s2: &Surface, cfg: &BopConfig) -> Option<AnalyticSection> {
    match (s1, s2) {
        (Surface::Plane(a), Surface::Plane(b)) => Some(plane_plane(a, b, cfg)),
        (Surface::Plane(p), Surface::Cylinder(c)) | (Surface::Cylinder(c), Surface::Plane(p)) => {
            Some(plane_cylinder(p, c, cfg))
        }
        (Surface::Plane(p), Surface::Sphere(s)) | (Surface::Sphere(s), Surface::Plane(p)) => {
            Some(plane_sphere(p, s, cfg))
        }
        _ => None,
    }
}

fn plane_plane(p1: &Plane, p2: &Plane, cfg: &BopConfig) -> AnalyticSection {
    let cross = p1.normal.cross(&p2.normal);
    let cross_len = cross.length();
    if cross_len < cfg.tolerance.angular {
        return if p1.distance_to_point(&p2.origin).abs() < cfg.tolerance.coincidence {
            AnalyticSection::Coincident
        } else {
            AnalyticSection::None
        };
    }
    let dir = cross / cross_len;

    // n_i · P = d_i for both planes, P a combination of the two normals.
    let d1 = p1.origin.to_vec3().dot(&p1.normal);
    let d2 = p2.origin.to_vec3().dot(&p2.normal);
    let n1n2 = p1.normal.dot(&p2.normal);
    let denom = 1.0 - n1n2 * n1n2;
    let c1 = (d1 - d2 * n1n2) / denom;
    let c2 = (d2 - d1 * n1n2) / denom;
    let origin = Point3d::ORIGIN + p1.normal * c1 + p2.normal * c2;
    AnalyticSection::Curves(vec![Curve::Line(Line3d::new(origin, dir))])
}

fn plane_cylinder(plane: &Plane, cyl: &Cylinder, cfg: &BopConfig) -> AnalyticSection {
    let tol = &cfg.tolerance;
    let cos_theta = plane.normal.dot(&cyl.axis).abs();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    // Perpendicular to the axis: a circle.
    if sin_theta < tol.angular {
        let center = plane.project_point(&cyl.origin);
        let circle = Circle3d::new(center, plane.normal, cyl.radius);
        return AnalyticSection::Curves(vec![Curve::Circle(circle)]);
    }

    // Parallel to the axis: two lines, one when tangent.
    if cos_theta < tol.angular {
        let dist = plane.distance_to_point(&cyl.origin).abs();
        if dist > cyl.radius + tol.coincidence {
            return AnalyticSection::None;
        }
        let foot = plane.project_point(&cyl.origin);
        if (dist - cyl.radius).abs() < tol.coincidence {
            return AnalyticSection::Curves(vec![Curve::Line(Line3d::new(foot, cyl.axis))]);
        }
        let half_chord = (cyl.radius * cyl.radius - dist * dist).max(0.0).sqrt();
        let lateral = cyl.axis.cross(&plane.normal).normalized_or(plane.u_axis);
        return AnalyticSection::Curves(vec![
            Curve::Line(Line3d::new(foot + lateral * half_chord, cyl.axis)),
            Curve::Line(Line3d::new(foot - lateral * half_chord, cyl.axis)),
        ]);
    }

    // Oblique: an ellipse centred where the axis pierces the plane, minor
    // radius R, major radius R / cos(theta).
    let denom = plane.normal.dot(&cyl.axis);
    let t = (plane.origin - cyl.origin).dot(&plane.normal) / denom;
    let center = cyl.origin + cyl.axis * t;
    let axis_in_plane = cyl.axis - plane.normal * denom;
    let Some(major_axis) = axis_in_plane.normalized() else {
        return AnalyticSection::None;
    };
    let ellipse = Ellipse3d::new(
        center,
        plane.normal,
        major_axis,
        cyl.radius / cos_theta,
        cyl.radius,
    );
    AnalyticSection::Curves(vec![Curve::Ellipse(ellipse)])
}

fn plane_sphere(plane: &Plane, sphere: &Sphere, cfg: &BopConfig) -> AnalyticSection {
    let tol = &cfg.tolerance;
    let signed = plane.distance_to_point(&sphere.center);
    let dist = signed.abs();
    if dist > sphere.radius + tol.coincidence {
        return AnalyticSection::None;
    }
    let center = sphere.center - plane.normal * signed;
    if (dist - sphere.radius).abs() < tol.coincidence {
        return AnalyticSection::Point(center);
    }
    let r = (sphere.radius * sphere.radius - dist * dist).max(0.0).sqrt();
    AnalyticSection::Curves(vec![Curve::Circle(Circle3d::new(center, plane.normal, r))])
}

// ─── Bounding ───────────────────────────────────────────────────────────────

/// Restricts an unbounded section curve to the part that can lie inside
/// `window`. Closed conics keep their whole period when they reach the
/// window at all.
fn bound_to_window(curve: Curve, window: &BoundingBox) -> Option<SectionCurve> {
    let (first, last) = match &curve {
        Curve::Line(l) => clip_line(l, window)?,
        _ => {
            let (first, last) = curve.natural_range()?;
            let bb = BoundingBox::of_curve_range(&curve, first, last, SECTION_BOX_SAMPLES);
            if bb.is_out(window) {
                return None;
            }
            (first, last)
        }
    };
    (last > first).then(|| SectionCurve::new(curve, first, last))
}

/// Parameter interval of `line` inside `bbox` (slab method).
pub fn clip_line(line: &Line3d, bbox: &BoundingBox) -> Option<(f64, f64)> {
    if bbox.is_void() {
        return None;
    }
    let mut tmin = f64::NEG_INFINITY;
    let mut tmax = f64::INFINITY;
    let origin = [line.origin.x, line.origin.y, line.origin.z];
    let dir = [line.direction.x, line.direction.y, line.direction.z];
    let min = [bbox.min.x, bbox.min.y, bbox.min.z];
    let max = [bbox.max.x, bbox.max.y, bbox.max.z];

    for i in 0..3 {
        if dir[i].abs() < 1e-15 {
            if origin[i] < min[i] || origin[i] > max[i] {
                return None;
            }
        } else {
            let inv = 1.0 / dir[i];
            let mut t0 = (min[i] - origin[i]) * inv;
            let mut t1 = (max[i] - origin[i]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmax < tmin {
                return None;
            }
        }
    }
    (tmin.is_finite() && tmax.is_finite()).then_some((tmin, tmax))
}

// ─── Numeric pairs ──────────────────────────────────────────────────────────

/// Localizes candidate cells, refines one seed per leaf onto both surfaces,
/// chains the points into polylines and measures how far the polylines
/// stray from the true section. Returns the curves and the deviation.
fn numeric_section(
    ds: &DataStructure,
    (f1, d1): (usize, SurfaceDomain<'_>),
    (f2, d2): (usize, SurfaceDomain<'_>),
    tol: f64,
    cfg: &BopConfig,
) -> Result<(Vec<SectionCurve>, f64)> {
    let leaves = localize_surface_surface(&d1, &d2, tol, cfg);
    let c1 = FaceClassifier::new(ds, f1, tol)?;
    let c2 = FaceClassifier::new(ds, f2, tol)?;

    let mut points: Vec<Point3d> = Vec::new();
    let mut spacing: f64 = 0.0;
    for (a, b) in &leaves {
        let (ua, va) = (
            a.range_u(d1.u.0, d1.u.1, cfg.surface_samples_u),
            a.range_v(d1.v.0, d1.v.1, cfg.surface_samples_v),
        );
        let (ub, vb) = (
            b.range_u(d2.u.0, d2.u.1, cfg.surface_samples_u),
            b.range_v(d2.v.0, d2.v.1, cfg.surface_samples_v),
        );
        let pa = d1.surface.evaluate(ua.mid(), va.mid());
        let pb = d2.surface.evaluate(ub.mid(), vb.mid());
        let cell = BoundingBox::of_surface_patch(d1.surface, ua.as_tuple(), va.as_tuple(), 1);
        spacing = spacing.max(cell.diagonal());
        match refine_surface_surface(d1.surface, d2.surface, &pa.midpoint(&pb), tol) {
            Some(p) if c1.contains(&p) && c2.contains(&p) => points.push(p),
            _ => {}
        }
    }
    diagnostics::dump_points(cfg, f1, f2, &points);

    // Leaves of neighbouring cells often converge to the same point.
    let merge = (spacing * 1e-3).max(tol);
    let mut unique: Vec<Point3d> = Vec::with_capacity(points.len());
    for p in points {
        if unique.iter().all(|q| q.distance_to(&p) > merge) {
            unique.push(p);
        }
    }

    let mut curves = Vec::new();
    let mut deviation: f64 = 0.0;
    let inside = |p: &Point3d| c1.contains(p) && c2.contains(p);
    for mut chain in chain_points(unique, 2.0 * spacing) {
        if chain.len() < 2 {
            continue;
        }
        let chain_deviation = refine_chain(
            &mut chain,
            (d1.surface, d2.surface),
            tol,
            cfg.max_curve_deviation,
            &inside,
        );
        deviation = deviation.max(chain_deviation);
        let poly = NurbsCurve::polyline(&chain).map_err(|e| e.at(Location::FacePair(f1, f2)))?;
        let (first, last) = poly.domain();
        if last > first {
            curves.push(SectionCurve::new(Curve::Bspline(poly), first, last));
        }
    }
    debug!(f1, f2, curves = curves.len(), deviation, "numeric section built");
    Ok((curves, deviation))
}

/// Splits every chord whose midpoint lies further than `limit` from either
/// surface at a point refined onto both, pass after pass, until every
/// chord passes or a cap is hit. Returns the largest chord deviation left.
fn refine_chain(
    chain: &mut Vec<Point3d>,
    (s1, s2): (&Surface, &Surface),
    tol: f64,
    limit: f64,
    inside: &dyn Fn(&Point3d) -> bool,
) -> f64 {
    let chord_deviation = |a: &Point3d, b: &Point3d| {
        let m = a.midpoint(b);
        s1.distance_to(&m).max(s2.distance_to(&m))
    };
    for pass in 0..MAX_REFINE_PASSES {
        let mut room = MAX_CHAIN_POINTS.saturating_sub(chain.len());
        let mut refined = Vec::with_capacity(chain.len() * 2);
        for w in chain.windows(2) {
            refined.push(w[0]);
            if room == 0 || chord_deviation(&w[0], &w[1]) <= limit {
                continue;
            }
            let m = w[0].midpoint(&w[1]);
            // A point that wandered off the chord belongs to another branch.
            let Some(p) = refine_surface_surface(s1, s2, &m, tol) else { continue };
            if p.distance_to(&m) <= w[0].distance_to(&w[1]) && inside(&p) {
                refined.push(p);
                room -= 1;
            }
        }
        refined.extend(chain.last().copied());
        let grew = refined.len() > chain.len();
        *chain = refined;
        if !grew {
            debug!(pass, points = chain.len(), "section chain settled");
            break;
        }
    }
    chain
        .windows(2)
        .map(|w| chord_deviation(&w[0], &w[1]))
        .fold(0.0, f64::max)
}

/// Greedy nearest-neighbour chaining. A chain grows from both of its ends
/// while a free point lies within `link`; a chain whose ends meet is
/// closed by repeating its first point.
fn chain_points(mut free: Vec<Point3d>, link: f64) -> Vec<Vec<Point3d>> {
    let mut chains = Vec::new();
    while let Some(start) = free.pop() {
        let mut chain = std::collections::VecDeque::from([start]);
        loop {
            let mut grew = false;
            for at_back in [true, false] {
                let end = if at_back { chain.back() } else { chain.front() };
                let Some(end) = end.copied() else { break };
                let nearest = free
                    .iter()
                    .enumerate()
                    .map(|(i, q)| (i, q.distance_to(&end)))
                    .filter(|(_, d)| *d <= link)
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((i, _)) = nearest {
                    let q = free.swap_remove(i);
                    if at_back {
                        chain.push_back(q);
                    } else {
                        chain.push_front(q);
                    }
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        let mut chain: Vec<Point3d> = chain.into();
        if let (true, Some(&a), Some(&b)) = (chain.len() > 2, chain.first(), chain.last()) {
            if a.distance_to(&b) <= link {
                chain.push(a);
            }
        }
        chains.push(chain);
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vector::Vec3;

    fn cfg() -> BopConfig {
        BopConfig::default()
    }

    #[test]
    fn test_plane_plane_line_and_coincidence() {
        let a = Plane::new(Point3d::ORIGIN, Vec3::Z);
        let b = Plane::new(Point3d::new(1.0, 0.0, 0.0), Vec3::X);
        match plane_plane(&a, &b, &cfg()) {
            AnalyticSection::Curves(cs) => {
                let Curve::Line(l) = &cs[0] else { panic!("expected a line") };
                assert!(l.direction.cross(&Vec3::Y).length() < 1e-12);
                assert!((l.origin.x - 1.0).abs() < 1e-12 && l.origin.z.abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        let c = Plane::new(Point3d::new(5.0, 5.0, 0.0), -Vec3::Z);
        assert!(matches!(plane_plane(&a, &c, &cfg()), AnalyticSection::Coincident));
        let d = Plane::new(Point3d::new(0.0, 0.0, 1.0), Vec3::Z);
        assert!(matches!(plane_plane(&a, &d, &cfg()), AnalyticSection::None));
    }

    #[test]
    fn test_plane_cylinder_cases() {
        let cyl = Cylinder::new(Point3d::ORIGIN, Vec3::Z, 1.0);
        let across = Plane::new(Point3d::new(0.0, 0.0, 2.0), Vec3::Z);
        assert!(matches!(
            plane_cylinder(&across, &cyl, &cfg()),
            AnalyticSection::Curves(ref cs) if matches!(cs[0], Curve::Circle(_))
        ));
        let along = Plane::new(Point3d::new(0.5, 0.0, 0.0), Vec3::X);
        assert!(matches!(
            plane_cylinder(&along, &cyl, &cfg()),
            AnalyticSection::Curves(ref cs) if cs.len() == 2
        ));
        let outside = Plane::new(Point3d::new(2.0, 0.0, 0.0), Vec3::X);
        assert!(matches!(plane_cylinder(&outside, &cyl, &cfg()), AnalyticSection::None));
        let oblique = Plane::new(Point3d::ORIGIN, Vec3::new(1.0, 0.0, 1.0));
        match plane_cylinder(&oblique, &cyl, &cfg()) {
            AnalyticSection::Curves(cs) => {
                let Curve::Ellipse(e) = &cs[0] else { panic!("expected an ellipse") };
                assert!((e.minor_radius - 1.0).abs() < 1e-12);
                assert!((e.major_radius - 2f64.sqrt()).abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_plane_sphere_circle_and_touch() {
        let sphere = Sphere::new(Point3d::ORIGIN, 2.0);
        let cut = Plane::new(Point3d::new(0.0, 0.0, 1.0), Vec3::Z);
        match plane_sphere(&cut, &sphere, &cfg()) {
            AnalyticSection::Curves(cs) => {
                let Curve::Circle(c) = &cs[0] else { panic!("expected a circle") };
                assert!((c.radius - 3f64.sqrt()).abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        let touch = Plane::new(Point3d::new(0.0, 0.0, 2.0), Vec3::Z);
        assert!(matches!(plane_sphere(&touch, &sphere, &cfg()), AnalyticSection::Point(_)));
    }

    #[test]
    fn test_clip_line_to_box() {
        let line = Line3d::new(Point3d::new(-5.0, 0.5, 0.5), Vec3::X);
        let bb = BoundingBox::new(Point3d::ORIGIN, Point3d::new(1.0, 1.0, 1.0));
        let (t0, t1) = clip_line(&line, &bb).unwrap();
        assert!((t0 - 5.0).abs() < 1e-12 && (t1 - 6.0).abs() < 1e-12);
        let miss = Line3d::new(Point3d::new(-5.0, 2.0, 0.5), Vec3::X);
        assert!(clip_line(&miss, &bb).is_none());
    }

    #[test]
    fn test_tangential_tolerance_grows_and_caps() {
        let c = cfg();
        assert!((tangential_tolerance(1e-7, 1.0, &c) - 1e-7).abs() < 1e-20);
        assert!((tangential_tolerance(1e-7, 0.5, &c) - 2e-7).abs() < 1e-20);
        assert_eq!(tangential_tolerance(1e-7, 0.0, &c), c.max_tangential_tolerance);
    }

    #[test]
    fn test_refine_chain_halves_bad_chords() {
        let s1 = Surface::Sphere(Sphere::new(Point3d::ORIGIN, 1.0));
        let s2 = Surface::Sphere(Sphere::new(Point3d::new(1.0, 0.0, 0.0), 1.0));
        let r = 0.75f64.sqrt();
        // Closed octagon on the section circle.
        let mut chain: Vec<Point3d> = (0..=8)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / 8.0;
                Point3d::new(0.5, r * a.cos(), r * a.sin())
            })
            .collect();
        let deviation = refine_chain(&mut chain, (&s1, &s2), 1e-7, 1e-4, &|_| true);
        assert!(deviation <= 1e-4, "deviation = {deviation}");
        assert!(chain.len() > 9 && chain.len() <= MAX_CHAIN_POINTS);
        assert_eq!(chain.first(), chain.last());
        for p in &chain {
            assert!(s1.distance_to(p) < 1e-6 && s2.distance_to(p) < 1e-6);
        }

        // A limit no chord can meet stops at the point cap.
        let mut chain = vec![Point3d::new(0.5, r, 0.0), Point3d::new(0.5, 0.0, r)];
        let left = refine_chain(&mut chain, (&s1, &s2), 1e-7, 0.0, &|_| true);
        assert!(left > 0.0);
        assert_eq!(chain.len(), (1 << MAX_REFINE_PASSES) + 1);
    }

    #[test]
    fn test_chain_points_orders_and_closes() {
        let square: Vec<Point3d> = (0..8)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / 8.0;
                Point3d::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let chains = chain_points(square, 0.8);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 9);
        assert_eq!(chains[0].first(), chains[0].last());

        let two = vec![Point3d::ORIGIN, Point3d::new(10.0, 0.0, 0.0)];
        assert_eq!(chain_points(two, 1.0).len(), 2);
    }
}
