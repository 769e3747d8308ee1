//! Edge/edge intersection: isolated points where two edges cross.

use tracing::{debug, instrument};

use crate::config::BopConfig;
use crate::ds::{DataStructure, EdgeEdgeHit};
use crate::error::Result;
use crate::geometry::curves::{Curve, Line3d};
use crate::geometry::point::Point3d;

use super::numeric::{foot_parameter, refine_curve_curve};

/// Chords per edge when a curved pair is sampled for seeds.
const CHORDS: usize = 32;

/// Every isolated point where `e1` and `e2` meet, ordered along `e1`.
///
/// Parallel lines and stretches where the two curves run together produce
/// no hits here.
#[instrument(level = "debug", skip(ds, cfg))]
pub fn intersect_edge_edge(
    ds: &DataStructure,
    e1: usize,
    e2: usize,
    cfg: &BopConfig,
) -> Result<Vec<EdgeEdgeHit>> {
    let (c1, a1, b1) = ds.edge_geometry(e1)?;
    let (c2, a2, b2) = ds.edge_geometry(e2)?;
    let tol = (ds.entry(e1)?.tolerance + ds.entry(e2)?.tolerance).max(cfg.tolerance.coincidence);
    let ptol = cfg.tolerance.parametric;

    let seeds = match (c1, c2) {
        (Curve::Line(l1), Curve::Line(l2)) => line_line(l1, l2, cfg).into_iter().collect(),
        _ => chord_seeds(c1, (a1, b1), c2, (a2, b2), tol),
    };

    let in_range = |t: f64, a: f64, b: f64| t >= a - ptol && t <= b + ptol;
    let mut hits: Vec<EdgeEdgeHit> = seeds
        .into_iter()
        .filter_map(|(t1, t2)| match (c1, c2) {
            (Curve::Line(_), Curve::Line(_)) => Some((t1, t2)),
            _ => refine_curve_curve((c1, (a1, b1)), (c2, (a2, b2)), (t1, t2), tol),
        })
        .filter(|&(t1, t2)| in_range(t1, a1, b1) && in_range(t2, a2, b2))
        .map(|(t1, t2)| (t1.clamp(a1, b1), t2.clamp(a2, b2)))
        .filter_map(|(t1, t2)| {
            let (p1, p2) = (c1.evaluate(t1), c2.evaluate(t2));
            (p1.distance_to(&p2) <= tol).then(|| EdgeEdgeHit {
                edges: (e1, e2),
                parameters: (t1, t2),
                point: p1.midpoint(&p2),
            })
        })
        .collect();

    hits.sort_by(|a, b| a.parameters.0.total_cmp(&b.parameters.0));
    hits.dedup_by(|b, a| {
        (b.parameters.0 - a.parameters.0).abs() <= ptol || b.point.distance_to(&a.point) <= tol
    });

    // Neighbouring hits joined by a stretch lying on both curves mark an
    // overlap, not a crossing.
    let on_both = |t: f64| {
        let p = c1.evaluate(t);
        let s = foot_parameter(c2, &p, a2, b2).clamp(a2, b2);
        c2.evaluate(s).distance_to(&p) <= tol
    };
    let mut overlapping = vec![false; hits.len()];
    for i in 1..hits.len() {
        let mid = 0.5 * (hits[i - 1].parameters.0 + hits[i].parameters.0);
        if on_both(mid) {
            overlapping[i - 1] = true;
            overlapping[i] = true;
        }
    }
    let mut flags = overlapping.into_iter();
    hits.retain(|_| !flags.next().unwrap_or(false));

    debug!(e1, e2, hits = hits.len(), "edge/edge intersected");
    Ok(hits)
}

/// Parameters of the closest points of two non-parallel lines.
fn line_line(l1: &Line3d, l2: &Line3d, cfg: &BopConfig) -> Option<(f64, f64)> {
    let w = l1.origin - l2.origin;
    let b = l1.direction.dot(&l2.direction);
    let d = l1.direction.dot(&w);
    let e = l2.direction.dot(&w);
    // Unit directions: 1 - b² is the squared sine of their angle.
    let denom = 1.0 - b * b;
    if denom < cfg.tolerance.angular * cfg.tolerance.angular {
        return None;
    }
    Some(((b * e - d) / denom, (e - b * d) / denom))
}

/// Seeds from pairs of chords that come within their own length (plus
/// `tol`) of each other.
fn chord_seeds(
    c1: &Curve,
    (a1, b1): (f64, f64),
    c2: &Curve,
    (a2, b2): (f64, f64),
    tol: f64,
) -> Vec<(f64, f64)> {
    let sample = |c: &Curve, a: f64, b: f64| -> Vec<(f64, Point3d)> {
        (0..=CHORDS)
            .map(|i| {
                let t = if i == CHORDS { b } else { a + (b - a) * i as f64 / CHORDS as f64 };
                (t, c.evaluate(t))
            })
            .collect()
    };
    let s1 = sample(c1, a1, b1);
    let s2 = sample(c2, a2, b2);

    let mut seeds = Vec::new();
    for w1 in s1.windows(2) {
        let len1 = w1[0].1.distance_to(&w1[1].1);
        for w2 in s2.windows(2) {
            let len2 = w2[0].1.distance_to(&w2[1].1);
            let (s, t, dist) = segment_closest(&w1[0].1, &w1[1].1, &w2[0].1, &w2[1].1);
            if dist <= len1.max(len2) + tol {
                seeds.push((
                    w1[0].0 + (w1[1].0 - w1[0].0) * s,
                    w2[0].0 + (w2[1].0 - w2[0].0) * t,
                ));
            }
        }
    }
    seeds
}

/// Closest points of segments `[p1, q1]` and `[p2, q2]` as fractions along
/// each, with their distance.
fn segment_closest(p1: &Point3d, q1: &Point3d, p2: &Point3d, q2: &Point3d) -> (f64, f64, f64) {
    let d1 = *q1 - *p1;
    let d2 = *q2 - *p2;
    let r = *p1 - *p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(&r);

    let (s, t) = if a <= f64::EPSILON && e <= f64::EPSILON {
        (0.0, 0.0)
    } else if a <= f64::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= f64::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom > 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };
    let dist = (*p1 + d1 * s).distance_to(&(*p2 + d2 * t));
    (s, t, dist)
}
