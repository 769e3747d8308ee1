use crate::ds::DataStructure;
use crate::error::{Location, Result};
use crate::geometry::point::Point3d;
use crate::geometry::surfaces::Surface;

/// Position of a point relative to a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    In,
    On,
    Out,
}

/// Point-in-face test against a face's surface and boundary edges.
///
/// Points are first projected onto the surface; anything farther than the
/// tolerance is `Out`. Points within tolerance of a boundary edge are
/// `On`. The rest are tested by parity in the parameter plane, shooting a
/// ray along +v through the boundary polygon.
#[derive(Debug, Clone)]
pub struct FaceClassifier<'a> {
    surface: &'a Surface,
    u: (f64, f64),
    v: (f64, f64),
    boundary: Vec<Vec<Point3d>>,
    /// Boundary segments in (u, v), unwrapped along periodic u.
    segments: Vec<((f64, f64), (f64, f64))>,
    tolerance: f64,
}

impl<'a> FaceClassifier<'a> {
    pub fn new(ds: &'a DataStructure, face: usize, tolerance: f64) -> Result<Self> {
        let (surface, u, v) = ds.face_surface(face)?;
        let boundary = ds
            .face_boundary(face)
            .map_err(|e| e.at(Location::Shape(face)))?;
        let period = surface.u_period();

        let mut segments = Vec::new();
        for poly in &boundary {
            let mut prev: Option<(f64, f64)> = None;
            for p in poly {
                let (mut pu, pv) = surface.parameters_of(p);
                if let (Some(period), Some((qu, _))) = (period, prev) {
                    // Keep consecutive samples on the same sheet.
                    pu += ((qu - pu) / period).round() * period;
                }
                if let Some(q) = prev {
                    segments.push((q, (pu, pv)));
                }
                prev = Some((pu, pv));
            }
        }

        Ok(Self {
            surface,
            u,
            v,
            boundary,
            segments,
            tolerance,
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn surface(&self) -> &Surface {
        self.surface
    }

    pub fn classify(&self, p: &Point3d) -> PointState {
        let (u, v, foot) = self.surface.project(p);
        if foot.distance_to(p) > self.tolerance {
            return PointState::Out;
        }
        if self.near_boundary(p) {
            return PointState::On;
        }
        let candidates: Vec<f64> = match self.surface.u_period() {
            Some(period) => (-2..=2).map(|k| u + k as f64 * period).collect(),
            None => vec![u],
        };
        let inside = candidates
            .into_iter()
            .any(|cu| self.in_rectangle(cu, v) && self.parity(cu, v));
        if inside { PointState::In } else { PointState::Out }
    }

    /// `In` or `On`.
    pub fn contains(&self, p: &Point3d) -> bool {
        self.classify(p) != PointState::Out
    }

    fn in_rectangle(&self, u: f64, v: f64) -> bool {
        let ptol = 1e-9;
        match self.surface.u_period() {
            // The rectangle of a periodic face may start anywhere.
            Some(_) => v >= self.v.0 - ptol && v <= self.v.1 + ptol,
            None => {
                u >= self.u.0 - ptol
                    && u <= self.u.1 + ptol
                    && v >= self.v.0 - ptol
                    && v <= self.v.1 + ptol
            }
        }
    }

    fn near_boundary(&self, p: &Point3d) -> bool {
        self.boundary.iter().any(|poly| {
            poly.windows(2)
                .any(|w| segment_distance(p, &w[0], &w[1]) <= self.tolerance)
        })
    }

    /// Even-odd count of boundary segments crossed by the ray from
    /// `(u, v)` towards +v. Faces without boundary edges are their whole
    /// rectangle.
    fn parity(&self, u: f64, v: f64) -> bool {
        if self.segments.is_empty() {
            return true;
        }
        let mut inside = false;
        for &((u1, v1), (u2, v2)) in &self.segments {
            // Half-open span so a ray through a shared endpoint counts once.
            if (u1 <= u) == (u2 <= u) {
                continue;
            }
            let t = (u - u1) / (u2 - u1);
            if v1 + t * (v2 - v1) > v {
                inside = !inside;
            }
        }
        inside
    }
}

/// Distance from `p` to the segment `[a, b]`.
pub fn segment_distance(p: &Point3d, a: &Point3d, b: &Point3d) -> f64 {
    let ab = *b - *a;
    let len2 = ab.length_squared();
    if len2 < 1e-300 {
        return p.distance_to(a);
    }
    let t = ((*p - *a).dot(&ab) / len2).clamp(0.0, 1.0);
    p.distance_to(&(*a + ab * t))
}
