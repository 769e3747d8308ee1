use serde::{Deserialize, Serialize};

use crate::geometry::point::Point3d;

use super::curve::IntersectionCurve;

/// How a face pair intersects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PairOutcome {
    /// One or more section curves.
    Curves,
    /// Isolated touching points only.
    Touching,
    /// The faces share their surface; no section curve is produced.
    Coincident,
    /// Boxes overlapped but the faces do not meet.
    Empty,
    /// A numeric section deviated more than the configured limit.
    Unreliable { deviation: f64 },
}

impl PairOutcome {
    pub fn is_reliable(&self) -> bool {
        !matches!(self, PairOutcome::Unreliable { .. })
    }
}

/// The result of intersecting two faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceFaceInterference {
    pub faces: (usize, usize),
    pub outcome: PairOutcome,
    pub curves: Vec<IntersectionCurve>,
    pub points: Vec<Point3d>,
    pub tolerance: f64,
}

impl FaceFaceInterference {
    pub fn new(face1: usize, face2: usize, outcome: PairOutcome) -> Self {
        Self {
            faces: (face1, face2),
            outcome,
            curves: Vec::new(),
            points: Vec::new(),
            tolerance: 0.0,
        }
    }

    pub fn has_edges(&self) -> bool {
        self.curves.iter().any(IntersectionCurve::has_edge)
    }
}

/// One point where an edge meets a face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeFaceHit {
    pub edge: usize,
    pub face: usize,
    /// Parameter on the edge's curve.
    pub parameter: f64,
    pub point: Point3d,
}

/// One point where two edges cross.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeEdgeHit {
    pub edges: (usize, usize),
    /// Parameters on the first and on the second edge's curve.
    pub parameters: (f64, f64),
    pub point: Point3d,
}

/// A vertex of one argument lying on an edge of the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexEdgeHit {
    pub vertex: usize,
    pub edge: usize,
    pub parameter: f64,
    /// Distance from the vertex to the edge's curve.
    pub distance: f64,
}
