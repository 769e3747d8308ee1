use std::fmt;

use thiserror::Error;

/// Where in the data structure a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// An input or engine-created sub-shape, by data-structure index.
    Shape(usize),
    /// The pave-block list of an edge.
    Edge(usize),
    /// A vertex tested against an edge or a face.
    VertexOn { vertex: usize, shape: usize },
    /// An edge/edge interference.
    EdgePair(usize, usize),
    /// An edge/face interference.
    EdgeFace { edge: usize, face: usize },
    /// A face/face interference.
    FacePair(usize, usize),
    /// The `curve`-th section curve of a face pair.
    SectionCurve { face1: usize, face2: usize, curve: usize },
    /// A standalone geometric definition not yet attached to an entry.
    Geometry,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Shape(i) => write!(f, "shape {i}"),
            Location::Edge(e) => write!(f, "edge {e}"),
            Location::VertexOn { vertex, shape } => write!(f, "vertex {vertex} against shape {shape}"),
            Location::EdgePair(a, b) => write!(f, "edges ({a}, {b})"),
            Location::EdgeFace { edge, face } => write!(f, "edge {edge} against face {face}"),
            Location::FacePair(a, b) => write!(f, "faces ({a}, {b})"),
            Location::SectionCurve { face1, face2, curve } => {
                write!(f, "curve {curve} of faces ({face1}, {face2})")
            }
            Location::Geometry => write!(f, "geometry"),
        }
    }
}

/// Failures of the intersection engine.
///
/// Only `InvariantViolation` and `Aborted` stop a filler run; the other
/// variants describe local faults that callers may downgrade.
#[derive(Debug, Error)]
pub enum BopError {
    #[error("malformed input at {location}: {reason}")]
    MalformedInput { location: Location, reason: String },

    #[error("no reliable intersection between faces {face1} and {face2} (deviation {deviation:e})")]
    NoReliableIntersection {
        face1: usize,
        face2: usize,
        deviation: f64,
    },

    #[error("structural invariant violated at {location}: {detail}")]
    InvariantViolation { location: Location, detail: String },

    #[error("operation aborted before completion")]
    Aborted,
}

impl BopError {
    pub fn malformed(location: Location, reason: impl Into<String>) -> Self {
        BopError::MalformedInput {
            location,
            reason: reason.into(),
        }
    }

    pub fn invariant(location: Location, detail: impl Into<String>) -> Self {
        BopError::InvariantViolation {
            location,
            detail: detail.into(),
        }
    }

    /// Re-labels a `Location::Geometry` error with the place it surfaced.
    pub fn at(self, location: Location) -> Self {
        match self {
            BopError::MalformedInput {
                location: Location::Geometry,
                reason,
            } => BopError::MalformedInput { location, reason },
            BopError::InvariantViolation {
                location: Location::Geometry,
                detail,
            } => BopError::InvariantViolation { location, detail },
            other => other,
        }
    }

    /// True for the errors that must abort the enclosing Boolean operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BopError::InvariantViolation { .. } | BopError::Aborted)
    }
}

pub type Result<T> = std::result::Result<T, BopError>;
