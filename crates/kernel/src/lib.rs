//! Intersection engine for Boolean operations on boundary representations.
//!
//! Two arguments are loaded into a [`DataStructure`] through a
//! [`DataStructureBuilder`]. A [`PaveFiller`] then intersects their edges
//! and faces, splits edges at the intersection vertices, computes face
//! section curves and turns the parts lying on both faces into new edges.
//! The frozen [`IntersectionResult`] is handed to a [`Builder`].

pub mod config;
pub mod diagnostics;
pub mod ds;
pub mod error;
pub mod filler;
pub mod geometry;
pub mod intersect;
pub mod pairing;
pub mod sampling;

pub use config::{BopConfig, DebugOptions, Tolerance};
pub use ds::{DataStructure, DataStructureBuilder, ShapeKind};
pub use error::{BopError, Location, Result};
pub use filler::{
    AbortFlag, BooleanOperation, Builder, IntersectionResult, PaveFiller, SectionBuilder,
    SectionEdge,
};
pub use geometry::{CurveEval, SurfaceEval};
