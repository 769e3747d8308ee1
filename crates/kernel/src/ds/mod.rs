//! Shape data structure: indexed sub-shapes, paves, pave blocks, section
//! curves and interferences.

pub mod builder;
pub mod curve;
pub mod entry;
pub mod interference;
pub mod pave;
pub mod store;

pub use builder::DataStructureBuilder;
pub use curve::{CurveState, IntersectionCurve, SectionCurve};
pub use entry::{CurveKey, GeometryRef, ShapeEntry, ShapeKind, SurfaceKey};
pub use interference::{
    EdgeEdgeHit, EdgeFaceHit, FaceFaceInterference, PairOutcome, VertexEdgeHit,
};
pub use pave::{Pave, PaveBlock, check_contiguous};
pub use store::DataStructure;
