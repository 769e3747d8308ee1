//! Narrow phase: vertex, edge and face intersectors.
//!
//! Analytic pairs are solved in closed form; everything else goes through
//! range-sample localization and alternating projection.

pub mod classify;
pub mod edge_edge;
pub mod edge_face;
pub mod face_face;
pub mod numeric;
pub mod vertex;

pub use classify::{FaceClassifier, PointState};
pub use edge_edge::intersect_edge_edge;
pub use edge_face::intersect_edge_face;
pub use face_face::{clip_line, intersect_faces, tangential_tolerance};
pub use vertex::{intersect_vertex_edge, vertex_in_face};
