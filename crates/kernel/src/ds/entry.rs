use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::geometry::bbox::BoundingBox;
use crate::geometry::point::Point3d;

new_key_type! {
    pub struct CurveKey;
    pub struct SurfaceKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Vertex,
    Edge,
    Face,
}

/// Geometry of an entry, by key into the data structure's arenas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GeometryRef {
    Point(Point3d),
    Curve {
        key: CurveKey,
        first: f64,
        last: f64,
    },
    /// A surface and the parameter rectangle enclosing the face.
    Surface {
        key: SurfaceKey,
        u: (f64, f64),
        v: (f64, f64),
    },
}

/// One indexed sub-shape of an argument, or one created by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeEntry {
    pub kind: ShapeKind,
    /// Argument the shape belongs to; `None` for engine-created shapes.
    pub rank: Option<usize>,
    pub bbox: BoundingBox,
    pub tolerance: f64,
    /// Vertices of an edge (first, last) or edges of a face.
    pub sub_shapes: Vec<usize>,
    pub geometry: GeometryRef,
    /// Degenerate entries carry a void box and are never paired.
    pub degenerate: bool,
}

impl ShapeEntry {
    pub fn is_vertex(&self) -> bool {
        self.kind == ShapeKind::Vertex
    }

    pub fn is_edge(&self) -> bool {
        self.kind == ShapeKind::Edge
    }

    pub fn is_face(&self) -> bool {
        self.kind == ShapeKind::Face
    }

    /// Degenerate entries are excluded from pairing.
    pub fn mark_degenerate(&mut self) {
        self.degenerate = true;
        self.bbox = BoundingBox::void();
    }
}
