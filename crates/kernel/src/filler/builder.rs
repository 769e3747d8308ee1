use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::point::Point3d;

use super::result::IntersectionResult;

/// The Boolean mode a builder assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOperation {
    Fuse,
    Cut,
    Common,
    Section,
}

/// Consumer of a finished intersection phase.
///
/// Implement this to reconstruct faces and pick the parts each Boolean
/// mode keeps. The result is read-only: pave blocks are frozen once the
/// filler returns.
pub trait Builder {
    type Output;

    fn build(&mut self, result: &IntersectionResult, op: BooleanOperation) -> Result<Self::Output>;
}

/// One section edge with its end points and the face pair it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEdge {
    pub edge: usize,
    pub vertices: (usize, usize),
    pub points: (Point3d, Point3d),
    pub faces: (usize, usize),
}

/// Builder that only collects the section edges. Every Boolean mode shares
/// them, so the operation does not change the output.
#[derive(Debug, Default)]
pub struct SectionBuilder;

impl Builder for SectionBuilder {
    type Output = Vec<SectionEdge>;

    fn build(&mut self, result: &IntersectionResult, _op: BooleanOperation) -> Result<Vec<SectionEdge>> {
        let ds = result.data_structure();
        let mut out = Vec::with_capacity(result.section_edges().len());
        for &edge in result.section_edges() {
            let (v1, v2) = ds.edge_vertices(edge)?;
            let faces = match ds.faces_of_edge(edge) {
                [f1, f2, ..] => (*f1, *f2),
                _ => continue,
            };
            out.push(SectionEdge {
                edge,
                vertices: (v1, v2),
                points: (ds.vertex_point(v1)?, ds.vertex_point(v2)?),
                faces,
            });
        }
        Ok(out)
    }
}
