use crate::ds::{
    DataStructure, EdgeEdgeHit, EdgeFaceHit, FaceFaceInterference, PairOutcome, PaveBlock,
    VertexEdgeHit,
};
use crate::error::{BopError, Result};

/// Everything a filler run produced, frozen for the builder.
#[derive(Debug, Clone)]
pub struct IntersectionResult {
    ds: DataStructure,
    hits: Vec<EdgeFaceHit>,
    edge_edge: Vec<EdgeEdgeHit>,
    vertex_edge: Vec<VertexEdgeHit>,
    section_edges: Vec<usize>,
}

impl IntersectionResult {
    pub(crate) fn new(ds: DataStructure, hits: Vec<EdgeFaceHit>, section_edges: Vec<usize>) -> Self {
        Self {
            ds,
            hits,
            edge_edge: Vec::new(),
            vertex_edge: Vec::new(),
            section_edges,
        }
    }

    pub(crate) fn with_edge_edge_hits(mut self, hits: Vec<EdgeEdgeHit>) -> Self {
        self.edge_edge = hits;
        self
    }

    pub(crate) fn with_vertex_edge_hits(mut self, hits: Vec<VertexEdgeHit>) -> Self {
        self.vertex_edge = hits;
        self
    }

    pub fn data_structure(&self) -> &DataStructure {
        &self.ds
    }

    pub fn into_data_structure(self) -> DataStructure {
        self.ds
    }

    pub fn interferences(&self) -> &[FaceFaceInterference] {
        self.ds.interferences()
    }

    /// Edge/face hits that were merged into the edges' pave blocks.
    pub fn edge_face_hits(&self) -> &[EdgeFaceHit] {
        &self.hits
    }

    /// Points where an edge of one argument crosses an edge of the other.
    pub fn edge_edge_hits(&self) -> &[EdgeEdgeHit] {
        &self.edge_edge
    }

    pub fn vertex_edge_hits(&self) -> &[VertexEdgeHit] {
        &self.vertex_edge
    }

    pub fn pave_blocks(&self, edge: usize) -> &[PaveBlock] {
        self.ds.pave_blocks(edge)
    }

    /// Edges created from section-curve pave blocks, in creation order.
    pub fn section_edges(&self) -> &[usize] {
        &self.section_edges
    }

    pub fn is_reliable(&self) -> bool {
        self.interferences().iter().all(|ff| ff.outcome.is_reliable())
    }

    /// Fails on the first face pair whose section could not be bounded.
    pub fn require_reliable(&self) -> Result<&Self> {
        for ff in self.interferences() {
            if let PairOutcome::Unreliable { deviation } = ff.outcome {
                return Err(BopError::NoReliableIntersection {
                    face1: ff.faces.0,
                    face2: ff.faces.1,
                    deviation,
                });
            }
        }
        Ok(self)
    }
}
