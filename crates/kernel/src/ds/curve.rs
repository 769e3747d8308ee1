use serde::{Deserialize, Serialize};

use crate::error::{BopError, Location, Result};
use crate::geometry::CurveEval;
use crate::geometry::bbox::BoundingBox;
use crate::geometry::curves::{Curve, CurveKind};
use crate::geometry::point::Point3d;
use crate::geometry::vector::Vec3;

use super::pave::{Pave, PaveBlock, check_contiguous};

/// Geometry and bounded parameter range of a section curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionCurve {
    pub geometry: Curve,
    pub first: f64,
    pub last: f64,
}

impl SectionCurve {
    pub fn new(geometry: Curve, first: f64, last: f64) -> Self {
        Self {
            geometry,
            first,
            last,
        }
    }

    pub fn kind(&self) -> CurveKind {
        self.geometry.kind()
    }

    pub fn range(&self) -> (f64, f64) {
        (self.first, self.last)
    }

    pub fn is_closed(&self, tol: f64) -> bool {
        self.geometry.is_closed_on(self.first, self.last, tol)
    }

    pub fn start_point(&self) -> Point3d {
        self.geometry.evaluate(self.first)
    }

    pub fn end_point(&self) -> Point3d {
        self.geometry.evaluate(self.last)
    }
}

impl CurveEval for SectionCurve {
    fn evaluate(&self, t: f64) -> Point3d {
        self.geometry.evaluate(t)
    }

    fn derivative(&self, t: f64) -> Vec3 {
        self.geometry.derivative(t)
    }
}

/// Where an intersection curve is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveState {
    /// Only the whole-curve block exists.
    Unsplit,
    /// Split into this many blocks, none promoted yet.
    Split(usize),
    /// At least one block became an edge.
    EdgePromoted { blocks: usize, edges: usize },
}

/// One section curve of a face pair with its split state.
///
/// `tolerance` and `tangential_tolerance` are independent; nothing orders
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionCurve {
    curve: SectionCurve,
    bbox: BoundingBox,
    tolerance: f64,
    tangential_tolerance: f64,
    pave_blocks: Vec<PaveBlock>,
    technical_vertices: Vec<usize>,
    split: bool,
}

impl IntersectionCurve {
    pub fn new(curve: SectionCurve) -> Self {
        Self {
            curve,
            bbox: BoundingBox::void(),
            tolerance: 0.0,
            tangential_tolerance: 0.0,
            pave_blocks: Vec::new(),
            technical_vertices: Vec::new(),
            split: false,
        }
    }

    pub fn set_curve(&mut self, curve: SectionCurve) {
        self.curve = curve;
    }

    pub fn curve(&self) -> &SectionCurve {
        &self.curve
    }

    pub fn set_bbox(&mut self, bbox: BoundingBox) {
        self.bbox = bbox;
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn bbox_mut(&mut self) -> &mut BoundingBox {
        &mut self.bbox
    }

    pub fn set_pave_blocks(&mut self, blocks: Vec<PaveBlock>) {
        self.pave_blocks = blocks;
    }

    pub fn pave_blocks(&self) -> &[PaveBlock] {
        &self.pave_blocks
    }

    pub fn pave_blocks_mut(&mut self) -> &mut Vec<PaveBlock> {
        &mut self.pave_blocks
    }

    /// Resets the list to the single block spanning the whole curve, with
    /// vertex-less bounds.
    pub fn init_pave_block1(&mut self) -> Result<()> {
        let block = PaveBlock::new(
            None,
            Pave::unbound(self.curve.first),
            Pave::unbound(self.curve.last),
        )?;
        self.pave_blocks = vec![block];
        self.split = false;
        Ok(())
    }

    /// The first block, created by `init_pave_block1` if the list is empty.
    pub fn pave_block1_mut(&mut self) -> Result<&mut PaveBlock> {
        if self.pave_blocks.is_empty() {
            self.init_pave_block1()?;
        }
        self.pave_blocks
            .first_mut()
            .ok_or_else(|| BopError::invariant(Location::Geometry, "curve has no pave block"))
    }

    pub fn set_technical_vertices(&mut self, vertices: Vec<usize>) {
        self.technical_vertices = vertices;
    }

    pub fn technical_vertices(&self) -> &[usize] {
        &self.technical_vertices
    }

    pub fn technical_vertices_mut(&mut self) -> &mut Vec<usize> {
        &mut self.technical_vertices
    }

    /// True once any block has been promoted to an edge.
    pub fn has_edge(&self) -> bool {
        self.pave_blocks.iter().any(PaveBlock::has_edge)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tol: f64) {
        self.tolerance = tol;
    }

    pub fn tangential_tolerance(&self) -> f64 {
        self.tangential_tolerance
    }

    pub fn set_tangential_tolerance(&mut self, tol: f64) {
        self.tangential_tolerance = tol;
    }

    /// Replaces the unsplit list by the blocks delimited by the extra
    /// paves of the first block. Returns the number of blocks.
    pub fn split(&mut self, ptol: f64) -> Result<usize> {
        if self.split {
            return Err(BopError::invariant(Location::Geometry, "curve split twice"));
        }
        let blocks = self.pave_block1_mut()?.update(false, ptol)?;
        check_contiguous(&blocks, Location::Geometry)?;
        self.pave_blocks = blocks;
        self.split = true;
        Ok(self.pave_blocks.len())
    }

    /// Records that block `index` became edge `edge`.
    pub fn promote(&mut self, index: usize, edge: usize) -> Result<()> {
        if !self.split {
            return Err(BopError::invariant(
                Location::Geometry,
                "cannot promote a block of an unsplit curve",
            ));
        }
        let block = self.pave_blocks.get_mut(index).ok_or_else(|| {
            BopError::invariant(Location::Geometry, format!("no pave block {index}"))
        })?;
        block.set_edge(edge);
        Ok(())
    }

    pub fn state(&self) -> CurveState {
        let edges = self.pave_blocks.iter().filter(|b| b.has_edge()).count();
        if edges > 0 {
            CurveState::EdgePromoted {
                blocks: self.pave_blocks.len(),
                edges,
            }
        } else if self.split {
            CurveState::Split(self.pave_blocks.len())
        } else {
            CurveState::Unsplit
        }
    }
}
