use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{BopError, Location, Result};

/// A split point on an edge or section curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pave {
    pub parameter: f64,
    /// Vertex index; `None` for the bounds of a block created before any
    /// vertex is known.
    pub vertex: Option<usize>,
}

impl Pave {
    pub fn new(vertex: usize, parameter: f64) -> Self {
        Self {
            parameter,
            vertex: Some(vertex),
        }
    }

    pub fn unbound(parameter: f64) -> Self {
        Self {
            parameter,
            vertex: None,
        }
    }

    /// Same vertex at the same parameter (within `ptol`).
    pub fn is_same(&self, other: &Pave, ptol: f64) -> bool {
        self.vertex == other.vertex && (self.parameter - other.parameter).abs() <= ptol
    }
}

/// A sub-segment of an edge or curve between two paves, with the extra
/// paves that will split it on the next update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaveBlock {
    original_edge: Option<usize>,
    pave1: Pave,
    pave2: Pave,
    ext_paves: Vec<Pave>,
    edge: Option<usize>,
    on_faces: bool,
}

impl PaveBlock {
    /// Fails unless `pave1.parameter < pave2.parameter`.
    pub fn new(original_edge: Option<usize>, pave1: Pave, pave2: Pave) -> Result<Self> {
        if pave1.parameter.partial_cmp(&pave2.parameter) != Some(Ordering::Less) {
            return Err(BopError::invariant(
                original_edge.map_or(Location::Geometry, Location::Edge),
                format!(
                    "pave block bounds out of order: {} >= {}",
                    pave1.parameter, pave2.parameter
                ),
            ));
        }
        Ok(Self {
            original_edge,
            pave1,
            pave2,
            ext_paves: Vec::new(),
            edge: None,
            on_faces: false,
        })
    }

    pub fn pave1(&self) -> &Pave {
        &self.pave1
    }

    pub fn pave2(&self) -> &Pave {
        &self.pave2
    }

    pub fn range(&self) -> (f64, f64) {
        (self.pave1.parameter, self.pave2.parameter)
    }

    pub fn mid_parameter(&self) -> f64 {
        0.5 * (self.pave1.parameter + self.pave2.parameter)
    }

    /// Vertex indices of the two bounds.
    pub fn indices(&self) -> (Option<usize>, Option<usize>) {
        (self.pave1.vertex, self.pave2.vertex)
    }

    pub fn original_edge(&self) -> Option<usize> {
        self.original_edge
    }

    pub fn ext_paves(&self) -> &[Pave] {
        &self.ext_paves
    }

    /// Queues `pave` for the next split. An identical pave (same vertex,
    /// same parameter) is ignored; returns whether it was added. The same
    /// vertex may be queued at two parameters, which is how closed curves
    /// get their closing pave.
    pub fn append_ext_pave(&mut self, pave: Pave) -> bool {
        if self.ext_paves.iter().any(|p| p.is_same(&pave, 0.0)) {
            return false;
        }
        self.ext_paves.push(pave);
        true
    }

    pub fn has_ext_pave_for(&self, vertex: usize) -> bool {
        self.ext_paves.iter().any(|p| p.vertex == Some(vertex))
    }

    pub fn contains_parameter(&self, t: f64, ptol: f64) -> bool {
        t >= self.pave1.parameter - ptol && t <= self.pave2.parameter + ptol
    }

    /// Splits the block at its sorted extra paves.
    ///
    /// With `include_bounds` the block's own paves take part, so the
    /// result covers the whole block; without it only the extra paves
    /// delimit the result, which is how section curves drop the ends that
    /// no vertex bounds. Paves closer than `ptol` collapse into one,
    /// preferring one that carries a vertex. Fewer than two distinct paves
    /// give no blocks. Extra paves outside the block are an invariant
    /// violation.
    pub fn update(&self, include_bounds: bool, ptol: f64) -> Result<Vec<PaveBlock>> {
        let location = self.original_edge.map_or(Location::Geometry, Location::Edge);
        for p in &self.ext_paves {
            if !self.contains_parameter(p.parameter, ptol) {
                return Err(BopError::invariant(
                    location,
                    format!(
                        "pave at {} outside block [{}, {}]",
                        p.parameter, self.pave1.parameter, self.pave2.parameter
                    ),
                ));
            }
        }

        let mut inner: Vec<Pave> = self.ext_paves.clone();
        inner.sort_by(|a, b| a.parameter.total_cmp(&b.parameter));
        if include_bounds {
            // Paves on a bound coincide with it; the bound wins.
            inner.retain(|p| {
                p.parameter - self.pave1.parameter > ptol && self.pave2.parameter - p.parameter > ptol
            });
        }

        let mut merged: Vec<Pave> = Vec::with_capacity(inner.len() + 2);
        if include_bounds {
            merged.push(self.pave1);
        }
        for p in inner {
            match merged.last_mut() {
                Some(last) if (p.parameter - last.parameter).abs() <= ptol => {
                    if last.vertex.is_none() {
                        last.vertex = p.vertex;
                    }
                }
                _ => merged.push(p),
            }
        }
        if include_bounds {
            merged.push(self.pave2);
        }

        let mut out = Vec::with_capacity(merged.len().saturating_sub(1));
        for w in merged.windows(2) {
            out.push(PaveBlock::new(self.original_edge, w[0], w[1])?);
        }
        check_contiguous(&out, location)?;
        Ok(out)
    }

    pub fn edge(&self) -> Option<usize> {
        self.edge
    }

    pub fn set_edge(&mut self, edge: usize) {
        self.edge = Some(edge);
    }

    pub fn has_edge(&self) -> bool {
        self.edge.is_some()
    }

    /// Set by the filler when the block lies on both faces of its pair.
    pub fn on_faces(&self) -> bool {
        self.on_faces
    }

    pub fn set_on_faces(&mut self, on: bool) {
        self.on_faces = on;
    }
}

/// Consecutive blocks must share their boundary pave.
pub fn check_contiguous(blocks: &[PaveBlock], location: Location) -> Result<()> {
    for w in blocks.windows(2) {
        if w[0].pave2.parameter != w[1].pave1.parameter {
            return Err(BopError::invariant(
                location,
                format!(
                    "pave blocks not contiguous: {} then {}",
                    w[0].pave2.parameter, w[1].pave1.parameter
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_must_be_ordered() {
        assert!(PaveBlock::new(Some(3), Pave::new(0, 1.0), Pave::new(1, 1.0)).is_err());
        let err = PaveBlock::new(Some(3), Pave::new(0, 2.0), Pave::new(1, 1.0)).unwrap_err();
        assert!(err.to_string().contains("edge 3"));
    }

    #[test]
    fn test_update_splits_at_inner_pave() {
        let mut pb = PaveBlock::new(Some(0), Pave::new(10, 0.0), Pave::new(11, 3.0)).unwrap();
        assert!(pb.append_ext_pave(Pave::new(12, 1.0)));
        assert!(!pb.append_ext_pave(Pave::new(12, 1.0)));
        assert!(pb.has_ext_pave_for(12));
        let blocks = pb.update(true, 1e-9).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].range(), (0.0, 1.0));
        assert_eq!(blocks[1].range(), (1.0, 3.0));
        assert_eq!(blocks[0].indices(), (Some(10), Some(12)));
        assert_eq!(blocks[1].indices(), (Some(12), Some(11)));
        assert!(blocks.iter().all(|b| b.original_edge() == Some(0)));
    }

    #[test]
    fn test_update_without_bounds_uses_only_extra_paves() {
        let mut pb = PaveBlock::new(None, Pave::unbound(-5.0), Pave::unbound(5.0)).unwrap();
        pb.append_ext_pave(Pave::new(2, 2.0));
        pb.append_ext_pave(Pave::new(1, -1.0));
        let blocks = pb.update(false, 1e-9).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].range(), (-1.0, 2.0));
        assert_eq!(blocks[0].indices(), (Some(1), Some(2)));

        let mut lone = PaveBlock::new(None, Pave::unbound(0.0), Pave::unbound(1.0)).unwrap();
        lone.append_ext_pave(Pave::new(4, 0.5));
        assert!(lone.update(false, 1e-9).unwrap().is_empty());
    }

    #[test]
    fn test_near_paves_collapse_onto_the_bound() {
        let mut pb = PaveBlock::new(Some(1), Pave::new(0, 0.0), Pave::new(1, 1.0)).unwrap();
        pb.append_ext_pave(Pave::new(5, 1e-12));
        pb.append_ext_pave(Pave::new(6, 0.5));
        let blocks = pb.update(true, 1e-9).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].indices(), (Some(0), Some(6)));
    }

    #[test]
    fn test_pave_outside_block_is_rejected() {
        let mut pb = PaveBlock::new(Some(2), Pave::new(0, 0.0), Pave::new(1, 1.0)).unwrap();
        pb.append_ext_pave(Pave::new(7, 4.0));
        assert!(matches!(
            pb.update(true, 1e-9),
            Err(BopError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_edge_promotion() {
        let mut pb = PaveBlock::new(None, Pave::new(0, 0.0), Pave::new(1, 1.0)).unwrap();
        assert!(!pb.has_edge());
        pb.set_edge(9);
        assert!(pb.has_edge());
        assert_eq!(pb.edge(), Some(9));
    }
}
