//! Human-readable dumps of intermediate filler state.
//!
//! Every dump goes through `tracing::debug!` and is gated by a switch in
//! [`DebugOptions`](crate::config::DebugOptions), so a run with the
//! default config emits nothing from here.

use std::fmt;

use tracing::debug;

use crate::config::BopConfig;
use crate::ds::{FaceFaceInterference, IntersectionCurve, PairOutcome, Pave, PaveBlock};
use crate::geometry::poly_point::PolyPoint;
use crate::geometry::point::Point3d;

impl fmt::Display for PolyPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.6}) @ ({:.6}, {:.6}) [{}]",
            self.x, self.y, self.z, self.u, self.v, self.tag
        )
    }
}

impl fmt::Display for Pave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vertex {
            Some(v) => write!(f, "v{v}@{:.9}", self.parameter),
            None => write!(f, "-@{:.9}", self.parameter),
        }
    }
}

impl fmt::Display for PaveBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.pave1(), self.pave2())?;
        if let Some(orig) = self.original_edge() {
            write!(f, " of e{orig}")?;
        }
        if let Some(e) = self.edge() {
            write!(f, " -> e{e}")?;
        }
        if self.on_faces() {
            write!(f, " on-faces")?;
        }
        if !self.ext_paves().is_empty() {
            write!(f, " ext:")?;
            for p in self.ext_paves() {
                write!(f, " {p}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for IntersectionCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, last) = self.curve().range();
        write!(
            f,
            "{} [{first:.6}, {last:.6}] tol {:.3e} ttol {:.3e}, {} blocks",
            self.curve().geometry.curve_type_name(),
            self.tolerance(),
            self.tangential_tolerance(),
            self.pave_blocks().len()
        )
    }
}

impl fmt::Display for FaceFaceInterference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.faces;
        write!(f, "faces ({a}, {b}): ")?;
        match self.outcome {
            PairOutcome::Curves => write!(f, "{} curves", self.curves.len()),
            PairOutcome::Touching => write!(f, "{} touching points", self.points.len()),
            PairOutcome::Coincident => write!(f, "coincident"),
            PairOutcome::Empty => write!(f, "empty"),
            PairOutcome::Unreliable { deviation } => write!(f, "unreliable ({deviation:.3e})"),
        }
    }
}

pub fn dump_pairs(cfg: &BopConfig, label: &str, pairs: &[(usize, usize)]) {
    if !cfg.debug.dump_pairs {
        return;
    }
    debug!(label, count = pairs.len(), "candidate pairs");
    for (a, b) in pairs {
        debug!(label, a, b, "pair");
    }
}

pub fn dump_pave_blocks(cfg: &BopConfig, label: &str, blocks: &[PaveBlock]) {
    if !cfg.debug.dump_pave_blocks {
        return;
    }
    for (i, pb) in blocks.iter().enumerate() {
        debug!(label, index = i, block = %pb, "pave block");
    }
}

/// Sample points found while marching a numeric section.
pub fn dump_points(cfg: &BopConfig, face1: usize, face2: usize, points: &[Point3d]) {
    if !cfg.debug.dump_points {
        return;
    }
    debug!(face1, face2, count = points.len(), "section samples");
    for p in points {
        debug!(face1, face2, x = p.x, y = p.y, z = p.z, "sample");
    }
}

pub fn dump_interference(cfg: &BopConfig, ff: &FaceFaceInterference) {
    if !cfg.debug.dump_pave_blocks {
        return;
    }
    debug!(interference = %ff, "face pair");
    for (i, ic) in ff.curves.iter().enumerate() {
        debug!(index = i, curve = %ic, "section curve");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pave_block_display() {
        let mut pb = PaveBlock::new(Some(4), Pave::new(1, 0.0), Pave::new(2, 1.0)).unwrap();
        pb.append_ext_pave(Pave::new(7, 0.5));
        let s = pb.to_string();
        assert!(s.starts_with("[v1@0.000000000 .. v2@1.000000000] of e4"));
        assert!(s.ends_with("ext: v7@0.500000000"));
    }

    #[test]
    fn test_interference_display() {
        let ff = FaceFaceInterference::new(3, 9, PairOutcome::Empty);
        assert_eq!(ff.to_string(), "faces (3, 9): empty");
    }

    #[test]
    fn test_unbound_pave_display() {
        assert_eq!(Pave::unbound(2.5).to_string(), "-@2.500000000");
    }
}
