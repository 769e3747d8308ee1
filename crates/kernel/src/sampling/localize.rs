//! Breadth-first localization of candidate intersection cells.
//!
//! The parameter domains are cut into range-sample cells; pairs of cells
//! whose boxes (grown by their own deflection and the caller's gap) are
//! disjoint are dropped, the others are refined until they cannot be split
//! any more. What remains are small cell pairs that the numeric
//! intersectors use as seeds.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::config::BopConfig;
use crate::geometry::CurveEval;
use crate::geometry::bbox::BoundingBox;
use crate::geometry::surfaces::Surface;

use super::range::{CurveRangeSample, ParamRange, SurfaceRangeSample};

/// Grid resolution of the box of one cell.
const CELL_GRID: usize = 2;

/// A bounded parameter rectangle of a surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceDomain<'a> {
    pub surface: &'a Surface,
    pub u: (f64, f64),
    pub v: (f64, f64),
}

impl<'a> SurfaceDomain<'a> {
    pub fn new(surface: &'a Surface, u: (f64, f64), v: (f64, f64)) -> Self {
        Self { surface, u, v }
    }

    fn cell_ranges(&self, cell: &SurfaceRangeSample, cfg: &BopConfig) -> (ParamRange, ParamRange) {
        (
            cell.range_u(self.u.0, self.u.1, cfg.surface_samples_u),
            cell.range_v(self.v.0, self.v.1, cfg.surface_samples_v),
        )
    }

    fn cell_box(&self, cell: &SurfaceRangeSample, cfg: &BopConfig) -> BoundingBox {
        let (ru, rv) = self.cell_ranges(cell, cfg);
        BoundingBox::of_surface_patch(self.surface, ru.as_tuple(), rv.as_tuple(), CELL_GRID)
    }

    /// Children of `cell`, split on every axis that can still be refined.
    fn refine(&self, cell: &SurfaceRangeSample, cfg: &BopConfig) -> Vec<SurfaceRangeSample> {
        let (ru, rv) = self.cell_ranges(cell, cfg);
        let split_u = cell.u.can_refine(
            cfg.surface_samples_u,
            ru.length(),
            cfg.min_cell_width,
            cfg.max_depth,
        );
        let split_v = cell.v.can_refine(
            cfg.surface_samples_v,
            rv.length(),
            cfg.min_cell_width,
            cfg.max_depth,
        );
        match (split_u, split_v) {
            (true, true) => cell.children(cfg.surface_samples_u, cfg.surface_samples_v),
            (true, false) => cell
                .u
                .children(cfg.surface_samples_u)
                .map(|u| SurfaceRangeSample::from_samples(u, cell.v))
                .collect(),
            (false, true) => cell
                .v
                .children(cfg.surface_samples_v)
                .map(|v| SurfaceRangeSample::from_samples(cell.u, v))
                .collect(),
            (false, false) => Vec::new(),
        }
    }
}

/// A bounded parameter range of a curve.
#[derive(Debug, Clone, Copy)]
pub struct CurveDomain<'a, C: CurveEval + ?Sized> {
    pub curve: &'a C,
    pub first: f64,
    pub last: f64,
}

impl<'a, C: CurveEval + ?Sized> CurveDomain<'a, C> {
    pub fn new(curve: &'a C, first: f64, last: f64) -> Self {
        Self { curve, first, last }
    }

    fn cell_range(&self, cell: &CurveRangeSample, cfg: &BopConfig) -> ParamRange {
        cell.range(self.first, self.last, cfg.curve_samples)
    }

    fn cell_box(&self, cell: &CurveRangeSample, cfg: &BopConfig) -> BoundingBox {
        let r = self.cell_range(cell, cfg);
        BoundingBox::of_curve_range(self.curve, r.first, r.last, CELL_GRID * 2)
    }

    fn refine(&self, cell: &CurveRangeSample, cfg: &BopConfig) -> Vec<CurveRangeSample> {
        let r = self.cell_range(cell, cfg);
        if cell.can_refine(cfg.curve_samples, r.length(), cfg.min_cell_width, cfg.max_depth) {
            cell.children(cfg.curve_samples).collect()
        } else {
            Vec::new()
        }
    }
}

/// Leaf cell pairs of a curve range against a surface patch whose boxes,
/// grown by `gap`, overlap.
pub fn localize_curve_surface<C: CurveEval + ?Sized>(
    curve: &CurveDomain<'_, C>,
    surface: &SurfaceDomain<'_>,
    gap: f64,
    cfg: &BopConfig,
) -> Vec<(CurveRangeSample, SurfaceRangeSample)> {
    let mut curve_boxes: HashMap<CurveRangeSample, BoundingBox> = HashMap::new();
    let mut surface_boxes: HashMap<SurfaceRangeSample, BoundingBox> = HashMap::new();
    let mut queue = VecDeque::from([(CurveRangeSample::root(), SurfaceRangeSample::root())]);
    let mut leaves = Vec::new();

    while let Some((c, s)) = queue.pop_front() {
        let cb = *curve_boxes
            .entry(c)
            .or_insert_with(|| curve.cell_box(&c, cfg).enlarged(gap));
        let sb = *surface_boxes
            .entry(s)
            .or_insert_with(|| surface.cell_box(&s, cfg).enlarged(gap));
        if cb.is_out(&sb) {
            continue;
        }
        if leaves.len() + queue.len() >= cfg.max_leaves {
            leaves.push((c, s));
            continue;
        }

        let c_kids = curve.refine(&c, cfg);
        let s_kids = surface.refine(&s, cfg);
        // Split the cell with the larger box; fall back to the other one.
        let split_curve = match (c_kids.is_empty(), s_kids.is_empty()) {
            (true, true) => {
                leaves.push((c, s));
                continue;
            }
            (false, true) => true,
            (true, false) => false,
            (false, false) => cb.diagonal() >= sb.diagonal(),
        };
        if split_curve {
            queue.extend(c_kids.into_iter().map(|k| (k, s)));
        } else {
            queue.extend(s_kids.into_iter().map(|k| (c, k)));
        }
    }

    if leaves.len() >= cfg.max_leaves {
        warn!(leaves = leaves.len(), "curve/surface localization hit the leaf limit");
    }
    debug!(leaves = leaves.len(), "curve/surface localization done");
    leaves
}

/// Leaf cell pairs of two surface patches whose boxes, grown by `gap`,
/// overlap.
pub fn localize_surface_surface(
    first: &SurfaceDomain<'_>,
    second: &SurfaceDomain<'_>,
    gap: f64,
    cfg: &BopConfig,
) -> Vec<(SurfaceRangeSample, SurfaceRangeSample)> {
    let mut boxes1: HashMap<SurfaceRangeSample, BoundingBox> = HashMap::new();
    let mut boxes2: HashMap<SurfaceRangeSample, BoundingBox> = HashMap::new();
    let mut queue = VecDeque::from([(SurfaceRangeSample::root(), SurfaceRangeSample::root())]);
    let mut leaves = Vec::new();

    while let Some((a, b)) = queue.pop_front() {
        let ba = *boxes1
            .entry(a)
            .or_insert_with(|| first.cell_box(&a, cfg).enlarged(gap));
        let bb = *boxes2
            .entry(b)
            .or_insert_with(|| second.cell_box(&b, cfg).enlarged(gap));
        if ba.is_out(&bb) {
            continue;
        }
        if leaves.len() + queue.len() >= cfg.max_leaves {
            leaves.push((a, b));
            continue;
        }

        let a_kids = first.refine(&a, cfg);
        let b_kids = second.refine(&b, cfg);
        let split_first = match (a_kids.is_empty(), b_kids.is_empty()) {
            (true, true) => {
                leaves.push((a, b));
                continue;
            }
            (false, true) => true,
            (true, false) => false,
            (false, false) => ba.diagonal() >= bb.diagonal(),
        };
        if split_first {
            queue.extend(a_kids.into_iter().map(|k| (k, b)));
        } else {
            queue.extend(b_kids.into_iter().map(|k| (a, k)));
        }
    }

    if leaves.len() >= cfg.max_leaves {
        warn!(leaves = leaves.len(), "surface/surface localization hit the leaf limit");
    }
    debug!(leaves = leaves.len(), "surface/surface localization done");
    leaves
}
