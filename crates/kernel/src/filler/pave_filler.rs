//! The intersection phase of a Boolean operation.
//!
//! Vertices, edges and faces of each argument are intersected with those
//! of the other. The contacts become vertices and paves that split the
//! edges, then every face pair is
//! intersected and its section curves are split at the vertices lying on
//! both faces. Blocks of those curves that lie on both faces become new
//! edges.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use crate::config::BopConfig;
use crate::diagnostics;
use crate::ds::{
    DataStructure, EdgeEdgeHit, EdgeFaceHit, FaceFaceInterference, IntersectionCurve,
    PairOutcome, Pave, PaveBlock, SectionCurve, ShapeKind, VertexEdgeHit, check_contiguous,
};
use crate::error::{BopError, Location, Result};
use crate::geometry::CurveEval;
use crate::geometry::bbox::BoundingBox;
use crate::geometry::point::Point3d;
use crate::intersect::numeric::foot_parameter;
use crate::intersect::{
    FaceClassifier, PointState, intersect_edge_edge, intersect_edge_face, intersect_faces,
    intersect_vertex_edge, vertex_in_face,
};
use crate::pairing::{BoxSorter, pairs_of_kinds};

use super::abort::AbortFlag;
use super::result::IntersectionResult;

/// Runs the intersection phase over a built `DataStructure`.
#[derive(Debug)]
pub struct PaveFiller {
    ds: DataStructure,
    config: BopConfig,
    abort: AbortFlag,
}

impl PaveFiller {
    pub fn new(ds: DataStructure, config: BopConfig) -> Self {
        Self {
            ds,
            config,
            abort: AbortFlag::new(),
        }
    }

    /// Uses a flag shared with the caller for cancellation.
    pub fn with_abort(mut self, abort: AbortFlag) -> Self {
        self.abort = abort;
        self
    }

    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    pub fn config(&self) -> &BopConfig {
        &self.config
    }

    #[instrument(skip(self), fields(entries = self.ds.len()))]
    pub fn perform(mut self) -> Result<IntersectionResult> {
        info!(
            entries = self.ds.len(),
            parallel = self.config.runs_parallel(),
            "pave filler started"
        );
        self.ds.init_pave_blocks()?;
        self.abort.check()?;

        let ve_hits = self.intersect_vertices_edges()?;
        let vf_pairs = self.vertices_in_faces()?;
        let ee_hits = self.intersect_edges_edges()?;
        let ef_hits = self.intersect_edges_faces()?;

        let mut contacts = Vec::new();
        for h in &ve_hits {
            let paves = vec![(h.edge, h.parameter)];
            contacts.push(Contact::at_vertex(&self.ds, h.vertex, paves, Vec::new())?);
        }
        for &(v, f) in &vf_pairs {
            contacts.push(Contact::at_vertex(&self.ds, v, Vec::new(), vec![f])?);
        }
        for h in &ee_hits {
            contacts.push(Contact::edge_edge(&self.ds, h, &self.config)?);
        }
        for h in &ef_hits {
            contacts.push(Contact::edge_face(&self.ds, h, &self.config)?);
        }
        self.merge_contacts(&contacts)?;
        self.abort.check()?;

        let mut interferences = self.intersect_face_pairs()?;
        for ff in &mut interferences {
            self.fill_section_paves(ff)?;
        }
        let section_edges = self.make_section_edges(&mut interferences)?;
        for ff in interferences {
            diagnostics::dump_interference(&self.config, &ff);
            self.ds.add_interference(ff);
        }

        info!(
            vertex_edge = ve_hits.len(),
            edge_edge = ee_hits.len(),
            edge_face = ef_hits.len(),
            interferences = self.ds.interferences().len(),
            section_edges = section_edges.len(),
            "pave filler finished"
        );
        Ok(IntersectionResult::new(self.ds, ef_hits, section_edges)
            .with_edge_edge_hits(ee_hits)
            .with_vertex_edge_hits(ve_hits))
    }

    // ─── Vertices ───────────────────────────────────────────────────────

    /// Vertices of each argument lying on edges of the other.
    fn intersect_vertices_edges(&self) -> Result<Vec<VertexEdgeHit>> {
        let pairs = cross_pairs(&self.ds, ShapeKind::Vertex, ShapeKind::Edge);
        diagnostics::dump_pairs(&self.config, "vertex/edge", &pairs);

        let ds = &self.ds;
        let cfg = &self.config;
        let results = run_tasks(cfg.runs_parallel(), &pairs, |&(v, e)| {
            intersect_vertex_edge(ds, v, e, cfg)
        });
        let mut hits = Vec::new();
        for (result, (v, e)) in results.into_iter().zip(&pairs) {
            let location = Location::VertexOn { vertex: *v, shape: *e };
            if let Some(Some(hit)) = absorb(result, location)? {
                hits.push(hit);
            }
        }
        debug!(pairs = pairs.len(), hits = hits.len(), "vertex/edge phase done");
        Ok(hits)
    }

    /// `(vertex, face)` pairs where a vertex of one argument lies in a face
    /// of the other.
    fn vertices_in_faces(&self) -> Result<Vec<(usize, usize)>> {
        let pairs = cross_pairs(&self.ds, ShapeKind::Vertex, ShapeKind::Face);
        diagnostics::dump_pairs(&self.config, "vertex/face", &pairs);

        let ds = &self.ds;
        let cfg = &self.config;
        let results = run_tasks(cfg.runs_parallel(), &pairs, |&(v, f)| {
            vertex_in_face(ds, v, f, cfg)
        });
        let mut inside = Vec::new();
        for (result, &(v, f)) in results.into_iter().zip(&pairs) {
            if absorb(result, Location::VertexOn { vertex: v, shape: f })? == Some(true) {
                inside.push((v, f));
            }
        }
        debug!(pairs = pairs.len(), inside = inside.len(), "vertex/face phase done");
        Ok(inside)
    }

    // ─── Edge / edge ────────────────────────────────────────────────────

    /// One task per overlapping (edge, edge) pair across the arguments.
    fn intersect_edges_edges(&self) -> Result<Vec<EdgeEdgeHit>> {
        let pairs = pairs_of_kinds(&self.ds, ShapeKind::Edge, ShapeKind::Edge);
        diagnostics::dump_pairs(&self.config, "edge/edge", &pairs);

        let ds = &self.ds;
        let cfg = &self.config;
        let results = run_tasks(cfg.runs_parallel(), &pairs, |&(e1, e2)| {
            intersect_edge_edge(ds, e1, e2, cfg)
        });
        let mut hits = Vec::new();
        for (result, &(e1, e2)) in results.into_iter().zip(&pairs) {
            if let Some(found) = absorb(result, Location::EdgePair(e1, e2))? {
                hits.extend(found);
            }
        }
        debug!(pairs = pairs.len(), hits = hits.len(), "edge/edge phase done");
        Ok(hits)
    }

    // ─── Edge / face ────────────────────────────────────────────────────

    /// One task per overlapping (edge, face) pair across the arguments.
    fn intersect_edges_faces(&self) -> Result<Vec<EdgeFaceHit>> {
        let pairs = cross_pairs(&self.ds, ShapeKind::Edge, ShapeKind::Face);
        diagnostics::dump_pairs(&self.config, "edge/face", &pairs);

        let ds = &self.ds;
        let cfg = &self.config;
        let results = run_tasks(cfg.runs_parallel(), &pairs, |&(e, f)| {
            intersect_edge_face(ds, e, f, cfg)
        });

        let mut hits = Vec::new();
        for (result, &(edge, face)) in results.into_iter().zip(&pairs) {
            if let Some(found) = absorb(result, Location::EdgeFace { edge, face })? {
                hits.extend(found);
            }
        }
        debug!(pairs = pairs.len(), hits = hits.len(), "edge/face phase done");
        Ok(hits)
    }

    // ─── Merge ──────────────────────────────────────────────────────────

    /// The serialized reduction of the vertex and edge phases: contacts
    /// near an existing vertex reuse it, the others are clustered into new
    /// vertices, then each edge is split at its new paves.
    fn merge_contacts(&mut self, contacts: &[Contact]) -> Result<()> {
        let coincidence = self.config.tolerance.coincidence;

        // Vertices the vertex/edge phase already put on each edge.
        let mut on_edge: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for c in contacts {
            if let Some(v) = c.vertex {
                for &(e, _) in &c.paves {
                    on_edge.entry(e).or_default().push(v);
                }
            }
        }

        let mut vertex_of: Vec<Option<usize>> = Vec::with_capacity(contacts.len());
        for c in contacts {
            vertex_of.push(match c.vertex {
                Some(v) => Some(v),
                None => self.snap_to_vertex(c, &on_edge)?,
            });
        }

        // Cluster the remaining contacts by overlapping tolerance boxes.
        let loose: Vec<usize> = (0..contacts.len()).filter(|&i| vertex_of[i].is_none()).collect();
        let span = |i: usize| BoundingBox::from_points(&[contacts[i].point]).enlarged(contacts[i].tolerance);
        let sorter = BoxSorter::new(loose.iter().map(|&i| (i, span(i))));
        let mut sets = DisjointSets::new(contacts.len());
        for &i in &loose {
            for j in sorter.compare(&span(i)) {
                sets.union(i, j);
            }
        }
        let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &i in &loose {
            clusters.entry(sets.find(i)).or_default().push(i);
        }
        for members in clusters.values() {
            let points: Vec<Point3d> = members.iter().map(|&i| contacts[i].point).collect();
            let Some(center) = Point3d::centroid(&points) else {
                continue;
            };
            let tol = members
                .iter()
                .map(|&i| contacts[i].tolerance.max(contacts[i].point.distance_to(&center)))
                .fold(coincidence, f64::max);
            let v = self.ds.add_vertex(center, tol);
            for &i in members {
                vertex_of[i] = Some(v);
            }
        }

        let ptol = self.config.tolerance.parametric;
        let mut touched: Vec<usize> = Vec::new();
        for (c, v) in contacts.iter().zip(&vertex_of) {
            let Some(v) = *v else { continue };
            for &f in &c.faces {
                self.ds.add_vertex_on_face(v, f);
            }
            for &(e, t) in &c.paves {
                let edge_faces = self.ds.faces_of_edge(e).to_vec();
                for f in edge_faces {
                    self.ds.add_vertex_on_face(v, f);
                }
                let (v1, v2) = self.ds.edge_vertices(e)?;
                if v == v1 || v == v2 {
                    continue;
                }
                let blocks = self.ds.pave_blocks_mut(e)?;
                if let Some(pb) = blocks.iter_mut().find(|pb| pb.contains_parameter(t, ptol)) {
                    pb.append_ext_pave(Pave::new(v, t));
                    touched.push(e);
                }
            }
        }
        touched.sort_unstable();
        touched.dedup();

        for e in touched {
            let blocks = std::mem::take(self.ds.pave_blocks_mut(e)?);
            let mut split = Vec::with_capacity(blocks.len() + 1);
            for pb in &blocks {
                if pb.ext_paves().is_empty() {
                    split.push(pb.clone());
                } else {
                    split.extend(pb.update(true, ptol)?);
                }
            }
            check_contiguous(&split, Location::Edge(e))?;
            diagnostics::dump_pave_blocks(&self.config, &format!("edge {e}"), &split);
            *self.ds.pave_blocks_mut(e)? = split;
        }
        Ok(())
    }

    /// A vertex lying on the contact: an end of one of its edges, a vertex
    /// already placed on one of them, or a boundary vertex of one of its
    /// faces.
    fn snap_to_vertex(&self, c: &Contact, on_edge: &BTreeMap<usize, Vec<usize>>) -> Result<Option<usize>> {
        let mut candidates = Vec::new();
        for &(e, _) in &c.paves {
            let (v1, v2) = self.ds.edge_vertices(e)?;
            candidates.extend([v1, v2]);
            candidates.extend(on_edge.get(&e).into_iter().flatten().copied());
        }
        for &f in &c.faces {
            for &e in self.ds.face_edges(f)? {
                if let Ok((a, b)) = self.ds.edge_vertices(e) {
                    candidates.extend([a, b]);
                }
            }
        }
        let mut best: Option<(usize, f64)> = None;
        for v in candidates {
            let entry = self.ds.entry(v)?;
            if entry.degenerate {
                continue;
            }
            let d = self.ds.vertex_point(v)?.distance_to(&c.point);
            if d <= c.tolerance + entry.tolerance && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((v, d));
            }
        }
        Ok(best.map(|(v, _)| v))
    }

    // ─── Face / face ────────────────────────────────────────────────────

    /// One task per overlapping face pair. The abort flag is polled before
    /// each task starts.
    fn intersect_face_pairs(&self) -> Result<Vec<FaceFaceInterference>> {
        let pairs = pairs_of_kinds(&self.ds, ShapeKind::Face, ShapeKind::Face);
        diagnostics::dump_pairs(&self.config, "face/face", &pairs);

        let ds = &self.ds;
        let cfg = &self.config;
        let abort = &self.abort;
        let results = run_tasks(cfg.runs_parallel(), &pairs, |&(f1, f2)| {
            if abort.is_aborted() {
                return Err(BopError::Aborted);
            }
            intersect_faces(ds, f1, f2, cfg)
        });

        let mut out = Vec::new();
        for (result, (f1, f2)) in results.into_iter().zip(&pairs) {
            if let Some(ff) = absorb(result, Location::FacePair(*f1, *f2))? {
                out.push(ff);
            }
        }
        debug!(pairs = pairs.len(), "face/face phase done");
        Ok(out)
    }

    /// Puts paves on every section curve of `ff` and splits it. Unreliable
    /// pairs keep their curves unsplit.
    fn fill_section_paves(&mut self, ff: &mut FaceFaceInterference) -> Result<()> {
        if ff.outcome != PairOutcome::Curves {
            return Ok(());
        }
        let (f1, f2) = ff.faces;
        let ptol = self.config.tolerance.parametric;
        let shared = self.ds.vertices_on_faces(f1, f2);

        for (ci, ic) in ff.curves.iter_mut().enumerate() {
            let location = Location::SectionCurve {
                face1: f1,
                face2: f2,
                curve: ci,
            };
            ic.init_pave_block1().map_err(|e| e.at(location))?;
            self.put_paves_on_curve(ic, &shared, ptol)?;
            self.put_closing_paves(ic, ptol).map_err(|e| e.at(location))?;
            self.put_technical_vertices(ic, (f1, f2), ptol)?;
            ic.split(ptol).map_err(|e| e.at(location))?;
            self.flag_blocks_on_faces(ic, (f1, f2), ptol)?;
            diagnostics::dump_pave_blocks(
                &self.config,
                &format!("curve {ci} of faces ({f1}, {f2})"),
                ic.pave_blocks(),
            );
        }
        Ok(())
    }

    /// Paves for the vertices known to lie on both faces and on the curve.
    fn put_paves_on_curve(&mut self, ic: &mut IntersectionCurve, shared: &[usize], ptol: f64) -> Result<()> {
        let curve = ic.curve().clone();
        let tol = ic.tolerance();
        for &v in shared {
            let p = self.ds.vertex_point(v)?;
            let vtol = self.ds.entry(v)?.tolerance;
            let t = parameter_on(&curve, &p);
            if t < curve.first - ptol || t > curve.last + ptol {
                continue;
            }
            let t = t.clamp(curve.first, curve.last);
            let on = curve.evaluate(t);
            if on.distance_to(&p) > tol + vtol {
                continue;
            }
            if ic.pave_block1_mut()?.append_ext_pave(Pave::new(v, t)) {
                self.ds.widen_vertex_tolerance(v, &on)?;
            }
        }
        Ok(())
    }

    /// A closed curve with a pave on one bound gets the same vertex on the
    /// other bound.
    fn put_closing_paves(&self, ic: &mut IntersectionCurve, ptol: f64) -> Result<()> {
        let curve = ic.curve();
        if !curve.is_closed(ic.tolerance()) {
            return Ok(());
        }
        let (first, last) = curve.range();
        let pb = ic.pave_block1_mut()?;
        let mut closing = Vec::new();
        for p in pb.ext_paves() {
            let Some(v) = p.vertex else { continue };
            if (p.parameter - first).abs() < ptol {
                closing.push(Pave::new(v, last));
            } else if (p.parameter - last).abs() < ptol {
                closing.push(Pave::new(v, first));
            }
        }
        for p in closing {
            pb.append_ext_pave(p);
        }
        Ok(())
    }

    /// Vertices created only to bound a curve: one at the start of a
    /// closed curve without paves, and one at each open end that lies
    /// inside both faces with no pave near it.
    fn put_technical_vertices(
        &mut self,
        ic: &mut IntersectionCurve,
        (f1, f2): (usize, usize),
        ptol: f64,
    ) -> Result<()> {
        let tol = ic.tolerance();
        let curve = ic.curve().clone();
        let (first, last) = curve.range();

        if curve.is_closed(tol) {
            if ic.pave_block1_mut()?.ext_paves().is_empty() {
                let v = self.technical_vertex(curve.start_point(), tol, (f1, f2));
                let pb = ic.pave_block1_mut()?;
                pb.append_ext_pave(Pave::new(v, first));
                pb.append_ext_pave(Pave::new(v, last));
                ic.technical_vertices_mut().push(v);
            }
            return Ok(());
        }

        let mut open_ends = Vec::new();
        {
            let c1 = FaceClassifier::new(&self.ds, f1, tol)?;
            let c2 = FaceClassifier::new(&self.ds, f2, tol)?;
            let paves = ic.pave_block1_mut()?.ext_paves().to_vec();
            for t in [first, last] {
                let p = curve.evaluate(t);
                let covered = paves.iter().any(|pv| {
                    (pv.parameter - t).abs() <= ptol
                        || curve.evaluate(pv.parameter).distance_to(&p) <= tol
                });
                if !covered
                    && c1.classify(&p) == PointState::In
                    && c2.classify(&p) == PointState::In
                {
                    open_ends.push((t, p));
                }
            }
        }
        for (t, p) in open_ends {
            let v = self.technical_vertex(p, tol, (f1, f2));
            ic.pave_block1_mut()?.append_ext_pave(Pave::new(v, t));
            ic.technical_vertices_mut().push(v);
        }
        Ok(())
    }

    fn technical_vertex(&mut self, p: Point3d, tol: f64, (f1, f2): (usize, usize)) -> usize {
        let v = self.ds.add_vertex(p, tol);
        self.ds.add_vertex_on_face(v, f1);
        self.ds.add_vertex_on_face(v, f2);
        debug!(vertex = v, f1, f2, "technical vertex");
        v
    }

    /// Flags the blocks that are long enough, bounded by vertices, inside
    /// both faces, and not already an existing edge.
    fn flag_blocks_on_faces(
        &self,
        ic: &mut IntersectionCurve,
        (f1, f2): (usize, usize),
        ptol: f64,
    ) -> Result<()> {
        let tol = ic.tolerance();
        let c1 = FaceClassifier::new(&self.ds, f1, tol)?;
        let c2 = FaceClassifier::new(&self.ds, f2, tol)?;
        let curve = ic.curve().clone();
        for pb in ic.pave_blocks_mut() {
            let (t1, t2) = pb.range();
            let (Some(v1), Some(v2)) = pb.indices() else {
                continue;
            };
            if t2 - t1 <= ptol {
                continue;
            }
            let mid = curve.evaluate(pb.mid_parameter());
            let on = c1.contains(&mid)
                && c2.contains(&mid)
                && self.existing_edge_between(v1, v2, &mid, tol).is_none();
            pb.set_on_faces(on);
        }
        Ok(())
    }

    /// An edge already joining `v1` and `v2` through `mid`.
    fn existing_edge_between(&self, v1: usize, v2: usize, mid: &Point3d, tol: f64) -> Option<usize> {
        (0..self.ds.len()).find(|&e| {
            self.ds.pave_blocks(e).iter().any(|pb| {
                let same_ends = matches!(pb.indices(), (Some(a), Some(b))
                    if (a, b) == (v1, v2) || (a, b) == (v2, v1));
                same_ends
                    && pb.original_edge().is_some_and(|orig| {
                        self.ds
                            .edge_geometry(orig)
                            .is_ok_and(|(c, _, _)| c.evaluate(pb.mid_parameter()).distance_to(mid) <= tol)
                    })
            })
        })
    }

    /// Promotes every flagged block to a new edge lying on both faces.
    fn make_section_edges(&mut self, interferences: &mut [FaceFaceInterference]) -> Result<Vec<usize>> {
        let mut created = Vec::new();
        for ff in interferences.iter_mut() {
            let (f1, f2) = ff.faces;
            for ic in &mut ff.curves {
                let geometry = ic.curve().geometry.clone();
                let tol = ic.tolerance();
                let flagged: Vec<(usize, PaveBlock)> = ic
                    .pave_blocks()
                    .iter()
                    .enumerate()
                    .filter(|(_, pb)| pb.on_faces() && !pb.has_edge())
                    .map(|(i, pb)| (i, pb.clone()))
                    .collect();
                for (i, pb) in flagged {
                    let (Some(v1), Some(v2)) = pb.indices() else {
                        continue;
                    };
                    let (t1, t2) = pb.range();
                    let e = self.ds.add_section_edge(geometry.clone(), t1, t2, (v1, v2), tol)?;
                    self.ds.set_faces_of_edge(e, vec![f1, f2])?;
                    ic.promote(i, e)?;
                    created.push(e);
                }
            }
        }
        debug!(edges = created.len(), "section edges made");
        Ok(created)
    }
}

/// Parameter of the point of `curve` nearest to `p`.
fn parameter_on(curve: &SectionCurve, p: &Point3d) -> f64 {
    foot_parameter(&curve.geometry, p, curve.first, curve.last)
}

/// Overlapping pairs of a `kind1` shape and a `kind2` shape taken from
/// different arguments, in both directions, as `(kind1, kind2)`.
fn cross_pairs(ds: &DataStructure, kind1: ShapeKind, kind2: ShapeKind) -> Vec<(usize, usize)> {
    let mut pairs = pairs_of_kinds(ds, kind1, kind2);
    pairs.extend(
        pairs_of_kinds(ds, kind2, kind1)
            .into_iter()
            .map(|(b, a)| (a, b)),
    );
    pairs
}

/// A point that becomes a vertex, or reuses one, lying on some edges at
/// the given parameters and on some faces.
#[derive(Debug, Clone)]
struct Contact {
    point: Point3d,
    tolerance: f64,
    vertex: Option<usize>,
    paves: Vec<(usize, f64)>,
    faces: Vec<usize>,
}

impl Contact {
    fn at_vertex(
        ds: &DataStructure,
        vertex: usize,
        paves: Vec<(usize, f64)>,
        faces: Vec<usize>,
    ) -> Result<Self> {
        Ok(Self {
            point: ds.vertex_point(vertex)?,
            tolerance: ds.entry(vertex)?.tolerance,
            vertex: Some(vertex),
            paves,
            faces,
        })
    }

    fn edge_edge(ds: &DataStructure, h: &EdgeEdgeHit, cfg: &BopConfig) -> Result<Self> {
        let (e1, e2) = h.edges;
        Ok(Self {
            point: h.point,
            tolerance: ds
                .entry(e1)?
                .tolerance
                .max(ds.entry(e2)?.tolerance)
                .max(cfg.tolerance.coincidence),
            vertex: None,
            paves: vec![(e1, h.parameters.0), (e2, h.parameters.1)],
            faces: Vec::new(),
        })
    }

    fn edge_face(ds: &DataStructure, h: &EdgeFaceHit, cfg: &BopConfig) -> Result<Self> {
        Ok(Self {
            point: h.point,
            tolerance: ds
                .entry(h.edge)?
                .tolerance
                .max(ds.entry(h.face)?.tolerance)
                .max(cfg.tolerance.coincidence),
            vertex: None,
            paves: vec![(h.edge, h.parameter)],
            faces: vec![h.face],
        })
    }
}

/// Keeps fatal errors, downgrades the rest of a pair's failure to a
/// warning so the other pairs still run.
fn absorb<T>(result: Result<T>, location: Location) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_fatal() => Err(e.at(location)),
        Err(e) => {
            warn!(%location, error = %e, "pair skipped");
            Ok(None)
        }
    }
}

#[cfg(feature = "parallel")]
fn run_tasks<T, R, F>(parallel: bool, items: &[T], task: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    use rayon::prelude::*;
    if parallel {
        items.par_iter().map(task).collect()
    } else {
        items.iter().map(task).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn run_tasks<T, R, F>(_parallel: bool, items: &[T], task: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(task).collect()
}

/// Union-find over hit indices.
#[derive(Debug)]
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::DataStructureBuilder;
    use crate::geometry::curves::{Curve, Line3d};
    use crate::geometry::surfaces::{Plane, Surface};
    use crate::geometry::vector::Vec3;

    /// Axis-aligned rectangle face in the plane through `origin` spanned by
    /// `du` and `dv`.
    fn rect(b: &mut DataStructureBuilder, rank: usize, origin: Point3d, du: Vec3, dv: Vec3) -> usize {
        let pts = [origin, origin + du, origin + du + dv, origin + dv];
        let vs: Vec<usize> = pts.iter().map(|p| b.add_vertex(rank, *p, 1e-7).unwrap()).collect();
        let edges: Vec<usize> = (0..4)
            .map(|k| {
                let (a, c) = (pts[k], pts[(k + 1) % 4]);
                b.add_edge(
                    rank,
                    Curve::Line(Line3d::from_points(a, c)),
                    0.0,
                    a.distance_to(&c),
                    vs[k],
                    vs[(k + 1) % 4],
                    1e-7,
                )
                .unwrap()
            })
            .collect();
        b.add_face(rank, Surface::Plane(Plane::from_axes(origin, du, dv)), &edges, 1e-7)
            .unwrap()
    }

    /// Two unit squares crossing each other like a plus sign seen edge-on.
    fn crossing_squares() -> DataStructure {
        let mut b = DataStructureBuilder::new();
        rect(&mut b, 0, Point3d::new(0.0, 0.0, 0.0), Vec3::X * 2.0, Vec3::Y * 2.0);
        rect(&mut b, 1, Point3d::new(1.0, -1.0, -1.0), Vec3::Y * 4.0, Vec3::Z * 2.0);
        b.build()
    }

    #[test]
    fn test_crossing_squares_make_one_section_edge() {
        let ds = crossing_squares();
        let result = PaveFiller::new(ds, BopConfig::default().with_parallel(false))
            .perform()
            .unwrap();
        // Argument 0 edges at y = 0 and y = 2 pierce the second square.
        assert_eq!(result.edge_face_hits().len(), 2);
        assert_eq!(result.section_edges().len(), 1);
        let ds = result.data_structure();
        let e = result.section_edges()[0];
        let (v1, v2) = ds.edge_vertices(e).unwrap();
        let mut ys = [ds.vertex_point(v1).unwrap().y, ds.vertex_point(v2).unwrap().y];
        ys.sort_by(f64::total_cmp);
        assert!(ys[0].abs() < 1e-9 && (ys[1] - 2.0).abs() < 1e-9);
        assert_eq!(ds.faces_of_edge(e).len(), 2);
        assert!(result.interferences().iter().all(|ff| ff.has_edges()));
    }

    #[test]
    fn test_pierced_edges_are_split() {
        let ds = crossing_squares();
        let result = PaveFiller::new(ds, BopConfig::default().with_parallel(false))
            .perform()
            .unwrap();
        let split: Vec<usize> = (0..result.data_structure().nb_source_shapes())
            .filter(|&e| result.pave_blocks(e).len() == 2)
            .collect();
        assert_eq!(split.len(), 2);
    }

    /// Squares [0, 2]² and [1, 3]² lying in the same plane.
    fn overlapping_squares() -> DataStructure {
        let mut b = DataStructureBuilder::new();
        rect(&mut b, 0, Point3d::ORIGIN, Vec3::X * 2.0, Vec3::Y * 2.0);
        rect(&mut b, 1, Point3d::new(1.0, 1.0, 0.0), Vec3::X * 2.0, Vec3::Y * 2.0);
        b.build()
    }

    #[test]
    fn test_coplanar_squares_split_crossing_edges() {
        let result = PaveFiller::new(overlapping_squares(), BopConfig::default().with_parallel(false))
            .perform()
            .unwrap();
        assert!(result.edge_face_hits().is_empty());
        assert_eq!(result.edge_edge_hits().len(), 2);

        let ds = result.data_structure();
        let split: Vec<usize> = (0..ds.nb_source_shapes())
            .filter(|&e| result.pave_blocks(e).len() == 2)
            .collect();
        assert_eq!(split.len(), 4);

        let mut corners: Vec<(f64, f64)> = Vec::new();
        for hit in result.edge_edge_hits() {
            let (e1, e2) = hit.edges;
            assert!(split.contains(&e1) && split.contains(&e2));
            // Both edges end their first block at the same new vertex.
            let v1 = result.pave_blocks(e1)[0].pave2().vertex.unwrap();
            assert_eq!(result.pave_blocks(e2)[0].pave2().vertex, Some(v1));
            assert!(v1 >= ds.nb_source_shapes());
            let p = ds.vertex_point(v1).unwrap();
            corners.push((p.x, p.y));
        }
        corners.sort_by(|a, b| a.0.total_cmp(&b.0));
        assert!((corners[0].0 - 1.0).abs() < 1e-9 && (corners[0].1 - 2.0).abs() < 1e-9);
        assert!((corners[1].0 - 2.0).abs() < 1e-9 && (corners[1].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertex_on_edge_splits_it_without_new_vertex() {
        // The second square's corner (1, 0) lands on the first square's
        // bottom edge.
        let mut b = DataStructureBuilder::new();
        rect(&mut b, 0, Point3d::ORIGIN, Vec3::X * 2.0, Vec3::Y * 2.0);
        rect(&mut b, 1, Point3d::new(1.0, 0.0, 0.0), Vec3::Y * 2.0, Vec3::Z * 2.0);
        let ds = b.build();
        let shapes = ds.len();
        let result = PaveFiller::new(ds, BopConfig::default().with_parallel(false))
            .perform()
            .unwrap();

        let hits = result.vertex_edge_hits();
        assert!(!hits.is_empty());
        let hit = hits
            .iter()
            .find(|h| (h.parameter - 1.0).abs() < 1e-9)
            .unwrap();
        let blocks = result.pave_blocks(hit.edge);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].pave2().vertex, Some(hit.vertex));
        assert!(hit.vertex < shapes);
    }

    #[test]
    fn test_raised_abort_flag_stops_the_run() {
        let flag = AbortFlag::new();
        flag.abort();
        let err = PaveFiller::new(crossing_squares(), BopConfig::default())
            .with_abort(flag)
            .perform()
            .unwrap_err();
        assert!(matches!(err, BopError::Aborted));
    }

    #[test]
    fn test_abort_after_edge_phase_stops_face_pairs() {
        let flag = AbortFlag::new();
        let mut filler = PaveFiller::new(crossing_squares(), BopConfig::default().with_parallel(false))
            .with_abort(flag.clone());
        filler.ds.init_pave_blocks().unwrap();
        let hits = filler.intersect_edges_faces().unwrap();
        assert_eq!(hits.len(), 2);
        let contacts: Vec<Contact> = hits
            .iter()
            .map(|h| Contact::edge_face(&filler.ds, h, &filler.config).unwrap())
            .collect();
        filler.merge_contacts(&contacts).unwrap();

        flag.abort();
        let err = filler.intersect_face_pairs().unwrap_err();
        assert!(matches!(err, BopError::Aborted));
    }

    #[test]
    fn test_disjoint_sets() {
        let mut s = DisjointSets::new(5);
        s.union(3, 4);
        s.union(4, 1);
        assert_eq!(s.find(3), 1);
        assert_eq!(s.find(4), 1);
        assert_eq!(s.find(0), 0);
    }
}
