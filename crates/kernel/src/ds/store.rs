use std::collections::{BTreeMap, BTreeSet};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{BopError, Location, Result};
use crate::geometry::bbox::BoundingBox;
use crate::geometry::curves::Curve;
use crate::geometry::point::Point3d;
use crate::geometry::surfaces::Surface;

use super::entry::{CurveKey, GeometryRef, ShapeEntry, ShapeKind, SurfaceKey};
use super::interference::FaceFaceInterference;
use super::pave::{Pave, PaveBlock};

/// Segments used to sample a curved edge.
const EDGE_SAMPLES: usize = 32;

/// Arena owning every shape entry, its geometry and the interference data
/// produced by a filler run. All cross references are indices or keys.
#[derive(Debug, Clone, Default)]
pub struct DataStructure {
    pub(crate) entries: Vec<ShapeEntry>,
    pub(crate) curves: SlotMap<CurveKey, Curve>,
    pub(crate) surfaces: SlotMap<SurfaceKey, Surface>,
    /// Faces bounded by each edge, indexed like `entries`.
    pub(crate) edge_faces: Vec<Vec<usize>>,
    /// Pave blocks of each edge, indexed like `entries`.
    pub(crate) pave_blocks: Vec<Vec<PaveBlock>>,
    /// Faces each vertex is known to lie on.
    pub(crate) vertex_faces: BTreeMap<usize, BTreeSet<usize>>,
    pub(crate) interferences: Vec<FaceFaceInterference>,
    /// Entries below this index came from the arguments.
    pub(crate) nb_source: usize,
}

impl DataStructure {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that came from the arguments.
    pub fn nb_source_shapes(&self) -> usize {
        self.nb_source
    }

    pub fn entries(&self) -> &[ShapeEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Result<&ShapeEntry> {
        self.entries.get(index).ok_or_else(|| {
            BopError::malformed(Location::Shape(index), "index out of range")
        })
    }

    fn entry_of_kind(&self, index: usize, kind: ShapeKind) -> Result<&ShapeEntry> {
        let e = self.entry(index)?;
        if e.kind != kind {
            return Err(BopError::malformed(
                Location::Shape(index),
                format!("expected {kind:?}, found {:?}", e.kind),
            ));
        }
        Ok(e)
    }

    pub fn curve(&self, key: CurveKey) -> Option<&Curve> {
        self.curves.get(key)
    }

    pub fn surface(&self, key: SurfaceKey) -> Option<&Surface> {
        self.surfaces.get(key)
    }

    /// Indices of non-degenerate entries of `kind`, restricted to one
    /// argument when `rank` is given.
    pub fn indices_of(&self, kind: ShapeKind, rank: Option<usize>) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == kind && !e.degenerate)
            .filter(|(_, e)| rank.is_none() || e.rank == rank)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn vertex_point(&self, index: usize) -> Result<Point3d> {
        match self.entry_of_kind(index, ShapeKind::Vertex)?.geometry {
            GeometryRef::Point(p) => Ok(p),
            _ => Err(BopError::malformed(Location::Shape(index), "vertex without a point")),
        }
    }

    /// Curve and parameter range of an edge.
    pub fn edge_geometry(&self, index: usize) -> Result<(&Curve, f64, f64)> {
        match self.entry_of_kind(index, ShapeKind::Edge)?.geometry {
            GeometryRef::Curve { key, first, last } => self
                .curves
                .get(key)
                .map(|c| (c, first, last))
                .ok_or_else(|| BopError::malformed(Location::Shape(index), "dangling curve key")),
            _ => Err(BopError::malformed(Location::Shape(index), "edge without a curve")),
        }
    }

    pub fn edge_vertices(&self, index: usize) -> Result<(usize, usize)> {
        let e = self.entry_of_kind(index, ShapeKind::Edge)?;
        match e.sub_shapes.as_slice() {
            [v1, v2] => Ok((*v1, *v2)),
            _ => Err(BopError::malformed(
                Location::Shape(index),
                "edge must have exactly two vertices",
            )),
        }
    }

    /// Surface and enclosing parameter rectangle of a face.
    pub fn face_surface(&self, index: usize) -> Result<(&Surface, (f64, f64), (f64, f64))> {
        match self.entry_of_kind(index, ShapeKind::Face)?.geometry {
            GeometryRef::Surface { key, u, v } => self
                .surfaces
                .get(key)
                .map(|s| (s, u, v))
                .ok_or_else(|| BopError::malformed(Location::Shape(index), "dangling surface key")),
            _ => Err(BopError::malformed(Location::Shape(index), "face without a surface")),
        }
    }

    pub fn face_edges(&self, index: usize) -> Result<&[usize]> {
        Ok(&self.entry_of_kind(index, ShapeKind::Face)?.sub_shapes)
    }

    pub fn faces_of_edge(&self, edge: usize) -> &[usize] {
        self.edge_faces.get(edge).map_or(&[], Vec::as_slice)
    }

    /// Records the faces a (section) edge lies on.
    pub fn set_faces_of_edge(&mut self, edge: usize, faces: Vec<usize>) -> Result<()> {
        let slot = self
            .edge_faces
            .get_mut(edge)
            .ok_or_else(|| BopError::malformed(Location::Edge(edge), "index out of range"))?;
        *slot = faces;
        Ok(())
    }

    /// Points along an edge; lines are sampled at their ends only.
    pub fn edge_polyline(&self, edge: usize) -> Result<Vec<Point3d>> {
        let (curve, first, last) = self.edge_geometry(edge)?;
        let n = match curve {
            Curve::Line(_) => 1,
            _ => EDGE_SAMPLES,
        };
        let step = (last - first) / n as f64;
        Ok((0..=n)
            .map(|i| {
                let t = if i == n { last } else { first + step * i as f64 };
                curve.evaluate(t)
            })
            .collect())
    }

    /// Sampled boundary of a face, one polyline per non-degenerate edge.
    pub fn face_boundary(&self, face: usize) -> Result<Vec<Vec<Point3d>>> {
        let mut out = Vec::new();
        for &e in self.face_edges(face)? {
            if self.entry(e)?.degenerate {
                continue;
            }
            out.push(self.edge_polyline(e)?);
        }
        Ok(out)
    }

    // ─── Paves ──────────────────────────────────────────────────────────

    /// Gives every non-degenerate edge its single initial pave block,
    /// bounded by the edge's vertices.
    pub fn init_pave_blocks(&mut self) -> Result<()> {
        self.pave_blocks.resize_with(self.entries.len(), Vec::new);
        for e in 0..self.entries.len() {
            let entry = &self.entries[e];
            if !entry.is_edge() || entry.degenerate {
                continue;
            }
            let (v1, v2) = self.edge_vertices(e)?;
            let (_, first, last) = self.edge_geometry(e)?;
            let block = PaveBlock::new(Some(e), Pave::new(v1, first), Pave::new(v2, last))?;
            self.pave_blocks[e] = vec![block];
        }
        debug!(entries = self.entries.len(), "initialized pave blocks");
        Ok(())
    }

    pub fn pave_blocks(&self, edge: usize) -> &[PaveBlock] {
        self.pave_blocks.get(edge).map_or(&[], Vec::as_slice)
    }

    pub fn pave_blocks_mut(&mut self, edge: usize) -> Result<&mut Vec<PaveBlock>> {
        self.pave_blocks
            .get_mut(edge)
            .ok_or_else(|| BopError::malformed(Location::Edge(edge), "no pave-block list"))
    }

    // ─── Vertex / face incidence ────────────────────────────────────────

    pub fn faces_of_vertex(&self, vertex: usize) -> Option<&BTreeSet<usize>> {
        self.vertex_faces.get(&vertex)
    }

    pub fn add_vertex_on_face(&mut self, vertex: usize, face: usize) {
        self.vertex_faces.entry(vertex).or_default().insert(face);
    }

    /// Vertices known to lie on both faces, ascending.
    pub fn vertices_on_faces(&self, face1: usize, face2: usize) -> Vec<usize> {
        self.vertex_faces
            .iter()
            .filter(|(_, faces)| faces.contains(&face1) && faces.contains(&face2))
            .map(|(&v, _)| v)
            .collect()
    }

    // ─── Engine-created shapes ──────────────────────────────────────────

    fn push_entry(&mut self, entry: ShapeEntry) -> usize {
        self.entries.push(entry);
        self.edge_faces.push(Vec::new());
        self.pave_blocks.push(Vec::new());
        self.entries.len() - 1
    }

    /// New vertex created by the engine (no argument rank).
    pub fn add_vertex(&mut self, point: Point3d, tolerance: f64) -> usize {
        let mut bbox = BoundingBox::from_points(&[point]);
        bbox.enlarge(tolerance);
        self.push_entry(ShapeEntry {
            kind: ShapeKind::Vertex,
            rank: None,
            bbox,
            tolerance,
            sub_shapes: Vec::new(),
            geometry: GeometryRef::Point(point),
            degenerate: false,
        })
    }

    /// Raises a vertex tolerance so that it covers `point`.
    pub fn widen_vertex_tolerance(&mut self, vertex: usize, point: &Point3d) -> Result<()> {
        let p = self.vertex_point(vertex)?;
        let entry = &mut self.entries[vertex];
        let needed = p.distance_to(point);
        if needed > entry.tolerance {
            entry.tolerance = needed;
            entry.bbox = BoundingBox::from_points(&[p]).enlarged(needed);
        }
        Ok(())
    }

    /// New edge made from a section pave block. Its pave-block list holds
    /// one block bounded by `v1` and `v2`, already promoted to itself.
    pub fn add_section_edge(
        &mut self,
        geometry: Curve,
        first: f64,
        last: f64,
        vertices: (usize, usize),
        tolerance: f64,
    ) -> Result<usize> {
        self.vertex_point(vertices.0)?;
        self.vertex_point(vertices.1)?;
        let bbox = BoundingBox::of_curve_range(&geometry, first, last, EDGE_SAMPLES)
            .enlarged(tolerance);
        let key = self.curves.insert(geometry);
        let index = self.push_entry(ShapeEntry {
            kind: ShapeKind::Edge,
            rank: None,
            bbox,
            tolerance,
            sub_shapes: vec![vertices.0, vertices.1],
            geometry: GeometryRef::Curve { key, first, last },
            degenerate: false,
        });
        let mut block = PaveBlock::new(
            Some(index),
            Pave::new(vertices.0, first),
            Pave::new(vertices.1, last),
        )?;
        block.set_edge(index);
        self.pave_blocks[index] = vec![block];
        Ok(index)
    }

    // ─── Interferences ──────────────────────────────────────────────────

    pub fn add_interference(&mut self, ff: FaceFaceInterference) {
        self.interferences.push(ff);
    }

    pub fn interferences(&self) -> &[FaceFaceInterference] {
        &self.interferences
    }

    pub fn interferences_mut(&mut self) -> &mut Vec<FaceFaceInterference> {
        &mut self.interferences
    }
}
