use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::{BopError, Location, Result};
use crate::geometry::bbox::BoundingBox;
use crate::geometry::curves::Curve;
use crate::geometry::point::Point3d;
use crate::geometry::surfaces::Surface;

use super::entry::{GeometryRef, ShapeEntry, ShapeKind};
use super::store::DataStructure;

/// Grid used for the box of a face's parameter rectangle.
const FACE_BOX_GRID: usize = 8;
/// Segments used for the box of a curved edge.
const EDGE_BOX_SAMPLES: usize = 16;

/// Collects the indexed sub-shapes of the two arguments and freezes them
/// into a `DataStructure`.
///
/// Indices are handed out in insertion order and stay valid in the built
/// structure. Edges must reference vertices and faces must reference
/// edges that were added before them.
#[derive(Debug, Default)]
pub struct DataStructureBuilder {
    ds: DataStructure,
}

impl DataStructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_rank(index: usize, rank: usize) -> Result<()> {
        if rank > 1 {
            return Err(BopError::malformed(
                Location::Shape(index),
                format!("argument rank must be 0 or 1, got {rank}"),
            ));
        }
        Ok(())
    }

    fn check_kind(&self, index: usize, kind: ShapeKind) -> Result<()> {
        match self.ds.entries.get(index) {
            Some(e) if e.kind == kind => Ok(()),
            Some(e) => Err(BopError::malformed(
                Location::Shape(index),
                format!("expected {kind:?}, found {:?}", e.kind),
            )),
            None => Err(BopError::malformed(Location::Shape(index), "unknown sub-shape")),
        }
    }

    fn push(&mut self, entry: ShapeEntry) -> usize {
        self.ds.entries.push(entry);
        self.ds.entries.len() - 1
    }

    pub fn add_vertex(&mut self, rank: usize, point: Point3d, tolerance: f64) -> Result<usize> {
        Self::check_rank(self.ds.entries.len(), rank)?;
        Ok(self.push(ShapeEntry {
            kind: ShapeKind::Vertex,
            rank: Some(rank),
            bbox: BoundingBox::void(),
            tolerance,
            sub_shapes: Vec::new(),
            geometry: GeometryRef::Point(point),
            degenerate: false,
        }))
    }

    /// Adds an edge on `curve` over `[first, last]` from `v1` to `v2`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_edge(
        &mut self,
        rank: usize,
        curve: Curve,
        first: f64,
        last: f64,
        v1: usize,
        v2: usize,
        tolerance: f64,
    ) -> Result<usize> {
        Self::check_rank(self.ds.entries.len(), rank)?;
        self.check_kind(v1, ShapeKind::Vertex)?;
        self.check_kind(v2, ShapeKind::Vertex)?;
        let key = self.ds.curves.insert(curve);
        Ok(self.push(ShapeEntry {
            kind: ShapeKind::Edge,
            rank: Some(rank),
            bbox: BoundingBox::void(),
            tolerance,
            sub_shapes: vec![v1, v2],
            geometry: GeometryRef::Curve { key, first, last },
            degenerate: false,
        }))
    }

    /// Adds a face on `surface` bounded by `edges` (outer and inner wires
    /// together; orientation is not needed).
    pub fn add_face(
        &mut self,
        rank: usize,
        surface: Surface,
        edges: &[usize],
        tolerance: f64,
    ) -> Result<usize> {
        Self::check_rank(self.ds.entries.len(), rank)?;
        for &e in edges {
            self.check_kind(e, ShapeKind::Edge)?;
        }
        let key = self.ds.surfaces.insert(surface);
        Ok(self.push(ShapeEntry {
            kind: ShapeKind::Face,
            rank: Some(rank),
            bbox: BoundingBox::void(),
            tolerance,
            sub_shapes: edges.to_vec(),
            geometry: GeometryRef::Surface {
                key,
                u: (0.0, 0.0),
                v: (0.0, 0.0),
            },
            degenerate: false,
        }))
    }

    /// Computes boxes, parameter rectangles and adjacency. Degenerate
    /// entries are kept with a void box and a warning.
    pub fn build(self) -> DataStructure {
        let mut ds = self.ds;
        let n = ds.entries.len();
        ds.nb_source = n;
        ds.edge_faces = vec![Vec::new(); n];
        ds.pave_blocks = vec![Vec::new(); n];

        for i in 0..n {
            match ds.entries[i].kind {
                ShapeKind::Vertex => build_vertex(&mut ds, i),
                ShapeKind::Edge => build_edge(&mut ds, i),
                ShapeKind::Face => {}
            }
        }
        // Faces last: their boxes include their edges' boxes.
        for i in 0..n {
            if ds.entries[i].is_face() {
                build_face(&mut ds, i);
            }
        }

        let mut vertex_faces: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for f in 0..n {
            if !ds.entries[f].is_face() {
                continue;
            }
            for &e in &ds.entries[f].sub_shapes {
                ds.edge_faces[e].push(f);
                for &v in &ds.entries[e].sub_shapes {
                    vertex_faces.entry(v).or_default().push(f);
                }
            }
        }
        for (v, faces) in vertex_faces {
            for f in faces {
                ds.add_vertex_on_face(v, f);
            }
        }

        let degenerate = ds.entries.iter().filter(|e| e.degenerate).count();
        info!(entries = n, degenerate, "data structure built");
        ds
    }
}

fn finite(p: &Point3d) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

fn build_vertex(ds: &mut DataStructure, i: usize) {
    let entry = &mut ds.entries[i];
    let GeometryRef::Point(p) = entry.geometry else {
        return;
    };
    if !finite(&p) || !entry.tolerance.is_finite() {
        warn!(vertex = i, "non-finite vertex, marked degenerate");
        entry.mark_degenerate();
        return;
    }
    entry.bbox = BoundingBox::from_points(&[p]).enlarged(entry.tolerance);
}

fn build_edge(ds: &mut DataStructure, i: usize) {
    let entry = &ds.entries[i];
    let GeometryRef::Curve { key, first, last } = entry.geometry else {
        return;
    };
    let tol = entry.tolerance;
    let vertices_ok = entry.sub_shapes.iter().all(|&v| !ds.entries[v].degenerate);
    let bbox = match ds.curves.get(key) {
        Some(curve) if vertices_ok && first < last && !curve.is_degenerate(tol) => {
            let bb = BoundingBox::of_curve_range(curve, first, last, EDGE_BOX_SAMPLES);
            (finite(&bb.min) && finite(&bb.max)).then(|| bb.enlarged(tol))
        }
        _ => None,
    };
    let entry = &mut ds.entries[i];
    match bbox {
        Some(bb) => entry.bbox = bb,
        None => {
            warn!(edge = i, first, last, "degenerate edge, excluded from pairing");
            entry.mark_degenerate();
        }
    }
}

fn build_face(ds: &mut DataStructure, i: usize) {
    let GeometryRef::Surface { key, .. } = ds.entries[i].geometry else {
        return;
    };
    let tol = ds.entries[i].tolerance;
    let Some(surface) = ds.surfaces.get(key) else {
        ds.entries[i].mark_degenerate();
        return;
    };

    let mut edge_box = BoundingBox::void();
    let mut us: Vec<f64> = Vec::new();
    let mut vs: Vec<f64> = Vec::new();
    for &e in &ds.entries[i].sub_shapes {
        if ds.entries[e].degenerate {
            continue;
        }
        edge_box.add_box(&ds.entries[e].bbox);
        if let Ok(points) = ds.edge_polyline(e) {
            for p in &points {
                let (u, v) = surface.parameters_of(p);
                us.push(u);
                vs.push(v);
            }
        }
    }

    let (natural_u, natural_v) = surface.natural_bounds();
    let span = |vals: &[f64]| {
        let lo = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lo < hi).then_some((lo, hi))
    };
    let u = natural_u.or_else(|| span(&us));
    let v = natural_v.or_else(|| span(&vs));

    let degenerate_surface = match surface {
        Surface::Cylinder(c) => c.radius < tol,
        Surface::Sphere(s) => s.radius < tol,
        Surface::Cone(c) => c.half_angle.abs() < 1e-12 || c.half_angle.abs() >= 0.5 * std::f64::consts::PI,
        _ => false,
    };

    match (u, v) {
        (Some(u), Some(v)) if !degenerate_surface => {
            let mut bb = BoundingBox::of_surface_patch(surface, u, v, FACE_BOX_GRID);
            bb.add_box(&edge_box);
            let entry = &mut ds.entries[i];
            entry.bbox = bb.enlarged(tol);
            entry.geometry = GeometryRef::Surface { key, u, v };
        }
        _ => {
            warn!(face = i, "face without a bounded parameter domain, marked degenerate");
            ds.entries[i].mark_degenerate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::curves::Line3d;
    use crate::geometry::surfaces::Plane;
    use crate::geometry::vector::Vec3;

    fn square(b: &mut DataStructureBuilder, rank: usize) -> usize {
        let pts = [
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ];
        let vs: Vec<usize> = pts
            .iter()
            .map(|p| b.add_vertex(rank, *p, 1e-7).unwrap())
            .collect();
        let mut edges = Vec::new();
        for k in 0..4 {
            let (a, c) = (pts[k], pts[(k + 1) % 4]);
            let line = Curve::Line(Line3d::from_points(a, c));
            edges.push(
                b.add_edge(rank, line, 0.0, a.distance_to(&c), vs[k], vs[(k + 1) % 4], 1e-7)
                    .unwrap(),
            );
        }
        b.add_face(rank, Surface::Plane(Plane::xy()), &edges, 1e-7)
            .unwrap()
    }

    #[test]
    fn test_build_computes_boxes_and_adjacency() {
        let mut b = DataStructureBuilder::new();
        let f = square(&mut b, 0);
        let ds = b.build();
        assert_eq!(ds.len(), 9);
        let face = ds.entry(f).unwrap();
        assert!(!face.degenerate);
        assert!(face.bbox.contains_point(&Point3d::new(0.5, 0.5, 0.0)));
        assert!(!face.bbox.contains_point(&Point3d::new(1.5, 0.5, 0.0)));
        assert_eq!(ds.faces_of_edge(4), &[f]);
        assert_eq!(ds.vertices_on_faces(f, f), vec![0, 1, 2, 3]);
        let (_, u, v) = ds.face_surface(f).unwrap();
        assert_eq!((u, v), ((0.0, 1.0), (0.0, 1.0)));
    }

    #[test]
    fn test_degenerate_edge_gets_void_box() {
        let mut b = DataStructureBuilder::new();
        let v = b.add_vertex(0, Point3d::ORIGIN, 1e-7).unwrap();
        let line = Curve::Line(Line3d::new(Point3d::ORIGIN, Vec3::ZERO));
        let e = b.add_edge(0, line, 0.0, 1.0, v, v, 1e-7).unwrap();
        let ds = b.build();
        let entry = ds.entry(e).unwrap();
        assert!(entry.degenerate);
        assert!(entry.bbox.is_void());
        assert!(ds.indices_of(ShapeKind::Edge, None).is_empty());
    }

    #[test]
    fn test_bad_indices_are_malformed_input() {
        let mut b = DataStructureBuilder::new();
        let v = b.add_vertex(0, Point3d::ORIGIN, 1e-7).unwrap();
        let line = Curve::Line(Line3d::new(Point3d::ORIGIN, Vec3::X));
        assert!(matches!(
            b.add_edge(0, line.clone(), 0.0, 1.0, v, 17, 1e-7),
            Err(BopError::MalformedInput { .. })
        ));
        assert!(b.add_face(0, Surface::Plane(Plane::xy()), &[v], 1e-7).is_err());
        assert!(b.add_vertex(2, Point3d::ORIGIN, 1e-7).is_err());
    }
}
