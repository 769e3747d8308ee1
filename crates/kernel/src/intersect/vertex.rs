//! Vertex/edge and vertex/face incidence across the two arguments.

use tracing::debug;

use crate::config::BopConfig;
use crate::ds::{DataStructure, VertexEdgeHit};
use crate::error::{Location, Result};

use super::classify::FaceClassifier;
use super::numeric::foot_parameter;

/// Where `vertex` lies on `edge`, if it is within both tolerances of the
/// edge's curve and inside its range. A vertex bounding the edge is never
/// reported.
pub fn intersect_vertex_edge(
    ds: &DataStructure,
    vertex: usize,
    edge: usize,
    cfg: &BopConfig,
) -> Result<Option<VertexEdgeHit>> {
    let (v1, v2) = ds.edge_vertices(edge)?;
    if vertex == v1 || vertex == v2 {
        return Ok(None);
    }
    let p = ds.vertex_point(vertex)?;
    let (curve, first, last) = ds.edge_geometry(edge)?;
    let tol = (ds.entry(vertex)?.tolerance + ds.entry(edge)?.tolerance)
        .max(cfg.tolerance.coincidence);
    let ptol = cfg.tolerance.parametric;

    let t = foot_parameter(curve, &p, first, last);
    if t < first - ptol || t > last + ptol {
        return Ok(None);
    }
    let t = t.clamp(first, last);
    let distance = curve.evaluate(t).distance_to(&p);
    if distance > tol {
        return Ok(None);
    }
    debug!(vertex, edge, parameter = t, distance, "vertex on edge");
    Ok(Some(VertexEdgeHit {
        vertex,
        edge,
        parameter: t,
        distance,
    }))
}

/// Whether `vertex` lies in `face`, boundary included.
pub fn vertex_in_face(
    ds: &DataStructure,
    vertex: usize,
    face: usize,
    cfg: &BopConfig,
) -> Result<bool> {
    let p = ds.vertex_point(vertex)?;
    let tol = (ds.entry(vertex)?.tolerance + ds.entry(face)?.tolerance)
        .max(cfg.tolerance.coincidence);
    let classifier = FaceClassifier::new(ds, face, tol).map_err(|e| e.at(Location::Shape(face)))?;
    Ok(classifier.contains(&p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::DataStructureBuilder;
    use crate::geometry::curves::{Curve, Line3d};
    use crate::geometry::point::Point3d;
    use crate::geometry::surfaces::{Plane, Surface};

    /// Square [0, 2]² in z = 0 in argument 0, returning its first edge
    /// (along +x from the origin), the face and three argument 1 vertices.
    fn setup() -> (DataStructure, usize, usize, [usize; 3]) {
        let mut b = DataStructureBuilder::new();
        let pts = [
            Point3d::ORIGIN,
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(2.0, 2.0, 0.0),
            Point3d::new(0.0, 2.0, 0.0),
        ];
        let vs: Vec<usize> = pts.iter().map(|p| b.add_vertex(0, *p, 1e-7).unwrap()).collect();
        let edges: Vec<usize> = (0..4)
            .map(|k| {
                let (a, c) = (pts[k], pts[(k + 1) % 4]);
                let line = Curve::Line(Line3d::from_points(a, c));
                b.add_edge(0, line, 0.0, 2.0, vs[k], vs[(k + 1) % 4], 1e-7)
                    .unwrap()
            })
            .collect();
        let f = b.add_face(0, Surface::Plane(Plane::xy()), &edges, 1e-7).unwrap();

        let on = b.add_vertex(1, Point3d::new(0.5, 1e-8, 0.0), 1e-7).unwrap();
        let off = b.add_vertex(1, Point3d::new(0.5, 0.1, 0.3), 1e-7).unwrap();
        let past = b.add_vertex(1, Point3d::new(3.0, 0.0, 0.0), 1e-7).unwrap();
        (b.build(), edges[0], f, [on, off, past])
    }

    #[test]
    fn test_vertex_on_edge_gets_its_parameter() {
        let (ds, e, _, [on, off, past]) = setup();
        let cfg = BopConfig::default();
        let hit = intersect_vertex_edge(&ds, on, e, &cfg).unwrap().unwrap();
        assert!((hit.parameter - 0.5).abs() < 1e-12);
        assert!(hit.distance < 2e-8);
        assert!(intersect_vertex_edge(&ds, off, e, &cfg).unwrap().is_none());
        assert!(intersect_vertex_edge(&ds, past, e, &cfg).unwrap().is_none());
    }

    #[test]
    fn test_edge_end_is_not_reported() {
        let (ds, e, _, _) = setup();
        let (v1, _) = ds.edge_vertices(e).unwrap();
        assert!(intersect_vertex_edge(&ds, v1, e, &BopConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_vertex_in_face() {
        let (ds, _, f, [on, off, past]) = setup();
        let cfg = BopConfig::default();
        assert!(vertex_in_face(&ds, on, f, &cfg).unwrap());
        assert!(!vertex_in_face(&ds, off, f, &cfg).unwrap());
        assert!(!vertex_in_face(&ds, past, f, &cfg).unwrap());
    }
}
