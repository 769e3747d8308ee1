//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use bop_kernel::DataStructureBuilder;
use bop_kernel::geometry::curves::{Curve, Line3d};
use bop_kernel::geometry::point::Point3d;
use bop_kernel::geometry::surfaces::{Plane, Surface};
use bop_kernel::geometry::vector::Vec3;

pub const TOL: f64 = 1e-7;

/// Indices of one box loaded into a builder.
#[derive(Debug, Clone)]
pub struct BoxShape {
    pub vertices: Vec<usize>,
    pub edges: Vec<usize>,
    /// Faces in the order -x, +x, -y, +y, -z, +z.
    pub faces: Vec<usize>,
}

/// Adds the axis-aligned box `[lo, hi]` as argument `rank`.
pub fn add_box(b: &mut DataStructureBuilder, rank: usize, lo: Point3d, hi: Point3d) -> BoxShape {
    let corner = |i: usize| {
        Point3d::new(
            if i & 1 == 0 { lo.x } else { hi.x },
            if i & 2 == 0 { lo.y } else { hi.y },
            if i & 4 == 0 { lo.z } else { hi.z },
        )
    };
    let vertices: Vec<usize> = (0..8)
        .map(|i| b.add_vertex(rank, corner(i), TOL).unwrap())
        .collect();

    // Corner pairs differing in exactly one bit.
    let mut pairs = Vec::new();
    for i in 0..8usize {
        for bit in [1usize, 2, 4] {
            if i & bit == 0 {
                pairs.push((i, i | bit));
            }
        }
    }
    let mut edges = Vec::new();
    for &(i, j) in &pairs {
        let (a, c) = (corner(i), corner(j));
        let e = b
            .add_edge(
                rank,
                Curve::Line(Line3d::from_points(a, c)),
                0.0,
                a.distance_to(&c),
                vertices[i],
                vertices[j],
                TOL,
            )
            .unwrap();
        edges.push(e);
    }

    let axes = [Vec3::X, Vec3::Y, Vec3::Z];
    let mut faces = Vec::new();
    for (axis, bit) in [1usize, 2, 4].into_iter().enumerate() {
        for side in [0usize, bit] {
            let face_edges: Vec<usize> = pairs
                .iter()
                .zip(&edges)
                .filter(|((i, j), _)| i & bit == side && j & bit == side)
                .map(|(_, &e)| e)
                .collect();
            let du = axes[(axis + 1) % 3];
            let dv = axes[(axis + 2) % 3];
            let plane = Plane::from_axes(corner(side), du, dv);
            faces.push(b.add_face(rank, Surface::Plane(plane), &face_edges, TOL).unwrap());
        }
    }

    BoxShape {
        vertices,
        edges,
        faces,
    }
}

/// `[0, 2]^3` as argument 0 and `[1, 3]^3` as argument 1.
pub fn overlapping_boxes() -> (DataStructureBuilder, BoxShape, BoxShape) {
    let mut b = DataStructureBuilder::new();
    let a = add_box(&mut b, 0, Point3d::new(0.0, 0.0, 0.0), Point3d::new(2.0, 2.0, 2.0));
    let c = add_box(&mut b, 1, Point3d::new(1.0, 1.0, 1.0), Point3d::new(3.0, 3.0, 3.0));
    (b, a, c)
}
