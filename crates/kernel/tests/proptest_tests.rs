//! Property-based tests for the intersection engine using the `proptest` crate.

use proptest::prelude::*;

use bop_kernel::ds::{DataStructureBuilder, Pave, PaveBlock, ShapeKind};
use bop_kernel::geometry::bbox::BoundingBox;
use bop_kernel::geometry::conic::Conic2d;
use bop_kernel::geometry::point::Point3d;
use bop_kernel::geometry::poly_point::PolyPoint;
use bop_kernel::pairing::{BoxSorter, pairs_of_kinds};
use bop_kernel::sampling::CurveRangeSample;

use nalgebra::{Isometry2, Vector2};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Arbitrary 3D coordinate tuple in a reasonable floating-point range.
fn arb_point() -> impl Strategy<Value = (f64, f64, f64)> {
    (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0)
}

/// Arbitrary box given by a corner and positive extents.
fn arb_box() -> impl Strategy<Value = BoundingBox> {
    (arb_point(), (0.01f64..20.0, 0.01f64..20.0, 0.01f64..20.0)).prop_map(
        |((x, y, z), (dx, dy, dz))| {
            BoundingBox::new(Point3d::new(x, y, z), Point3d::new(x + dx, y + dy, z + dz))
        },
    )
}

/// Arbitrary parameter interval `[first, last]` with `first < last`.
fn arb_interval() -> impl Strategy<Value = (f64, f64)> {
    (-1000.0f64..1000.0, 0.001f64..1000.0).prop_map(|(a, len)| (a, a + len))
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// 1. Dividing a poly point then multiplying it back is the identity
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn poly_point_divide_then_multiply(
        (x, y, z) in arb_point(),
        (u, v) in (-10.0f64..10.0, -10.0f64..10.0),
        r in prop_oneof![-1e3f64..-1e-3, 1e-3f64..1e3],
    ) {
        let p = PolyPoint::new(x, y, z, u, v).with_tag(3);
        let back = p.divide(r) * r;
        for (a, b) in [(p.x, back.x), (p.y, back.y), (p.z, back.z), (p.u, back.u), (p.v, back.v)] {
            prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0), "{a} != {b}");
        }
        prop_assert_eq!(back.tag, 3);
    }
}

proptest! {
    #[test]
    fn poly_point_divide_by_zero_is_zero((x, y, z) in arb_point()) {
        let p = PolyPoint::new(x, y, z, 1.0, 2.0).with_tag(-1);
        let q = p.divide(0.0);
        prop_assert!(p.try_divide(0.0).is_none());
        prop_assert_eq!((q.x, q.y, q.z, q.u, q.v, q.tag), (0.0, 0.0, 0.0, 0.0, 0.0, -1));
    }
}

// ---------------------------------------------------------------------------
// 2. Range samples at one depth tile their domain exactly
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn range_samples_tile_the_domain(
        (first, last) in arb_interval(),
        nb in 2usize..6,
        depth in 1u32..4,
    ) {
        let count = (nb as u64).pow(depth);
        let ranges: Vec<_> = (0..count)
            .map(|i| CurveRangeSample::new(i, depth).range(first, last, nb))
            .collect();
        prop_assert_eq!(ranges[0].first, first);
        prop_assert_eq!(ranges[ranges.len() - 1].last, last);
        for w in ranges.windows(2) {
            prop_assert_eq!(w[0].last, w[1].first);
            prop_assert!(w[0].first < w[0].last);
        }
    }
}

proptest! {
    #[test]
    fn range_sample_lies_in_its_parent(
        (first, last) in arb_interval(),
        nb in 2usize..6,
        depth in 1u32..5,
        seed in any::<u64>(),
    ) {
        let index = seed % (nb as u64).pow(depth);
        let cell = CurveRangeSample::new(index, depth);
        let parent = cell.parent(nb).unwrap();
        let (c, p) = (cell.range(first, last, nb), parent.range(first, last, nb));
        prop_assert!(c.first >= p.first && c.last <= p.last);
    }
}

// ---------------------------------------------------------------------------
// 3. Box sorting reports exactly the intersecting boxes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn box_sorter_matches_brute_force(
        boxes in prop::collection::vec(arb_box(), 0..40),
        query in arb_box(),
    ) {
        let sorter = BoxSorter::new(boxes.iter().copied().enumerate());
        let expected: Vec<usize> = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.intersects(&query))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(sorter.compare(&query), expected);
    }
}

proptest! {
    #[test]
    fn vertex_pairing_matches_brute_force(
        first in prop::collection::vec(arb_point(), 1..15),
        second in prop::collection::vec(arb_point(), 1..15),
        tol in 0.1f64..30.0,
    ) {
        let mut b = DataStructureBuilder::new();
        for &(x, y, z) in &first {
            b.add_vertex(0, Point3d::new(x, y, z), tol).unwrap();
        }
        for &(x, y, z) in &second {
            b.add_vertex(1, Point3d::new(x, y, z), tol).unwrap();
        }
        let ds = b.build();

        let mut expected = Vec::new();
        for i in ds.indices_of(ShapeKind::Vertex, Some(0)) {
            for j in ds.indices_of(ShapeKind::Vertex, Some(1)) {
                if ds.entry(i).unwrap().bbox.intersects(&ds.entry(j).unwrap().bbox) {
                    expected.push((i, j));
                }
            }
        }
        let mut pairs = pairs_of_kinds(&ds, ShapeKind::Vertex, ShapeKind::Vertex);
        pairs.sort_unstable();
        prop_assert_eq!(pairs, expected);
    }
}

proptest! {
    #[test]
    fn box_overlaps_itself_and_its_enlargement(b in arb_box(), gap in 0.0f64..5.0) {
        let sorter = BoxSorter::new([(7usize, b)]);
        prop_assert_eq!(sorter.compare(&b), vec![7]);
        prop_assert_eq!(sorter.compare(&b.enlarged(gap)), vec![7]);
    }
}

// ---------------------------------------------------------------------------
// 4. Re-expressing a conic in a frame and back restores it
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn conic_frame_round_trip(
        (cx, cy) in (-10.0f64..10.0, -10.0f64..10.0),
        radius in 0.1f64..10.0,
        angle in -std::f64::consts::PI..std::f64::consts::PI,
        (tx, ty) in (-10.0f64..10.0, -10.0f64..10.0),
    ) {
        let c = Conic2d::circle(cx, cy, radius);
        let frame = Isometry2::new(Vector2::new(tx, ty), angle);
        let local = c.in_frame(&frame);

        // A point of the circle, mapped into the local frame, satisfies the
        // local equation.
        let world = nalgebra::Point2::new(cx + radius, cy);
        let p = frame.inverse_transform_point(&world);
        prop_assert!(local.value(p.x, p.y).abs() < 1e-6 * radius.max(1.0).powi(2));

        let back = local.in_frame(&frame.inverse());
        for (x, y) in [(0.0, 0.0), (1.0, -2.0), (cx, cy + radius)] {
            prop_assert!((back.value(x, y) - c.value(x, y)).abs() < 1e-6 * (1.0 + c.value(x, y).abs()));
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Splitting a pave block yields contiguous, increasing blocks
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn pave_block_split_is_contiguous(
        (first, last) in arb_interval(),
        fractions in prop::collection::vec(0.0f64..=1.0, 0..12),
    ) {
        let mut pb = PaveBlock::new(Some(0), Pave::new(1, first), Pave::new(2, last)).unwrap();
        for (k, f) in fractions.iter().enumerate() {
            pb.append_ext_pave(Pave::new(10 + k, first + (last - first) * f));
        }
        let blocks = pb.update(true, TOL).unwrap();

        prop_assert!(!blocks.is_empty());
        prop_assert_eq!(blocks[0].range().0, first);
        prop_assert_eq!(blocks[blocks.len() - 1].range().1, last);
        prop_assert_eq!(blocks[0].pave1().vertex, Some(1));
        prop_assert_eq!(blocks[blocks.len() - 1].pave2().vertex, Some(2));
        for w in blocks.windows(2) {
            prop_assert_eq!(w[0].range().1, w[1].range().0);
        }
        for b in &blocks {
            let (t1, t2) = b.range();
            prop_assert!(t1 < t2);
            prop_assert_eq!(b.original_edge(), Some(0));
        }
    }
}

proptest! {
    #[test]
    fn pave_block_split_without_bounds_keeps_inner_range(
        (first, last) in arb_interval(),
        a in 0.01f64..0.45,
        b in 0.55f64..0.99,
    ) {
        let mut pb = PaveBlock::new(None, Pave::unbound(first), Pave::unbound(last)).unwrap();
        let (ta, tb) = (first + (last - first) * a, first + (last - first) * b);
        pb.append_ext_pave(Pave::new(5, tb));
        pb.append_ext_pave(Pave::new(4, ta));
        let blocks = pb.update(false, TOL).unwrap();
        prop_assert_eq!(blocks.len(), 1);
        prop_assert_eq!(blocks[0].range(), (ta, tb));
        prop_assert_eq!(blocks[0].indices(), (Some(4), Some(5)));
    }
}

proptest! {
    #[test]
    fn singleton_pairing_matches_overlap_both_ways(
        (ax, ay, az) in arb_point(),
        (bx, by, bz) in arb_point(),
        tol in 0.1f64..80.0,
    ) {
        let mut b = DataStructureBuilder::new();
        let va = b.add_vertex(0, Point3d::new(ax, ay, az), tol).unwrap();
        let vb = b.add_vertex(1, Point3d::new(bx, by, bz), tol).unwrap();
        let ds = b.build();
        let overlap = ds.entry(va).unwrap().bbox.intersects(&ds.entry(vb).unwrap().bbox);

        let forward = pairs_of_kinds(&ds, ShapeKind::Vertex, ShapeKind::Vertex);
        let sorter = BoxSorter::new([(vb, ds.entry(vb).unwrap().bbox)]);
        let backward = BoxSorter::new([(va, ds.entry(va).unwrap().bbox)])
            .compare(&ds.entry(vb).unwrap().bbox);
        prop_assert_eq!(forward.len() == 1, overlap);
        prop_assert_eq!(sorter.compare(&ds.entry(va).unwrap().bbox).len() == 1, overlap);
        prop_assert_eq!(backward.len() == 1, overlap);
    }
}
