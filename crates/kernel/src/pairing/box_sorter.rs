use std::collections::BTreeMap;

use crate::geometry::bbox::BoundingBox;

/// Band key of boxes with no X extent.
const FLAT_BAND: i32 = i32::MIN;

/// Items whose X extents share one power-of-two magnitude, sorted on the
/// X minimum.
#[derive(Debug, Clone, Default)]
struct Band {
    items: Vec<(usize, BoundingBox)>,
    widest: f64,
}

impl Band {
    /// Items whose X minimum lies in `[query.min.x - widest, query.max.x]`.
    fn window<'a>(&'a self, query: &BoundingBox) -> &'a [(usize, BoundingBox)] {
        let lo = query.min.x - self.widest;
        let start = self.items.partition_point(|(_, b)| b.min.x < lo);
        let end = self.items.partition_point(|(_, b)| b.min.x <= query.max.x);
        &self.items[start..end.max(start)]
    }
}

/// Sweep index over `(index, box)` items.
///
/// Items are banded by the magnitude of their X extent and each band is
/// sorted on the X minimum. Within a band the widest item is at most twice
/// the narrowest, so the scan window of a query only reaches items that
/// come close to it on X, however wide the other bands are.
#[derive(Debug, Clone, Default)]
pub struct BoxSorter {
    bands: Vec<Band>,
    len: usize,
}

impl BoxSorter {
    /// Void boxes are dropped: they can never overlap anything.
    pub fn new(items: impl IntoIterator<Item = (usize, BoundingBox)>) -> Self {
        let mut banded: BTreeMap<i32, Band> = BTreeMap::new();
        let mut len = 0;
        for (i, b) in items {
            if b.is_void() {
                continue;
            }
            let width = b.max.x - b.min.x;
            let band = banded.entry(band_of(width)).or_default();
            band.items.push((i, b));
            band.widest = band.widest.max(width);
            len += 1;
        }
        let mut bands: Vec<Band> = banded.into_values().collect();
        for band in &mut bands {
            band.items
                .sort_by(|a, b| a.1.min.x.total_cmp(&b.1.min.x).then(a.0.cmp(&b.0)));
        }
        Self { bands, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of every item whose box overlaps `query`, ascending.
    pub fn compare(&self, query: &BoundingBox) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .candidates(query)
            .filter(|(_, b)| b.intersects(query))
            .map(|(i, _)| *i)
            .collect();
        found.sort_unstable();
        found
    }

    /// Items scanned for `query` before the three-axis overlap test.
    fn candidates<'a>(
        &'a self,
        query: &'a BoundingBox,
    ) -> impl Iterator<Item = &'a (usize, BoundingBox)> + 'a {
        let bands = if query.is_void() { &self.bands[..0] } else { &self.bands[..] };
        bands.iter().flat_map(move |band| band.window(query))
    }
}

fn band_of(width: f64) -> i32 {
    if width > 0.0 && width.is_finite() {
        width.log2().floor() as i32
    } else {
        FLAT_BAND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point3d;

    fn cube(lo: f64, hi: f64) -> BoundingBox {
        BoundingBox::new(Point3d::new(lo, lo, lo), Point3d::new(hi, hi, hi))
    }

    #[test]
    fn test_compare_finds_overlaps_only() {
        let sorter = BoxSorter::new(vec![
            (0, cube(0.0, 1.0)),
            (1, cube(2.0, 3.0)),
            (2, cube(0.5, 2.5)),
            (3, BoundingBox::void()),
        ]);
        assert_eq!(sorter.len(), 3);
        assert_eq!(sorter.compare(&cube(0.9, 1.1)), vec![0, 2]);
        assert_eq!(sorter.compare(&cube(2.8, 4.0)), vec![1]);
        assert!(sorter.compare(&cube(5.0, 6.0)).is_empty());
        assert!(sorter.compare(&BoundingBox::void()).is_empty());
    }

    #[test]
    fn test_wide_box_found_from_far_right() {
        // Starts far left of the query on X but shares its Y/Z span.
        let wide = BoundingBox::new(Point3d::new(-10.0, 8.0, 8.0), Point3d::new(10.0, 9.0, 9.0));
        let sorter = BoxSorter::new(vec![(7, wide), (1, cube(8.0, 8.5))]);
        assert_eq!(sorter.compare(&cube(8.2, 9.0)), vec![1, 7]);
    }

    #[test]
    fn test_wide_box_does_not_widen_other_scans() {
        let mut items: Vec<(usize, BoundingBox)> = (0..1000)
            .map(|k| {
                let x = 2.0 * k as f64;
                (k, BoundingBox::new(Point3d::new(x, 0.0, 0.0), Point3d::new(x + 1.0, 1.0, 1.0)))
            })
            .collect();
        let wide = BoundingBox::new(
            Point3d::new(-1.0e4, 100.0, 100.0),
            Point3d::new(1.0e4, 101.0, 101.0),
        );
        items.push((1000, wide));
        let sorter = BoxSorter::new(items);

        let query = BoundingBox::new(Point3d::new(1000.2, 0.2, 0.2), Point3d::new(1000.8, 0.8, 0.8));
        assert!(sorter.candidates(&query).count() <= 3);
        assert_eq!(sorter.compare(&query), vec![500]);
    }

    #[test]
    fn test_flat_boxes_share_a_band() {
        let flat = |x: f64| BoundingBox::new(Point3d::new(x, 0.0, 0.0), Point3d::new(x, 1.0, 1.0));
        let sorter = BoxSorter::new(vec![(0, flat(1.0)), (1, flat(5.0)), (2, cube(0.5, 1.5))]);
        assert_eq!(sorter.compare(&cube(0.9, 1.1)), vec![0, 2]);
        assert_eq!(sorter.compare(&flat(5.0)), vec![1]);
    }

    #[test]
    fn test_touching_boxes_overlap() {
        let sorter = BoxSorter::new(vec![(0, cube(0.0, 1.0))]);
        assert_eq!(sorter.compare(&cube(1.0, 2.0)), vec![0]);
    }

    #[test]
    fn test_empty_sorter() {
        let sorter = BoxSorter::new(Vec::new());
        assert!(sorter.is_empty());
        assert!(sorter.compare(&cube(0.0, 1.0)).is_empty());
    }
}
