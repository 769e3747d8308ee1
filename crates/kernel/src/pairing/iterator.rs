use tracing::debug;

use crate::ds::{DataStructure, ShapeKind};
use crate::geometry::bbox::BoundingBox;

use super::box_sorter::BoxSorter;

/// Enumerates the pairs of entries whose boxes overlap.
///
/// With only subset 1 set, pairs are taken within it; with both, one
/// member comes from each. Every unordered pair is reported once as
/// `(i1, i2)` with `i1 < i2`, in ascending order.
#[derive(Debug, Clone, Default)]
pub struct SubIterator {
    subset1: Vec<usize>,
    subset2: Option<Vec<usize>>,
    pairs: Vec<(usize, usize)>,
    cursor: usize,
}

impl SubIterator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_subset1(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.subset1 = indices.into_iter().collect();
    }

    pub fn set_subset2(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.subset2 = Some(indices.into_iter().collect());
    }

    /// Computes the pairs from the entry boxes of `ds` and rewinds.
    /// Indices with no entry are skipped.
    pub fn initialize(&mut self, ds: &DataStructure) {
        let boxed = |set: &[usize]| -> Vec<(usize, BoundingBox)> {
            set.iter()
                .filter_map(|&i| ds.entries().get(i).map(|e| (i, e.bbox)))
                .collect()
        };
        let queries = boxed(&self.subset1);
        let sorter = match &self.subset2 {
            Some(set2) => BoxSorter::new(boxed(set2)),
            None => BoxSorter::new(queries.iter().copied()),
        };

        let mut pairs = Vec::new();
        for (i, bbox) in &queries {
            for j in sorter.compare(bbox) {
                if j == *i {
                    continue;
                }
                pairs.push(if *i < j { (*i, j) } else { (j, *i) });
            }
        }
        pairs.sort_unstable();
        pairs.dedup();

        debug!(
            subset1 = self.subset1.len(),
            subset2 = self.subset2.as_ref().map_or(0, Vec::len),
            pairs = pairs.len(),
            "box pairing done"
        );
        self.pairs = pairs;
        self.cursor = 0;
    }

    pub fn more(&self) -> bool {
        self.cursor < self.pairs.len()
    }

    /// Advances the cursor.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if self.more() {
            self.cursor += 1;
        }
    }

    /// The current pair, `None` once the cursor has passed the last one.
    pub fn value(&self) -> Option<(usize, usize)> {
        self.pairs.get(self.cursor).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> std::iter::Copied<std::slice::Iter<'_, (usize, usize)>> {
        self.pairs.iter().copied()
    }
}

impl<'a> IntoIterator for &'a SubIterator {
    type Item = (usize, usize);
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, (usize, usize)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs()
    }
}

/// Overlapping pairs between shapes of `kind1` in argument 0 and shapes of
/// `kind2` in argument 1, returned in that orientation.
pub fn pairs_of_kinds(
    ds: &DataStructure,
    kind1: ShapeKind,
    kind2: ShapeKind,
) -> Vec<(usize, usize)> {
    let mut it = SubIterator::new();
    it.set_subset1(ds.indices_of(kind1, Some(0)));
    it.set_subset2(ds.indices_of(kind2, Some(1)));
    it.initialize(ds);

    let first_arg = |i: usize| ds.entries().get(i).and_then(|e| e.rank) == Some(0);
    it.pairs()
        .map(|(a, b)| if first_arg(a) { (a, b) } else { (b, a) })
        .collect()
}
