use serde::{Deserialize, Serialize};

/// A closed parameter interval `[first, last]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub first: f64,
    pub last: f64,
}

impl ParamRange {
    pub fn new(first: f64, last: f64) -> Self {
        Self { first, last }
    }

    pub fn length(&self) -> f64 {
        self.last - self.first
    }

    pub fn mid(&self) -> f64 {
        0.5 * (self.first + self.last)
    }

    pub fn contains(&self, t: f64, tol: f64) -> bool {
        t >= self.first - tol && t <= self.last + tol
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.first, self.last)
    }
}

/// Cells at a depth may only be refined while `nb^(depth + 1)` stays
/// below this count.
pub const SAMPLE_LIMIT: f64 = 1000.0;

/// A node of the recursive subdivision of a 1D parameter domain: cell
/// `index` of the `nb^depth` equal cells at level `depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CurveRangeSample {
    pub index: u64,
    pub depth: u32,
}

impl CurveRangeSample {
    pub fn new(index: u64, depth: u32) -> Self {
        Self { index, depth }
    }

    /// The whole domain.
    pub fn root() -> Self {
        Self::default()
    }

    /// Sub-interval of `[first, last]` covered by this cell.
    ///
    /// The interval is found by descending the base-`nb` digits of the
    /// index from the root, each level splitting its parent into `nb`
    /// parts whose last part ends exactly at the parent's end. Neighbouring
    /// cells therefore share their boundary bit-for-bit, cell 0 starts at
    /// `first`, the last cell ends at `last`, and every cell lies inside
    /// its parent. `index` must be below `nb^depth`.
    pub fn range(&self, first: f64, last: f64, nb: usize) -> ParamRange {
        let nb = nb.max(1) as u64;
        let mut digits = Vec::with_capacity(self.depth as usize);
        let mut rest = self.index;
        for _ in 0..self.depth {
            digits.push(rest % nb);
            rest /= nb;
        }
        debug_assert_eq!(rest, 0, "range index {} out of depth {}", self.index, self.depth);

        let (mut lo, mut hi) = (first, last);
        for &k in digits.iter().rev() {
            let width = (hi - lo) / nb as f64;
            let new_hi = if k + 1 == nb {
                hi
            } else {
                lo + (k + 1) as f64 * width
            };
            lo += k as f64 * width;
            hi = new_hi;
        }
        ParamRange::new(lo, hi)
    }

    /// Index of the first child.
    pub fn deeper_index(&self, nb: usize) -> u64 {
        self.index * nb as u64
    }

    pub fn children(&self, nb: usize) -> impl Iterator<Item = CurveRangeSample> + use<> {
        let first = self.deeper_index(nb);
        let depth = self.depth + 1;
        (first..first + nb as u64).map(move |index| CurveRangeSample { index, depth })
    }

    pub fn parent(&self, nb: usize) -> Option<Self> {
        if self.depth == 0 {
            return None;
        }
        Some(Self {
            index: self.index / nb.max(1) as u64,
            depth: self.depth - 1,
        })
    }

    /// Whether this cell may be split once more: the sample count stays
    /// under `SAMPLE_LIMIT`, the depth under `max_depth`, and the children
    /// would not be narrower than `min_width`.
    pub fn can_refine(&self, nb: usize, cell_width: f64, min_width: f64, max_depth: u32) -> bool {
        nb > 1
            && self.depth < max_depth
            && (nb as f64).powi(self.depth as i32 + 1) <= SAMPLE_LIMIT
            && cell_width / nb as f64 >= min_width
    }
}

/// A cell of a surface's parameter rectangle, one 1D sample per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceRangeSample {
    pub u: CurveRangeSample,
    pub v: CurveRangeSample,
}

impl SurfaceRangeSample {
    pub fn new(index_u: u64, depth_u: u32, index_v: u64, depth_v: u32) -> Self {
        Self {
            u: CurveRangeSample::new(index_u, depth_u),
            v: CurveRangeSample::new(index_v, depth_v),
        }
    }

    pub fn from_samples(u: CurveRangeSample, v: CurveRangeSample) -> Self {
        Self { u, v }
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn range_u(&self, u_min: f64, u_max: f64, nb_u: usize) -> ParamRange {
        self.u.range(u_min, u_max, nb_u)
    }

    pub fn range_v(&self, v_min: f64, v_max: f64, nb_v: usize) -> ParamRange {
        self.v.range(v_min, v_max, nb_v)
    }

    /// The `nb_u * nb_v` children one level deeper on both axes.
    pub fn children(&self, nb_u: usize, nb_v: usize) -> Vec<SurfaceRangeSample> {
        let mut out = Vec::with_capacity(nb_u * nb_v);
        for u in self.u.children(nb_u) {
            for v in self.v.children(nb_v) {
                out.push(Self { u, v });
            }
        }
        out
    }

    /// True when this cell spans a larger parameter length in U than in V.
    pub fn is_u_bigger(
        &self,
        u_domain: (f64, f64),
        v_domain: (f64, f64),
        nb_u: usize,
        nb_v: usize,
    ) -> bool {
        let du = self.range_u(u_domain.0, u_domain.1, nb_u).length();
        let dv = self.range_v(v_domain.0, v_domain.1, nb_v).length();
        du > dv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero_is_whole_domain() {
        let r = CurveRangeSample::root().range(-1.5, 4.0, 7);
        assert_eq!(r.first, -1.5);
        assert_eq!(r.last, 4.0);
    }

    #[test]
    fn test_cells_are_contiguous() {
        let nb = 3;
        for depth in 1..5u32 {
            let cells = 3u64.pow(depth);
            let mut prev_hi = 0.1;
            for index in 0..cells {
                let r = CurveRangeSample::new(index, depth).range(0.1, 0.7, nb);
                assert_eq!(r.first, prev_hi);
                assert!(r.last > r.first);
                prev_hi = r.last;
            }
            assert_eq!(prev_hi, 0.7);
        }
    }

    #[test]
    fn test_children_lie_in_parent() {
        let parent = CurveRangeSample::new(5, 2);
        let pr = parent.range(0.0, 1.0, 4);
        let kids: Vec<_> = parent.children(4).collect();
        assert_eq!(kids.len(), 4);
        assert_eq!(kids[0].range(0.0, 1.0, 4).first, pr.first);
        assert_eq!(kids[3].range(0.0, 1.0, 4).last, pr.last);
        for k in &kids {
            let r = k.range(0.0, 1.0, 4);
            assert!(r.first >= pr.first && r.last <= pr.last);
            assert_eq!(k.parent(4), Some(parent));
        }
        assert_eq!(CurveRangeSample::root().parent(4), None);
    }

    #[test]
    fn test_equality_is_per_axis() {
        let a = SurfaceRangeSample::new(1, 2, 3, 4);
        let b = SurfaceRangeSample::from_samples(
            CurveRangeSample::new(1, 2),
            CurveRangeSample::new(3, 4),
        );
        assert_eq!(a, b);
        assert_ne!(a, SurfaceRangeSample::new(1, 2, 3, 3));
    }

    #[test]
    fn test_refinement_limits() {
        let c = CurveRangeSample::new(0, 2);
        assert!(c.can_refine(10, 0.1, 1e-6, 5));
        // 10^4 exceeds the sample limit.
        assert!(!CurveRangeSample::new(0, 3).can_refine(10, 0.1, 1e-6, 5));
        assert!(!c.can_refine(10, 1e-6, 1e-6, 5));
        assert!(!c.can_refine(10, 0.1, 1e-6, 2));
    }

    #[test]
    fn test_is_u_bigger() {
        let s = SurfaceRangeSample::root();
        assert!(s.is_u_bigger((0.0, 4.0), (0.0, 1.0), 2, 2));
        let deeper_u = SurfaceRangeSample::new(0, 3, 0, 0);
        assert!(!deeper_u.is_u_bigger((0.0, 4.0), (0.0, 1.0), 2, 2));
    }
}
