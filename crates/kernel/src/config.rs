//! Configuration for the intersection engine.

use serde::{Deserialize, Serialize};

use crate::geometry::point::Point3d;

/// Tolerances for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (meters).
    pub coincidence: f64,
    /// Sines of angles smaller than this are considered zero.
    pub angular: f64,
    /// Parameter-space tolerance for curve/surface evaluations.
    pub parametric: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
            angular: 1e-10,
            parametric: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3d, b: &Point3d) -> bool {
        a.distance_to(b) < self.coincidence
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }

    pub fn is_zero_angle(&self, sine: f64) -> bool {
        sine.abs() < self.angular
    }
}

/// Switches for the `diagnostics` dumps, all off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugOptions {
    /// Log every candidate pair produced by the box pairing.
    pub dump_pairs: bool,
    /// Log the pave blocks of every edge and section curve after splitting.
    pub dump_pave_blocks: bool,
    /// Log the sample points of numeric section curves.
    pub dump_points: bool,
}

/// Parameters of one filler run. Passed explicitly; there is no global
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BopConfig {
    pub tolerance: Tolerance,
    /// Branching factor of curve range samples.
    pub curve_samples: usize,
    /// Branching factors of surface range samples.
    pub surface_samples_u: usize,
    pub surface_samples_v: usize,
    /// Deepest range-sample level explored by localization.
    pub max_depth: u32,
    /// Upper bound on the leaf cells one localization may return.
    pub max_leaves: usize,
    /// Parameter cells narrower than this are not refined further.
    pub min_cell_width: f64,
    /// Numeric section curves deviating more than this are unreliable.
    pub max_curve_deviation: f64,
    /// Ceiling for the tangential tolerance of near-tangent sections.
    pub max_tangential_tolerance: f64,
    /// Run independent tasks on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    pub debug: DebugOptions,
}

impl Default for BopConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            curve_samples: 8,
            surface_samples_u: 4,
            surface_samples_v: 4,
            max_depth: 5,
            max_leaves: 2048,
            min_cell_width: 1e-6,
            max_curve_deviation: 1e-4,
            max_tangential_tolerance: 1e-3,
            parallel: true,
            debug: DebugOptions::default(),
        }
    }
}

impl BopConfig {
    /// Deeper sampling and a tighter deviation limit.
    pub fn precise() -> Self {
        Self {
            curve_samples: 10,
            max_depth: 7,
            max_leaves: 8192,
            max_curve_deviation: 1e-6,
            ..Self::default()
        }
    }

    /// Shallow sampling for quick, coarse runs.
    pub fn coarse() -> Self {
        Self {
            curve_samples: 4,
            surface_samples_u: 3,
            surface_samples_v: 3,
            max_depth: 3,
            max_leaves: 256,
            max_curve_deviation: 1e-3,
            ..Self::default()
        }
    }

    /// Single-threaded run with every debug dump enabled.
    pub fn debug() -> Self {
        Self {
            parallel: false,
            debug: DebugOptions {
                dump_pairs: true,
                dump_pave_blocks: true,
                dump_points: true,
            },
            ..Self::default()
        }
    }

    /// Widens the coincidence tolerance to at least `gap`, the way a fuzzy
    /// Boolean treats nearly touching arguments.
    pub fn with_fuzzy(mut self, gap: f64) -> Self {
        self.tolerance.coincidence = self.tolerance.coincidence.max(gap.abs());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// True when tasks should actually run on the rayon pool.
    pub fn runs_parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.parallel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_from_default() {
        let d = BopConfig::default();
        assert!(BopConfig::precise().max_depth > d.max_depth);
        assert!(BopConfig::coarse().max_leaves < d.max_leaves);
        assert!(!BopConfig::debug().parallel);
        assert!(BopConfig::debug().debug.dump_pave_blocks);
    }

    #[test]
    fn test_fuzzy_only_widens() {
        let c = BopConfig::default().with_fuzzy(1e-3);
        assert_eq!(c.tolerance.coincidence, 1e-3);
        let c = BopConfig::default().with_fuzzy(1e-12);
        assert_eq!(c.tolerance.coincidence, 1e-7);
    }

    #[test]
    fn test_tolerance_checks() {
        let t = Tolerance::default();
        assert!(t.points_coincident(&Point3d::ORIGIN, &Point3d::new(1e-8, 0.0, 0.0)));
        assert!(!t.is_zero_length(1e-3));
        assert!(t.is_zero_angle(1e-12));
    }
}
