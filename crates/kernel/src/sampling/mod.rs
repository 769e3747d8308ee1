pub mod localize;
pub mod range;

pub use localize::{CurveDomain, SurfaceDomain, localize_curve_surface, localize_surface_surface};
pub use range::{CurveRangeSample, ParamRange, SurfaceRangeSample};
