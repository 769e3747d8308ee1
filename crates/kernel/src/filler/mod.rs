//! The intersection phase and its hand-off to the Boolean builders.

pub mod abort;
pub mod builder;
pub mod pave_filler;
pub mod result;

pub use abort::AbortFlag;
pub use builder::{BooleanOperation, Builder, SectionBuilder, SectionEdge};
pub use pave_filler::PaveFiller;
pub use result::IntersectionResult;
