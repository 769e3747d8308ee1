//! Broad phase: which sub-shapes have overlapping boxes.

pub mod box_sorter;
pub mod iterator;

pub use box_sorter::BoxSorter;
pub use iterator::{SubIterator, pairs_of_kinds};
