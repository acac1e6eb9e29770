//! Alignment and partitioning algorithms over loaded UNV data.

pub mod reindex;
pub mod split;

pub use reindex::build_field_matrix;
pub use split::split_by_group;
