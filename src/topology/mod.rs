//! Element topology metadata.

pub mod cell_type;

pub use cell_type::CellType;
