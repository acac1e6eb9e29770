#![cfg_attr(docsrs, feature(doc_cfg))]
//! # unv-sieve
//!
//! unv-sieve converts I-DEAS universal (`.unv`) meshes and their element
//! field exports into VTK unstructured grids, optionally split per physical
//! group.
//!
//! ## Pipeline
//! - [`io::unv`] finds the `-1`/`-1` delimited datasets and decodes node
//!   (2411), element (2412) and field blocks.
//! - [`io::groups`] reads the element → physical group table.
//! - [`algs::reindex`] aligns every field onto the canonical element order
//!   (ascending element id) as one dense attribute matrix.
//! - [`algs::split`] partitions the assembled grid by group.
//! - [`io::vtu`] serializes grids as `.vtu`.
//!
//! [`pipeline::convert`] runs all of the above from a [`pipeline::ConvertOptions`].
//!
//! ## Features
//! - `rayon`: load field files and write group files in parallel. Column and
//!   file order are unaffected.
//! - `strict-invariants`: run invariant checks in release builds too.
//!
//! ## Usage
//! ```no_run
//! use unv_sieve::io::vtu::VtuWriter;
//! use unv_sieve::pipeline::{ConvertOptions, convert};
//!
//! let options = ConvertOptions {
//!     mesh_file: Some("dat/post_geom.unv".into()),
//!     group_file: Some("dat/elem".into()),
//!     field_files: vec!["dat/magnetic.unv".into()],
//!     output_file: Some("dat/out.vtu".into()),
//!     ..Default::default()
//! };
//! let summary = convert(&options, &VtuWriter::default())?;
//! println!("wrote {} group files", summary.groups.len());
//! # Ok::<(), unv_sieve::mesh_error::MeshConvertError>(())
//! ```

pub mod algs;
pub mod debug_invariants;
pub mod io;
pub mod mesh_error;
pub mod pipeline;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::reindex::{FieldMatrix, GROUP_FIELD_NAME, build_field_matrix};
    pub use crate::algs::split::{GroupGrid, split_by_group};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::io::groups::{GroupAssignment, GroupTableReader};
    pub use crate::io::unv::field::{FieldBlockPolicy, FieldRecord, UnvFieldReader};
    pub use crate::io::unv::mesh::{UnvMesh, UnvMeshReader};
    pub use crate::io::vtu::VtuWriter;
    pub use crate::io::{CellGrid, GridWriter, UnvReader};
    pub use crate::mesh_error::MeshConvertError;
    pub use crate::pipeline::{ConvertOptions, assemble, convert};
    pub use crate::topology::cell_type::CellType;
}
