//! Mesh I/O for the UNV conversion pipeline.
//!
//! Readers parse whole files into memory and hand back plain data; writers
//! consume a [`CellGrid`] and serialize it. Both sides are trait-based so the
//! pipeline can be driven from in-memory buffers in tests and from paths in
//! the command-line driver.

pub mod groups;
pub mod unv;
pub mod vtu;

use crate::algs::reindex::FieldMatrix;
use crate::mesh_error::MeshConvertError;
use crate::topology::cell_type::CellType;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

/// Unstructured grid handed to a [`GridWriter`]: connectivity, coordinates
/// and named per-cell arrays aligned with `cells`.
#[derive(Debug, Clone)]
pub struct CellGrid {
    /// Node coordinates; shared between the full grid and its group subsets.
    pub nodes: Arc<Vec<[f64; 3]>>,
    /// Zero-based connectivity per cell.
    pub cells: Vec<Vec<usize>>,
    /// Cell type per cell.
    pub cell_types: Vec<CellType>,
    /// Per-cell attribute columns, one row per cell.
    pub cell_data: FieldMatrix,
}

impl CellGrid {
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Restrict the grid to `rows`, keeping the full node array.
    pub fn select_cells(&self, rows: &[usize]) -> CellGrid {
        CellGrid {
            nodes: Arc::clone(&self.nodes),
            cells: rows.iter().map(|&r| self.cells[r].clone()).collect(),
            cell_types: rows.iter().map(|&r| self.cell_types[r]).collect(),
            cell_data: self.cell_data.select_rows(rows),
        }
    }
}

/// Trait for text readers that parse one input file.
pub trait UnvReader {
    /// Parsed result.
    type Output;

    /// Parse from an in-memory or streaming source.
    fn read<R: Read>(&self, reader: R) -> Result<Self::Output, MeshConvertError>;

    /// Parse the file at `path`, tagging any error with the path.
    fn read_path(&self, path: &Path) -> Result<Self::Output, MeshConvertError> {
        let file = File::open(path).map_err(|e| MeshConvertError::from(e).in_file(path))?;
        self.read(file).map_err(|e| e.in_file(path))
    }
}

/// Trait for grid writers (the external serializer of the pipeline).
pub trait GridWriter {
    /// Serialize `grid` to `writer`.
    fn write<W: Write>(&self, writer: W, grid: &CellGrid) -> Result<(), MeshConvertError>;

    /// Serialize `grid` to a file at `path`, creating parent directories.
    fn write_path(&self, grid: &CellGrid, path: &Path) -> Result<(), MeshConvertError> {
        let create = || -> Result<File, MeshConvertError> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        };
        let file = create().map_err(|e| e.in_file(path))?;
        let mut out = BufWriter::new(file);
        self.write(&mut out, grid).map_err(|e| e.in_file(path))?;
        out.flush().map_err(|e| MeshConvertError::from(e).in_file(path))
    }
}

/// Read a whole source into a string.
pub(crate) fn read_all<R: Read>(mut reader: R) -> Result<String, MeshConvertError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}
