//! VTK XML unstructured-grid (`.vtu`) writer.
//!
//! Writes ASCII `DataArray` payloads: points as `Float64` triples, cells as
//! `connectivity`/`offsets`/`types`, and one `Float64` cell-data array per
//! attribute column, in column order.

use crate::io::{CellGrid, GridWriter};
use crate::mesh_error::MeshConvertError;
use std::io::Write;

/// Maximum characters per line of array payload.
const LINE_WIDTH: usize = 70;

#[derive(Debug, Clone)]
pub struct VtuWriter {
    indent: &'static str,
}

impl Default for VtuWriter {
    fn default() -> Self {
        Self { indent: "  " }
    }
}

impl VtuWriter {
    fn write_values<W: Write>(
        writer: &mut W,
        indent: &str,
        values: impl Iterator<Item = String>,
    ) -> Result<(), MeshConvertError> {
        let mut line_len = 0usize;
        for value in values {
            if line_len > 0 && line_len + value.len() + 1 > LINE_WIDTH {
                writeln!(writer)?;
                line_len = 0;
            }
            if line_len == 0 {
                write!(writer, "{indent}")?;
                line_len = indent.len();
            } else {
                write!(writer, " ")?;
                line_len += 1;
            }
            write!(writer, "{value}")?;
            line_len += value.len();
        }
        if line_len > 0 {
            writeln!(writer)?;
        }
        Ok(())
    }

    fn write_data_array<W: Write>(
        &self,
        writer: &mut W,
        depth: usize,
        data_type: &str,
        name: &str,
        components: usize,
        values: impl Iterator<Item = String>,
    ) -> Result<(), MeshConvertError> {
        let indent = self.indent.repeat(depth);
        write!(writer, "{indent}<DataArray type=\"{data_type}\"")?;
        if !name.is_empty() {
            write!(writer, " Name=\"{}\"", escape_attr(name))?;
        }
        if components > 1 {
            write!(writer, " NumberOfComponents=\"{components}\"")?;
        }
        writeln!(writer, " format=\"ascii\">")?;
        Self::write_values(writer, &self.indent.repeat(depth + 1), values)?;
        writeln!(writer, "{indent}</DataArray>")?;
        Ok(())
    }

    /// Validate `grid` and return the VTK type code of every cell.
    fn check_grid(grid: &CellGrid) -> Result<Vec<u8>, MeshConvertError> {
        if grid.cells.len() != grid.cell_types.len() {
            return Err(MeshConvertError::Unsupported(format!(
                "{} cells but {} cell types",
                grid.cells.len(),
                grid.cell_types.len()
            )));
        }
        if grid.cell_data.num_rows() != grid.cells.len() && grid.cell_data.shape().1 > 0 {
            return Err(MeshConvertError::Unsupported(format!(
                "cell data has {} rows for {} cells",
                grid.cell_data.num_rows(),
                grid.cells.len()
            )));
        }
        let n_nodes = grid.nodes.len();
        for (idx, cell) in grid.cells.iter().enumerate() {
            if let Some(node) = cell.iter().find(|&&n| n >= n_nodes) {
                return Err(MeshConvertError::Unsupported(format!(
                    "cell {idx} references node {node} of {n_nodes}"
                )));
            }
        }
        grid.cell_types
            .iter()
            .enumerate()
            .map(|(idx, ct)| {
                ct.vtk_code().ok_or_else(|| {
                    MeshConvertError::Unsupported(format!(
                        "cell {idx} has no VTK cell type ({ct:?})"
                    ))
                })
            })
            .collect()
    }
}

fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl GridWriter for VtuWriter {
    fn write<W: Write>(&self, mut writer: W, grid: &CellGrid) -> Result<(), MeshConvertError> {
        let codes = Self::check_grid(grid)?;
        let i = |depth: usize| self.indent.repeat(depth);

        writeln!(writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            writer,
            "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        writeln!(writer, "{}<UnstructuredGrid>", i(1))?;
        writeln!(
            writer,
            "{}<Piece NumberOfPoints=\"{}\" NumberOfCells=\"{}\">",
            i(2),
            grid.num_nodes(),
            grid.num_cells()
        )?;

        writeln!(writer, "{}<Points>", i(3))?;
        self.write_data_array(
            &mut writer,
            4,
            "Float64",
            "Points",
            3,
            grid.nodes.iter().flatten().map(|v| v.to_string()),
        )?;
        writeln!(writer, "{}</Points>", i(3))?;

        writeln!(writer, "{}<Cells>", i(3))?;
        self.write_data_array(
            &mut writer,
            4,
            "Int64",
            "connectivity",
            1,
            grid.cells.iter().flatten().map(|n| n.to_string()),
        )?;
        let offsets = grid.cells.iter().scan(0usize, |acc, cell| {
            *acc += cell.len();
            Some(acc.to_string())
        });
        self.write_data_array(&mut writer, 4, "Int64", "offsets", 1, offsets)?;
        self.write_data_array(
            &mut writer,
            4,
            "UInt8",
            "types",
            1,
            codes.iter().map(|c| c.to_string()),
        )?;
        writeln!(writer, "{}</Cells>", i(3))?;

        if grid.cell_data.shape().1 > 0 {
            writeln!(writer, "{}<CellData>", i(3))?;
            for column in grid.cell_data.columns() {
                self.write_data_array(
                    &mut writer,
                    4,
                    "Float64",
                    &column.name,
                    1,
                    column.values.iter().map(|v| v.to_string()),
                )?;
            }
            writeln!(writer, "{}</CellData>", i(3))?;
        }

        writeln!(writer, "{}</Piece>", i(2))?;
        writeln!(writer, "{}</UnstructuredGrid>", i(1))?;
        writeln!(writer, "</VTKFile>")?;
        Ok(())
    }
}
