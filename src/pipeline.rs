//! End-to-end UNV → grid conversion.
//!
//! [`assemble`] loads the mesh, the group table and every field file, puts
//! the mesh into canonical element order and builds the unified attribute
//! matrix. [`convert`] additionally hands the full grid and each per-group
//! grid to a [`GridWriter`]. Nothing is written until assembly succeeded, and
//! no output file appears unless every write succeeded.

use crate::algs::reindex::build_field_matrix;
use crate::algs::split::{GroupGrid, split_by_group};
use crate::debug_invariants::DebugInvariants;
use crate::io::groups::{GroupAssignment, GroupTableReader};
use crate::io::unv::field::{FieldBlockPolicy, FieldReadOptions, FieldRecord, UnvFieldReader};
use crate::io::unv::mesh::{MeshReadOptions, UnvMesh, UnvMeshReader};
use crate::io::{CellGrid, GridWriter, UnvReader};
use crate::mesh_error::MeshConvertError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Output path used when none is configured.
pub const DEFAULT_OUTPUT: &str = "dat/out.vtu";

fn default_true() -> bool {
    true
}

/// Conversion inputs and behaviour switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertOptions {
    /// UNV file with the 2411/2412 datasets.
    #[serde(default)]
    pub mesh_file: Option<PathBuf>,
    /// Physical-group table.
    #[serde(default)]
    pub group_file: Option<PathBuf>,
    /// UNV field exports; columns follow this order.
    #[serde(default)]
    pub field_files: Vec<PathBuf>,
    /// Full-grid output; group files are derived from it.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub field_blocks: FieldBlockPolicy,
    #[serde(default)]
    pub skip_unknown_mesh_blocks: bool,
    /// Also write one file per physical group.
    #[serde(default = "default_true")]
    pub split_groups: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            mesh_file: None,
            group_file: None,
            field_files: Vec::new(),
            output_file: None,
            field_blocks: FieldBlockPolicy::default(),
            skip_unknown_mesh_blocks: false,
            split_groups: true,
        }
    }
}

impl ConvertOptions {
    /// The configured output path or [`DEFAULT_OUTPUT`].
    pub fn output_path(&self) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    fn require(&self) -> Result<(&Path, &Path, &[PathBuf]), MeshConvertError> {
        let mesh = self
            .mesh_file
            .as_deref()
            .ok_or(MeshConvertError::MissingInput("mesh_file"))?;
        if self.field_files.is_empty() {
            return Err(MeshConvertError::MissingInput("field_files"));
        }
        let groups = self
            .group_file
            .as_deref()
            .ok_or(MeshConvertError::MissingInput("group_file"))?;
        Ok((mesh, groups, &self.field_files))
    }
}

/// Assembled conversion result.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Full grid in canonical element order.
    pub grid: CellGrid,
    /// Canonical 0-based element ids, one per grid cell.
    pub element_ids: Vec<u64>,
    /// Per-group sub-grids, ascending by group (empty unless splitting).
    pub groups: Vec<GroupGrid>,
}

/// Files produced by [`convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub full: PathBuf,
    /// `(group, path)` per written group file, ascending by group.
    pub groups: Vec<(i64, PathBuf)>,
}

/// Per-group output path: `out.vtu` → `out_<group>.vtu`.
pub fn group_output_path(base: &Path, group: i64) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{group}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{group}"),
    };
    base.with_file_name(name)
}

fn load_fields(
    reader: &UnvFieldReader,
    files: &[PathBuf],
) -> Result<Vec<FieldRecord>, MeshConvertError> {
    #[cfg(feature = "rayon")]
    let per_file: Vec<Vec<FieldRecord>> = files
        .par_iter()
        .map(|path| reader.read_path(path))
        .collect::<Result<_, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let per_file: Vec<Vec<FieldRecord>> = files
        .iter()
        .map(|path| reader.read_path(path))
        .collect::<Result<_, _>>()?;
    Ok(per_file.into_iter().flatten().collect())
}

/// Assemble the full grid from in-memory parts.
///
/// `mesh` need not be canonical; it is sorted here.
pub fn assemble_parts(
    mut mesh: UnvMesh,
    groups: &GroupAssignment,
    records: &[FieldRecord],
    split_groups: bool,
) -> Result<Conversion, MeshConvertError> {
    mesh.canonicalize()?;
    mesh.validate_invariants()?;

    let cell_data = build_field_matrix(&mesh.element_ids, records, groups)?;
    log::info!("[pipeline] shape of elements. == ({},)", mesh.elements.len());
    log::info!("[pipeline] shape of nodes.    == ({}, 3)", mesh.nodes.len());
    log::info!("[pipeline] shape of field     == {:?}", cell_data.shape());
    log::info!(
        "[pipeline] keys  of field     == {:?}",
        cell_data.names().collect::<Vec<_>>()
    );

    let grid = CellGrid {
        nodes: Arc::new(mesh.nodes),
        cells: mesh.elements,
        cell_types: mesh.cell_types,
        cell_data,
    };
    let groups = if split_groups {
        split_by_group(&grid)
    } else {
        Vec::new()
    };
    Ok(Conversion {
        grid,
        element_ids: mesh.element_ids,
        groups,
    })
}

/// Load every input named by `options` and assemble the grids.
pub fn assemble(options: &ConvertOptions) -> Result<Conversion, MeshConvertError> {
    let (mesh_path, group_path, field_paths) = options.require()?;

    let mesh_reader = UnvMeshReader::with_options(MeshReadOptions {
        skip_unknown_blocks: options.skip_unknown_mesh_blocks,
    });
    let mesh = mesh_reader.read_path(mesh_path)?;
    let groups = GroupTableReader.read_path(group_path)?;

    let field_reader = UnvFieldReader::with_options(FieldReadOptions {
        blocks: options.field_blocks,
    });
    let records = load_fields(&field_reader, field_paths)?;

    assemble_parts(mesh, &groups, &records, options.split_groups)
}

/// Sibling path an output is written to before it is moved into place.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn discard_staged(targets: &[(&CellGrid, PathBuf)]) {
    for (_, path) in targets {
        let _ = fs::remove_file(staging_path(path));
    }
}

/// Convert and write the full grid plus one grid per physical group.
///
/// Every file is first written to a `.partial` sibling; the final names only
/// appear once all writes succeeded. A failed write removes the staged files.
pub fn convert<G>(options: &ConvertOptions, writer: &G) -> Result<ConversionSummary, MeshConvertError>
where
    G: GridWriter + Sync,
{
    let conversion = assemble(options)?;
    let full = options.output_path();

    let groups: Vec<(i64, PathBuf)> = conversion
        .groups
        .iter()
        .map(|part| (part.group, group_output_path(&full, part.group)))
        .collect();
    let targets: Vec<(&CellGrid, PathBuf)> = std::iter::once((&conversion.grid, full.clone()))
        .chain(
            conversion
                .groups
                .iter()
                .zip(&groups)
                .map(|(part, (_, path))| (&part.grid, path.clone())),
        )
        .collect();

    let stage = |(grid, path): &(&CellGrid, PathBuf)| writer.write_path(grid, &staging_path(path));
    #[cfg(feature = "rayon")]
    let staged = targets.par_iter().map(stage).collect::<Result<Vec<_>, _>>();
    #[cfg(not(feature = "rayon"))]
    let staged = targets.iter().map(stage).collect::<Result<Vec<_>, _>>();
    if let Err(err) = staged {
        discard_staged(&targets);
        return Err(err);
    }

    for (grid, path) in &targets {
        if let Err(err) = fs::rename(staging_path(path), path) {
            discard_staged(&targets);
            return Err(MeshConvertError::from(err).in_file(path));
        }
        log::info!(
            "[pipeline] wrote {} ({} cells)",
            path.display(),
            grid.num_cells()
        );
    }

    Ok(ConversionSummary { full, groups })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_path_replaces_suffix() {
        assert_eq!(
            group_output_path(Path::new("dat/out.vtu"), 3),
            PathBuf::from("dat/out_3.vtu")
        );
        assert_eq!(
            group_output_path(Path::new("out"), -2),
            PathBuf::from("out_-2")
        );
        assert_eq!(
            group_output_path(Path::new("a.b/res.vtu"), 10),
            PathBuf::from("a.b/res_10.vtu")
        );
    }

    #[test]
    fn missing_inputs_reported_in_order() {
        let mut opts = ConvertOptions::default();
        assert_eq!(
            assemble(&opts).unwrap_err(),
            MeshConvertError::MissingInput("mesh_file")
        );
        opts.mesh_file = Some("m.unv".into());
        assert_eq!(
            assemble(&opts).unwrap_err(),
            MeshConvertError::MissingInput("field_files")
        );
        opts.field_files.push("f.unv".into());
        assert_eq!(
            assemble(&opts).unwrap_err(),
            MeshConvertError::MissingInput("group_file")
        );
    }

    #[test]
    fn staging_path_is_a_sibling() {
        assert_eq!(
            staging_path(Path::new("dat/out_3.vtu")),
            PathBuf::from("dat/out_3.vtu.partial")
        );
    }

    #[test]
    fn default_output_matches_legacy_path() {
        assert_eq!(
            ConvertOptions::default().output_path(),
            PathBuf::from(DEFAULT_OUTPUT)
        );
    }
}
