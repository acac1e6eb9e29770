//! Alignment of sparse per-element fields onto the canonical element order.
//!
//! Every [`FieldRecord`] carries its own list of element ids. The reindexer
//! locates each id in the sorted canonical id array and scatters the value
//! into a dense column, so that row `r` of every column refers to the same
//! element. Ids absent from the mesh are skipped: field exports routinely
//! cover subsets or supersets of the rendered elements.

use crate::debug_invariants::DebugInvariants;
use crate::io::groups::GroupAssignment;
use crate::io::unv::field::FieldRecord;
use crate::mesh_error::MeshConvertError;
use itertools::Itertools;
use std::collections::HashSet;

/// Name of the trailing column holding the physical group number.
pub const GROUP_FIELD_NAME: &str = "physNum";

const REINDEXER: &str = "field reindexer";

/// One dense per-element column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldColumn {
    pub name: String,
    /// Value per canonical row; `0.0` where the source had no entry.
    pub values: Vec<f64>,
    /// Whether the source provided a value for the row.
    pub defined: Vec<bool>,
}

impl FieldColumn {
    fn zeros(name: impl Into<String>, rows: usize) -> Self {
        Self {
            name: name.into(),
            values: vec![0.0; rows],
            defined: vec![false; rows],
        }
    }

    /// Number of rows that received a value.
    pub fn defined_count(&self) -> usize {
        self.defined.iter().filter(|&&d| d).count()
    }
}

/// Dense `rows × columns` attribute matrix stored as ordered named columns.
///
/// Group numbers are additionally kept per row as exact integers; the
/// trailing [`GROUP_FIELD_NAME`] column is their `f64` rendering for output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMatrix {
    rows: usize,
    columns: Vec<FieldColumn>,
    /// Group per row; empty when no group assignment was attached.
    groups: Vec<Option<i64>>,
}

impl FieldMatrix {
    /// Empty matrix with `rows` rows and no columns.
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            columns: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns.len())
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[FieldColumn] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Option<&FieldColumn> {
        self.columns.get(col)
    }

    /// First column with the given name.
    pub fn column_by_name(&self, name: &str) -> Option<&FieldColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.columns.get(col)?.values.get(row).copied()
    }

    /// Exact group number per row; empty when no groups were attached.
    pub fn groups(&self) -> &[Option<i64>] {
        &self.groups
    }

    /// The trailing group column, if present.
    pub fn group_column(&self) -> Option<&FieldColumn> {
        self.columns
            .last()
            .filter(|c| c.name == GROUP_FIELD_NAME)
    }

    /// Append a column; its length must match the row count.
    pub fn push_column(&mut self, column: FieldColumn) -> Result<(), MeshConvertError> {
        if column.values.len() != self.rows || column.defined.len() != self.rows {
            return Err(MeshConvertError::format(
                REINDEXER,
                format!(
                    "column {} has {} rows, matrix has {}",
                    column.name,
                    column.values.len(),
                    self.rows
                ),
            ));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Matrix restricted to `rows`, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> FieldMatrix {
        let columns = self
            .columns
            .iter()
            .map(|c| FieldColumn {
                name: c.name.clone(),
                values: rows.iter().map(|&r| c.values[r]).collect(),
                defined: rows.iter().map(|&r| c.defined[r]).collect(),
            })
            .collect();
        let groups = if self.groups.is_empty() {
            Vec::new()
        } else {
            rows.iter().map(|&r| self.groups[r]).collect()
        };
        FieldMatrix {
            rows: rows.len(),
            columns,
            groups,
        }
    }
}

impl DebugInvariants for FieldMatrix {
    fn validate_invariants(&self) -> Result<(), MeshConvertError> {
        if !self.groups.is_empty() {
            let column = self.group_column().ok_or_else(|| {
                MeshConvertError::format(REINDEXER, "group numbers without a group column")
            })?;
            if self.groups.len() != self.rows
                || self
                    .groups
                    .iter()
                    .zip(&column.defined)
                    .any(|(g, &d)| g.is_some() != d)
            {
                return Err(MeshConvertError::format(
                    REINDEXER,
                    "group numbers out of step with the group column",
                ));
            }
        }
        for c in &self.columns {
            if c.values.len() != self.rows || c.defined.len() != self.rows {
                return Err(MeshConvertError::format(
                    REINDEXER,
                    format!("column {} is not {} rows long", c.name, self.rows),
                ));
            }
            if let Some((row, _)) = c
                .values
                .iter()
                .zip(&c.defined)
                .find_position(|&(v, d)| !*d && *v != 0.0)
            {
                return Err(MeshConvertError::format(
                    REINDEXER,
                    format!("column {} has a value in undefined row {row}", c.name),
                ));
            }
        }
        Ok(())
    }
}

/// Scatter `(id, value)` pairs into a column aligned with `canonical_ids`.
///
/// Returns the column and the number of ids not found in `canonical_ids`.
pub fn scatter_column<I>(canonical_ids: &[u64], name: &str, pairs: I) -> (FieldColumn, usize)
where
    I: IntoIterator<Item = (u64, f64)>,
{
    let mut column = FieldColumn::zeros(name, canonical_ids.len());
    let mut unmatched = 0usize;
    for (id, value) in pairs {
        match canonical_ids.binary_search(&id) {
            Ok(row) => {
                column.values[row] = value;
                column.defined[row] = true;
            }
            Err(_) => unmatched += 1,
        }
    }
    (column, unmatched)
}

/// Build the unified attribute matrix.
///
/// Columns follow `records` order; the group assignment is appended as the
/// final [`GROUP_FIELD_NAME`] column. `canonical_ids` must be strictly
/// increasing.
pub fn build_field_matrix(
    canonical_ids: &[u64],
    records: &[FieldRecord],
    groups: &GroupAssignment,
) -> Result<FieldMatrix, MeshConvertError> {
    if let Some((a, b)) = canonical_ids
        .iter()
        .tuple_windows()
        .find(|(a, b)| a >= b)
    {
        return Err(MeshConvertError::format(
            REINDEXER,
            format!("canonical element ids not strictly increasing ({a} then {b})"),
        ));
    }

    let mut matrix = FieldMatrix::new(canonical_ids.len());
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.name.as_str()) {
            log::warn!("[field reindexer] duplicate field name {:?}", record.name);
        }
        let (column, unmatched) = scatter_column(canonical_ids, &record.name, record.iter());
        if unmatched > 0 {
            log::debug!(
                "[field reindexer] {}: {unmatched} of {} ids not in mesh",
                record.name,
                record.len()
            );
        }
        matrix.push_column(column)?;
    }

    let group_pairs = groups.entries().iter().map(|&(id, g)| (id, g as f64));
    let (column, unmatched) = scatter_column(canonical_ids, GROUP_FIELD_NAME, group_pairs);
    if unmatched > 0 {
        log::debug!("[field reindexer] {GROUP_FIELD_NAME}: {unmatched} ids not in mesh");
    }
    matrix.push_column(column)?;
    matrix.groups = vec![None; canonical_ids.len()];
    for &(id, group) in groups.entries() {
        if let Ok(row) = canonical_ids.binary_search(&id) {
            matrix.groups[row] = Some(group);
        }
    }

    matrix.debug_assert_invariants();
    Ok(matrix)
}
