//! UNV element-field reader.
//!
//! Each dataset block of a field export has a fixed layout relative to the
//! first body line (the line after the type code):
//!
//! ```text
//! body[0]      <label> - Bx, By, Bz          component names after the hyphen
//! body[1..8]   preamble, ignored
//! body[8]      <elementId> ...               record 0 index line
//! body[9]      <v0> <v1> <v2>                record 0 values
//! body[10]     <elementId> ...               record 1 index line
//! ...
//! ```
//!
//! The offsets are a property of the format, not read from the file.

use crate::io::unv::{UnvBlock, parse_float, parse_int, scan_blocks, zero_based};
use crate::io::{UnvReader, read_all};
use crate::mesh_error::MeshConvertError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;

const LOADER: &str = "field loader";

/// Body offset of the first index line.
pub const INDEX_OFFSET: usize = 8;
/// Body offset of the first value line.
pub const VALUE_OFFSET: usize = 9;
/// Distance between consecutive records.
pub const RECORD_STRIDE: usize = 2;

/// One named per-element scalar field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    pub name: String,
    /// 0-based element ids the field is defined on; shared by all components
    /// of the same block.
    pub index: Arc<[u64]>,
    /// One value per entry of `index`.
    pub values: Vec<f64>,
}

impl FieldRecord {
    pub fn new(
        name: impl Into<String>,
        index: Arc<[u64]>,
        values: Vec<f64>,
    ) -> Result<Self, MeshConvertError> {
        let name = name.into();
        if index.len() != values.len() {
            return Err(MeshConvertError::format(
                LOADER,
                format!(
                    "field {name}: {} indices but {} values",
                    index.len(),
                    values.len()
                ),
            ));
        }
        Ok(Self {
            name,
            index,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(element_id, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }
}

/// What to do when a field file holds more than one dataset block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldBlockPolicy {
    /// Keep only the records of the last block.
    #[default]
    KeepLast,
    /// Keep the records of every block, in file order.
    Aggregate,
}

/// Options controlling UNV field reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldReadOptions {
    pub blocks: FieldBlockPolicy,
}

/// UNV field reader.
#[derive(Debug, Default, Clone)]
pub struct UnvFieldReader {
    pub options: FieldReadOptions,
}

impl UnvFieldReader {
    pub fn with_options(options: FieldReadOptions) -> Self {
        Self { options }
    }

    /// Parse field text already split into lines.
    pub fn parse_lines(&self, lines: &[&str]) -> Result<Vec<FieldRecord>, MeshConvertError> {
        let blocks = scan_blocks(lines)?;
        match self.options.blocks {
            FieldBlockPolicy::KeepLast => {
                if blocks.len() > 1 {
                    log::debug!(
                        "[field loader] {} blocks present, keeping the last",
                        blocks.len()
                    );
                }
                // scan_blocks never returns an empty list
                match blocks.last() {
                    Some(block) => Self::parse_block(lines, *block),
                    None => Ok(Vec::new()),
                }
            }
            FieldBlockPolicy::Aggregate => {
                let mut records = Vec::new();
                for block in blocks {
                    records.extend(Self::parse_block(lines, block)?);
                }
                Ok(records)
            }
        }
    }

    /// Component names from the block's name line: the segment after the
    /// first hyphen, split on commas.
    pub fn component_names(line: &str) -> Option<Vec<String>> {
        let segment = line.split('-').nth(1)?;
        let names: Vec<String> = segment.split(',').map(|s| s.trim().to_string()).collect();
        names.iter().all(|n| !n.is_empty()).then_some(names)
    }

    fn parse_block(lines: &[&str], block: UnvBlock) -> Result<Vec<FieldRecord>, MeshConvertError> {
        let body = block.body(lines);
        let start = block.body_start();
        if let Some(code) = block.type_code(lines) {
            log::debug!("[field loader] dataset {code} at line {}", block.open + 1);
        }

        let name_line = body.first().ok_or_else(|| {
            MeshConvertError::format_at(LOADER, block.open, "field block has no name line")
        })?;
        let names = Self::component_names(name_line).ok_or_else(|| {
            MeshConvertError::format_at(
                LOADER,
                start,
                format!("cannot read component names from {:?}", name_line.trim()),
            )
        })?;
        let n_comp = names.len();

        let mut index = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); n_comp];
        let mut pos = INDEX_OFFSET;
        while pos < body.len() {
            let index_idx = start + pos;
            let first = body[pos].split_whitespace().next().ok_or_else(|| {
                MeshConvertError::format_at(LOADER, index_idx, "empty element index line")
            })?;
            let id = parse_int(LOADER, index_idx, first)?;
            index.push(zero_based(LOADER, index_idx, id)?);

            let value_pos = pos + (VALUE_OFFSET - INDEX_OFFSET);
            let value_line = body.get(value_pos).ok_or_else(|| {
                MeshConvertError::format_at(
                    LOADER,
                    index_idx,
                    format!("element {id} has no value line"),
                )
            })?;
            let values: Vec<f64> = value_line
                .split_whitespace()
                .map(|tok| parse_float(LOADER, start + value_pos, tok))
                .collect::<Result<_, _>>()?;
            if values.len() < n_comp {
                return Err(MeshConvertError::format_at(
                    LOADER,
                    start + value_pos,
                    format!("expected {n_comp} values, found {}", values.len()),
                ));
            }
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
            pos += RECORD_STRIDE;
        }

        let index: Arc<[u64]> = index.into();
        names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| {
                log::debug!("[field loader] key :: {name:10} is added...");
                FieldRecord::new(name, Arc::clone(&index), values)
            })
            .collect()
    }
}

impl UnvReader for UnvFieldReader {
    type Output = Vec<FieldRecord>;

    fn read<R: Read>(&self, reader: R) -> Result<Vec<FieldRecord>, MeshConvertError> {
        let contents = read_all(reader)?;
        let lines: Vec<&str> = contents.lines().collect();
        self.parse_lines(&lines)
    }
}
