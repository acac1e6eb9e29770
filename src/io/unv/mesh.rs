//! UNV mesh reader: node (2411) and element (2412) datasets.
//!
//! # Supported layout
//! - Node records: an integer header line (`id csys dcsys color`) followed by
//!   a line with three coordinates.
//! - Element records: an integer header line
//!   (`id descriptor phys mat color nnodes`) followed by the 1-based node ids.
//!   Rod and beam records may carry an orientation line in between; it is
//!   recognized by content, not assumed.
//! - Elements whose shape cannot be determined are kept as
//!   [`CellType::Unclassified`]; only the writer rejects them.
//!
//! # Limitations
//! - Only the first node block and the first element block are read.
//! - Connectivity continuation lines (elements with more than eight nodes)
//!   are not supported.
//! - Node ids are assumed to match their row position (`id == row + 1`).

use crate::debug_invariants::DebugInvariants;
use crate::io::unv::{
    ELEMENT_BLOCK, NODE_BLOCK, UnvBlock, parse_float, parse_int, scan_blocks, zero_based,
};
use crate::io::{UnvReader, read_all};
use crate::mesh_error::MeshConvertError;
use crate::topology::cell_type::CellType;
use itertools::Itertools;
use std::io::Read;

const LOADER: &str = "mesh loader";

/// Nodes and elements read from a UNV mesh file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnvMesh {
    /// Node coordinates in file row order.
    pub nodes: Vec<[f64; 3]>,
    /// Zero-based connectivity, one entry per element.
    pub elements: Vec<Vec<usize>>,
    /// Declared element ids minus one, parallel to `elements`.
    pub element_ids: Vec<u64>,
    /// Cell type per element.
    pub cell_types: Vec<CellType>,
}

impl UnvMesh {
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Whether `element_ids` is strictly increasing.
    pub fn is_canonical(&self) -> bool {
        self.element_ids.iter().tuple_windows().all(|(a, b)| a < b)
    }

    /// Sort elements by id, establishing the canonical element ordering.
    ///
    /// Duplicate ids are rejected.
    pub fn canonicalize(&mut self) -> Result<(), MeshConvertError> {
        let order: Vec<usize> = (0..self.element_ids.len())
            .sorted_by_key(|&i| self.element_ids[i])
            .collect();

        if let Some((a, _)) = order
            .iter()
            .map(|&i| self.element_ids[i])
            .tuple_windows()
            .find(|(a, b)| a == b)
        {
            return Err(MeshConvertError::format(
                LOADER,
                format!("duplicate element id {}", a + 1),
            ));
        }

        self.element_ids = order.iter().map(|&i| self.element_ids[i]).collect();
        self.cell_types = order.iter().map(|&i| self.cell_types[i]).collect();
        let mut old = std::mem::take(&mut self.elements);
        self.elements = order.iter().map(|&i| std::mem::take(&mut old[i])).collect();
        Ok(())
    }
}

impl DebugInvariants for UnvMesh {
    fn validate_invariants(&self) -> Result<(), MeshConvertError> {
        if self.elements.len() != self.element_ids.len()
            || self.elements.len() != self.cell_types.len()
        {
            return Err(MeshConvertError::format(
                LOADER,
                format!(
                    "element arrays out of step: {} elements, {} ids, {} types",
                    self.elements.len(),
                    self.element_ids.len(),
                    self.cell_types.len()
                ),
            ));
        }
        let n_nodes = self.nodes.len();
        for (conn, id) in self.elements.iter().zip(&self.element_ids) {
            if let Some(bad) = conn.iter().find(|&&n| n >= n_nodes) {
                return Err(MeshConvertError::format(
                    LOADER,
                    format!(
                        "element {} references node {} but only {n_nodes} nodes exist",
                        id + 1,
                        bad + 1
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Options controlling UNV mesh reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshReadOptions {
    /// Skip datasets other than 2411/2412 instead of rejecting them.
    pub skip_unknown_blocks: bool,
}

/// UNV mesh reader.
#[derive(Debug, Default, Clone)]
pub struct UnvMeshReader {
    pub options: MeshReadOptions,
}

impl UnvMeshReader {
    pub fn with_options(options: MeshReadOptions) -> Self {
        Self { options }
    }

    /// Parse mesh text already split into lines.
    pub fn parse_lines(&self, lines: &[&str]) -> Result<UnvMesh, MeshConvertError> {
        let blocks = scan_blocks(lines)?;
        let (node_block, elem_block) = self.classify(lines, &blocks)?;

        let nodes = Self::parse_nodes(lines, node_block)?;
        let mut mesh = Self::parse_elements(lines, elem_block, nodes.len())?;
        mesh.nodes = nodes;
        log::info!(
            "[mesh loader] nNode == {}, nMesh == {}",
            mesh.nodes.len(),
            mesh.elements.len()
        );
        Ok(mesh)
    }

    fn classify(
        &self,
        lines: &[&str],
        blocks: &[UnvBlock],
    ) -> Result<(UnvBlock, UnvBlock), MeshConvertError> {
        let mut node_block = None;
        let mut elem_block = None;
        let candidates: &[UnvBlock] = if self.options.skip_unknown_blocks {
            blocks
        } else {
            &blocks[..blocks.len().min(2)]
        };

        for block in candidates {
            let code = block.type_code(lines).unwrap_or("");
            match code {
                NODE_BLOCK if node_block.is_none() => node_block = Some(*block),
                ELEMENT_BLOCK if elem_block.is_none() => elem_block = Some(*block),
                NODE_BLOCK | ELEMENT_BLOCK => {
                    log::debug!("ignoring repeated dataset {code} at line {}", block.open + 1);
                }
                _ if self.options.skip_unknown_blocks => {
                    log::debug!("skipping dataset {code:?} at line {}", block.open + 1);
                }
                _ => {
                    return Err(MeshConvertError::format_at(
                        LOADER,
                        block.open + 1,
                        format!("unrecognized dataset type code {code:?} (expected 2411 or 2412)"),
                    ));
                }
            }
            if node_block.is_some() && elem_block.is_some() {
                break;
            }
        }

        match (node_block, elem_block) {
            (Some(n), Some(e)) => Ok((n, e)),
            (None, _) => Err(MeshConvertError::format(LOADER, "no 2411 node block found")),
            (_, None) => Err(MeshConvertError::format(
                LOADER,
                "no 2412 element block found",
            )),
        }
    }

    fn parse_nodes(lines: &[&str], block: UnvBlock) -> Result<Vec<[f64; 3]>, MeshConvertError> {
        let body = block.body(lines);
        let start = block.body_start();
        let mut nodes = Vec::with_capacity(body.len() / 2);
        for (rec, pair) in body.chunks(2).enumerate() {
            let header_idx = start + 2 * rec;
            if pair.len() < 2 {
                return Err(MeshConvertError::format_at(
                    LOADER,
                    header_idx,
                    "node record has no coordinate line",
                ));
            }
            let header: Vec<i64> = pair[0]
                .split_whitespace()
                .map(|tok| parse_int(LOADER, header_idx, tok))
                .collect::<Result<_, _>>()?;
            if header.is_empty() {
                return Err(MeshConvertError::format_at(
                    LOADER,
                    header_idx,
                    "empty node header",
                ));
            }
            let coords: Vec<f64> = pair[1]
                .split_whitespace()
                .map(|tok| parse_float(LOADER, header_idx + 1, tok))
                .collect::<Result<_, _>>()?;
            let xyz: [f64; 3] = coords.try_into().map_err(|c: Vec<f64>| {
                MeshConvertError::format_at(
                    LOADER,
                    header_idx + 1,
                    format!("expected 3 coordinates, found {}", c.len()),
                )
            })?;
            nodes.push(xyz);
        }
        Ok(nodes)
    }

    fn parse_elements(
        lines: &[&str],
        block: UnvBlock,
        n_nodes: usize,
    ) -> Result<UnvMesh, MeshConvertError> {
        let body = block.body(lines);
        let start = block.body_start();
        let mut mesh = UnvMesh::default();

        let mut cursor = 0usize;
        while cursor < body.len() {
            let header_idx = start + cursor;
            let header: Vec<i64> = body[cursor]
                .split_whitespace()
                .map(|tok| parse_int(LOADER, header_idx, tok))
                .collect::<Result<_, _>>()?;
            let declared = *header.first().ok_or_else(|| {
                MeshConvertError::format_at(LOADER, header_idx, "empty element header")
            })?;
            let descriptor = header.get(1).and_then(|&d| u32::try_from(d).ok());
            let declared_nodes = header.get(5).and_then(|&k| usize::try_from(k).ok());

            let conn_off = match (descriptor, body.get(cursor + 1)) {
                (Some(d), Some(next))
                    if CellType::is_unv_beam_descriptor(d)
                        && is_orientation_line(next, declared_nodes, n_nodes) =>
                {
                    2
                }
                _ => 1,
            };
            let conn_line = body.get(cursor + conn_off).ok_or_else(|| {
                MeshConvertError::format_at(
                    LOADER,
                    header_idx,
                    format!("element {declared} has no connectivity line"),
                )
            })?;
            let conn_idx = header_idx + conn_off;
            let mut conn = conn_line
                .split_whitespace()
                .map(|tok| {
                    let node = parse_int(LOADER, conn_idx, tok)?;
                    if node < 1 || node as usize > n_nodes {
                        return Err(MeshConvertError::format_at(
                            LOADER,
                            conn_idx,
                            format!("node id {node} out of range 1..={n_nodes}"),
                        ));
                    }
                    Ok(node as usize - 1)
                })
                .collect::<Result<Vec<usize>, _>>()?;

            let cell_type = CellType::from_unv(descriptor, conn.len());
            if let CellType::Unclassified(n) = cell_type {
                log::debug!(
                    "[mesh loader] element {declared}: descriptor {descriptor:?} with {n} nodes left unclassified"
                );
            }
            cell_type.unv_to_vtk_order(&mut conn);

            mesh.element_ids.push(zero_based(LOADER, header_idx, declared)?);
            mesh.elements.push(conn);
            mesh.cell_types.push(cell_type);
            cursor += conn_off + 1;
        }
        Ok(mesh)
    }
}

/// Whether the line after a rod or beam header is the orientation line
/// (`orientation-node end-a end-b`) rather than the connectivity.
///
/// Not every writer emits it. A connectivity line holds exactly the declared
/// node count of valid 1-based node ids.
fn is_orientation_line(next: &str, declared_nodes: Option<usize>, n_nodes: usize) -> bool {
    let tokens: Vec<&str> = next.split_whitespace().collect();
    if declared_nodes.is_some_and(|k| tokens.len() != k) {
        return true;
    }
    !tokens.iter().all(|tok| {
        tok.parse::<i64>()
            .is_ok_and(|id| id >= 1 && id as usize <= n_nodes)
    })
}

impl UnvReader for UnvMeshReader {
    type Output = UnvMesh;

    fn read<R: Read>(&self, reader: R) -> Result<UnvMesh, MeshConvertError> {
        let contents = read_all(reader)?;
        let lines: Vec<&str> = contents.lines().collect();
        self.parse_lines(&lines)
    }
}
