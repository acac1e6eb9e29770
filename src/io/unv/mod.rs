//! I-DEAS universal (`.unv`) text format.
//!
//! A UNV file is a sequence of datasets, each bracketed by two lines holding
//! the single token `-1`. The line after the opening marker carries the
//! dataset type code (`2411` nodes, `2412` elements, `2414` analysis data).
//! Everything else about a dataset is positional, so block discovery is the
//! one primitive both the mesh and field readers rest on.

pub mod field;
pub mod mesh;

use crate::mesh_error::MeshConvertError;

/// Line content that opens and closes a dataset.
pub const SENTINEL: &str = "-1";

/// Dataset type code of a node block.
pub const NODE_BLOCK: &str = "2411";
/// Dataset type code of an element block.
pub const ELEMENT_BLOCK: &str = "2412";

const SCANNER: &str = "block scanner";

/// One sentinel-delimited dataset: 0-based line indices of its two markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnvBlock {
    pub open: usize,
    pub close: usize,
}

impl UnvBlock {
    /// The dataset type code on the line after the opening marker, trimmed.
    ///
    /// `None` when the block is too short to carry one.
    pub fn type_code<'a>(&self, lines: &[&'a str]) -> Option<&'a str> {
        let idx = self.open + 1;
        (idx < self.close).then(|| lines[idx].trim())
    }

    /// Data lines of the block: from `open + 2` up to, excluding, `close`.
    pub fn body<'a, 'b>(&self, lines: &'b [&'a str]) -> &'b [&'a str] {
        let start = (self.open + 2).min(self.close);
        &lines[start..self.close]
    }

    /// 0-based file line index of the first body line.
    pub fn body_start(&self) -> usize {
        self.open + 2
    }
}

/// Find every sentinel-delimited block in `lines`, pairing markers in order.
///
/// Fails when no marker is present or when the last marker has no partner.
pub fn scan_blocks(lines: &[&str]) -> Result<Vec<UnvBlock>, MeshConvertError> {
    let markers: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| (line.trim() == SENTINEL).then_some(idx))
        .collect();

    if markers.is_empty() {
        return Err(MeshConvertError::format(
            SCANNER,
            "no `-1` block delimiters found",
        ));
    }
    if markers.len() % 2 != 0 {
        let last = markers[markers.len() - 1];
        return Err(MeshConvertError::format_at(
            SCANNER,
            last,
            format!(
                "odd number of `-1` delimiters ({}); this marker has no closing partner",
                markers.len()
            ),
        ));
    }

    let blocks: Vec<UnvBlock> = markers
        .chunks_exact(2)
        .map(|pair| UnvBlock {
            open: pair[0],
            close: pair[1],
        })
        .collect();
    log::debug!("found {} UNV blocks", blocks.len());
    Ok(blocks)
}

/// Parse a signed integer token.
pub(crate) fn parse_int(
    component: &'static str,
    line_idx: usize,
    raw: &str,
) -> Result<i64, MeshConvertError> {
    raw.parse::<i64>().map_err(|_| {
        MeshConvertError::format_at(component, line_idx, format!("invalid integer: {raw}"))
    })
}

/// Parse a float token, accepting Fortran `D` exponents.
pub(crate) fn parse_float(
    component: &'static str,
    line_idx: usize,
    raw: &str,
) -> Result<f64, MeshConvertError> {
    let parsed = if raw.contains(['D', 'd']) {
        raw.replace(['D', 'd'], "E").parse::<f64>()
    } else {
        raw.parse::<f64>()
    };
    parsed.map_err(|_| {
        MeshConvertError::format_at(component, line_idx, format!("invalid number: {raw}"))
    })
}

/// Convert a declared 1-based id to its 0-based form.
pub(crate) fn zero_based(
    component: &'static str,
    line_idx: usize,
    id: i64,
) -> Result<u64, MeshConvertError> {
    if id < 1 {
        return Err(MeshConvertError::format_at(
            component,
            line_idx,
            format!("id {id} is not a positive 1-based id"),
        ));
    }
    Ok((id - 1) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_markers_in_order() {
        let lines = ["    -1", "  2411", "a", "    -1", "junk", "-1", "2412", "-1"];
        let blocks = scan_blocks(&lines).unwrap();
        assert_eq!(
            blocks,
            vec![
                UnvBlock { open: 0, close: 3 },
                UnvBlock { open: 5, close: 7 }
            ]
        );
        assert_eq!(blocks[0].type_code(&lines), Some("2411"));
        assert_eq!(blocks[0].body(&lines), &["a"]);
        assert_eq!(blocks[1].body(&lines).len(), 0);
    }

    #[test]
    fn lines_with_more_tokens_are_not_markers() {
        let lines = ["-1 0", "-1", "x", "-1", "-10"];
        let blocks = scan_blocks(&lines).unwrap();
        assert_eq!(blocks, vec![UnvBlock { open: 1, close: 3 }]);
    }

    #[test]
    fn odd_marker_count_names_trailing_marker() {
        let lines = ["-1", "2411", "-1", "-1"];
        let err = scan_blocks(&lines).unwrap_err();
        match err {
            MeshConvertError::Format { line, .. } => assert_eq!(line, Some(4)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fortran_exponents_parse() {
        assert_eq!(parse_float("t", 0, "1.5D+01").unwrap(), 15.0);
        assert_eq!(parse_float("t", 0, "-2.0e-1").unwrap(), -0.2);
        assert!(parse_float("t", 0, "abc").is_err());
    }
}
