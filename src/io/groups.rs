//! Physical-group table reader.
//!
//! The table has one header line followed by whitespace-separated numeric
//! rows: `elementId groupNumber [more columns...]`. Element ids are 1-based
//! in the file and stored 0-based, matching the element block convention.

use crate::io::unv::zero_based;
use crate::io::{UnvReader, read_all};
use crate::mesh_error::MeshConvertError;
use std::io::Read;

const LOADER: &str = "attribute loader";

/// Element id → physical group number, in file row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAssignment {
    entries: Vec<(u64, i64)>,
}

impl GroupAssignment {
    pub fn new(entries: Vec<(u64, i64)>) -> Self {
        Self { entries }
    }

    /// `(element_id, group)` pairs with 0-based element ids.
    pub fn entries(&self) -> &[(u64, i64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Element ids, in row order.
    pub fn element_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|&(id, _)| id)
    }

    /// Group numbers, in row order.
    pub fn groups(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|&(_, g)| g)
    }
}

impl FromIterator<(u64, i64)> for GroupAssignment {
    fn from_iter<I: IntoIterator<Item = (u64, i64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Reader for the physical-group table.
#[derive(Debug, Default, Clone)]
pub struct GroupTableReader;

impl GroupTableReader {
    /// Integral value, written either as an integer or as a float with no
    /// fractional part.
    fn parse_integral(line_idx: usize, raw: &str) -> Result<i64, MeshConvertError> {
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && v.is_finite() => Ok(v as i64),
            Ok(_) => Err(MeshConvertError::format_at(
                LOADER,
                line_idx,
                format!("expected an integral value, found {raw}"),
            )),
            Err(_) => Err(MeshConvertError::format_at(
                LOADER,
                line_idx,
                format!("non-numeric value: {raw}"),
            )),
        }
    }

    fn parse_row(line_idx: usize, line: &str) -> Result<(u64, i64), MeshConvertError> {
        let mut cols = line.split_whitespace();
        let (Some(id_raw), Some(group_raw)) = (cols.next(), cols.next()) else {
            return Err(MeshConvertError::format_at(
                LOADER,
                line_idx,
                "expected at least two columns (element id, group)",
            ));
        };
        for extra in cols {
            if extra.parse::<f64>().is_err() {
                return Err(MeshConvertError::format_at(
                    LOADER,
                    line_idx,
                    format!("non-numeric value: {extra}"),
                ));
            }
        }
        let id = zero_based(LOADER, line_idx, Self::parse_integral(line_idx, id_raw)?)?;
        let group = Self::parse_integral(line_idx, group_raw)?;
        Ok((id, group))
    }
}

impl UnvReader for GroupTableReader {
    type Output = GroupAssignment;

    fn read<R: Read>(&self, reader: R) -> Result<GroupAssignment, MeshConvertError> {
        let contents = read_all(reader)?;
        let groups: GroupAssignment = contents
            .lines()
            .enumerate()
            .skip(1)
            .filter(|(_, line)| {
                let t = line.trim();
                !t.is_empty() && !t.starts_with('#')
            })
            .map(|(idx, line)| Self::parse_row(idx, line))
            .collect::<Result<_, _>>()?;
        log::debug!("[attribute loader] {} group rows", groups.len());
        Ok(groups)
    }
}
