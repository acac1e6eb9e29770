//! Per-physical-group extraction of an assembled grid.

use crate::io::CellGrid;
use std::collections::BTreeMap;

/// Cells of one physical group.
#[derive(Debug, Clone)]
pub struct GroupGrid {
    pub group: i64,
    /// Row positions in the parent grid, ascending.
    pub rows: Vec<usize>,
    pub grid: CellGrid,
}

/// Row positions per group value, ascending by group.
///
/// Reads the exact group numbers attached by the reindexer, never a field
/// column, so a field component that happens to share the group column's
/// name has no effect. Cells without a group entry appear in no subset.
pub fn group_rows(grid: &CellGrid) -> BTreeMap<i64, Vec<usize>> {
    let mut by_group: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, group) in grid.cell_data.groups().iter().enumerate() {
        if let Some(group) = group {
            by_group.entry(*group).or_default().push(row);
        }
    }
    by_group
}

/// Split `grid` into one sub-grid per distinct group value.
///
/// Sub-grids share the full node array of the parent.
pub fn split_by_group(grid: &CellGrid) -> Vec<GroupGrid> {
    group_rows(grid)
        .into_iter()
        .map(|(group, rows)| {
            log::debug!("[group splitter] group {group}: {} cells", rows.len());
            let sub = grid.select_cells(&rows);
            GroupGrid {
                group,
                rows,
                grid: sub,
            }
        })
        .collect()
}
