use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use unv_sieve::algs::reindex::{GROUP_FIELD_NAME, build_field_matrix};
use unv_sieve::algs::split::split_by_group;
use unv_sieve::io::CellGrid;
use unv_sieve::io::groups::GroupAssignment;
use unv_sieve::io::unv::field::FieldRecord;
use unv_sieve::topology::cell_type::CellType;

fn segment_grid(ids: &[u64], groups: &GroupAssignment, records: &[FieldRecord]) -> CellGrid {
    CellGrid {
        nodes: Arc::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]),
        cells: ids.iter().map(|_| vec![0, 1]).collect(),
        cell_types: vec![CellType::Segment; ids.len()],
        cell_data: build_field_matrix(ids, records, groups).expect("matrix"),
    }
}

#[test]
fn two_groups_yield_two_single_row_outputs() {
    // element 5 → group 7, element 10 → group 9 (zero-based 4 and 9)
    let ids = [4, 9];
    let groups: GroupAssignment = [(4, 7), (9, 9)].into_iter().collect();
    let bx = FieldRecord::new("Bx", Arc::from(vec![9u64]), vec![2.0]).expect("record");
    let grid = segment_grid(&ids, &groups, &[bx]);

    let parts = split_by_group(&grid);
    assert_eq!(parts.len(), 2);

    assert_eq!(parts[0].group, 7);
    assert_eq!(parts[0].rows, vec![0]);
    assert_eq!(parts[0].grid.num_cells(), 1);
    assert_eq!(parts[0].grid.cell_data.get(0, 0), Some(0.0));

    assert_eq!(parts[1].group, 9);
    assert_eq!(parts[1].rows, vec![1]);
    assert_eq!(parts[1].grid.cell_data.get(0, 0), Some(2.0));
    assert_eq!(
        parts[1]
            .grid
            .cell_data
            .column_by_name(GROUP_FIELD_NAME)
            .expect("group column")
            .values,
        vec![9.0]
    );

    for part in &parts {
        assert_eq!(part.grid.num_nodes(), 2);
        assert!(Arc::ptr_eq(&part.grid.nodes, &grid.nodes));
    }
}

#[test]
fn group_zero_is_distinct_from_unassigned() {
    let ids = [0, 1, 2];
    let groups: GroupAssignment = [(0, 0)].into_iter().collect();
    let grid = segment_grid(&ids, &groups, &[]);
    let parts = split_by_group(&grid);
    assert_eq!(parts.len(), 1);
    assert_eq!((parts[0].group, parts[0].rows.clone()), (0, vec![0]));
}

proptest! {
    #[test]
    fn subsets_are_disjoint_and_cover_grouped_rows(
        assignment in prop::collection::vec(prop::option::of(-3i64..4), 1..50),
    ) {
        let ids: Vec<u64> = (0..assignment.len() as u64).map(|i| 2 * i).collect();
        let groups: GroupAssignment = ids
            .iter()
            .zip(&assignment)
            .filter_map(|(&id, g)| g.map(|g| (id, g)))
            .collect();
        let grid = segment_grid(&ids, &groups, &[]);
        let parts = split_by_group(&grid);

        let mut seen = HashSet::new();
        for part in &parts {
            for &row in &part.rows {
                prop_assert!(seen.insert(row), "row {} in two groups", row);
                prop_assert_eq!(assignment[row], Some(part.group));
            }
            prop_assert_eq!(part.grid.num_cells(), part.rows.len());
        }
        let grouped: HashSet<usize> = assignment
            .iter()
            .enumerate()
            .filter_map(|(row, g)| g.map(|_| row))
            .collect();
        prop_assert_eq!(seen, grouped);

        let order: Vec<i64> = parts.iter().map(|p| p.group).collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(order, sorted);
    }
}

#[test]
fn field_component_named_like_group_column_does_not_drive_split() {
    let ids = [4, 9];
    let groups: GroupAssignment = [(4, 7), (9, 9)].into_iter().collect();
    let clash =
        FieldRecord::new(GROUP_FIELD_NAME, Arc::from(vec![4u64, 9]), vec![100.0, 200.0])
            .expect("record");
    let grid = segment_grid(&ids, &groups, &[clash]);

    let parts = split_by_group(&grid);
    let found: Vec<i64> = parts.iter().map(|p| p.group).collect();
    assert_eq!(found, vec![7, 9]);
    assert_eq!(grid.cell_data.group_column().expect("trailing").values, vec![7.0, 9.0]);
}
