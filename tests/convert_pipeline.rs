use std::fs;
use std::path::{Path, PathBuf};

use std::io::Write;

use unv_sieve::io::unv::field::FieldBlockPolicy;
use unv_sieve::io::vtu::VtuWriter;
use unv_sieve::io::{CellGrid, GridWriter};
use unv_sieve::mesh_error::MeshConvertError;
use unv_sieve::pipeline::{ConvertOptions, assemble, convert};

const MESH: &str = "    -1
  2411
         1         1         1        11
   0.0000000000000000E+00   0.0000000000000000E+00   0.0000000000000000E+00
         2         1         1        11
   1.0000000000000000E+00   0.0000000000000000E+00   0.0000000000000000E+00
         3         1         1        11
   0.0000000000000000E+00   1.0000000000000000E+00   0.0000000000000000E+00
    -1
    -1
  2412
        10        91         2         1         7         3
         1         2         3
         5        91         2         1         7         3
         3         2         1
    -1
";

const GROUPS: &str = "elemNum physNum
5 7
10 9
";

const MAGNETIC: &str = "    -1
  2414
magnetic - Bx, By
NONE
NONE
NONE
NONE
         1         2         2         8         2         2
         1         0         0
  0.00000E+00
        10         2
  1.0  -1.0
    -1
";

const MAGNETIZATION: &str = "    -1
  2414
magnetization - Mz
NONE
NONE
NONE
NONE
         1         2         2         8         2         1
         1         0         0
  0.00000E+00
         5         1
  3.5
        10         1
  4.5
        77         1
  9.9
    -1
";

/// Fresh scratch directory under the system temp dir.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("unv-sieve-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn options_in(dir: &Path) -> ConvertOptions {
    fs::write(dir.join("geom.unv"), MESH).expect("mesh");
    fs::write(dir.join("elem"), GROUPS).expect("groups");
    fs::write(dir.join("magnetic.unv"), MAGNETIC).expect("field");
    fs::write(dir.join("magnetization.unv"), MAGNETIZATION).expect("field");
    ConvertOptions {
        mesh_file: Some(dir.join("geom.unv")),
        group_file: Some(dir.join("elem")),
        field_files: vec![dir.join("magnetic.unv"), dir.join("magnetization.unv")],
        output_file: Some(dir.join("out").join("out.vtu")),
        ..Default::default()
    }
}

#[test]
fn assembles_canonical_grid_and_matrix() {
    let dir = scratch("assemble");
    let conv = assemble(&options_in(&dir)).expect("assemble");

    assert_eq!(conv.element_ids, vec![4, 9]);
    assert_eq!(conv.grid.cells, vec![vec![2, 1, 0], vec![0, 1, 2]]);
    let m = &conv.grid.cell_data;
    assert_eq!(
        m.names().collect::<Vec<_>>(),
        vec!["Bx", "By", "Mz", "physNum"]
    );
    // Bx only defined for element 10 (row 1)
    assert_eq!(m.get(0, 0), Some(0.0));
    assert_eq!(m.get(1, 0), Some(1.0));
    assert_eq!(m.get(1, 1), Some(-1.0));
    assert_eq!(m.column(2).expect("Mz").values, vec![3.5, 4.5]);
    assert_eq!(m.column(3).expect("physNum").values, vec![7.0, 9.0]);

    assert_eq!(conv.groups.len(), 2);
    assert_eq!(conv.groups[0].group, 7);
    assert_eq!(conv.groups[1].grid.cells, vec![vec![0, 1, 2]]);
}

#[test]
fn writes_full_and_per_group_files() {
    let dir = scratch("convert");
    let options = options_in(&dir);
    let summary = convert(&options, &VtuWriter::default()).expect("convert");

    let out = dir.join("out");
    assert_eq!(summary.full, out.join("out.vtu"));
    assert_eq!(
        summary.groups,
        vec![(7, out.join("out_7.vtu")), (9, out.join("out_9.vtu"))]
    );
    for path in std::iter::once(&summary.full).chain(summary.groups.iter().map(|(_, p)| p)) {
        let xml = fs::read_to_string(path).expect("output exists");
        assert!(xml.contains("Name=\"physNum\""));
    }
    let g7 = fs::read_to_string(out.join("out_7.vtu")).expect("group 7");
    assert!(g7.contains("NumberOfPoints=\"3\" NumberOfCells=\"1\""));
}

#[test]
fn no_split_writes_only_full_grid() {
    let dir = scratch("nosplit");
    let options = ConvertOptions {
        split_groups: false,
        ..options_in(&dir)
    };
    let summary = convert(&options, &VtuWriter::default()).expect("convert");
    assert!(summary.groups.is_empty());
    assert!(!dir.join("out").join("out_7.vtu").exists());
}

#[test]
fn bad_field_file_aborts_before_writing() {
    let dir = scratch("abort");
    let options = options_in(&dir);
    fs::write(dir.join("magnetization.unv"), "    -1\n  2414\n").expect("truncate");

    let err = convert(&options, &VtuWriter::default()).expect_err("odd delimiters");
    assert!(err.is_format());
    match &err {
        MeshConvertError::InFile { path, .. } => assert!(path.ends_with("magnetization.unv")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.join("out").exists());
}

/// Writes like `VtuWriter` but refuses the grid of one group.
struct RefuseGroup(i64);

impl GridWriter for RefuseGroup {
    fn write<W: Write>(&self, writer: W, grid: &CellGrid) -> Result<(), MeshConvertError> {
        if grid.cell_data.groups() == [Some(self.0)] {
            return Err(MeshConvertError::Unsupported(format!("group {}", self.0)));
        }
        VtuWriter::default().write(writer, grid)
    }
}

#[test]
fn failed_group_write_leaves_no_output() {
    let dir = scratch("staged");
    let options = options_in(&dir);
    let err = convert(&options, &RefuseGroup(9)).expect_err("group 9 refused");
    match &err {
        MeshConvertError::InFile { source, .. } => {
            assert!(matches!(**source, MeshConvertError::Unsupported(_)), "{err:?}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let leftovers: Vec<_> = fs::read_dir(dir.join("out"))
        .expect("output dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert!(leftovers.is_empty(), "left behind: {leftovers:?}");
}

#[test]
fn options_round_trip_through_json() {
    let json = r#"{
        "mesh_file": "dat/post_geom.unv",
        "group_file": "dat/elem",
        "field_files": ["dat/magnetic.unv"],
        "field_blocks": "aggregate"
    }"#;
    let options: ConvertOptions = serde_json::from_str(json).expect("parse");
    assert_eq!(options.field_blocks, FieldBlockPolicy::Aggregate);
    assert!(options.split_groups);
    assert_eq!(options.output_path(), PathBuf::from("dat/out.vtu"));

    let back: ConvertOptions =
        serde_json::from_str(&serde_json::to_string(&options).expect("emit")).expect("reparse");
    assert_eq!(back, options);

    let typo = r#"{ "mesh_fil": "x" }"#;
    assert!(serde_json::from_str::<ConvertOptions>(typo).is_err());
}
