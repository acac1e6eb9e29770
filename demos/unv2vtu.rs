//! Command-line driver: UNV mesh + group table + field exports → `.vtu`.
//!
//! ```text
//! cargo run --example unv2vtu -- <mesh.unv> <elem> <out.vtu> <field.unv>...
//! cargo run --example unv2vtu -- --config convert.json
//! ```
//!
//! With no arguments the legacy `dat/` layout is used. Set `RUST_LOG=info`
//! (or `debug`) for progress output.

use std::path::PathBuf;
use std::process::ExitCode;

use unv_sieve::io::vtu::VtuWriter;
use unv_sieve::mesh_error::MeshConvertError;
use unv_sieve::pipeline::{ConvertOptions, convert};

fn legacy_defaults() -> ConvertOptions {
    ConvertOptions {
        mesh_file: Some("dat/post_geom.unv".into()),
        group_file: Some("dat/elem".into()),
        field_files: vec!["dat/magnetic.unv".into(), "dat/magnetization.unv".into()],
        output_file: Some("dat/out.vtu".into()),
        ..Default::default()
    }
}

fn options_from_args(args: &[String]) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
    match args {
        [] => Ok(legacy_defaults()),
        [flag, path] if flag == "--config" => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        [mesh, groups, output, fields @ ..] if !fields.is_empty() => Ok(ConvertOptions {
            mesh_file: Some(PathBuf::from(mesh)),
            group_file: Some(PathBuf::from(groups)),
            output_file: Some(PathBuf::from(output)),
            field_files: fields.iter().map(PathBuf::from).collect(),
            ..Default::default()
        }),
        _ => Err(Box::new(MeshConvertError::MissingInput("field_files"))),
    }
}

const USAGE: &str =
    "usage: unv2vtu <mesh.unv> <elem> <out.vtu> <field.unv>... | --config <file.json>";

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = options_from_args(&args)?;
    let summary = convert(&options, &VtuWriter::default())?;
    println!("[unv2vtu] wrote {}", summary.full.display());
    for (group, path) in &summary.groups {
        println!("[unv2vtu] physNum {group:>4} -> {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[unv2vtu] [ERROR] {e}");
            if e.downcast_ref::<MeshConvertError>()
                .is_some_and(|e| matches!(e, MeshConvertError::MissingInput(_)))
            {
                eprintln!("{USAGE}");
            }
            ExitCode::FAILURE
        }
    }
}
