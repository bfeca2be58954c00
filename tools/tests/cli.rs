use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use unibench::{
    instances::{Instance, InstanceKind},
    loader,
    types::Problem,
};

fn data(name: &str) -> String {
    format!("{}/../data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn run(bin: &str, args: &[&str]) -> Output {
    Command::new(bin).args(args).output().unwrap()
}

fn out(dir: &Path) -> &str {
    dir.to_str().unwrap()
}

#[test]
fn col2uni_categories() {
    let dir = tempfile::tempdir().unwrap();
    let res = run(
        env!("CARGO_BIN_EXE_col2uni"),
        &[
            &data("tri.col"),
            &data("bin10.col.b"),
            &data("twin.col.b"),
            "--out-dir",
            out(dir.path()),
            "-k",
            "3",
        ],
    );
    assert!(res.status.success());
    for name in ["tri", "bin10", "twin"] {
        assert!(dir.path().join("tiny").join(format!("{name}.txt")).is_file());
    }
    let graph = loader::load_instance(dir.path().join("tiny/tri.txt"))
        .unwrap()
        .into_graph()
        .unwrap();
    assert_eq!(graph.name(), "tri");
    assert_eq!(graph.meta().problem_kind(), Some(Problem::GraphColoring));
    assert_eq!(graph.k(), 3);
    assert_eq!(graph.m(), 4);
}

#[test]
fn col2uni_skips_duplicates() {
    let input = tempfile::tempdir().unwrap();
    std::fs::copy(data("tri.col"), input.path().join("tri.col")).unwrap();
    std::fs::copy(data("tri.col"), input.path().join("tri_copy.col")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let pattern = format!("{}/*.col", out(input.path()));
    let res = run(
        env!("CARGO_BIN_EXE_col2uni"),
        &[&pattern, "--out-dir", out(dir.path())],
    );
    assert!(res.status.success());
    assert!(dir.path().join("tiny/tri.txt").is_file());
    assert!(!dir.path().join("tiny/tri_copy.txt").exists());
}

#[test]
fn graph2uni_formats() {
    let dir = tempfile::tempdir().unwrap();
    let res = run(
        env!("CARGO_BIN_EXE_graph2uni"),
        &[
            &data("add4.graph.bz2"),
            &data("small.mtx"),
            "--out-dir",
            out(dir.path()),
        ],
    );
    assert!(res.status.success());
    let batch = loader::load_many([dir.path().join("add4.txt"), dir.path().join("small.txt")]);
    assert!(batch.is_complete());
    for inst in &batch.instances {
        assert_eq!(inst.kind(), InstanceKind::Graph);
        assert_eq!(inst.meta().problem(), Some("graph_partitioning"));
        assert_eq!(inst.meta().k(), Some(2));
    }
    assert_eq!(batch.instances[0].name(), "add4");
    assert_eq!(batch.instances[0].as_graph().unwrap().m(), 4);
}

#[test]
fn graph2uni_dense_matrix_fails() {
    let dir = tempfile::tempdir().unwrap();
    let res = run(
        env!("CARGO_BIN_EXE_graph2uni"),
        &[&data("dense.mtx"), "--out-dir", out(dir.path())],
    );
    assert!(!res.status.success());
    assert!(!dir.path().join("dense.txt").exists());
}

#[test]
fn dat2uni_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let res = run(
        env!("CARGO_BIN_EXE_dat2uni"),
        &[&data("pk5.dat"), "--out-dir", out(dir.path())],
    );
    assert!(res.status.success());
    let npp = loader::load_instance(dir.path().join("tiny/pk5.txt"))
        .unwrap()
        .into_npp()
        .unwrap();
    let values: Vec<String> = npp.values().iter().map(ToString::to_string).collect();
    assert_eq!(values, ["17", "12", "9", "8", "3"]);
    assert_eq!(npp.k(), 2);
}

#[test]
fn compress_roundtrip() {
    let input = tempfile::tempdir().unwrap();
    let tiny = input.path().join("tiny");
    std::fs::create_dir(&tiny).unwrap();
    std::fs::copy(data("path4.txt"), tiny.join("path4.txt")).unwrap();
    std::fs::copy(data("npp_small.txt"), tiny.join("npp_small.txt")).unwrap();

    let packed = tempfile::tempdir().unwrap();
    let state = packed.path().join("state.json");
    let pattern = format!("{}/*.txt", tiny.display());
    let res = run(
        env!("CARGO_BIN_EXE_compress"),
        &[
            &pattern,
            "--out-dir",
            out(packed.path()),
            "--state",
            state.to_str().unwrap(),
        ],
    );
    assert!(res.status.success());
    assert!(!state.exists());
    let archive = packed.path().join("tiny/path4.txt.xz");
    assert!(archive.is_file());
    assert_eq!(
        loader::load_instance(&archive).unwrap().name(),
        "path4"
    );

    let unpacked = tempfile::tempdir().unwrap();
    let pattern = format!("{}/tiny/*.xz", packed.path().display());
    let res = run(
        env!("CARGO_BIN_EXE_decompress"),
        &[&pattern, "--out-dir", out(unpacked.path())],
    );
    assert!(res.status.success());
    for name in ["path4.txt", "npp_small.txt"] {
        assert_eq!(
            std::fs::read(unpacked.path().join(name)).unwrap(),
            std::fs::read(tiny.join(name)).unwrap()
        );
    }
}

#[test]
fn compress_keeps_state_on_failure() {
    let input = tempfile::tempdir().unwrap();
    std::fs::copy(data("path4.txt"), input.path().join("path4.txt")).unwrap();
    // a directory can not be compressed
    std::fs::create_dir(input.path().join("broken.txt")).unwrap();

    let packed = tempfile::tempdir().unwrap();
    let pattern = format!("{}/*.txt", out(input.path()));
    let res = run(
        env!("CARGO_BIN_EXE_compress"),
        &[&pattern, "--out-dir", out(packed.path())],
    );
    assert!(!res.status.success());
    let state: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(packed.path().join("compression_state.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(state["completed"].as_array().unwrap().len(), 1);
    assert_eq!(state["failed"].as_object().unwrap().len(), 1);
}

#[test]
fn inspect_json() {
    let res = run(
        env!("CARGO_BIN_EXE_inspect"),
        &[&data("path4.txt"), &data("npp_small.txt"), "--json"],
    );
    assert!(res.status.success());
    let stdout = String::from_utf8(res.stdout).unwrap();
    let instances: Vec<Instance> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].kind(), InstanceKind::Graph);
    assert_eq!(instances[1].kind(), InstanceKind::NumberPartitioning);
}

#[test]
fn inspect_reports_missing() {
    let missing: PathBuf = PathBuf::from(data("nope.txt"));
    let res = run(
        env!("CARGO_BIN_EXE_inspect"),
        &[&data("path4.txt"), missing.to_str().unwrap()],
    );
    assert!(!res.status.success());
    let stdout = String::from_utf8(res.stdout).unwrap();
    assert!(stdout.starts_with("path4 (graph)"));
}
