use assert_cmd::Command;
use std::fs;
use std::process::Command as StdCommand;
use tempfile::tempdir;

/// `true` if at least one of the compilers our bundled descriptors cover is
/// reachable on PATH; several tests below drive the real preprocessor and
/// are meaningless without one.
fn has_cxx_compiler() -> bool {
    ["c++", "g++", "clang++"].iter().any(|name| {
        StdCommand::new(name)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

#[test]
fn generates_build_ninja_for_a_single_executable_project() {
    if !has_cxx_compiler() {
        return;
    }

    let td = tempdir().expect("tempdir");
    let src = td.path().join("src");
    fs::create_dir_all(&src).expect("create src dir");
    fs::write(src.join("main.cc"), "int main() { return 0; }\n").expect("write main.cc");
    fs::write(
        src.join("sources.json"),
        r#"{"app": {"type": "executable", "sources": ["main.cc"]}}"#,
    )
    .expect("write sources.json");

    let out_dir = td.path().join("build");

    let mut cmd = Command::cargo_bin("cxxmod").expect("binary");
    cmd.arg(src.to_str().unwrap())
        .arg("--emit")
        .arg("ninja")
        .arg("--out")
        .arg(out_dir.to_str().unwrap())
        .assert()
        .success();

    let ninja_file = out_dir.join("build.ninja");
    assert!(ninja_file.exists());
    let contents = fs::read_to_string(&ninja_file).unwrap();
    assert!(contents.contains("rule cc"));
    assert!(contents.contains("main.cc"));
}

#[test]
fn emit_all_also_writes_a_dot_graph() {
    if !has_cxx_compiler() {
        return;
    }

    let td = tempdir().expect("tempdir");
    let src = td.path().join("src");
    fs::create_dir_all(&src).expect("create src dir");
    fs::write(src.join("main.cc"), "int main() { return 0; }\n").expect("write main.cc");
    fs::write(
        src.join("sources.json"),
        r#"{"app": {"type": "executable", "sources": ["main.cc"]}}"#,
    )
    .expect("write sources.json");

    let out_dir = td.path().join("build");

    let mut cmd = Command::cargo_bin("cxxmod").expect("binary");
    cmd.arg(src.to_str().unwrap())
        .arg("--emit")
        .arg("all")
        .arg("--out")
        .arg(out_dir.to_str().unwrap())
        .assert()
        .success();

    assert!(out_dir.join("build.ninja").exists());
    assert!(out_dir.join("graph.dot").exists());
}

#[test]
fn nonexistent_source_directory_exits_with_failure() {
    let mut cmd = Command::cargo_bin("cxxmod").expect("binary");
    cmd.arg("/no/such/directory/exists").assert().failure();
}
