use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const DESCRIPTION: &str = r#"
Name: Java
Type: Java
Files: files.yaml
Begin Modification: "// BEGIN {{ id }}"
End Modification: "// END {{ id }}"
Vars:
  - Name: out
    Value: "{{ exporter_path }}out"
Defaults:
  None:
    Export: None
    Import: ""
    Declaration: ""
    Construction: ""
    Extra: ""
    ClassName: ""
    Subsystem Export: ""
    Template: ""
Instructions:
  Robot:
    Defaults: [None]
  Motor:
    Defaults: [None]
    ClassName: Motor
    Declaration: "private Motor {{ Short_Name }};"
"#;

const TREE: &str = r#"
type: Robot
name: robot
children:
  - type: Motor
    name: driveMotor
"#;

const MANIFEST: &str = r#"
- Export: "{{ out }}/Robot.java"
  Source: Robot.java.tera
  Update: Overwrite
- Export: "{{ out }}/Map.java"
  Source: Map.java.tera
  Update: Modify
  Modifications:
    decls: decls.tera
    missing: decls.tera
"#;

fn stencil_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("stencil"))
}

fn workspace(manifest: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let write = |name: &str, content: &str| fs::write(dir.path().join(name), content).expect("write");
    write("description.yaml", DESCRIPTION);
    write("tree.yaml", TREE);
    write("files.yaml", manifest);
    write(
        "Robot.java.tera",
        "{% for c in components %}{{ declaration_of(component=c) }}{% endfor %}\n",
    );
    write("Map.java.tera", "class Map {\n// BEGIN decls\n// END decls\n}\n");
    write("decls.tera", "int {{ id }};");
    dir
}

fn args(cmd: &str, dir: &Path) -> Vec<String> {
    vec![
        cmd.to_string(),
        dir.join("description.yaml").display().to_string(),
        "--tree".to_string(),
        dir.join("tree.yaml").display().to_string(),
    ]
}

fn out(dir: &Path, name: &str) -> PathBuf {
    dir.join("out").join(name)
}

#[test]
fn export_writes_files_and_reports_them() {
    let dir = workspace(MANIFEST);

    stencil_cmd()
        .args(args("export", dir.path()))
        .assert()
        .success()
        .stdout(contains("'Java' exported (2 written, 0 unchanged)"))
        .stdout(contains("Robot.java"));

    assert_eq!(
        fs::read_to_string(out(dir.path(), "Robot.java")).unwrap(),
        "private Motor driveMotor;\n"
    );
    assert!(out(dir.path(), "Map.java").exists());
}

#[test]
fn second_export_modifies_regions_and_warns_on_missing_ones() {
    let dir = workspace(MANIFEST);
    stencil_cmd().args(args("export", dir.path())).assert().success();

    stencil_cmd()
        .args(args("export", dir.path()))
        .assert()
        .success()
        .stdout(contains("region 'missing' not found"));

    assert_eq!(
        fs::read_to_string(out(dir.path(), "Map.java")).unwrap(),
        "class Map {\n// BEGIN decls\nint decls;\n// END decls\n}\n"
    );
}

#[test]
fn dry_run_leaves_disk_untouched() {
    let dir = workspace(MANIFEST);

    stencil_cmd()
        .args(args("export", dir.path()))
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("[dry-run]"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn failing_entry_exits_non_zero_and_names_target() {
    let dir = workspace(
        r#"
- Export: "{{ out }}/Robot.java"
  Source: Robot.java.tera
  Update: Overwrite
- Export: "{{ out }}/Broken.java"
  Source: nope.tera
  Update: Overwrite
"#,
    );

    stencil_cmd()
        .args(args("export", dir.path()))
        .assert()
        .failure()
        .stderr(contains("Broken.java"));

    assert!(out(dir.path(), "Robot.java").exists());
}

#[test]
fn diff_prints_unified_diff_without_writing() {
    let dir = workspace(MANIFEST);
    fs::create_dir_all(dir.path().join("out")).unwrap();
    fs::write(out(dir.path(), "Robot.java"), "private Motor oldMotor;\n").unwrap();

    stencil_cmd()
        .args(args("diff", dir.path()))
        .assert()
        .success()
        .stdout(contains("--- a/"))
        .stdout(contains("-private Motor oldMotor;"))
        .stdout(contains("+private Motor driveMotor;"));

    assert_eq!(
        fs::read_to_string(out(dir.path(), "Robot.java")).unwrap(),
        "private Motor oldMotor;\n"
    );
}

#[test]
fn plan_json_lists_entries_in_order() {
    let dir = workspace(MANIFEST);

    let assert = stencil_cmd()
        .args(args("plan", dir.path()))
        .arg("--json")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let plan: serde_json::Value = serde_json::from_str(&stdout).expect("plan json");

    let entries = plan.as_array().expect("array");
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["target"].as_str().unwrap().ends_with("Robot.java"));
    assert_eq!(entries[1]["update"], "Modify");
    assert_eq!(entries[1]["regions"], serde_json::json!(["decls", "missing"]));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn instructions_show_resolved_set_for_one_type() {
    let dir = workspace(MANIFEST);

    stencil_cmd()
        .arg("instructions")
        .arg(dir.path().join("description.yaml"))
        .args(["--type", "Motor"])
        .assert()
        .success()
        .stdout(contains("private Motor {{ Short_Name }};"))
        .stdout(contains("Robot").not());
}

#[test]
fn instructions_for_unknown_type_fail() {
    let dir = workspace(MANIFEST);

    stencil_cmd()
        .arg("instructions")
        .arg(dir.path().join("description.yaml"))
        .args(["--type", "Servo"])
        .assert()
        .failure()
        .stderr(contains("Servo"));
}
