//! Description loading, catalogue integrity and component tree integration tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use stencil_core::{
    ComponentTree, ConfigError, Description, InstructionKey, TypeName,
};

const DESCRIPTION: &str = r#"
Name: Java
Type: Java
Files: files.yaml
Begin Modification: "// BEGIN AUTOGENERATED CODE, ID={{ id }}"
End Modification: "// END AUTOGENERATED CODE, ID={{ id }}"
Macros: macros.tera
Toolbar: true
Vars:
  - Name: package
    Value: org.team
  - Name: src
    Value: "src/{{ package }}"
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
  Actuator:
    Export: RobotMap
    Import: "import edu.{{ ClassName }};"
Instructions:
  Motor:
    Defaults: [Actuator, None]
    ClassName: Motor
    Declaration: "private Motor {{ Short_Name }};"
  Robot:
    Defaults: [None]
"#;

// ---------------------------------------------------------------------------
// 1. Loading
// ---------------------------------------------------------------------------

#[test]
fn load_resolves_paths_against_description_dir() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("ExportDescription.yaml");
    file.write_str(DESCRIPTION).expect("write");

    let loaded = Description::load_at(file.path()).expect("load");
    assert_eq!(loaded.document.name, "Java");
    assert!(loaded.document.toolbar);
    assert_eq!(loaded.manifest_path(), dir.path().join("files.yaml"));
    assert_eq!(loaded.macros_path(), Some(dir.path().join("macros.tera")));
    assert_eq!(loaded.document.vars[1].name, "src");
}

#[test]
fn load_missing_file_returns_io_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = Description::load_at(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("absent.yaml"));
}

#[rstest]
#[case("Name")]
#[case("Files")]
#[case("Begin Modification")]
#[case("Instructions")]
fn missing_required_field_is_named(#[case] field: &str) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let stripped: String = DESCRIPTION
        .lines()
        .filter(|l| !l.starts_with(&format!("{field}:")))
        .map(|l| format!("{l}\n"))
        .collect();
    // Dropping `Instructions:` leaves its body orphaned under `Defaults`; cut it.
    let stripped = if field == "Instructions" {
        stripped.split("  Motor:").next().unwrap_or_default().to_string()
    } else {
        stripped
    };
    let file = dir.child("d.yaml");
    file.write_str(&stripped).expect("write");

    let err = Description::load_at(file.path()).unwrap_err();
    let ConfigError::Parse { source, .. } = &err else {
        panic!("expected Parse, got {err}");
    };
    assert!(
        source.to_string().contains(field),
        "error should name `{field}`, got: {source}"
    );
}

// ---------------------------------------------------------------------------
// 2. Catalogue built from a description
// ---------------------------------------------------------------------------

#[test]
fn catalogue_mixes_overrides_and_ordered_defaults() {
    let d: Description = serde_yaml::from_str(DESCRIPTION).expect("parse");
    let cat = d.catalogue().expect("catalogue");
    let motor = cat.resolve(&TypeName::from("Motor")).expect("motor");

    assert_eq!(motor.class_name(), "Motor");
    assert_eq!(motor.export_category(), "RobotMap");
    assert_eq!(motor.get(InstructionKey::Import), "import edu.{{ ClassName }};");
    assert_eq!(motor.get(InstructionKey::Extra), "");
    assert_eq!(cat.len(), 2);
}

#[test]
fn catalogue_fails_when_no_group_supplies_a_key() {
    let broken = DESCRIPTION.replace("    Subsystem Export: \"\"\n", "");
    let d: Description = serde_yaml::from_str(&broken).expect("parse");
    let err = d.catalogue().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Subsystem Export"), "got: {msg}");
    assert!(msg.contains("Motor") || msg.contains("Robot"), "got: {msg}");
}

// ---------------------------------------------------------------------------
// 3. Component tree files
// ---------------------------------------------------------------------------

#[test]
fn tree_loads_from_yaml() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("robot.yaml");
    file.write_str(
        "type: Robot\nname: robot\nproperties:\n  - {key: Export Commands, value: \"true\"}\nchildren:\n  - type: Motor\n    name: driveMotor\n",
    )
    .expect("write");
    file.assert(predicate::str::contains("driveMotor"));

    let tree = ComponentTree::load_at(file.path()).expect("load");
    assert_eq!(tree.root().property("Export Commands"), Some("true"));
    assert_eq!(
        tree.find_by_name("driveMotor").map(|c| c.type_name.0.as_str()),
        Some("Motor")
    );
}

#[test]
fn corrupt_tree_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("robot.yaml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed").expect("write");
    let err = ComponentTree::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("robot.yaml"));
}
