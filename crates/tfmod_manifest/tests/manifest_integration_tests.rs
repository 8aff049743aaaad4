//! Integration tests for manifest loading, mutation and persistence.

use std::fs;

use tempfile::tempdir;

use tfmod_manifest::{
    insert_at_path, load_manifest, save_manifest, Leaf, ManifestError, SchemaNode, MANIFEST_FILE,
};

const BASE_MANIFEST: &str = r#"
intent: example-intent
flavor: example-flavor
version: "1.0"
description: An example module
clouds:
  - aws
  - gcp
spec:
  type: object
  properties: {}
outputs:
  default:
    type: "@outputs/example-intent"
"#;

fn write_base(dir: &std::path::Path) {
    fs::write(dir.join(MANIFEST_FILE), BASE_MANIFEST).unwrap();
}

fn leaf(type_name: &str, description: &str) -> SchemaNode {
    SchemaNode::Leaf(Leaf::from_user_input(type_name, description, None, &[], None).unwrap())
}

/// Full add-variable cycle: load, insert, save, reload.
#[test]
fn test_insert_survives_save_and_reload() {
    let temp = tempdir().unwrap();
    write_base(temp.path());

    let mut manifest = load_manifest(temp.path()).unwrap();
    insert_at_path(
        &mut manifest.spec,
        "runtime.cpu",
        leaf("number", "Number of CPUs"),
        true,
    )
    .unwrap();
    insert_at_path(
        &mut manifest.spec,
        "runtime.memory",
        leaf("string", "Memory limit"),
        false,
    )
    .unwrap();
    save_manifest(temp.path(), &manifest).unwrap();

    let reloaded = load_manifest(temp.path()).unwrap();
    assert_eq!(manifest.spec, reloaded.spec);

    let content = fs::read_to_string(temp.path().join(MANIFEST_FILE)).unwrap();
    assert!(content.contains("runtime"));
    assert!(content.contains("cpu"));
    assert!(content.contains("Number of CPUs"));
}

/// Repeated load/save cycles of an untouched manifest stay deep-equal.
#[test]
fn test_round_trip_is_stable() {
    let temp = tempdir().unwrap();
    write_base(temp.path());

    let first = load_manifest(temp.path()).unwrap();
    save_manifest(temp.path(), &first).unwrap();
    let second = load_manifest(temp.path()).unwrap();
    save_manifest(temp.path(), &second).unwrap();
    let third = load_manifest(temp.path()).unwrap();

    assert_eq!(first.spec, third.spec);
    assert_eq!(first.intent, third.intent);
    assert_eq!(first.clouds, third.clouds);
    assert_eq!(first.outputs.len(), third.outputs.len());
}

/// The shape-exclusivity invariant holds through arbitrary insert sequences.
#[test]
fn test_shape_exclusivity_after_mixed_inserts() {
    let temp = tempdir().unwrap();
    write_base(temp.path());

    let mut manifest = load_manifest(temp.path()).unwrap();
    insert_at_path(&mut manifest.spec, "a.b", leaf("string", "b"), false).unwrap();
    insert_at_path(&mut manifest.spec, "c.*.d", leaf("string", "d"), false).unwrap();
    insert_at_path(&mut manifest.spec, "c.*.e", leaf("number", "e"), true).unwrap();

    // conflicting shapes on existing nodes are rejected
    assert!(matches!(
        insert_at_path(&mut manifest.spec, "a.*.x", leaf("string", "x"), false),
        Err(ManifestError::ShapeConflict { .. })
    ));
    assert!(matches!(
        insert_at_path(&mut manifest.spec, "c.f", leaf("string", "f"), false),
        Err(ManifestError::ShapeConflict { .. })
    ));

    save_manifest(temp.path(), &manifest).unwrap();
    let content = fs::read_to_string(temp.path().join(MANIFEST_FILE)).unwrap();

    // the serialized dynamic object carries its key pattern
    assert!(content.contains("patternProperties"));
    assert!(content.contains("keyPattern"));
}

/// A manifest violating the outer structural schema never reaches the
/// typed model.
#[test]
fn test_structural_check_gates_loading() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join(MANIFEST_FILE),
        "intent: only-intent\nspec: {}\n",
    )
    .unwrap();

    let err = load_manifest(temp.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Structural(_)));
}
