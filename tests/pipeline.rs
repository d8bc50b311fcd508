//! End-to-end tests that push generated scenes through persistence, the
//! merge engine, and the validator, including the CLI exit-code contract.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use libscenestitch::cli::{MergeCommand, ValidateCommand};
use libscenestitch::{
    generate_scene, merge, validate, DocumentFile, SceneDocument, ScenePath, SceneTree,
};

fn write_generated_scene(dir: &std::path::Path, name: &str, seed: u64) -> PathBuf {
    let path = dir.join(name);
    let doc = generate_scene(&mut StdRng::seed_from_u64(seed));
    doc.save(&path).unwrap();
    path
}

fn mesh_path(doc: &mut SceneDocument) -> ScenePath {
    let tree = SceneTree::new(doc);
    let world = tree.get_node(&ScenePath::parse("/World").unwrap()).unwrap();
    let mesh = tree
        .visible_children(world)
        .into_iter()
        .find(|&child| tree.node(child).type_name == "Mesh")
        .expect("generated scenes always contain a mesh");
    tree.node(mesh).path.clone()
}

#[test]
fn generated_scenes_survive_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");

    let doc = generate_scene(&mut StdRng::seed_from_u64(3));
    doc.save(&path).unwrap();
    let reopened = SceneDocument::open(&path).unwrap();

    assert_eq!(
        DocumentFile::from_document(&reopened),
        DocumentFile::from_document(&doc)
    );
}

#[test]
fn merge_and_validate_round_trip_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = write_generated_scene(dir.path(), "a.json", 1);
    let path_b = write_generated_scene(dir.path(), "b.json", 99);

    let mut a = SceneDocument::open(&path_a).unwrap();
    let mut b = SceneDocument::open(&path_b).unwrap();
    assert_ne!(mesh_path(&mut a), mesh_path(&mut b));

    let mut composed = SceneDocument::new();
    merge(&mut composed, &mut a, &mut b).unwrap();

    let composed_path = dir.path().join("composed.json");
    composed.save(&composed_path).unwrap();

    // Re-open everything so the validation run sees exactly what a separate
    // process would.
    let mut a = SceneDocument::open(&path_a).unwrap();
    let mut b = SceneDocument::open(&path_b).unwrap();
    let mut composed = SceneDocument::open(&composed_path).unwrap();

    let diagnostics = validate(&mut composed, &mut a, &mut b);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {:#?}",
        diagnostics
    );
}

#[test]
fn cli_merge_then_validate_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = write_generated_scene(dir.path(), "a.json", 5);
    let path_b = write_generated_scene(dir.path(), "b.json", 23);
    let composed = dir.path().join("composed.json");

    let merge_code = MergeCommand {
        input_a: path_a.clone(),
        input_b: path_b.clone(),
        output: composed.clone(),
    }
    .run()
    .unwrap();
    assert_eq!(merge_code, 0);
    assert!(composed.exists());

    let validate_code = ValidateCommand {
        input_a: path_a,
        input_b: path_b,
        composed,
    }
    .run()
    .unwrap();
    assert_eq!(validate_code, 0);
}

#[test]
fn cli_validate_exits_one_on_an_unfaithful_composition() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = write_generated_scene(dir.path(), "a.json", 8);
    let path_b = write_generated_scene(dir.path(), "b.json", 42);

    // Compose from A alone, so everything B contributes is missing.
    let mut a1 = SceneDocument::open(&path_a).unwrap();
    let mut a2 = SceneDocument::open(&path_a).unwrap();
    let mut composed = SceneDocument::new();
    merge(&mut composed, &mut a1, &mut a2).unwrap();

    let composed_path = dir.path().join("composed.json");
    composed.save(&composed_path).unwrap();

    let code = ValidateCommand {
        input_a: path_a,
        input_b: path_b,
        composed: composed_path,
    }
    .run()
    .unwrap();
    assert_eq!(code, 1);
}

#[test]
fn cli_validate_exits_two_when_a_document_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = write_generated_scene(dir.path(), "a.json", 12);

    let code = ValidateCommand {
        input_a: path_a.clone(),
        input_b: dir.path().join("does-not-exist.json"),
        composed: path_a,
    }
    .run()
    .unwrap();
    assert_eq!(code, 2);
}
