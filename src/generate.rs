//! Produces randomized scene documents for exercising the merge and
//! validation pipeline: a handful of cubes, a mesh carrying a material
//! variant set, and a camera, plus document-level metadata.

use rand::Rng;

use crate::document::{SceneDocument, Variability};
use crate::path::ScenePath;
use crate::tree::SceneTree;
use crate::value::Value;

const MATERIAL_VARIANTS: &[(&str, [f64; 3])] = &[
    ("Metal", [0.7, 0.7, 0.7]),
    ("Plastic", [0.1, 0.5, 0.1]),
    ("Glass", [0.1, 0.1, 0.5]),
];

/// Builds a randomized scene. Node names carry a random suffix so that two
/// generated documents never collide below the shared `/World` root.
pub fn generate_scene(rng: &mut impl Rng) -> SceneDocument {
    let mut doc = SceneDocument::new();

    doc.metadata.start_time_code = Some(1.0);
    doc.metadata.end_time_code = Some(48.0);
    doc.metadata.meters_per_unit = Some(0.01);

    let world_path = ScenePath::parse("/World").expect("static path is valid");
    doc.metadata.default_root = Some(world_path.clone());

    let uniq = format!("{:06x}", rng.gen_range(0..0x100_0000u32));

    let mut tree = SceneTree::new(&mut doc);
    let world = tree.define_node(&world_path, "Transform");
    tree.set_metadata(
        world,
        "comment",
        Value::String("A randomized demo scene with cubes, variants, and a camera.".to_owned()),
    );

    generate_cubes(&mut tree, &world_path, &uniq, rng);
    generate_mesh(&mut tree, &world_path, &uniq, rng);
    generate_camera(&mut tree, &world_path, &uniq, rng);

    doc
}

fn generate_cubes(tree: &mut SceneTree, world: &ScenePath, uniq: &str, rng: &mut impl Rng) {
    let count = rng.gen_range(4..=8);

    for index in 0..count {
        let path = world
            .child(&format!("Cube_{}_{}", uniq, index))
            .expect("generated names are valid");
        let cube = tree.define_node(&path, "Cube");

        tree.create_attribute(cube, "size", "double", Variability::Varying, false);
        tree.set_attribute_value(cube, "size", Value::Number(rng.gen_range(0.5..2.0)));

        tree.create_attribute(cube, "translate", "double3", Variability::Varying, false);
        tree.set_attribute_value(
            cube,
            "translate",
            Value::Vector(vec![
                rng.gen_range(-5.0..5.0),
                rng.gen_range(0.0..3.0),
                rng.gen_range(-5.0..5.0),
            ]),
        );

        tree.create_attribute(cube, "displayColor", "color3f", Variability::Varying, false);
        tree.set_attribute_value(
            cube,
            "displayColor",
            Value::Vector(vec![rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()]),
        );
    }
}

/// A mesh with a `materialVariant` set. Every variant is declared, but
/// material content is authored only under the randomly-chosen selection;
/// the other variants stay empty until something is authored under them.
fn generate_mesh(tree: &mut SceneTree, world: &ScenePath, uniq: &str, rng: &mut impl Rng) {
    let mesh_path = world
        .child(&format!("Mesh_{}", uniq))
        .expect("generated names are valid");
    let mesh = tree.define_node(&mesh_path, "Mesh");

    tree.create_attribute(mesh, "points", "point3fArray", Variability::Varying, false);

    for (variant, _) in MATERIAL_VARIANTS {
        tree.add_variant(mesh, "materialVariant", variant);
    }

    let (selection, color) = MATERIAL_VARIANTS[rng.gen_range(0..MATERIAL_VARIANTS.len())];
    tree.set_variant_selection(mesh, "materialVariant", Some(selection));

    tree.with_variant_scope(mesh, "materialVariant", selection, |tree| {
        let material_path = mesh_path
            .child(&format!("{}Material", selection))
            .expect("generated names are valid");
        tree.define_node(&material_path, "Material");

        let shader_path = material_path
            .child("Surface")
            .expect("static name is valid");
        let shader = tree.define_node(&shader_path, "Shader");

        tree.create_attribute(shader, "infoId", "token", Variability::Uniform, false);
        tree.set_attribute_value(
            shader,
            "infoId",
            Value::String("PreviewSurface".to_owned()),
        );

        tree.create_attribute(shader, "diffuseColor", "color3f", Variability::Varying, false);
        tree.set_attribute_value(shader, "diffuseColor", Value::Vector(color.to_vec()));

        tree.create_relationship(mesh, "boundMaterial", vec![material_path]);
    })
    .expect("the selected variant was just declared");
}

fn generate_camera(tree: &mut SceneTree, world: &ScenePath, uniq: &str, rng: &mut impl Rng) {
    let path = world
        .child(&format!("Camera_{}", uniq))
        .expect("generated names are valid");
    let camera = tree.define_node(&path, "Camera");

    tree.create_attribute(camera, "focalLength", "double", Variability::Varying, false);
    tree.set_attribute_value(
        camera,
        "focalLength",
        Value::Number(rng.gen_range(30.0..70.0)),
    );

    tree.create_attribute(camera, "translate", "double3", Variability::Varying, false);
    tree.set_attribute_value(camera, "translate", Value::Vector(vec![0.0, 5.0, 20.0]));
}
