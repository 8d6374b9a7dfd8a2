use std::sync::Arc;

use cgmath::Vector3;
use realistic_render::data_structures::{
    geometry::Geometry,
    instance::Instance,
    light::DirectionalLight,
    material::{BasicMaterial, Material, StandardMaterial},
    scene_graph::{ContainerNode, MeshNode, Scene, SceneNode, update_all_materials},
};

fn standard(name: &str) -> MeshNode {
    MeshNode::new(
        name,
        Arc::new(Geometry::cuboid(1.0, 1.0, 1.0)),
        Material::Standard(StandardMaterial::default()),
    )
}

fn basic(name: &str) -> MeshNode {
    MeshNode::new(
        name,
        Arc::new(Geometry::plane(1.0, 1.0)),
        Material::Basic(BasicMaterial::default()),
    )
}

/// Two standard meshes (one nested), one basic mesh and a light.
fn scene() -> Scene {
    let mut scene = Scene::new();
    scene.add(Box::new(standard("top")));
    scene.add(Box::new(basic("unlit")));
    let mut group = ContainerNode::new("group");
    group.add_child(Box::new(standard("nested")));
    scene.add(Box::new(group));
    scene.add_light(DirectionalLight::new(0xffffff, 1.0));
    scene
}

#[test]
fn should_count_objects_and_meshes() {
    let scene = scene();
    assert_eq!(scene.object_count(), 4);
    assert_eq!(scene.mesh_count(), 3);
}

#[test]
fn should_traverse_depth_first() {
    let scene = scene();
    let mut names = Vec::new();
    scene.traverse_ref(&mut |node| names.push(node.name().to_string()));
    assert_eq!(names, ["top", "unlit", "group", "nested"]);
}

#[test]
fn should_update_every_standard_material() {
    let mut scene = scene();

    assert_eq!(update_all_materials(&mut scene, 2.5), 2);

    for name in ["top", "nested"] {
        let mesh = scene.find_mesh_mut(name).expect("mesh exists");
        assert!(mesh.cast_shadow && mesh.receive_shadow, "{name}");
        let material = mesh.material.as_standard().expect("standard material");
        assert_eq!(material.env_map_intensity, 2.5);
    }
    let unlit = scene.find_mesh_mut("unlit").expect("mesh exists");
    assert!(!unlit.cast_shadow && !unlit.receive_shadow);
    assert!(unlit.material.as_standard().is_none());
}

#[test]
fn should_leave_non_mesh_nodes_alone() {
    let mut scene = scene();
    update_all_materials(&mut scene, 0.0);
    let group = scene.find_mut("group").expect("group exists");
    assert!(group.as_mesh().is_none());
    assert_eq!(group.get_children().len(), 1);
}

#[test]
fn should_find_nothing_for_unknown_names() {
    let mut scene = scene();
    assert!(scene.find_mut("missing").is_none());
    // A container is not a mesh
    assert!(scene.find_mesh_mut("group").is_none());
}

#[test]
fn should_compose_world_transforms() {
    let mut scene = Scene::new();
    let mut group = ContainerNode::new("group");
    group.set_local_transform(Instance::at(1.0, 2.0, 3.0).with_uniform_scale(2.0));
    group.add_child(Box::new(
        standard("child").with_transform(Instance::at(1.0, 0.0, 0.0)),
    ));
    scene.add(Box::new(group));

    scene.update_world_transforms();

    let child = scene.find_mut("child").expect("child exists");
    let world = child.get_world_transform();
    assert_eq!(world.position, Vector3::new(3.0, 2.0, 3.0));
    assert_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn should_keep_meshes_on_the_cpu_until_uploaded() {
    let scene = scene();
    assert!(scene.get_render().is_empty());
}

#[test]
fn should_build_hard_edged_boxes_and_planes() {
    let cube = Geometry::cuboid(1.0, 1.0, 1.0);
    assert_eq!(cube.vertex_count(), 24);
    assert_eq!(cube.triangle_count(), 12);

    let plane = Geometry::plane(8.0, 8.0);
    assert_eq!(plane.vertex_count(), 4);
    assert_eq!(plane.triangle_count(), 2);
    for vertex in &plane.vertices {
        assert_eq!(vertex.position[2], 0.0);
        assert_eq!(vertex.position[0].abs(), 4.0);
        assert_eq!(vertex.position[1].abs(), 4.0);
    }
    assert!(plane.uploaded().is_none());
}
