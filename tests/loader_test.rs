use std::sync::{Arc, Once};

use realistic_render::{
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene_graph::{MeshNode, SceneNode},
    },
    demos::{
        RealisticState,
        realistic::{ENVIRONMENT_MAP, FLOOR, HAMBURGER},
    },
    resources::{ASSET_ROOT_ENV, load_binary},
};

/// Points the asset root at `tests/fixtures` for every test in this file.
fn use_fixtures() {
    static FIXTURES: Once = Once::new();
    FIXTURES.call_once(|| unsafe {
        std::env::set_var(
            ASSET_ROOT_ENV,
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"),
        );
    });
}

#[tokio::test]
async fn should_fail_to_load_missing_files() {
    use_fixtures();
    let err = load_binary(HAMBURGER).await.expect_err("no hamburger in the fixtures");
    assert!(err.to_string().contains("hamburger.glb"), "{err}");

    let bytes = load_binary("/sky.hdr").await.expect("fixture exists");
    assert!(bytes.starts_with(b"#?RADIANCE"));
}

#[tokio::test]
async fn should_leave_the_scene_untouched_when_loads_fail() {
    use_fixtures();
    let mut state = RealisticState::default();
    let objects = state.scene.object_count();

    state.apply_environment(Err(load_binary(ENVIRONMENT_MAP).await.expect_err("missing")));
    state.apply_hamburger(Err(load_binary(HAMBURGER).await.expect_err("missing")));
    state.apply_surface(FLOOR, Err(load_binary("/floor.jpg").await.expect_err("missing")));

    assert_eq!(state.scene.object_count(), objects);
    assert_eq!(state.scene.mesh_count(), 2);
    assert!(state.scene.background.is_none());
    assert!(state.scene.environment.is_none());
    let floor = state.scene.find_mesh_mut(FLOOR).expect("floor");
    let material = floor.material.as_standard().expect("standard material");
    assert!(material.map.is_none() && material.normal_map.is_none());
}

#[test]
fn should_place_a_loaded_model_and_update_its_materials() {
    let mut state = RealisticState::default();
    state.global.env_map_intensity = 3.0;
    let model = MeshNode::new(
        "bun",
        Arc::new(Geometry::cuboid(1.0, 1.0, 1.0)),
        Material::default(),
    );

    state.apply_hamburger(Ok(Box::new(model)));

    assert_eq!(state.scene.object_count(), 3);
    let bun = state.scene.find_mesh_mut("bun").expect("model was added");
    assert!(bun.cast_shadow && bun.receive_shadow);
    assert_eq!(bun.get_local_transform().position, cgmath::Vector3::new(0.0, 2.5, 0.0));
    assert_eq!(bun.get_local_transform().scale, cgmath::Vector3::new(0.4, 0.4, 0.4));
    let material = bun.material.as_standard().expect("standard material");
    assert_eq!(material.env_map_intensity, 3.0);
}

#[cfg(feature = "integration-tests")]
async fn device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await
        .expect("no graphics adapter");
    adapter
        .request_device(&wgpu::DeviceDescriptor::default())
        .await
        .expect("no device")
}

#[tokio::test]
#[cfg(feature = "integration-tests")]
async fn should_load_gltf_without_normals_or_uvs() {
    use cgmath::{InnerSpace, Vector3};
    use realistic_render::{
        data_structures::{material::Side, scene_graph::Scene},
        resources::GltfLoader,
    };

    use_fixtures();
    let (device, queue) = device().await;
    let model = GltfLoader::new(&device, &queue)
        .load("/triangles.glb")
        .await
        .expect("fixture loads");

    let mut scene = Scene::new();
    scene.add(model);
    assert_eq!(scene.mesh_count(), 2);

    let lit = scene.find_mesh_mut("lit").expect("lit triangle");
    assert_eq!(lit.geometry.vertex_count(), 3);
    for v in &lit.geometry.vertices {
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        let t = Vector3::from(v.tangent);
        assert!((t.magnitude() - 1.0).abs() < 1e-5, "tangent {t:?}");
        assert!(t.dot(Vector3::from(v.normal)).abs() < 1e-5);
    }
    let material = lit.material.as_standard().expect("standard material");
    assert_eq!(material.color, [1.0, 0.5, 0.25, 1.0]);
    assert_eq!(material.roughness, 0.5);

    let unlit = scene.find_mesh_mut("unlit").expect("unlit triangle");
    assert!(matches!(&unlit.material, Material::Basic(basic) if basic.side == Side::Double));
    assert_eq!(unlit.get_local_transform().position, Vector3::new(2.0, 0.0, 0.0));

    // Only the lit triangle takes the environment settings
    assert_eq!(
        realistic_render::data_structures::scene_graph::update_all_materials(&mut scene, 2.0),
        1
    );
}

#[tokio::test]
#[cfg(feature = "integration-tests")]
async fn should_reject_gltf_with_indices_past_the_vertices() {
    use realistic_render::resources::GltfLoader;

    use_fixtures();
    let (device, queue) = device().await;
    let err = GltfLoader::new(&device, &queue)
        .load("/broken_indices.glb")
        .await
        .expect_err("index 7 of 3 vertices");
    assert!(format!("{err:#}").contains("index 7"), "{err:#}");
}

#[tokio::test]
#[cfg(feature = "integration-tests")]
async fn should_load_panoramas_and_images_with_their_mapping() {
    use realistic_render::{
        data_structures::texture::{ColorSpace, Mapping},
        resources::{RgbeLoader, TextureLoader},
    };

    use_fixtures();
    let (device, queue) = device().await;

    let sky = RgbeLoader::new(&device, &queue)
        .load("/sky.hdr")
        .await
        .expect("fixture loads");
    assert_eq!(sky.mapping, Mapping::EquirectangularReflection);
    assert_eq!(sky.mip_level_count, 3);

    let red = TextureLoader::new(&device, &queue)
        .load("/red.png", ColorSpace::Srgb)
        .await
        .expect("fixture loads");
    assert_eq!(red.mapping, Mapping::Uv);
    assert_eq!(red.mip_level_count, 2);
}
