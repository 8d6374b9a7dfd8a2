use instant::{Duration, Instant};
use realistic_render::{
    data_structures::scene_graph::SceneNode,
    experience::{Experience, PLACEHOLDER, Time},
    render::{ShadowMapType, Sizes, ToneMapping},
};

#[test]
fn should_hold_one_mesh_and_the_sun() {
    let experience = Experience::new(Sizes::default());

    assert_eq!(experience.scene.children.len(), 1);
    assert_eq!(experience.scene.mesh_count(), 1);
    assert_eq!(experience.scene.lights.len(), 1);
    assert_eq!(experience.scene.object_count(), 2);
    assert_eq!(experience.scene.children[0].name(), PLACEHOLDER);

    let sun = experience
        .world
        .environment
        .sun(&experience.scene)
        .expect("the environment adds a sun");
    assert_eq!(sun.intensity, 4.0);
    assert!(sun.cast_shadow);
    assert_eq!(sun.shadow.camera_far, 15.0);
    assert_eq!(sun.shadow.map_size, 1024);
    assert_eq!(sun.shadow.normal_bias, 0.05);
}

#[test]
fn should_use_a_default_standard_material_for_the_placeholder() {
    let mut experience = Experience::default();
    let mesh = experience
        .scene
        .find_mesh_mut(PLACEHOLDER)
        .expect("placeholder mesh");
    let material = mesh.material.as_standard().expect("standard material");
    assert_eq!(material.color, [1.0, 1.0, 1.0, 1.0]);
    assert_eq!(material.roughness, 1.0);
    assert_eq!(material.metalness, 0.0);
    assert_eq!(mesh.geometry.vertex_count(), 24);
}

#[test]
fn should_configure_camera_and_renderer() {
    let experience = Experience::new(Sizes {
        width: 1000,
        height: 500,
        pixel_ratio: 1.0,
    });
    assert_eq!(experience.camera.fov, 35.0);
    assert_eq!(experience.camera.aspect, 2.0);
    assert_eq!(experience.camera.position, cgmath::Vector3::new(6.0, 4.0, 8.0));
    assert!(experience.controls.enable_damping);

    let settings = &experience.settings;
    assert!(settings.shadow_map_enabled);
    assert_eq!(settings.shadow_map_type, ShadowMapType::PcfSoft);
    assert_eq!(settings.tone_mapping, ToneMapping::Cineon);
    assert_eq!(settings.tone_mapping_exposure, 1.75);
    assert!(settings.clear_colour.r > settings.clear_colour.g);
}

#[test]
fn should_update_the_aspect_on_resize() {
    let mut experience = Experience::default();
    let sizes = Sizes::from_physical([1280, 720], 1.0).expect("non zero size");

    experience.resize(sizes);

    assert_eq!(experience.sizes, sizes);
    assert!((experience.camera.aspect - 1280.0 / 720.0).abs() < f32::EPSILON);
}

#[test]
fn should_not_move_the_camera_on_idle_frames() {
    let mut experience = Experience::default();
    let before = experience.camera.position;
    experience.update();
    let moved = experience.camera.position - before;
    assert!(moved.x.abs() < 1e-4 && moved.y.abs() < 1e-4 && moved.z.abs() < 1e-4);
}

#[test]
fn should_start_with_a_sixteen_millisecond_delta() {
    let start = Instant::now();
    let time = Time::starting_at(start);
    assert_eq!(time.delta, Duration::from_millis(16));
    assert_eq!(time.elapsed, Duration::ZERO);
    assert_eq!(time.current, start);
}

#[test]
fn should_measure_time_between_ticks() {
    let start = Instant::now();
    let mut time = Time::starting_at(start);

    time.tick_at(start + Duration::from_millis(100));
    assert_eq!(time.delta, Duration::from_millis(100));
    assert_eq!(time.elapsed, Duration::from_millis(100));

    time.tick_at(start + Duration::from_millis(130));
    assert_eq!(time.delta, Duration::from_millis(30));
    assert_eq!(time.elapsed, Duration::from_millis(130));

    // Clocks going backwards count as no time passing
    time.tick_at(start);
    assert_eq!(time.delta, Duration::ZERO);
    assert_eq!(time.elapsed, Duration::from_millis(130));
}
