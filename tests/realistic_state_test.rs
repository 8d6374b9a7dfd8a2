use std::sync::Arc;

use cgmath::Vector3;
use realistic_render::{
    data_structures::material::Side,
    demos::{
        RealisticState,
        realistic::{FLOOR, WALL, debug_panel},
    },
    gui::PanelKey,
    render::{ShadowMapType, Sizes, ToneMapping},
};

#[test]
fn should_build_the_room_before_anything_is_loaded() {
    let mut state = RealisticState::default();

    assert_eq!(state.scene.mesh_count(), 2);
    assert_eq!(state.scene.lights.len(), 1);
    assert!(state.scene.background.is_none());
    assert!(state.scene.environment.is_none());

    let floor = state.scene.find_mesh_mut(FLOOR).expect("floor").geometry.clone();
    let wall = state.scene.find_mesh_mut(WALL).expect("wall").geometry.clone();
    assert!(Arc::ptr_eq(&floor, &wall), "floor and wall share one plane");

    for name in [FLOOR, WALL] {
        let mesh = state.scene.find_mesh_mut(name).expect("mesh");
        assert_eq!(mesh.material.side(), Side::Double);
    }
}

#[test]
fn should_set_up_the_sun() {
    let state = RealisticState::default();
    let light = state.light().expect("sun");
    assert_eq!(light.intensity, 2.0);
    assert_eq!(light.color, [1.0, 1.0, 1.0]);
    assert_eq!(light.position, Vector3::new(-4.0, 6.5, 2.5));
    assert_eq!(light.target, Vector3::new(0.0, 4.0, 0.0));
    assert!(light.cast_shadow);
    assert_eq!(light.shadow.camera_far, 15.0);
    assert_eq!(light.shadow.map_size, 512);
    assert_eq!(light.shadow.normal_bias, -0.004);
    assert_eq!(light.shadow.bias, -0.015);
}

#[test]
fn should_configure_camera_and_renderer() {
    let state = RealisticState::default();
    assert_eq!(state.camera.fov, 75.0);
    assert_eq!(state.camera.position, Vector3::new(4.0, 5.0, 4.0));
    assert_eq!(state.controls.target, Vector3::new(0.0, 3.5, 0.0));
    assert!(state.controls.enable_damping);

    assert!(state.settings.shadow_map_enabled);
    assert_eq!(state.settings.shadow_map_type, ShadowMapType::PcfSoft);
    assert_eq!(state.settings.tone_mapping, ToneMapping::Reinhard);
    assert_eq!(state.settings.tone_mapping_exposure, 3.0);
    assert!(!state.settings.use_legacy_lights);
    assert_eq!(state.global.env_map_intensity, 1.0);
}

#[test]
fn should_update_the_aspect_on_resize() {
    let mut state = RealisticState::default();
    state.resize(Sizes {
        width: 1200,
        height: 400,
        pixel_ratio: 2.0,
    });
    assert_eq!(state.camera.aspect, 3.0);
}

#[test]
fn should_list_the_controls_in_order() {
    let panel = debug_panel();
    let state = RealisticState::default();
    let names: Vec<_> = (0..panel.len())
        .filter_map(|i| panel.describe(i, &state))
        .map(|d| d.split(" = ").next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "envMapIntensity",
            "Light Intensity",
            "Light X",
            "Light Y",
            "Light Z",
            "castShadow",
            "normalBias",
            "bias",
            "toneMapping",
            "toneMappingExposure",
            "useLegacyLights",
        ]
    );
    assert_eq!(
        panel.describe(8, &state).as_deref(),
        Some("toneMapping = Reinhard")
    );
}

#[test]
fn should_push_env_map_intensity_to_every_material() {
    let mut panel = debug_panel();
    let mut state = RealisticState::default();

    let change = panel.set(&mut state, "envMapIntensity", 4.2);
    assert_eq!(change.as_deref(), Some("envMapIntensity = 4.200"));

    for name in [FLOOR, WALL] {
        let mesh = state.scene.find_mesh_mut(name).expect("mesh");
        assert!(mesh.cast_shadow && mesh.receive_shadow);
        let material = mesh.material.as_standard().expect("standard material");
        assert!((material.env_map_intensity - 4.2).abs() < 1e-4);
    }
}

#[test]
fn should_move_the_light() {
    let mut panel = debug_panel();
    let mut state = RealisticState::default();

    panel.set(&mut state, "Light Y", 99.0);
    panel.set(&mut state, "Light Z", -1.5);
    panel.set(&mut state, "Light Intensity", 5.0);
    panel.set(&mut state, "castShadow", 0.0);
    panel.set(&mut state, "bias", -0.02);

    let light = state.light().expect("sun");
    assert_eq!(light.position.x, -4.0);
    assert_eq!(light.position.y, 10.0);
    assert!((light.position.z + 1.5).abs() < 1e-4);
    assert!((light.intensity - 5.0).abs() < 1e-4);
    assert!(!light.cast_shadow);
    assert!((light.shadow.bias + 0.02).abs() < 1e-4);
}

#[test]
fn should_switch_tone_mapping_from_the_keyboard() {
    let mut panel = debug_panel();
    let mut state = RealisticState::default();
    panel.select(8);

    let change = panel.handle_key(&mut state, PanelKey::Space, false);
    assert_eq!(change.as_deref(), Some("toneMapping = Cineon"));
    assert_eq!(state.settings.tone_mapping, ToneMapping::Cineon);

    panel.handle_key(&mut state, PanelKey::Right, false);
    panel.handle_key(&mut state, PanelKey::Right, false);
    assert_eq!(state.settings.tone_mapping, ToneMapping::No);

    panel.select(10);
    panel.handle_key(&mut state, PanelKey::Space, false);
    assert!(state.settings.use_legacy_lights);
}
