use cgmath::{InnerSpace, Vector3, Vector4};
use realistic_render::{
    camera::{CameraUniform, OrbitControls, PerspectiveCamera},
    render::Sizes,
};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, ElementState, MouseButton, WindowEvent},
};

fn camera_and_controls() -> (PerspectiveCamera, OrbitControls) {
    let mut camera = PerspectiveCamera::new(75.0, 4.0 / 3.0, 0.1, 100.0);
    camera.position = Vector3::new(4.0, 5.0, 4.0);
    camera.look_at(Vector3::new(0.0, 3.5, 0.0));
    let mut controls = OrbitControls::new(&camera);
    controls.enable_damping = true;
    controls.set_viewport_height(600);
    (camera, controls)
}

fn device() -> DeviceId {
    // SAFETY: only compared against other dummy ids, never passed to the platform.
    unsafe { DeviceId::dummy() }
}

fn press(button: MouseButton, state: ElementState) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: device(),
        state,
        button,
    }
}

fn cursor(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: device(),
        position: PhysicalPosition::new(x, y),
    }
}

fn drag(controls: &mut OrbitControls, from: (f64, f64), to: (f64, f64)) {
    controls.handle_window_event(&cursor(from.0, from.1));
    assert!(controls.handle_window_event(&press(MouseButton::Left, ElementState::Pressed)));
    assert!(controls.handle_window_event(&cursor(to.0, to.1)));
    controls.handle_window_event(&press(MouseButton::Left, ElementState::Released));
}

#[test]
fn should_not_move_without_input() {
    let (mut camera, mut controls) = camera_and_controls();
    let before = camera.position;

    assert!(!controls.update(&mut camera));
    assert!((camera.position - before).magnitude() < 1e-4);
    assert_eq!(camera.target, Vector3::new(0.0, 3.5, 0.0));
}

#[test]
fn should_ignore_cursor_moves_without_a_pressed_button() {
    let (mut camera, mut controls) = camera_and_controls();
    assert!(!controls.handle_window_event(&cursor(10.0, 10.0)));
    assert!(!controls.handle_window_event(&cursor(300.0, 10.0)));
    assert!(!controls.update(&mut camera));
}

#[test]
fn should_converge_with_damping() {
    let (mut camera, mut controls) = camera_and_controls();
    let radius = (camera.position - controls.target).magnitude();
    drag(&mut controls, (100.0, 100.0), (250.0, 100.0));

    assert!(controls.update(&mut camera), "a drag should move the camera");

    let mut frames = 0;
    while controls.update(&mut camera) {
        frames += 1;
        assert!(frames < 10_000, "damping never settled");
    }
    // The glide takes more than a single frame
    assert!(frames > 10);

    let settled = camera.position;
    assert!(!controls.update(&mut camera));
    assert!((camera.position - settled).magnitude() < 1e-3);
    assert!(((camera.position - controls.target).magnitude() - radius).abs() < 1e-3);
}

#[test]
fn should_apply_everything_at_once_without_damping() {
    let (mut camera, mut controls) = camera_and_controls();
    controls.enable_damping = false;
    drag(&mut controls, (100.0, 100.0), (250.0, 100.0));

    assert!(controls.update(&mut camera));
    assert!(!controls.update(&mut camera));
}

#[test]
fn should_zoom_towards_the_target() {
    let (mut camera, mut controls) = camera_and_controls();
    let before = (camera.position - controls.target).magnitude();

    controls.zoom(1.0);
    controls.update(&mut camera);
    let closer = (camera.position - controls.target).magnitude();
    assert!((closer - before * 0.95).abs() < 1e-4);

    controls.zoom(-1.0);
    controls.update(&mut camera);
    let back = (camera.position - controls.target).magnitude();
    assert!((back - before).abs() < 1e-4);
}

#[test]
fn should_not_flip_over_the_poles() {
    let (mut camera, mut controls) = camera_and_controls();
    controls.enable_damping = false;
    drag(&mut controls, (100.0, 0.0), (100.0, 100_000.0));
    controls.update(&mut camera);

    let offset = camera.position - controls.target;
    let radius = offset.magnitude();
    assert!(offset.y.abs() <= radius);
    assert!(offset.y > 0.0, "dragging down should orbit above the target");
}

#[test]
fn should_project_the_target_to_the_centre() {
    let (camera, _) = camera_and_controls();
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera);

    let clip = camera.view_proj() * Vector4::new(0.0, 3.5, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1e-4);
    assert!(ndc.y.abs() < 1e-4);
    assert!((0.0..=1.0).contains(&ndc.z));
    assert_eq!(uniform.view_position, [4.0, 5.0, 4.0, 1.0]);
}

#[test]
fn should_follow_resizes() {
    let (mut camera, _) = camera_and_controls();
    let sizes = Sizes::from_physical([1920, 1080], 1.0).expect("non zero size");

    camera.set_aspect(sizes.aspect());
    camera.update_projection_matrix();

    assert!((camera.aspect - 1920.0 / 1080.0).abs() < f32::EPSILON);
    let projection = camera.projection_matrix();
    let wide = PerspectiveCamera::new(75.0, 1920.0 / 1080.0, 0.1, 100.0);
    assert_eq!(projection, wide.projection_matrix());
}
