use realistic_render::gui::{DebugPanel, PanelKey};

#[derive(Default)]
struct State {
    intensity: f32,
    enabled: bool,
    choice: usize,
    changes: u32,
}

fn panel() -> DebugPanel<State> {
    let mut panel = DebugPanel::new("test");
    panel
        .add_slider("intensity", |s: &State| s.intensity, |s, v| s.intensity = v)
        .min(0.0)
        .max(10.0)
        .step(0.5)
        .on_change(|s| s.changes += 1);
    panel.add_toggle("enabled", |s: &State| s.enabled, |s, v| s.enabled = v);
    panel.add_options(
        "choice",
        &["a", "b", "c"],
        |s: &State| s.choice,
        |s, i| s.choice = i,
    );
    panel
}

#[test]
fn should_clamp_and_snap_slider_values() {
    let mut panel = panel();
    let mut state = State::default();

    assert_eq!(
        panel.set(&mut state, "intensity", 3.3).as_deref(),
        Some("intensity = 3.5")
    );
    assert_eq!(state.intensity, 3.5);

    panel.set(&mut state, "intensity", 42.0);
    assert_eq!(state.intensity, 10.0);

    panel.set(&mut state, "intensity", -1.0);
    assert_eq!(state.intensity, 0.0);
}

#[test]
fn should_fire_on_change_once_per_change() {
    let mut panel = panel();
    let mut state = State::default();

    panel.set(&mut state, "intensity", 2.0);
    assert_eq!(state.changes, 1);

    // Same value again is no change
    assert_eq!(panel.set(&mut state, "intensity", 2.0), None);
    assert_eq!(state.changes, 1);

    panel.handle_key(&mut state, PanelKey::Right, false);
    assert_eq!(state.intensity, 2.5);
    assert_eq!(state.changes, 2);
}

#[test]
fn should_step_ten_times_with_shift() {
    let mut panel = panel();
    let mut state = State::default();

    let change = panel.handle_key(&mut state, PanelKey::Right, true);
    assert_eq!(change.as_deref(), Some("intensity = 5.0"));

    panel.handle_key(&mut state, PanelKey::Right, true);
    panel.handle_key(&mut state, PanelKey::Right, true);
    assert_eq!(state.intensity, 10.0);

    // Already at the maximum
    assert_eq!(panel.handle_key(&mut state, PanelKey::Right, false), None);
    assert_eq!(state.changes, 2);

    panel.handle_key(&mut state, PanelKey::Left, false);
    assert_eq!(state.intensity, 9.5);
}

#[test]
fn should_select_controls_with_tab() {
    let mut panel = panel();
    let mut state = State::default();
    assert_eq!(panel.selected(), 0);

    panel.handle_key(&mut state, PanelKey::Tab, false);
    assert_eq!(panel.selected(), 1);
    panel.handle_key(&mut state, PanelKey::Tab, false);
    panel.handle_key(&mut state, PanelKey::Tab, false);
    assert_eq!(panel.selected(), 0, "selection wraps around");

    panel.handle_key(&mut state, PanelKey::Tab, true);
    assert_eq!(panel.selected(), 2, "shift tab goes backwards");
}

#[test]
fn should_flip_toggles() {
    let mut panel = panel();
    let mut state = State::default();
    panel.select(1);

    assert_eq!(
        panel.handle_key(&mut state, PanelKey::Space, false).as_deref(),
        Some("enabled = true")
    );
    assert!(state.enabled);
    panel.handle_key(&mut state, PanelKey::Left, false);
    assert!(!state.enabled);
}

#[test]
fn should_cycle_options() {
    let mut panel = panel();
    let mut state = State::default();
    panel.select(2);

    assert_eq!(
        panel.handle_key(&mut state, PanelKey::Space, false).as_deref(),
        Some("choice = b")
    );
    panel.handle_key(&mut state, PanelKey::Space, false);
    panel.handle_key(&mut state, PanelKey::Space, false);
    assert_eq!(state.choice, 0, "cycling wraps around");

    panel.handle_key(&mut state, PanelKey::Left, false);
    assert_eq!(state.choice, 2);
}

#[test]
fn should_leave_sliders_alone_on_space() {
    let mut panel = panel();
    let mut state = State::default();
    assert_eq!(panel.handle_key(&mut state, PanelKey::Space, false), None);
    assert_eq!(state.intensity, 0.0);
}

#[test]
fn should_ignore_keys_while_hidden() {
    let mut panel = panel();
    let mut state = State::default();

    panel.handle_key(&mut state, PanelKey::Hide, false);
    assert!(!panel.is_visible());
    assert_eq!(panel.handle_key(&mut state, PanelKey::Right, false), None);
    assert_eq!(state.intensity, 0.0);
    assert!(panel.quads(&state, 800.0, 600.0, 1.0).is_empty());

    panel.handle_key(&mut state, PanelKey::Hide, false);
    assert!(panel.is_visible());
}

#[test]
fn should_draw_a_row_per_control_and_fill_bars() {
    let panel = panel();
    let mut state = State::default();

    // Empty slider, off toggle and the first option draw no fill
    assert_eq!(panel.quads(&state, 800.0, 600.0, 1.0).len(), 3);

    state.intensity = 5.0;
    state.enabled = true;
    state.choice = 1;
    let quads = panel.quads(&state, 800.0, 600.0, 1.0);
    assert_eq!(quads.len(), 6);

    let (row, fill) = (quads[0], quads[1]);
    assert!(row.x + row.width <= 800.0);
    assert!(fill.width < row.width);
    assert!((fill.width - (row.width - 6.0) * 0.5).abs() < 1e-3);
}

#[test]
fn should_describe_controls() {
    let panel = panel();
    let state = State::default();
    assert_eq!(panel.len(), 3);
    assert_eq!(panel.describe(1, &state).as_deref(), Some("enabled = false"));
    assert_eq!(panel.describe(3, &state), None);
    assert_eq!(panel.window_title("enabled = true"), "test | enabled = true");
    assert!(panel.control("choice").is_some());
    assert!(panel.control("missing").is_none());
}
