//! A keyboard driven debug panel for tweaking values at runtime.
//!
//! Controls are bound to a state `S` through getter/setter closures, the panel
//! never owns the values it edits:
//!
//! ```ignore
//! panel
//!     .add_slider("envMapIntensity", |s: &State| s.global.env_map_intensity, |s, v| {
//!         s.global.env_map_intensity = v
//!     })
//!     .min(0.0)
//!     .max(10.0)
//!     .step(0.001)
//!     .on_change(|s| { update_all_materials(&mut s.scene, s.global.env_map_intensity); });
//! ```
//!
//! `Tab` / `Shift+Tab` select a control, `←` / `→` step the selected value (ten
//! steps at once with `Shift`), `Space` flips toggles and cycles options and `H`
//! hides the panel. Every change is logged and reported back as `name = value`.

use winit::{
    event::{ElementState, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::pipelines::gui::GuiQuad;

type Getter<S, T> = Box<dyn Fn(&S) -> T>;
type Setter<S, T> = Box<dyn Fn(&mut S, T)>;

enum ControlKind<S> {
    Slider {
        get: Getter<S, f32>,
        set: Setter<S, f32>,
        min: f32,
        max: f32,
        step: f32,
    },
    Toggle {
        get: Getter<S, bool>,
        set: Setter<S, bool>,
    },
    Options {
        options: Vec<String>,
        get: Getter<S, usize>,
        set: Setter<S, usize>,
    },
}

/// One row of the panel.
pub struct Control<S> {
    name: String,
    kind: ControlKind<S>,
    on_change: Option<Box<dyn FnMut(&mut S)>>,
}

impl<S> Control<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower bound of a slider. Ignored by other controls.
    pub fn min(&mut self, value: f32) -> &mut Self {
        if let ControlKind::Slider { min, .. } = &mut self.kind {
            *min = value;
        }
        self
    }

    /// Upper bound of a slider. Ignored by other controls.
    pub fn max(&mut self, value: f32) -> &mut Self {
        if let ControlKind::Slider { max, .. } = &mut self.kind {
            *max = value;
        }
        self
    }

    /// Granularity of a slider. Ignored by other controls.
    pub fn step(&mut self, value: f32) -> &mut Self {
        if let ControlKind::Slider { step, .. } = &mut self.kind {
            *step = value.abs();
        }
        self
    }

    /// Called after every change made through the panel.
    pub fn on_change(&mut self, callback: impl FnMut(&mut S) + 'static) -> &mut Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Clamps `value` to `[min, max]` and snaps it to the closest step.
    fn constrain(min: f32, max: f32, step: f32, value: f32) -> f32 {
        let snapped = if step > 0.0 && min.is_finite() {
            min + ((value - min) / step).round() * step
        } else {
            value
        };
        snapped.clamp(min.min(max), max.max(min))
    }

    /// Position of the current value between the control's extremes, `0.0..=1.0`.
    pub fn normalized(&self, state: &S) -> f32 {
        match &self.kind {
            ControlKind::Slider { get, min, max, .. } => {
                let range = max - min;
                if range <= 0.0 {
                    0.0
                } else {
                    ((get(state) - min) / range).clamp(0.0, 1.0)
                }
            }
            ControlKind::Toggle { get, .. } => {
                if get(state) {
                    1.0
                } else {
                    0.0
                }
            }
            ControlKind::Options { options, get, .. } => {
                if options.len() < 2 {
                    1.0
                } else {
                    get(state).min(options.len() - 1) as f32 / (options.len() - 1) as f32
                }
            }
        }
    }

    /// Current value as shown to the user.
    pub fn display(&self, state: &S) -> String {
        match &self.kind {
            ControlKind::Slider { get, step, .. } => {
                let decimals = if *step > 0.0 {
                    (-step.log10()).ceil().max(0.0) as usize
                } else {
                    3
                };
                format!("{:.*}", decimals, get(state))
            }
            ControlKind::Toggle { get, .. } => get(state).to_string(),
            ControlKind::Options { options, get, .. } => options
                .get(get(state))
                .cloned()
                .unwrap_or_else(|| "?".to_string()),
        }
    }

    /// Moves a slider by `steps` steps or an option by `steps` entries.
    /// Toggles flip regardless of the direction.
    fn step_by(&mut self, state: &mut S, steps: i32) -> bool {
        let changed = match &self.kind {
            ControlKind::Slider {
                get,
                set,
                min,
                max,
                step,
            } => {
                let current = get(state);
                let next = Self::constrain(*min, *max, *step, current + *step * steps as f32);
                if next != current {
                    set(state, next);
                }
                next != current
            }
            ControlKind::Toggle { get, set } => {
                let next = !get(state);
                set(state, next);
                true
            }
            ControlKind::Options { options, get, set } => {
                if options.is_empty() {
                    false
                } else {
                    let len = options.len() as i64;
                    let current = get(state) as i64;
                    let next = (current + steps as i64).rem_euclid(len) as usize;
                    set(state, next);
                    next as i64 != current
                }
            }
        };
        if changed {
            self.fire(state);
        }
        changed
    }

    /// Sets a slider to `value` (clamped and snapped). Returns whether it changed.
    fn set_value(&mut self, state: &mut S, value: f32) -> bool {
        let changed = match &self.kind {
            ControlKind::Slider {
                get,
                set,
                min,
                max,
                step,
            } => {
                let next = Self::constrain(*min, *max, *step, value);
                let changed = next != get(state);
                set(state, next);
                changed
            }
            ControlKind::Toggle { get, set } => {
                let next = value != 0.0;
                let changed = next != get(state);
                set(state, next);
                changed
            }
            ControlKind::Options { options, get, set } => {
                if options.is_empty() {
                    false
                } else {
                    let next = (value.max(0.0) as usize).min(options.len() - 1);
                    let changed = next != get(state);
                    set(state, next);
                    changed
                }
            }
        };
        if changed {
            self.fire(state);
        }
        changed
    }

    fn fire(&mut self, state: &mut S) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(state);
        }
    }
}

/// Keys the panel reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelKey {
    Tab,
    Left,
    Right,
    Space,
    Hide,
}

impl PanelKey {
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Named(NamedKey::Tab) => Some(PanelKey::Tab),
            Key::Named(NamedKey::ArrowLeft) => Some(PanelKey::Left),
            Key::Named(NamedKey::ArrowRight) => Some(PanelKey::Right),
            Key::Named(NamedKey::Space) => Some(PanelKey::Space),
            Key::Character(c) if c.eq_ignore_ascii_case("h") => Some(PanelKey::Hide),
            _ => None,
        }
    }
}

const ROW_WIDTH: f32 = 240.0;
const ROW_HEIGHT: f32 = 18.0;
const ROW_GAP: f32 = 4.0;
const MARGIN: f32 = 12.0;
const INSET: f32 = 3.0;
const ROW_COLOUR: [f32; 4] = [0.1, 0.1, 0.1, 0.75];
const SELECTED_COLOUR: [f32; 4] = [0.25, 0.25, 0.3, 0.9];
const FILL_COLOUR: [f32; 4] = [0.18, 0.62, 0.9, 1.0];
const SELECTED_FILL_COLOUR: [f32; 4] = [0.98, 0.78, 0.2, 1.0];

/// An ordered list of controls bound to a state `S`.
pub struct DebugPanel<S> {
    title: String,
    controls: Vec<Control<S>>,
    selected: usize,
    visible: bool,
    shift: bool,
}

impl<S> std::fmt::Debug for DebugPanel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugPanel")
            .field("title", &self.title)
            .field(
                "controls",
                &self.controls.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("selected", &self.selected)
            .field("visible", &self.visible)
            .finish()
    }
}

impl<S> DebugPanel<S> {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            controls: Vec::new(),
            selected: 0,
            visible: true,
            shift: false,
        }
    }

    fn push(&mut self, name: &str, kind: ControlKind<S>) -> &mut Control<S> {
        self.controls.push(Control {
            name: name.to_string(),
            kind,
            on_change: None,
        });
        let last = self.controls.len() - 1;
        &mut self.controls[last]
    }

    /// A numeric control, `0.0..=1.0` in steps of `0.01` until configured otherwise.
    pub fn add_slider(
        &mut self,
        name: &str,
        get: impl Fn(&S) -> f32 + 'static,
        set: impl Fn(&mut S, f32) + 'static,
    ) -> &mut Control<S> {
        self.push(
            name,
            ControlKind::Slider {
                get: Box::new(get),
                set: Box::new(set),
                min: 0.0,
                max: 1.0,
                step: 0.01,
            },
        )
    }

    pub fn add_toggle(
        &mut self,
        name: &str,
        get: impl Fn(&S) -> bool + 'static,
        set: impl Fn(&mut S, bool) + 'static,
    ) -> &mut Control<S> {
        self.push(
            name,
            ControlKind::Toggle {
                get: Box::new(get),
                set: Box::new(set),
            },
        )
    }

    /// A choice between `options`, bound by index.
    pub fn add_options(
        &mut self,
        name: &str,
        options: &[&str],
        get: impl Fn(&S) -> usize + 'static,
        set: impl Fn(&mut S, usize) + 'static,
    ) -> &mut Control<S> {
        self.push(
            name,
            ControlKind::Options {
                options: options.iter().map(|o| o.to_string()).collect(),
                get: Box::new(get),
                set: Box::new(set),
            },
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn control(&self, name: &str) -> Option<&Control<S>> {
        self.controls.iter().find(|c| c.name == name)
    }

    pub fn select(&mut self, index: usize) {
        if !self.controls.is_empty() {
            self.selected = index.min(self.controls.len() - 1);
        }
    }

    /// `name = value` of a control.
    pub fn describe(&self, index: usize, state: &S) -> Option<String> {
        self.controls
            .get(index)
            .map(|c| format!("{} = {}", c.name, c.display(state)))
    }

    /// Window title showing the last change.
    pub fn window_title(&self, change: &str) -> String {
        format!("{} | {}", self.title, change)
    }

    fn changed(&self, index: usize, state: &S) -> Option<String> {
        let description = self.describe(index, state)?;
        log::info!("{description}");
        Some(description)
    }

    /// Sets the named control to `value`, like dragging it would.
    ///
    /// Returns `name = value` if the value changed.
    pub fn set(&mut self, state: &mut S, name: &str, value: f32) -> Option<String> {
        let index = self.controls.iter().position(|c| c.name == name)?;
        if self.controls[index].set_value(state, value) {
            self.changed(index, state)
        } else {
            None
        }
    }

    /// Applies a key press. Returns `name = value` if a value changed.
    pub fn handle_key(&mut self, state: &mut S, key: PanelKey, shift: bool) -> Option<String> {
        if key == PanelKey::Hide {
            self.visible = !self.visible;
            log::debug!("debug panel visible: {}", self.visible);
            return None;
        }
        if !self.visible || self.controls.is_empty() {
            return None;
        }
        let len = self.controls.len();
        let steps = if shift { 10 } else { 1 };
        let index = self.selected;
        let changed = match key {
            PanelKey::Tab => {
                self.selected = if shift {
                    (self.selected + len - 1) % len
                } else {
                    (self.selected + 1) % len
                };
                false
            }
            PanelKey::Left => self.controls[index].step_by(state, -steps),
            PanelKey::Right => self.controls[index].step_by(state, steps),
            PanelKey::Space => match self.controls[index].kind {
                ControlKind::Slider { .. } => false,
                _ => self.controls[index].step_by(state, 1),
            },
            PanelKey::Hide => false,
        };
        if changed {
            self.changed(index, state)
        } else {
            None
        }
    }

    /// Feeds a winit event to the panel. Returns `name = value` if a value changed.
    pub fn handle_window_event(&mut self, state: &mut S, event: &WindowEvent) -> Option<String> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift = modifiers.state().shift_key();
                None
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                let key = PanelKey::from_key(&event.logical_key)?;
                self.handle_key(state, key, self.shift)
            }
            _ => None,
        }
    }

    /// Overlay quads: one row per control in the top right corner of a
    /// `width` x `height` pixel target, scaled by `scale`.
    pub fn quads(&self, state: &S, width: f32, height: f32, scale: f32) -> Vec<GuiQuad> {
        if !self.visible {
            return Vec::new();
        }
        let row_width = (ROW_WIDTH * scale).min(width);
        let row_height = ROW_HEIGHT * scale;
        let x = (width - row_width - MARGIN * scale).max(0.0);
        let mut quads = Vec::with_capacity(self.controls.len() * 2);
        for (i, control) in self.controls.iter().enumerate() {
            let y = MARGIN * scale + i as f32 * (row_height + ROW_GAP * scale);
            if y + row_height > height {
                break;
            }
            let selected = i == self.selected;
            let background = if selected { SELECTED_COLOUR } else { ROW_COLOUR };
            quads.push(GuiQuad::new(x, y, row_width, row_height, background));

            let inset = INSET * scale;
            let fill = (row_width - 2.0 * inset) * control.normalized(state);
            if fill > 0.0 {
                let colour = if selected { SELECTED_FILL_COLOUR } else { FILL_COLOUR };
                quads.push(GuiQuad::new(
                    x + inset,
                    y + inset,
                    fill,
                    row_height - 2.0 * inset,
                    colour,
                ));
            }
        }
        quads
    }
}
