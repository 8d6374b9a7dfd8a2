//! Perspective camera, its GPU uniform and mouse driven orbit controls.

use std::f32::consts::PI;

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector2, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const EPS: f32 = 0.000001;

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    projection: Matrix4<f32>,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vector3::zero(),
            target: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
            projection: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Only stores the aspect; call [`Self::update_projection_matrix`] afterwards.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(Deg(self.fov), self.aspect, self.near, self.far);
    }

    pub fn look_at(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }
}

// We need this for Rust to store our data correctly for the shaders
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Unprojects clip space positions, used to find the sky direction per pixel.
    pub inv_view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            inv_view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &PerspectiveCamera) {
        self.view_position = camera.position.extend(1.0).into();
        let view_proj = camera.view_proj();
        self.view_proj = view_proj.into();
        self.inv_view_proj = view_proj
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Orbits a camera around `target`: left drag rotates, right drag pans and the
/// wheel zooms.
///
/// Input only accumulates deltas; [`OrbitControls::update`] applies them once
/// per frame. With damping enabled each update applies `damping_factor` of the
/// pending motion and keeps the rest, so the camera glides to a stop.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vector3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pending (theta, phi) rotation in radians.
    spherical_delta: Vector2<f32>,
    scale: f32,
    pan_offset: Vector3<f32>,
    pending_pan: Vector2<f32>,
    rotating: bool,
    panning: bool,
    cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Vector2::zero(),
            scale: 1.0,
            pan_offset: Vector3::zero(),
            pending_pan: Vector2::zero(),
            rotating: false,
            panning: false,
            cursor: None,
            viewport_height: 1.0,
        }
    }

    /// Height in physical pixels; a full-height drag rotates by one turn.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    pub fn is_dragging(&self) -> bool {
        self.rotating || self.panning
    }

    /// Returns `true` when the event was used by the controls.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right | MouseButton::Middle => self.panning = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.cursor.replace(*position);
                match previous {
                    Some(previous) if self.is_dragging() => {
                        self.handle_mouse_motion(position.x - previous.x, position.y - previous.y);
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 50.0,
                };
                self.zoom(scroll);
                true
            }
            _ => false,
        }
    }

    /// Feeds a mouse movement in pixels into whichever drag is active.
    pub fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        let (dx, dy) = (dx as f32, dy as f32);
        if self.rotating {
            self.spherical_delta.x -= 2.0 * PI * dx / self.viewport_height * self.rotate_speed;
            self.spherical_delta.y -= 2.0 * PI * dy / self.viewport_height * self.rotate_speed;
        } else if self.panning {
            self.pending_pan += Vector2::new(dx, dy) * self.pan_speed;
        }
    }

    /// Positive values move the camera towards the target.
    pub fn zoom(&mut self, amount: f32) {
        let zoom_scale = 0.95f32.powf(self.zoom_speed * amount.abs());
        if amount > 0.0 {
            self.scale *= zoom_scale;
        } else if amount < 0.0 {
            self.scale /= zoom_scale;
        }
    }

    /// Applies pending input to `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut radius = offset.magnitude();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };

        if self.pending_pan != Vector2::zero() {
            self.pan_offset += self.pan_vector(camera, radius);
            self.pending_pan = Vector2::zero();
        }

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.spherical_delta.x * factor;
        phi += self.spherical_delta.y * factor;
        phi = phi.clamp(EPS, PI - EPS);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * factor;

        let sin_phi_radius = phi.sin() * radius;
        let position = self.target
            + Vector3::new(
                sin_phi_radius * theta.sin(),
                phi.cos() * radius,
                sin_phi_radius * theta.cos(),
            );

        if self.enable_damping {
            self.spherical_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Vector2::zero();
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        let moved = (position - camera.position).magnitude2() > EPS
            || (self.target - camera.target).magnitude2() > EPS;
        camera.position = position;
        camera.target = self.target;
        moved
    }

    /// Screen space pan converted to a world space offset in the camera plane.
    fn pan_vector(&self, camera: &PerspectiveCamera, distance: f32) -> Vector3<f32> {
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        // pixels to world units at the target's depth
        let target_distance = distance * (camera.fov / 2.0).to_radians().tan();
        let per_pixel = 2.0 * target_distance / self.viewport_height;
        -right * self.pending_pan.x * per_pixel + up * self.pending_pan.y * per_pixel
    }
}
