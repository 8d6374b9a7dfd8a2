use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use crate::camera::OPENGL_TO_WGPU_MATRIX;

/// Shadow settings of a light: the orthographic shadow camera and the depth
/// biases applied when sampling the shadow map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightShadow {
    pub camera_near: f32,
    pub camera_far: f32,
    /// Half width/height of the orthographic shadow frustum.
    pub camera_extent: f32,
    pub map_size: u32,
    pub bias: f32,
    pub normal_bias: f32,
}

impl Default for LightShadow {
    fn default() -> Self {
        Self {
            camera_near: 0.5,
            camera_far: 500.0,
            camera_extent: 5.0,
            map_size: 512,
            bias: 0.0,
            normal_bias: 0.0,
        }
    }
}

/// A light infinitely far away shining from `position` towards `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub name: String,
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub cast_shadow: bool,
    pub shadow: LightShadow,
}

impl DirectionalLight {
    pub fn new(color: u32, intensity: f32) -> Self {
        Self {
            name: "directional light".to_string(),
            color: hex_to_rgb(color),
            intensity,
            position: Vector3::new(0.0, 1.0, 0.0),
            target: Vector3::new(0.0, 0.0, 0.0),
            cast_shadow: false,
            shadow: LightShadow::default(),
        }
    }

    /// Unit vector pointing from the surface towards the light.
    pub fn direction(&self) -> Vector3<f32> {
        let dir = self.position - self.target;
        if dir.magnitude2() == 0.0 {
            Vector3::unit_y()
        } else {
            dir.normalize()
        }
    }

    /// View-projection of the orthographic shadow camera placed at `position`.
    pub fn shadow_view_proj(&self) -> cgmath::Matrix4<f32> {
        let up = if self.direction().y.abs() > 0.99 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let view = cgmath::Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::from_vec(self.target),
            up,
        );
        let e = self.shadow.camera_extent;
        let proj = cgmath::ortho(-e, e, -e, e, self.shadow.camera_near, self.shadow.camera_far);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

/// `0xRRGGBB` to linear RGB in `0.0..=1.0`.
///
/// Hex colours are authored in sRGB, so they're linearised here.
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
