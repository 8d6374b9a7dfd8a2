use cgmath::Vector3;

use crate::data_structures::{light::DirectionalLight, scene_graph::Scene};

/// Lighting of the [`World`](super::World).
#[derive(Debug, Clone, Copy)]
pub struct Environment {
    /// Index of the sun in [`Scene::lights`].
    pub sun: usize,
}

impl Environment {
    pub fn new(scene: &mut Scene) -> Self {
        let mut sun = DirectionalLight::new(0xffffff, 4.0);
        sun.name = "sun".to_string();
        sun.position = Vector3::new(3.5, 2.0, -1.25);
        sun.cast_shadow = true;
        sun.shadow.camera_far = 15.0;
        sun.shadow.map_size = 1024;
        sun.shadow.normal_bias = 0.05;
        log::debug!("adding {} at {:?}", sun.name, sun.position);

        Self {
            sun: scene.add_light(sun),
        }
    }

    pub fn sun<'a>(&self, scene: &'a Scene) -> Option<&'a DirectionalLight> {
        scene.lights.get(self.sun)
    }
}
