use std::sync::Arc;

use crate::data_structures::{
    geometry::Geometry,
    material::{Material, StandardMaterial},
    scene_graph::{MeshNode, Scene},
};

use super::Environment;

pub const PLACEHOLDER: &str = "placeholder";

/// Everything inside the [`Experience`](super::Experience)'s scene.
#[derive(Debug, Clone, Copy)]
pub struct World {
    pub environment: Environment,
}

impl World {
    pub fn new(scene: &mut Scene) -> Self {
        let environment = Environment::new(scene);

        let cube = MeshNode::new(
            PLACEHOLDER,
            Arc::new(Geometry::cuboid(1.0, 1.0, 1.0)),
            Material::Standard(StandardMaterial::default()),
        );
        scene.add(Box::new(cube));

        Self { environment }
    }
}
