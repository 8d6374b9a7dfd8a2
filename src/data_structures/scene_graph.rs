//! Scene graph and hierarchical scene organization.
//!
//! A [`Scene`] owns a forest of [`SceneNode`]s plus the scene-wide lighting
//! state: directional lights, the background and the environment map. Nodes
//! keep CPU data only until [`Scene::write_to_buffers`] uploads whatever the
//! renderer needs, so scenes can be built (and tested) without a GPU.

use std::sync::Arc;

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        light::DirectionalLight,
        material::{DefaultTextures, GpuMaterial, Material},
        texture::Texture,
    },
    render::Instanced,
};

/// Everything a node needs to create or refresh its GPU resources.
pub struct Uploader<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub material_layout: &'a wgpu::BindGroupLayout,
    pub defaults: &'a DefaultTextures,
}

pub trait SceneNode {
    fn name(&self) -> &str;

    fn get_local_transform(&self) -> Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn local_transform_mut(&mut self) -> &mut Instance;

    fn get_world_transform(&self) -> Instance;

    /// Recomputes this node's world transform from its parent's and recurses.
    fn update_world_transforms(&mut self, parent_world_transform: &Instance);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn as_mesh(&self) -> Option<&MeshNode> {
        None
    }

    fn as_mesh_mut(&mut self) -> Option<&mut MeshNode> {
        None
    }

    fn write_to_buffers(&mut self, uploader: &Uploader);

    /// Uploaded, visible meshes of this subtree.
    fn get_render(&self) -> Vec<Instanced<'_>>;
}

impl std::fmt::Debug for dyn SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name())
            .field("children", self.get_children())
            .finish()
    }
}

/// Visits `node` and then its descendants, depth first.
pub fn traverse_node(node: &mut dyn SceneNode, f: &mut dyn FnMut(&mut dyn SceneNode)) {
    f(node);
    for child in node.get_children_mut().iter_mut() {
        traverse_node(child.as_mut(), f);
    }
}

pub fn traverse_node_ref(node: &dyn SceneNode, f: &mut dyn FnMut(&dyn SceneNode)) {
    f(node);
    for child in node.get_children() {
        traverse_node_ref(child.as_ref(), f);
    }
}

/// A node without geometry, grouping children under a common transform.
pub struct ContainerNode {
    pub name: String,
    pub children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    world: Instance,
    visible: bool,
}

impl ContainerNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            local: Instance::default(),
            world: Instance::default(),
            visible: true,
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> Instance {
        self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn local_transform_mut(&mut self) -> &mut Instance {
        &mut self.local
    }

    fn get_world_transform(&self) -> Instance {
        self.world
    }

    fn update_world_transforms(&mut self, parent_world_transform: &Instance) {
        self.world = parent_world_transform * &self.local;
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn write_to_buffers(&mut self, uploader: &Uploader) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(uploader));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        if !self.visible {
            return Vec::new();
        }
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// A renderable node: shared geometry drawn with its own material.
pub struct MeshNode {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    world: Instance,
    visible: bool,
    instance_buffer: Option<wgpu::Buffer>,
    gpu_material: Option<GpuMaterial>,
}

impl MeshNode {
    pub fn new(name: &str, geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
            local: Instance::default(),
            world: Instance::default(),
            visible: true,
            instance_buffer: None,
            gpu_material: None,
        }
    }

    pub fn with_transform(mut self, instance: Instance) -> Self {
        self.local = instance;
        self
    }

    pub fn is_uploaded(&self) -> bool {
        self.instance_buffer.is_some() && self.gpu_material.is_some()
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_local_transform(&self) -> Instance {
        self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn local_transform_mut(&mut self) -> &mut Instance {
        &mut self.local
    }

    fn get_world_transform(&self) -> Instance {
        self.world
    }

    fn update_world_transforms(&mut self, parent_world_transform: &Instance) {
        self.world = parent_world_transform * &self.local;
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn as_mesh(&self) -> Option<&MeshNode> {
        Some(self)
    }

    fn as_mesh_mut(&mut self) -> Option<&mut MeshNode> {
        Some(self)
    }

    fn write_to_buffers(&mut self, uploader: &Uploader) {
        if self.geometry.indices.is_empty() {
            warn!("mesh {} has no indices and will not be drawn", self.name);
        } else {
            self.geometry.buffers(uploader.device);
        }

        let raw = [self.world.to_raw()];
        match &self.instance_buffer {
            Some(buffer) => uploader
                .queue
                .write_buffer(buffer, 0, bytemuck::cast_slice(&raw)),
            None => {
                self.instance_buffer = Some(uploader.device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("Instance Buffer"),
                        contents: bytemuck::cast_slice(&raw),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    },
                ))
            }
        }

        self.gpu_material = Some(GpuMaterial::prepare(
            self.gpu_material.take(),
            &self.material,
            self.receive_shadow,
            uploader.device,
            uploader.queue,
            uploader.material_layout,
            uploader.defaults,
        ));

        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(uploader));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        if !self.visible {
            return Vec::new();
        }
        let own = match (
            self.geometry.uploaded(),
            &self.instance_buffer,
            &self.gpu_material,
        ) {
            (Some(geometry), Some(instance), Some(material)) => Some(Instanced {
                geometry,
                material,
                instance,
                side: self.material.side(),
                cast_shadow: self.cast_shadow,
            }),
            _ => None,
        };
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain(own)
            .collect()
    }
}

/// The root of everything that is rendered.
pub struct Scene {
    pub children: Vec<Box<dyn SceneNode>>,
    pub lights: Vec<DirectionalLight>,
    /// Drawn behind everything; equirectangular maps are projected as a sky.
    pub background: Option<Arc<Texture>>,
    /// Image based lighting for every standard material.
    pub environment: Option<Arc<Texture>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            lights: Vec::new(),
            background: None,
            environment: None,
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("children", &self.children)
            .field("lights", &self.lights)
            .field("background", &self.background.is_some())
            .field("environment", &self.environment.is_some())
            .finish()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Box<dyn SceneNode>) {
        self.children.push(node);
    }

    /// Adds a light and returns its index in [`Scene::lights`].
    pub fn add_light(&mut self, light: DirectionalLight) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    /// Number of top-level objects, lights included.
    pub fn object_count(&self) -> usize {
        self.children.len() + self.lights.len()
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse_ref(&mut |node| {
            if node.as_mesh().is_some() {
                count += 1;
            }
        });
        count
    }

    pub fn traverse(&mut self, f: &mut dyn FnMut(&mut dyn SceneNode)) {
        for child in self.children.iter_mut() {
            traverse_node(child.as_mut(), f);
        }
    }

    pub fn traverse_ref(&self, f: &mut dyn FnMut(&dyn SceneNode)) {
        for child in self.children.iter() {
            traverse_node_ref(child.as_ref(), f);
        }
    }

    /// First node (depth first) with the given name.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut dyn SceneNode> {
        fn find<'a>(node: &'a mut dyn SceneNode, name: &str) -> Option<&'a mut dyn SceneNode> {
            if node.name() == name {
                return Some(node);
            }
            node.get_children_mut()
                .iter_mut()
                .find_map(|child| find(child.as_mut(), name))
        }
        self.children
            .iter_mut()
            .find_map(|child| find(child.as_mut(), name))
    }

    pub fn find_mesh_mut(&mut self, name: &str) -> Option<&mut MeshNode> {
        self.find_mut(name).and_then(|node| node.as_mesh_mut())
    }

    pub fn update_world_transforms(&mut self) {
        let root = Instance::default();
        for child in self.children.iter_mut() {
            child.update_world_transforms(&root);
        }
    }

    /// Brings world transforms up to date and uploads every node.
    pub fn write_to_buffers(&mut self, uploader: &Uploader) {
        self.update_world_transforms();
        for child in self.children.iter_mut() {
            child.write_to_buffers(uploader);
        }
    }

    pub fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// Copies the global environment intensity onto every standard material and
/// makes every such mesh cast and receive shadows.
///
/// Returns how many meshes were updated.
pub fn update_all_materials(scene: &mut Scene, env_map_intensity: f32) -> usize {
    let mut updated = 0;
    scene.traverse(&mut |node| {
        if let Some(mesh) = node.as_mesh_mut() {
            if let Some(material) = mesh.material.as_standard_mut() {
                material.env_map_intensity = env_map_intensity;
                mesh.cast_shadow = true;
                mesh.receive_shadow = true;
                updated += 1;
            }
        }
    });
    log::debug!("updated {updated} materials to env map intensity {env_map_intensity}");
    updated
}
