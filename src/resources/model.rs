//! glTF 2.0 (`.gltf` / `.glb`) loading into scene graph nodes.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context as _;

use crate::{
    data_structures::{
        geometry::{Geometry, check_indices, compute_tangents, flat_shaded},
        instance::Instance,
        material::{BasicMaterial, Material, Side, StandardMaterial},
        model::ModelVertex,
        scene_graph::{ContainerNode, MeshNode, SceneNode},
        texture::{ColorSpace, Texture},
    },
    resources::{extension, load_binary},
};

/// Decoded images of one file, keyed by image index and colour space.
type TextureCache = HashMap<(usize, ColorSpace), Arc<Texture>>;

#[derive(Debug, Clone)]
pub struct GltfLoader {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GltfLoader {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
        }
    }

    /// Loads the default scene of a glTF file as a node subtree.
    ///
    /// Every primitive becomes a [`MeshNode`] with a [`StandardMaterial`], or a
    /// [`BasicMaterial`] if its material is marked `KHR_materials_unlit`. Nodes
    /// without a mesh, or with several primitives, become [`ContainerNode`]s.
    pub async fn load(&self, file_name: &str) -> anyhow::Result<Box<dyn SceneNode>> {
        let bytes = load_binary(file_name).await?;
        let gltf = gltf::Gltf::from_slice(&bytes)
            .with_context(|| format!("{file_name} is not a valid glTF file"))?;

        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    let blob = gltf
                        .blob
                        .as_deref()
                        .with_context(|| format!("{file_name} references a missing binary chunk"))?;
                    buffer_data.push(blob.to_vec());
                }
                gltf::buffer::Source::Uri(uri) => {
                    buffer_data.push(load_binary(&sibling(file_name, uri)).await?);
                }
            }
        }

        let mut textures = TextureCache::new();
        let mut materials = Vec::new();
        for material in gltf.materials() {
            materials.push(
                self.to_material(&material, &buffer_data, &mut textures, file_name)
                    .await?,
            );
        }

        let scene = gltf
            .default_scene()
            .or_else(|| gltf.scenes().next())
            .with_context(|| format!("{file_name} contains no scene"))?;
        let mut nodes = scene
            .nodes()
            .map(|node| to_scene_node(node, &buffer_data, &materials))
            .collect::<anyhow::Result<Vec<_>>>()?;

        log::info!(
            "loaded {file_name}: {} materials, {} textures",
            materials.len(),
            textures.len()
        );

        let root_node = if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            let mut root_node = ContainerNode::new(file_name);
            root_node.children = nodes;
            Box::new(root_node)
        };
        Ok(root_node)
    }

    async fn to_material(
        &self,
        material: &gltf::Material<'_>,
        buffer_data: &[Vec<u8>],
        textures: &mut TextureCache,
        file_name: &str,
    ) -> anyhow::Result<Material> {
        let pbr = material.pbr_metallic_roughness();
        let side = if material.double_sided() {
            Side::Double
        } else {
            Side::Front
        };
        let map = match pbr.base_color_texture() {
            Some(info) => Some(
                self.texture(info.texture(), ColorSpace::Srgb, buffer_data, textures, file_name)
                    .await?,
            ),
            None => None,
        };

        if material.unlit() {
            return Ok(Material::Basic(BasicMaterial {
                color: pbr.base_color_factor(),
                map,
                side,
            }));
        }

        let mut standard = StandardMaterial {
            color: pbr.base_color_factor(),
            metalness: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            map,
            side,
            ..Default::default()
        };
        if let Some(normal) = material.normal_texture() {
            standard.normal_scale = [normal.scale(), normal.scale()];
            standard.normal_map = Some(
                self.texture(normal.texture(), ColorSpace::Linear, buffer_data, textures, file_name)
                    .await?,
            );
        }
        if let Some(occlusion) = material.occlusion_texture() {
            standard.ao_map_intensity = occlusion.strength();
            standard.ao_map = Some(
                self.texture(occlusion.texture(), ColorSpace::Linear, buffer_data, textures, file_name)
                    .await?,
            );
        }
        // roughness in G, metalness in B
        if let Some(info) = pbr.metallic_roughness_texture() {
            let texture = self
                .texture(info.texture(), ColorSpace::Linear, buffer_data, textures, file_name)
                .await?;
            standard.roughness_map = Some(texture.clone());
            standard.metalness_map = Some(texture);
        }
        Ok(Material::Standard(standard))
    }

    async fn texture(
        &self,
        texture: gltf::Texture<'_>,
        color_space: ColorSpace,
        buffer_data: &[Vec<u8>],
        textures: &mut TextureCache,
        file_name: &str,
    ) -> anyhow::Result<Arc<Texture>> {
        let image = texture.source();
        if let Some(cached) = textures.get(&(image.index(), color_space)) {
            return Ok(cached.clone());
        }
        let label = format!("{file_name}#image{}", image.index());
        let texture = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let bytes = buffer_data
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(view.offset()..view.offset() + view.length()))
                    .with_context(|| format!("image view out of bounds in {file_name}"))?;
                Texture::from_bytes(
                    &self.device,
                    &self.queue,
                    bytes,
                    &label,
                    mime_type.split('/').next_back(),
                    color_space,
                )?
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                let path = sibling(file_name, uri);
                let bytes = load_binary(&path).await?;
                let format = mime_type
                    .and_then(|mt| mt.split('/').next_back())
                    .or_else(|| extension(&path));
                Texture::from_bytes(&self.device, &self.queue, &bytes, &label, format, color_space)?
            }
        };
        let texture = Arc::new(texture);
        textures.insert((image.index(), color_space), texture.clone());
        Ok(texture)
    }
}

/// Resolves `uri` relative to the directory of `file_name`.
fn sibling(file_name: &str, uri: &str) -> String {
    match file_name.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{uri}"),
        None => uri.to_string(),
    }
}

fn to_scene_node(
    node: gltf::scene::Node,
    buffer_data: &[Vec<u8>],
    materials: &[Material],
) -> anyhow::Result<Box<dyn SceneNode>> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node {}", node.index()));

    let mut primitives = match node.mesh() {
        Some(mesh) => mesh
            .primitives()
            .map(|primitive| to_mesh_node(&name, &primitive, buffer_data, materials))
            .collect::<anyhow::Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let mut scene_node: Box<dyn SceneNode> = if primitives.len() == 1 {
        Box::new(primitives.remove(0))
    } else {
        let mut container = ContainerNode::new(&name);
        for primitive in primitives {
            container.add_child(Box::new(primitive));
        }
        Box::new(container)
    };

    let (position, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(Instance {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    });
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buffer_data, materials)?);
    }

    Ok(scene_node)
}

fn to_mesh_node(
    name: &str,
    primitive: &gltf::Primitive,
    buffer_data: &[Vec<u8>],
    materials: &[Material],
) -> anyhow::Result<MeshNode> {
    let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .with_context(|| format!("primitive of {name} has no positions"))?
        .map(|position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, uv)| vertex.tex_coords = uv);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    check_indices(&indices, vertices.len())
        .with_context(|| format!("primitive of {name} has a broken index buffer"))?;

    // Without normals the primitive is flat shaded and its tangents are ignored
    let Some(normals) = reader.read_normals() else {
        let (mut vertices, indices) = flat_shaded(&vertices, &indices);
        compute_tangents(&mut vertices, &indices);
        return Ok(mesh_node(name, primitive, materials, vertices, indices));
    };
    vertices
        .iter_mut()
        .zip(normals)
        .for_each(|(vertex, normal)| vertex.normal = normal);

    match reader.read_tangents() {
        Some(tangents) => {
            vertices.iter_mut().zip(tangents).for_each(|(vertex, tangent)| {
                // w holds the handedness of the bitangent
                let tangent: cgmath::Vector4<f32> = tangent.into();
                let normal: cgmath::Vector3<f32> = vertex.normal.into();
                vertex.tangent = tangent.truncate().into();
                vertex.bitangent = (normal.cross(tangent.truncate()) * tangent.w).into();
            })
        }
        None => compute_tangents(&mut vertices, &indices),
    }

    Ok(mesh_node(name, primitive, materials, vertices, indices))
}

fn mesh_node(
    name: &str,
    primitive: &gltf::Primitive,
    materials: &[Material],
    vertices: Vec<ModelVertex>,
    indices: Vec<u32>,
) -> MeshNode {
    let material = primitive
        .material()
        .index()
        .and_then(|index| materials.get(index))
        .cloned()
        .unwrap_or_default();

    let geometry = Geometry::new(name, vertices, indices);
    MeshNode::new(name, Arc::new(geometry), material)
}
