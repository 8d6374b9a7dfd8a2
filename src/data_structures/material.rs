//! Surface materials and their GPU bindings.
//!
//! [`StandardMaterial`] is a metallic/roughness PBR material lit by the scene's
//! lights and environment map. Each optional map multiplies the matching scalar,
//! so a single ARM texture can feed AO (red), roughness (green) and metalness
//! (blue) at once. [`BasicMaterial`] is unlit; glTF files mark such materials
//! with `KHR_materials_unlit`.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::data_structures::texture::{ColorSpace, Texture};

/// Which faces of a mesh are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Clone, Debug)]
pub struct StandardMaterial {
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub env_map_intensity: f32,
    pub ao_map_intensity: f32,
    pub normal_scale: [f32; 2],
    pub map: Option<Arc<Texture>>,
    pub normal_map: Option<Arc<Texture>>,
    pub ao_map: Option<Arc<Texture>>,
    pub roughness_map: Option<Arc<Texture>>,
    pub metalness_map: Option<Arc<Texture>>,
    pub side: Side,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            metalness: 0.0,
            roughness: 1.0,
            env_map_intensity: 1.0,
            ao_map_intensity: 1.0,
            normal_scale: [1.0, 1.0],
            map: None,
            normal_map: None,
            ao_map: None,
            roughness_map: None,
            metalness_map: None,
            side: Side::Front,
        }
    }
}

impl StandardMaterial {
    /// Uses one packed texture for ambient occlusion, roughness and metalness.
    pub fn with_arm_map(mut self, arm: Arc<Texture>) -> Self {
        self.ao_map = Some(arm.clone());
        self.roughness_map = Some(arm.clone());
        self.metalness_map = Some(arm);
        self
    }
}

#[derive(Clone, Debug)]
pub struct BasicMaterial {
    pub color: [f32; 4],
    pub map: Option<Arc<Texture>>,
    pub side: Side,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            map: None,
            side: Side::Front,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Material {
    Standard(StandardMaterial),
    Basic(BasicMaterial),
}

impl Material {
    pub fn is_standard(&self) -> bool {
        matches!(self, Material::Standard(_))
    }

    pub fn as_standard(&self) -> Option<&StandardMaterial> {
        match self {
            Material::Standard(standard) => Some(standard),
            Material::Basic(_) => None,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut StandardMaterial> {
        match self {
            Material::Standard(standard) => Some(standard),
            Material::Basic(_) => None,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Material::Standard(standard) => standard.side,
            Material::Basic(basic) => basic.side,
        }
    }

    pub(crate) fn to_uniform(&self, receive_shadow: bool) -> MaterialUniform {
        let mut flags = 0;
        if receive_shadow {
            flags |= MaterialUniform::RECEIVE_SHADOW;
        }
        match self {
            Material::Standard(m) => MaterialUniform {
                color: m.color,
                metalness: m.metalness,
                roughness: m.roughness,
                env_map_intensity: m.env_map_intensity,
                ao_map_intensity: m.ao_map_intensity,
                normal_scale: m.normal_scale,
                flags,
                _padding: 0,
            },
            Material::Basic(m) => MaterialUniform {
                color: m.color,
                metalness: 0.0,
                roughness: 1.0,
                env_map_intensity: 0.0,
                ao_map_intensity: 0.0,
                normal_scale: [0.0, 0.0],
                flags: flags | MaterialUniform::UNLIT,
                _padding: 0,
            },
        }
    }

    /// The textures bound to slots 1..=5, falling back to the renderer defaults.
    fn bound_textures<'a>(&'a self, defaults: &'a DefaultTextures) -> [&'a Arc<Texture>; 5] {
        let or_white = |t: &'a Option<Arc<Texture>>| t.as_ref().unwrap_or(&defaults.white);
        match self {
            Material::Standard(m) => [
                or_white(&m.map),
                m.normal_map.as_ref().unwrap_or(&defaults.normal),
                or_white(&m.ao_map),
                or_white(&m.roughness_map),
                or_white(&m.metalness_map),
            ],
            Material::Basic(m) => [
                or_white(&m.map),
                &defaults.normal,
                &defaults.white,
                &defaults.white,
                &defaults.white,
            ],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Standard(StandardMaterial::default())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub env_map_intensity: f32,
    pub ao_map_intensity: f32,
    pub normal_scale: [f32; 2],
    pub flags: u32,
    _padding: u32,
}

impl MaterialUniform {
    pub const UNLIT: u32 = 1;
    pub const RECEIVE_SHADOW: u32 = 2;
}

/// Stand-ins bound in place of missing material maps.
#[derive(Debug, Clone)]
pub struct DefaultTextures {
    pub white: Arc<Texture>,
    pub normal: Arc<Texture>,
}

impl DefaultTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            white: Arc::new(Texture::create_solid(
                device,
                queue,
                [255, 255, 255, 255],
                ColorSpace::Linear,
                "default white",
            )),
            // The blue/purple-ish colour that represents an undisturbed normal
            normal: Arc::new(Texture::create_solid(
                device,
                queue,
                [127, 127, 255, 255],
                ColorSpace::Linear,
                "default normal map",
            )),
        }
    }
}

/// Uniform buffer and bind group of one material.
#[derive(Debug)]
pub struct GpuMaterial {
    pub bind_group: wgpu::BindGroup,
    pub uniform_buffer: wgpu::Buffer,
    texture_key: [usize; 5],
}

impl GpuMaterial {
    /// Creates the GPU side of `material`, or refreshes `existing`.
    ///
    /// The uniform is rewritten every call; the bind group is only rebuilt when a
    /// different texture was assigned since the last call.
    pub fn prepare(
        existing: Option<GpuMaterial>,
        material: &Material,
        receive_shadow: bool,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        defaults: &DefaultTextures,
    ) -> GpuMaterial {
        let uniform = material.to_uniform(receive_shadow);
        let textures = material.bound_textures(defaults);
        let texture_key = textures.map(|t| Arc::as_ptr(t) as usize);

        match existing {
            Some(gpu) if gpu.texture_key == texture_key => {
                queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
                gpu
            }
            existing => {
                let uniform_buffer = match existing {
                    Some(gpu) => {
                        queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
                        gpu.uniform_buffer
                    }
                    None => device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Material Uniform Buffer"),
                        contents: bytemuck::cast_slice(&[uniform]),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    }),
                };
                let sampler = textures[0]
                    .sampler
                    .as_ref()
                    .or(defaults.white.sampler.as_ref());
                let mut entries = vec![wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }];
                for (i, texture) in textures.iter().enumerate() {
                    entries.push(wgpu::BindGroupEntry {
                        binding: i as u32 + 1,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    });
                }
                if let Some(sampler) = sampler {
                    entries.push(wgpu::BindGroupEntry {
                        binding: 6,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    });
                }
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout,
                    entries: &entries,
                    label: Some("material_bind_group"),
                });
                GpuMaterial {
                    bind_group,
                    uniform_buffer,
                    texture_key,
                }
            }
        }
    }
}

pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            texture_entry(1),
            texture_entry(2),
            texture_entry(3),
            texture_entry(4),
            texture_entry(5),
            wgpu::BindGroupLayoutEntry {
                binding: 6,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}
