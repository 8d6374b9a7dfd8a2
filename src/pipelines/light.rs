use crate::{
    data_structures::{light::DirectionalLight, texture::Texture},
    pipelines::uniform_entry,
    render::ShadowMapType,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Towards the light, w unused.
    pub direction: [f32; 4],
    /// Colour times intensity, w unused.
    pub color: [f32; 4],
    /// bias, normal bias, shadows on (0/1), PCF kernel radius in texels
    pub shadow: [f32; 4],
    /// shadow map size, texel size, environment bound (0/1), last environment mip
    pub params: [f32; 4],
}

impl LightUniform {
    /// No light at all; only the environment (if any) lights the scene.
    pub fn unlit(environment: Option<&Texture>) -> Self {
        Self {
            view_proj: cgmath::Matrix4::from_scale(1.0).into(),
            direction: [0.0, 1.0, 0.0, 0.0],
            color: [0.0; 4],
            shadow: [0.0; 4],
            params: [1.0, 1.0, environment_flag(environment), last_mip(environment)],
        }
    }

    pub fn new(
        light: &DirectionalLight,
        shadows: Option<ShadowMapType>,
        use_legacy_lights: bool,
        environment: Option<&Texture>,
    ) -> Self {
        let intensity = if use_legacy_lights {
            light.intensity * std::f32::consts::PI
        } else {
            light.intensity
        };
        let casts = light.cast_shadow && shadows.is_some();
        let map_size = light.shadow.map_size.max(1) as f32;
        Self {
            view_proj: light.shadow_view_proj().into(),
            direction: light.direction().extend(0.0).into(),
            color: [
                light.color[0] * intensity,
                light.color[1] * intensity,
                light.color[2] * intensity,
                0.0,
            ],
            shadow: [
                light.shadow.bias,
                light.shadow.normal_bias,
                if casts { 1.0 } else { 0.0 },
                shadows.map_or(0.0, |s| s.kernel_radius() as f32),
            ],
            params: [
                map_size,
                1.0 / map_size,
                environment_flag(environment),
                last_mip(environment),
            ],
        }
    }
}

fn environment_flag(environment: Option<&Texture>) -> f32 {
    if environment.is_some() { 1.0 } else { 0.0 }
}

fn last_mip(environment: Option<&Texture>) -> f32 {
    environment.map_or(0.0, |e| e.mip_level_count.saturating_sub(1) as f32)
}

/// Group 0 of the scene passes: camera, light, shadow map and environment.
pub fn mk_frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, both),
            uniform_entry(1, both),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("frame_bind_group_layout"),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn mk_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera_buffer: &wgpu::Buffer,
    light_buffer: &wgpu::Buffer,
    shadow_map: &Texture,
    shadow_sampler: &wgpu::Sampler,
    environment: &Texture,
    environment_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: light_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&shadow_map.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(shadow_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::TextureView(&environment.view),
            },
            wgpu::BindGroupEntry {
                binding: 5,
                resource: wgpu::BindingResource::Sampler(environment_sampler),
            },
        ],
        label: Some("frame_bind_group"),
    })
}

/// Group 0 of the shadow pass: only the light's view-projection.
pub fn mk_shadow_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        label: Some("shadow_bind_group_layout"),
    })
}

pub fn mk_shadow_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("shadow_bind_group"),
    })
}
