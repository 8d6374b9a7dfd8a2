use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::Texture,
    pipelines::{mk_pipeline_layout, mk_render_pipeline, uniform_entry},
    render::ToneMapping,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ToneMappingUniform {
    pub mode: u32,
    pub exposure: f32,
    pub encode_srgb: u32,
    _padding: u32,
}

impl ToneMappingUniform {
    pub fn new(tone_mapping: ToneMapping, exposure: f32, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            mode: tone_mapping as u32,
            exposure,
            // sRGB surfaces encode on store
            encode_srgb: (!surface_format.is_srgb()) as u32,
            _padding: 0,
        }
    }
}

/// Fullscreen pass resolving the HDR scene colour onto the surface.
///
/// The scene colour's alpha is used for blending, so pixels nothing was drawn
/// to keep the surface's clear colour untouched.
#[derive(Debug)]
pub struct ToneMappingPass {
    pub pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    pub bind_group: Option<wgpu::BindGroup>,
}

impl ToneMappingPass {
    /// The resolved HDR target already holds coverage-weighted colour at
    /// silhouette edges, so it is composited as premultiplied.
    pub const BLEND: wgpu::BlendState = wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING;

    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("tone_mapping_bind_group_layout"),
        });
        let pipeline_layout = mk_pipeline_layout(device, "Tone Mapping Pipeline Layout", &[&layout]);
        let pipeline = mk_render_pipeline(
            device,
            "Tone Mapping Pipeline",
            &pipeline_layout,
            Some(surface_format),
            Some(Self::BLEND),
            None,
            &[],
            None,
            1,
            wgpu::ShaderModuleDescriptor {
                label: Some("Tone Mapping Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("tonemap.wgsl").into()),
            },
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tone Mapping Uniform Buffer"),
            contents: bytemuck::cast_slice(&[ToneMappingUniform::new(
                ToneMapping::default(),
                1.0,
                surface_format,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            pipeline,
            layout,
            uniform_buffer,
            bind_group: None,
        }
    }

    /// Points the pass at a new (resolved) HDR target, e.g. after a resize.
    pub fn set_input(&mut self, device: &wgpu::Device, hdr: &Texture) {
        let Some(sampler) = hdr.sampler.as_ref() else {
            log::error!("tone mapping input must be a single-sampled render target");
            self.bind_group = None;
            return;
        };
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&hdr.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("tone_mapping_bind_group"),
        }));
    }

    pub fn write_uniform(&self, queue: &wgpu::Queue, uniform: ToneMappingUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}
