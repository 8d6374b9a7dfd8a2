use std::sync::Arc;

use crate::{
    data_structures::texture::{Mapping, Texture, create_environment_sampler},
    pipelines::{mk_pipeline_layout, mk_render_pipeline},
};

/// Draws the scene background behind everything else.
///
/// Panoramas are wrapped around the camera as a sky at infinite distance, plain
/// images are stretched over the screen. Runs first in the HDR pass without
/// touching depth, so everything drawn afterwards lands in front of it.
#[derive(Debug)]
pub struct BackgroundPass {
    panorama: wgpu::RenderPipeline,
    screen: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bound: Option<(usize, Mapping, wgpu::BindGroup)>,
}

impl BackgroundPass {
    pub fn new(
        device: &wgpu::Device,
        frame_bind_group_layout: &wgpu::BindGroupLayout,
        sample_count: u32,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("background_bind_group_layout"),
        });
        let pipeline_layout = mk_pipeline_layout(
            device,
            "Background Pipeline Layout",
            &[frame_bind_group_layout, &layout],
        );
        let mk_pipeline = |label: &str, source: &'static str| {
            mk_render_pipeline(
                device,
                label,
                &pipeline_layout,
                Some(Texture::HDR_FORMAT),
                Some(wgpu::BlendState::REPLACE),
                Some(wgpu::DepthStencilState {
                    format: Texture::DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                &[],
                None,
                sample_count,
                wgpu::ShaderModuleDescriptor {
                    label: Some(label),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                },
            )
        };

        Self {
            panorama: mk_pipeline("Panorama Background", include_str!("background.wgsl")),
            screen: mk_pipeline("Screen Background", include_str!("background_screen.wgsl")),
            layout,
            sampler: create_environment_sampler(device),
            bound: None,
        }
    }

    /// (Re)binds `texture` if it changed since the last frame.
    pub fn prepare(&mut self, device: &wgpu::Device, texture: &Arc<Texture>) {
        let key = Arc::as_ptr(texture) as usize;
        let stale = self
            .bound
            .as_ref()
            .is_none_or(|(bound_key, mapping, _)| *bound_key != key || *mapping != texture.mapping);
        if stale {
            self.bound = Some((key, texture.mapping, self.mk_bind_group(device, texture)));
        }
    }

    /// The pipeline matching the mapping of the prepared texture, and its bind group.
    pub fn bound(&self) -> Option<(&wgpu::RenderPipeline, &wgpu::BindGroup)> {
        self.bound.as_ref().map(|(_, mapping, bind_group)| {
            let pipeline = if mapping.is_panorama() {
                &self.panorama
            } else {
                &self.screen
            };
            (pipeline, bind_group)
        })
    }

    fn mk_bind_group(&self, device: &wgpu::Device, texture: &Texture) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("background_bind_group"),
        })
    }
}
