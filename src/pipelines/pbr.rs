use crate::{
    data_structures::{
        instance::InstanceRaw,
        material::Side,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{depth_write, mk_pipeline_layout, mk_render_pipeline},
};

/// One pipeline per face culling mode.
#[derive(Debug)]
pub struct PbrPipelines {
    front: wgpu::RenderPipeline,
    back: wgpu::RenderPipeline,
    double: wgpu::RenderPipeline,
}

impl PbrPipelines {
    pub fn new(
        device: &wgpu::Device,
        frame_bind_group_layout: &wgpu::BindGroupLayout,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        sample_count: u32,
    ) -> Self {
        let layout = mk_pipeline_layout(
            device,
            "PBR Pipeline Layout",
            &[frame_bind_group_layout, material_bind_group_layout],
        );
        let mk = |label: &str, cull_mode| {
            mk_render_pipeline(
                device,
                label,
                &layout,
                Some(Texture::HDR_FORMAT),
                Some(wgpu::BlendState::REPLACE),
                Some(depth_write(Texture::DEPTH_FORMAT)),
                &[ModelVertex::desc(), InstanceRaw::desc()],
                cull_mode,
                sample_count,
                wgpu::ShaderModuleDescriptor {
                    label: Some("PBR Shader"),
                    source: wgpu::ShaderSource::Wgsl(include_str!("pbr.wgsl").into()),
                },
            )
        };
        Self {
            front: mk("PBR Pipeline (front)", Some(wgpu::Face::Back)),
            back: mk("PBR Pipeline (back)", Some(wgpu::Face::Front)),
            double: mk("PBR Pipeline (double)", None),
        }
    }

    pub fn for_side(&self, side: Side) -> &wgpu::RenderPipeline {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
            Side::Double => &self.double,
        }
    }
}
