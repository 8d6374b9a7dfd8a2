use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{depth_write, mk_pipeline_layout, mk_render_pipeline},
};

/// Depth-only rendering of shadow casters from the light's point of view.
///
/// Faces are not culled so single-sided planes still cast shadows.
pub fn mk_shadow_pipeline(
    device: &wgpu::Device,
    shadow_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_pipeline_layout(device, "Shadow Pipeline Layout", &[shadow_bind_group_layout]);
    mk_render_pipeline(
        device,
        "Shadow Pipeline",
        &layout,
        None,
        None,
        Some(depth_write(Texture::DEPTH_FORMAT)),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        None,
        1,
        wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        },
    )
}
