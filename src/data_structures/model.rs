use std::ops::Range;

use crate::data_structures::{geometry::GeometryBuffers, material::GpuMaterial};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Draw calls for uploaded meshes.
///
/// Bind group slots: 0 is the per-frame group (camera, light, shadow map,
/// environment), 1 is the material. Vertex slot 1 carries the instance buffer.
pub trait DrawModel<'a> {
    fn draw_mesh_instanced(
        &mut self,
        geometry: &'a GeometryBuffers,
        material: &'a GpuMaterial,
        instance_buffer: &'a wgpu::Buffer,
        instances: Range<u32>,
        frame_bind_group: &'a wgpu::BindGroup,
    );

    /// Depth-only variant for the shadow pass: no material.
    fn draw_mesh_depth(
        &mut self,
        geometry: &'a GeometryBuffers,
        instance_buffer: &'a wgpu::Buffer,
        frame_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        geometry: &'b GeometryBuffers,
        material: &'b GpuMaterial,
        instance_buffer: &'b wgpu::Buffer,
        instances: Range<u32>,
        frame_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, instance_buffer.slice(..));
        self.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, frame_bind_group, &[]);
        self.set_bind_group(1, &material.bind_group, &[]);
        self.draw_indexed(0..geometry.num_elements, 0, instances);
    }

    fn draw_mesh_depth(
        &mut self,
        geometry: &'b GeometryBuffers,
        instance_buffer: &'b wgpu::Buffer,
        frame_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, instance_buffer.slice(..));
        self.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, frame_bind_group, &[]);
        self.draw_indexed(0..geometry.num_elements, 0, 0..1);
    }
}
