use crate::pipelines::{mk_pipeline_layout, mk_render_pipeline};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Normalized device coordinates
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// A flat rectangle in physical pixels, origin at the top left corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GuiQuad {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [f32; 4],
}

impl GuiQuad {
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
        }
    }

    /// Two counter-clockwise triangles covering the quad on a `width` x `height` surface.
    pub fn to_vertices(&self, width: f32, height: f32) -> [Vertex; 6] {
        let to_ndc = |x: f32, y: f32| [x / width * 2.0 - 1.0, 1.0 - y / height * 2.0];
        let color = self.color;
        let tl = Vertex {
            position: to_ndc(self.x, self.y),
            color,
        };
        let tr = Vertex {
            position: to_ndc(self.x + self.width, self.y),
            color,
        };
        let bl = Vertex {
            position: to_ndc(self.x, self.y + self.height),
            color,
        };
        let br = Vertex {
            position: to_ndc(self.x + self.width, self.y + self.height),
            color,
        };
        [tl, bl, br, tl, br, tr]
    }
}

pub fn mk_gui_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let layout = mk_pipeline_layout(device, "Gui Render Pipeline Layout", &[]);
    mk_render_pipeline(
        device,
        "Gui Render Pipeline",
        &layout,
        Some(format),
        Some(wgpu::BlendState::ALPHA_BLENDING),
        None,
        &[Vertex::desc()],
        None,
        1,
        wgpu::ShaderModuleDescriptor {
            label: Some("Gui Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("gui.wgsl").into()),
        },
    )
}
