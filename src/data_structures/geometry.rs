//! CPU-side geometry and its lazily created GPU buffers.
//!
//! A [`Geometry`] can be shared between several meshes (the realistic scene uses
//! one 8x8 plane for both the floor and the wall); it is uploaded once, on the
//! first frame any of them is drawn.

use std::sync::OnceLock;

use cgmath::{InnerSpace, Vector2, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::model::ModelVertex;

/// Uploaded vertex/index buffers of a [`Geometry`].
#[derive(Debug)]
pub struct GeometryBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

#[derive(Debug, Default)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    buffers: OnceLock<GeometryBuffers>,
}

impl Geometry {
    pub fn new(name: &str, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            indices,
            buffers: OnceLock::new(),
        }
    }

    /// A `width` x `height` plane in the XY plane facing +Z, centred at the origin.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut vertices = Vec::with_capacity(4);
        let mut indices = Vec::with_capacity(6);
        push_face(
            &mut vertices,
            &mut indices,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::unit_x(),
            Vector3::unit_y(),
            width,
            height,
        );
        Self::new("plane", vertices, indices)
    }

    /// An axis aligned box centred at the origin with 24 vertices (hard edges).
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
        // (centre, right, up, face width, face height); right x up == outward normal
        let faces = [
            (Vector3::new(hx, 0.0, 0.0), -Vector3::unit_z(), Vector3::unit_y(), depth, height),
            (Vector3::new(-hx, 0.0, 0.0), Vector3::unit_z(), Vector3::unit_y(), depth, height),
            (Vector3::new(0.0, hy, 0.0), Vector3::unit_x(), -Vector3::unit_z(), width, depth),
            (Vector3::new(0.0, -hy, 0.0), Vector3::unit_x(), Vector3::unit_z(), width, depth),
            (Vector3::new(0.0, 0.0, hz), Vector3::unit_x(), Vector3::unit_y(), width, height),
            (Vector3::new(0.0, 0.0, -hz), -Vector3::unit_x(), Vector3::unit_y(), width, height),
        ];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (centre, right, up, w, h) in faces {
            push_face(&mut vertices, &mut indices, centre, right, up, w, h);
        }
        Self::new("box", vertices, indices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the GPU buffers, creating them on first use.
    pub fn buffers(&self, device: &wgpu::Device) -> &GeometryBuffers {
        self.buffers.get_or_init(|| {
            log::debug!(
                "uploading geometry {} ({} vertices)",
                self.name,
                self.vertices.len()
            );
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", self.name)),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", self.name)),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            GeometryBuffers {
                vertex_buffer,
                index_buffer,
                num_elements: self.indices.len() as u32,
            }
        })
    }

    /// Buffers if this geometry was already uploaded.
    pub fn uploaded(&self) -> Option<&GeometryBuffers> {
        self.buffers.get()
    }
}

fn push_face(
    vertices: &mut Vec<ModelVertex>,
    indices: &mut Vec<u32>,
    centre: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    width: f32,
    height: f32,
) {
    let normal = right.cross(up);
    let base = vertices.len() as u32;
    // bottom-left, bottom-right, top-right, top-left; v grows downwards in wgpu
    for (sx, sy) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        let position = centre + right * (sx * width / 2.0) + up * (sy * height / 2.0);
        vertices.push(ModelVertex {
            position: position.into(),
            tex_coords: [(sx + 1.0) / 2.0, (1.0 - sy) / 2.0],
            normal: normal.into(),
            tangent: right.into(),
            bitangent: up.into(),
        });
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Fails if any index points past the end of `vertices`.
///
/// Index buffers of loaded files are not validated by the decoder, so this has
/// to run before anything indexes vertices with them.
pub fn check_indices(indices: &[u32], vertex_count: usize) -> anyhow::Result<()> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(i) => anyhow::bail!("index {i} is out of bounds for {vertex_count} vertices"),
        None => Ok(()),
    }
}

/// Unwelds an indexed triangle list so every triangle owns its three vertices
/// and gives them the face normal.
///
/// Used for primitives that come without normals. Degenerate triangles get
/// +Y so the normal is never zero.
pub fn flat_shaded(vertices: &[ModelVertex], indices: &[u32]) -> (Vec<ModelVertex>, Vec<u32>) {
    let mut flat = Vec::with_capacity(indices.len());
    for c in indices.chunks_exact(3) {
        let (Some(v0), Some(v1), Some(v2)) = (
            vertices.get(c[0] as usize),
            vertices.get(c[1] as usize),
            vertices.get(c[2] as usize),
        ) else {
            continue;
        };
        let pos0 = Vector3::from(v0.position);
        let face = (Vector3::from(v1.position) - pos0).cross(Vector3::from(v2.position) - pos0);
        let normal = if face.magnitude2() > 0.0 {
            face.normalize()
        } else {
            Vector3::unit_y()
        };
        for v in [v0, v1, v2] {
            flat.push(ModelVertex {
                normal: normal.into(),
                ..*v
            });
        }
    }
    let indices = (0..flat.len() as u32).collect();
    (flat, indices)
}

/**
 * Sources without tangents need them calculated for normal maps to work.
 *
 * Per triangle we solve
 *     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
 *     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
 * and average the results over every triangle a vertex belongs to. The bitangent
 * is flipped so it points "up" in the image, as OpenGL-style normal maps expect.
 *
 * Vertices that end up without a usable tangent (no or degenerate UVs) get an
 * arbitrary frame perpendicular to their normal. Triangles with indices out of
 * bounds are skipped.
 */
pub fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut triangles_included = vec![0u32; vertices.len()];
    for v in vertices.iter_mut() {
        v.tangent = [0.0; 3];
        v.bitangent = [0.0; 3];
    }

    for c in indices.chunks_exact(3) {
        let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];
        if [i0, i1, i2].iter().any(|&i| i >= vertices.len()) {
            continue;
        }
        let pos0: Vector3<f32> = vertices[i0].position.into();
        let pos1: Vector3<f32> = vertices[i1].position.into();
        let pos2: Vector3<f32> = vertices[i2].position.into();
        let uv0: Vector2<f32> = vertices[i0].tex_coords.into();
        let uv1: Vector2<f32> = vertices[i1].tex_coords.into();
        let uv2: Vector2<f32> = vertices[i2].tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for i in [i0, i1, i2] {
            vertices[i].tangent = (tangent + Vector3::from(vertices[i].tangent)).into();
            vertices[i].bitangent = (bitangent + Vector3::from(vertices[i].bitangent)).into();
            triangles_included[i] += 1;
        }
    }

    for (v, n) in vertices.iter_mut().zip(triangles_included) {
        let t = Vector3::from(v.tangent);
        let b = Vector3::from(v.bitangent);
        if n == 0 || t.magnitude2() <= f32::EPSILON {
            let (t, b) = perpendicular_frame(v.normal.into());
            v.tangent = t.into();
            v.bitangent = b.into();
            continue;
        }
        let t = t.normalize();
        v.tangent = t.into();
        v.bitangent = if b.magnitude2() > f32::EPSILON {
            b.normalize().into()
        } else {
            Vector3::from(v.normal).cross(t).into()
        };
    }
}

/// Some unit tangent and bitangent orthogonal to `normal` (and to each other).
pub fn perpendicular_frame(normal: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let n = if normal.magnitude2() > f32::EPSILON {
        normal.normalize()
    } else {
        Vector3::unit_z()
    };
    let helper = if n.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    let tangent = n.cross(helper).normalize();
    (tangent, n.cross(tangent))
}
