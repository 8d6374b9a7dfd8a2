use std::sync::Arc;

use crate::{
    data_structures::texture::{ColorSpace, Texture},
    resources::{extension, load_binary},
};

/// Loads image files (PNG, JPEG) into sampled textures.
///
/// Holds its own device/queue handles so a load can be moved into a future.
#[derive(Debug, Clone)]
pub struct TextureLoader {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl TextureLoader {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
        }
    }

    /// Use [`ColorSpace::Srgb`] for colour maps and [`ColorSpace::Linear`] for
    /// data maps such as normal or ARM textures.
    pub async fn load(&self, file_name: &str, color_space: ColorSpace) -> anyhow::Result<Arc<Texture>> {
        let data = load_binary(file_name).await?;
        let texture = Texture::from_bytes(
            &self.device,
            &self.queue,
            &data,
            file_name,
            extension(file_name),
            color_space,
        )?;
        log::debug!(
            "loaded texture {file_name} ({} mip levels, {:?})",
            texture.mip_level_count,
            color_space
        );
        Ok(Arc::new(texture))
    }
}
