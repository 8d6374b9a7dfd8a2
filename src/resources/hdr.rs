use std::sync::Arc;

use crate::{data_structures::texture::Texture, resources::load_binary};

/// Loads Radiance `.hdr` (RGBE) files as equirectangular environment maps.
#[derive(Debug, Clone)]
pub struct RgbeLoader {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl RgbeLoader {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
        }
    }

    /// The returned texture uses [`Mapping::EquirectangularReflection`] so it can
    /// serve as both scene background and environment.
    ///
    /// [`Mapping::EquirectangularReflection`]: crate::data_structures::texture::Mapping
    pub async fn load(&self, file_name: &str) -> anyhow::Result<Arc<Texture>> {
        let data = load_binary(file_name).await?;
        let texture = Texture::from_hdr_bytes(&self.device, &self.queue, &data, file_name)?;
        log::info!(
            "loaded environment map {file_name} ({} mip levels)",
            texture.mip_level_count
        );
        Ok(Arc::new(texture))
    }
}
