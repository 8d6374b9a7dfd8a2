//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU GPU texture resources,
//! and helpers for the attachments the renderer needs (depth, shadow map, HDR
//! colour target) as well as colour/data maps and HDR environment maps decoded
//! from image files.

use anyhow::*;
use image::{GenericImageView, ImageFormat, imageops::FilterType, load_from_memory_with_format};

/// How the texel values of an image are to be interpreted.
///
/// Colour maps authored by artists are stored in sRGB and must be linearised when
/// sampled. Data maps (normals, AO/roughness/metalness) are already linear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    Srgb,
    #[default]
    Linear,
}

impl ColorSpace {
    pub fn rgba8_format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// How a texture is projected when it's used as a background or environment.
///
/// As a background, `Uv` stretches the image over the screen while
/// `EquirectangularReflection` wraps it around the camera. Only the latter can
/// light a scene as its environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mapping {
    #[default]
    Uv,
    EquirectangularReflection,
}

impl Mapping {
    pub fn is_panorama(self) -> bool {
        self == Mapping::EquirectangularReflection
    }
}

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
    pub mapping: Mapping,
    pub mip_level_count: u32,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// Format of the scene colour target before tone mapping.
    pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
    /// Format of decoded environment maps (filterable on every backend).
    pub const ENVIRONMENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// `sample_count` has to match the colour attachment it is used with.
    pub fn create_depth_texture(
        device: &wgpu::Device,
        size: [u32; 2],
        sample_count: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
            mapping: Mapping::Uv,
            mip_level_count: 1,
        }
    }

    /// Create a square shadow map together with its comparison sampler.
    pub fn create_shadow_map(device: &wgpu::Device, size: u32) -> Self {
        let size = size.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_comparison_sampler(device));

        Self {
            texture,
            view,
            sampler,
            mapping: Mapping::Uv,
            mip_level_count: 1,
        }
    }

    /// Create an offscreen colour target, e.g. the HDR scene buffer.
    ///
    /// Multisampled targets cannot be sampled, so only single-sampled targets get
    /// `TEXTURE_BINDING` and a sampler.
    pub fn create_render_target(
        device: &wgpu::Device,
        size: [u32; 2],
        format: wgpu::TextureFormat,
        sample_count: u32,
        label: &str,
    ) -> Self {
        let usage = if sample_count > 1 {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size[0].max(1),
                height: size[1].max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = (sample_count == 1).then(|| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        });

        Self {
            texture,
            view,
            sampler,
            mapping: Mapping::Uv,
            mip_level_count: 1,
        }
    }

    /// Create a 1x1 texture of a single colour.
    ///
    /// Used as the stand-in for every optional material map so the shader never
    /// has to branch on a missing binding: white for colour/AO/roughness/metalness,
    /// `[127, 127, 255]` for a flat normal map.
    pub fn create_solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        color_space: ColorSpace,
        label: &str,
    ) -> Texture {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba(rgba),
        ));
        Self::upload_rgba8(device, queue, &[img], Some(label), color_space)
    }

    /// A neutral 1x1 environment used until an HDR map is loaded.
    pub fn create_default_environment(device: &wgpu::Device, queue: &wgpu::Queue) -> Texture {
        let mut texture =
            Self::from_hdr_pixels(device, queue, 1, 1, &[0.0, 0.0, 0.0, 1.0], "default environment");
        texture.mapping = Mapping::EquirectangularReflection;
        texture
    }

    /// Load a texture from raw byte data (image file contents).
    ///
    /// # Arguments
    ///
    /// * `bytes` represent raw image file data (PNG, JPEG, etc.)
    /// * `label` is used as a debug name for the GPU resource
    /// * `format`  is an optional file extension hint (e.g., "png"). If None, auto-detect.
    /// * `color_space` selects between an sRGB and a linear texture format
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
        color_space: ColorSpace,
    ) -> Result<Self> {
        let img = match format.and_then(ImageFormat::from_extension) {
            None => image::load_from_memory(bytes)?,
            Some(fmt) => load_from_memory_with_format(bytes, fmt)?,
        };
        Self::from_image(device, queue, &img, Some(label), color_space)
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        color_space: ColorSpace,
    ) -> Result<Self> {
        let levels = mip_chain(img);
        Ok(Self::upload_rgba8(device, queue, &levels, label, color_space))
    }

    fn upload_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        levels: &[image::DynamicImage],
        label: Option<&str>,
        color_space: ColorSpace,
    ) -> Texture {
        let (width, height) = levels[0].dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let mip_level_count = levels.len() as u32;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_space.rgba8_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            let rgba = level.to_rgba8();
            let (w, h) = level.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                &rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_default_sampler(device));
        Texture {
            texture,
            view,
            sampler,
            mapping: Mapping::Uv,
            mip_level_count,
        }
    }

    /// Decode a Radiance HDR (RGBE) file into an equirectangular environment map.
    ///
    /// The mip chain is box-filtered on the CPU; the shader picks blurrier levels
    /// for rougher surfaces and the smallest level as diffuse irradiance.
    pub fn from_hdr_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self> {
        let img = load_from_memory_with_format(bytes, ImageFormat::Hdr)?;
        let (width, height) = img.dimensions();
        let rgba = img.to_rgba32f().into_raw();
        let mut texture = Self::from_hdr_pixels(device, queue, width, height, &rgba, label);
        texture.mapping = Mapping::EquirectangularReflection;
        Ok(texture)
    }

    pub fn from_hdr_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[f32],
        label: &str,
    ) -> Texture {
        let levels = hdr_mip_chain(width, height, rgba);
        let mip_level_count = levels.len() as u32;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::ENVIRONMENT_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, (w, h, pixels)) in levels.iter().enumerate() {
            let halfs: Vec<half::f16> = pixels.iter().map(|&v| to_half(v)).collect();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                bytemuck::cast_slice(&halfs),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(8 * w),
                    rows_per_image: Some(*h),
                },
                wgpu::Extent3d {
                    width: *w,
                    height: *h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_environment_sampler(device));
        Texture {
            texture,
            view,
            sampler,
            mapping: Mapping::Uv,
            mip_level_count,
        }
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        anisotropy_clamp: 4,
        ..Default::default()
    })
}

/// Hardware PCF: each tap compares against the stored depth and filters the results.
pub fn create_comparison_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("shadow_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        compare: Some(wgpu::CompareFunction::LessEqual),
        ..Default::default()
    })
}

/// Wraps horizontally around the panorama, clamps at the poles.
pub fn create_environment_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("environment_sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

/// Converts to a half float, saturating at the largest finite value so bright
/// HDR texels (the sun) don't turn into infinity.
pub fn to_half(value: f32) -> half::f16 {
    let max = half::f16::MAX.to_f32();
    half::f16::from_f32(value.clamp(-max, max))
}

/// Number of mip levels of a full chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn mip_chain(img: &image::DynamicImage) -> Vec<image::DynamicImage> {
    let (width, height) = img.dimensions();
    let count = mip_level_count(width, height);
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(img.clone());
    for level in 1..count {
        let w = (width >> level).max(1);
        let h = (height >> level).max(1);
        let next = levels[level as usize - 1].resize_exact(w, h, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

/// Box-filtered RGBA f32 mip chain, each level as `(width, height, pixels)`.
pub fn hdr_mip_chain(width: u32, height: u32, rgba: &[f32]) -> Vec<(u32, u32, Vec<f32>)> {
    let count = mip_level_count(width, height);
    let mut levels = vec![(width, height, rgba.to_vec())];
    for _ in 1..count {
        let (pw, ph, prev) = &levels[levels.len() - 1];
        let (pw, ph) = (*pw, *ph);
        let w = (pw / 2).max(1);
        let h = (ph / 2).max(1);
        let mut next = vec![0.0f32; (w * h * 4) as usize];
        for y in 0..h {
            for x in 0..w {
                let mut sum = [0.0f32; 4];
                let mut taps = 0.0;
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let sx = (x * 2 + dx).min(pw - 1);
                    let sy = (y * 2 + dy).min(ph - 1);
                    let idx = ((sy * pw + sx) * 4) as usize;
                    for c in 0..4 {
                        sum[c] += prev[idx + c];
                    }
                    taps += 1.0;
                }
                let out = ((y * w + x) * 4) as usize;
                for c in 0..4 {
                    next[out + c] = sum[c] / taps;
                }
            }
        }
        levels.push((w, h, next));
    }
    levels
}
