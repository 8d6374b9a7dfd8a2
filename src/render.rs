//! Render composition and the scene renderer.
//!
//! Flows describe what they want drawn with the [`Render`] enum; the app loop
//! hands every [`Render::Scene`] to the [`Renderer`] and collects overlay quads
//! to draw on top once all scenes are done.
//!
//! A frame of the renderer is made of four passes:
//!
//! 1. shadow map of the first directional light (skipped when shadows are off)
//! 2. background and meshes into a multisampled HDR target
//! 3. tone mapping of the resolved HDR target onto the output view
//! 4. GUI quads (see [`Renderer::draw_overlay`])

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::{
    camera::{CameraUniform, PerspectiveCamera},
    data_structures::{
        geometry::GeometryBuffers,
        light::srgb_to_linear,
        material::{DefaultTextures, GpuMaterial, Side, material_bind_group_layout},
        model::DrawModel,
        scene_graph::{Scene, Uploader},
        texture::{Texture, create_environment_sampler},
    },
    pipelines::{
        background::BackgroundPass,
        gui::{GuiQuad, Vertex as GuiVertex, mk_gui_pipeline},
        light::{
            LightUniform, mk_frame_bind_group, mk_frame_bind_group_layout, mk_shadow_bind_group,
            mk_shadow_bind_group_layout,
        },
        pbr::PbrPipelines,
        shadow::mk_shadow_pipeline,
        tonemap::{ToneMappingPass, ToneMappingUniform},
    },
};

/// Everything needed to draw one uploaded mesh.
pub struct Instanced<'a> {
    pub geometry: &'a GeometryBuffers,
    pub material: &'a GpuMaterial,
    pub instance: &'a wgpu::Buffer,
    pub side: Side,
    pub cast_shadow: bool,
}

/// What a flow wants to have drawn this frame.
///
/// - `None` draws nothing
/// - `Scene` renders a scene through a camera with the given settings
/// - `Overlay` draws flat quads over everything else
/// - `Composed` is any combination of the above, drawn in order
pub enum Render<'a> {
    None,
    Scene {
        scene: &'a mut Scene,
        camera: &'a PerspectiveCamera,
        settings: &'a RendererSettings,
    },
    Overlay(Vec<GuiQuad>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Flattens `self` into scenes (in order) and the quads of every overlay.
    pub(crate) fn split(
        self,
        scenes: &mut Vec<(&'a mut Scene, &'a PerspectiveCamera, &'a RendererSettings)>,
        quads: &mut Vec<GuiQuad>,
    ) {
        match self {
            Render::None => (),
            Render::Scene {
                scene,
                camera,
                settings,
            } => scenes.push((scene, camera, settings)),
            Render::Overlay(mut overlay) => quads.append(&mut overlay),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.split(scenes, quads)),
        }
    }
}

/// HDR to display operators, in the order the shader numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ToneMapping {
    /// Clamp only, exposure is ignored.
    #[default]
    No = 0,
    Linear = 1,
    Reinhard = 2,
    Cineon = 3,
    AcesFilmic = 4,
}

impl ToneMapping {
    pub const ALL: [ToneMapping; 5] = [
        ToneMapping::No,
        ToneMapping::Linear,
        ToneMapping::Reinhard,
        ToneMapping::Cineon,
        ToneMapping::AcesFilmic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToneMapping::No => "No",
            ToneMapping::Linear => "Linear",
            ToneMapping::Reinhard => "Reinhard",
            ToneMapping::Cineon => "Cineon",
            ToneMapping::AcesFilmic => "ACESFilmic",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`ToneMapping::index`]; out of range indices clamp to the last operator.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

/// Filtering applied when sampling the shadow map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ShadowMapType {
    /// Single comparison tap.
    Basic,
    /// 3x3 comparison kernel.
    #[default]
    Pcf,
    /// 5x5 comparison kernel.
    PcfSoft,
}

impl ShadowMapType {
    /// Half width of the square PCF kernel, in texels.
    pub fn kernel_radius(self) -> u32 {
        match self {
            ShadowMapType::Basic => 0,
            ShadowMapType::Pcf => 1,
            ShadowMapType::PcfSoft => 2,
        }
    }
}

/// Per scene knobs of the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererSettings {
    pub shadow_map_enabled: bool,
    pub shadow_map_type: ShadowMapType,
    pub tone_mapping: ToneMapping,
    pub tone_mapping_exposure: f32,
    /// Multiplies light intensities by π, like renderers predating physically based units.
    pub use_legacy_lights: bool,
    /// Linear colour shown wherever nothing was drawn.
    pub clear_colour: wgpu::Color,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shadow_map_enabled: false,
            shadow_map_type: ShadowMapType::default(),
            tone_mapping: ToneMapping::default(),
            tone_mapping_exposure: 1.0,
            use_legacy_lights: false,
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

impl RendererSettings {
    /// Sets the clear colour from an sRGB `0xRRGGBB` value.
    pub fn set_clear_hex(&mut self, hex: u32) {
        let [r, g, b] = crate::data_structures::light::hex_to_rgb(hex);
        self.clear_colour = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };
    }
}

/// Size of the drawable area in logical pixels and the pixel ratio used to
/// render it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sizes {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Default for Sizes {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
        }
    }
}

impl Sizes {
    pub const MAX_PIXEL_RATIO: f64 = 2.0;

    /// Sizes of a window whose inner size is `physical` at `scale_factor`.
    ///
    /// Returns `None` for a zero sized (e.g. minimised) window.
    pub fn from_physical(physical: [u32; 2], scale_factor: f64) -> Option<Self> {
        if physical[0] == 0 || physical[1] == 0 || scale_factor <= 0.0 {
            return None;
        }
        let logical = |px: u32| ((px as f64 / scale_factor).round() as u32).max(1);
        Some(Self {
            width: logical(physical[0]),
            height: logical(physical[1]),
            pixel_ratio: scale_factor.min(Self::MAX_PIXEL_RATIO) as f32,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Size of the render targets, `width x pixel_ratio` by `height x pixel_ratio`.
    pub fn render_size(&self) -> [u32; 2] {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        [scale(self.width), scale(self.height)]
    }
}

/// Sample count of the HDR pass: 4x MSAA if the adapter can do it.
pub fn supported_sample_count(adapter: &wgpu::Adapter) -> u32 {
    let samples = 4;
    let hdr = adapter.get_texture_format_features(Texture::HDR_FORMAT);
    let depth = adapter.get_texture_format_features(Texture::DEPTH_FORMAT);
    let supported = hdr.flags.sample_count_supported(samples)
        && hdr
            .flags
            .contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
        && depth.flags.sample_count_supported(samples);
    if supported {
        samples
    } else {
        log::warn!("{samples}x MSAA is not supported, rendering without antialiasing");
        1
    }
}

/// Render targets that follow the window size.
#[derive(Debug)]
struct Targets {
    /// Multisampled scene colour, `None` without MSAA.
    hdr_msaa: Option<Texture>,
    /// Single sampled scene colour read by the tone mapping pass.
    hdr: Texture,
    depth: Texture,
}

impl Targets {
    fn new(device: &wgpu::Device, size: [u32; 2], sample_count: u32) -> Self {
        Self {
            hdr_msaa: (sample_count > 1).then(|| {
                Texture::create_render_target(
                    device,
                    size,
                    Texture::HDR_FORMAT,
                    sample_count,
                    "hdr_msaa_target",
                )
            }),
            hdr: Texture::create_render_target(device, size, Texture::HDR_FORMAT, 1, "hdr_target"),
            depth: Texture::create_depth_texture(device, size, sample_count, "depth_texture"),
        }
    }
}

/// Forward renderer of [`Scene`]s.
#[derive(Debug)]
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
    sizes: Sizes,
    targets: Targets,

    material_bind_group_layout: wgpu::BindGroupLayout,
    frame_bind_group_layout: wgpu::BindGroupLayout,
    defaults: DefaultTextures,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,

    shadow_pipeline: wgpu::RenderPipeline,
    shadow_bind_group: wgpu::BindGroup,
    shadow_map: Texture,
    shadow_map_size: u32,
    /// Bumped whenever `shadow_map` is recreated.
    shadow_map_generation: u64,

    default_environment: Arc<Texture>,
    environment_sampler: wgpu::Sampler,
    /// Keyed by environment texture and shadow map generation.
    frame_bind_group: Option<((usize, u64), wgpu::BindGroup)>,

    pbr: PbrPipelines,
    background: BackgroundPass,
    tone_mapping: ToneMappingPass,
    gui_pipeline: wgpu::RenderPipeline,
    warned_about_lights: bool,
    warned_about_environment: bool,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        sizes: Sizes,
    ) -> Self {
        let material_bind_group_layout = material_bind_group_layout(device);
        let frame_bind_group_layout = mk_frame_bind_group_layout(device);
        let shadow_bind_group_layout = mk_shadow_bind_group_layout(device);

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::unlit(None)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_bind_group =
            mk_shadow_bind_group(device, &shadow_bind_group_layout, &light_buffer);
        let shadow_map_size = 1;
        let mut tone_mapping = ToneMappingPass::new(device, surface_format);
        let targets = Targets::new(device, sizes.render_size(), sample_count);
        tone_mapping.set_input(device, &targets.hdr);

        Self {
            shadow_pipeline: mk_shadow_pipeline(device, &shadow_bind_group_layout),
            shadow_bind_group,
            shadow_map: Texture::create_shadow_map(device, shadow_map_size),
            shadow_map_size,
            shadow_map_generation: 0,
            default_environment: Arc::new(Texture::create_default_environment(device, queue)),
            environment_sampler: create_environment_sampler(device),
            frame_bind_group: None,
            pbr: PbrPipelines::new(
                device,
                &frame_bind_group_layout,
                &material_bind_group_layout,
                sample_count,
            ),
            background: BackgroundPass::new(device, &frame_bind_group_layout, sample_count),
            tone_mapping,
            gui_pipeline: mk_gui_pipeline(device, surface_format),
            defaults: DefaultTextures::new(device, queue),
            device: device.clone(),
            queue: queue.clone(),
            surface_format,
            sample_count,
            sizes,
            targets,
            material_bind_group_layout,
            frame_bind_group_layout,
            camera_uniform,
            camera_buffer,
            light_buffer,
            warned_about_lights: false,
            warned_about_environment: false,
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn sizes(&self) -> Sizes {
        self.sizes
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Recreates the size dependent render targets.
    pub fn set_size(&mut self, sizes: Sizes) {
        if sizes == self.sizes {
            return;
        }
        self.sizes = sizes;
        self.targets = Targets::new(&self.device, sizes.render_size(), self.sample_count);
        self.tone_mapping.set_input(&self.device, &self.targets.hdr);
        log::debug!(
            "render targets resized to {:?} (pixel ratio {})",
            sizes.render_size(),
            sizes.pixel_ratio
        );
    }

    /// Clear value for the output view, encoded for non-sRGB surfaces.
    fn output_clear(&self, colour: wgpu::Color) -> wgpu::Color {
        if self.surface_format.is_srgb() {
            return colour;
        }
        let encode = |c: f64| {
            if c <= 0.0031308 {
                c * 12.92
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            }
        };
        wgpu::Color {
            r: encode(colour.r),
            g: encode(colour.g),
            b: encode(colour.b),
            a: colour.a,
        }
    }

    /// Fills `view` with `colour`, for frames without any scene.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, colour: wgpu::Color) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.output_clear(colour)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
    }

    fn ensure_shadow_map(&mut self, size: u32) {
        let size = size.max(1);
        if size != self.shadow_map_size {
            self.shadow_map = Texture::create_shadow_map(&self.device, size);
            self.shadow_map_size = size;
            self.shadow_map_generation += 1;
        }
    }

    fn ensure_frame_bind_group(&mut self, environment: &Arc<Texture>) {
        let key = (Arc::as_ptr(environment) as usize, self.shadow_map_generation);
        if self
            .frame_bind_group
            .as_ref()
            .is_some_and(|(bound, _)| *bound == key)
        {
            return;
        }
        let Some(shadow_sampler) = self.shadow_map.sampler.as_ref() else {
            return;
        };
        let bind_group = mk_frame_bind_group(
            &self.device,
            &self.frame_bind_group_layout,
            &self.camera_buffer,
            &self.light_buffer,
            &self.shadow_map,
            shadow_sampler,
            environment,
            &self.environment_sampler,
        );
        self.frame_bind_group = Some((key, bind_group));
    }

    /// Renders `scene` as seen by `camera` onto `view`.
    ///
    /// `clear` selects whether `view` is first cleared to the settings' clear
    /// colour or the tone mapped scene is blended over what is already there.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        scene: &mut Scene,
        camera: &PerspectiveCamera,
        settings: &RendererSettings,
        clear: bool,
    ) {
        scene.write_to_buffers(&Uploader {
            device: &self.device,
            queue: &self.queue,
            material_layout: &self.material_bind_group_layout,
            defaults: &self.defaults,
        });

        self.camera_uniform.update_view_proj(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );

        if scene.lights.len() > 1 && !self.warned_about_lights {
            log::warn!(
                "scene has {} directional lights, only the first one is rendered",
                scene.lights.len()
            );
            self.warned_about_lights = true;
        }
        let scene_environment = scene.environment.as_ref().filter(|environment| {
            let usable = environment.mapping.is_panorama();
            if !usable && !self.warned_about_environment {
                log::warn!("environment maps must be equirectangular panoramas, ignoring it");
                self.warned_about_environment = true;
            }
            usable
        });
        let environment = scene_environment
            .cloned()
            .unwrap_or_else(|| self.default_environment.clone());
        let environment_bound = scene_environment.map(|environment| environment.as_ref());
        let shadows = settings.shadow_map_enabled.then_some(settings.shadow_map_type);
        let light = scene.lights.first();
        let light_uniform = match light {
            Some(light) => {
                LightUniform::new(light, shadows, settings.use_legacy_lights, environment_bound)
            }
            None => LightUniform::unlit(environment_bound),
        };
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[light_uniform]));

        let shadow_caster = light.filter(|light| light.cast_shadow && shadows.is_some());
        if let Some(light) = shadow_caster {
            self.ensure_shadow_map(light.shadow.map_size);
        }
        self.ensure_frame_bind_group(&environment);
        if let Some(background) = &scene.background {
            self.background.prepare(&self.device, background);
        }

        let Some((_, frame_bind_group)) = self.frame_bind_group.as_ref() else {
            log::error!("frame resources are missing, skipping the scene");
            return;
        };
        let instances = scene.get_render();

        if shadow_caster.is_some() {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            shadow_pass.set_pipeline(&self.shadow_pipeline);
            for instanced in instances.iter().filter(|instanced| instanced.cast_shadow) {
                shadow_pass.draw_mesh_depth(
                    instanced.geometry,
                    instanced.instance,
                    &self.shadow_bind_group,
                );
            }
        }

        {
            let (colour_view, resolve_target) = match &self.targets.hdr_msaa {
                Some(msaa) => (&msaa.view, Some(&self.targets.hdr.view)),
                None => (&self.targets.hdr.view, None),
            };
            let mut hdr_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("HDR Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: colour_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if scene.background.is_some() {
                if let Some((pipeline, background)) = self.background.bound() {
                    hdr_pass.set_pipeline(pipeline);
                    hdr_pass.set_bind_group(0, frame_bind_group, &[]);
                    hdr_pass.set_bind_group(1, background, &[]);
                    hdr_pass.draw(0..3, 0..1);
                }
            }

            for instanced in instances.iter() {
                hdr_pass.set_pipeline(self.pbr.for_side(instanced.side));
                hdr_pass.draw_mesh_instanced(
                    instanced.geometry,
                    instanced.material,
                    instanced.instance,
                    0..1,
                    frame_bind_group,
                );
            }
        }

        self.tone_mapping.write_uniform(
            &self.queue,
            ToneMappingUniform::new(
                settings.tone_mapping,
                settings.tone_mapping_exposure,
                self.surface_format,
            ),
        );
        let load = if clear {
            wgpu::LoadOp::Clear(self.output_clear(settings.clear_colour))
        } else {
            wgpu::LoadOp::Load
        };
        let mut tone_mapping_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Tone Mapping Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        if let Some(bind_group) = &self.tone_mapping.bind_group {
            tone_mapping_pass.set_pipeline(&self.tone_mapping.pipeline);
            tone_mapping_pass.set_bind_group(0, bind_group, &[]);
            tone_mapping_pass.draw(0..3, 0..1);
        }
    }

    /// Draws `quads` over whatever `view` already holds.
    ///
    /// Quad colours are sRGB and are linearised for sRGB surfaces.
    pub fn draw_overlay(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        target_size: [u32; 2],
        quads: &[GuiQuad],
    ) {
        if quads.is_empty() {
            return;
        }
        let (width, height) = (target_size[0].max(1) as f32, target_size[1].max(1) as f32);
        let linearise = self.surface_format.is_srgb();
        let vertices: Vec<GuiVertex> = quads
            .iter()
            .flat_map(|quad| {
                let mut quad = *quad;
                if linearise {
                    for c in quad.color.iter_mut().take(3) {
                        *c = srgb_to_linear(*c);
                    }
                }
                quad.to_vertices(width, height)
            })
            .collect();
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Gui Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Gui Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.gui_pipeline);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..vertices.len() as u32, 0..1);
    }
}
