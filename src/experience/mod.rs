//! The structured variant: one [`Experience`] owns sizes, time, scene, camera
//! and renderer settings, and builds its content through [`World`] and
//! [`Environment`].

mod environment;
mod time;
mod world;

pub use environment::Environment;
pub use time::Time;
pub use world::{PLACEHOLDER, World};

use cgmath::Vector3;
use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    camera::{OrbitControls, PerspectiveCamera},
    context::{Context, InitContext},
    data_structures::scene_graph::Scene,
    flow::{GraphicsFlow, Out},
    render::{Render, RendererSettings, ShadowMapType, Sizes, ToneMapping},
};

pub const TITLE: &str = "Structured";
pub const CLEAR_COLOUR: u32 = 0x211d20;

#[derive(Debug)]
pub struct Experience {
    pub sizes: Sizes,
    pub time: Time,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub settings: RendererSettings,
    pub world: World,
}

impl Experience {
    pub fn new(sizes: Sizes) -> Self {
        let mut scene = Scene::new();

        let mut camera = PerspectiveCamera::new(35.0, sizes.aspect(), 0.1, 100.0);
        camera.position = Vector3::new(6.0, 4.0, 8.0);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = true;
        controls.set_viewport_height((sizes.height as f32 * sizes.pixel_ratio) as u32);

        let mut settings = RendererSettings {
            shadow_map_enabled: true,
            shadow_map_type: ShadowMapType::PcfSoft,
            tone_mapping: ToneMapping::Cineon,
            tone_mapping_exposure: 1.75,
            use_legacy_lights: false,
            ..Default::default()
        };
        settings.set_clear_hex(CLEAR_COLOUR);

        let world = World::new(&mut scene);

        Self {
            sizes,
            time: Time::new(),
            scene,
            camera,
            controls,
            settings,
            world,
        }
    }

    pub fn resize(&mut self, sizes: Sizes) {
        self.sizes = sizes;
        self.camera.set_aspect(sizes.aspect());
        self.camera.update_projection_matrix();
        self.controls
            .set_viewport_height((sizes.height as f32 * sizes.pixel_ratio) as u32);
    }

    pub fn update(&mut self) {
        self.time.tick();
        self.controls.update(&mut self.camera);
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::new(Sizes::default())
    }
}

/// Drives an [`Experience`] held as the app state.
#[derive(Debug, Default)]
pub struct ExperienceFlow;

impl ExperienceFlow {
    pub async fn new(_: InitContext) -> Self {
        Self
    }
}

impl GraphicsFlow<Experience, ()> for ExperienceFlow {
    fn on_init(&mut self, ctx: &mut Context, state: &mut Experience) -> Out<Experience, ()> {
        ctx.set_title(TITLE);
        ctx.clear_colour = state.settings.clear_colour;
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, state: &mut Experience, _: Duration) -> Out<Experience, ()> {
        state.update();
        Out::Empty
    }

    fn on_resize(&mut self, _: &Context, state: &mut Experience, sizes: Sizes) -> Out<Experience, ()> {
        state.resize(sizes);
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut Experience, _: &DeviceEvent) -> Out<Experience, ()> {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, state: &mut Experience, event: &WindowEvent) -> Out<Experience, ()> {
        state.controls.handle_window_event(event);
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut Experience, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render<'a>(&'a self, _: &Context, state: &'a mut Experience) -> Render<'a> {
        Render::Scene {
            scene: &mut state.scene,
            camera: &state.camera,
            settings: &state.settings,
        }
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut Experience,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<crate::flow::ImageTestResult, anyhow::Error> {
        Ok(crate::flow::ImageTestResult::Passed)
    }
}
