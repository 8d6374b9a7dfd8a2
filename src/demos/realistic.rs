//! An environment lit scene: a hamburger on a wooden floor in front of a brick
//! wall, a shadow casting sun and a panel to play with the lighting.

use std::{f32::consts::PI, sync::Arc};

use cgmath::{Rad, Vector3};
use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    camera::{OrbitControls, PerspectiveCamera},
    context::{Context, InitContext},
    data_structures::{
        geometry::Geometry,
        instance::Instance,
        light::DirectionalLight,
        material::{Material, Side, StandardMaterial},
        scene_graph::{MeshNode, Scene, SceneNode, update_all_materials},
        texture::{ColorSpace, Texture},
    },
    flow::{GraphicsFlow, Out},
    gui::DebugPanel,
    render::{Render, RendererSettings, ShadowMapType, Sizes, ToneMapping},
    resources::{GltfLoader, RgbeLoader, TextureLoader},
};

pub const TITLE: &str = "Realistic render";

pub const ENVIRONMENT_MAP: &str = "/environmentMaps/0/2k.hdr";
pub const HAMBURGER: &str = "/models/hamburger.glb";
pub const FLOOR: &str = "floor";
pub const WALL: &str = "wall";

const WOOD: &str = "textures/wood_cabinet_worn_long/wood_cabinet_worn_long";
const BRICKS: &str = "textures/castle_brick_broken_06/castle_brick_broken_06";

type Mutation = Box<dyn FnOnce(&mut RealisticState)>;

/// Values the panel edits that have no home in the scene itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Global {
    pub env_map_intensity: f32,
}

impl Default for Global {
    fn default() -> Self {
        Self {
            env_map_intensity: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct RealisticState {
    pub global: Global,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub settings: RendererSettings,
}

impl Default for RealisticState {
    fn default() -> Self {
        let mut scene = Scene::new();

        let mut sun = DirectionalLight::new(0xffffff, 2.0);
        sun.name = "sun".to_string();
        sun.position = Vector3::new(-4.0, 6.5, 2.5);
        sun.target = Vector3::new(0.0, 4.0, 0.0);
        sun.cast_shadow = true;
        sun.shadow.camera_far = 15.0;
        sun.shadow.map_size = 512;
        sun.shadow.normal_bias = -0.004;
        sun.shadow.bias = -0.015;
        scene.add_light(sun);

        // Floor and wall share one plane
        let plane = Arc::new(Geometry::plane(8.0, 8.0));
        let double_sided = || {
            Material::Standard(StandardMaterial {
                side: Side::Double,
                ..Default::default()
            })
        };
        let floor = MeshNode::new(FLOOR, plane.clone(), double_sided())
            .with_transform(Instance::new().with_rotation_x(Rad(-PI * 0.5)));
        let wall = MeshNode::new(WALL, plane, double_sided())
            .with_transform(Instance::at(0.0, 4.0, -4.0));
        scene.add(Box::new(floor));
        scene.add(Box::new(wall));

        let mut camera = PerspectiveCamera::new(75.0, Sizes::default().aspect(), 0.1, 100.0);
        camera.position = Vector3::new(4.0, 5.0, 4.0);
        camera.look_at(Vector3::new(0.0, 3.5, 0.0));
        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = true;

        let settings = RendererSettings {
            shadow_map_enabled: true,
            shadow_map_type: ShadowMapType::PcfSoft,
            tone_mapping: ToneMapping::Reinhard,
            tone_mapping_exposure: 3.0,
            use_legacy_lights: false,
            ..Default::default()
        };

        Self {
            global: Global::default(),
            scene,
            camera,
            controls,
            settings,
        }
    }
}

impl RealisticState {
    pub fn light(&self) -> Option<&DirectionalLight> {
        self.scene.lights.first()
    }

    pub fn light_mut(&mut self) -> Option<&mut DirectionalLight> {
        self.scene.lights.first_mut()
    }

    /// Re-applies the global environment intensity and shadow flags to every
    /// standard material, e.g. after a model was added.
    pub fn update_all_materials(&mut self) -> usize {
        update_all_materials(&mut self.scene, self.global.env_map_intensity)
    }

    pub fn resize(&mut self, sizes: Sizes) {
        self.camera.set_aspect(sizes.aspect());
        self.camera.update_projection_matrix();
        self.controls
            .set_viewport_height((sizes.height as f32 * sizes.pixel_ratio) as u32);
    }

    /// Uses a loaded panorama as background and environment. A failed load is
    /// logged and leaves the scene as it is.
    pub fn apply_environment(&mut self, result: anyhow::Result<Arc<Texture>>) {
        match result {
            Ok(map) => {
                self.scene.background = Some(map.clone());
                self.scene.environment = Some(map);
            }
            Err(e) => log::error!("Cannot load the environment map: {e:#}"),
        }
    }

    pub fn apply_surface(&mut self, mesh: &str, result: anyhow::Result<SurfaceTextures>) {
        match result {
            Ok(textures) => {
                if !textures.apply(&mut self.scene, mesh) {
                    log::warn!("No mesh named {mesh} to put the textures on");
                }
            }
            Err(e) => log::error!("Cannot load the {mesh} textures: {e:#}"),
        }
    }

    /// Places the model above the floor and gives it the global material settings.
    pub fn apply_hamburger(&mut self, result: anyhow::Result<Box<dyn SceneNode>>) {
        match result {
            Ok(mut model) => {
                model.set_local_transform(Instance::at(0.0, 2.5, 0.0).with_uniform_scale(0.4));
                self.scene.add(model);
                self.update_all_materials();
            }
            Err(e) => log::error!("Cannot load {HAMBURGER}: {e:#}"),
        }
    }
}

/// Colour, ARM and normal map of one surface.
#[derive(Debug, Clone)]
pub struct SurfaceTextures {
    pub color: Arc<Texture>,
    pub arm: Arc<Texture>,
    pub normal: Arc<Texture>,
}

impl SurfaceTextures {
    /// Loads `<prefix>_diff_1k.jpg`, `<prefix>_arm_1k.jpg` and `<prefix>_nor_gl_1k.png`.
    pub async fn load(loader: &TextureLoader, prefix: &str) -> anyhow::Result<Self> {
        let color_path = format!("{prefix}_diff_1k.jpg");
        let arm_path = format!("{prefix}_arm_1k.jpg");
        let normal_path = format!("{prefix}_nor_gl_1k.png");
        let (color, arm, normal) = futures::try_join!(
            loader.load(&color_path, ColorSpace::Srgb),
            loader.load(&arm_path, ColorSpace::Linear),
            loader.load(&normal_path, ColorSpace::Linear),
        )?;
        Ok(Self { color, arm, normal })
    }

    /// Puts the maps on the standard material of `mesh`. Returns `false` if
    /// there is no such mesh.
    pub fn apply(self, scene: &mut Scene, mesh: &str) -> bool {
        let Some(material) = scene
            .find_mesh_mut(mesh)
            .and_then(|mesh| mesh.material.as_standard_mut())
        else {
            return false;
        };
        let mut textured = std::mem::take(material).with_arm_map(self.arm);
        textured.map = Some(self.color);
        textured.normal_map = Some(self.normal);
        *material = textured;
        true
    }
}

pub struct RealisticRender {
    panel: DebugPanel<RealisticState>,
    textures: TextureLoader,
    environment: RgbeLoader,
    models: GltfLoader,
}

impl RealisticRender {
    pub async fn new(ctx: InitContext) -> Self {
        Self {
            panel: debug_panel(),
            textures: TextureLoader::new(&ctx.device, &ctx.queue),
            environment: RgbeLoader::new(&ctx.device, &ctx.queue),
            models: GltfLoader::new(&ctx.device, &ctx.queue),
        }
    }

    pub fn panel(&self) -> &DebugPanel<RealisticState> {
        &self.panel
    }

    fn load_environment(&self) -> Box<dyn Future<Output = Mutation>> {
        let loader = self.environment.clone();
        Box::new(async move {
            let result = loader.load(ENVIRONMENT_MAP).await;
            Box::new(move |state: &mut RealisticState| state.apply_environment(result)) as Mutation
        })
    }

    fn load_surface(&self, prefix: &'static str, mesh: &'static str) -> Box<dyn Future<Output = Mutation>> {
        let loader = self.textures.clone();
        Box::new(async move {
            let result = SurfaceTextures::load(&loader, prefix).await;
            Box::new(move |state: &mut RealisticState| state.apply_surface(mesh, result)) as Mutation
        })
    }

    fn load_hamburger(&self) -> Box<dyn Future<Output = Mutation>> {
        let loader = self.models.clone();
        Box::new(async move {
            let result = loader.load(HAMBURGER).await;
            Box::new(move |state: &mut RealisticState| state.apply_hamburger(result)) as Mutation
        })
    }
}

/// The controls of the realistic scene, in display order.
pub fn debug_panel() -> DebugPanel<RealisticState> {
    let mut panel = DebugPanel::new(TITLE);

    panel
        .add_slider(
            "envMapIntensity",
            |s: &RealisticState| s.global.env_map_intensity,
            |s, v| s.global.env_map_intensity = v,
        )
        .min(0.0)
        .max(10.0)
        .step(0.001)
        .on_change(|s| {
            s.update_all_materials();
        });

    panel
        .add_slider(
            "Light Intensity",
            |s: &RealisticState| s.light().map_or(0.0, |l| l.intensity),
            |s, v| {
                if let Some(light) = s.light_mut() {
                    light.intensity = v;
                }
            },
        )
        .min(0.0)
        .max(10.0)
        .step(0.001);

    let axes: [(&str, fn(&mut Vector3<f32>) -> &mut f32); 3] = [
        ("Light X", |p| &mut p.x),
        ("Light Y", |p| &mut p.y),
        ("Light Z", |p| &mut p.z),
    ];
    for (name, axis) in axes {
        panel
            .add_slider(
                name,
                move |s: &RealisticState| {
                    s.light().map_or(0.0, |l| {
                        let mut position = l.position;
                        *axis(&mut position)
                    })
                },
                move |s, v| {
                    if let Some(light) = s.light_mut() {
                        *axis(&mut light.position) = v;
                    }
                },
            )
            .min(-10.0)
            .max(10.0)
            .step(0.001);
    }

    panel.add_toggle(
        "castShadow",
        |s: &RealisticState| s.light().is_some_and(|l| l.cast_shadow),
        |s, v| {
            if let Some(light) = s.light_mut() {
                light.cast_shadow = v;
            }
        },
    );
    panel
        .add_slider(
            "normalBias",
            |s: &RealisticState| s.light().map_or(0.0, |l| l.shadow.normal_bias),
            |s, v| {
                if let Some(light) = s.light_mut() {
                    light.shadow.normal_bias = v;
                }
            },
        )
        .min(-0.05)
        .max(0.05)
        .step(0.001);
    panel
        .add_slider(
            "bias",
            |s: &RealisticState| s.light().map_or(0.0, |l| l.shadow.bias),
            |s, v| {
                if let Some(light) = s.light_mut() {
                    light.shadow.bias = v;
                }
            },
        )
        .min(-0.05)
        .max(0.05)
        .step(0.001);

    let operators = ToneMapping::ALL.map(ToneMapping::name);
    panel.add_options(
        "toneMapping",
        &operators,
        |s: &RealisticState| s.settings.tone_mapping.index(),
        |s, i| s.settings.tone_mapping = ToneMapping::from_index(i),
    );
    panel
        .add_slider(
            "toneMappingExposure",
            |s: &RealisticState| s.settings.tone_mapping_exposure,
            |s, v| s.settings.tone_mapping_exposure = v,
        )
        .min(0.0)
        .max(10.0)
        .step(0.001);

    panel.add_toggle(
        "useLegacyLights",
        |s: &RealisticState| s.settings.use_legacy_lights,
        |s, v| s.settings.use_legacy_lights = v,
    );

    panel
}

impl GraphicsFlow<RealisticState, ()> for RealisticRender {
    fn on_init(&mut self, ctx: &mut Context, _: &mut RealisticState) -> Out<RealisticState, ()> {
        ctx.set_title(TITLE);
        Out::FutFn(vec![
            self.load_environment(),
            self.load_surface(WOOD, FLOOR),
            self.load_surface(BRICKS, WALL),
            self.load_hamburger(),
        ])
    }

    fn on_update(&mut self, _: &Context, state: &mut RealisticState, _: Duration) -> Out<RealisticState, ()> {
        state.controls.update(&mut state.camera);
        Out::Empty
    }

    fn on_resize(&mut self, _: &Context, state: &mut RealisticState, sizes: Sizes) -> Out<RealisticState, ()> {
        state.resize(sizes);
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut RealisticState, _: &DeviceEvent) -> Out<RealisticState, ()> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        state: &mut RealisticState,
        event: &WindowEvent,
    ) -> Out<RealisticState, ()> {
        if let Some(change) = self.panel.handle_window_event(state, event) {
            ctx.set_title(&self.panel.window_title(&change));
        }
        state.controls.handle_window_event(event);
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut RealisticState, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render<'a>(&'a self, ctx: &Context, state: &'a mut RealisticState) -> Render<'a> {
        let quads = self.panel.quads(
            state,
            ctx.config.width as f32,
            ctx.config.height as f32,
            ctx.window().scale_factor() as f32,
        );
        Render::Composed(vec![
            Render::Scene {
                scene: &mut state.scene,
                camera: &state.camera,
                settings: &state.settings,
            },
            Render::Overlay(quads),
        ])
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut RealisticState,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<crate::flow::ImageTestResult, anyhow::Error> {
        Ok(crate::flow::ImageTestResult::Passed)
    }
}
