//! realistic-render
//!
//! Two small wgpu scenes sharing one engine, native and WASM alike: an
//! environment lit, shadowed and tone mapped showcase tuned through a debug
//! panel, and a structured Experience/World/Environment variant.
//!
//! High-level modules
//! - `camera`: perspective camera, its uniform and orbit controls
//! - `context`: central GPU and window context that owns device/queue/renderer
//! - `data_structures`: geometry, materials, lights, textures and the scene graph
//! - `flow`: high level flow control (scenes / update loops)
//! - `gui`: keyboard driven debug panel drawn as overlay quads
//! - `pipelines`: PBR, shadow, background, tone mapping and overlay pipelines
//! - `resources`: loaders for textures, HDR environment maps and glTF models
//! - `render`: the frame renderer and what flows hand to it
//! - `demos` / `experience`: the two scenes
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod demos;
pub mod experience;
pub mod flow;
pub mod gui;
pub mod pipelines;
pub mod resources;
pub mod render;

use flow::{FlowConsturctor, GraphicsFlow};

// Re-exports commonly used types for convenience in downstream code.
pub use winit::dpi::PhysicalPosition;
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use wgpu::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Runs the environment lit showcase with its debug panel.
pub fn realistic_render() -> anyhow::Result<()> {
    let realistic: FlowConsturctor<demos::RealisticState, ()> = Box::new(|ctx| {
        Box::pin(async move {
            Box::new(demos::RealisticRender::new(ctx).await) as Box<dyn GraphicsFlow<_, _>>
        })
    });
    flow::run(vec![realistic])
}

/// Runs the Experience/World/Environment scene.
pub fn structured() -> anyhow::Result<()> {
    let experience: FlowConsturctor<experience::Experience, ()> = Box::new(|ctx| {
        Box::pin(async move {
            Box::new(experience::ExperienceFlow::new(ctx).await) as Box<dyn GraphicsFlow<_, _>>
        })
    });
    flow::run(vec![experience])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_realistic_render() -> Result<(), JsValue> {
    realistic_render().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_structured() -> Result<(), JsValue> {
    structured().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
