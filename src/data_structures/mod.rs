//! Engine data structures: geometry, materials, lights, textures and the scene graph.
//!
//! - `geometry` holds CPU vertex data and lazily uploads it
//! - `material` contains standard (PBR) and basic materials and their GPU side
//! - `light` is the directional light and its shadow settings
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `model` holds the vertex layout and draw helpers
//! - `instance` holds node transforms and their GPU layout
//! - `scene_graph` enables hierarchical scene organization

pub mod geometry;
pub mod instance;
pub mod light;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
