//! Ready made flows. Each one backs a binary in `src/bin` and a wasm entry point.

pub mod realistic;

pub use realistic::{Global, RealisticRender, RealisticState};
