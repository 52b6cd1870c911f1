//! wgpu render backend for the rondavel scene.
//!
//! Draws every mesh in the graph with ambient plus directional lighting and
//! a shadow map from the first shadow-casting light. The scene is drawn into
//! an offscreen target sized to the drawing buffer (logical size times the
//! clamped pixel ratio), then scaled onto the window surface, and an optional
//! egui overlay is painted on top.
//!
//! # Invariants
//! - Renderer never mutates the scene or the camera.
//! - A lost or outdated surface reconfigures and skips the frame; only
//!   unrecoverable surface errors reach the caller.

mod gpu;
mod mesh;
mod renderer;
mod shaders;

pub use gpu::{GpuContext, RenderError};
pub use renderer::{UiFrame, WgpuRenderer};
