//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate either.
//! - The drawing buffer is the logical size scaled by the pixel ratio.
//!
//! `DebugTextRenderer` implements the same trait as the GPU backend and is
//! what headless hosts and tests draw with.

mod frame;
mod renderer;

pub use frame::{DirectionalItem, FramePacket, MeshItem};
pub use renderer::{
    DebugTextRenderer, RenderSettings, SceneRenderer, ShadowMapKind, ShadowMapSettings,
    drawing_buffer_size,
};
