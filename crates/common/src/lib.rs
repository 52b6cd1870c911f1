//! Shared types for the rondavel scene.
//!
//! # Invariants
//! - Colours are stored in sRGB and converted to linear only at shading time.
//! - A `ViewportSize` with a zero dimension has no aspect ratio.

mod color;
mod types;

pub use color::Color;
pub use types::{NodeId, Transform, ViewportSize};
