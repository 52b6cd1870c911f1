//! Scene Assembly: the scene graph and everything placed in it.
//!
//! # Invariants
//! - Nodes are added once and never removed or reparented.
//! - Iteration follows insertion order, parents before children.
//! - The camera's cached projection is only stale between `set_aspect` and
//!   `update_projection_matrix`.

pub mod assembly;
pub mod camera;
pub mod clock;
pub mod config;
pub mod geometry;
pub mod graph;
pub mod light;
pub mod material;

pub use assembly::{Assembly, SceneHandles, assemble};
pub use camera::PerspectiveCamera;
pub use clock::Clock;
pub use config::{
    AmbientConfig, CameraConfig, ConfigError, MoonConfig, RendererConfig, RondavelSizes, SceneConfig,
};
pub use geometry::{Geometry, MeshData};
pub use graph::{Node, NodeKind, SceneError, SceneGraph};
pub use light::{DirectionalShadow, Light};
pub use material::StandardMaterial;
