//! Developer Tooling: debug slider panel and scene inspector.
//!
//! # Invariants
//! - A slider never stores a value outside its range or off its step grid.
//! - The inspector only reads the scene.

mod debug_panel;
mod inspector;

pub use debug_panel::{DebugPanel, PanelError, SliderBinding};
pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
