//! Camera Controls: pointer input mapped to actions, actions applied to the
//! camera by `OrbitControls`.
//!
//! # Invariants
//! - Hosts translate raw events into `ControlAction`s; controls never see
//!   platform types.
//! - Only `OrbitControls::update` moves the camera.

pub mod action;
pub mod orbit;

pub use action::ControlAction;
pub use orbit::OrbitControls;
