//! Frame Loop & Resize Reconciler.
//!
//! # Invariants
//! - Each frame reads the clock, updates the controls, draws, then requests
//!   exactly one further frame, in that order.
//! - A failed draw requests nothing, so the loop stops.
//! - The stored viewport always equals the last non-empty size the host
//!   reported; camera aspect and renderer size follow it before the next draw.
//! - Everything runs on the host's single event thread; nothing here locks.

mod context;
mod frame_loop;
mod resize;

pub use context::{AppContext, CameraControls};
pub use frame_loop::{FrameLoop, FrameSource};
pub use resize::{HostViewport, ResizeOutcome, clamp_pixel_ratio, reconcile_resize};
