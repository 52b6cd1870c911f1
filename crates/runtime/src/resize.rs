use crate::context::{AppContext, CameraControls};
use rondavel_common::ViewportSize;
use rondavel_render::SceneRenderer;

/// What the host environment reports about its display surface.
pub trait HostViewport {
    /// Logical size of the output surface.
    fn viewport_size(&self) -> ViewportSize;

    /// Physical pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f64;
}

/// Result of one resize reconciliation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    Applied {
        size: ViewportSize,
        aspect: f32,
        pixel_ratio: f64,
    },
    /// The host reported a zero dimension (e.g. a minimised window); nothing
    /// was changed.
    Skipped,
}

/// `min(ratio, max)`.
pub fn clamp_pixel_ratio(ratio: f64, max: f64) -> f64 {
    ratio.min(max)
}

/// Bring the stored viewport, camera projection and renderer output in line
/// with what the host currently reports.
///
/// Runs to completion before returning, so the next draw sees either none or
/// all of its effects.
pub fn reconcile_resize<R, C>(ctx: &mut AppContext<R, C>, host: &impl HostViewport) -> ResizeOutcome
where
    R: SceneRenderer,
    C: CameraControls,
{
    let size = host.viewport_size();
    let Some(aspect) = size.aspect().filter(|_| size.width > 0) else {
        tracing::debug!("ignoring empty viewport {size}");
        return ResizeOutcome::Skipped;
    };

    ctx.viewport = size;

    ctx.camera.set_aspect(aspect);
    ctx.camera.update_projection_matrix();

    ctx.renderer.set_size(size);
    let pixel_ratio = clamp_pixel_ratio(host.device_pixel_ratio(), ctx.max_pixel_ratio);
    ctx.renderer.set_pixel_ratio(pixel_ratio);
    ctx.pixel_ratio = pixel_ratio;

    tracing::info!("viewport {size} aspect {aspect:.3} pixel ratio {pixel_ratio}");
    ResizeOutcome::Applied {
        size,
        aspect,
        pixel_ratio,
    }
}
