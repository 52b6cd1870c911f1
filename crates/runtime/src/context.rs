use crate::resize::{HostViewport, ResizeOutcome, reconcile_resize};
use rondavel_common::ViewportSize;
use rondavel_controls::{ControlAction, OrbitControls};
use rondavel_render::SceneRenderer;
use rondavel_scene::{
    Assembly, Clock, PerspectiveCamera, SceneConfig, SceneError, SceneGraph, SceneHandles,
    assemble,
};

/// Per-frame camera controller.
pub trait CameraControls {
    /// Advance controller state and move the camera. Returns whether it moved.
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool;

    /// Feed one input action. Controllers without input ignore it.
    fn handle(&mut self, _action: ControlAction, _camera: &PerspectiveCamera, _surface: ViewportSize) {}
}

impl CameraControls for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        OrbitControls::update(self, camera)
    }

    fn handle(&mut self, action: ControlAction, camera: &PerspectiveCamera, surface: ViewportSize) {
        OrbitControls::handle(self, action, camera, surface)
    }
}

/// All state shared by the frame loop and the resize handler.
///
/// Constructed once at startup and passed by `&mut` into every host
/// callback; there are no globals.
pub struct AppContext<R, C> {
    pub scene: SceneGraph,
    pub camera: PerspectiveCamera,
    pub handles: SceneHandles,
    pub renderer: R,
    pub controls: C,
    pub(crate) clock: Clock,
    pub(crate) viewport: ViewportSize,
    pub(crate) pixel_ratio: f64,
    pub(crate) max_pixel_ratio: f64,
}

impl<R: SceneRenderer, C: CameraControls> AppContext<R, C> {
    /// Wrap an assembled scene and size everything from the host.
    pub fn new(
        assembly: Assembly,
        renderer: R,
        controls: C,
        max_pixel_ratio: f64,
        host: &impl HostViewport,
    ) -> Self {
        let Assembly {
            scene,
            camera,
            handles,
            clock,
        } = assembly;
        let mut ctx = Self {
            scene,
            camera,
            handles,
            renderer,
            controls,
            clock,
            viewport: ViewportSize::default(),
            pixel_ratio: 1.0,
            max_pixel_ratio,
        };
        if let ResizeOutcome::Skipped = reconcile_resize(&mut ctx, host) {
            tracing::warn!("host reported an empty viewport at startup");
        }
        ctx
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Pixel ratio last applied to the renderer.
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn max_pixel_ratio(&self) -> f64 {
        self.max_pixel_ratio
    }

    /// Route an input action to the controls, relative to the viewport.
    pub fn handle_input(&mut self, action: ControlAction) {
        self.controls.handle(action, &self.camera, self.viewport);
    }
}

impl<R: SceneRenderer> AppContext<R, OrbitControls> {
    /// Assemble the scene from `config` and bind orbit controls to its camera.
    pub fn from_config(
        config: &SceneConfig,
        renderer: R,
        host: &impl HostViewport,
    ) -> Result<Self, SceneError> {
        let assembly = assemble(config, host.viewport_size())?;
        let mut controls = OrbitControls::new(&assembly.camera);
        controls.enable_damping = config.camera.enable_damping;
        controls.damping_factor = config.camera.damping_factor;
        Ok(Self::new(
            assembly,
            renderer,
            controls,
            config.renderer.max_pixel_ratio,
            host,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resize::tests::FixedHost;
    use rondavel_render::{DebugTextRenderer, RenderSettings};

    #[test]
    fn startup_sizes_renderer_and_camera() {
        let host = FixedHost::new(1280, 720, 1.0);
        let ctx = AppContext::from_config(
            &SceneConfig::default(),
            DebugTextRenderer::new(RenderSettings::default()),
            &host,
        )
        .unwrap();
        assert_eq!(ctx.viewport(), ViewportSize::new(1280, 720));
        assert_eq!(ctx.renderer.size(), ViewportSize::new(1280, 720));
        assert_eq!(ctx.camera.aspect(), 1280.0 / 720.0);
        assert_eq!(ctx.pixel_ratio(), 1.0);
        assert!(ctx.controls.enable_damping);
        assert_eq!(ctx.controls.damping_factor, 0.05);
    }

    #[test]
    fn clock_comes_from_assembly() {
        let t0 = std::time::Instant::now();
        let mut assembly =
            assemble(&SceneConfig::default(), ViewportSize::new(800, 600)).unwrap();
        assembly.clock = Clock::started_at(t0);
        let ctx = AppContext::new(
            assembly,
            DebugTextRenderer::new(RenderSettings::default()),
            OrbitControls::default(),
            2.0,
            &FixedHost::new(800, 600, 1.0),
        );
        assert_eq!(ctx.clock.started(), t0);
    }

    #[test]
    fn input_reaches_controls() {
        let host = FixedHost::new(800, 600, 1.0);
        let mut ctx = AppContext::from_config(
            &SceneConfig::default(),
            DebugTextRenderer::new(RenderSettings::default()),
            &host,
        )
        .unwrap();
        ctx.handle_input(ControlAction::Rotate { dx: 40.0, dy: 0.0 });
        assert!(ctx.controls.is_settling());
    }

    #[test]
    fn empty_startup_viewport_keeps_defaults() {
        let host = FixedHost::new(0, 0, 2.0);
        let ctx = AppContext::from_config(
            &SceneConfig::default(),
            DebugTextRenderer::new(RenderSettings::default()),
            &host,
        )
        .unwrap();
        assert_eq!(ctx.viewport(), ViewportSize::default());
        assert_eq!(ctx.camera.aspect(), 1.0);
    }
}
