use crate::context::{AppContext, CameraControls};
use rondavel_render::SceneRenderer;

/// Host capability that schedules the next frame, e.g. a window redraw
/// request or a headless step queue.
pub trait FrameSource {
    /// Ask for exactly one more call to `FrameLoop::tick` before the next
    /// display refresh.
    fn request_frame(&mut self);
}

/// The per-frame procedure: read the clock, update the controls, draw, and
/// schedule the next frame.
///
/// Re-scheduling goes through the host, never through recursion, so the call
/// depth stays constant however long the loop runs.
#[derive(Debug, Default)]
pub struct FrameLoop {
    frames: u64,
    elapsed: f64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Clock reading taken at the start of the last frame, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// First invocation; hosts call this once after assembly.
    pub fn start<R, C>(
        &mut self,
        ctx: &mut AppContext<R, C>,
        source: &mut impl FrameSource,
    ) -> Result<(), R::Error>
    where
        R: SceneRenderer,
        C: CameraControls,
    {
        tracing::info!("frame loop starting at {} ({})", ctx.viewport, ctx.pixel_ratio);
        self.tick(ctx, source)
    }

    /// One frame. On a draw error nothing is scheduled and the error is
    /// returned; the loop is over.
    pub fn tick<R, C>(
        &mut self,
        ctx: &mut AppContext<R, C>,
        source: &mut impl FrameSource,
    ) -> Result<(), R::Error>
    where
        R: SceneRenderer,
        C: CameraControls,
    {
        // Kept for parity with the frame contract; nothing animates off it yet.
        self.elapsed = ctx.clock.elapsed_time();

        ctx.controls.update(&mut ctx.camera);

        if let Err(e) = ctx.renderer.render(&ctx.scene, &ctx.camera) {
            tracing::error!("frame {} failed, stopping: {e}", self.frames);
            return Err(e);
        }
        self.frames += 1;

        source.request_frame();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resize::tests::FixedHost;
    use rondavel_common::ViewportSize;
    use rondavel_scene::{PerspectiveCamera, SceneConfig, SceneGraph, assemble};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    #[derive(Debug, thiserror::Error)]
    #[error("device lost")]
    struct DeviceLost;

    struct StubRenderer {
        log: Log,
        fail_on: Option<usize>,
        size: ViewportSize,
        ratio: f64,
    }

    impl SceneRenderer for StubRenderer {
        type Error = DeviceLost;

        fn render(&mut self, _: &SceneGraph, _: &PerspectiveCamera) -> Result<(), DeviceLost> {
            let draws = self.log.borrow().iter().filter(|e| **e == "draw").count();
            if self.fail_on == Some(draws) {
                return Err(DeviceLost);
            }
            self.log.borrow_mut().push("draw");
            Ok(())
        }

        fn set_size(&mut self, size: ViewportSize) {
            self.size = size;
        }

        fn set_pixel_ratio(&mut self, ratio: f64) {
            self.ratio = ratio;
        }

        fn size(&self) -> ViewportSize {
            self.size
        }

        fn pixel_ratio(&self) -> f64 {
            self.ratio
        }
    }

    struct StubControls(Log);

    impl CameraControls for StubControls {
        fn update(&mut self, _: &mut PerspectiveCamera) -> bool {
            self.0.borrow_mut().push("update");
            false
        }
    }

    #[derive(Default)]
    struct CountingSource {
        requested: usize,
    }

    impl FrameSource for CountingSource {
        fn request_frame(&mut self) {
            self.requested += 1;
        }
    }

    fn context(log: &Log, fail_on: Option<usize>) -> AppContext<StubRenderer, StubControls> {
        let host = FixedHost::new(800, 600, 1.0);
        let assembly = assemble(&SceneConfig::default(), ViewportSize::new(800, 600)).unwrap();
        let renderer = StubRenderer {
            log: log.clone(),
            fail_on,
            size: ViewportSize::default(),
            ratio: 1.0,
        };
        AppContext::new(assembly, renderer, StubControls(log.clone()), 2.0, &host)
    }

    #[test]
    fn n_ticks_alternate_update_and_draw() {
        let log = Log::default();
        let mut ctx = context(&log, None);
        let mut source = CountingSource::default();
        let mut frame_loop = FrameLoop::new();

        const N: usize = 25;
        frame_loop.start(&mut ctx, &mut source).unwrap();
        for _ in 1..N {
            frame_loop.tick(&mut ctx, &mut source).unwrap();
        }

        let log = log.borrow();
        assert_eq!(log.len(), 2 * N);
        for pair in log.chunks(2) {
            assert_eq!(pair, ["update", "draw"]);
        }
        assert_eq!(source.requested, N);
        assert_eq!(frame_loop.frames(), N as u64);
    }

    #[test]
    fn each_tick_requests_exactly_one_frame() {
        let log = Log::default();
        let mut ctx = context(&log, None);
        let mut source = CountingSource::default();
        let mut frame_loop = FrameLoop::new();
        for expected in 1..=3 {
            frame_loop.tick(&mut ctx, &mut source).unwrap();
            assert_eq!(source.requested, expected);
        }
    }

    #[test]
    fn draw_failure_stops_rescheduling() {
        let log = Log::default();
        let mut ctx = context(&log, Some(2));
        let mut source = CountingSource::default();
        let mut frame_loop = FrameLoop::new();

        frame_loop.tick(&mut ctx, &mut source).unwrap();
        frame_loop.tick(&mut ctx, &mut source).unwrap();
        assert!(frame_loop.tick(&mut ctx, &mut source).is_err());
        assert_eq!(source.requested, 2);
        assert_eq!(frame_loop.frames(), 2);
        // controls still ran before the failed draw
        assert_eq!(log.borrow().last(), Some(&"update"));
    }

    #[test]
    fn clock_is_read_every_frame() {
        let log = Log::default();
        let mut ctx = context(&log, None);
        let mut source = CountingSource::default();
        let mut frame_loop = FrameLoop::new();
        let mut last = 0.0;
        for _ in 0..5 {
            frame_loop.tick(&mut ctx, &mut source).unwrap();
            assert!(frame_loop.elapsed() >= last);
            last = frame_loop.elapsed();
        }
    }

    #[test]
    fn resize_between_frames_is_seen_by_next_draw() {
        let log = Log::default();
        let mut ctx = context(&log, None);
        let mut source = CountingSource::default();
        let mut frame_loop = FrameLoop::new();
        frame_loop.tick(&mut ctx, &mut source).unwrap();

        let host = FixedHost::new(1024, 768, 3.0);
        crate::reconcile_resize(&mut ctx, &host);
        assert!(!ctx.camera.needs_projection_update());
        frame_loop.tick(&mut ctx, &mut source).unwrap();
        assert_eq!(ctx.renderer.size(), ViewportSize::new(1024, 768));
        assert_eq!(ctx.renderer.pixel_ratio(), 2.0);
    }
}
