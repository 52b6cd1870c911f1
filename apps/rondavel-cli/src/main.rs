use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rondavel_common::ViewportSize;
use rondavel_controls::ControlAction;
use rondavel_render::{DebugTextRenderer, RenderSettings};
use rondavel_runtime::{AppContext, FrameLoop, FrameSource, HostViewport, reconcile_resize};
use rondavel_scene::{SceneConfig, SceneGraph, assemble};
use rondavel_tools::{DebugPanel, SceneInspector};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rondavel-cli", about = "Headless tools for the rondavel scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (JSON); defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and a summary of the assembled scene
    Info,
    /// Print the effective scene config as JSON
    Config,
    /// List every node of the assembled scene
    Scene,
    /// List the debug sliders, optionally setting some first
    Panel {
        /// Assignments of the form "name=value", e.g. "moon x=-2"
        #[arg(short, long)]
        set: Vec<String>,
    },
    /// Drive the frame loop against the text renderer
    Simulate {
        /// Number of frames to draw
        #[arg(short, long, default_value = "3")]
        frames: u64,
        /// Initial viewport, as WIDTHxHEIGHT[@RATIO]
        #[arg(long, default_value = "1280x720@1")]
        viewport: String,
        /// Viewport to switch to halfway through, as WIDTHxHEIGHT[@RATIO]
        #[arg(long)]
        resize: Option<String>,
        /// Horizontal drag in pixels applied before the first frame
        #[arg(long, default_value = "0")]
        drag: f32,
    },
}

/// Host whose viewport is whatever the command line says.
struct HeadlessHost {
    size: ViewportSize,
    ratio: f64,
}

impl HostViewport for HeadlessHost {
    fn viewport_size(&self) -> ViewportSize {
        self.size
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.ratio
    }
}

/// Frame source that counts requests; the simulation loop drains them.
#[derive(Default)]
struct StepQueue {
    pending: u64,
}

impl FrameSource for StepQueue {
    fn request_frame(&mut self) {
        self.pending += 1;
    }
}

impl StepQueue {
    fn take(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }
}

fn parse_viewport(spec: &str) -> anyhow::Result<HeadlessHost> {
    let (size, ratio) = match spec.split_once('@') {
        Some((size, ratio)) => (
            size,
            ratio
                .parse::<f64>()
                .with_context(|| format!("bad pixel ratio in {spec:?}"))?,
        ),
        None => (spec, 1.0),
    };
    let Some((w, h)) = size.split_once('x') else {
        bail!("expected WIDTHxHEIGHT, got {spec:?}");
    };
    let width = w.parse().with_context(|| format!("bad width in {spec:?}"))?;
    let height = h.parse().with_context(|| format!("bad height in {spec:?}"))?;
    Ok(HeadlessHost {
        size: ViewportSize::new(width, height),
        ratio,
    })
}

/// Apply one `name=value` slider assignment and return the stored value.
fn apply_assignment(
    panel: &DebugPanel,
    scene: &mut SceneGraph,
    assignment: &str,
) -> anyhow::Result<f32> {
    let Some((name, value)) = assignment.split_once('=') else {
        bail!("expected name=value, got {assignment:?}");
    };
    let value: f32 = value
        .trim()
        .parse()
        .with_context(|| format!("bad value in {assignment:?}"))?;
    let stored = panel.set(scene, name.trim(), value)?;
    tracing::debug!("applied {} = {stored}", name.trim());
    Ok(stored)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => Ok(SceneConfig::load(path)?),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("rondavel-cli v{}", env!("CARGO_PKG_VERSION"));
            let viewport = ViewportSize::new(1280, 720);
            let a = assemble(&config, viewport)?;
            println!(
                "{}",
                SceneInspector::summary(&a.scene, &a.camera, viewport, 1.0)
            );
        }
        Commands::Config => {
            println!("{}", config.to_json_pretty()?);
        }
        Commands::Scene => {
            let a = assemble(&config, ViewportSize::new(1280, 720))?;
            for node in SceneInspector::list_nodes(&a.scene) {
                println!("{node}");
            }
        }
        Commands::Panel { set } => {
            let mut a = assemble(&config, ViewportSize::new(1280, 720))?;
            let panel = DebugPanel::with_defaults(&a.handles);
            for assignment in &set {
                apply_assignment(&panel, &mut a.scene, assignment)?;
            }
            for slider in panel.sliders() {
                println!("{slider} = {:.3}", slider.get(&a.scene)?);
            }
        }
        Commands::Simulate {
            frames,
            viewport,
            resize,
            drag,
        } => {
            let host = parse_viewport(&viewport)?;
            let resize = resize.as_deref().map(parse_viewport).transpose()?;
            let renderer = DebugTextRenderer::new(RenderSettings::from_config(&config.renderer));
            let mut ctx = AppContext::from_config(&config, renderer, &host)?;
            if drag != 0.0 {
                ctx.handle_input(ControlAction::Rotate { dx: drag, dy: 0.0 });
            }

            tracing::info!(
                "simulating {frames} frames at {} @{}",
                host.size,
                host.ratio
            );
            let mut queue = StepQueue::default();
            let mut frame_loop = FrameLoop::new();
            if frames > 0 {
                frame_loop.start(&mut ctx, &mut queue)?;
            }
            while frame_loop.frames() < frames && queue.take() {
                if frame_loop.frames() == frames / 2 {
                    if let Some(next) = resize.as_ref() {
                        let outcome = reconcile_resize(&mut ctx, next);
                        println!("resize: {outcome:?}");
                    }
                }
                frame_loop.tick(&mut ctx, &mut queue)?;
            }

            print!("{}", ctx.renderer.last_frame());
            println!(
                "{}",
                SceneInspector::summary(&ctx.scene, &ctx.camera, ctx.viewport(), ctx.pixel_ratio())
            );
            println!("frames drawn: {}", ctx.renderer.frames());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_viewport_specs() {
        let host = parse_viewport("1024x768@3").unwrap();
        assert_eq!(host.size, ViewportSize::new(1024, 768));
        assert_eq!(host.ratio, 3.0);

        let host = parse_viewport("500x500").unwrap();
        assert_eq!(host.ratio, 1.0);

        assert!(parse_viewport("500").is_err());
        assert!(parse_viewport("ax1").is_err());
        assert!(parse_viewport("1x1@fast").is_err());
    }

    #[test]
    fn assignments_set_sliders() {
        let mut a = assemble(&SceneConfig::default(), ViewportSize::new(1280, 720)).unwrap();
        let panel = DebugPanel::with_defaults(&a.handles);
        let stored = apply_assignment(&panel, &mut a.scene, "moon intensity = 2").unwrap();
        assert_eq!(stored, 1.0);
        assert_eq!(panel.get(&a.scene, "moon intensity").unwrap(), 1.0);

        assert!(apply_assignment(&panel, &mut a.scene, "moon x").is_err());
        assert!(apply_assignment(&panel, &mut a.scene, "moon x=far").is_err());
        assert!(apply_assignment(&panel, &mut a.scene, "sun=1").is_err());
    }

    #[test]
    fn step_queue_drains_requests() {
        let mut queue = StepQueue::default();
        assert!(!queue.take());
        queue.request_frame();
        queue.request_frame();
        assert!(queue.take());
        assert!(queue.take());
        assert!(!queue.take());
    }
}
