use crate::frame::FramePacket;
use rondavel_common::{Color, ViewportSize};
use rondavel_scene::{PerspectiveCamera, RendererConfig, SceneGraph};
use std::convert::Infallible;
use std::fmt::Write as _;

/// Shadow filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowMapKind {
    /// Single depth comparison per fragment.
    Basic,
    /// Hardware comparison sampled over a small kernel.
    #[default]
    PcfSoft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowMapSettings {
    pub enabled: bool,
    pub kind: ShadowMapKind,
}

/// Backend-independent output settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub clear_color: Color,
    pub shadow_map: ShadowMapSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            shadow_map: ShadowMapSettings::default(),
        }
    }
}

impl RenderSettings {
    pub fn from_config(config: &RendererConfig) -> Self {
        Self {
            clear_color: Color::parse(&config.clear_color),
            shadow_map: ShadowMapSettings {
                enabled: config.shadows,
                kind: if config.soft_shadows {
                    ShadowMapKind::PcfSoft
                } else {
                    ShadowMapKind::Basic
                },
            },
        }
    }
}

/// Physical drawing-buffer size for a logical size at a pixel ratio.
pub fn drawing_buffer_size(size: ViewportSize, pixel_ratio: f64) -> ViewportSize {
    let scale = |v: u32| (v as f64 * pixel_ratio).round().max(0.0) as u32;
    ViewportSize::new(scale(size.width), scale(size.height))
}

/// Renderer-agnostic drawing surface. All backends implement this trait.
///
/// `set_size` takes logical pixels; the backend allocates
/// `size * pixel_ratio` physical pixels.
pub trait SceneRenderer {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Draw one frame of `scene` as seen from `camera`.
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), Self::Error>;

    fn set_size(&mut self, size: ViewportSize);

    fn set_pixel_ratio(&mut self, ratio: f64);

    fn size(&self) -> ViewportSize;

    fn pixel_ratio(&self) -> f64;

    fn drawing_buffer_size(&self) -> ViewportSize {
        drawing_buffer_size(self.size(), self.pixel_ratio())
    }
}

/// Text renderer for headless runs.
///
/// Produces a human-readable description of each drawn frame instead of
/// pixels. Useful for CLI output, logging, and testing the render interface.
#[derive(Debug)]
pub struct DebugTextRenderer {
    settings: RenderSettings,
    size: ViewportSize,
    pixel_ratio: f64,
    frames: u64,
    last_frame: String,
}

impl DebugTextRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            size: ViewportSize::default(),
            pixel_ratio: 1.0,
            frames: 0,
            last_frame: String::new(),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Description of the most recent frame; empty before the first draw.
    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Describe a frame without counting it as drawn.
    pub fn describe(&self, scene: &SceneGraph, camera: &PerspectiveCamera) -> String {
        let packet = FramePacket::collect(scene, camera);
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({} @{:.2}, buffer {}) clear=#{:06x} shadows={} ===",
            self.frames,
            self.size,
            self.pixel_ratio,
            self.drawing_buffer_size(),
            self.settings.clear_color.to_hex(),
            if self.settings.shadow_map.enabled {
                "on"
            } else {
                "off"
            },
        );
        let p = camera.position;
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            p.x,
            p.y,
            p.z,
            camera.fov_degrees(),
            camera.aspect()
        );
        let [r, g, b] = packet.ambient;
        let _ = writeln!(out, "Ambient: ({r:.3}, {g:.3}, {b:.3})");
        for light in &packet.directional {
            let lp = light.position;
            let _ = writeln!(
                out,
                "  [light] pos=({:.2}, {:.2}, {:.2}) radiance={:.3} shadow={}",
                lp.x, lp.y, lp.z, light.radiance[0], light.cast_shadow
            );
        }
        for mesh in &packet.meshes {
            let t = mesh.world.transform_point3(glam::Vec3::ZERO);
            let _ = writeln!(
                out,
                "  [mesh {}] {} at ({:.2}, {:.2}, {:.2}) color=#{:06x}",
                mesh.id.short(),
                mesh.name,
                t.x,
                t.y,
                t.z,
                mesh.material.color.to_hex()
            );
        }
        out
    }
}

impl SceneRenderer for DebugTextRenderer {
    type Error = Infallible;

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), Infallible> {
        self.last_frame = self.describe(scene, camera);
        self.frames += 1;
        tracing::trace!("debug frame {}", self.frames);
        Ok(())
    }

    fn set_size(&mut self, size: ViewportSize) {
        self.size = size;
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}
