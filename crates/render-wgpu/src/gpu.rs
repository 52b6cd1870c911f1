use rondavel_common::ViewportSize;

/// Errors from the wgpu backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Device, queue and the window surface they present to.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    backend: wgpu::Backend,
}

impl GpuContext {
    /// Open a device for `target` and configure its surface at `physical`
    /// pixels.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        physical: ViewportSize,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("rondavel_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&caps.formats).ok_or(RenderError::NoSurfaceFormat)?;
        let (width, height) = surface_extent(physical);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let backend = adapter.get_info().backend;
        tracing::info!("GPU initialized with {} backend, surface {format:?}", backend.to_str());

        Ok(Self {
            device,
            queue,
            surface,
            config,
            backend,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn backend(&self) -> wgpu::Backend {
        self.backend
    }

    /// Current surface size in physical pixels.
    pub fn surface_size(&self) -> ViewportSize {
        ViewportSize::new(self.config.width, self.config.height)
    }

    /// Resize the presentation surface. Empty sizes are ignored.
    pub fn resize_surface(&mut self, physical: ViewportSize) -> bool {
        if physical.is_empty() {
            return false;
        }
        let (width, height) = surface_extent(physical);
        if width == self.config.width && height == self.config.height {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        tracing::debug!("surface configured at {width}x{height}");
        true
    }

    /// Next surface texture, or `None` when the frame should be skipped.
    pub(crate) fn acquire(&self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("timed out acquiring surface texture");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Prefer an sRGB format so shader output is encoded on store.
pub(crate) fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// Texture extent for a size; wgpu rejects zero dimensions.
pub(crate) fn surface_extent(size: ViewportSize) -> (u32, u32) {
    (size.width.max(1), size.height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn prefers_srgb_surface() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(
            pick_surface_format(&[TextureFormat::Rgba16Float]),
            Some(TextureFormat::Rgba16Float)
        );
        assert_eq!(pick_surface_format(&[]), None);
    }

    #[test]
    fn extent_is_never_zero() {
        assert_eq!(surface_extent(ViewportSize::new(0, 0)), (1, 1));
        assert_eq!(surface_extent(ViewportSize::new(1280, 0)), (1280, 1));
        assert_eq!(surface_extent(ViewportSize::new(2048, 1536)), (2048, 1536));
    }
}
