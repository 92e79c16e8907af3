//! Device, queue and (for the demo window) the presentation surface.
//!
//! Frames are drawn into a non-sRGB target so the text and clear colors
//! are written as given, without a gamma encode on store.

use log::debug;
use thiserror::Error;
use wgpu::{
    Adapter, CompositeAlphaMode, Device, DeviceDescriptor, Instance, InstanceDescriptor,
    PresentMode, Queue, RequestAdapterOptions, Surface, SurfaceConfiguration, SurfaceTarget,
    TextureFormat, TextureUsages,
};

/// Target format when there is no surface to ask.
pub const HEADLESS_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Surface error: {0}")]
    Surface(String),
}

pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub adapter: Adapter,
    /// Format the text pipeline renders into.
    pub target_format: TextureFormat,
    pub surface: Option<Surface<'static>>,
    surface_config: Option<SurfaceConfiguration>,
}

impl GpuContext {
    /// Context without a window; frames go to caller-owned textures.
    pub async fn new_headless() -> Result<Self, GpuError> {
        let instance = Instance::new(&InstanceDescriptor::default());
        let (adapter, device, queue) = open_device(&instance, None).await?;

        Ok(Self {
            device,
            queue,
            adapter,
            target_format: HEADLESS_FORMAT,
            surface: None,
            surface_config: None,
        })
    }

    /// Context presenting to `window`. Pass an `Arc<Window>` so the
    /// surface cannot outlive it.
    pub async fn new_with_surface<W>(window: W, width: u32, height: u32) -> Result<Self, GpuError>
    where
        W: wgpu::WasmNotSendSync + Into<SurfaceTarget<'static>>,
    {
        let instance = Instance::new(&InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|e| GpuError::Surface(e.to_string()))?;
        let (adapter, device, queue) = open_device(&instance, Some(&surface)).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&caps.formats)
            .ok_or_else(|| GpuError::Surface(String::from("surface reports no formats")))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        debug!("surface configured: {}×{} {format:?}", config.width, config.height);

        Ok(Self {
            device,
            queue,
            adapter,
            target_format: format,
            surface: Some(surface),
            surface_config: Some(config),
        })
    }

    /// Reconfigure the surface after a window resize. Zero sizes
    /// (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (Some(surface), Some(config)) = (&self.surface, &mut self.surface_config) else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }
        config.width = width;
        config.height = height;
        surface.configure(&self.device, config);
    }
}

async fn open_device(
    instance: &Instance,
    surface: Option<&Surface<'_>>,
) -> Result<(Adapter, Device, Queue), GpuError> {
    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::NoAdapter)?;

    let (device, queue) = adapter
        .request_device(
            &DeviceDescriptor {
                label: Some("glyphquad_device"),
                ..Default::default()
            },
            None,
        )
        .await?;

    Ok((adapter, device, queue))
}

/// First non-sRGB format the surface offers, else whatever comes first.
fn pick_surface_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}
