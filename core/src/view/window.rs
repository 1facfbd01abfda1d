//! On-screen view presenting to a winit window surface.

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::{Drawable, GpuView, ViewError, ViewportSize};
use crate::gpu::{GpuContext, InitializationError};

/// A view bound to a window.
///
/// Owns the surface (swapchain) and its configuration. The surface keeps an
/// `Arc` to the window, so the window outlives the surface.
pub struct WindowView {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    ctx: GpuContext,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    fault: Option<ViewError>,
}

/// What to do after the surface refused to hand out a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceErrorAction {
    Reconfigure,
    SkipFrame,
    Fatal,
}

fn classify_surface_error(error: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

impl WindowView {
    /// Create a view and a GPU context able to present to `window`.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, InitializationError> {
        let size = window.inner_size();

        let instance = GpuContext::create_instance();
        let surface = instance.create_surface(window.clone())?;
        let ctx = GpuContext::with_surface(instance, Some(&surface)).await?;

        let caps = surface.get_capabilities(&ctx.adapter);
        let format = choose_surface_format(&caps).ok_or(InitializationError::IncompatibleSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        if size.width > 0 && size.height > 0 {
            surface.configure(&ctx.device, &config);
        }
        log::debug!("Configured surface {:?} at {}x{}", format, size.width, size.height);

        Ok(Self {
            window,
            surface,
            ctx,
            config,
            size,
            fault: None,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only internal state is updated and configuration is deferred.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.ctx.device, &self.config);
    }
}

impl GpuView for WindowView {
    fn context(&self) -> &GpuContext {
        &self.ctx
    }

    fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn drawable_size(&self) -> ViewportSize {
        self.size.into()
    }

    fn acquire_drawable(&mut self) -> Option<Drawable> {
        if self.size.width == 0 || self.size.height == 0 {
            return None;
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e) => {
                match classify_surface_error(&e) {
                    SurfaceErrorAction::Reconfigure => {
                        self.surface.configure(&self.ctx.device, &self.config);
                    }
                    SurfaceErrorAction::SkipFrame => log::trace!("No drawable this frame: {e}"),
                    SurfaceErrorAction::Fatal => {
                        log::error!("Out of memory acquiring surface texture");
                        self.fault = Some(ViewError::OutOfMemory);
                    }
                }
                return None;
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let size = ViewportSize::new(
            surface_texture.texture.width(),
            surface_texture.texture.height(),
        );
        Some(Drawable::new(view, size, Some(surface_texture)))
    }

    fn present(&mut self, drawable: Drawable) {
        self.window.pre_present_notify();
        drawable.present();
    }

    fn take_fault(&mut self) -> Option<ViewError> {
        self.fault.take()
    }
}

/// Pick a linear 8-bit format so kernel output reaches the screen unchanged.
fn choose_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    let preferred = [
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8Unorm,
    ];
    preferred
        .into_iter()
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.first().copied())
}
