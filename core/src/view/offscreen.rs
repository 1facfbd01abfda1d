//! Headless view rendering into an owned texture.

use super::{Drawable, GpuView, ViewportSize};
use crate::gpu::{read_texture, GpuContext, InitializationError, MapError, Texture2d};

/// Format of the off-screen render target.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A view backed by an off-screen texture.
///
/// Used for headless runs and tests. Drawable availability can be switched
/// off to simulate a platform view that has no drawable to hand out.
pub struct OffscreenView {
    ctx: GpuContext,
    target: Texture2d,
    available: bool,
    presented: u64,
}

impl OffscreenView {
    /// Create a view with its own headless GPU context.
    pub async fn new(size: ViewportSize) -> Result<Self, InitializationError> {
        let ctx = GpuContext::new().await?;
        Ok(Self::with_context(ctx, size))
    }

    /// Create a view on an existing GPU context.
    pub fn with_context(ctx: GpuContext, size: ViewportSize) -> Self {
        let target = Self::create_target(&ctx, size);
        Self {
            ctx,
            target,
            available: true,
            presented: 0,
        }
    }

    fn create_target(ctx: &GpuContext, size: ViewportSize) -> Texture2d {
        Texture2d::for_output(
            &ctx.device,
            "offscreen_target",
            size.width.max(1),
            size.height.max(1),
            OFFSCREEN_FORMAT,
        )
    }

    /// Recreate the target at a new size.
    pub fn resize(&mut self, size: ViewportSize) {
        if size != self.drawable_size() {
            self.target = Self::create_target(&self.ctx, size);
        }
    }

    /// Make drawables available (or not) for subsequent frames.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Number of frames presented so far.
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    /// Copy the current target contents to the CPU as tightly packed RGBA8.
    pub fn read_pixels(&self) -> Result<Vec<u8>, MapError> {
        read_texture(&self.ctx.device, &self.ctx.queue, self.target.texture())
    }
}

impl GpuView for OffscreenView {
    fn context(&self) -> &GpuContext {
        &self.ctx
    }

    fn color_format(&self) -> wgpu::TextureFormat {
        OFFSCREEN_FORMAT
    }

    fn drawable_size(&self) -> ViewportSize {
        ViewportSize::new(self.target.width(), self.target.height())
    }

    fn acquire_drawable(&mut self) -> Option<Drawable> {
        if !self.available {
            return None;
        }
        let view = self
            .target
            .texture()
            .create_view(&wgpu::TextureViewDescriptor::default());
        Some(Drawable::new(view, self.drawable_size(), None))
    }

    fn present(&mut self, drawable: Drawable) {
        self.presented += 1;
        drawable.present();
    }
}
