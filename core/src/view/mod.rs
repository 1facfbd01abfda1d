//! GPU views: the surfaces a renderer draws into.
//!
//! A view owns the GPU context and hands out at most one drawable per frame.
//! Renderers take their device and queue from the view they are created for.

mod offscreen;
mod window;

pub use offscreen::OffscreenView;
pub use window::WindowView;

use crate::gpu::GpuContext;

/// Size of a view's drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_f32(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for ViewportSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// A presentable target for one frame.
///
/// Short-lived: hold it only while encoding the frame. For window views the
/// surface texture is presented when the drawable is handed back to the view.
pub struct Drawable {
    view: wgpu::TextureView,
    size: ViewportSize,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl Drawable {
    pub(crate) fn new(
        view: wgpu::TextureView,
        size: ViewportSize,
        surface_texture: Option<wgpu::SurfaceTexture>,
    ) -> Self {
        Self {
            view,
            size,
            surface_texture,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub(crate) fn present(self) {
        if let Some(surface_texture) = self.surface_texture {
            surface_texture.present();
        }
    }
}

/// A condition that stops a view from producing any further frames.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Out of memory acquiring a drawable")]
    OutOfMemory,
}

/// A hosting view for a renderer.
pub trait GpuView {
    /// GPU context the view was created with.
    fn context(&self) -> &GpuContext;

    /// Format of the drawables this view hands out.
    fn color_format(&self) -> wgpu::TextureFormat;

    /// Current drawable size.
    fn drawable_size(&self) -> ViewportSize;

    /// Next presentable target, or `None` when none is available this frame.
    fn acquire_drawable(&mut self) -> Option<Drawable>;

    /// Present a drawable after its frame has been submitted.
    fn present(&mut self, drawable: Drawable);

    /// Fatal condition recorded while acquiring a drawable, if any.
    fn take_fault(&mut self) -> Option<ViewError> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_size_empty() {
        assert!(ViewportSize::new(0, 10).is_empty());
        assert!(ViewportSize::new(10, 0).is_empty());
        assert!(!ViewportSize::new(1, 1).is_empty());
    }

    #[test]
    fn test_viewport_size_from_physical() {
        let size: ViewportSize = winit::dpi::PhysicalSize::new(800u32, 600u32).into();
        assert_eq!(size, ViewportSize::new(800, 600));
        assert_eq!(size.as_f32(), [800.0, 600.0]);
    }
}
