//! The sample renderers and the one-shot compute sample.
//!
//! Every frame sample implements [`Renderer`]: it is built once against a
//! [`GpuView`], keeps a cached viewport that [`Renderer::on_resize`] updates,
//! and encodes one fixed command sequence per [`Renderer::render_frame`].

pub mod adder;
pub mod clear;
pub mod depth;
pub mod grayscale;
pub mod triangle;

mod constants;
mod registry;

pub use adder::{AdderError, ArrayAdder};
pub use clear::ClearRenderer;
pub use constants::{FrameConstants, ViewportUniform};
pub use depth::DepthRenderer;
pub use grayscale::GrayscaleRenderer;
pub use registry::{create_renderer, SampleKind};
pub use triangle::TriangleRenderer;

use crate::view::{GpuView, ViewportSize};

/// What happened to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Commands were submitted and the drawable scheduled for presentation.
    Submitted,
    /// The view had no drawable; nothing was encoded or submitted.
    Skipped,
}

/// A frame dispatcher hosted by a [`GpuView`].
pub trait Renderer {
    /// Sample this renderer implements.
    fn kind(&self) -> SampleKind;

    /// Record the new drawable size for the next frame. Makes no GPU calls.
    fn on_resize(&mut self, size: ViewportSize);

    /// Encode and submit one frame into `view`'s next drawable.
    fn render_frame(&mut self, view: &mut dyn GpuView) -> FrameOutcome;

    /// Viewport the next frame will be encoded with.
    fn viewport(&self) -> Viewport;

    /// Frames submitted so far.
    fn frames_submitted(&self) -> u64;
}

/// Viewport rectangle passed to `set_viewport`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-size viewport for `size`.
    pub fn covering(size: ViewportSize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width as f32,
            height: size.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// This viewport shrunk to fit inside a drawable of `size`.
    pub fn clamped_to(&self, size: ViewportSize) -> Self {
        Self {
            width: self.width.min(size.width as f32),
            height: self.height.min(size.height as f32),
            ..*self
        }
    }

    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x,
            self.y,
            self.width,
            self.height,
            self.min_depth,
            self.max_depth,
        );
    }
}

/// Cached drawable size, the only state a resize touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportState {
    size: ViewportSize,
}

impl ViewportState {
    pub fn new(size: ViewportSize) -> Self {
        Self { size }
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.size = size;
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::covering(self.size)
    }

    /// Viewport to encode against a drawable of `drawable` size.
    ///
    /// Falls back to the whole drawable when no usable size was recorded yet.
    pub fn viewport_for(&self, drawable: ViewportSize) -> Viewport {
        let viewport = self.viewport().clamped_to(drawable);
        if viewport.width > 0.0 && viewport.height > 0.0 {
            viewport
        } else {
            Viewport::covering(drawable)
        }
    }
}
