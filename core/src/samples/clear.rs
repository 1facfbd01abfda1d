//! Drawing a view's contents: one render pass that only clears.

use std::sync::Arc;

use wgpu::{Device, Queue};

use super::{FrameOutcome, Renderer, SampleKind, Viewport, ViewportState};
use crate::gpu::{clear_attachment, CommandSequence};
use crate::view::{GpuView, ViewportSize};

/// Frames for one full trip around the color wheel.
const CYCLE_FRAMES: u64 = 240;

/// Clears the drawable to a color that slowly cycles through hues.
pub struct ClearRenderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    viewport: ViewportState,
    frames: u64,
}

impl ClearRenderer {
    pub fn new(view: &dyn GpuView) -> Self {
        let ctx = view.context();
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            viewport: ViewportState::new(view.drawable_size()),
            frames: 0,
        }
    }
}

/// Clear color for frame `frame`.
pub fn clear_color(frame: u64) -> wgpu::Color {
    let hue = (frame % CYCLE_FRAMES) as f64 / CYCLE_FRAMES as f64 * 6.0;
    let x = 1.0 - (hue % 2.0 - 1.0).abs();
    let (r, g, b) = match hue as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    wgpu::Color { r, g, b, a: 1.0 }
}

impl Renderer for ClearRenderer {
    fn kind(&self) -> SampleKind {
        SampleKind::Clear
    }

    fn on_resize(&mut self, size: ViewportSize) {
        self.viewport.resize(size);
    }

    fn render_frame(&mut self, view: &mut dyn GpuView) -> FrameOutcome {
        let Some(drawable) = view.acquire_drawable() else {
            return FrameOutcome::Skipped;
        };

        let mut commands = CommandSequence::new(&self.device, "clear_frame");
        commands.render_pass(
            &wgpu::RenderPassDescriptor {
                label: Some("clear_pass"),
                color_attachments: &[Some(clear_attachment(
                    drawable.view(),
                    clear_color(self.frames),
                ))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            },
            |_| {},
        );
        commands.submit(&self.queue);
        view.present(drawable);

        self.frames += 1;
        FrameOutcome::Submitted
    }

    fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    fn frames_submitted(&self) -> u64 {
        self.frames
    }
}
