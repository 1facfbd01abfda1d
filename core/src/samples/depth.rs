//! Primitive visibility with depth testing.
//!
//! A gray square sits at a fixed depth while a colored triangle crosses it;
//! the triangle's top vertex moves through the depth range over time, so
//! parts of it disappear behind the square.

use std::f32::consts::TAU;
use std::sync::Arc;

use wgpu::{Device, Queue, RenderPipeline};

use super::{FrameConstants, FrameOutcome, Renderer, SampleKind, Viewport, ViewportState};
use crate::gpu::layouts::create_frame_constants_layout;
use crate::gpu::{
    clear_attachment, create_pipeline_layout, CommandSequence, FunctionLibrary,
    InitializationError, RenderPipelineBuilder, ShaderStage, Texture2d, DEPTH_FORMAT,
};
use crate::view::{GpuView, ViewportSize};

pub const VERTEX_ARRAY_SLOT: u32 = 0;
pub const VIEWPORT_SIZE_SLOT: u32 = 1;

const SHADER_SOURCE: &str = include_str!("shaders/depth.wgsl");
const VERTEX_FUNCTION: &str = "vertex_shader";
const FRAGMENT_FUNCTION: &str = "fragment_shader";

/// Depth of the gray square.
pub const SQUARE_DEPTH: f32 = 0.5;
/// Frames for the moving vertex to go front, back and front again.
const DEPTH_CYCLE_FRAMES: u64 = 300;

const SQUARE_HALF: f32 = 200.0;
const GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

/// Vertex as read by `depth.wgsl`: xy in pixels, z as depth.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthVertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl DepthVertex {
    pub const fn new(x: f32, y: f32, depth: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y, depth, 1.0],
            color,
        }
    }
}

const VERTEX_COUNT: usize = 9;

/// Depths of the triangle's left, right and top vertices at `frame`.
pub fn triangle_depths(frame: u64) -> [f32; 3] {
    let phase = (frame % DEPTH_CYCLE_FRAMES) as f32 / DEPTH_CYCLE_FRAMES as f32;
    let top = (0.5 + 0.5 * (phase * TAU).cos()).clamp(0.0, 1.0);
    [0.25, 0.75, top]
}

/// Square (two triangles) followed by the moving triangle.
pub fn scene_vertices(frame: u64) -> [DepthVertex; VERTEX_COUNT] {
    let [left, right, top] = triangle_depths(frame);
    let s = SQUARE_HALF;
    [
        DepthVertex::new(-s, s, SQUARE_DEPTH, GRAY),
        DepthVertex::new(-s, -s, SQUARE_DEPTH, GRAY),
        DepthVertex::new(s, -s, SQUARE_DEPTH, GRAY),
        DepthVertex::new(s, -s, SQUARE_DEPTH, GRAY),
        DepthVertex::new(s, s, SQUARE_DEPTH, GRAY),
        DepthVertex::new(-s, s, SQUARE_DEPTH, GRAY),
        DepthVertex::new(-300.0, -250.0, left, [1.0, 1.0, 1.0, 1.0]),
        DepthVertex::new(300.0, -250.0, right, [1.0, 1.0, 1.0, 1.0]),
        DepthVertex::new(0.0, 300.0, top, [1.0, 0.2, 0.2, 1.0]),
    ]
}

/// Renders the depth-tested scene.
pub struct DepthRenderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    pipeline: RenderPipeline,
    constants: FrameConstants,
    depth_target: Option<Texture2d>,
    viewport: ViewportState,
    frames: u64,
}

impl DepthRenderer {
    pub fn new(view: &dyn GpuView) -> Result<Self, InitializationError> {
        let ctx = view.context();
        let device = ctx.device.clone();

        let library = FunctionLibrary::from_wgsl(&device, "depth_library", SHADER_SOURCE)?;
        let vertex = library.function(VERTEX_FUNCTION, ShaderStage::Vertex)?;
        let fragment = library.function(FRAGMENT_FUNCTION, ShaderStage::Fragment)?;

        let constants_layout =
            create_frame_constants_layout(&device, VERTEX_ARRAY_SLOT, VIEWPORT_SIZE_SLOT);
        let layout = create_pipeline_layout(&device, "depth_pipeline_layout", &[&constants_layout]);
        let pipeline = RenderPipelineBuilder::new("depth_pipeline", vertex, fragment)
            .layout(&layout)
            .format(view.color_format())
            .depth(DEPTH_FORMAT, wgpu::CompareFunction::Less)
            .build(&device)?;

        let constants = FrameConstants::new(
            &device,
            "depth",
            &constants_layout,
            VERTEX_ARRAY_SLOT,
            VIEWPORT_SIZE_SLOT,
            (std::mem::size_of::<DepthVertex>() * VERTEX_COUNT) as u64,
        );

        Ok(Self {
            device,
            queue: ctx.queue.clone(),
            pipeline,
            constants,
            depth_target: None,
            viewport: ViewportState::new(view.drawable_size()),
            frames: 0,
        })
    }

}

/// Depth attachment matching `size`, recreated when the drawable size changes.
fn depth_target<'a>(
    device: &Device,
    slot: &'a mut Option<Texture2d>,
    size: ViewportSize,
) -> &'a Texture2d {
    if let Some(target) = slot {
        if target.width() != size.width || target.height() != size.height {
            *slot = None;
        }
    }
    slot.get_or_insert_with(|| {
        log::debug!("Creating {}x{} depth target", size.width, size.height);
        Texture2d::for_depth(device, "depth_target", size.width, size.height)
    })
}

impl Renderer for DepthRenderer {
    fn kind(&self) -> SampleKind {
        SampleKind::Depth
    }

    fn on_resize(&mut self, size: ViewportSize) {
        self.viewport.resize(size);
    }

    fn render_frame(&mut self, view: &mut dyn GpuView) -> FrameOutcome {
        let Some(drawable) = view.acquire_drawable() else {
            return FrameOutcome::Skipped;
        };

        let viewport = self.viewport.viewport_for(drawable.size());
        self.constants.write(
            &self.queue,
            &scene_vertices(self.frames),
            ViewportSize::new(viewport.width as u32, viewport.height as u32),
        );
        let depth = depth_target(&self.device, &mut self.depth_target, drawable.size());

        let mut commands = CommandSequence::new(&self.device, "depth_frame");
        commands.render_pass(
            &wgpu::RenderPassDescriptor {
                label: Some("depth_pass"),
                color_attachments: &[Some(clear_attachment(drawable.view(), wgpu::Color::BLACK))],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            },
            |pass| {
                viewport.apply(pass);
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, self.constants.bind_group(), &[]);
                pass.draw(0..VERTEX_COUNT as u32, 0..1);
            },
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depths_stay_in_range() {
        for frame in 0..DEPTH_CYCLE_FRAMES * 2 {
            for depth in triangle_depths(frame) {
                assert!((0.0..=1.0).contains(&depth));
            }
        }
    }

    #[test]
    fn test_top_vertex_crosses_square() {
        let depths: Vec<f32> = (0..DEPTH_CYCLE_FRAMES).map(|f| triangle_depths(f)[2]).collect();
        assert!(depths.iter().any(|d| *d < SQUARE_DEPTH));
        assert!(depths.iter().any(|d| *d > SQUARE_DEPTH));
        assert_eq!(triangle_depths(0), triangle_depths(DEPTH_CYCLE_FRAMES));
    }

    #[test]
    fn test_scene_square_is_flat() {
        let vertices = scene_vertices(17);
        assert!(vertices[..6].iter().all(|v| v.position[2] == SQUARE_DEPTH));
        assert_eq!(std::mem::size_of::<DepthVertex>(), 32);
    }
}
