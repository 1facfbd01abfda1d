//! Hello triangle: three colored vertices in pixel coordinates.

use std::sync::Arc;

use wgpu::{Device, Queue, RenderPipeline};

use super::{FrameConstants, FrameOutcome, Renderer, SampleKind, Viewport, ViewportState};
use crate::gpu::layouts::create_frame_constants_layout;
use crate::gpu::{
    clear_attachment, create_pipeline_layout, CommandSequence, FunctionLibrary,
    InitializationError, RenderPipelineBuilder, ShaderStage,
};
use crate::view::{GpuView, ViewportSize};

pub const VERTEX_ARRAY_SLOT: u32 = 0;
pub const VIEWPORT_SIZE_SLOT: u32 = 1;

const SHADER_SOURCE: &str = include_str!("shaders/triangle.wgsl");
const VERTEX_FUNCTION: &str = "vertex_shader";
const FRAGMENT_FUNCTION: &str = "fragment_shader";

/// Vertex as read by `triangle.wgsl`.
/// WGSL: struct Vertex { position: vec2<f32>, color: vec4<f32> }
/// The vec4 is 16-byte aligned, so the position is padded to 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TriangleVertex {
    pub position: [f32; 2],
    pub _padding: [f32; 2],
    pub color: [f32; 4],
}

impl TriangleVertex {
    pub const fn new(position: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            _padding: [0.0; 2],
            color,
        }
    }
}

/// Vertices in pixels, centered on the view.
pub const TRIANGLE_VERTICES: [TriangleVertex; 3] = [
    TriangleVertex::new([250.0, -250.0], [1.0, 0.0, 0.0, 1.0]),
    TriangleVertex::new([-250.0, -250.0], [0.0, 1.0, 0.0, 1.0]),
    TriangleVertex::new([0.0, 250.0], [0.0, 0.0, 1.0, 1.0]),
];

/// Renders a single colored triangle every frame.
pub struct TriangleRenderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    pipeline: RenderPipeline,
    constants: FrameConstants,
    viewport: ViewportState,
    frames: u64,
}

impl TriangleRenderer {
    pub fn new(view: &dyn GpuView) -> Result<Self, InitializationError> {
        let ctx = view.context();
        let device = ctx.device.clone();

        let library = FunctionLibrary::from_wgsl(&device, "triangle_library", SHADER_SOURCE)?;
        let vertex = library.function(VERTEX_FUNCTION, ShaderStage::Vertex)?;
        let fragment = library.function(FRAGMENT_FUNCTION, ShaderStage::Fragment)?;

        let constants_layout =
            create_frame_constants_layout(&device, VERTEX_ARRAY_SLOT, VIEWPORT_SIZE_SLOT);
        let layout = create_pipeline_layout(&device, "triangle_pipeline_layout", &[&constants_layout]);
        let pipeline = RenderPipelineBuilder::new("triangle_pipeline", vertex, fragment)
            .layout(&layout)
            .format(view.color_format())
            .build(&device)?;

        let constants = FrameConstants::new(
            &device,
            "triangle",
            &constants_layout,
            VERTEX_ARRAY_SLOT,
            VIEWPORT_SIZE_SLOT,
            std::mem::size_of_val(&TRIANGLE_VERTICES) as u64,
        );

        Ok(Self {
            device,
            queue: ctx.queue.clone(),
            pipeline,
            constants,
            viewport: ViewportState::new(view.drawable_size()),
            frames: 0,
        })
    }
}

impl Renderer for TriangleRenderer {
    fn kind(&self) -> SampleKind {
        SampleKind::Triangle
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
            &TRIANGLE_VERTICES,
            ViewportSize::new(viewport.width as u32, viewport.height as u32),
        );

        let mut commands = CommandSequence::new(&self.device, "triangle_frame");
        commands.render_pass(
            &wgpu::RenderPassDescriptor {
                label: Some("triangle_pass"),
                color_attachments: &[Some(clear_attachment(drawable.view(), wgpu::Color::BLACK))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            },
            |pass| {
                viewport.apply(pass);
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, self.constants.bind_group(), &[]);
                pass.draw(0..TRIANGLE_VERTICES.len() as u32, 0..1);
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
