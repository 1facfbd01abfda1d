//! Image processing: a compute kernel converts a texture to grayscale, then a
//! render pass draws the result on a textured quad.
//!
//! Both passes are encoded into the same command sequence each frame, so the
//! render pass always samples the kernel output written just before it.

use std::sync::Arc;

use wgpu::{BindGroup, ComputePipeline, Device, Queue, RenderPipeline, ShaderStages};

use super::{FrameConstants, FrameOutcome, Renderer, SampleKind, Viewport, ViewportState};
use crate::gpu::layouts::create_frame_constants_layout;
use crate::gpu::{
    clear_attachment, create_compute_pipeline, create_pipeline_layout, BindGroupLayoutBuilder,
    CommandSequence, DispatchGeometry, Extent3, FunctionLibrary, InitializationError,
    RenderPipelineBuilder, ShaderStage, Texture2d, IMAGE_FORMAT,
};
use crate::source::SourceImage;
use crate::view::{GpuView, ViewportSize};

pub const INPUT_TEXTURE_SLOT: u32 = 0;
pub const OUTPUT_TEXTURE_SLOT: u32 = 1;
pub const VERTEX_ARRAY_SLOT: u32 = 2;
pub const VIEWPORT_SIZE_SLOT: u32 = 3;

/// Threads per threadgroup, as declared by `grayscale_kernel`.
pub const GROUP_SIZE: Extent3 = Extent3::planar(16, 16);

const SHADER_SOURCE: &str = include_str!("shaders/grayscale.wgsl");
const KERNEL_FUNCTION: &str = "grayscale_kernel";
const VERTEX_FUNCTION: &str = "vertex_shader";
const FRAGMENT_FUNCTION: &str = "sampling_shader";

/// Vertex as read by `grayscale.wgsl`: pixel position and texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

/// Two triangles covering an image of `width` x `height` pixels, centered.
pub fn quad_vertices(width: u32, height: u32) -> [QuadVertex; 6] {
    let w = width as f32 / 2.0;
    let h = height as f32 / 2.0;
    let v = |x: f32, y: f32, u: f32, t: f32| QuadVertex {
        position: [x, y],
        tex_coord: [u, t],
    };
    [
        v(w, -h, 1.0, 1.0),
        v(-w, -h, 0.0, 1.0),
        v(-w, h, 0.0, 0.0),
        v(w, -h, 1.0, 1.0),
        v(-w, h, 0.0, 0.0),
        v(w, h, 1.0, 0.0),
    ]
}

/// Runs the grayscale kernel and displays its output every frame.
pub struct GrayscaleRenderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    kernel: ComputePipeline,
    kernel_bind_group: BindGroup,
    pipeline: RenderPipeline,
    texture_bind_group: BindGroup,
    constants: FrameConstants,
    output: Texture2d,
    quad: [QuadVertex; 6],
    geometry: DispatchGeometry,
    viewport: ViewportState,
    frames: u64,
}

impl GrayscaleRenderer {
    pub fn new(view: &dyn GpuView, image: &SourceImage) -> Result<Self, InitializationError> {
        let ctx = view.context();
        ctx.require_storage_format(IMAGE_FORMAT)?;
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();

        let library = FunctionLibrary::from_wgsl(&device, "grayscale_library", SHADER_SOURCE)?;
        let kernel_fn = library.function(KERNEL_FUNCTION, ShaderStage::Compute)?;
        let vertex = library.function(VERTEX_FUNCTION, ShaderStage::Vertex)?;
        let fragment = library.function(FRAGMENT_FUNCTION, ShaderStage::Fragment)?;

        let input = Texture2d::for_input(&device, "grayscale_input", image.width(), image.height());
        input.upload_rgba8(&queue, image.pixels());
        let output =
            Texture2d::for_kernel_output(&device, "grayscale_output", image.width(), image.height());

        let kernel_layout = BindGroupLayoutBuilder::new("grayscale_kernel_layout")
            .texture_2d(INPUT_TEXTURE_SLOT, ShaderStages::COMPUTE)
            .storage_texture_2d(OUTPUT_TEXTURE_SLOT, ShaderStages::COMPUTE, IMAGE_FORMAT)
            .build(&device);
        let kernel = create_compute_pipeline(&device, kernel_fn, &kernel_layout)?;
        let kernel_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grayscale_kernel_bind_group"),
            layout: &kernel_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: INPUT_TEXTURE_SLOT,
                    resource: wgpu::BindingResource::TextureView(input.view()),
                },
                wgpu::BindGroupEntry {
                    binding: OUTPUT_TEXTURE_SLOT,
                    resource: wgpu::BindingResource::TextureView(output.view()),
                },
            ],
        });

        let constants_layout =
            create_frame_constants_layout(&device, VERTEX_ARRAY_SLOT, VIEWPORT_SIZE_SLOT);
        let texture_layout = BindGroupLayoutBuilder::new("grayscale_texture_layout")
            .texture_2d(0, ShaderStages::FRAGMENT)
            .sampler(1, ShaderStages::FRAGMENT)
            .build(&device);
        let layout = create_pipeline_layout(
            &device,
            "grayscale_pipeline_layout",
            &[&constants_layout, &texture_layout],
        );
        let pipeline = RenderPipelineBuilder::new("grayscale_pipeline", vertex, fragment)
            .layout(&layout)
            .format(view.color_format())
            .build(&device)?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("grayscale_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grayscale_texture_bind_group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(output.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let quad = quad_vertices(image.width(), image.height());
        let constants = FrameConstants::new(
            &device,
            "grayscale",
            &constants_layout,
            VERTEX_ARRAY_SLOT,
            VIEWPORT_SIZE_SLOT,
            std::mem::size_of_val(&quad) as u64,
        );

        let geometry = DispatchGeometry::covering(image.extent(), GROUP_SIZE);
        log::info!(
            "Grayscale kernel: {}x{} image, {:?} groups of {:?}",
            image.width(),
            image.height(),
            geometry.group_count(),
            geometry.group_size()
        );

        Ok(Self {
            device,
            queue,
            kernel,
            kernel_bind_group,
            pipeline,
            texture_bind_group,
            constants,
            output,
            quad,
            geometry,
            viewport: ViewportState::new(view.drawable_size()),
            frames: 0,
        })
    }

    /// Threadgroup size and count used for every kernel dispatch.
    pub fn dispatch_geometry(&self) -> DispatchGeometry {
        self.geometry
    }

    /// Texture the kernel writes into.
    pub fn output_texture(&self) -> &Texture2d {
        &self.output
    }
}

impl Renderer for GrayscaleRenderer {
    fn kind(&self) -> SampleKind {
        SampleKind::Grayscale
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
            &self.quad,
            ViewportSize::new(viewport.width as u32, viewport.height as u32),
        );

        let mut commands = CommandSequence::new(&self.device, "grayscale_frame");
        commands.compute_pass("grayscale_kernel_pass", |pass| {
            pass.set_pipeline(&self.kernel);
            pass.set_bind_group(0, &self.kernel_bind_group, &[]);
            self.geometry.dispatch(pass);
        });
        commands.render_pass(
            &wgpu::RenderPassDescriptor {
                label: Some("grayscale_draw_pass"),
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
                pass.set_bind_group(1, &self.texture_bind_group, &[]);
                pass.draw(0..self.quad.len() as u32, 0..1);
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
    use crate::gpu::EntryTable;

    #[test]
    fn test_quad_spans_image_pixels() {
        let quad = quad_vertices(640, 480);
        for vertex in &quad {
            assert_eq!(vertex.position[0].abs(), 320.0);
            assert_eq!(vertex.position[1].abs(), 240.0);
        }
        // Top-left of the image maps to the top-left texel.
        let top_left = quad
            .iter()
            .find(|v| v.position == [-320.0, 240.0])
            .map(|v| v.tex_coord);
        assert_eq!(top_left, Some([0.0, 0.0]));
    }

    #[test]
    fn test_dispatch_covers_odd_sized_images() {
        let image = SourceImage::test_pattern(33, 17);
        let geometry = DispatchGeometry::covering(image.extent(), GROUP_SIZE);
        assert_eq!(geometry.group_count(), Extent3::new(3, 2, 1));
        assert!(geometry.covers(image.extent()));
    }

    #[test]
    fn test_shader_declares_all_stages() {
        let table = EntryTable::parse("grayscale", SHADER_SOURCE).unwrap();
        assert!(table.lookup(KERNEL_FUNCTION, ShaderStage::Compute).is_ok());
        assert!(table.lookup(VERTEX_FUNCTION, ShaderStage::Vertex).is_ok());
        assert!(table.lookup(FRAGMENT_FUNCTION, ShaderStage::Fragment).is_ok());
    }
}
