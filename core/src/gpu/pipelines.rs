//! Pipeline builders for compute and render pipelines.
//!
//! Pipelines are built from [`Function`]s resolved out of a
//! [`FunctionLibrary`](super::library::FunctionLibrary), so entry point names
//! have already been checked by the time a descriptor reaches the driver.

use wgpu::{
    BindGroupLayout, ColorTargetState, ComputePipeline, Device, PipelineLayout, RenderPipeline,
    TextureFormat,
};

use super::error::InitializationError;
use super::library::{Function, ShaderStage};

/// Builder for creating render pipelines with common patterns.
pub struct RenderPipelineBuilder<'a> {
    label: Option<&'static str>,
    layout: Option<&'a PipelineLayout>,
    vertex: Function<'a>,
    fragment: Function<'a>,
    format: TextureFormat,
    blend: Option<wgpu::BlendState>,
    topology: wgpu::PrimitiveTopology,
    depth: Option<(TextureFormat, wgpu::CompareFunction)>,
}

impl<'a> RenderPipelineBuilder<'a> {
    /// Create a new render pipeline builder.
    pub fn new(label: &'static str, vertex: Function<'a>, fragment: Function<'a>) -> Self {
        debug_assert_eq!(vertex.stage, ShaderStage::Vertex);
        debug_assert_eq!(fragment.stage, ShaderStage::Fragment);
        Self {
            label: Some(label),
            layout: None,
            vertex,
            fragment,
            format: TextureFormat::Rgba8Unorm,
            blend: Some(wgpu::BlendState::REPLACE),
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth: None,
        }
    }

    /// Set the pipeline layout.
    pub fn layout(mut self, layout: &'a PipelineLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Set the color attachment format.
    pub fn format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the blend state.
    pub fn blend(mut self, blend: wgpu::BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    /// Set the primitive topology.
    pub fn topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Enable depth testing and depth writes against a depth attachment.
    pub fn depth(mut self, format: TextureFormat, compare: wgpu::CompareFunction) -> Self {
        self.depth = Some((format, compare));
        self
    }

    /// Build the render pipeline.
    pub fn build(self, device: &Device) -> Result<RenderPipeline, InitializationError> {
        let label = self.label.unwrap_or("render_pipeline");
        validated(device, label, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: self.label,
                layout: self.layout,
                vertex: wgpu::VertexState {
                    module: self.vertex.module,
                    entry_point: Some(self.vertex.name),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: self.fragment.module,
                    entry_point: Some(self.fragment.name),
                    targets: &[Some(ColorTargetState {
                        format: self.format,
                        blend: self.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: self.topology,
                    ..Default::default()
                },
                depth_stencil: self.depth.map(|(format, depth_compare)| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: true,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })
    }
}

/// Run `create` inside a validation error scope.
///
/// A descriptor the device rejects becomes [`InitializationError::PipelineRejected`]
/// instead of reaching the uncaptured error handler.
fn validated<T>(
    device: &Device,
    label: &str,
    create: impl FnOnce() -> T,
) -> Result<T, InitializationError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(scope.pop()) {
        Some(error) => Err(InitializationError::PipelineRejected {
            label: label.to_string(),
            message: error.to_string(),
        }),
        None => Ok(value),
    }
}

/// Create a pipeline layout from bind group layouts.
pub fn create_pipeline_layout(
    device: &Device,
    label: &'static str,
    layouts: &[&BindGroupLayout],
) -> PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: layouts,
        immediate_size: 0,
    })
}

/// Create a compute pipeline running `kernel` with a single bind group.
pub fn create_compute_pipeline(
    device: &Device,
    kernel: Function<'_>,
    layout: &BindGroupLayout,
) -> Result<ComputePipeline, InitializationError> {
    debug_assert_eq!(kernel.stage, ShaderStage::Compute);
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{}_pipeline_layout", kernel.name)),
        bind_group_layouts: &[layout],
        immediate_size: 0,
    });

    let label = format!("{}_pipeline", kernel.name);
    validated(device, &label, || {
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),
            module: kernel.module,
            entry_point: Some(kernel.name),
            compilation_options: Default::default(),
            cache: None,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::library::FunctionLibrary;
    use crate::gpu::GpuContext;

    const SOURCE: &str = r#"
        @group(0) @binding(0) var<storage, read_write> data: array<f32>;

        @compute @workgroup_size(64)
        fn double_values(@builtin(global_invocation_id) gid: vec3<u32>) {
            if (gid.x < arrayLength(&data)) {
                data[gid.x] = data[gid.x] * 2.0;
            }
        }

        @vertex
        fn vs_main(@builtin(vertex_index) vid: u32) -> @builtin(position) vec4<f32> {
            let x = f32(i32(vid) - 1);
            let y = f32(i32(vid & 1u) * 2 - 1);
            return vec4<f32>(x, y, 0.0, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    "#;

    #[tokio::test]
    async fn test_pipeline_layout_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("test"),
                    entries: &[],
                });

        let _layout = create_pipeline_layout(&ctx.device, "test_layout", &[&bind_group_layout]);
    }

    #[tokio::test]
    async fn test_pipelines_from_library() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let library = FunctionLibrary::from_wgsl(&ctx.device, "test_library", SOURCE).unwrap();
        let compute_layout = crate::gpu::BindGroupLayoutBuilder::new("test_compute")
            .storage_buffer(0, wgpu::ShaderStages::COMPUTE, false)
            .build(&ctx.device);
        let kernel = library
            .function("double_values", ShaderStage::Compute)
            .unwrap();
        assert!(create_compute_pipeline(&ctx.device, kernel, &compute_layout).is_ok());

        let layout = create_pipeline_layout(&ctx.device, "test_render_layout", &[]);
        let render = RenderPipelineBuilder::new(
            "test_render",
            library.function("vs_main", ShaderStage::Vertex).unwrap(),
            library.function("fs_main", ShaderStage::Fragment).unwrap(),
        )
        .layout(&layout)
        .depth(TextureFormat::Depth32Float, wgpu::CompareFunction::Less)
        .build(&ctx.device);
        assert!(render.is_ok());
    }

    #[tokio::test]
    async fn test_layout_mismatch_is_rejected() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let library = FunctionLibrary::from_wgsl(&ctx.device, "test_library", SOURCE).unwrap();
        // The kernel writes binding 0, which a uniform binding cannot satisfy.
        let layout = crate::gpu::BindGroupLayoutBuilder::new("wrong_layout")
            .uniform(0, wgpu::ShaderStages::COMPUTE)
            .build(&ctx.device);
        let kernel = library
            .function("double_values", ShaderStage::Compute)
            .unwrap();

        match create_compute_pipeline(&ctx.device, kernel, &layout) {
            Err(InitializationError::PipelineRejected { label, .. }) => {
                assert_eq!(label, "double_values_pipeline");
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("mismatched layout was accepted"),
        }
    }
}
