//! Bind group layout builders for GPU pipelines.
//!
//! Binding indices passed here must match the `@binding` declarations in the
//! WGSL functions the layout is used with; each sample keeps them as named
//! slot constants next to its shader.

use wgpu::{BindGroupLayout, BindGroupLayoutEntry, Device, ShaderStages, TextureFormat};

/// Builder for creating bind group layouts with common patterns.
pub struct BindGroupLayoutBuilder {
    label: Option<&'static str>,
    entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    /// Create a new bind group layout builder.
    pub fn new(label: &'static str) -> Self {
        Self {
            label: Some(label),
            entries: Vec::new(),
        }
    }

    /// Add a uniform buffer entry.
    pub fn uniform(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    /// Add a storage buffer entry.
    pub fn storage_buffer(mut self, binding: u32, visibility: ShaderStages, read_only: bool) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    /// Add a 2D texture entry.
    pub fn texture_2d(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        self
    }

    /// Add a write-only 2D storage texture entry.
    pub fn storage_texture_2d(
        mut self,
        binding: u32,
        visibility: ShaderStages,
        format: TextureFormat,
    ) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        });
        self
    }

    /// Add a filtering sampler entry.
    pub fn sampler(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        self
    }

    /// Build the bind group layout.
    pub fn build(self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: self.label,
            entries: &self.entries,
        })
    }
}

/// Layout for per-frame vertex constants: a read-only vertex array and the
/// viewport size, both read by the vertex stage.
pub fn create_frame_constants_layout(
    device: &Device,
    vertex_array_slot: u32,
    viewport_size_slot: u32,
) -> BindGroupLayout {
    BindGroupLayoutBuilder::new("frame_constants_layout")
        .storage_buffer(vertex_array_slot, ShaderStages::VERTEX, true)
        .uniform(viewport_size_slot, ShaderStages::VERTEX)
        .build(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[tokio::test]
    async fn test_bind_group_layout_builder() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return, // Skip if no GPU
        };

        let layout = BindGroupLayoutBuilder::new("test_layout")
            .uniform(0, ShaderStages::VERTEX)
            .texture_2d(1, ShaderStages::FRAGMENT)
            .sampler(2, ShaderStages::FRAGMENT)
            .build(&ctx.device);

        // Layout should be created without panicking
        drop(layout);
    }

    #[tokio::test]
    async fn test_compute_layout_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let _layout = BindGroupLayoutBuilder::new("compute_layout")
            .texture_2d(0, ShaderStages::COMPUTE)
            .storage_texture_2d(1, ShaderStages::COMPUTE, TextureFormat::Rgba8Unorm)
            .storage_buffer(2, ShaderStages::COMPUTE, false)
            .build(&ctx.device);
    }

    #[tokio::test]
    async fn test_frame_constants_layout_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let _layout = create_frame_constants_layout(&ctx.device, 0, 1);
    }
}
