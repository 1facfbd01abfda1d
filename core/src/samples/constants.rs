//! Small per-frame constant data: a vertex array and the viewport size.
//!
//! The data is rewritten through the queue every frame right before the
//! frame's commands are submitted, so it never needs its own upload step.

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue};

use crate::view::ViewportSize;

/// Viewport size as seen by vertex functions.
/// WGSL: struct Viewport { size: vec2<f32> }, padded to 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewportUniform {
    pub size: [f32; 2],
    pub _padding: [f32; 2],
}

impl ViewportUniform {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size: size.as_f32(),
            _padding: [0.0; 2],
        }
    }
}

/// Buffers and bind group holding one frame's vertex array and viewport size.
pub struct FrameConstants {
    vertex_buffer: Buffer,
    viewport_buffer: Buffer,
    bind_group: BindGroup,
}

impl FrameConstants {
    /// Allocate room for `vertex_bytes` of vertices, bound at the given slots.
    pub fn new(
        device: &Device,
        label: &str,
        layout: &BindGroupLayout,
        vertex_array_slot: u32,
        viewport_size_slot: u32,
        vertex_bytes: u64,
    ) -> Self {
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}_vertices")),
            size: vertex_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}_viewport")),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}_constants_bind_group")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: vertex_array_slot,
                    resource: vertex_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: viewport_size_slot,
                    resource: viewport_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            vertex_buffer,
            viewport_buffer,
            bind_group,
        }
    }

    /// Write this frame's vertices and viewport size.
    pub fn write<V: bytemuck::Pod>(&self, queue: &Queue, vertices: &[V], viewport: ViewportSize) {
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        queue.write_buffer(
            &self.viewport_buffer,
            0,
            bytemuck::bytes_of(&ViewportUniform::new(viewport)),
        );
    }

    pub fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }
}
