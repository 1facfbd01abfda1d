//! Copying GPU results back to the CPU.
//!
//! Readback blocks the calling thread until the GPU is done. It is used by the
//! one-shot compute sample, by off-screen captures and by tests; the per-frame
//! path never waits on the GPU.

use wgpu::{Buffer, CommandEncoder, Device, Texture};

use super::error::MapError;

/// Map `buffer` for reading and wait until the mapping completes.
pub fn map_blocking(device: &Device, buffer: &Buffer) -> Result<(), MapError> {
    let (sender, receiver) = std::sync::mpsc::channel();
    buffer
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
    device.poll(wgpu::PollType::wait_indefinitely())?;
    receiver.recv().map_err(|_| MapError::CallbackDropped)??;
    Ok(())
}

/// Readback buffer for copying GPU texture data to CPU.
pub struct ReadbackBuffer {
    buffer: Buffer,
    width: u32,
    height: u32,
    padded_row_bytes: u32,
    unpadded_row_bytes: u32,
}

impl ReadbackBuffer {
    /// Create a new readback buffer sized for the given dimensions.
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let bytes_per_pixel = 4u32;
        let unpadded_row_bytes = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row_bytes = unpadded_row_bytes.div_ceil(align) * align;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size: (padded_row_bytes * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            width,
            height,
            padded_row_bytes,
            unpadded_row_bytes,
        }
    }

    /// Get the underlying buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Get the padded bytes per row (for texture copy).
    pub fn padded_row_bytes(&self) -> u32 {
        self.padded_row_bytes
    }

    /// Encode a copy of the whole of `texture` into this buffer.
    pub fn encode_copy(&self, encoder: &mut CommandEncoder, texture: &Texture) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Read pixels from the buffer, removing row padding.
    pub fn read_pixels(&self, device: &Device) -> Result<Vec<u8>, MapError> {
        map_blocking(device, &self.buffer)?;

        let pixels = {
            let data = self.buffer.slice(..).get_mapped_range();
            let mut pixels = Vec::with_capacity((self.width * self.height * 4) as usize);
            for row in 0..self.height {
                let start = (row * self.padded_row_bytes) as usize;
                let end = start + self.unpadded_row_bytes as usize;
                pixels.extend_from_slice(&data[start..end]);
            }
            pixels
        };
        self.buffer.unmap();
        Ok(pixels)
    }
}

/// Copy an RGBA8 texture to the CPU, waiting for the GPU to finish.
pub fn read_texture(
    device: &Device,
    queue: &wgpu::Queue,
    texture: &Texture,
) -> Result<Vec<u8>, MapError> {
    let size = texture.size();
    let readback = ReadbackBuffer::new(device, size.width, size.height);
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback_encoder"),
    });
    readback.encode_copy(&mut encoder, texture);
    queue.submit(std::iter::once(encoder.finish()));
    readback.read_pixels(device)
}
