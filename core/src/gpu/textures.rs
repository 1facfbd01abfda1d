//! Texture management for GPU rendering and compute.

use wgpu::{Device, Queue, Texture, TextureFormat, TextureUsages, TextureView};

use super::dispatch::Extent3;

/// Format used for textures holding decoded images.
pub const IMAGE_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Format of the depth attachment used by depth-tested samples.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// A 2D texture that owns both texture and view.
/// The texture must outlive its view, so we keep them together.
pub struct Texture2d {
    texture: Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl Texture2d {
    /// Create a new texture with the specified usage flags.
    pub fn new(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        usage: TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Create a read-only kernel input, filled from the CPU once.
    pub fn for_input(device: &Device, label: &str, width: u32, height: u32) -> Self {
        Self::new(
            device,
            label,
            width,
            height,
            IMAGE_FORMAT,
            TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        )
    }

    /// Create a kernel output that later passes can sample (and tests can copy out).
    pub fn for_kernel_output(device: &Device, label: &str, width: u32, height: u32) -> Self {
        Self::new(
            device,
            label,
            width,
            height,
            IMAGE_FORMAT,
            TextureUsages::STORAGE_BINDING | TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_SRC,
        )
    }

    /// Create a render target for final output (can be copied to CPU).
    pub fn for_output(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self::new(
            device,
            label,
            width,
            height,
            format,
            TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
        )
    }

    /// Create a depth attachment.
    pub fn for_depth(device: &Device, label: &str, width: u32, height: u32) -> Self {
        Self::new(
            device,
            label,
            width,
            height,
            DEPTH_FORMAT,
            TextureUsages::RENDER_ATTACHMENT,
        )
    }

    /// Upload tightly packed RGBA8 pixels covering the whole texture.
    pub fn upload_rgba8(&self, queue: &Queue, pixels: &[u8]) {
        debug_assert_eq!(pixels.len(), (self.width * self.height * 4) as usize);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            self.extent().into(),
        );
    }

    /// Get the texture view for rendering or sampling.
    pub fn view(&self) -> &TextureView {
        &self.view
    }

    /// Get the underlying texture (for copy operations).
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> Extent3 {
        Extent3::planar(self.width, self.height)
    }
}
