//! Errors raised while bringing a sample up.

use std::path::PathBuf;

use super::library::ShaderStage;

/// Errors that can occur while initializing GPU state for a sample.
///
/// Every variant comes from static misconfiguration (a missing adapter, a
/// misspelled function name, a bad image file), so none of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("Surface reports no supported formats for this adapter")]
    IncompatibleSurface,
    #[error("Failed to parse library `{library}`:\n{message}")]
    ShaderParse { library: String, message: String },
    #[error("Function `{name}` not found in library `{library}`")]
    MissingFunction { library: String, name: String },
    #[error("Function `{name}` is a {actual} function, expected a {expected} function")]
    WrongStage {
        name: String,
        expected: ShaderStage,
        actual: ShaderStage,
    },
    #[error("Failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Image data has {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    ImageFormat {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Image has zero size")]
    EmptyImage,
    #[error("Pipeline `{label}` rejected: {message}")]
    PipelineRejected { label: String, message: String },
    #[error("Texture format {format:?} does not support {usage}")]
    UnsupportedFormat {
        format: wgpu::TextureFormat,
        usage: &'static str,
    },
}

/// Errors that can occur while reading GPU memory back to the CPU.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("GPU buffer mapping failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("Device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),
    #[error("Mapping callback was dropped before completing")]
    CallbackDropped,
}
