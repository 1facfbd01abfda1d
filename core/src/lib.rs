//! GPU Essentials Core
//!
//! Small GPU samples built on wgpu. Each sample builds its pipelines once and
//! then encodes the same short command sequence for every frame.
//!
//! # Samples
//!
//! - `adder` - add two float arrays in a compute kernel and verify the result
//! - `clear` - clear the view to a cycling color
//! - `triangle` - draw a colored triangle in pixel coordinates
//! - `grayscale` - convert a texture to grayscale in a compute kernel, then draw it
//! - `depth` - draw overlapping primitives with depth testing
//!
//! Frame samples are hosted by a [`view::GpuView`]: a window through winit or
//! an off-screen texture for headless runs and tests.

pub mod app;
pub mod config;
pub mod gpu;
pub mod kernels;
pub mod logging;
pub mod samples;
pub mod source;
pub mod view;

// Re-export commonly used types
pub use config::{ConfigError, SampleConfig};
pub use gpu::{DispatchGeometry, Extent3, GpuContext, InitializationError, MapError};
pub use samples::{
    create_renderer, AdderError, ArrayAdder, FrameOutcome, Renderer, SampleKind, Viewport,
};
pub use source::SourceImage;
pub use view::{GpuView, OffscreenView, ViewError, ViewportSize, WindowView};
