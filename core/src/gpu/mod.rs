//! GPU plumbing shared by all samples, built on wgpu.
//!
//! Provides device acquisition, function libraries, pipeline and bind group
//! builders, dispatch geometry, textures, per-frame command sequences and
//! readback helpers. Runs on the Metal backend on macOS and on Vulkan, DX12
//! or GL elsewhere.

pub mod command;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod layouts;
pub mod library;
pub mod pipelines;
pub mod readback;
pub mod textures;

pub use command::{clear_attachment, CommandSequence, PassKind};
pub use context::GpuContext;
pub use dispatch::{DispatchGeometry, Extent3};
pub use error::{InitializationError, MapError};
pub use layouts::BindGroupLayoutBuilder;
pub use library::{EntryTable, Function, FunctionLibrary, ShaderStage};
pub use pipelines::{create_compute_pipeline, create_pipeline_layout, RenderPipelineBuilder};
pub use readback::{read_texture, ReadbackBuffer};
pub use textures::{Texture2d, DEPTH_FORMAT, IMAGE_FORMAT};
