//! Performing calculations on a GPU: add two float arrays in a compute kernel.
//!
//! Unlike the frame samples this runs once. The commands are submitted and the
//! calling thread waits for the GPU before reading the result back.

use std::sync::Arc;

use rand::Rng;
use wgpu::{BindGroup, Buffer, ComputePipeline, Device, Queue, ShaderStages};

use crate::gpu::readback::map_blocking;
use crate::gpu::{
    create_compute_pipeline, BindGroupLayoutBuilder, CommandSequence, DispatchGeometry,
    FunctionLibrary, InitializationError, MapError, ShaderStage,
};

pub const INPUT_A_SLOT: u32 = 0;
pub const INPUT_B_SLOT: u32 = 1;
pub const RESULT_SLOT: u32 = 2;

/// Threads per threadgroup, as declared by `add_arrays`.
pub const GROUP_WIDTH: u32 = 256;

/// Array length used by the command-line sample.
pub const DEFAULT_ARRAY_LENGTH: usize = 1 << 24;

const SHADER_SOURCE: &str = include_str!("shaders/add.wgsl");
const KERNEL_FUNCTION: &str = "add_arrays";

const FLOAT_BYTES: u64 = std::mem::size_of::<f32>() as u64;

#[derive(Debug, thiserror::Error)]
pub enum AdderError {
    #[error(transparent)]
    Init(#[from] InitializationError),
    #[error("Array length must be at least 1")]
    EmptyInput,
    #[error("Array of {length} floats exceeds the device's {max} float storage binding limit")]
    TooLong { length: usize, max: usize },
    #[error("Expected arrays of {expected} floats, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    BufferMapFailed(#[from] MapError),
    #[error("Compute error at index {index}: expected {expected}, got {actual}")]
    Mismatch {
        index: usize,
        expected: f32,
        actual: f32,
    },
}

/// Owns the kernel and the three device buffers for one array length.
pub struct ArrayAdder {
    device: Arc<Device>,
    queue: Arc<Queue>,
    pipeline: ComputePipeline,
    bind_group: BindGroup,
    buffer_a: Buffer,
    buffer_b: Buffer,
    buffer_result: Buffer,
    staging: Buffer,
    geometry: DispatchGeometry,
    a: Vec<f32>,
    b: Vec<f32>,
}

impl ArrayAdder {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>, length: usize) -> Result<Self, AdderError> {
        let max_groups = device.limits().max_compute_workgroups_per_dimension;
        Self::with_group_limit(device, queue, length, max_groups)
    }

    /// Like [`ArrayAdder::new`], but folds the dispatch once a row would exceed
    /// `max_groups_per_dim` groups. The value is clamped to the device limit.
    pub fn with_group_limit(
        device: Arc<Device>,
        queue: Arc<Queue>,
        length: usize,
        max_groups_per_dim: u32,
    ) -> Result<Self, AdderError> {
        if length == 0 {
            return Err(AdderError::EmptyInput);
        }
        let limits = device.limits();
        let max = (limits.max_storage_buffer_binding_size as u64 / FLOAT_BYTES) as usize;
        if length > max {
            return Err(AdderError::TooLong { length, max });
        }

        let library = FunctionLibrary::from_wgsl(&device, "add_library", SHADER_SOURCE)?;
        let kernel = library.function(KERNEL_FUNCTION, ShaderStage::Compute)?;

        let layout = BindGroupLayoutBuilder::new("add_layout")
            .storage_buffer(INPUT_A_SLOT, ShaderStages::COMPUTE, true)
            .storage_buffer(INPUT_B_SLOT, ShaderStages::COMPUTE, true)
            .storage_buffer(RESULT_SLOT, ShaderStages::COMPUTE, false)
            .build(&device);
        let pipeline = create_compute_pipeline(&device, kernel, &layout)?;

        let size = length as u64 * FLOAT_BYTES;
        let storage = |label: &str, usage: wgpu::BufferUsages| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            })
        };
        let input_usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;
        let buffer_a = storage("add_input_a", input_usage);
        let buffer_b = storage("add_input_b", input_usage);
        let buffer_result = storage(
            "add_result",
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );
        let staging = storage(
            "add_staging",
            wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("add_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: INPUT_A_SLOT,
                    resource: buffer_a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: INPUT_B_SLOT,
                    resource: buffer_b.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: RESULT_SLOT,
                    resource: buffer_result.as_entire_binding(),
                },
            ],
        });

        let geometry = DispatchGeometry::linear(
            length as u32,
            GROUP_WIDTH,
            max_groups_per_dim.clamp(1, limits.max_compute_workgroups_per_dimension),
        );
        log::debug!(
            "Adder for {} floats: {:?} groups of {}",
            length,
            geometry.group_count(),
            GROUP_WIDTH
        );

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group,
            buffer_a,
            buffer_b,
            buffer_result,
            staging,
            geometry,
            a: Vec::new(),
            b: Vec::new(),
        })
    }

    /// Number of floats in each array.
    pub fn len(&self) -> usize {
        (self.buffer_a.size() / FLOAT_BYTES) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn geometry(&self) -> DispatchGeometry {
        self.geometry
    }

    /// Fill both inputs with random values in `[0, 1)` and upload them.
    pub fn prepare_data<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), AdderError> {
        let len = self.len();
        let a = (0..len).map(|_| rng.random::<f32>()).collect();
        let b = (0..len).map(|_| rng.random::<f32>()).collect();
        self.upload(a, b)
    }

    /// Upload explicit input arrays.
    pub fn upload(&mut self, a: Vec<f32>, b: Vec<f32>) -> Result<(), AdderError> {
        let expected = self.len();
        for actual in [a.len(), b.len()] {
            if actual != expected {
                return Err(AdderError::LengthMismatch { expected, actual });
            }
        }
        self.queue
            .write_buffer(&self.buffer_a, 0, bytemuck::cast_slice(&a));
        self.queue
            .write_buffer(&self.buffer_b, 0, bytemuck::cast_slice(&b));
        self.a = a;
        self.b = b;
        Ok(())
    }

    pub fn inputs(&self) -> (&[f32], &[f32]) {
        (&self.a, &self.b)
    }

    /// Run the kernel once, wait for it, and read the result back.
    pub fn send_compute_command(&self) -> Result<Vec<f32>, AdderError> {
        let mut commands = CommandSequence::new(&self.device, "add_commands");
        commands.compute_pass("add_pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            self.geometry.dispatch(pass);
        });
        commands.copy(|encoder| {
            encoder.copy_buffer_to_buffer(
                &self.buffer_result,
                0,
                &self.staging,
                0,
                self.staging.size(),
            );
        });
        commands.submit(&self.queue);

        map_blocking(&self.device, &self.staging)?;
        let result = {
            let data = self.staging.slice(..).get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&data).to_vec()
        };
        self.staging.unmap();
        Ok(result)
    }

    /// Check `result` against the uploaded inputs.
    pub fn verify_results(&self, result: &[f32]) -> Result<(), AdderError> {
        verify_sum(&self.a, &self.b, result)
    }
}

/// Check `result[i] == a[i] + b[i]` for every index, reporting the first mismatch.
pub fn verify_sum(a: &[f32], b: &[f32], result: &[f32]) -> Result<(), AdderError> {
    if result.len() != a.len() || b.len() != a.len() {
        return Err(AdderError::LengthMismatch {
            expected: a.len(),
            actual: result.len().min(b.len()),
        });
    }
    for (index, ((x, y), actual)) in a.iter().zip(b).zip(result).enumerate() {
        let expected = x + y;
        if *actual != expected {
            return Err(AdderError::Mismatch {
                index,
                expected,
                actual: *actual,
            });
        }
    }
    Ok(())
}
