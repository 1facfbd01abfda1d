//! Per-frame command sequences.

use wgpu::{CommandEncoder, Device, Queue, SubmissionIndex};

/// Kind of pass recorded into a [`CommandSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Compute,
    Render,
    Copy,
}

/// One frame's worth of encoded GPU work.
///
/// Passes are encoded in call order and submitted as a single command buffer,
/// so a render pass reading a texture that an earlier compute pass in the same
/// sequence wrote sees the compute results.
pub struct CommandSequence {
    encoder: CommandEncoder,
    passes: Vec<PassKind>,
}

impl CommandSequence {
    pub fn new(device: &Device, label: &str) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });
        Self {
            encoder,
            passes: Vec::new(),
        }
    }

    /// Encode a compute pass.
    pub fn compute_pass<F>(&mut self, label: &str, encode: F) -> &mut Self
    where
        F: FnOnce(&mut wgpu::ComputePass<'_>),
    {
        {
            let mut pass = self.encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            encode(&mut pass);
        }
        self.passes.push(PassKind::Compute);
        self
    }

    /// Encode a render pass.
    pub fn render_pass<F>(&mut self, descriptor: &wgpu::RenderPassDescriptor<'_>, encode: F) -> &mut Self
    where
        F: FnOnce(&mut wgpu::RenderPass<'_>),
    {
        {
            let mut pass = self.encoder.begin_render_pass(descriptor);
            encode(&mut pass);
        }
        self.passes.push(PassKind::Render);
        self
    }

    /// Encode copy commands directly on the encoder.
    pub fn copy<F>(&mut self, encode: F) -> &mut Self
    where
        F: FnOnce(&mut CommandEncoder),
    {
        encode(&mut self.encoder);
        self.passes.push(PassKind::Copy);
        self
    }

    /// Passes recorded so far, in encoding order.
    pub fn passes(&self) -> &[PassKind] {
        &self.passes
    }

    /// Finish encoding and hand the work to the queue. Does not wait for the GPU.
    pub fn submit(self, queue: &Queue) -> SubmissionIndex {
        log::trace!("Submitting command sequence with passes {:?}", self.passes);
        queue.submit(std::iter::once(self.encoder.finish()))
    }
}

/// Color attachment that clears `view` to `clear` and stores the result.
pub fn clear_attachment(
    view: &wgpu::TextureView,
    clear: wgpu::Color,
) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        depth_slice: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(clear),
            store: wgpu::StoreOp::Store,
        },
    }
}
