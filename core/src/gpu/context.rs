//! GPU context initialization and management.

use std::sync::Arc;
use wgpu::{Adapter, Device, Instance, Queue};

use super::error::InitializationError;

/// GPU context holding the adapter, device and queue shared by a view and
/// the renderer hosted in it.
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Arc<Adapter>,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a new GPU context for headless rendering and compute.
    pub async fn new() -> Result<Self, InitializationError> {
        Self::with_surface(Self::create_instance(), None).await
    }

    /// Create the wgpu instance used for adapter and surface creation.
    ///
    /// Prefers Metal on macOS, Vulkan/DX12 elsewhere, with GL as a fallback.
    pub fn create_instance() -> Instance {
        Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY | wgpu::Backends::GL,
            ..Default::default()
        })
    }

    /// Create a context whose adapter can present to `surface`, if given.
    pub async fn with_surface(
        instance: Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, InitializationError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: surface,
            })
            .await
            .map_err(|_| InitializationError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("gpu-essentials"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let info = adapter.get_info();
        log::info!("Using GPU adapter {} ({:?})", info.name, info.backend);

        Ok(Self {
            instance,
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Get info about the GPU adapter.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Fail unless `format` can be bound as a write-only storage texture.
    pub fn require_storage_format(
        &self,
        format: wgpu::TextureFormat,
    ) -> Result<(), InitializationError> {
        let features = self.adapter.get_texture_format_features(format);
        if features
            .allowed_usages
            .contains(wgpu::TextureUsages::STORAGE_BINDING)
        {
            Ok(())
        } else {
            Err(InitializationError::UnsupportedFormat {
                format,
                usage: "storage binding",
            })
        }
    }
}
