//! GPU plumbing for pointfield.
//!
//! Owns the wgpu device, a handle-based resource registry, builders for
//! buffers, bind groups and pipelines, and the particle render delegate that
//! drives the per-frame compute + render passes.

pub mod builder;
pub mod delegate;
pub mod delegates;
pub mod handle;
pub mod pipeline;
pub mod resource_registry;
pub mod shaders;
pub mod surface;
pub mod types;

pub use builder::{
    BindGroupBuildError, BindGroupBuilder, BindGroupLayoutBuilder, BindingType, BufferBuildError,
    BufferBuilder, BufferUsage, ShaderStage,
};
pub use delegate::{RenderContext, RenderDelegate};
pub use delegates::particles::{
    ParticleDelegate, ParticleInitData, ParticleSettings, Placement, SimulationState,
};
pub use handle::Handle;
pub use pipeline::{ComputePipelineBuilder, PipelineBuildError, RenderPipelineBuilder};
pub use resource_registry::{ResourceRegistry, ResourceType};
pub use surface::SurfaceWrapper;
pub use types::{ComputeParams, RenderParams, ViewState};

pub use wgpu;

use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Request Adapter Error: {0}")]
    RequestAdapterError(#[from] wgpu::RequestAdapterError),
    #[error("Request Device Error: {0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("Create surface error: {0}")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    #[error("Surface is not supported by the selected adapter")]
    UnsupportedSurface,
}

/// Errors raised while creating or driving GPU work for a delegate.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error("Buffer build error: {0}")]
    BufferBuild(#[from] BufferBuildError),
    #[error("Bind group build error: {0}")]
    BindGroupBuild(#[from] BindGroupBuildError),
    #[error("Pipeline build error: {0}")]
    PipelineBuild(#[from] PipelineBuildError),
    #[error("Missing GPU resource: {0}")]
    MissingResource(&'static str),
    #[error("No particles to simulate")]
    EmptyParticleSet,
}

/// First non-sRGB format in `formats`. Clear colours and additive blending are
/// specified as stored values, so the surface must not gamma encode them.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats.iter().copied().find(|format| !format.is_srgb())
}

/// Device, queue and the instance/adapter they came from.
pub struct Renderer {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Renderer {
    pub async fn new() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await?;

        let adapter_info = adapter.get_info();
        info!(
            "Using adapter {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Renderer"),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Configure a window surface for presentation.
    pub fn create_surface(
        &self,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<SurfaceWrapper, RendererError> {
        let mut config = surface
            .get_default_config(&self.adapter, width.max(1), height.max(1))
            .ok_or(RendererError::UnsupportedSurface)?;
        config.present_mode = wgpu::PresentMode::AutoVsync;
        let formats = surface.get_capabilities(&self.adapter).formats;
        if let Some(format) = pick_surface_format(&formats) {
            config.format = format;
        }
        if config.format.is_srgb() {
            warn!(
                "No linear surface format available, using {:?}; colours will be gamma encoded",
                config.format
            );
        }
        surface.configure(&self.device, &config);
        info!(
            "Configured surface {}x{} ({:?})",
            config.width, config.height, config.format
        );
        Ok(SurfaceWrapper::new(surface, config))
    }

    pub fn create_buffer(&self) -> BufferBuilder<'_> {
        BufferBuilder::new(&self.device)
    }

    pub fn create_bind_group_layout(&self) -> BindGroupLayoutBuilder<'_> {
        BindGroupLayoutBuilder::new(&self.device)
    }

    pub fn create_bind_group(
        &self,
        layout: Handle<wgpu::BindGroupLayout>,
    ) -> BindGroupBuilder<'_> {
        BindGroupBuilder::new(&self.device, layout)
    }

    /// Compile WGSL source and register the module.
    pub fn create_shader(
        &self,
        registry: &mut ResourceRegistry,
        label: &str,
        source: &str,
    ) -> Handle<wgpu::ShaderModule> {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        registry.insert(module)
    }
}
