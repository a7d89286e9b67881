//! High-level builder APIs for creating GPU resources
//!
//! These builders provide a simpler, more ergonomic API compared to
//! directly using wgpu descriptors.

use crate::handle::Handle;
use crate::resource_registry::ResourceRegistry;

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uniform buffer, rewritten from the CPU every frame
    Uniform,
    /// Storage buffer; re-seedable from the CPU and copyable for readback
    Storage,
    /// Staging buffer for CPU readback
    Readback,
}

impl BufferUsage {
    fn to_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            BufferUsage::Storage => {
                wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC
            }
            BufferUsage::Readback => wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        }
    }
}

impl From<BufferUsage> for wgpu::BufferUsages {
    fn from(usage: BufferUsage) -> Self {
        usage.to_wgpu()
    }
}

/// Builder for creating GPU buffers
pub struct BufferBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<String>,
    size: Option<u64>,
    data: Option<&'a [u8]>,
    usage: BufferUsage,
}

impl<'a> BufferBuilder<'a> {
    pub(crate) fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            size: None,
            data: None,
            usage: BufferUsage::Storage,
        }
    }

    /// Set the buffer label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set buffer size (for empty buffers)
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set buffer data from a slice of Pod types
    pub fn with_pod_data<T: bytemuck::Pod>(mut self, data: &'a [T]) -> Self {
        self.data = Some(bytemuck::cast_slice(data));
        self
    }

    pub fn usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Build the buffer and register it in the registry
    pub fn build(
        self,
        registry: &mut ResourceRegistry,
    ) -> Result<Handle<wgpu::Buffer>, BufferBuildError> {
        use wgpu::util::DeviceExt;

        let buffer = match (self.data, self.size) {
            (Some(data), _) if data.is_empty() => return Err(BufferBuildError::EmptyData),
            (Some(data), _) => self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: self.label.as_deref(),
                    contents: data,
                    usage: self.usage.to_wgpu(),
                }),
            (None, Some(size)) => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: self.label.as_deref(),
                size,
                usage: self.usage.to_wgpu(),
                mapped_at_creation: false,
            }),
            (None, None) => return Err(BufferBuildError::MissingSizeOrData),
        };

        Ok(registry.insert(buffer))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BufferBuildError {
    #[error("Buffer must have either size or data")]
    MissingSizeOrData,
    #[error("Buffer data must not be empty")]
    EmptyData,
}

/// Binding type for bind groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    Uniform,
    StorageRead,
    StorageWrite,
}

impl BindingType {
    fn to_wgpu_binding_type(self) -> wgpu::BindingType {
        let ty = match self {
            BindingType::Uniform => wgpu::BufferBindingType::Uniform,
            BindingType::StorageRead => wgpu::BufferBindingType::Storage { read_only: true },
            BindingType::StorageWrite => wgpu::BufferBindingType::Storage { read_only: false },
        };
        wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        }
    }
}

/// Shader stage visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Compute,
}

impl ShaderStage {
    fn to_wgpu(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Compute => wgpu::ShaderStages::COMPUTE,
        }
    }
}

/// Builder for bind group layouts. Layouts are shared between the
/// bind groups that alternate over ping-pong buffers.
pub struct BindGroupLayoutBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<String>,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl<'a> BindGroupLayoutBuilder<'a> {
    pub(crate) fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            entries: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a buffer binding visible to `stage`
    pub fn buffer(mut self, binding: u32, binding_type: BindingType, stage: ShaderStage) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility: stage.to_wgpu(),
            ty: binding_type.to_wgpu_binding_type(),
            count: None,
        });
        self
    }

    pub fn build(
        self,
        registry: &mut ResourceRegistry,
    ) -> Result<Handle<wgpu::BindGroupLayout>, BindGroupBuildError> {
        if self.entries.is_empty() {
            return Err(BindGroupBuildError::NoEntries);
        }

        let layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: self.label.as_deref(),
                entries: &self.entries,
            });
        Ok(registry.insert(layout))
    }
}

/// Builder for bind groups against an existing layout
pub struct BindGroupBuilder<'a> {
    device: &'a wgpu::Device,
    layout: Handle<wgpu::BindGroupLayout>,
    label: Option<String>,
    buffer_bindings: Vec<(u32, Handle<wgpu::Buffer>)>,
}

impl<'a> BindGroupBuilder<'a> {
    pub(crate) fn new(device: &'a wgpu::Device, layout: Handle<wgpu::BindGroupLayout>) -> Self {
        Self {
            device,
            layout,
            label: None,
            buffer_bindings: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Bind a whole buffer at `binding`
    pub fn buffer(mut self, binding: u32, buffer: Handle<wgpu::Buffer>) -> Self {
        self.buffer_bindings.push((binding, buffer));
        self
    }

    /// Build the bind group and register it in the registry
    pub fn build(
        self,
        registry: &mut ResourceRegistry,
    ) -> Result<Handle<wgpu::BindGroup>, BindGroupBuildError> {
        if self.buffer_bindings.is_empty() {
            return Err(BindGroupBuildError::NoEntries);
        }

        let layout = registry
            .get(self.layout)
            .ok_or(BindGroupBuildError::LayoutNotFound)?;

        let entries = self
            .buffer_bindings
            .iter()
            .map(|(binding, handle)| {
                registry
                    .get(*handle)
                    .map(|buffer| wgpu::BindGroupEntry {
                        binding: *binding,
                        resource: buffer.as_entire_binding(),
                    })
                    .ok_or(BindGroupBuildError::ResourceNotFound)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: self.label.as_deref(),
            layout,
            entries: &entries,
        });

        Ok(registry.insert(bind_group))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindGroupBuildError {
    #[error("Resource not found in registry")]
    ResourceNotFound,
    #[error("No bindings added to bind group")]
    NoEntries,
    #[error("Bind group layout not found")]
    LayoutNotFound,
}
