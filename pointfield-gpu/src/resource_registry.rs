use crate::handle::Handle;
use std::collections::HashMap;

/// Resource kinds the registry can hold.
pub trait ResourceType: Sized + 'static {
    fn storage(registry: &ResourceRegistry) -> &HashMap<u64, Self>;
    fn storage_mut(registry: &mut ResourceRegistry) -> &mut HashMap<u64, Self>;
}

macro_rules! registry_storage {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Registry mapping handles to actual wgpu resources
        /// Provides type-safe resource lookup and management
        #[derive(Default)]
        pub struct ResourceRegistry {
            $($field: HashMap<u64, $ty>,)*
        }

        $(
            impl ResourceType for $ty {
                fn storage(registry: &ResourceRegistry) -> &HashMap<u64, Self> {
                    &registry.$field
                }

                fn storage_mut(registry: &mut ResourceRegistry) -> &mut HashMap<u64, Self> {
                    &mut registry.$field
                }
            }
        )*
    };
}

registry_storage! {
    buffers: wgpu::Buffer,
    bind_group_layouts: wgpu::BindGroupLayout,
    bind_groups: wgpu::BindGroup,
    render_pipelines: wgpu::RenderPipeline,
    compute_pipelines: wgpu::ComputePipeline,
    shader_modules: wgpu::ShaderModule,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a resource and return its handle.
    pub fn insert<T: ResourceType>(&mut self, resource: T) -> Handle<T> {
        let handle = Handle::next();
        T::storage_mut(self).insert(handle.id(), resource);
        handle
    }

    pub fn get<T: ResourceType>(&self, handle: Handle<T>) -> Option<&T> {
        T::storage(self).get(&handle.id())
    }

    pub fn remove<T: ResourceType>(&mut self, handle: Handle<T>) -> Option<T> {
        T::storage_mut(self).remove(&handle.id())
    }

    pub fn contains<T: ResourceType>(&self, handle: Handle<T>) -> bool {
        T::storage(self).contains_key(&handle.id())
    }

    /// Number of live resources of kind `T`.
    pub fn count<T: ResourceType>(&self) -> usize {
        T::storage(self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::FutureExt;

    #[test]
    fn test_missing_handle_lookup() {
        let registry = ResourceRegistry::new();
        let handle = Handle::<wgpu::Buffer>::next();
        assert!(registry.get(handle).is_none());
        assert!(!registry.contains(handle));
        assert_eq!(registry.count::<wgpu::Buffer>(), 0);
    }

    #[test]
    fn test_insert_get_remove_buffer() {
        let Ok(renderer) = crate::Renderer::new().block_on() else {
            return;
        };
        let mut registry = ResourceRegistry::new();

        let buffer = renderer.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("registry_test"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        let handle = registry.insert(buffer);

        assert_eq!(registry.get(handle).map(|b| b.size()), Some(64));
        assert_eq!(registry.count::<wgpu::Buffer>(), 1);
        assert_eq!(registry.count::<wgpu::BindGroup>(), 0);

        assert!(registry.remove(handle).is_some());
        assert!(registry.get(handle).is_none());
    }
}
