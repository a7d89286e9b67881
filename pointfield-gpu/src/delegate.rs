//! Render delegate trait and context types.
//!
//! A delegate owns the GPU resources for one kind of scene and records the
//! per-frame command stream. The window layer drives it without knowing what
//! it draws.

use crate::{GpuError, Renderer, ResourceRegistry, ViewState};

/// Context passed to the render delegate for rendering.
pub struct RenderContext<'a> {
    pub color_view: &'a wgpu::TextureView,
}

pub trait RenderDelegate: Sized {
    /// Data needed to construct the delegate.
    type InitData;

    /// Create GPU resources for rendering.
    fn create(
        renderer: &Renderer,
        registry: &mut ResourceRegistry,
        surface_format: wgpu::TextureFormat,
        init_data: Self::InitData,
    ) -> Result<Self, GpuError>;

    /// Upload per-frame uniforms.
    fn update(
        &mut self,
        queue: &wgpu::Queue,
        registry: &ResourceRegistry,
        view: &ViewState,
    ) -> Result<(), GpuError>;

    /// Record the frame's passes into `encoder`.
    fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: RenderContext,
        registry: &ResourceRegistry,
    ) -> Result<(), GpuError>;

    /// Start or pause a running simulation. No-op for static scenes.
    fn toggle_simulation(&mut self) {}

    /// Restore the initial simulation state.
    fn reset_simulation(
        &mut self,
        _queue: &wgpu::Queue,
        _registry: &ResourceRegistry,
    ) -> Result<(), GpuError> {
        Ok(())
    }

    /// Short status line for the window title.
    fn status(&self) -> Option<String> {
        None
    }
}
