use pointfield_data::Matrix4;

/// Uniform block read by `particle_compute.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ComputeParams {
    pub particle_count: u32,
    /// Integration step. Zero freezes the simulation.
    pub delta: f32,
    pub softening: f32,
    pub _padding: u32,
}

impl ComputeParams {
    pub fn new(particle_count: u32, delta: f32, softening: f32) -> Self {
        Self {
            particle_count,
            delta,
            softening,
            _padding: 0,
        }
    }
}

/// Uniform block read by `particle_vertex.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    pub view_proj: [[f32; 4]; 4],
    /// Drawable size in pixels.
    pub viewport: [f32; 2],
    /// Sprite diameter in pixels.
    pub point_size: f32,
    pub _padding: f32,
}

impl RenderParams {
    pub fn new(view: &ViewState, point_size: f32) -> Self {
        Self {
            view_proj: view.view_proj.to_cols_array_2d(),
            viewport: [view.viewport[0].max(1.0), view.viewport[1].max(1.0)],
            point_size,
            _padding: 0.0,
        }
    }
}

/// Per-frame view information handed to a delegate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub view_proj: Matrix4,
    pub viewport: [f32; 2],
}

impl ViewState {
    pub fn new(view_proj: Matrix4, width: u32, height: u32) -> Self {
        Self {
            view_proj,
            viewport: [width as f32, height as f32],
        }
    }
}
