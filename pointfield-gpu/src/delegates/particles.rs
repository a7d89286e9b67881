//! Particle field render delegate.
//!
//! Each frame runs one compute pass that integrates every particle against
//! every other particle, then one render pass that draws the freshly written
//! positions as additively blended sprites. Positions live in two storage
//! buffers that swap roles after every frame.

use crate::{
    BindingType, BufferUsage, ComputeParams, ComputePipelineBuilder, GpuError, Handle,
    RenderContext, RenderDelegate, RenderParams, RenderPipelineBuilder, Renderer,
    ResourceRegistry, ShaderStage, ViewState, shaders,
};
use glam::Vec3;
use pointfield_data::{MAX_POINTS_PER_FRAME, XyzFrame, XyzPoint};
use tracing::{debug, info};

/// Must match `@workgroup_size` in `particle_compute.wgsl`.
pub const WORKGROUP_SIZE: u32 = 256;
pub const VERTICES_PER_PARTICLE: u32 = 6;
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.15,
    g: 0.15,
    b: 0.3,
    a: 1.0,
};

const ADDITIVE: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

/// Maps model-space points into the simulation volume.
///
/// The model's y and z axes are swapped so that its vertical axis faces the
/// camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub offset: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            scale: 17.0,
            offset: Vec3::new(-0.3, -0.2, 0.0),
        }
    }
}

impl Placement {
    /// Position in the simulation, with unit mass in `w`.
    pub fn place(&self, point: XyzPoint) -> [f32; 4] {
        [
            point.x / self.scale + self.offset.x,
            point.z / self.scale + self.offset.y,
            point.y / self.scale + self.offset.z,
            1.0,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSettings {
    /// Upper bound on simulated particles; the frame may supply fewer.
    pub particle_count: usize,
    pub softening: f32,
    /// Integration step used while the simulation runs.
    pub active_delta: f32,
    pub start_running: bool,
    /// Sprite diameter in pixels.
    pub point_size: f32,
    pub placement: Placement,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            particle_count: MAX_POINTS_PER_FRAME,
            softening: 0.4,
            active_delta: 0.0003,
            start_running: false,
            point_size: 6.0,
            placement: Placement::default(),
        }
    }
}

/// Running/paused state of the integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    delta: f32,
    active_delta: f32,
}

impl SimulationState {
    pub fn new(active_delta: f32, running: bool) -> Self {
        Self {
            delta: if running { active_delta } else { 0.0 },
            active_delta,
        }
    }

    /// Flip between paused (`delta == 0`) and running.
    pub fn toggle(&mut self) {
        self.delta = if self.is_running() {
            0.0
        } else {
            self.active_delta
        };
    }

    pub fn is_running(&self) -> bool {
        self.delta != 0.0
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}

/// Index of the position buffer the next compute pass reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PingPong {
    input: usize,
}

impl PingPong {
    pub(crate) fn input(&self) -> usize {
        self.input
    }

    pub(crate) fn output(&self) -> usize {
        1 - self.input
    }

    pub(crate) fn swap(&mut self) {
        self.input = self.output();
    }
}

/// Number of workgroups needed to cover `particle_count` invocations.
pub fn workgroup_count(particle_count: u32) -> u32 {
    particle_count.div_ceil(WORKGROUP_SIZE)
}

/// Seed positions plus the settings the delegate is built with.
pub struct ParticleInitData {
    seeds: Vec<[f32; 4]>,
    pub settings: ParticleSettings,
}

impl ParticleInitData {
    /// Seed from the first `settings.particle_count` points of `frame`.
    pub fn from_frame(frame: &XyzFrame, settings: ParticleSettings) -> Self {
        let seeds = frame
            .points()
            .iter()
            .take(settings.particle_count)
            .map(|&point| settings.placement.place(point))
            .collect();
        Self { seeds, settings }
    }

    /// Seed from already placed positions.
    pub fn from_seeds(seeds: Vec<[f32; 4]>, settings: ParticleSettings) -> Self {
        Self { seeds, settings }
    }

    pub fn seed_positions(&self) -> &[[f32; 4]] {
        &self.seeds
    }
}

pub struct ParticleDelegate {
    particle_count: u32,
    seeds: Vec<[f32; 4]>,
    softening: f32,
    point_size: f32,
    simulation: SimulationState,
    ping_pong: PingPong,
    position_buffers: [Handle<wgpu::Buffer>; 2],
    velocity_buffer: Handle<wgpu::Buffer>,
    compute_params_buffer: Handle<wgpu::Buffer>,
    render_params_buffer: Handle<wgpu::Buffer>,
    compute_bind_groups: [Handle<wgpu::BindGroup>; 2],
    render_bind_groups: [Handle<wgpu::BindGroup>; 2],
    compute_pipeline: Handle<wgpu::ComputePipeline>,
    render_pipeline: Handle<wgpu::RenderPipeline>,
}

impl ParticleDelegate {
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn simulation(&self) -> &SimulationState {
        &self.simulation
    }

    /// Buffer holding the most recently computed positions.
    pub fn current_positions(&self) -> Handle<wgpu::Buffer> {
        self.position_buffers[self.ping_pong.input()]
    }

    fn compute_params(&self) -> ComputeParams {
        ComputeParams::new(self.particle_count, self.simulation.delta(), self.softening)
    }
}

fn pipeline_layout(
    device: &wgpu::Device,
    registry: &ResourceRegistry,
    label: &str,
    layout: Handle<wgpu::BindGroupLayout>,
) -> Result<wgpu::PipelineLayout, GpuError> {
    let layout = registry
        .get(layout)
        .ok_or(GpuError::MissingResource("bind group layout"))?;
    Ok(device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    }))
}

impl RenderDelegate for ParticleDelegate {
    type InitData = ParticleInitData;

    #[tracing::instrument(skip_all)]
    fn create(
        renderer: &Renderer,
        registry: &mut ResourceRegistry,
        surface_format: wgpu::TextureFormat,
        init_data: Self::InitData,
    ) -> Result<Self, GpuError> {
        let ParticleInitData { seeds, settings } = init_data;
        if seeds.is_empty() {
            return Err(GpuError::EmptyParticleSet);
        }
        let particle_count = seeds.len() as u32;
        let device = renderer.device();

        let position_buffers = [
            renderer
                .create_buffer()
                .label("Positions A")
                .with_pod_data(&seeds)
                .usage(BufferUsage::Storage)
                .build(registry)?,
            renderer
                .create_buffer()
                .label("Positions B")
                .with_pod_data(&seeds)
                .usage(BufferUsage::Storage)
                .build(registry)?,
        ];

        let zero_velocities = vec![[0.0f32; 4]; seeds.len()];
        let velocity_buffer = renderer
            .create_buffer()
            .label("Velocities")
            .with_pod_data(&zero_velocities)
            .usage(BufferUsage::Storage)
            .build(registry)?;

        let simulation = SimulationState::new(settings.active_delta, settings.start_running);
        let compute_params = [ComputeParams::new(
            particle_count,
            simulation.delta(),
            settings.softening,
        )];
        let compute_params_buffer = renderer
            .create_buffer()
            .label("Compute Params")
            .with_pod_data(&compute_params)
            .usage(BufferUsage::Uniform)
            .build(registry)?;

        let render_params_buffer = renderer
            .create_buffer()
            .label("Render Params")
            .size(std::mem::size_of::<RenderParams>() as u64)
            .usage(BufferUsage::Uniform)
            .build(registry)?;

        let compute_layout = renderer
            .create_bind_group_layout()
            .label("Particle Compute Layout")
            .buffer(0, BindingType::StorageRead, ShaderStage::Compute)
            .buffer(1, BindingType::StorageWrite, ShaderStage::Compute)
            .buffer(2, BindingType::StorageWrite, ShaderStage::Compute)
            .buffer(3, BindingType::Uniform, ShaderStage::Compute)
            .build(registry)?;

        let render_layout = renderer
            .create_bind_group_layout()
            .label("Particle Render Layout")
            .buffer(0, BindingType::StorageRead, ShaderStage::Vertex)
            .buffer(1, BindingType::Uniform, ShaderStage::Vertex)
            .build(registry)?;

        // Group i reads positions[i] and writes positions[1 - i]; the render
        // group with the same index reads what that compute pass wrote.
        let mut compute_bind_groups = Vec::with_capacity(2);
        let mut render_bind_groups = Vec::with_capacity(2);
        for (index, label) in ["A -> B", "B -> A"].into_iter().enumerate() {
            let (input, output) = (position_buffers[index], position_buffers[1 - index]);
            compute_bind_groups.push(
                renderer
                    .create_bind_group(compute_layout)
                    .label(format!("Particle Compute {label}"))
                    .buffer(0, input)
                    .buffer(1, output)
                    .buffer(2, velocity_buffer)
                    .buffer(3, compute_params_buffer)
                    .build(registry)?,
            );
            render_bind_groups.push(
                renderer
                    .create_bind_group(render_layout)
                    .label(format!("Particle Render {label}"))
                    .buffer(0, output)
                    .buffer(1, render_params_buffer)
                    .build(registry)?,
            );
        }

        let compute_shader =
            renderer.create_shader(registry, "particle_compute", shaders::PARTICLE_COMPUTE);
        let vertex_shader =
            renderer.create_shader(registry, "particle_vs", shaders::PARTICLE_VERTEX);
        let fragment_shader =
            renderer.create_shader(registry, "particle_fs", shaders::PARTICLE_FRAGMENT);

        let compute_pipeline = ComputePipelineBuilder::new(device)
            .with_label("Particle Compute Pipeline")
            .with_shader(compute_shader)
            .with_layout(pipeline_layout(
                device,
                registry,
                "Particle Compute Pipeline Layout",
                compute_layout,
            )?)
            .build(registry)?;

        let render_pipeline = RenderPipelineBuilder::new(device)
            .with_label("Particle Render Pipeline")
            .with_vertex_shader(vertex_shader)
            .with_fragment_shader(fragment_shader)
            .with_layout(pipeline_layout(
                device,
                registry,
                "Particle Render Pipeline Layout",
                render_layout,
            )?)
            .with_primitive(wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            })
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState {
                    color: ADDITIVE,
                    alpha: ADDITIVE,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .build(registry)?;

        info!(
            "Created particle delegate: {} particles, {} workgroups, simulation {}",
            particle_count,
            workgroup_count(particle_count),
            if simulation.is_running() {
                "running"
            } else {
                "paused"
            }
        );

        Ok(Self {
            particle_count,
            seeds,
            softening: settings.softening,
            point_size: settings.point_size,
            simulation,
            ping_pong: PingPong::default(),
            position_buffers,
            velocity_buffer,
            compute_params_buffer,
            render_params_buffer,
            compute_bind_groups: [compute_bind_groups[0], compute_bind_groups[1]],
            render_bind_groups: [render_bind_groups[0], render_bind_groups[1]],
            compute_pipeline,
            render_pipeline,
        })
    }

    fn update(
        &mut self,
        queue: &wgpu::Queue,
        registry: &ResourceRegistry,
        view: &ViewState,
    ) -> Result<(), GpuError> {
        let render_params = registry
            .get(self.render_params_buffer)
            .ok_or(GpuError::MissingResource("render params buffer"))?;
        queue.write_buffer(
            render_params,
            0,
            bytemuck::bytes_of(&RenderParams::new(view, self.point_size)),
        );

        let compute_params = registry
            .get(self.compute_params_buffer)
            .ok_or(GpuError::MissingResource("compute params buffer"))?;
        queue.write_buffer(compute_params, 0, bytemuck::bytes_of(&self.compute_params()));
        Ok(())
    }

    fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: RenderContext,
        registry: &ResourceRegistry,
    ) -> Result<(), GpuError> {
        let index = self.ping_pong.input();
        let compute_pipeline = registry
            .get(self.compute_pipeline)
            .ok_or(GpuError::MissingResource("compute pipeline"))?;
        let compute_bind_group = registry
            .get(self.compute_bind_groups[index])
            .ok_or(GpuError::MissingResource("compute bind group"))?;
        let render_pipeline = registry
            .get(self.render_pipeline)
            .ok_or(GpuError::MissingResource("render pipeline"))?;
        let render_bind_group = registry
            .get(self.render_bind_groups[index])
            .ok_or(GpuError::MissingResource("render bind group"))?;

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Compute Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(compute_pipeline);
            pass.set_bind_group(0, compute_bind_group, &[]);
            pass.dispatch_workgroups(workgroup_count(self.particle_count), 1, 1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: ctx.color_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(render_pipeline);
            pass.set_bind_group(0, render_bind_group, &[]);
            pass.draw(0..self.particle_count * VERTICES_PER_PARTICLE, 0..1);
        }

        self.ping_pong.swap();
        Ok(())
    }

    fn toggle_simulation(&mut self) {
        self.simulation.toggle();
        debug!(
            running = self.simulation.is_running(),
            delta = self.simulation.delta(),
            "Toggled simulation"
        );
    }

    fn reset_simulation(
        &mut self,
        queue: &wgpu::Queue,
        registry: &ResourceRegistry,
    ) -> Result<(), GpuError> {
        for handle in self.position_buffers {
            let buffer = registry
                .get(handle)
                .ok_or(GpuError::MissingResource("position buffer"))?;
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.seeds));
        }

        let velocities = registry
            .get(self.velocity_buffer)
            .ok_or(GpuError::MissingResource("velocity buffer"))?;
        let zeros = vec![[0.0f32; 4]; self.seeds.len()];
        queue.write_buffer(velocities, 0, bytemuck::cast_slice(&zeros));

        info!("Reset {} particles to seed positions", self.particle_count);
        Ok(())
    }

    fn status(&self) -> Option<String> {
        let state = if self.simulation.is_running() {
            "running"
        } else {
            "paused"
        };
        Some(format!("{} particles, {state}", self.particle_count))
    }
}
