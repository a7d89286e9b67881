//! WGSL sources embedded at compile time.

/// N-body integration step, one invocation per particle.
pub const PARTICLE_COMPUTE: &str = include_str!("../shaders/particle_compute.wgsl");

/// Expands particles into camera-facing quads.
pub const PARTICLE_VERTEX: &str = include_str!("../shaders/particle_vertex.wgsl");

pub const PARTICLE_FRAGMENT: &str = include_str!("../shaders/particle_fragment.wgsl");
