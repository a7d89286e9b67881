//! Windowing for pointfield: the winit event loop that drives a
//! [`RenderDelegate`](pointfield_gpu::RenderDelegate), the orbit camera, and
//! pointer gesture handling.

mod app;
pub mod camera;
pub mod controls;

pub use app::{WindowConfig, run_with_delegate};
pub use camera::{Camera, CameraSettings};
pub use controls::{Gesture, GestureRecognizer, MotionSettings, OrbitMotion};

use pointfield_gpu::{GpuError, RendererError, wgpu};

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    CreateWindow(#[from] winit::error::OsError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error("Create surface error: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` filter. Calling this more than once is harmless.
pub fn init_tracing() {
    #[cfg(feature = "tracy")]
    {
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        let _ = tracing_subscriber::registry()
            .with(tracing_tracy::TracyLayer::default())
            .with(
                tracing_subscriber::fmt::layer().with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "info".into()),
                ),
            )
            .try_init();
    }

    #[cfg(not(feature = "tracy"))]
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(false)
            .try_init();
    }
}
