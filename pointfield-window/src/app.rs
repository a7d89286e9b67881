use crate::WindowError;
use crate::camera::{Camera, CameraSettings};
use crate::controls::{Gesture, GestureRecognizer, MotionSettings, OrbitMotion};
use pointfield_gpu::{
    RenderContext, RenderDelegate, Renderer, ResourceRegistry, SurfaceWrapper, ViewState, wgpu,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const CONTROLS_HINT: &str = "drag to orbit, tap or Space to start/stop, R to reset";

/// Window and camera parameters for [`run_with_delegate`].
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub camera: CameraSettings,
    pub motion: MotionSettings,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "pointfield".to_string(),
            width: 1280,
            height: 720,
            camera: CameraSettings::default(),
            motion: MotionSettings::default(),
        }
    }
}

/// Open a window and drive `D` until the window closes.
pub fn run_with_delegate<D: RenderDelegate + 'static>(
    config: WindowConfig,
    init_data: D::InitData,
) -> Result<(), WindowError>
where
    D::InitData: 'static,
{
    let event_loop = EventLoop::new()?;
    let mut app = App::<D>::new(config, init_data);
    let run_result = event_loop.run_app(&mut app);
    let app_result = app.finish();
    run_result?;
    app_result
}

struct App<D: RenderDelegate> {
    config: WindowConfig,
    init_data: Option<D::InitData>,
    state: Option<ViewerState<D>>,
    error: Option<WindowError>,
}

impl<D: RenderDelegate> App<D> {
    fn new(config: WindowConfig, init_data: D::InitData) -> Self {
        Self {
            config,
            init_data: Some(init_data),
            state: None,
            error: None,
        }
    }

    fn finish(self) -> Result<(), WindowError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<D: RenderDelegate + 'static> ApplicationHandler for App<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.error.is_some() {
            return;
        }
        let Some(init_data) = self.init_data.take() else {
            return;
        };

        match ViewerState::<D>::new(event_loop, &self.config, init_data) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                error!("Failed to initialize viewer: {err}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.window.id() != window_id {
            return;
        }

        if let Err(err) = state.handle_input(event_loop, &event) {
            error!("Input handling failed: {err}");
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::RedrawRequested => {
                let _frame_span = tracing::info_span!("frame").entered();
                match state.render(Instant::now()) {
                    Ok(()) => {}
                    Err(WindowError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => {
                        warn!("Surface lost or outdated, reconfiguring");
                        state.surface.reconfigure(state.renderer.device());
                    }
                    Err(WindowError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        error!("GPU Out of Memory - exiting");
                        event_loop.exit();
                    }
                    Err(err) => error!("Render error: {err}"),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }
}

struct ViewerState<D: RenderDelegate> {
    window: Arc<Window>,
    title: String,
    renderer: Renderer,
    surface: SurfaceWrapper,
    registry: ResourceRegistry,
    delegate: D,
    camera: Camera,
    motion: OrbitMotion,
    gestures: GestureRecognizer,
    last_frame: Instant,
}

impl<D: RenderDelegate> ViewerState<D> {
    fn new(
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
        init_data: D::InitData,
    ) -> Result<Self, WindowError> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let renderer = pollster::block_on(Renderer::new())?;
        let size = window.inner_size();

        let surface = renderer.instance().create_surface(window.clone())?;
        let surface = renderer.create_surface(surface, size.width, size.height)?;

        let mut registry = ResourceRegistry::new();
        let delegate = D::create(&renderer, &mut registry, surface.format(), init_data)?;

        let camera = Camera::new(config.camera, surface.aspect());
        info!(
            "Viewer ready: {}x{}, fov {} deg, distance {}",
            surface.width(),
            surface.height(),
            config.camera.fov_degrees,
            config.camera.distance
        );

        let state = Self {
            window,
            title: config.title.clone(),
            renderer,
            surface,
            registry,
            delegate,
            camera,
            motion: OrbitMotion::new(config.motion),
            gestures: GestureRecognizer::new(),
            last_frame: Instant::now(),
        };
        state.refresh_title();
        Ok(state)
    }

    fn refresh_title(&self) {
        let title = match self.delegate.status() {
            Some(status) => format!("{} | {status} | {CONTROLS_HINT}", self.title),
            None => format!("{} | {CONTROLS_HINT}", self.title),
        };
        self.window.set_title(&title);
    }

    fn toggle_simulation(&mut self) {
        self.delegate.toggle_simulation();
        self.refresh_title();
    }

    fn handle_input(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: &WindowEvent,
    ) -> Result<(), WindowError> {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(code),
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Space => self.toggle_simulation(),
                KeyCode::KeyR => {
                    self.delegate
                        .reset_simulation(self.renderer.queue(), &self.registry)?;
                    self.refresh_title();
                }
                _ => {}
            }
            return Ok(());
        }

        match self.gestures.handle_event(event, Instant::now()) {
            Some(Gesture::Tap) => {
                debug!("Tap");
                self.toggle_simulation();
            }
            Some(Gesture::Pan { velocity }) => self.motion.apply_pan(velocity),
            None => {}
        }
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.surface
            .resize(self.renderer.device(), new_size.width, new_size.height);
        self.camera.set_aspect(self.surface.aspect());
    }

    fn render(&mut self, now: Instant) -> Result<(), WindowError> {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.motion.update(dt);
        self.camera.orbit(self.motion.pitch(), self.motion.yaw());
        let view = ViewState::new(
            self.camera.matrix(),
            self.surface.width(),
            self.surface.height(),
        );

        self.delegate
            .update(self.renderer.queue(), &self.registry, &view)?;

        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.renderer
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        let ctx = RenderContext {
            color_view: &surface_view,
        };
        self.delegate.render(&mut encoder, ctx, &self.registry)?;

        self.renderer.queue().submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
