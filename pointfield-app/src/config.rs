//! Viewer configuration: built-in defaults, an optional JSON file, and
//! command-line overrides applied in that order.

use crate::errors::AppError;
use glam::Vec3;
use pointfield_data::MAX_POINTS_PER_FRAME;
use pointfield_gpu::{ParticleSettings, Placement};
use pointfield_window::{CameraSettings, MotionSettings, WindowConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// XYZ file to seed from. The bundled model is used when unset.
    pub model: Option<PathBuf>,
    /// Frame to seed from. Defaults to the first frame with points.
    pub frame: Option<usize>,
    pub particles: usize,
    pub softening: f32,
    /// Integration step while running.
    pub delta: f32,
    pub running: bool,
    /// Sprite diameter in pixels.
    pub point_size: f32,
    pub placement_scale: f32,
    pub placement_offset: [f32; 3],
    pub fov_degrees: f32,
    pub camera_distance: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let particles = ParticleSettings::default();
        let placement = Placement::default();
        let camera = CameraSettings::default();
        Self {
            model: None,
            frame: None,
            particles: particles.particle_count,
            softening: particles.softening,
            delta: particles.active_delta,
            running: particles.start_running,
            point_size: particles.point_size,
            placement_scale: placement.scale,
            placement_offset: placement.offset.to_array(),
            fov_degrees: camera.fov_degrees,
            camera_distance: camera.distance,
            width: 1280,
            height: 720,
        }
    }
}

/// Values supplied on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<PathBuf>,
    pub frame: Option<usize>,
    pub particles: Option<usize>,
    pub softening: Option<f32>,
    pub delta: Option<f32>,
    pub point_size: Option<f32>,
    pub running: bool,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(model) = overrides.model {
            self.model = Some(model);
        }
        if let Some(frame) = overrides.frame {
            self.frame = Some(frame);
        }
        if let Some(particles) = overrides.particles {
            self.particles = particles;
        }
        if let Some(softening) = overrides.softening {
            self.softening = softening;
        }
        if let Some(delta) = overrides.delta {
            self.delta = delta;
        }
        if let Some(point_size) = overrides.point_size {
            self.point_size = point_size;
        }
        if overrides.running {
            self.running = true;
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |msg: String| Err(AppError::InvalidConfig(msg));
        if self.particles == 0 || self.particles > MAX_POINTS_PER_FRAME {
            return invalid(format!(
                "particles must be in 1..={MAX_POINTS_PER_FRAME}, got {}",
                self.particles
            ));
        }
        if !self.softening.is_finite() || self.softening < 0.0 {
            return invalid(format!("softening must be >= 0, got {}", self.softening));
        }
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return invalid(format!("delta must be > 0, got {}", self.delta));
        }
        if !self.point_size.is_finite() || self.point_size <= 0.0 {
            return invalid(format!("point_size must be > 0, got {}", self.point_size));
        }
        if !self.placement_scale.is_finite() || self.placement_scale == 0.0 {
            return invalid("placement_scale must be non-zero".to_string());
        }
        if !(1.0..180.0).contains(&self.fov_degrees) {
            return invalid(format!(
                "fov_degrees must be in [1, 180), got {}",
                self.fov_degrees
            ));
        }
        if !self.camera_distance.is_finite() || self.camera_distance <= 0.0 {
            return invalid(format!(
                "camera_distance must be > 0, got {}",
                self.camera_distance
            ));
        }
        if self.width == 0 || self.height == 0 {
            return invalid("window size must be non-zero".to_string());
        }
        Ok(())
    }

    pub fn particle_settings(&self) -> ParticleSettings {
        ParticleSettings {
            particle_count: self.particles,
            softening: self.softening,
            active_delta: self.delta,
            start_running: self.running,
            point_size: self.point_size,
            placement: Placement {
                scale: self.placement_scale,
                offset: Vec3::from_array(self.placement_offset),
            },
        }
    }

    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            title: "pointfield".to_string(),
            width: self.width,
            height: self.height,
            camera: CameraSettings {
                fov_degrees: self.fov_degrees,
                distance: self.camera_distance,
                ..CameraSettings::default()
            },
            motion: MotionSettings::default(),
        }
    }
}
