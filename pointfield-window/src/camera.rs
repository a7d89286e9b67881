use pointfield_data::{Matrix4, degrees_to_radians};

/// Projection parameters and orbit distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the camera to the orbit center.
    pub distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            near: 0.01,
            far: 500.0,
            distance: 2.0,
        }
    }
}

/// Accumulating camera matrix.
///
/// `reset` loads the projection; each `translate`/`rotate` then appends a
/// model-view step, so the result is `projection * T * R...` in call order.
pub struct Camera {
    settings: CameraSettings,
    projection: Matrix4,
    matrix: Matrix4,
}

impl Camera {
    pub fn new(settings: CameraSettings, aspect: f32) -> Self {
        let projection = Self::projection(&settings, aspect);
        Self {
            settings,
            projection,
            matrix: projection,
        }
    }

    fn projection(settings: &CameraSettings, aspect: f32) -> Matrix4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Matrix4::perspective(
            degrees_to_radians(settings.fov_degrees),
            aspect,
            settings.near,
            settings.far,
        )
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Rebuild the projection for a new drawable aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.projection = Self::projection(&self.settings, aspect);
    }

    pub fn reset(&mut self) {
        self.matrix = self.projection;
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.matrix = self.matrix * Matrix4::translation(x, y, z);
    }

    /// Rotate about the x, y and z axes in that order, skipping `None`.
    pub fn rotate(&mut self, x: Option<f32>, y: Option<f32>, z: Option<f32>) {
        if let Some(angle) = x {
            self.matrix = self.matrix * Matrix4::rotation(angle, 1.0, 0.0, 0.0);
        }
        if let Some(angle) = y {
            self.matrix = self.matrix * Matrix4::rotation(angle, 0.0, 1.0, 0.0);
        }
        if let Some(angle) = z {
            self.matrix = self.matrix * Matrix4::rotation(angle, 0.0, 0.0, 1.0);
        }
    }

    /// Rebuild the matrix for an orbit at `settings.distance`.
    pub fn orbit(&mut self, pitch: f32, yaw: f32) {
        self.reset();
        self.translate(0.0, 0.0, -self.settings.distance);
        self.rotate(Some(pitch), Some(yaw), None);
    }

    pub fn matrix(&self) -> Matrix4 {
        self.matrix
    }
}
