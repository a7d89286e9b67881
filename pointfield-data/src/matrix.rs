//! Minimal 4x4 matrix math for the camera.
//!
//! Matrices are stored as 16 floats in column-major order, the layout WGSL
//! expects for a `mat4x4<f32>` uniform, so a `Matrix4` can be uploaded as-is.

use std::ops::Mul;

use glam::Mat4;

/// Convert an angle in degrees to radians.
pub fn degrees_to_radians(value: f32) -> f32 {
    value * std::f32::consts::PI / 180.0
}

/// Column-major 4x4 matrix. Translation lives in elements 12, 13 and 14.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix4 {
    m: [f32; 16],
}

impl Matrix4 {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Build a matrix from 16 column-major elements.
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Right-handed perspective projection with depth mapped to `[0, 1]`.
    ///
    /// This is the clip-space convention of wgpu.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let mut matrix = Self::IDENTITY;
        matrix.m[0] = f / aspect;
        matrix.m[5] = f;
        matrix.m[10] = far / (near - far);
        matrix.m[11] = -1.0;
        matrix.m[14] = (far * near) / (near - far);
        matrix.m[15] = 0.0;
        matrix
    }

    /// Right-handed perspective projection with depth mapped to `[-1, 1]`.
    pub fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let mut matrix = Self::IDENTITY;
        matrix.m[0] = f / aspect;
        matrix.m[5] = f;
        matrix.m[10] = (far + near) / (near - far);
        matrix.m[11] = -1.0;
        matrix.m[14] = (2.0 * far * near) / (near - far);
        matrix.m[15] = 0.0;
        matrix
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut matrix = Self::IDENTITY;
        matrix.m[12] = x;
        matrix.m[13] = y;
        matrix.m[14] = z;
        matrix
    }

    /// Rotation of `angle` radians about the unit axis `(x, y, z)`.
    pub fn rotation(angle: f32, x: f32, y: f32, z: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        let ci = 1.0 - c;

        let xy = x * y * ci;
        let xz = x * z * ci;
        let yz = y * z * ci;
        let xs = x * s;
        let ys = y * s;
        let zs = z * s;

        let mut matrix = Self::IDENTITY;
        matrix.m[0] = x * x * ci + c;
        matrix.m[1] = xy + zs;
        matrix.m[2] = xz - ys;
        matrix.m[4] = xy - zs;
        matrix.m[5] = y * y * ci + c;
        matrix.m[6] = yz + xs;
        matrix.m[8] = xz + ys;
        matrix.m[9] = yz - xs;
        matrix.m[10] = z * z * ci + c;
        matrix
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    /// Columns as nested arrays, the shape used by uniform structs.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let m = &self.m;
        [
            [m[0], m[1], m[2], m[3]],
            [m[4], m[5], m[6], m[7]],
            [m[8], m[9], m[10], m[11]],
            [m[12], m[13], m[14], m[15]],
        ]
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    /// Standard product: the result applies `rhs` first, then `self`.
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let a = &self.m;
        let b = &rhs.m;
        let mut m = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                m[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        Matrix4 { m }
    }
}

impl From<Mat4> for Matrix4 {
    fn from(value: Mat4) -> Self {
        Self::from_cols_array(value.to_cols_array())
    }
}

impl From<Matrix4> for Mat4 {
    fn from(value: Matrix4) -> Self {
        Mat4::from_cols_array(&value.m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    fn assert_close(actual: Matrix4, expected: Mat4) {
        let expected = expected.to_cols_array();
        for (i, (a, e)) in actual.as_array().iter().zip(expected.iter()).enumerate() {
            assert!(
                (a - e).abs() < 1e-5,
                "element {i}: got {a}, expected {e}"
            );
        }
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = Matrix4::translation(1.0, 2.0, 3.0) * Matrix4::rotation(0.3, 0.0, 1.0, 0.0);
        assert_eq!(Matrix4::IDENTITY * m, m);
        assert_eq!(m * Matrix4::IDENTITY, m);
        assert_eq!(Matrix4::default(), Matrix4::IDENTITY);
    }

    #[test]
    fn test_perspective_matches_glam() {
        let fov = degrees_to_radians(55.0);
        assert_close(
            Matrix4::perspective(fov, 16.0 / 9.0, 0.01, 500.0),
            Mat4::perspective_rh(fov, 16.0 / 9.0, 0.01, 500.0),
        );
    }

    #[test]
    fn test_perspective_gl_matches_glam() {
        let fov = degrees_to_radians(55.0);
        assert_close(
            Matrix4::perspective_gl(fov, 0.75, 0.01, 500.0),
            Mat4::perspective_rh_gl(fov, 0.75, 0.01, 500.0),
        );
    }

    #[test]
    fn test_translation_moves_points() {
        let m: Mat4 = Matrix4::translation(1.0, -2.0, 3.5).into();
        let p = m * Vec4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(p, Vec4::new(1.5, -1.5, 4.0, 1.0));
    }

    #[test]
    fn test_rotation_matches_glam_for_every_axis() {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 2.0, -0.5).normalize()] {
            assert_close(
                Matrix4::rotation(0.7, axis.x, axis.y, axis.z),
                Mat4::from_axis_angle(axis, 0.7),
            );
        }
    }

    #[test]
    fn test_multiplication_matches_glam() {
        let a = Matrix4::perspective(1.0, 1.5, 0.1, 100.0);
        let b = Matrix4::translation(0.0, 0.0, -2.0);
        let c = Matrix4::rotation(-0.4, 1.0, 0.0, 0.0);
        let expected = Mat4::from(a) * Mat4::from(b) * Mat4::from(c);
        assert_close(a * b * c, expected);
    }

    #[test]
    fn test_cols_array_2d_layout() {
        let cols = Matrix4::translation(4.0, 5.0, 6.0).to_cols_array_2d();
        assert_eq!(cols[3], [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(cols, Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)).to_cols_array_2d());
    }

    #[test]
    fn test_degrees_to_radians() {
        assert!((degrees_to_radians(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(degrees_to_radians(0.0), 0.0);
    }
}
