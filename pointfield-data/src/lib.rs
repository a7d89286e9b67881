//! Pointfield Data Crate
//!
//! Point cloud parsing and the small matrix library used by the camera.
//! This crate is GPU-agnostic; GPU upload types live in pointfield-gpu.

pub mod matrix;
pub mod xyz;

pub use matrix::{Matrix4, degrees_to_radians};
pub use xyz::{MAX_POINTS_PER_FRAME, XyzAnimation, XyzError, XyzFrame, XyzPoint};
