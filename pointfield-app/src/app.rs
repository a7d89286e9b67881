//! Model loading and viewer startup.

use crate::config::ViewerConfig;
use crate::errors::AppError;
use pointfield_data::{XyzAnimation, XyzFrame};
use pointfield_gpu::{ParticleDelegate, ParticleInitData};
use std::path::Path;
use tracing::info;

/// Point cloud used when no model is given.
pub const BUNDLED_MODEL: &str = include_str!("../assets/model.xyz");

pub fn load_model(path: Option<&Path>) -> Result<XyzAnimation, AppError> {
    let animation = match path {
        Some(path) => XyzAnimation::load(path)?,
        None => {
            info!("Using bundled model");
            XyzAnimation::parse(BUNDLED_MODEL)
        }
    };
    if animation.first_populated_frame().is_none() {
        return Err(AppError::EmptyModel);
    }
    Ok(animation)
}

/// The requested frame, or the first frame that has points.
pub fn select_frame(
    animation: &XyzAnimation,
    requested: Option<usize>,
) -> Result<(usize, &XyzFrame), AppError> {
    match requested {
        Some(index) => {
            let frame = animation
                .frame(index)
                .ok_or(AppError::FrameOutOfRange {
                    frame: index,
                    frames: animation.len(),
                })?;
            if frame.is_empty() {
                return Err(AppError::EmptyFrame(index));
            }
            Ok((index, frame))
        }
        None => animation.first_populated_frame().ok_or(AppError::EmptyModel),
    }
}

pub fn run(config: ViewerConfig) -> Result<(), AppError> {
    config.validate()?;

    let animation = load_model(config.model.as_deref())?;
    let (index, frame) = select_frame(&animation, config.frame)?;
    if let Some((min, max)) = frame.bounds() {
        info!(
            "Seeding from frame {index}/{}: {} points, bounds {min} .. {max}",
            animation.len(),
            frame.len()
        );
    }

    let init_data = ParticleInitData::from_frame(frame, config.particle_settings());
    pointfield_window::run_with_delegate::<ParticleDelegate>(config.window_config(), init_data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_model_fills_one_frame() {
        let animation = load_model(None).expect("bundled model");
        let (index, frame) = select_frame(&animation, None).expect("frame");
        assert_eq!(index, 1);
        assert_eq!(frame.len(), 4096);
    }

    #[test]
    fn test_select_frame_errors() {
        let animation = XyzAnimation::parse("XYZ\n1,2,3\nXYZ\n");

        assert!(matches!(
            select_frame(&animation, Some(5)),
            Err(AppError::FrameOutOfRange { frame: 5, frames: 3 })
        ));
        assert!(matches!(
            select_frame(&animation, Some(0)),
            Err(AppError::EmptyFrame(0))
        ));
        let (index, frame) = select_frame(&animation, Some(1)).expect("frame 1");
        assert_eq!((index, frame.len()), (1, 1));
    }

    #[test]
    fn test_missing_model_file() {
        let err = load_model(Some(Path::new("/nonexistent/model.xyz"))).unwrap_err();
        assert!(matches!(err, AppError::Xyz(_)));
    }
}
