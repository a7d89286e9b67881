use pointfield_data::XyzError;
use pointfield_window::WindowError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Xyz(#[from] XyzError),
    #[error("Model contains no points")]
    EmptyModel,
    #[error("Frame {frame} out of range (model has {frames} frames)")]
    FrameOutOfRange { frame: usize, frames: usize },
    #[error("Frame {0} contains no points")]
    EmptyFrame(usize),
    #[error(transparent)]
    Window(#[from] WindowError),
}
