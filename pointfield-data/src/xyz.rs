//! XYZ point cloud animation parsing.
//!
//! The format is plain text: frames are separated by the literal `XYZ`, and
//! every line inside a frame holds one `x,y,z` point. Lines that do not parse
//! are skipped. Coordinates are truncated to two decimal places.

use glam::Vec3;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Upper bound on points read per frame; the rest of the frame is ignored.
pub const MAX_POINTS_PER_FRAME: usize = 4096;

const FRAME_DELIMITER: &str = "XYZ";
const POINT_DELIMITER: char = ',';

#[derive(Debug, thiserror::Error)]
pub enum XyzError {
    #[error("Failed to read XYZ file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XyzPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl XyzPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// One frame of the animation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyzFrame {
    points: Vec<XyzPoint>,
}

impl XyzFrame {
    pub fn points(&self) -> &[XyzPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds of the frame, `None` when it holds no points.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.points.iter().map(|p| p.to_vec3());
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    fn parse(segment: &str) -> Self {
        let mut points = Vec::new();
        for line in segment.trim_matches(['\n', '\r']).lines() {
            if let Some(point) = parse_point(line) {
                points.push(point);
            }
            if points.len() >= MAX_POINTS_PER_FRAME {
                break;
            }
        }
        Self { points }
    }
}

/// A parsed animation: every `XYZ`-delimited segment of the input is a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyzAnimation {
    frames: Vec<XyzFrame>,
}

impl XyzAnimation {
    /// Parse animation text. Never fails; malformed lines are dropped.
    pub fn parse(content: &str) -> Self {
        let frames = content.split(FRAME_DELIMITER).map(XyzFrame::parse).collect();
        Self { frames }
    }

    /// Read and parse an XYZ file, logging how long parsing took.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, XyzError> {
        let path = path.as_ref();
        let began = Instant::now();
        let content = fs::read_to_string(path).map_err(|source| XyzError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let animation = Self::parse(&content);
        info!(
            "XYZ parsing: {}s ({} frames)",
            truncate_hundredths(began.elapsed().as_secs_f32()),
            animation.len()
        );
        Ok(animation)
    }

    pub fn frames(&self) -> &[XyzFrame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&XyzFrame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index and frame of the first frame holding at least one point.
    ///
    /// Files that begin with the delimiter produce an empty frame 0.
    pub fn first_populated_frame(&self) -> Option<(usize, &XyzFrame)> {
        self.frames.iter().enumerate().find(|(_, f)| !f.is_empty())
    }

    pub fn point(&self, frame_index: usize, point_index: usize) -> Option<XyzPoint> {
        self.frame(frame_index)?.points.get(point_index).copied()
    }

    pub fn x(&self, frame_index: usize, point_index: usize) -> Option<f32> {
        self.point(frame_index, point_index).map(|p| p.x)
    }

    pub fn y(&self, frame_index: usize, point_index: usize) -> Option<f32> {
        self.point(frame_index, point_index).map(|p| p.y)
    }

    pub fn z(&self, frame_index: usize, point_index: usize) -> Option<f32> {
        self.point(frame_index, point_index).map(|p| p.z)
    }
}

fn parse_point(line: &str) -> Option<XyzPoint> {
    let mut values = line.split(POINT_DELIMITER).map(parse_value);
    let x = values.next()??;
    let y = values.next()??;
    let z = values.next()??;
    Some(XyzPoint::new(x, y, z))
}

fn parse_value(raw: &str) -> Option<f32> {
    let value: f32 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        debug!("Skipping non-finite XYZ value {raw:?}");
        return None;
    }
    Some(truncate_hundredths(value))
}

/// Magnitude from which every `f32` is a whole number.
const NO_FRACTION: f32 = 8_388_608.0;

/// Truncate toward zero to two decimal places. Values at or above
/// [`NO_FRACTION`] have no fractional part and pass through unchanged, so
/// scaling cannot overflow to infinity.
fn truncate_hundredths(value: f32) -> f32 {
    if value.abs() >= NO_FRACTION {
        return value;
    }
    (value * 100.0).trunc() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_frame() {
        let animation = XyzAnimation::parse("1.0,2.0,3.0\n4.5,-5.5,6.25\n");
        assert_eq!(animation.len(), 1);
        let frame = animation.frame(0).expect("frame");
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.points()[1], XyzPoint::new(4.5, -5.5, 6.25));
    }

    #[test]
    fn test_values_truncate_toward_zero() {
        let animation = XyzAnimation::parse("1.239,-1.239,0.999");
        let point = animation.point(0, 0).expect("point");
        assert!((point.x - 1.23).abs() < 1e-6);
        assert!((point.y + 1.23).abs() < 1e-6);
        assert!((point.z - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_frames_split_on_delimiter() {
        let animation = XyzAnimation::parse("XYZ\n1,1,1\n2,2,2\nXYZ\n3,3,3\n");
        assert_eq!(animation.len(), 3);
        assert!(animation.frame(0).expect("leading frame").is_empty());
        assert_eq!(animation.frame(1).expect("frame").len(), 2);
        assert_eq!(animation.frame(2).expect("frame").len(), 1);

        let (index, frame) = animation.first_populated_frame().expect("populated");
        assert_eq!(index, 1);
        assert_eq!(frame.points()[0], XyzPoint::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let content = "header line\n1,2\n1,2,abc\n\n 7.5 , 8 , 9 \n1,2,3,4\nnan,1,1\n";
        let animation = XyzAnimation::parse(content);
        let frame = animation.frame(0).expect("frame");
        assert_eq!(
            frame.points(),
            &[XyzPoint::new(7.5, 8.0, 9.0), XyzPoint::new(1.0, 2.0, 3.0)]
        );
    }

    #[test]
    fn test_huge_values_stay_finite() {
        let animation = XyzAnimation::parse("3.0e38,1,2\n-3.4e38,1e7,0.5\n");
        let frame = animation.frame(0).expect("frame");
        assert_eq!(frame.len(), 2);
        for point in frame.points() {
            assert!(point.to_vec3().is_finite(), "non-finite coordinate in {point:?}");
        }
        assert_eq!(animation.x(0, 0), Some(3.0e38));
        assert_eq!(animation.x(0, 1), Some(-3.4e38));
        assert_eq!(animation.y(0, 1), Some(1e7));
    }

    #[test]
    fn test_crlf_lines() {
        let animation = XyzAnimation::parse("\r\n1,2,3\r\n4,5,6\r\n");
        assert_eq!(animation.frame(0).expect("frame").len(), 2);
        assert_eq!(animation.z(0, 1), Some(6.0));
    }

    #[test]
    fn test_points_capped_per_frame() {
        let mut content = String::new();
        for i in 0..(MAX_POINTS_PER_FRAME + 100) {
            content.push_str(&format!("{i},0,0\n"));
        }
        content.push_str("XYZ\n1,1,1\n");

        let animation = XyzAnimation::parse(&content);
        assert_eq!(animation.frame(0).expect("frame").len(), MAX_POINTS_PER_FRAME);
        assert_eq!(animation.x(0, MAX_POINTS_PER_FRAME - 1), Some(4095.0));
        // The cap only ends the current frame.
        assert_eq!(animation.frame(1).expect("frame").len(), 1);
    }

    #[test]
    fn test_accessors_out_of_range() {
        let animation = XyzAnimation::parse("1,2,3");
        assert_eq!(animation.x(0, 0), Some(1.0));
        assert_eq!(animation.y(0, 0), Some(2.0));
        assert_eq!(animation.z(0, 0), Some(3.0));
        assert_eq!(animation.point(0, 1), None);
        assert_eq!(animation.point(1, 0), None);
    }

    #[test]
    fn test_empty_input() {
        let animation = XyzAnimation::parse("");
        assert_eq!(animation.len(), 1);
        assert!(animation.first_populated_frame().is_none());
    }

    #[test]
    fn test_frame_bounds() {
        let animation = XyzAnimation::parse("0,5,-1\n2,-3,4\n");
        let (min, max) = animation.frame(0).expect("frame").bounds().expect("bounds");
        assert_eq!(min, Vec3::new(0.0, -3.0, -1.0));
        assert_eq!(max, Vec3::new(2.0, 5.0, 4.0));
        assert!(XyzFrame::default().bounds().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let path =
            std::env::temp_dir().join(format!("pointfield-load-{}.xyz", std::process::id()));
        std::fs::write(&path, "1,2,3\nXYZ\n4,5,6\n").expect("write fixture");

        let animation = XyzAnimation::load(&path).expect("load");
        std::fs::remove_file(&path).ok();

        assert_eq!(animation.len(), 2);
        assert_eq!(animation.point(1, 0), Some(XyzPoint::new(4.0, 5.0, 6.0)));
    }

    #[test]
    fn test_load_missing_file() {
        let result = XyzAnimation::load("/definitely/not/here.xyz");
        match result {
            Err(XyzError::Io { path, .. }) => assert!(path.ends_with("here.xyz")),
            Ok(_) => panic!("Expected Io error"),
        }
    }
}
