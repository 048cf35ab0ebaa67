//! Face mesh landmarks in normalized image coordinates.
//!
//! Indices follow the 468-point face mesh topology. Coordinates are relative
//! to image width/height, so `(0.0, 0.0)` is the top-left corner and y grows
//! downwards.

use thiserror::Error;

pub const MOUTH_TOP: usize = 13;
pub const MOUTH_BOTTOM: usize = 14;
pub const MOUTH_LEFT: usize = 61;
pub const MOUTH_RIGHT: usize = 291;
pub const LEFT_EYEBROW: usize = 105;
pub const RIGHT_EYEBROW: usize = 334;

/// Points every landmark set must contain.
const REQUIRED: [usize; 6] = [
    MOUTH_TOP,
    MOUTH_BOTTOM,
    MOUTH_LEFT,
    MOUTH_RIGHT,
    LEFT_EYEBROW,
    RIGHT_EYEBROW,
];

/// Number of points produced by the base face mesh model.
pub const FACE_MESH_POINTS: usize = 468;

#[derive(Error, Debug, PartialEq)]
pub enum LandmarkSetError {
    #[error("landmark set has {len} points but index {index} is required")]
    MissingPoint { index: usize, len: usize },
}

/// A 2D point in normalized image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The six named points the expression heuristic is defined over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPoints {
    pub mouth_top: Point2,
    pub mouth_bottom: Point2,
    pub mouth_left: Point2,
    pub mouth_right: Point2,
    pub left_eyebrow: Point2,
    pub right_eyebrow: Point2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point2>,
}

impl LandmarkSet {
    /// Rejects sets that do not reach every named index.
    pub fn new(points: Vec<Point2>) -> Result<Self, LandmarkSetError> {
        if let Some(&index) = REQUIRED.iter().find(|&&i| i >= points.len()) {
            return Err(LandmarkSetError::MissingPoint {
                index,
                len: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn key_points(&self) -> KeyPoints {
        KeyPoints {
            mouth_top: self.points[MOUTH_TOP],
            mouth_bottom: self.points[MOUTH_BOTTOM],
            mouth_left: self.points[MOUTH_LEFT],
            mouth_right: self.points[MOUTH_RIGHT],
            left_eyebrow: self.points[LEFT_EYEBROW],
            right_eyebrow: self.points[RIGHT_EYEBROW],
        }
    }

    /// Landmarks scaled to pixel coordinates of a `width` × `height` image.
    pub fn to_pixels(&self, width: u32, height: u32) -> Vec<(f32, f32)> {
        self.points
            .iter()
            .map(|p| ((p.x * width as f64) as f32, (p.y * height as f64) as f32))
            .collect()
    }
}
