//! Mouth-geometry expression heuristic.
//!
//! A fixed decision tree over four mouth landmarks. Branches are evaluated in
//! order and the first match wins:
//!
//! 1. open mouth (aspect ratio above [`OPEN_MOUTH_RATIO`]): wide → Surprised,
//!    otherwise Happy
//! 2. both corners above the top lip → Happy
//! 3. both corners more than [`DROOP_MARGIN`] below the bottom lip → Sad
//! 4. Neutral
//!
//! Branch 2 uses a strict comparison with no margin while branch 3 requires
//! the margin.

use super::emotion_label::EmotionLabel;
use super::landmark_set::{KeyPoints, LandmarkSet};

/// Aspect ratio (open / width) above which the mouth counts as open.
pub const OPEN_MOUTH_RATIO: f64 = 0.3;

/// Absolute normalized mouth width above which an open mouth is Surprised.
pub const WIDE_MOUTH_WIDTH: f64 = 0.4;

/// How far below the bottom lip both corners must sit to count as Sad.
pub const DROOP_MARGIN: f64 = 0.02;

/// Guards the aspect ratio against a zero-width mouth.
const EPSILON: f64 = 1e-6;

/// Derived mouth measurements in normalized units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthGeometry {
    pub open: f64,
    pub width: f64,
    pub aspect_ratio: f64,
}

impl MouthGeometry {
    pub fn from_key_points(kp: &KeyPoints) -> Self {
        let open = kp.mouth_bottom.y - kp.mouth_top.y;
        let width = kp.mouth_right.x - kp.mouth_left.x;
        Self {
            open,
            width,
            aspect_ratio: open / (width + EPSILON),
        }
    }
}

pub fn classify(landmarks: &LandmarkSet) -> EmotionLabel {
    classify_key_points(&landmarks.key_points())
}

pub fn classify_key_points(kp: &KeyPoints) -> EmotionLabel {
    let mouth = MouthGeometry::from_key_points(kp);
    let corners = [kp.mouth_left.y, kp.mouth_right.y];

    if mouth.aspect_ratio > OPEN_MOUTH_RATIO {
        if mouth.width > WIDE_MOUTH_WIDTH {
            EmotionLabel::Surprised
        } else {
            EmotionLabel::Happy
        }
    } else if corners.iter().all(|&y| y < kp.mouth_top.y) {
        EmotionLabel::Happy
    } else if corners
        .iter()
        .all(|&y| y > kp.mouth_bottom.y + DROOP_MARGIN)
    {
        EmotionLabel::Sad
    } else {
        EmotionLabel::Neutral
    }
}
