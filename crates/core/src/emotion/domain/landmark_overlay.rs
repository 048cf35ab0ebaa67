use crate::shared::frame::Frame;

use super::landmark_set::LandmarkSet;

/// Domain interface for drawing detected landmarks onto the source frame.
///
/// Implementations modify the frame in-place.
pub trait LandmarkOverlay: Send {
    fn draw(
        &self,
        frame: &mut Frame,
        landmarks: &LandmarkSet,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
