use crate::shared::frame::Frame;

use super::landmark_set::LandmarkSet;

/// Domain interface for facial landmark extraction.
///
/// Returns `Ok(None)` when no face is found. Implementations typically own
/// model sessions, hence `&mut self`.
pub trait LandmarkProvider: Send {
    fn extract_landmarks(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>>;
}
