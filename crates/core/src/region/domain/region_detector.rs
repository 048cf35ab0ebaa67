use crate::shared::frame::Frame;

use super::region_candidate::RegionCandidate;
use super::region_label::RegionVerdict;

/// Outcome of one bright-region analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionDetection {
    pub detected: bool,
    pub largest: Option<RegionCandidate>,
    /// Binarization threshold applied to the blurred field.
    pub threshold: f64,
    /// Brightest value of the blurred field.
    pub max_value: f64,
}

impl RegionDetection {
    pub fn label(&self) -> RegionVerdict {
        if self.detected {
            RegionVerdict::AnomalyDetected
        } else {
            RegionVerdict::NoAnomaly
        }
    }
}

/// Domain interface for locating the dominant bright region in an image.
///
/// When a region qualifies, implementations draw their overlay onto `frame`
/// in place; otherwise the frame is left untouched.
pub trait RegionDetector: Send {
    fn detect(&self, frame: &mut Frame) -> Result<RegionDetection, Box<dyn std::error::Error>>;
}
