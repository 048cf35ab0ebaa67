use std::path::Path;

use crate::shared::frame::Frame;

use super::image_io_error::ImageIoError;

/// Writes a single frame to an image file.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), ImageIoError>;
}
