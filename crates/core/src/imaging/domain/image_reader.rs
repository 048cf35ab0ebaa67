use std::path::Path;

use crate::shared::frame::Frame;

use super::image_io_error::ImageIoError;

/// Loads a still image into an RGB [`Frame`].
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, ImageIoError>;
}
