use std::path::Path;

use crate::imaging::domain::image_io_error::ImageIoError;
use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Decodes image files with the `image` crate.
///
/// Any decodable raster format is accepted, whatever the file is named;
/// alpha and grayscale sources are converted to RGB. The source file is only ever opened for reading.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, ImageIoError> {
        let decode_error = |source| ImageIoError::Decode {
            path: path.to_path_buf(),
            source,
        };
        // The format comes from the file's leading bytes, not its extension.
        let decoded = image::ImageReader::open(path)
            .map_err(|e| decode_error(image::ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| decode_error(image::ImageError::IoError(e)))?
            .decode()
            .map_err(decode_error)?;
        log::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(Frame::from_rgb_image(decoded.to_rgb8()))
    }
}
