use std::path::Path;

use crate::imaging::domain::image_io_error::ImageIoError;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Writes a frame to an image file using the `image` crate.
///
/// The output format follows the path's extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), ImageIoError> {
        // Ensure parent directory exists (infrastructure concern)
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ImageIoError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let img = frame
            .to_rgb_image()
            .ok_or(ImageIoError::UnsupportedFrame {
                channels: frame.channels(),
            })?;

        img.save(path).map_err(|source| ImageIoError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}
