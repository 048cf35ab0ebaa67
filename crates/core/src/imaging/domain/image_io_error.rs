use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageIoError {
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("frame with {channels} channels cannot be written as RGB")]
    UnsupportedFrame { channels: u8 },
}
