// error.rs
use image::ImageError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input missing, unreadable, or not an image the decoders recognize.
    #[error("cannot decode {}: {source}", .path.display())]
    Decode { path: PathBuf, source: ImageError },

    /// Encoder rejected the image or the output file could not be written.
    #[error("cannot encode {}: {source}", .path.display())]
    Encode { path: PathBuf, source: ImageError },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
