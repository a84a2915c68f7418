//! Binary image files for AL1 programs.
//!
//! An image is the raw program bytes with no header, length prefix or
//! checksum. Images longer than memory are accepted here and truncated when
//! loaded into a CPU.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension used for assembled images.
pub const IMAGE_EXTENSION: &str = "bin";

/// Read an image file fully.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ImageError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write an image file verbatim.
pub fn save_image<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), ImageError> {
    let path = path.as_ref();
    std::fs::write(path, bytes).map_err(|source| ImageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read an assembly source file.
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<String, ImageError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// The image path for a source file: the same path with its extension
/// replaced by `.bin`, or `.bin` appended if it has none.
pub fn binary_path_for<P: AsRef<Path>>(source: P) -> PathBuf {
    source.as_ref().with_extension(IMAGE_EXTENSION)
}

/// Errors that can occur reading or writing program files.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot open {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("cannot write to {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },
}
