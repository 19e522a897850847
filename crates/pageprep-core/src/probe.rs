//! Image dimension probing.

use std::path::Path;

use crate::error::{PageprepError, Result};

/// Read the pixel dimensions of an image without decoding the pixel data.
///
/// Only the header is inspected, so this stays cheap even for large page
/// scans. The reported dimensions are the single source of truth for the
/// `width`/`height` fields written into reformatted annotation documents.
pub fn dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).map_err(|source| PageprepError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}
