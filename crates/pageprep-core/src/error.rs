//! Error types for page dataset preparation.
//!
//! Every failure is fatal to the run that hit it; nothing in this crate
//! retries or recovers. Variants carry the offending path so a failed run
//! points straight at the input that caused it.

use std::path::PathBuf;

use thiserror::Error;

/// Error types that can occur while discovering, reformatting, or rendering
/// pages.
///
/// # Examples
///
/// ```rust,ignore
/// use pageprep_core::{PageprepError, Result};
///
/// fn report(result: Result<()>) {
///     match result {
///         Ok(()) => {}
///         Err(PageprepError::MalformedFilename { path, suffix }) => {
///             eprintln!("bad page filename {} (suffix '{}')", path.display(), suffix);
///         }
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum PageprepError {
    /// An annotation filename does not end in a usable page number.
    ///
    /// The page number is the text after the last `_` in the file stem
    /// (the whole stem when there is no `_`) and must parse as a
    /// non-negative integer.
    #[error("Malformed page filename: {} (suffix '{suffix}' is not a non-negative integer)", .path.display())]
    MalformedFilename {
        /// The annotation file with the unusable name.
        path: PathBuf,
        /// The trailing segment that failed to parse.
        suffix: String,
    },

    /// Two annotation files map to the same page number.
    ///
    /// Processing both would silently overwrite one page with the other,
    /// so the run stops before touching any output.
    #[error("Duplicate page number {page}: {} and {}", .first.display(), .second.display())]
    DuplicatePage {
        /// The contested page number.
        page: u32,
        /// The annotation file seen first.
        first: PathBuf,
        /// The annotation file that collided with it.
        second: PathBuf,
    },

    /// An annotation document is not valid JSON or does not match the
    /// expected shape.
    #[error("Annotation parse error in {}: {source}", .path.display())]
    AnnotationParse {
        /// The annotation file that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A page image is missing, unreadable, or not a decodable image.
    #[error("Image load error for {}: {source}", .path.display())]
    ImageLoad {
        /// The image path that failed.
        path: PathBuf,
        /// The underlying image error.
        source: image::ImageError,
    },

    /// Filesystem error while clearing, creating, copying, or writing.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// The path the operation was acting on.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PageprepError {
    /// Attach the path an IO operation was acting on to its error.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Type alias for [`Result<T, PageprepError>`].
pub type Result<T> = std::result::Result<T, PageprepError>;
