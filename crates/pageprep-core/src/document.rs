//! Serde models for page annotation documents and the page index.
//!
//! Annotation documents arrive from an upstream OCR step as loosely shaped
//! JSON. Only the fields this crate acts on are modeled; everything else is
//! carried through a flattened map so rewriting a document never strips data
//! it does not understand.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{PageprepError, Result};

/// A single annotated region on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Bounding box as `[x, y, width, height]` in image pixel units.
    ///
    /// Stored as raw JSON numbers so integer coordinates stay integers when
    /// the document is rewritten.
    pub bbox: [Number; 4],

    /// Any other fields (recognized text, labels, ...) pass through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page's annotation document.
///
/// Serialized field order is `annotations`, `width`, `height`, then any
/// passed-through extras; `page_image` is never written back out once the
/// document has been reformatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Legacy relative image reference from the upstream tooling.
    ///
    /// Dropped when the document is rewritten; the copied image's location is
    /// implied by the page number instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_image: Option<String>,

    /// Annotated regions for this page.
    #[serde(default)]
    pub annotations: Vec<Annotation>,

    /// Image width in pixels, resolved from the actual image file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Image height in pixels, resolved from the actual image file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Any other top-level fields pass through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageDocument {
    /// Read and parse an annotation document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PageprepError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| PageprepError::AnnotationParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize as pretty-printed JSON (two-space indent), the on-disk
    /// format.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Index of all reformatted pages, keyed by page number.
///
/// Serializes as a single JSON object whose keys are page numbers in
/// ascending numeric order and whose values are page titles. Titles start
/// empty and are meant to be filled in by hand afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageIndex(BTreeMap<u32, String>);

impl PageIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index with an empty title for every page number given.
    pub fn from_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self(pages.into_iter().map(|page| (page, String::new())).collect())
    }

    /// Number of pages in the index.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the index has no pages.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as pretty-printed JSON, the on-disk format.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
