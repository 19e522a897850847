//! # pageprep-core
//!
//! Library behind the `pageprep` tools: it pairs per-page annotation JSON
//! files with their page images, rewrites both into a numbered layout a page
//! viewer can serve directly, and renders bounding-box overlays for checking
//! annotations by eye.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pageprep_core::reformat::{self, ReformatConfig};
//!
//! fn main() -> pageprep_core::Result<()> {
//!     let config = ReformatConfig {
//!         annotations_dir: "data-to-reformat/output_json".into(),
//!         images_dir: "data-to-reformat/page_images".into(),
//!         output_images_dir: "public/pages/images".into(),
//!         output_annotations_dir: "public/pages/annotations".into(),
//!         index_path: "public/pages/pageList.json".into(),
//!     };
//!
//!     let summary = reformat::run(&config)?;
//!     println!("reformatted {} pages", summary.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## What a run does
//!
//! - Scans the annotations directory for `<anything>_<page>.json` files and
//!   pairs each with the matching `.png` in the images directory.
//! - Validates every filename and rejects page-number collisions before any
//!   output directory is cleared.
//! - Per page, in ascending numeric order: drops the legacy `page_image`
//!   field, stamps in the real image dimensions, copies the image to
//!   `{page}.png`, and writes pretty-printed `{page}.json`.
//! - Writes a page index mapping every page number to an empty,
//!   fill-in-later title.
//!
//! All failures are fatal; see [`PageprepError`] for the taxonomy.

pub mod discover;
pub mod document;
pub mod error;
pub mod overlay;
pub mod probe;
pub mod reformat;

pub use discover::{discover_pages, PageEntry};
pub use document::{Annotation, PageDocument, PageIndex};
pub use error::{PageprepError, Result};
pub use overlay::{draw_annotations, OverlayOptions};
pub use reformat::{ReformatConfig, ReformatSummary};
