//! Page discovery: pair annotation files with their page images.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PageprepError, Result};

/// An annotation file and its page image, keyed by page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// Page number parsed from the annotation filename.
    pub number: u32,
    /// Source annotation JSON document.
    pub annotations_path: PathBuf,
    /// Expected page image: same stem as the annotation file, `.png`
    /// extension, in the images directory.
    pub image_path: PathBuf,
}

/// Scan `annotations_dir` for `<anything>_<page>.json` files and pair each
/// with `<same stem>.png` under `images_dir`.
///
/// Entries that do not end in `.json` are skipped. Every remaining filename
/// must carry a parseable page number; one that does not fails the whole scan
/// before any output is touched, as does the same page number appearing
/// twice. Entries come back sorted by page number, so downstream output order
/// never depends on directory enumeration order.
///
/// The image path is derived here but only checked once the page is actually
/// processed.
pub fn discover_pages(annotations_dir: &Path, images_dir: &Path) -> Result<Vec<PageEntry>> {
    let mut by_page: BTreeMap<u32, PageEntry> = BTreeMap::new();

    let entries =
        fs::read_dir(annotations_dir).map_err(|e| PageprepError::io(annotations_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PageprepError::io(annotations_dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let number = parse_page_number(&path, &stem)?;

        if let Some(existing) = by_page.get(&number) {
            return Err(PageprepError::DuplicatePage {
                page: number,
                first: existing.annotations_path.clone(),
                second: path,
            });
        }

        let image_path = images_dir.join(format!("{stem}.png"));
        by_page.insert(
            number,
            PageEntry {
                number,
                annotations_path: path,
                image_path,
            },
        );
    }

    Ok(by_page.into_values().collect())
}

/// Extract the page number from an annotation file stem.
///
/// The page number is the text after the last `_`, or the whole stem when
/// there is none.
fn parse_page_number(path: &Path, stem: &str) -> Result<u32> {
    let suffix = stem.rsplit('_').next().unwrap_or(stem);
    suffix.parse().map_err(|_| PageprepError::MalformedFilename {
        path: path.to_path_buf(),
        suffix: suffix.to_string(),
    })
}
