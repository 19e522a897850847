//! The reformat pipeline: re-key pages by number, rewrite annotation
//! documents, copy page images, and emit the page index.
//!
//! A run is synchronous, single-threaded, and fail-fast: the first error
//! aborts with nothing retried. Output directories are recreated from scratch
//! each run, so the result never mixes pages from different inputs.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::discover::{discover_pages, PageEntry};
use crate::document::{PageDocument, PageIndex};
use crate::error::{PageprepError, Result};
use crate::probe;

/// Where a reformat run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReformatConfig {
    /// Directory of `<anything>_<page>.json` annotation documents.
    pub annotations_dir: PathBuf,
    /// Directory of page images matching the annotation file stems.
    pub images_dir: PathBuf,
    /// Output directory for `{page}.png` images, recreated each run.
    pub output_images_dir: PathBuf,
    /// Output directory for `{page}.json` documents, recreated each run.
    pub output_annotations_dir: PathBuf,
    /// Output path for the page index document.
    pub index_path: PathBuf,
}

/// What a completed run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReformatSummary {
    /// Number of pages written.
    pub pages: usize,
}

/// Reset an output location to an empty directory.
///
/// An existing directory is removed recursively; a file squatting on the path
/// is removed too. Missing parents are created.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(dir).map_err(|e| PageprepError::io(dir, e))?;
        }
        Ok(_) => {
            fs::remove_file(dir).map_err(|e| PageprepError::io(dir, e))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(PageprepError::io(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| PageprepError::io(dir, e))
}

/// Rewrite one page: parse its annotations, resolve the real image
/// dimensions, copy the image to `{page}.png`, and write `{page}.json`.
///
/// The image is copied byte-for-byte with no re-encoding; a source that is
/// not actually a PNG keeps its original bytes under the `.png` name, as the
/// historical layout this feeds always did.
pub fn transform_page(entry: &PageEntry, config: &ReformatConfig) -> Result<()> {
    let mut doc = PageDocument::from_path(&entry.annotations_path)?;
    doc.page_image = None;

    let (width, height) = probe::dimensions(&entry.image_path)?;
    doc.width = Some(width);
    doc.height = Some(height);

    let image_out = config
        .output_images_dir
        .join(format!("{}.png", entry.number));
    fs::copy(&entry.image_path, &image_out).map_err(|e| PageprepError::io(&image_out, e))?;

    let json_out = config
        .output_annotations_dir
        .join(format!("{}.json", entry.number));
    fs::write(&json_out, doc.to_pretty_json()?).map_err(|e| PageprepError::io(&json_out, e))?;

    debug!(
        "page {}: {}x{} -> {}",
        entry.number,
        width,
        height,
        json_out.display()
    );
    Ok(())
}

/// Write the page index, creating its parent directory if missing.
pub fn write_index(index: &PageIndex, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PageprepError::io(parent, e))?;
        }
    }
    fs::write(path, index.to_pretty_json()?).map_err(|e| PageprepError::io(path, e))
}

/// Run the whole pipeline over `config`.
///
/// Discovery, including validation of every filename, happens before the
/// output directories are cleared, so a malformed input directory never
/// destroys the previous run's output. Once clearing has begun there is no
/// rollback: a failure partway through leaves whatever was already written.
pub fn run(config: &ReformatConfig) -> Result<ReformatSummary> {
    let entries = discover_pages(&config.annotations_dir, &config.images_dir)?;

    prepare_output_dir(&config.output_images_dir)?;
    prepare_output_dir(&config.output_annotations_dir)?;

    for entry in &entries {
        info!("processing page {}", entry.number);
        transform_page(entry, config)?;
    }

    let index = PageIndex::from_pages(entries.iter().map(|entry| entry.number));
    write_index(&index, &config.index_path)?;
    info!(
        "wrote index for {} pages to {}",
        entries.len(),
        config.index_path.display()
    );

    Ok(ReformatSummary {
        pages: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A config rooted in `dir` with the input/output layout the tests use.
    fn config_in(dir: &Path) -> ReformatConfig {
        ReformatConfig {
            annotations_dir: dir.join("ann"),
            images_dir: dir.join("imgs"),
            output_images_dir: dir.join("out/images"),
            output_annotations_dir: dir.join("out/annotations"),
            index_path: dir.join("out/pageList.json"),
        }
    }

    fn write_page(config: &ReformatConfig, stem: &str, json: &str, width: u32, height: u32) {
        fs::create_dir_all(&config.annotations_dir).unwrap();
        fs::create_dir_all(&config.images_dir).unwrap();
        fs::write(config.annotations_dir.join(format!("{stem}.json")), json).unwrap();
        image::RgbaImage::new(width, height)
            .save(config.images_dir.join(format!("{stem}.png")))
            .unwrap();
    }

    #[test]
    fn test_end_to_end_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_page(
            &config,
            "booklet_scan_12",
            r#"{
  "page_image": "images/booklet_scan_12.png",
  "annotations": [
    {
      "bbox": [10, 20, 30, 40],
      "text": "Hi"
    }
  ]
}"#,
            200,
            300,
        );

        let summary = run(&config).unwrap();
        assert_eq!(summary.pages, 1);

        let written = fs::read_to_string(config.output_annotations_dir.join("12.json")).unwrap();
        let expected = r#"{
  "annotations": [
    {
      "bbox": [
        10,
        20,
        30,
        40
      ],
      "text": "Hi"
    }
  ],
  "width": 200,
  "height": 300
}"#;
        assert_eq!(written, expected);

        // Image copied byte-for-byte under the page-number name
        let source = fs::read(config.images_dir.join("booklet_scan_12.png")).unwrap();
        let copied = fs::read(config.output_images_dir.join("12.png")).unwrap();
        assert_eq!(source, copied);

        let index = fs::read_to_string(&config.index_path).unwrap();
        assert_eq!(index, "{\n  \"12\": \"\"\n}");
    }

    #[test]
    fn test_pages_processed_in_ascending_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_page(&config, "p_10", r#"{"annotations": []}"#, 10, 10);
        write_page(&config, "p_2", r#"{"annotations": []}"#, 10, 10);

        run(&config).unwrap();

        let index = fs::read_to_string(&config.index_path).unwrap();
        let pos_2 = index.find("\"2\"").unwrap();
        let pos_10 = index.find("\"10\"").unwrap();
        assert!(pos_2 < pos_10, "index keys must be in numeric order: {index}");

        assert!(config.output_annotations_dir.join("2.json").exists());
        assert!(config.output_annotations_dir.join("10.json").exists());
        assert!(config.output_images_dir.join("2.png").exists());
        assert!(config.output_images_dir.join("10.png").exists());
    }

    #[test]
    fn test_dimensions_overwrite_input_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_page(
            &config,
            "p_1",
            r#"{"annotations": [], "width": 1, "height": 1}"#,
            64,
            48,
        );

        run(&config).unwrap();

        let written = fs::read_to_string(config.output_annotations_dir.join("1.json")).unwrap();
        assert!(written.contains("\"width\": 64"));
        assert!(written.contains("\"height\": 48"));
    }

    #[test]
    fn test_two_runs_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_page(
            &config,
            "p_5",
            r#"{"page_image": "x.png", "annotations": [{"bbox": [1, 2, 3, 4], "text": "a"}]}"#,
            32,
            32,
        );

        run(&config).unwrap();
        let first_json = fs::read_to_string(config.output_annotations_dir.join("5.json")).unwrap();
        let first_png = fs::read(config.output_images_dir.join("5.png")).unwrap();
        let first_index = fs::read_to_string(&config.index_path).unwrap();

        run(&config).unwrap();
        let second_json = fs::read_to_string(config.output_annotations_dir.join("5.json")).unwrap();
        let second_png = fs::read(config.output_images_dir.join("5.png")).unwrap();
        let second_index = fs::read_to_string(&config.index_path).unwrap();

        assert_eq!(first_json, second_json);
        assert_eq!(first_png, second_png);
        assert_eq!(first_index, second_index);
    }

    #[test]
    fn test_stale_outputs_are_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_page(&config, "p_1", r#"{"annotations": []}"#, 16, 16);

        // Leftovers from an imaginary earlier run over different input
        fs::create_dir_all(&config.output_annotations_dir).unwrap();
        fs::create_dir_all(&config.output_images_dir).unwrap();
        fs::write(config.output_annotations_dir.join("99.json"), "{}").unwrap();
        fs::write(config.output_images_dir.join("99.png"), "junk").unwrap();

        run(&config).unwrap();

        assert!(!config.output_annotations_dir.join("99.json").exists());
        assert!(!config.output_images_dir.join("99.png").exists());
        assert!(config.output_annotations_dir.join("1.json").exists());
    }

    #[test]
    fn test_malformed_filename_leaves_outputs_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_page(&config, "p_1", r#"{"annotations": []}"#, 16, 16);
        fs::write(config.annotations_dir.join("scan_final.json"), "{}").unwrap();

        // Output from an earlier good run that must survive the failed one
        fs::create_dir_all(&config.output_annotations_dir).unwrap();
        let sentinel = config.output_annotations_dir.join("sentinel.json");
        fs::write(&sentinel, "{}").unwrap();

        match run(&config) {
            Err(PageprepError::MalformedFilename { suffix, .. }) => assert_eq!(suffix, "final"),
            other => panic!("Expected MalformedFilename, got {other:?}"),
        }
        assert!(sentinel.exists(), "failed run must not clear prior output");
        assert!(!config.index_path.exists());
    }

    #[test]
    fn test_missing_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.annotations_dir).unwrap();
        fs::create_dir_all(&config.images_dir).unwrap();
        fs::write(
            config.annotations_dir.join("p_4.json"),
            r#"{"annotations": []}"#,
        )
        .unwrap();

        match run(&config) {
            Err(PageprepError::ImageLoad { path, .. }) => {
                assert_eq!(path, config.images_dir.join("p_4.png"));
            }
            other => panic!("Expected ImageLoad, got {other:?}"),
        }
        assert!(!config.index_path.exists(), "index is only written on success");
    }

    #[test]
    fn test_undecodable_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.annotations_dir).unwrap();
        fs::create_dir_all(&config.images_dir).unwrap();
        fs::write(
            config.annotations_dir.join("p_4.json"),
            r#"{"annotations": []}"#,
        )
        .unwrap();
        fs::write(config.images_dir.join("p_4.png"), "not a png").unwrap();

        assert!(matches!(
            run(&config),
            Err(PageprepError::ImageLoad { .. })
        ));
    }

    #[test]
    fn test_invalid_annotation_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_page(&config, "p_3", "{ broken", 16, 16);

        match run(&config) {
            Err(PageprepError::AnnotationParse { path, .. }) => {
                assert_eq!(path, config.annotations_dir.join("p_3.json"));
            }
            other => panic!("Expected AnnotationParse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_produces_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.annotations_dir).unwrap();
        fs::create_dir_all(&config.images_dir).unwrap();

        let summary = run(&config).unwrap();
        assert_eq!(summary.pages, 0);

        assert!(config.output_images_dir.is_dir());
        assert!(config.output_annotations_dir.is_dir());
        assert_eq!(fs::read_to_string(&config.index_path).unwrap(), "{}");
    }

    #[test]
    fn test_index_parent_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.index_path = dir.path().join("deep/nested/pageList.json");
        fs::create_dir_all(&config.annotations_dir).unwrap();
        fs::create_dir_all(&config.images_dir).unwrap();

        run(&config).unwrap();
        assert!(config.index_path.exists());
    }

    #[test]
    fn test_prepare_output_dir_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        fs::write(&target, "i am a file").unwrap();

        prepare_output_dir(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_prepare_output_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c");

        prepare_output_dir(&target).unwrap();
        assert!(target.is_dir());
    }
}
