//! pageprep CLI - page annotation dataset preparation
//!
//! Command-line front end over `pageprep-core`: reformat a directory of
//! per-page annotation JSON and page images into a numbered layout, draw
//! bounding-box overlays for inspection, and measure image dimensions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pageprep_core::reformat::{self, ReformatConfig};
use pageprep_core::{discover_pages, draw_annotations, probe, OverlayOptions, PageDocument, PageIndex};
use std::path::{Path, PathBuf};

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if output should be shown (not quiet)
    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if verbose output is requested
    const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pageprep",
    about = "Prepare page annotation datasets for the page viewer",
    long_about = "Reformat per-page annotation JSON and page images into a numbered layout,\n\
                  draw bounding-box overlays for inspection, and measure image dimensions.",
    version
)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reformat annotation JSON and page images into a numbered page layout
    #[command(long_about = "Reformat annotation JSON and page images into a numbered page layout.\n\
                      \n\
                      Annotation files must be named <anything>_<page>.json; each is paired\n\
                      with <same stem>.png from the images directory. Output directories are\n\
                      cleared and recreated, so they only ever contain the latest run.\n\
                      \n\
                      Filenames are validated before anything is cleared: a malformed or\n\
                      duplicate page number aborts the run with the previous output intact.")]
    Reformat {
        /// Directory of per-page annotation JSON files (<anything>_<page>.json)
        #[arg(value_name = "ANNOTATIONS_DIR")]
        annotations_dir: PathBuf,

        /// Directory of page images matching the annotation file stems
        #[arg(value_name = "IMAGES_DIR")]
        images_dir: PathBuf,

        /// Output directory for renamed page images (cleared each run)
        #[arg(long, value_name = "DIR", default_value = "public/pages/images")]
        out_images: PathBuf,

        /// Output directory for rewritten annotation JSON (cleared each run)
        #[arg(long, value_name = "DIR", default_value = "public/pages/annotations")]
        out_annotations: PathBuf,

        /// Output path for the page index document
        #[arg(long, value_name = "FILE", default_value = "public/pages/pageList.json")]
        index: PathBuf,
    },

    /// Draw annotation bounding boxes onto a page image for inspection
    #[command(long_about = "Draw annotation bounding boxes onto a page image for inspection.\n\
                      \n\
                      The page image defaults to the document's page_image field, resolved\n\
                      relative to the JSON file; reformatted documents no longer carry that\n\
                      field, so pass --image for those. The rendered copy is written next to\n\
                      the input as <stem>_debug.png unless --output says otherwise.")]
    Overlay {
        /// Annotation JSON document to visualize
        #[arg(value_name = "ANNOTATIONS_JSON")]
        annotations: PathBuf,

        /// Page image to draw on (default: the document's page_image)
        #[arg(short, long, value_name = "IMAGE")]
        image: Option<PathBuf>,

        /// Output path (default: <stem>_debug.png next to the input)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Rectangle line thickness in pixels
        #[arg(long, value_name = "N", default_value = "3")]
        thickness: u32,
    },

    /// Print the pixel dimensions of an image as WIDTHxHEIGHT
    Measure {
        /// Image file to measure
        #[arg(value_name = "IMAGE")]
        image: Option<PathBuf>,

        /// Pick the image with a native file dialog instead
        #[cfg(feature = "dialog")]
        #[arg(long)]
        pick: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);

    // Initialize logging; --verbose surfaces the library's progress logs
    if verbosity.is_verbose() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }

    match args.command {
        Commands::Reformat {
            annotations_dir,
            images_dir,
            out_images,
            out_annotations,
            index,
        } => {
            let config = ReformatConfig {
                annotations_dir,
                images_dir,
                output_images_dir: out_images,
                output_annotations_dir: out_annotations,
                index_path: index,
            };
            reformat_command(&config, verbosity)
        }

        Commands::Overlay {
            annotations,
            image,
            output,
            thickness,
        } => overlay_command(&annotations, image, output, thickness, verbosity),

        #[cfg(feature = "dialog")]
        Commands::Measure { image, pick } => measure_command(image, pick),
        #[cfg(not(feature = "dialog"))]
        Commands::Measure { image } => measure_command(image, false),
    }
}

/// `pageprep reformat`: the full pipeline with per-page progress.
///
/// Drives the same building blocks as `reformat::run` so each page can get a
/// status line as it is processed.
fn reformat_command(config: &ReformatConfig, verbosity: Verbosity) -> Result<()> {
    let entries = discover_pages(&config.annotations_dir, &config.images_dir)?;

    if entries.is_empty() && verbosity.should_show_output() {
        eprintln!(
            "{} No annotation files found in {}",
            "Warning:".yellow().bold(),
            config.annotations_dir.display()
        );
    }

    reformat::prepare_output_dir(&config.output_images_dir)?;
    reformat::prepare_output_dir(&config.output_annotations_dir)?;

    for entry in &entries {
        if verbosity.should_show_output() {
            eprintln!("Processing page {}...", entry.number);
        }
        reformat::transform_page(entry, config)?;
        if verbosity.is_verbose() {
            let input_name = entry
                .annotations_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy();
            eprintln!(
                "{} {} -> {}.json + {}.png",
                "✓".green().bold(),
                input_name.bright_white(),
                entry.number,
                entry.number
            );
        }
    }

    let index = PageIndex::from_pages(entries.iter().map(|entry| entry.number));
    reformat::write_index(&index, &config.index_path)?;

    if verbosity.should_show_output() {
        eprintln!(
            "{} Reformatted {} pages; index written to {}",
            "✓".green().bold(),
            entries.len(),
            config.index_path.display().to_string().bright_white()
        );
    }

    Ok(())
}

/// `pageprep overlay`: render one document's boxes onto its page image.
fn overlay_command(
    annotations_path: &Path,
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    thickness: u32,
    verbosity: Verbosity,
) -> Result<()> {
    let doc = PageDocument::from_path(annotations_path)?;

    let image_path = match image {
        Some(path) => path,
        None => match doc.page_image.as_deref() {
            Some(reference) => annotations_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(reference),
            None => {
                eprintln!(
                    "{} {} has no page_image field; pass --image",
                    "Error:".red().bold(),
                    annotations_path.display()
                );
                std::process::exit(1);
            }
        },
    };

    let mut img = image::open(&image_path)
        .with_context(|| format!("Failed to open page image: {}", image_path.display()))?
        .to_rgba8();

    let options = OverlayOptions {
        thickness,
        ..OverlayOptions::default()
    };
    draw_annotations(&mut img, &doc.annotations, &options);

    let output_path = output.unwrap_or_else(|| {
        let stem = annotations_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page");
        annotations_path.with_file_name(format!("{stem}_debug.png"))
    });
    img.save(&output_path)
        .with_context(|| format!("Failed to write overlay image: {}", output_path.display()))?;

    if verbosity.should_show_output() {
        eprintln!(
            "{} {} boxes -> {}",
            "✓".green().bold(),
            doc.annotations.len(),
            output_path.display().to_string().bright_white()
        );
    }

    Ok(())
}

/// `pageprep measure`: print an image's dimensions as WIDTHxHEIGHT.
fn measure_command(image: Option<PathBuf>, pick: bool) -> Result<()> {
    #[cfg(feature = "dialog")]
    if pick {
        if image.is_some() {
            eprintln!(
                "{} Cannot specify both an image path and --pick",
                "Error:".red().bold()
            );
            std::process::exit(1);
        }
        let path = match pick_image_file() {
            Some(path) => path,
            None => {
                println!("No file selected / dialog canceled.");
                return Ok(());
            }
        };
        let (width, height) = probe::dimensions(&path)?;
        println!("{width}x{height}");
        return Ok(());
    }
    #[cfg(not(feature = "dialog"))]
    let _ = pick;

    let path = match image {
        Some(path) => path,
        None => {
            #[cfg(feature = "dialog")]
            eprintln!(
                "{} Either an image path or --pick must be provided",
                "Error:".red().bold()
            );
            #[cfg(not(feature = "dialog"))]
            eprintln!("{} An image path must be provided", "Error:".red().bold());
            std::process::exit(1);
        }
    };
    let (width, height) = probe::dimensions(&path)?;
    println!("{width}x{height}");

    Ok(())
}

/// Open a native file dialog filtered to the image types the tools handle.
#[cfg(feature = "dialog")]
fn pick_image_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Image files", &["png", "jpg", "jpeg", "gif", "bmp"])
        .set_directory(".")
        .pick_file()
}
