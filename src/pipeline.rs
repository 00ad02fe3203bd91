use anyhow::{Context, Result};
use image::ImageFormat;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::attrs;
use crate::metadata;

/// Bytes of a file to sniff for format detection. Covers every supported
/// magic number with room to spare.
const SNIFF_LEN: usize = 64;

/// How a supported image gets rewritten, determined by sniffing content.
///
/// JPEG, PNG, and WebP have their metadata sections cut straight out of
/// the container. The remaining formats are decoded and re-encoded.
/// Detection looks at magic bytes, never at the file extension, so a
/// misnamed image is still recognized and a text file named `photo.jpg`
/// is not.
///
/// # Example
///
/// ```rust
/// use exif_scrub::pipeline::ImageKind;
///
/// let kind = ImageKind::detect(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
/// assert_eq!(kind, Some(ImageKind::Png));
///
/// assert_eq!(ImageKind::detect(b"plain text"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// JPEG — EXIF/XMP APP1, IPTC APP13, and COM segment surgery
    Jpeg,
    /// PNG — eXIf chunk surgery
    Png,
    /// WebP — RIFF EXIF chunk surgery
    WebP,
    /// No container surgery available; decoded and re-encoded in place
    Reencode(ImageFormat),
}

impl ImageKind {
    /// Determine the image kind from the leading bytes of a file.
    pub fn detect(header: &[u8]) -> Option<Self> {
        match image::guess_format(header).ok()? {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::WebP),
            format @ (ImageFormat::Tiff
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::Ico
            | ImageFormat::Pnm
            | ImageFormat::Qoi) => Some(Self::Reencode(format)),
            _ => None,
        }
    }

    /// The underlying image format.
    pub fn format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
            Self::Reencode(format) => *format,
        }
    }
}

/// Terminal state of one processed file.
///
/// `Stripped` is the only outcome that counts as a change; its flags
/// record which kinds of metadata were found and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The path is missing or not a supported image; left untouched.
    NotAnImage,
    /// A supported image with no embedded metadata and no extended
    /// attributes; left untouched.
    Clean,
    /// Metadata was found and removed (or reported, under `--dry-run`).
    Stripped {
        /// Embedded EXIF metadata was present.
        exif: bool,
        /// Extended attributes were present.
        xattrs: bool,
    },
}

impl Outcome {
    /// Whether processing modified (or, under a dry run, would modify)
    /// the file.
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Stripped { .. })
    }
}

/// The per-file result a batch run collects.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Terminal state, or `None` when processing failed.
    pub outcome: Option<Outcome>,
    /// Rendered error chain when processing failed.
    pub error: Option<String>,
}

impl FileReport {
    /// Whether this file was (or would be) modified.
    pub fn changed(&self) -> bool {
        self.outcome.is_some_and(|outcome| outcome.changed())
    }
}

/// Knobs for [`process_file`] and [`process_batch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Detect and report, but leave every file untouched.
    pub dry_run: bool,
    /// Copy each file to `<name>.<ext>.bak` before its first rewrite.
    pub backup: bool,
}

/// Process a single file, stripping whatever metadata it carries.
///
/// The decision procedure:
///
/// 1. **Open** — a missing path, or one whose leading bytes are not a
///    supported image format, is [`Outcome::NotAnImage`]; nothing touched
/// 2. **Inspect** — embedded EXIF fields and extended attribute names are
///    read (on platforms without xattr support the attribute list is
///    always empty)
/// 3. **Clean check** — nothing found is [`Outcome::Clean`]; nothing
///    touched
/// 4. **Strip** — embedded metadata is cut out and the file rewritten
///    atomically, then the extended attributes are removed
///
/// Running the output of a previous run through again reports `Clean`.
///
/// # Errors
///
/// Failures while reading, stripping, rewriting, or removing attributes
/// from a file that needed changes propagate to the caller. A failed file
/// is never left half-written: the rewrite lands via a rename, so the
/// original stays intact up to the moment the replacement is complete.
///
/// # Example
///
/// ```rust,no_run
/// use exif_scrub::pipeline::{Outcome, ProcessOptions, process_file};
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let outcome = process_file(Path::new("photo.jpg"), &ProcessOptions::default())?;
/// if let Outcome::Stripped { exif, xattrs } = outcome {
///     println!("stripped (exif: {exif}, attributes: {xattrs})");
/// }
/// # Ok(())
/// # }
/// ```
pub fn process_file(path: &Path, options: &ProcessOptions) -> Result<Outcome> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Skipping {}: no such file", path.display());
            return Ok(Outcome::NotAnImage);
        }
        Err(e) => {
            return Err(e).context(format!("Failed to open {}", path.display()));
        }
    };

    // Sniff the format from the leading bytes before committing to a full
    // read; most non-image files are rejected from the first handful.
    let mut header = Vec::with_capacity(SNIFF_LEN);
    Read::by_ref(&mut file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let Some(kind) = ImageKind::detect(&header) else {
        log::debug!("Skipping {}: not a supported image", path.display());
        return Ok(Outcome::NotAnImage);
    };

    let mut bytes = header;
    file.read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    drop(file);

    let exif = metadata::has_metadata(&bytes, kind.format());
    let xattrs = !attrs::names(path).is_empty();

    if !exif && !xattrs {
        log::debug!("Already clean: {}", path.display());
        return Ok(Outcome::Clean);
    }

    let outcome = Outcome::Stripped { exif, xattrs };
    if options.dry_run {
        return Ok(outcome);
    }

    if options.backup {
        backup_file(path)?;
    }

    if exif {
        let stripped = metadata::strip_metadata(bytes, kind)
            .with_context(|| format!("Failed to strip metadata from {}", path.display()))?;
        rewrite_file(path, &stripped)
            .with_context(|| format!("Failed to rewrite {}", path.display()))?;
    }

    if xattrs {
        attrs::clear(path).with_context(|| {
            format!("Failed to clear extended attributes on {}", path.display())
        })?;
    }

    Ok(outcome)
}

/// Process every path in order, collecting one [`FileReport`] per input.
///
/// A failure on one file is captured in its report and logged; it never
/// stops the files after it.
pub fn process_batch(paths: &[PathBuf], options: &ProcessOptions) -> Vec<FileReport> {
    paths
        .iter()
        .map(|path| match process_file(path, options) {
            Ok(outcome) => {
                if let Outcome::Stripped { exif, xattrs } = outcome {
                    let mut removed = Vec::new();
                    if exif {
                        removed.push("embedded metadata");
                    }
                    if xattrs {
                        removed.push("extended attributes");
                    }
                    let action = if options.dry_run { "Would strip" } else { "Stripped" };
                    log::info!("{action} {}: {}", removed.join(" + "), path.display());
                }
                FileReport {
                    path: path.clone(),
                    outcome: Some(outcome),
                    error: None,
                }
            }
            Err(e) => {
                log::error!("{e:#}");
                FileReport {
                    path: path.clone(),
                    outcome: None,
                    error: Some(format!("{e:#}")),
                }
            }
        })
        .collect()
}

/// Strip metadata from every path and count how many files changed.
///
/// This is the whole program for callers that only gate on "did anything
/// change": pre-commit hooks fail exactly when the count is nonzero.
///
/// # Example
///
/// ```rust,no_run
/// use exif_scrub::pipeline;
/// use std::path::PathBuf;
///
/// let changed = pipeline::run(&[PathBuf::from("photo.jpg")]);
/// if changed > 0 {
///     eprintln!("{changed} file(s) had metadata stripped");
/// }
/// ```
pub fn run(paths: &[PathBuf]) -> usize {
    process_batch(paths, &ProcessOptions::default())
        .iter()
        .filter(|report| report.changed())
        .count()
}

/// Copy `path` to `<name>.<ext>.bak` unless that backup already exists.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        fs::copy(path, &backup_path)
            .with_context(|| format!("Failed to back up {}", path.display()))?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

/// Replace the contents of `path` atomically: write a temporary file in
/// the same directory, carry the original permissions over, and rename
/// into place. A failure anywhere leaves the original untouched.
fn rewrite_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".exif-scrub-")
        .tempfile_in(dir)
        .context("Failed to create temporary file")?;
    tmp.write_all(bytes)
        .context("Failed to write temporary file")?;

    let permissions = fs::metadata(path)
        .context("Failed to read original permissions")?
        .permissions();
    fs::set_permissions(tmp.path(), permissions)
        .context("Failed to set permissions on temporary file")?;

    tmp.persist(path).context("Failed to replace original file")?;
    Ok(())
}
