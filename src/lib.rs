//! # exif-scrub
//!
//! Privacy scrubber for images — strip embedded EXIF metadata and filesystem
//! extended attributes in place, atomically, without touching pixel data.
//!
//! Files that are missing, not images, or already clean are skipped, and a
//! second run over the same files changes nothing, so the batch entry point
//! doubles as a pre-commit hook: a nonzero change count means a file was
//! actually rewritten.
//!
//! ## Quick Start
//!
//! The batch driver takes paths and returns how many files changed:
//!
//! ```rust,no_run
//! use exif_scrub::pipeline;
//! use std::path::PathBuf;
//!
//! let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
//! let changed = pipeline::run(&paths);
//!
//! if changed > 0 {
//!     println!("{changed} file(s) rewritten");
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! For more control, inspect a file's metadata first and process it with
//! explicit options:
//!
//! ```rust,no_run
//! use exif_scrub::pipeline::{Outcome, ProcessOptions, process_file};
//! use exif_scrub::{attrs, metadata};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let path = Path::new("photo.jpg");
//!
//!     // 1. See what the file carries
//!     let bytes = std::fs::read(path)?;
//!     for entry in metadata::read_tags(&bytes) {
//!         println!("{} = {}", entry.tag, entry.value);
//!     }
//!     for name in attrs::names(path) {
//!         println!("xattr {name:?}");
//!     }
//!
//!     // 2. Strip it, keeping a backup copy
//!     let options = ProcessOptions {
//!         backup: true,
//!         ..Default::default()
//!     };
//!     match process_file(path, &options)? {
//!         Outcome::Stripped { exif, xattrs } => {
//!             println!("stripped (embedded: {exif}, attributes: {xattrs})")
//!         }
//!         Outcome::Clean => println!("nothing to strip"),
//!         Outcome::NotAnImage => println!("skipped"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Strip Strategy |
//! |--------|----------------|
//! | JPEG (`.jpg`, `.jpeg`) | Segment surgery — EXIF/XMP APP1, IPTC APP13, and COM dropped; ICC profiles kept |
//! | PNG (`.png`) | Chunk surgery — `eXIf` dropped |
//! | WebP (`.webp`) | Chunk surgery — RIFF `EXIF` dropped |
//! | TIFF (`.tif`, `.tiff`) | Decode and re-encode, pixels preserved |
//! | GIF, BMP, ICO, PNM, QOI | Decode and re-encode, pixels preserved |
//!
//! Extended attributes are removed from every supported format. Files are
//! identified by content, never by extension.
//!
//! ## Modules
//!
//! - [`attrs`] — extended attribute listing and removal, with a no-op
//!   fallback on platforms without xattr support
//! - [`metadata`] — embedded EXIF detection, listing, and stripping
//! - [`pipeline`] — per-file decision procedure and the batch driver

pub mod attrs;
pub mod metadata;
pub mod pipeline;

#[cfg(test)]
mod testutil;
