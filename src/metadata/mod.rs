//! Embedded metadata detection and removal.
//!
//! Two halves:
//!
//! - [`has_metadata`] / [`read_tags`] — answer "is anything embedded here?"
//!   from the raw bytes, without touching the file
//! - [`strip_metadata`] — produce the rewritten, metadata-free bytes
//!
//! The stripper routes on [`ImageKind`](crate::pipeline::ImageKind): JPEG,
//! PNG, and WebP get container surgery that leaves pixel data untouched;
//! every other supported format is decoded and re-encoded.

mod reader;
mod stripper;

pub use reader::{TagEntry, has_metadata, read_tags};
pub use stripper::strip_metadata;
