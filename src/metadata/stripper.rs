use anyhow::{Context, Result};
use image::ImageFormat;
use img_parts::ImageEXIF;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::Bytes;
use std::io::Cursor;

use crate::pipeline::ImageKind;

// JPEG application segment markers
const MARKER_APP1: u8 = 0xE1; // EXIF or XMP
const MARKER_APP13: u8 = 0xED; // Photoshop / IPTC
const MARKER_COM: u8 = 0xFE; // plain-text comment

const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const IPTC_HEADER: &[u8] = b"Photoshop 3.0\0";

/// Remove embedded metadata from an image, returning the rewritten bytes.
///
/// JPEG, PNG, and WebP are rewritten structurally: the metadata segments or
/// chunks are dropped and everything else, pixel data and ICC profiles
/// included, passes through byte-identical. The remaining formats are
/// decoded and re-encoded, which leaves no ancillary sections at all.
pub fn strip_metadata(bytes: Vec<u8>, kind: ImageKind) -> Result<Vec<u8>> {
    match kind {
        ImageKind::Jpeg => strip_jpeg(bytes),
        ImageKind::Png => strip_png(bytes),
        ImageKind::WebP => strip_webp(bytes),
        ImageKind::Reencode(format) => reencode(bytes, format),
    }
}

/// Drop EXIF/XMP APP1 segments, the IPTC APP13 segment, and COM segments
/// from a JPEG. ICC profiles (APP2) and Adobe color data (APP14) stay.
fn strip_jpeg(bytes: Vec<u8>) -> Result<Vec<u8>> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;

    jpeg.segments_mut().retain(|segment| {
        let marker = segment.marker();
        let contents = segment.contents();
        let is_metadata = (marker == MARKER_APP1
            && (contents.starts_with(EXIF_PREFIX) || contents.starts_with(XMP_HEADER)))
            || (marker == MARKER_APP13 && contents.starts_with(IPTC_HEADER))
            || marker == MARKER_COM;
        !is_metadata
    });

    Ok(jpeg.encoder().bytes().to_vec())
}

/// Drop the eXIf chunk from a PNG.
fn strip_png(bytes: Vec<u8>) -> Result<Vec<u8>> {
    let mut png = Png::from_bytes(Bytes::from(bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse PNG: {e}"))?;
    png.set_exif(None);
    Ok(png.encoder().bytes().to_vec())
}

/// Drop the EXIF chunk from a WebP RIFF container.
fn strip_webp(bytes: Vec<u8>) -> Result<Vec<u8>> {
    let mut webp = WebP::from_bytes(Bytes::from(bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse WebP: {e}"))?;
    webp.set_exif(None);
    Ok(webp.encoder().bytes().to_vec())
}

/// Decode and re-encode in the same format.
fn reencode(bytes: Vec<u8>, format: ImageFormat) -> Result<Vec<u8>> {
    let image = image::load_from_memory_with_format(&bytes, format)
        .with_context(|| format!("Failed to decode {format:?} image"))?;

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .with_context(|| format!("Failed to re-encode {format:?} image"))?;

    Ok(out.into_inner())
}
