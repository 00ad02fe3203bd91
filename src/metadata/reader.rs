use std::io::Cursor;

use exif::In;
use image::ImageFormat;

/// Baseline TIFF tags that describe image structure (dimensions, strip
/// layout, sample format) rather than capture metadata. A bare TIFF always
/// carries these in its primary IFD and every re-encode writes them back,
/// so they never count as strippable.
const TIFF_STRUCTURAL_TAGS: &[u16] = &[
    0x00FE, // NewSubfileType
    0x0100, // ImageWidth
    0x0101, // ImageLength
    0x0102, // BitsPerSample
    0x0103, // Compression
    0x0106, // PhotometricInterpretation
    0x0111, // StripOffsets
    0x0115, // SamplesPerPixel
    0x0116, // RowsPerStrip
    0x0117, // StripByteCounts
    0x011A, // XResolution
    0x011B, // YResolution
    0x011C, // PlanarConfiguration
    0x0128, // ResolutionUnit
    0x013D, // Predictor
    0x0140, // ColorMap
    0x0142, // TileWidth
    0x0143, // TileLength
    0x0144, // TileOffsets
    0x0145, // TileByteCounts
    0x0152, // ExtraSamples
    0x0153, // SampleFormat
];

/// One embedded metadata field, flattened for display.
#[derive(Debug, Clone)]
pub struct TagEntry {
    /// IFD the field lives in (0 = primary image, 1 = thumbnail).
    pub ifd: u16,
    /// Tag name, or the raw tag id for unknown tags.
    pub tag: String,
    /// Human-readable value.
    pub value: String,
}

/// Parse the EXIF container out of raw image bytes.
///
/// Any failure (no metadata present, unsupported container, truncated or
/// malformed data) reads as "no EXIF here".
fn parse(bytes: &[u8]) -> Option<exif::Exif> {
    exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
}

/// Whether a parsed field counts as strippable metadata inside `format`.
fn counts_as_metadata(field: &exif::Field, format: ImageFormat) -> bool {
    if format != ImageFormat::Tiff {
        return true;
    }
    !(field.ifd_num == In::PRIMARY && TIFF_STRUCTURAL_TAGS.contains(&field.tag.number()))
}

/// Whether `bytes` carry embedded metadata that a strip would remove.
///
/// For TIFF containers the baseline structural tags are ignored; in every
/// other container any parsed field counts.
pub fn has_metadata(bytes: &[u8], format: ImageFormat) -> bool {
    match parse(bytes) {
        Some(data) => data.fields().any(|f| counts_as_metadata(f, format)),
        None => false,
    }
}

/// List the embedded metadata fields, in container order.
pub fn read_tags(bytes: &[u8]) -> Vec<TagEntry> {
    let Some(data) = parse(bytes) else {
        return Vec::new();
    };
    data.fields()
        .map(|field| TagEntry {
            ifd: field.ifd_num.index(),
            tag: field.tag.to_string(),
            value: field.display_value().to_string(),
        })
        .collect()
}
