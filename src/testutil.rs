//! Fixture builders shared by the crate's unit tests.
//!
//! Every image is a 2×2 solid color, encoded in memory. Metadata is spliced
//! in at the byte level so the fixtures never depend on the code they test.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;

#[cfg(unix)]
use std::path::Path;

pub(crate) const TAG_ORIENTATION: u16 = 0x0112;
const TAG_ARTIST: u16 = 0x013B;

/// A clean 2×2 image in the given format.
pub(crate) fn image_bytes(format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([64, 128, 192])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// A minimal little-endian TIFF body carrying exactly one SHORT entry in
/// IFD0. This is the payload format EXIF carriers embed.
pub(crate) fn exif_blob(tag: u16, value: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_le_bytes()); // entry count
    tiff.extend_from_slice(&tag.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_le_bytes()); // value count
    tiff.extend_from_slice(&value.to_le_bytes());
    tiff.extend_from_slice(&0u16.to_le_bytes()); // value padding
    tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    tiff
}

/// A 2×2 image with one EXIF SHORT tag embedded in the format's native
/// carrier (JPEG APP1, PNG eXIf, WebP EXIF).
pub(crate) fn image_with_tag(format: ImageFormat, tag: u16, value: u16) -> Vec<u8> {
    let clean = image_bytes(format);
    let blob = exif_blob(tag, value);
    match format {
        ImageFormat::Jpeg => {
            let mut jpeg = Jpeg::from_bytes(clean.into()).unwrap();
            jpeg.set_exif(Some(Bytes::from(blob)));
            jpeg.encoder().bytes().to_vec()
        }
        ImageFormat::Png => {
            let mut png = Png::from_bytes(clean.into()).unwrap();
            png.set_exif(Some(Bytes::from(blob)));
            png.encoder().bytes().to_vec()
        }
        ImageFormat::WebP => webp_with_exif(&clean, &blob),
        other => panic!("no EXIF carrier for {other:?}"),
    }
}

/// Rebuild a bare `VP8L` WebP as an extended-format file with an `EXIF`
/// chunk. The encoder never emits metadata slots, so the RIFF container is
/// respliced directly: `VP8X` header, the original image chunk, `EXIF`.
fn webp_with_exif(clean: &[u8], exif: &[u8]) -> Vec<u8> {
    assert_eq!(&clean[0..4], b"RIFF");
    assert_eq!(&clean[8..12], b"WEBP");

    let mut vp8x = vec![0x08, 0, 0, 0]; // EXIF-present flag + reserved
    vp8x.extend_from_slice(&1u32.to_le_bytes()[..3]); // canvas width - 1
    vp8x.extend_from_slice(&1u32.to_le_bytes()[..3]); // canvas height - 1

    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&0u32.to_le_bytes()); // size, patched below
    out.extend_from_slice(b"WEBP");
    push_riff_chunk(&mut out, b"VP8X", &vp8x);
    out.extend_from_slice(&clean[12..]);
    push_riff_chunk(&mut out, b"EXIF", exif);

    let riff_size = (out.len() - 8) as u32;
    out[4..8].copy_from_slice(&riff_size.to_le_bytes());
    out
}

fn push_riff_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
}

/// A 2×2 image with `Orientation = 2` embedded.
pub(crate) fn image_with_orientation(format: ImageFormat) -> Vec<u8> {
    image_with_tag(format, TAG_ORIENTATION, 2)
}

/// A decodable 2×2 TIFF with an Artist entry appended to IFD0.
///
/// Works by rebuilding IFD0 at the end of the file: the original entries
/// are copied verbatim (their value offsets still resolve), the Artist
/// entry is appended, and the header's IFD0 pointer is repointed.
pub(crate) fn tiff_with_artist(artist: &str) -> Vec<u8> {
    let mut tiff = image_bytes(ImageFormat::Tiff);
    assert!(tiff.starts_with(b"II"), "expected a little-endian TIFF");

    let ifd_offset = u32::from_le_bytes(tiff[4..8].try_into().unwrap()) as usize;
    let count = u16::from_le_bytes(tiff[ifd_offset..ifd_offset + 2].try_into().unwrap());
    let entries_start = ifd_offset + 2;
    let entries = tiff[entries_start..entries_start + count as usize * 12].to_vec();

    // Value offsets must stay even.
    if tiff.len() % 2 == 1 {
        tiff.push(0);
    }
    let new_ifd_offset = tiff.len() as u32;

    let mut value = artist.as_bytes().to_vec();
    value.push(0);
    let value_offset = new_ifd_offset + 2 + (count as u32 + 1) * 12 + 4;

    tiff.extend_from_slice(&(count + 1).to_le_bytes());
    tiff.extend_from_slice(&entries);
    tiff.extend_from_slice(&TAG_ARTIST.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    tiff.extend_from_slice(&(value.len() as u32).to_le_bytes());
    if value.len() <= 4 {
        value.resize(4, 0);
        tiff.extend_from_slice(&value);
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    } else {
        tiff.extend_from_slice(&value_offset.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
        tiff.extend_from_slice(&value);
    }
    tiff[4..8].copy_from_slice(&new_ifd_offset.to_le_bytes());
    tiff
}

/// A structurally valid little-endian TIFF holding one Artist entry and
/// none of the layout tags a decoder needs. Metadata readers see a field;
/// pixel decoders reject the file.
pub(crate) fn undecodable_tiff_with_artist() -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&TAG_ARTIST.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&3u32.to_le_bytes()); // "me\0"
    tiff.extend_from_slice(b"me\0\0");
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff
}

/// Whether the filesystem behind `dir` accepts user xattrs. Some CI mounts
/// (and most tmpfs configurations) refuse them, so tests probe first.
#[cfg(unix)]
pub(crate) fn xattrs_work_in(dir: &Path) -> bool {
    let probe = dir.join(".xattr-probe");
    std::fs::write(&probe, b"probe").unwrap();
    let ok = xattr::set(&probe, "user.exif-scrub.probe", b"1").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_decode_to_expected_pixels() {
        for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP] {
            let bytes = image_with_orientation(format);
            let decoded = image::load_from_memory_with_format(&bytes, format).unwrap();
            assert_eq!(decoded.width(), 2, "{format:?}");
            assert_eq!(decoded.height(), 2, "{format:?}");
        }
    }

    #[test]
    fn artist_tiff_still_decodes() {
        let clean = image::load_from_memory_with_format(
            &image_bytes(ImageFormat::Tiff),
            ImageFormat::Tiff,
        )
        .unwrap();
        let tagged = image::load_from_memory_with_format(
            &tiff_with_artist("anonymous"),
            ImageFormat::Tiff,
        )
        .unwrap();
        assert_eq!(clean.to_rgb8().into_raw(), tagged.to_rgb8().into_raw());
    }
}
