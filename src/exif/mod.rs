//! EXIF reading and writing.
//!
//! - [`ExifCodec`] — narrow load / dump / insert interface over the EXIF library
//! - [`annotate_jpeg`] / [`write_file`] — set capture time and GPS position
//! - [`read_exif`] — read what a photo currently carries

mod codec;
mod reader;
mod writer;

pub use codec::{ExifCodec, ExifDocument, Ifd, LittleExifCodec, TagId};
pub use reader::{ExifData, read_exif};
pub use writer::{annotate_jpeg, set_file_times, write_file};

/// Small baseline JPEG (JFIF, no EXIF) for tests.
#[cfg(test)]
pub(crate) fn sample_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([120, 90, 60]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}
