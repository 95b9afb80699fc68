use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use little_exif::endian::Endian;
use little_exif::exif_tag::{ExifTag, ExifTagGroup};
use little_exif::exif_tag_format::ExifTagFormat;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;

use std::panic::UnwindSafe;
use std::sync::{Mutex, PoisonError};

use crate::coords::{DecimalCoordinate, ExifRational};
use crate::error::{Error, Result};

// little_exif as_u8_vec(JPEG) returns: [APP1 marker 2B][length 2B][Exif\0\0 6B][TIFF data]
// img-parts set_exif() expects just the TIFF data (after Exif\0\0)
const JPEG_EXIF_OVERHEAD: usize = 10; // 2 + 2 + 6
const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const APP1: u8 = 0xE1;

/// The EXIF tags this tool writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TagId {
    DateTimeOriginal = 0x9003,
    GPSLatitudeRef = 0x0001,
    GPSLatitude = 0x0002,
    GPSLongitudeRef = 0x0003,
    GPSLongitude = 0x0004,
}

/// Image File Directory a tag lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ifd {
    Exif,
    Gps,
}

impl TagId {
    pub const fn id(self) -> u16 {
        self as u16
    }

    pub const fn ifd(self) -> Ifd {
        match self {
            Self::DateTimeOriginal => Ifd::Exif,
            _ => Ifd::Gps,
        }
    }
}

/// Mutable in-memory EXIF tag tree of one JPEG.
pub struct ExifDocument {
    metadata: Metadata,
}

impl ExifDocument {
    /// A document with no tags; serializes to a valid, empty EXIF segment.
    pub fn empty() -> Self {
        Self {
            metadata: Metadata::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.metadata.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set `Exif.DateTimeOriginal`, replacing any previous value.
    pub fn set_date_time_original(&mut self, value: &str) {
        self.metadata
            .set_tag(ExifTag::DateTimeOriginal(value.to_string()));
    }

    pub fn set_gps_latitude(&mut self, latitude: &DecimalCoordinate) -> Result<()> {
        self.set_gps(TagId::GPSLatitudeRef, TagId::GPSLatitude, latitude)
    }

    pub fn set_gps_longitude(&mut self, longitude: &DecimalCoordinate) -> Result<()> {
        self.set_gps(TagId::GPSLongitudeRef, TagId::GPSLongitude, longitude)
    }

    fn set_gps(&mut self, ref_tag: TagId, value_tag: TagId, coord: &DecimalCoordinate) -> Result<()> {
        let reference = gps_tag(
            ref_tag,
            ExifTagFormat::STRING,
            &format!("{}\0", coord.reference).into_bytes(),
        )?;
        let value = gps_tag(
            value_tag,
            ExifTagFormat::RATIONAL64U,
            &encode_gps_rational(&coord.to_exif()),
        )?;
        self.metadata.set_tag(reference);
        self.metadata.set_tag(value);
        Ok(())
    }

    /// Current `DateTimeOriginal`, if the document has one.
    pub fn date_time_original(&self) -> Option<&str> {
        self.metadata.data().iter().find_map(|tag| match tag {
            ExifTag::DateTimeOriginal(value) => Some(value.trim_end_matches('\0')),
            _ => None,
        })
    }

    /// Current hemisphere letter stored in `GPSLatitudeRef` / `GPSLongitudeRef`.
    pub fn gps_reference(&self, tag: TagId) -> Option<&str> {
        self.metadata.data().iter().find_map(|t| match (tag, t) {
            (TagId::GPSLatitudeRef, ExifTag::GPSLatitudeRef(value))
            | (TagId::GPSLongitudeRef, ExifTag::GPSLongitudeRef(value)) => {
                Some(value.trim_end_matches('\0'))
            }
            _ => None,
        })
    }
}

/// Build a GPS IFD tag from raw little-endian bytes.
fn gps_tag(tag: TagId, format: ExifTagFormat, raw: &[u8]) -> Result<ExifTag> {
    ExifTag::from_u16_with_data(
        tag.id(),
        &format,
        &raw.to_vec(),
        &Endian::Little,
        &ExifTagGroup::GPSIFD,
    )
    .map_err(|e| Error::Exif(format!("cannot build GPS tag {:#06x}: {e:?}", tag.id())))
}

/// Encode three rationals as raw bytes (24 bytes, little-endian).
fn encode_gps_rational(values: &[ExifRational; 3]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(24);
    for value in values {
        bytes.extend_from_slice(&value.numerator.to_le_bytes());
        bytes.extend_from_slice(&value.denominator.to_le_bytes());
    }
    bytes
}

/// Narrow interface over the EXIF library: load, dump, insert.
///
/// Segments exchanged through this trait are raw TIFF data, i.e. the APP1
/// payload after the `Exif\0\0` header.
pub trait ExifCodec {
    /// Parse the EXIF segment of a JPEG. A JPEG without one yields an empty document.
    fn load_segment(&self, jpeg: &[u8]) -> Result<ExifDocument>;

    /// Serialize a document to TIFF data.
    fn dump_segment(&self, document: &ExifDocument) -> Result<Vec<u8>>;

    /// Insert or replace the EXIF segment, returning the new JPEG bytes.
    fn insert_segment(&self, segment: &[u8], jpeg: &[u8]) -> Result<Vec<u8>>;
}

/// [`ExifCodec`] built on little_exif (tag tree) and img-parts (JPEG segments).
#[derive(Debug, Default, Clone, Copy)]
pub struct LittleExifCodec;

impl ExifCodec for LittleExifCodec {
    fn load_segment(&self, jpeg: &[u8]) -> Result<ExifDocument> {
        let parsed = parse_jpeg(jpeg)?;
        if parsed.exif().is_none() {
            log::debug!("No EXIF segment present, starting from an empty document");
            return Ok(ExifDocument::empty());
        }

        let buffer = jpeg.to_vec();
        // Suppress panics from little_exif
        let result = catch_silently(move || Metadata::new_from_vec(&buffer, FileExtension::JPEG));

        match result {
            Ok(Ok(metadata)) => {
                log::debug!("little_exif loaded {} existing EXIF tags", metadata.data().len());
                Ok(ExifDocument { metadata })
            }
            Ok(Err(e)) => Err(Error::Exif(format!("could not parse EXIF segment: {e}"))),
            Err(_) => Err(Error::Exif("EXIF segment is corrupt".to_string())),
        }
    }

    fn dump_segment(&self, document: &ExifDocument) -> Result<Vec<u8>> {
        let exif_bytes = document.metadata.as_u8_vec(FileExtension::JPEG);
        match exif_bytes.get(4..JPEG_EXIF_OVERHEAD) {
            Some(header) if header == EXIF_PREFIX && exif_bytes.len() > JPEG_EXIF_OVERHEAD => {
                Ok(exif_bytes[JPEG_EXIF_OVERHEAD..].to_vec())
            }
            _ => Err(Error::Exif("serialized EXIF segment is malformed".to_string())),
        }
    }

    fn insert_segment(&self, segment: &[u8], jpeg: &[u8]) -> Result<Vec<u8>> {
        let mut parsed = parse_jpeg(jpeg)?;

        // Remember where the EXIF segment was originally positioned
        let orig_exif_pos = find_exif_segment_pos(&parsed);

        // set_exif() drops the old segment and inserts the new one at a fixed index
        parsed.set_exif(Some(Bytes::from(segment.to_vec())));

        // Put it back where it was; default right after APP0
        if let Some(new_pos) = find_exif_segment_pos(&parsed) {
            let target_pos = orig_exif_pos.unwrap_or(1);
            let segments = parsed.segments_mut();
            if new_pos != target_pos {
                let seg = segments.remove(new_pos);
                let target_pos = target_pos.min(segments.len());
                segments.insert(target_pos, seg);
            }
        }

        Ok(parsed.encoder().bytes().to_vec())
    }
}

fn parse_jpeg(jpeg: &[u8]) -> Result<Jpeg> {
    Jpeg::from_bytes(Bytes::from(jpeg.to_vec())).map_err(|e| Error::Jpeg(e.to_string()))
}

/// Serializes panic-hook swaps; the hook is process-wide.
static PANIC_HOOK_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with the panic hook silenced, catching any panic.
fn catch_silently<F, T>(f: F) -> std::thread::Result<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    let _guard = PANIC_HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let result = std::panic::catch_unwind(f);
    std::panic::set_hook(prev_hook);
    result
}

/// Find the position of the EXIF APP1 segment in a JPEG.
/// EXIF segments have marker 0xE1 (APP1) and contents starting with "Exif\0\0".
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == APP1 && s.contents().starts_with(EXIF_PREFIX))
}
